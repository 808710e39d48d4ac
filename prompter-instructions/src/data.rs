//! Leaf instructions that parse a single slice of text.

use std::fmt;
use std::sync::Arc;

use prompter_primitives::text::{enumerate_list, scope};

use crate::{ExtractionError, ExtractionResult, Instruction, Value};

type Parser = Arc<dyn Fn(&str) -> anyhow::Result<Value> + Send + Sync>;

/// Leaf that shows its description verbatim and runs a custom parser over
/// the slice it receives.
#[derive(Clone)]
pub struct Data {
    description: String,
    parser: Parser,
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Data {
    /// Creates a leaf with a custom parser.
    #[must_use]
    pub fn new<F>(description: impl Into<String>, parser: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            parser: Arc::new(parser),
        }
    }

    /// Leaf that returns its slice with surrounding whitespace trimmed.
    #[must_use]
    pub fn text(description: impl Into<String>) -> Self {
        Self::new(description, |slice| Ok(Value::Text(slice.trim().to_owned())))
    }

    /// Leaf that parses its slice as JSON.
    #[must_use]
    pub fn json(description: impl Into<String>) -> Self {
        Self::new(description, |slice| {
            Ok(Value::Json(serde_json::from_str(slice.trim())?))
        })
    }

    /// Returns the description shown to the model.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Instruction for Data {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        (self.parser)(text).map_err(|err| ExtractionError::Parse {
            reason: format!("{err:#}"),
            text: text.to_owned(),
        })
    }
}

/// Leaf that shows its description verbatim and returns its slice trimmed.
///
/// Equivalent to [`Data::text`] without the boxed parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    description: String,
}

impl Text {
    /// Creates the leaf.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl Instruction for Text {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        Ok(Value::Text(text.trim().to_owned()))
    }
}

/// Leaf that asks for a fenced code block and returns its contents.
#[derive(Clone, Debug)]
pub struct Code {
    task: String,
    language: Option<String>,
}

impl Code {
    /// Asks for code solving `task`, fenced without a language tag.
    #[must_use]
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            language: None,
        }
    }

    /// Tags the requested fence with `language` and prefers blocks carrying
    /// that tag during extraction.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Instruction for Code {
    fn describe(&self) -> String {
        let language = self.language.as_deref().unwrap_or_default();
        format!(
            "Do the following{}",
            scope(&enumerate_list(
                [
                    Some(format!("Write \"```{language}\\n\"")),
                    Some(self.task.clone()),
                    Some("Write \"\\n```\"".to_owned()),
                ],
                false,
            ))
        )
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        Ok(Value::Text(extract_code(text, self.language.as_deref())))
    }
}

/// Returns the contents of a fenced code block in `text`.
///
/// The first block tagged with `language` wins, else the first block. Without
/// any complete fence every line that is not a fence line is returned.
#[must_use]
pub fn extract_code(text: &str, language: Option<&str>) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let is_fence = |line: &str| line.trim_start().starts_with("```");

    let mut blocks = Vec::new();
    let mut open: Option<(usize, &str)> = None;
    for (idx, line) in lines.iter().enumerate() {
        let Some(tag) = line.trim_start().strip_prefix("```") else {
            continue;
        };
        match open.take() {
            Some((start, start_tag)) => blocks.push((start, idx, start_tag)),
            None => open = Some((idx, tag.trim())),
        }
    }

    let chosen = language
        .and_then(|language| blocks.iter().find(|(_, _, tag)| *tag == language))
        .or_else(|| blocks.first());

    if let Some((start, end, _)) = chosen {
        return lines[start + 1..*end].join("\n").trim().to_owned();
    }

    lines
        .into_iter()
        .filter(|line| !is_fence(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_trims_slice() {
        let value = Data::text("anything").extract("  42 \n").unwrap();
        assert_eq!(value, Value::Text("42".into()));
    }

    #[test]
    fn text_leaf_matches_text_data() {
        let leaf = Text::new("Write the answer");
        assert_eq!(leaf.describe(), "Write the answer");
        assert_eq!(leaf.extract(" yes\n").unwrap(), Data::text("").extract(" yes\n").unwrap());
    }

    #[test]
    fn json_parses_slice() {
        let value = Data::json("a JSON array").extract(" [1, 2] ").unwrap();
        assert_eq!(value, Value::Json(serde_json::json!([1, 2])));
    }

    #[test]
    fn parser_failure_becomes_extraction_error() {
        let err = Data::json("a JSON array").extract("not json").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { ref text, .. } if text == "not json"));
    }

    #[test]
    fn custom_parser_receives_raw_slice() {
        let data = Data::new("count", |slice| {
            let n: i64 = slice.trim().parse()?;
            Ok(Value::Json(serde_json::json!(n * 2)))
        });
        assert_eq!(data.extract(" 21 ").unwrap(), Value::Json(serde_json::json!(42)));
        assert!(data.extract("x").is_err());
    }

    #[test]
    fn code_describes_three_steps() {
        let text = Code::new("Write a hello world program")
            .with_language("rust")
            .describe();
        assert_eq!(
            text,
            "Do the following {\n  1. Write \"```rust\\n\"\n  2. Write a hello world program\n  3. Write \"\\n```\"\n}"
        );
    }

    #[test]
    fn extracts_first_fenced_block() {
        let text = "Here you go:\n```python\nprint('hi')\n```\nDone.";
        assert_eq!(extract_code(text, None), "print('hi')");
    }

    #[test]
    fn prefers_block_with_matching_language() {
        let text = "```sh\ncargo run\n```\n```rust\nfn main() {}\n```";
        assert_eq!(extract_code(text, Some("rust")), "fn main() {}");
        assert_eq!(extract_code(text, Some("go")), "cargo run");
    }

    #[test]
    fn falls_back_to_non_fence_lines() {
        assert_eq!(extract_code("```\nlet x = 1;", None), "let x = 1;");
        assert_eq!(extract_code(" plain text ", None), "plain text");
    }
}
