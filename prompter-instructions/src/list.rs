//! Ordered sequences of keyed items.

use std::collections::HashSet;
use std::sync::Arc;

use prompter_primitives::text::{enumerate_list, hang, marker, scope};
use prompter_primitives::{ValidationError, ValidationResult};

use crate::instruction::STOP_KEY;
use crate::{ExtractionError, ExtractionResult, Instruction, Terminable, Value};

/// One keyed entry of a [`List`] or [`Repetition`](crate::Repetition).
#[derive(Clone, Debug)]
pub struct Item {
    key: String,
    instruction: Option<Arc<dyn Instruction>>,
}

impl Item {
    /// Item whose slice is returned trimmed.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            instruction: None,
        }
    }

    /// Item whose slice is handed to a nested instruction.
    #[must_use]
    pub fn with(key: impl Into<String>, instruction: impl Instruction + 'static) -> Self {
        Self {
            key: key.into(),
            instruction: Some(Arc::new(instruction)),
        }
    }

    /// Item whose slice is handed to an already shared instruction.
    #[must_use]
    pub fn with_shared(key: impl Into<String>, instruction: Arc<dyn Instruction>) -> Self {
        Self {
            key: key.into(),
            instruction: Some(instruction),
        }
    }

    /// Returns the item key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the marker written for this item.
    #[must_use]
    pub fn marker(&self) -> String {
        marker(&self.key)
    }

    fn extract(&self, slice: &str) -> ExtractionResult<Value> {
        match &self.instruction {
            Some(instruction) => instruction.extract(slice),
            None => Ok(Value::Text(slice.trim().to_owned())),
        }
    }
}

/// Ordered items, each introduced by its marker.
///
/// Described as an enumerated list of `Write "[[key]]"` steps interleaved with
/// the nested instructions. Extraction slices the completion at each marker in
/// declared order; the text preceding the leading marker is ignored.
///
/// Only the first marker may be omitted, in which case the first slice starts
/// at the beginning of the text. Every later marker, including `[[stop]]` on a
/// terminated list, is required. An unterminated single-item list therefore
/// accepts any text.
#[derive(Clone, Debug)]
pub struct List {
    context: String,
    items: Vec<Item>,
    effect: Option<String>,
    terminated: bool,
}

impl List {
    /// Creates a list introduced by `context`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `items` is empty, two items share a
    /// key, or an item uses the reserved `stop` key.
    pub fn new(
        context: impl Into<String>,
        items: impl IntoIterator<Item = Item>,
    ) -> ValidationResult<Self> {
        let items: Vec<Item> = items.into_iter().collect();
        validate_items("list", &items)?;
        Ok(Self {
            context: context.into(),
            items,
            effect: None,
            terminated: false,
        })
    }

    /// Describes what happens once the list has been written.
    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Returns the declared items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the key of the first item.
    #[must_use]
    pub fn leading_key(&self) -> &str {
        &self.items[0].key
    }

    /// Whether the list asks for a trailing `[[stop]]`.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Returns a copy that asks for a trailing `[[stop]]`.
    #[must_use]
    pub fn with_stop(&self) -> Self {
        Self {
            terminated: true,
            ..self.clone()
        }
    }

    fn markers(&self) -> Vec<String> {
        let mut markers: Vec<String> = self.items.iter().map(Item::marker).collect();
        if self.terminated {
            markers.push(marker(STOP_KEY));
        }
        markers
    }
}

impl Instruction for List {
    fn describe(&self) -> String {
        let mut steps = describe_items(&self.items);
        if self.terminated {
            steps.push(Some(format!("Write \"{}\"", marker(STOP_KEY))));
        }
        let mut body = enumerate_list(steps, false);
        if let Some(effect) = &self.effect {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str("-> ");
            body.push_str(&hang(effect, "   "));
        }
        format!("{}{}", self.context, scope(&body))
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        let markers = self.markers();
        let rest = text
            .split_once(markers[0].as_str())
            .map_or(text, |(_, after)| after);
        let (mut slices, last) = split_sequence("list", &markers[1..], rest)?;
        slices.push(last);
        extract_items(&self.items, &slices).map(Value::List)
    }
}

impl Terminable for List {
    fn terminated(&self) -> Arc<dyn Instruction> {
        Arc::new(self.with_stop())
    }
}

/// Renders `Write "[[key]]"` steps interleaved with nested descriptions.
pub(crate) fn describe_items(items: &[Item]) -> Vec<Option<String>> {
    items
        .iter()
        .flat_map(|item| {
            [
                Some(format!("Write \"{}\"", item.marker())),
                item.instruction.as_ref().map(|nested| nested.describe()),
            ]
        })
        .collect()
}

/// Splits `rest` at each marker in order, returning the text preceding every
/// marker and the remainder after the last one.
pub(crate) fn split_sequence<'t>(
    node: &'static str,
    markers: &[String],
    mut rest: &'t str,
) -> ExtractionResult<(Vec<&'t str>, &'t str)> {
    let mut slices = Vec::with_capacity(markers.len() + 1);
    for marker in markers {
        let Some((head, tail)) = rest.split_once(marker.as_str()) else {
            return Err(ExtractionError::missing_marker(node, marker, rest));
        };
        slices.push(head);
        rest = tail;
    }
    Ok((slices, rest))
}

/// Extracts each slice with its item; surplus slices (the stop slice) are
/// dropped.
pub(crate) fn extract_items(items: &[Item], slices: &[&str]) -> ExtractionResult<Vec<Value>> {
    items
        .iter()
        .zip(slices)
        .map(|(item, slice)| item.extract(slice))
        .collect()
}

pub(crate) fn validate_items(node: &'static str, items: &[Item]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyItems { node });
    }
    let mut seen = HashSet::new();
    for item in items {
        if item.key == STOP_KEY {
            return Err(ValidationError::ReservedKey {
                key: item.key.clone(),
            });
        }
        if !seen.insert(item.key.as_str()) {
            return Err(ValidationError::DuplicateKey {
                node,
                key: item.key.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Data;

    fn answer_list() -> List {
        List::new(
            "Answer the question",
            [Item::new("think"), Item::with("answer", Data::text("Write the answer"))],
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_duplicate_and_reserved_keys() {
        assert_eq!(
            List::new("x", []).unwrap_err(),
            ValidationError::EmptyItems { node: "list" }
        );
        assert_eq!(
            List::new("x", [Item::new("a"), Item::new("a")]).unwrap_err(),
            ValidationError::DuplicateKey {
                node: "list",
                key: "a".into()
            }
        );
        assert_eq!(
            List::new("x", [Item::new("stop")]).unwrap_err(),
            ValidationError::ReservedKey { key: "stop".into() }
        );
    }

    #[test]
    fn describes_enumerated_markers() {
        let text = answer_list().describe();
        assert_eq!(
            text,
            "Answer the question {\n  1. Write \"[[think]]\"\n  2. Write \"[[answer]]\"\n  3. Write the answer\n}"
        );
    }

    #[test]
    fn describes_effect_and_stop() {
        let text = answer_list().with_effect("The answer is graded").with_stop().describe();
        assert!(text.contains("4. Write \"[[stop]]\""));
        assert!(text.ends_with("-> The answer is graded\n}"));
    }

    #[test]
    fn extracts_values_in_declared_order() {
        let value = answer_list()
            .extract("Sure! [[think]] it is six times seven [[answer]] 42 ")
            .unwrap();
        assert_eq!(
            value,
            Value::List(vec!["it is six times seven".into(), "42".into()])
        );
    }

    #[test]
    fn leading_marker_may_be_omitted() {
        let value = answer_list().extract("reasoning[[answer]]42").unwrap();
        assert_eq!(value, Value::List(vec!["reasoning".into(), "42".into()]));
    }

    #[test]
    fn missing_marker_fails_without_partial_result() {
        let err = answer_list()
            .extract("[[think]] no answer marker here")
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MissingMarker { node: "list", ref marker, .. } if marker == "[[answer]]"
        ));
    }

    #[test]
    fn terminated_list_drops_stop_slice() {
        let list = answer_list().with_stop();
        let value = list.extract("reasoning here[[answer]] 42 [[stop]]").unwrap();
        assert_eq!(value, Value::List(vec!["reasoning here".into(), "42".into()]));

        let err = list.extract("reasoning here[[answer]] 42").unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker { ref marker, .. } if marker == "[[stop]]"));
    }

    #[test]
    fn only_the_leading_marker_is_optional() {
        let single = List::new("Answer", [Item::new("only")]).unwrap();
        assert_eq!(
            single.extract("no markers at all").unwrap(),
            Value::List(vec!["no markers at all".into()])
        );

        let terminated = single.with_stop();
        assert_eq!(
            terminated.extract("plain answer [[stop]]").unwrap(),
            Value::List(vec!["plain answer".into()])
        );
        let err = terminated.extract("[[only]] no terminator").unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker { ref marker, .. } if marker == "[[stop]]"));
    }

    #[test]
    fn nested_list_receives_its_own_slice() {
        let inner = List::new("Rate it", [Item::new("score"), Item::new("reason")]).unwrap();
        let outer = List::new("Review", [Item::new("summary"), Item::with("rating", inner)]).unwrap();

        let value = outer
            .extract("[[summary]] fine [[rating]] [[score]] 4 [[reason]] tidy")
            .unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                "fine".into(),
                Value::List(vec!["4".into(), "tidy".into()]),
            ])
        );
    }

    #[test]
    fn substituted_markers_round_trip() {
        let list = List::new(
            "Fill in",
            [Item::new("a"), Item::new("b"), Item::with("c", Data::text("c"))],
        )
        .unwrap();
        let contents = ["alpha", "beta\nwith lines", "gamma"];
        let text: String = list
            .items()
            .iter()
            .zip(contents)
            .map(|(item, content)| format!("{}{content}", item.marker()))
            .collect();

        let value = list.extract(&text).unwrap();
        let expected: Vec<Value> = contents.iter().map(|c| Value::from(*c)).collect();
        assert_eq!(value, Value::List(expected));
    }
}
