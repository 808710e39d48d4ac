//! Text helpers used to render human-readable, machine-parsable instructions.
//!
//! All functions are pure.

/// Opening delimiter of a marker.
pub const MARKER_OPEN: &str = "[[";
/// Closing delimiter of a marker.
pub const MARKER_CLOSE: &str = "]]";

const SCOPE_INDENT: &str = "  ";

/// Prefixes every line of `text` with `prefix`.
#[must_use]
pub fn pad(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefixes every line of `text` except the first with `prefix`.
#[must_use]
pub fn hang(text: &str, prefix: &str) -> String {
    text.split('\n')
        .collect::<Vec<_>>()
        .join(&format!("\n{prefix}"))
}

/// Wraps `text` in an indented brace block: `" {\n" + pad(text) + "\n}"`.
#[must_use]
pub fn scope(text: &str) -> String {
    format!(" {{\n{}\n}}", pad(text, SCOPE_INDENT))
}

/// Numbers the present items `1.`, `2.`, … one per line.
///
/// Multi-line items keep their continuation lines aligned under the first.
#[must_use]
pub fn enumerate_list<I, S>(items: I, scoped: bool) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let text = items
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(idx, item)| {
            let label = format!("{}. ", idx + 1);
            let indent = " ".repeat(label.len());
            format!("{label}{}", hang(item.as_ref(), &indent))
        })
        .collect::<Vec<_>>()
        .join("\n");
    finish(text, scoped)
}

/// Bullets the present items with `- `, one per line.
#[must_use]
pub fn bullet_list<I, S>(items: I, scoped: bool) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let text = items
        .into_iter()
        .flatten()
        .map(|item| format!("- {}", hang(item.as_ref(), "  ")))
        .collect::<Vec<_>>()
        .join("\n");
    finish(text, scoped)
}

/// Wraps `key` in the marker delimiters, e.g. `[[answer]]`.
#[must_use]
pub fn marker(key: &str) -> String {
    format!("{MARKER_OPEN}{key}{MARKER_CLOSE}")
}

/// Wraps `text` in a fenced block tagged with `language`.
#[must_use]
pub fn fence(text: &str, language: &str) -> String {
    format!("```{language}\n{text}\n```")
}

fn finish(text: String, scoped: bool) -> String {
    if scoped { scope(&text) } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_every_line() {
        assert_eq!(pad("a\nb", "> "), "> a\n> b");
        assert_eq!(pad("", "> "), "> ");
    }

    #[test]
    fn hang_skips_first_line() {
        assert_eq!(hang("a\nb\nc", "  "), "a\n  b\n  c");
        assert_eq!(hang("single", "  "), "single");
    }

    #[test]
    fn scope_wraps_in_braces() {
        assert_eq!(scope("x\ny"), " {\n  x\n  y\n}");
    }

    #[test]
    fn enumerates_present_items_consecutively() {
        let text = enumerate_list([Some("first"), None, Some("second")], false);
        assert_eq!(text, "1. first\n2. second");
    }

    #[test]
    fn enumerate_aligns_continuation_lines() {
        let text = enumerate_list([Some("head\ntail")], false);
        assert_eq!(text, "1. head\n   tail");
    }

    #[test]
    fn bullets_items_and_scopes() {
        let text = bullet_list([Some("a"), None, Some("b")], true);
        assert_eq!(text, " {\n  - a\n  - b\n}");
    }

    #[test]
    fn marker_uses_double_brackets() {
        assert_eq!(marker("answer"), "[[answer]]");
    }

    #[test]
    fn fence_wraps_code() {
        assert_eq!(fence("let x = 1;", "rust"), "```rust\nlet x = 1;\n```");
    }
}
