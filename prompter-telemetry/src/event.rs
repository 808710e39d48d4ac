use std::fmt::Write as _;

use prompter_primitives::{Message, text};

/// Indentation applied to message bodies by the text sinks.
pub const DEFAULT_PADDING: &str = "  ";

/// A message appended to a conversation.
#[derive(Clone, Copy, Debug)]
pub struct LogEvent<'a> {
    /// The appended message.
    pub message: &'a Message,
    /// Position of the message in the conversation.
    pub index: usize,
    /// Session tag, if one was set.
    pub tag: Option<&'a str>,
}

impl<'a> LogEvent<'a> {
    /// Creates an event.
    #[must_use]
    pub const fn new(message: &'a Message, index: usize, tag: Option<&'a str>) -> Self {
        Self {
            message,
            index,
            tag,
        }
    }
}

/// Sink receiving conversation events.
///
/// Loggers are shared between a prompter and its forks, so they take `&self`
/// and synchronise internally where needed. Failures are reported through
/// `tracing` rather than interrupting the conversation.
pub trait Logger: Send + Sync {
    /// Records one event.
    fn log(&self, event: &LogEvent<'_>);

    /// Flushes and releases resources. Further events may be dropped.
    fn close(&self) {}
}

/// Renders an event as `Message(tag=…, role=…, idx=…):` followed by the
/// content, each line prefixed with `padding`.
#[must_use]
pub fn format_event(event: &LogEvent<'_>, padding: &str) -> String {
    let mut rendered = String::from("Message(tag=");
    match event.tag {
        Some(tag) => {
            let _ = write!(rendered, "{tag:?}");
        }
        None => rendered.push_str("none"),
    }
    let _ = write!(
        rendered,
        ", role={:?}, idx={}):\n{}",
        event.message.role().as_str(),
        event.index,
        text::pad(event.message.content(), padding)
    );
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_tagged_event() {
        let message = Message::user("hello\nworld");
        let rendered = format_event(&LogEvent::new(&message, 3, Some("demo")), DEFAULT_PADDING);
        assert_eq!(
            rendered,
            "Message(tag=\"demo\", role=\"user\", idx=3):\n  hello\n  world"
        );
    }

    #[test]
    fn formats_untagged_event() {
        let message = Message::developer("rules");
        let rendered = format_event(&LogEvent::new(&message, 0, None), "> ");
        assert_eq!(rendered, "Message(tag=none, role=\"developer\", idx=0):\n> rules");
    }
}
