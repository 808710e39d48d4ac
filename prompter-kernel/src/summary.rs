//! Automatic summarization of long conversations.

use futures::future::BoxFuture;
use prompter_primitives::{Message, Role, text};
use tracing::info;

use crate::{PromptResult, Prompter, SummaryThresholds};

const SUMMARY_REQUEST: &str = "Please summarize the following conversation.\n\
Only keep the most important information about the conversation in the summary.\n\
Only answer with the summary and nothing else.";

impl Prompter {
    /// Replaces the oldest messages with a model-written summary.
    ///
    /// Messages are walked oldest first until their lengths add up to
    /// `include_size`; those are folded into the summary and the rest are kept
    /// verbatim after it. The summary is a one-shot request from a fork with
    /// no messages, no thresholds and no interaction hook.
    pub(crate) fn summarize(
        &mut self,
        thresholds: SummaryThresholds,
    ) -> BoxFuture<'_, PromptResult<()>> {
        Box::pin(async move {
            let included = split_point(self.messages(), thresholds.include_size());
            let conversation = render_conversation(self.messages());

            let mut summarizer = self.fork();
            summarizer.clear_messages();
            summarizer.disable_summary();
            summarizer.disable_interaction();
            summarizer.append_message(SUMMARY_REQUEST, Role::User).await?;
            summarizer
                .append_message(
                    format!("Here is the conversation:\n{conversation}"),
                    Role::Developer,
                )
                .await?;
            let summary = summarizer.get_completion(None).await?;

            let before = self.len_chars();
            let mut messages = Vec::with_capacity(self.messages().len() - included + 1);
            messages.push(Message::developer(format!(
                "Here is a summary of the conversation until this point:\n{}",
                text::fence(&summary, "summary")
            )));
            messages.extend_from_slice(&self.messages()[included..]);
            self.replace_messages(messages);

            info!(
                tag = self.tag(),
                folded = included,
                before,
                after = self.len_chars(),
                "conversation summarized"
            );
            Ok(())
        })
    }
}

/// Number of leading messages whose lengths first reach `include_size`.
fn split_point(messages: &[Message], include_size: usize) -> usize {
    let mut total = 0;
    for (index, message) in messages.iter().enumerate() {
        total += message.len_chars();
        if total >= include_size {
            return index + 1;
        }
    }
    messages.len()
}

fn render_conversation(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| format!("{}:\n{}", message.role(), message.content()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_point_stops_once_include_size_is_reached() {
        let messages = [
            Message::user("aaaa"),
            Message::assistant("bbbb"),
            Message::user("cccc"),
        ];
        assert_eq!(split_point(&messages, 1), 1);
        assert_eq!(split_point(&messages, 5), 2);
        assert_eq!(split_point(&messages, 8), 2);
        assert_eq!(split_point(&messages, 100), 3);
    }

    #[test]
    fn renders_role_tagged_blocks() {
        let rendered = render_conversation(&[Message::developer("rules"), Message::user("hi")]);
        assert_eq!(rendered, "developer:\nrules\n\nuser:\nhi");
    }
}
