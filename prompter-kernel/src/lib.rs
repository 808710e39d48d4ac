//! Conversation controller tying model clients, the completion cache, loggers
//! and the instruction grammar together.
//!
//! A [`Prompter`] owns one conversation. It appends messages, requests
//! completions (reusing cached ones when a cache is configured), keeps the
//! history under a size budget by summarizing it, and turns marker-formatted
//! replies into [`Value`](prompter_instructions::Value)s through
//! [`Prompter::get_structured_reply`].

#![warn(missing_docs, clippy::pedantic)]

mod config;
mod error;
mod interaction;
mod prompter;
mod summary;

pub use config::{
    CACHE_DIR_ENV, PrompterConfig, SUMMARY_INCLUDE_ENV, SUMMARY_START_ENV, SummaryThresholds,
    TAG_ENV,
};
pub use error::{PromptError, PromptResult};
pub use interaction::{ConsoleInteraction, Interaction, StdinInteraction};
pub use prompter::{Prompter, PrompterBuilder};
