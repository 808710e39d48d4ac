//! Structured prompting for language models.
//!
//! Depend on this crate via `cargo add easy-prompter`. It bundles the
//! workspace crates behind feature flags: the instruction grammar is always
//! available, while the conversation controller, model clients, completion
//! cache and loggers can be switched off for parsing-only use.

#![warn(missing_docs, clippy::pedantic)]

/// Messages, roles, validation errors and text helpers.
pub use prompter_primitives as primitives;

/// Marker-based instruction grammar.
pub use prompter_instructions as instructions;

/// Conversation controller (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use prompter_kernel as kernel;

/// Model clients (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use prompter_adapters as adapters;

/// Completion caches (enabled by `cache` feature).
#[cfg(feature = "cache")]
pub use prompter_cache as cache;

/// Conversation loggers and tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use prompter_telemetry as telemetry;

/// The types most sessions need.
pub mod prelude {
    pub use prompter_instructions::{
        Choice, Code, Context, Data, Instruction, Item, List, Repetition, Terminable, Text, Value,
    };
    pub use prompter_primitives::{Message, Role};

    #[cfg(feature = "adapters")]
    pub use prompter_adapters::ModelClient;
    #[cfg(feature = "kernel")]
    pub use prompter_kernel::{PromptError, PromptResult, Prompter, SummaryThresholds};
}
