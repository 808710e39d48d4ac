//! Core shared types for structured prompting.
//!
//! Everything here is pure: conversation messages, the closed set of roles,
//! construction-time validation errors, and the text helpers used to render
//! marker-annotated instructions.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod message;
pub mod text;

/// Validation error shared by every constructor in the workspace.
pub use error::{ValidationError, ValidationResult};
/// Conversation turn and its author role.
pub use message::{Message, Role};
