//! Model clients used by the prompter.
//!
//! Each module exposes an implementation for a specific backend while sharing
//! the [`ModelClient`](traits::ModelClient) capability defined in [`traits`].

#![warn(missing_docs, clippy::pedantic)]

pub mod ollama;
pub mod openai;
pub mod scripted;
pub mod traits;

mod http_client;

pub use traits::{ClientMetadata, ModelClient, ModelError, ModelResult};
