//! The instruction capability shared by every node.

use std::fmt;
use std::sync::Arc;

use prompter_primitives::text::marker;

use crate::{ExtractionResult, Value};

/// Key of the item appended by [`Terminable::terminated`].
pub const STOP_KEY: &str = "stop";

/// Marker a model writes to signal that it finished a terminated reply.
#[must_use]
pub fn stop_marker() -> String {
    marker(STOP_KEY)
}

/// Describes an expected output format and extracts values from text that
/// follows it.
///
/// Both operations are pure.
pub trait Instruction: fmt::Debug + Send + Sync {
    /// Renders marker-annotated formatting directions.
    fn describe(&self) -> String;

    /// Parses a completion assumed to follow [`describe`](Self::describe).
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`](crate::ExtractionError) when a marker is
    /// missing or a leaf parser rejects its slice. No partial value is
    /// returned.
    fn extract(&self, text: &str) -> ExtractionResult<Value>;
}

/// Instructions that can be closed with an explicit `[[stop]]` item, so a
/// model signals the end of its reply unambiguously.
pub trait Terminable: Instruction {
    /// Returns a copy that additionally asks for `[[stop]]` at the end and
    /// drops the stop slice from its extracted value.
    fn terminated(&self) -> Arc<dyn Instruction>;
}
