//! Extraction failures.

use thiserror::Error;

const PREVIEW_CHARS: usize = 160;

/// Result alias for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// The completion did not comply with the described format.
///
/// Always recoverable: callers typically re-prompt the model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// A declared marker was not found in the text.
    #[error("{node} extraction failed: missing marker `{marker}` in {:?}", preview(.text))]
    MissingMarker {
        /// Node that was extracting.
        node: &'static str,
        /// The marker that could not be located.
        marker: String,
        /// Text that was searched.
        text: String,
    },

    /// None of the options of a choice was found in the text.
    #[error("choice extraction failed: none of {markers:?} in {:?}", preview(.text))]
    NoOption {
        /// Leading markers of every option, in declared order.
        markers: Vec<String>,
        /// Text that was searched.
        text: String,
    },

    /// A leaf parser rejected its slice.
    #[error("data extraction failed: {reason} for {:?}", preview(.text))]
    Parse {
        /// Parser error message.
        reason: String,
        /// Slice handed to the parser.
        text: String,
    },
}

impl ExtractionError {
    pub(crate) fn missing_marker(node: &'static str, marker: &str, text: &str) -> Self {
        Self::MissingMarker {
            node,
            marker: marker.to_owned(),
            text: text.to_owned(),
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}
