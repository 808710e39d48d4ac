//! Mutually exclusive options.

use std::collections::HashSet;
use std::sync::Arc;

use prompter_primitives::text::{bullet_list, scope};
use prompter_primitives::{ValidationError, ValidationResult};

use crate::{ExtractionError, ExtractionResult, Instruction, List, Terminable, Value};

/// A set of [`List`]-shaped options of which the model writes exactly one.
///
/// Extraction picks the first option, in declared order, whose leading marker
/// occurs anywhere in the completion. The model may preface its answer with
/// other text.
#[derive(Clone, Debug)]
pub struct Choice {
    context: String,
    options: Vec<List>,
}

impl Choice {
    /// Creates a choice introduced by `context`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `options` is empty or two options
    /// share a leading key.
    pub fn new(
        context: impl Into<String>,
        options: impl IntoIterator<Item = List>,
    ) -> ValidationResult<Self> {
        let options: Vec<List> = options.into_iter().collect();
        if options.is_empty() {
            return Err(ValidationError::EmptyItems { node: "choice" });
        }
        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(option.leading_key()) {
                return Err(ValidationError::DuplicateKey {
                    node: "choice",
                    key: option.leading_key().to_owned(),
                });
            }
        }
        Ok(Self {
            context: context.into(),
            options,
        })
    }

    /// Returns the declared options.
    #[must_use]
    pub fn options(&self) -> &[List] {
        &self.options
    }

    /// Returns a copy whose options all ask for a trailing `[[stop]]`.
    #[must_use]
    pub fn with_stop(&self) -> Self {
        Self {
            context: self.context.clone(),
            options: self.options.iter().map(List::with_stop).collect(),
        }
    }
}

impl Instruction for Choice {
    fn describe(&self) -> String {
        let options = self.options.iter().map(|option| Some(option.describe()));
        format!("{}{}", self.context, scope(&bullet_list(options, false)))
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        for option in &self.options {
            let leading = option.items()[0].marker();
            if text.contains(&leading) {
                return Ok(Value::Choice {
                    key: option.leading_key().to_owned(),
                    value: Box::new(option.extract(text)?),
                });
            }
        }
        Err(ExtractionError::NoOption {
            markers: self
                .options
                .iter()
                .map(|option| option.items()[0].marker())
                .collect(),
            text: text.to_owned(),
        })
    }
}

impl Terminable for Choice {
    fn terminated(&self) -> Arc<dyn Instruction> {
        Arc::new(self.with_stop())
    }
}
