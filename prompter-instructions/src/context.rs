//! Framing prose around a nested instruction.

use std::sync::Arc;

use crate::{ExtractionResult, Instruction, Terminable, Value};

/// Wraps a child description in a prefix and optional suffix. Extraction is
/// delegated to the child unchanged.
///
/// A context built with [`Context::terminable`] keeps the child's concrete
/// type and is itself [`Terminable`], so it can frame the outermost
/// instruction of a structured reply.
#[derive(Debug)]
pub struct Context<C: ?Sized = dyn Instruction> {
    prefix: String,
    child: Arc<C>,
    suffix: Option<String>,
}

impl<C: ?Sized> Clone for Context<C> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            child: Arc::clone(&self.child),
            suffix: self.suffix.clone(),
        }
    }
}

impl Context {
    /// Frames `child` with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, child: impl Instruction + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            child: Arc::new(child),
            suffix: None,
        }
    }
}

impl<C: Terminable> Context<C> {
    /// Frames a terminable `child` with `prefix`.
    #[must_use]
    pub fn terminable(prefix: impl Into<String>, child: C) -> Self {
        Self {
            prefix: prefix.into(),
            child: Arc::new(child),
            suffix: None,
        }
    }
}

impl<C: ?Sized> Context<C> {
    /// Appends `suffix` after the child description.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl<C: Instruction + ?Sized> Instruction for Context<C> {
    fn describe(&self) -> String {
        let mut text = format!("{}{}", self.prefix, self.child.describe());
        if let Some(suffix) = &self.suffix {
            text.push_str(suffix);
        }
        text
    }

    fn extract(&self, text: &str) -> ExtractionResult<Value> {
        self.child.extract(text)
    }
}

impl<C: Terminable + ?Sized> Terminable for Context<C> {
    fn terminated(&self) -> Arc<dyn Instruction> {
        Arc::new(Context::<dyn Instruction> {
            prefix: self.prefix.clone(),
            child: self.child.terminated(),
            suffix: self.suffix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Data, Item, List};

    #[test]
    fn frames_child_and_delegates_extraction() {
        let context = Context::new("You are a calculator.\n", Data::text("Write the result"))
            .with_suffix("\nNo prose.");
        assert_eq!(
            context.describe(),
            "You are a calculator.\nWrite the result\nNo prose."
        );
        assert_eq!(context.extract(" 7 ").unwrap(), Value::Text("7".into()));
    }

    #[test]
    fn terminable_child_terminates_through_the_frame() {
        let list = List::new("Answer", [Item::new("reasoning"), Item::new("answer")]).unwrap();
        let context = Context::terminable("You are careful.\n", list).with_suffix("\nBe brief.");

        let terminated = context.terminated();
        let description = terminated.describe();
        assert!(description.starts_with("You are careful.\n"));
        assert!(description.contains("[[stop]]"));
        assert!(description.ends_with("\nBe brief."));
        assert!(!context.describe().contains("[[stop]]"));

        assert_eq!(
            terminated.extract("thinking [[answer]] 42 [[stop]]").unwrap(),
            Value::List(vec!["thinking".into(), "42".into()])
        );
        assert!(terminated.extract("thinking [[answer]] 42").is_err());
    }
}
