//! Conversation messages exchanged with a model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::text::pad;

/// Author of a conversational turn.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions from the application developer.
    Developer,
    /// Content authored by the end user.
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Returns the lowercase wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        match s {
            "developer" => Ok(Self::Developer),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ValidationError::InvalidRole { role: other.into() }),
        }
    }
}

/// One immutable conversational turn.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Creates a message authored by `role`.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a message from a textual role name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRole`] if `role` is not one of the
    /// supported roles.
    pub fn try_new(role: &str, content: impl Into<String>) -> ValidationResult<Self> {
        Ok(Self::new(role.parse()?, content))
    }

    /// Shorthand for a [`Role::Developer`] message.
    #[must_use]
    pub fn developer(content: impl Into<String>) -> Self {
        Self::new(Role::Developer, content)
    }

    /// Shorthand for a [`Role::User`] message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for a [`Role::Assistant`] message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Returns the author role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the message content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content length in characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Aggregate content length of a sequence, in characters.
    #[must_use]
    pub fn total_len(messages: &[Message]) -> usize {
        messages.iter().map(Message::len_chars).sum()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:\n{}",
            self.role.as_str().to_uppercase(),
            pad(&self.content, " | ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!("developer".parse::<Role>().unwrap(), Role::Developer);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = Message::try_new("system", "hi").expect_err("system is not allowed");
        assert_eq!(
            err,
            ValidationError::InvalidRole {
                role: "system".into()
            }
        );
    }

    #[test]
    fn total_length_counts_characters() {
        let messages = vec![Message::user("héllo"), Message::assistant("abc")];
        assert_eq!(Message::total_len(&messages), 8);
        assert_eq!(Message::total_len(&[]), 0);
    }

    #[test]
    fn display_pads_content() {
        let message = Message::developer("one\ntwo");
        assert_eq!(message.to_string(), "DEVELOPER:\n | one\n | two");
    }

    #[test]
    fn deserialization_rejects_unknown_role() {
        let ok: Message = serde_json::from_str(r#"{"role":"user","content":"x"}"#).unwrap();
        assert_eq!(ok.role(), Role::User);

        let bad = serde_json::from_str::<Message>(r#"{"role":"tool","content":"x"}"#);
        assert!(bad.is_err());
    }
}
