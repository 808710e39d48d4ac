//! Structured values recovered from completions.

/// Dynamic value produced by [`Instruction::extract`](crate::Instruction::extract).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Plain text, usually a trimmed slice.
    Text(String),
    /// Structured output of a parsing leaf.
    Json(serde_json::Value),
    /// Ordered values of a list, a repetition group, or a repetition.
    List(Vec<Value>),
    /// The option a choice resolved to.
    Choice {
        /// Leading key of the chosen option.
        key: String,
        /// Extracted value of the chosen option.
        value: Box<Value>,
    },
}

impl Value {
    /// Returns the text if this is [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the JSON payload if this is [`Value::Json`].
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Returns the elements if this is [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Consumes the value, returning the elements if this is [`Value::List`].
    #[must_use]
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the key and inner value if this is [`Value::Choice`].
    #[must_use]
    pub fn as_choice(&self) -> Option<(&str, &Value)> {
        match self {
            Self::Choice { key, value } => Some((key, value)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}
