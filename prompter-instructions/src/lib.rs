//! Composable instructions that tell a model how to format its reply and
//! parse that reply back into structured values.
//!
//! Every node renders itself with [`Instruction::describe`] into prose
//! annotated with markers such as `[[answer]]`, and recovers values with
//! [`Instruction::extract`] by locating the same markers in the completion.
//! Markers are found by plain ordered substring search, so marker text must
//! never occur incidentally in the content a model writes between them.
//!
//! ```
//! use prompter_instructions::{Data, Instruction, Item, List, Value};
//!
//! let list = List::new(
//!     "Answer the question",
//!     [Item::new("think"), Item::with("answer", Data::text("Write the answer"))],
//! )
//! .unwrap();
//!
//! let value = list.extract("[[think]] easy [[answer]] 42").unwrap();
//! assert_eq!(value, Value::List(vec!["easy".into(), "42".into()]));
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod choice;
mod context;
mod data;
mod error;
mod instruction;
mod list;
mod repetition;
mod value;

pub use choice::Choice;
pub use context::Context;
pub use data::{Code, Data, Text, extract_code};
pub use error::{ExtractionError, ExtractionResult};
pub use instruction::{Instruction, STOP_KEY, Terminable, stop_marker};
pub use list::{Item, List};
pub use repetition::Repetition;
pub use value::Value;
