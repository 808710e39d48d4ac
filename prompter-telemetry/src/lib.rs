//! Observability for prompting sessions.
//!
//! Every message appended to a conversation is reported to a [`Logger`] as a
//! [`LogEvent`]. The sinks in [`sinks`] cover the usual destinations, and
//! [`init_tracing`] installs the process-wide `tracing` subscriber used by the
//! default [`TracingLogger`](sinks::TracingLogger).

#![warn(missing_docs, clippy::pedantic)]

mod cropping;
mod event;
pub mod sinks;
mod subscriber;

pub use cropping::CroppingLogger;
pub use event::{DEFAULT_PADDING, LogEvent, Logger, format_event};
pub use sinks::{FileLogger, FnLogger, ListLogger, PrintLogger, TracingLogger};
pub use subscriber::{init_tracing, init_tracing_with};
