use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use prompter_primitives::Message;

use crate::event::{LogEvent, Logger};

/// Wraps a logger and shortens selected upcoming messages.
///
/// A crop registered with `offset` applies to the message logged `offset`
/// events from now; its content is cut to `limit` lines followed by a
/// `... (k line(s) cropped)` note.
pub struct CroppingLogger {
    inner: Arc<dyn Logger>,
    limits: Mutex<BTreeMap<usize, usize>>,
}

impl fmt::Debug for CroppingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CroppingLogger").finish_non_exhaustive()
    }
}

impl CroppingLogger {
    /// Wraps `inner` without any pending crop.
    #[must_use]
    pub fn new(inner: Arc<dyn Logger>) -> Self {
        Self {
            inner,
            limits: Mutex::new(BTreeMap::new()),
        }
    }

    /// Crops the message logged `offset` events from now to `limit` lines.
    /// Overlapping crops keep the smaller limit.
    pub fn add_crop(&self, limit: usize, offset: usize) {
        let mut limits = self.limits.lock().unwrap_or_else(PoisonError::into_inner);
        limits
            .entry(offset)
            .and_modify(|current| *current = (*current).min(limit))
            .or_insert(limit);
    }

    fn next_limit(&self) -> Option<usize> {
        let mut limits = self.limits.lock().unwrap_or_else(PoisonError::into_inner);
        let current = limits.remove(&0);
        *limits = limits
            .iter()
            .map(|(offset, limit)| (offset - 1, *limit))
            .collect();
        current
    }
}

fn crop(content: &str, limit: usize) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= limit {
        return None;
    }
    let hidden = lines.len() - limit;
    let mut kept = lines[..limit].join("\n");
    if limit > 0 {
        kept.push('\n');
    }
    kept.push_str(&format!("... ({hidden} line(s) cropped)"));
    Some(kept)
}

impl Logger for CroppingLogger {
    fn log(&self, event: &LogEvent<'_>) {
        let cropped = self
            .next_limit()
            .and_then(|limit| crop(event.message.content(), limit))
            .map(|content| Message::new(event.message.role(), content));

        match &cropped {
            Some(message) => self.inner.log(&LogEvent::new(message, event.index, event.tag)),
            None => self.inner.log(event),
        }
    }

    fn close(&self) {
        self.inner.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnLogger;

    fn capture() -> (Arc<Mutex<Vec<String>>>, Arc<dyn Logger>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let logger = FnLogger::new(move |line| sink.lock().unwrap().push(line.to_owned()));
        (seen, Arc::new(logger))
    }

    #[test]
    fn crops_only_the_targeted_message() {
        let (seen, inner) = capture();
        let logger = CroppingLogger::new(inner);
        logger.add_crop(1, 1);

        let long = Message::user("a\nb\nc");
        logger.log(&LogEvent::new(&long, 0, None));
        logger.log(&LogEvent::new(&long, 1, None));
        logger.log(&LogEvent::new(&long, 2, None));

        let seen = seen.lock().unwrap();
        assert!(seen[0].ends_with("  a\n  b\n  c"));
        assert!(seen[1].ends_with("  a\n  ... (2 line(s) cropped)"));
        assert!(seen[2].ends_with("  a\n  b\n  c"));
    }

    #[test]
    fn overlapping_crops_keep_the_smaller_limit() {
        let (seen, inner) = capture();
        let logger = CroppingLogger::new(inner);
        logger.add_crop(2, 0);
        logger.add_crop(0, 0);

        logger.log(&LogEvent::new(&Message::user("x\ny"), 0, None));
        assert!(seen.lock().unwrap()[0].ends_with("  ... (2 line(s) cropped)"));
    }

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(crop("one\ntwo", 2), None);
    }
}
