use prompter_primitives::Message;
use sha2::{Digest, Sha256};

/// Computes the cache key of a conversation.
///
/// The digest covers every message in order: its role, a NUL separator, the
/// content length and the content itself. The key is sensitive to order, role
/// and content, and is rendered as 64 lowercase hex characters.
#[must_use]
pub fn cache_key(messages: &[Message]) -> String {
    let mut hasher = Sha256::new();
    for message in messages {
        let content = message.content().as_bytes();
        hasher.update(message.role().as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(content);
    }
    format!("{:x}", hasher.finalize())
}

pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_conversations_share_a_key() {
        let a = [Message::developer("rules"), Message::user("hi")];
        let b = a.clone();
        assert_eq!(cache_key(&a), cache_key(&b));
        assert_eq!(cache_key(&a).len(), 64);
        assert!(is_valid_key(&cache_key(&a)));
    }

    #[test]
    fn key_is_sensitive_to_role_order_and_content() {
        let base = cache_key(&[Message::user("a"), Message::assistant("b")]);
        assert_ne!(base, cache_key(&[Message::assistant("a"), Message::assistant("b")]));
        assert_ne!(base, cache_key(&[Message::assistant("b"), Message::user("a")]));
        assert_ne!(base, cache_key(&[Message::user("a"), Message::assistant("c")]));
    }

    #[test]
    fn message_boundaries_are_part_of_the_key() {
        let split = cache_key(&[Message::user("ab"), Message::user("c")]);
        let joined = cache_key(&[Message::user("a"), Message::user("bc")]);
        assert_ne!(split, joined);
    }

    #[test]
    fn rejects_non_hex_keys() {
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("ABCDEF"));
    }
}
