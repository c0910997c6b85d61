use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Round-robin rotation over an ordered set of API credentials.
///
/// Clones share a single cursor, so every caller in the process observes
/// the same rotation position. A request that exhausts its attempts leaves
/// the cursor where it stopped; the next request starts from there rather
/// than retrying a just-failed credential first.
#[derive(Debug, Clone)]
pub struct CredentialRotator {
    keys: Arc<Vec<String>>,
    cursor: Arc<Mutex<usize>>,
}

impl CredentialRotator {
    /// Construction rejects an empty credential set so that `current()`
    /// never has to fail.
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::Config(
                "Credential set cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            keys: Arc::new(keys),
            cursor: Arc::new(Mutex::new(0)),
        })
    }

    /// The credential at the current cursor position.
    pub fn current(&self) -> String {
        let cursor = self.cursor.lock();
        self.keys[*cursor].clone()
    }

    /// Move the cursor to the next credential, wrapping modulo length.
    pub fn advance(&self) {
        let mut cursor = self.cursor.lock();
        *cursor = (*cursor + 1) % self.keys.len();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Cursor position, exposed for diagnostics and tests.
    pub fn position(&self) -> usize {
        *self.cursor.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_set() {
        assert!(CredentialRotator::new(vec![]).is_err());
    }

    #[test]
    fn test_round_robin_wraps() {
        let rotator = CredentialRotator::new(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ])
        .unwrap();

        assert_eq!(rotator.current(), "a");
        rotator.advance();
        assert_eq!(rotator.current(), "b");
        rotator.advance();
        assert_eq!(rotator.current(), "c");
        rotator.advance();
        assert_eq!(rotator.current(), "a");
    }

    #[test]
    fn test_clones_share_cursor() {
        let rotator = CredentialRotator::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        let other = rotator.clone();

        other.advance();
        assert_eq!(rotator.current(), "b");
        assert_eq!(rotator.position(), other.position());
    }

    #[test]
    fn test_single_credential() {
        let rotator = CredentialRotator::new(vec!["only".to_string()]).unwrap();
        rotator.advance();
        assert_eq!(rotator.current(), "only");
        assert_eq!(rotator.len(), 1);
    }
}
