//! Change detection for polled files
//!
//! Results and status are re-read every poll; decoding and diffing only
//! happen when the content digest moved.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of file content
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Remembers the digest of the last content seen
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: Option<[u8; 32]>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `bytes` differ from the previous call's; records them
    pub fn changed(&mut self, bytes: &[u8]) -> bool {
        let digest: [u8; 32] = Sha256::digest(bytes).into();
        if self.last == Some(digest) {
            return false;
        }
        self.last = Some(digest);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<String> {
        self.last.map(hex::encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_change_detection() {
        let mut detector = ChangeDetector::new();
        assert!(detector.changed(b"{\"results\":[]}"));
        assert!(!detector.changed(b"{\"results\":[]}"));
        assert!(detector.changed(b"{\"results\":[{}]}"));
        assert_eq!(detector.last(), Some(fingerprint(b"{\"results\":[{}]}")));

        detector.reset();
        assert!(detector.changed(b"{\"results\":[{}]}"));
    }
}
