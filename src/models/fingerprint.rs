//! Content fingerprints used as history keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a document's raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Length of the hex representation.
    pub const HEX_LEN: usize = 64;

    /// Compute the fingerprint of a byte sequence.
    pub fn compute(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a stored hex digest, rejecting anything that is not 64 hex characters.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() == Self::HEX_LEN && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(hex.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines and file names.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a byte sequence.
pub fn fingerprint(content: &[u8]) -> ContentFingerprint {
    ContentFingerprint::compute(content)
}
