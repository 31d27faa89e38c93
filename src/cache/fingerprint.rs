//! Content fingerprints for build inputs
//!
//! A fingerprint is the SHA256 of the configuration bytes followed by the
//! query bytes, rendered as lowercase hex. Same inputs = same workspace.

use crate::error::{PlayError, PlayResult};
use sha2::{Digest, Sha256};
use std::fmt;

/// Raw digest length in bytes
pub const DIGEST_LEN: usize = 32;

/// Content-derived cache key and public handle for a build
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash `config` then `query`, in that order
    pub fn compute(config: &[u8], query: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(config);
        hasher.update(query);
        Self(hex::encode(hasher.finalize()))
    }

    /// Validate an untrusted handle before it is used as a path component
    ///
    /// Accepts exactly `DIGEST_LEN` bytes of hex in either case and
    /// normalizes to lowercase.
    pub fn parse(value: &str) -> PlayResult<Self> {
        let raw = hex::decode(value)
            .map_err(|_| PlayError::InvalidFingerprint("hex decode failed".to_string()))?;

        if raw.len() != DIGEST_LEN {
            return Err(PlayError::InvalidFingerprint(format!("length {}", raw.len())));
        }

        Ok(Self(hex::encode(raw)))
    }

    /// Hex form of the fingerprint
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
