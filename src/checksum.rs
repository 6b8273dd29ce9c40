//! Checksum utilities for fingerprinting trees and generated artifacts

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 checksum of some content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a string
    pub fn from_str(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute checksum from JSON value (canonicalized)
    pub fn from_json(value: &serde_json::Value) -> Self {
        // Map keys are sorted, so compact serialization is canonical
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_str(&canonical)
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, content: &str) -> bool {
        let computed = Self::from_str(content);
        self.0 == computed.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = "volt:dc\nfreq\n";
        assert_eq!(Checksum::from_str(content), Checksum::from_str(content));
    }

    #[test]
    fn test_checksum_different_content() {
        assert_ne!(Checksum::from_str("volt:dc"), Checksum::from_str("volt:ac"));
    }

    #[test]
    fn test_checksum_verification() {
        let content = r#"{"tree":{}}"#;
        let checksum = Checksum::from_str(content);
        assert!(checksum.verify(content));
        assert!(!checksum.verify("different content"));
    }

    #[test]
    fn test_display_and_short() {
        let checksum = Checksum::from_str("");
        assert!(checksum.to_string().starts_with("sha256:e3b0c44298fc"));
        assert_eq!(checksum.short(), "e3b0c44298fc");
    }
}
