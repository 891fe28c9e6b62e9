//! Container identifiers and error definitions.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Stable identifier of a container instance within a namespace binding.
///
/// Derived from the binding and the instance name, so the same pair always
/// yields the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    /// Derive the identifier for `name` under `binding`.
    pub fn from_name(binding: &str, name: &str) -> Result<Self, ForwardError> {
        if name.is_empty() {
            return Err(ForwardError::InvalidName("name must not be empty".to_string()));
        }

        let mut hasher = Sha256::new();
        hasher.update(binding.as_bytes());
        hasher.update(b":");
        hasher.update(name.as_bytes());

        let hex: String = hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect();
        Ok(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure while resolving, acquiring or calling a container.
///
/// Every variant ends up as the same 500 envelope; the variants only carry
/// the message that is reported back to the client.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Instance name could not be turned into an identifier.
    #[error("invalid container name: {0}")]
    InvalidName(String),

    /// No handle could be obtained for the identifier.
    #[error("container unavailable: {0}")]
    Unavailable(String),

    /// Transport failure talking to the container.
    #[error("{0}")]
    Upstream(String),

    /// Container did not answer within the request timeout.
    #[error("container timed out after {0}s")]
    Timeout(u64),

    /// Container answered with something that is not a usable HTTP response.
    #[error("malformed container response: {0}")]
    MalformedResponse(String),

    /// A diagnostic header could not be encoded.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_resolves_to_same_id() {
        let a = ContainerId::from_name("BENTO", "bento-processor-1").unwrap();
        let b = ContainerId::from_name("BENTO", "bento-processor-1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn id_is_lowercase_hex_digest() {
        let id = ContainerId::from_name("BENTO", "bento-processor-1").unwrap();
        assert_eq!(id.as_str().len(), 64);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn binding_and_name_both_affect_id() {
        let base = ContainerId::from_name("BENTO", "bento-processor-1").unwrap();
        let other_name = ContainerId::from_name("BENTO", "bento-processor-2").unwrap();
        let other_binding = ContainerId::from_name("OTHER", "bento-processor-1").unwrap();
        assert_ne!(base, other_name);
        assert_ne!(base, other_binding);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ContainerId::from_name("BENTO", "").unwrap_err();
        assert!(matches!(err, ForwardError::InvalidName(_)));
    }

    #[test]
    fn upstream_error_displays_raw_message() {
        let err = ForwardError::Upstream("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn timeout_displays_elapsed_seconds() {
        assert_eq!(ForwardError::Timeout(1).to_string(), "container timed out after 1s");
    }
}
