//! Secret value containers

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret string that is zeroed on drop and never printed
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue {
    data: String,
}

impl SecretValue {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Expose the string data (use with caution)
    pub fn expose(&self) -> &str {
        &self.data
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue([REDACTED {} bytes])", self.data.len())
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for SecretValue {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl ZeroizeOnDrop for SecretValue {}

/// A named secret retrieved from the vault
#[derive(Debug, Clone)]
pub struct Secret {
    pub name: String,
    pub value: SecretValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_value_redacts() {
        let value = SecretValue::new("s3cr3t-value");
        assert_eq!(value.expose(), "s3cr3t-value");

        let debug = format!("{:?}", value);
        assert!(debug.contains("[REDACTED 12 bytes]"));
        assert!(!debug.contains("s3cr3t"));
        assert_eq!(format!("{}", value), "[REDACTED]");
    }

    #[test]
    fn test_secret_debug_hides_value() {
        let secret = Secret {
            name: "api-key".to_string(),
            value: SecretValue::new("abcdef123456"),
        };
        let debug = format!("{:?}", secret);
        assert!(debug.contains("api-key"));
        assert!(!debug.contains("abcdef123456"));
    }
}
