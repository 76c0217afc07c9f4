//! Sensitive data marker for automatic redaction
//!
//! The `Sensitive<T>` wrapper ensures that sensitive data (bind passwords,
//! user passwords read from entries) is never accidentally logged or displayed.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use dirmap_core_types::Sensitive;
///
/// let password = Sensitive::new("secret123");
/// println!("{:?}", password); // Prints: ***REDACTED***
/// println!("{}", password);   // Prints: ***REDACTED***
///
/// // Access the actual value when needed
/// assert_eq!(password.expose(), &"secret123");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Use this method sparingly and only when the sensitive data
    /// must be accessed (e.g., for the bind operation).
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Default> Default for Sensitive<T> {
    fn default() -> Self {
        Self(T::default())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("my-secret-password");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("my-secret-password"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let secret = Sensitive::new("bind-pw-12345");
        let display_str = format!("{}", secret);
        assert_eq!(display_str, "***REDACTED***");
        assert!(!display_str.contains("bind-pw"));
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("test"));
        assert_eq!(secret.expose(), "test");
        assert_eq!(secret.into_inner(), "test");
    }

    #[test]
    fn test_sensitive_deserializes_transparently() {
        let secret: Sensitive<String> = serde_json::from_str("\"hunter2\"").unwrap();
        assert_eq!(secret.expose(), "hunter2");

        let secret: Sensitive<String> = serde_yaml::from_str("hunter2").unwrap();
        assert_eq!(format!("{:?}", secret), "***REDACTED***");
    }

    #[test]
    fn test_sensitive_with_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Bind {
            dn: String,
            password: Sensitive<String>,
        }

        let bind = Bind {
            dn: "cn=manager,dc=example,dc=com".to_string(),
            password: Sensitive::new("secret123".to_string()),
        };

        let debug_str = format!("{:?}", bind);
        assert!(debug_str.contains("cn=manager"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("secret123"));
    }
}
