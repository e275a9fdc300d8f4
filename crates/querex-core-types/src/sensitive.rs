//! Redaction marker for client-supplied values
//!
//! Filter values arrive from untrusted callers (search boxes, query strings)
//! and can carry personal data. `Sensitive<T>` keeps them out of log lines and
//! error displays while still letting the engine inspect them.

use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Wrapper that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use querex_core_types::Sensitive;
///
/// let raw = Sensitive::new("alice@example.com");
/// assert_eq!(format!("{}", raw), "***REDACTED***");
/// assert_eq!(raw.expose(), &"alice@example.com");
/// ```
#[derive(Clone, PartialEq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("bob@example.com");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, REDACTED);
        assert!(!debug_str.contains("bob"));
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("42"));
        assert_eq!(secret.expose(), "42");
        assert_eq!(secret.into_inner(), "42");
    }

    #[test]
    fn test_sensitive_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Descriptor {
            path: String,
            value: Sensitive<String>,
        }

        let d = Descriptor {
            path: "Customer.Email".to_string(),
            value: Sensitive::new("carol@example.com".to_string()),
        };

        let debug_str = format!("{:?}", d);
        assert!(debug_str.contains("Customer.Email"));
        assert!(debug_str.contains(REDACTED));
        assert!(!debug_str.contains("carol"));
    }

    #[test]
    fn test_sensitive_equality_compares_inner() {
        assert_eq!(Sensitive::new(1), Sensitive::new(1));
        assert_ne!(Sensitive::new(1), Sensitive::new(2));
    }
}
