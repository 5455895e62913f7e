//! Error types for the lfukit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are invalid
//!   (zero capacity, out-of-range or NaN eviction factor).
//!
//! Construction is the only fallible surface: absent-key lookups are normal
//! `None` results, and every operation on a constructed cache completes
//! deterministically.
//!
//! ## Example Usage
//!
//! ```
//! use lfukit::error::ConfigError;
//! use lfukit::policy::lfu::LfuCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<LfuCache<String, i32>, ConfigError> = LfuCache::try_new(100, 0.25);
//! assert!(cache.is_ok());
//!
//! // Invalid factor is caught without panicking
//! let bad = LfuCache::<String, i32>::try_new(100, 2.0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Error returned when cache construction parameters are invalid.
///
/// Produced by the fallible `try_new` constructors. Carries a human-readable
/// description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use lfukit::policy::lfu::LfuCache;
///
/// let err = LfuCache::<u64, u64>::try_new(0, 0.5).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn debug_includes_message() {
        let err = ConfigError::new("bad factor");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad factor"));
    }

    #[test]
    fn message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
