//! Error types for pattern construction
//!
//! This module provides error handling using the `thiserror` crate.
//! Every failure is raised by the single construction call that caused it;
//! none of them is transient, so there is nothing to retry.

use thiserror::Error;

/// The main error type for pattern construction and execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// A character range whose start sorts after its stop
    #[error("invalid range: {start:?} sorts after {stop:?}")]
    InvalidRange {
        /// First character of the requested range
        start: char,
        /// Last character of the requested range
        stop: char,
    },

    /// A repetition request whose maximum is below its minimum
    #[error("invalid quantifier: maximum {max} is below minimum {min}")]
    InvalidQuantifier {
        /// Requested minimum count
        min: u32,
        /// Requested maximum count
        max: u32,
    },

    /// A pattern string the engine refused to compile
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The pattern source handed to the engine
        pattern: String,
        /// The engine's explanation
        message: String,
    },

    /// Contradictory or malformed combinator arguments
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A construct the selected engine dialect cannot express
    #[error("{construct} is not supported by the {dialect} dialect")]
    UnsupportedConstruct {
        /// Name of the requested construct
        construct: &'static str,
        /// Name of the dialect that lacks it
        dialect: &'static str,
    },

    /// Errors reported by the engine while executing a compiled pattern
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl FactoryError {
    pub(crate) fn invalid_pattern(pattern: &str, message: impl ToString) -> Self {
        FactoryError::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for pattern operations
pub type Result<T> = std::result::Result<T, FactoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_display() {
        let err = FactoryError::InvalidRange {
            start: 'z',
            stop: 'a',
        };
        assert_eq!(err.to_string(), "invalid range: 'z' sorts after 'a'");
    }

    #[test]
    fn test_invalid_quantifier_display() {
        let err = FactoryError::InvalidQuantifier { min: 4, max: 2 };
        assert_eq!(
            err.to_string(),
            "invalid quantifier: maximum 2 is below minimum 4"
        );
    }

    #[test]
    fn test_invalid_pattern_display() {
        let err = FactoryError::invalid_pattern("(a", "unclosed group");
        assert_eq!(err.to_string(), "invalid pattern \"(a\": unclosed group");
    }

    #[test]
    fn test_configuration_display() {
        let err = FactoryError::Configuration("a group name needs a capturing group".into());
        assert_eq!(
            err.to_string(),
            "configuration error: a group name needs a capturing group"
        );
    }

    #[test]
    fn test_unsupported_construct_display() {
        let err = FactoryError::UnsupportedConstruct {
            construct: "lookahead",
            dialect: "linear",
        };
        assert_eq!(
            err.to_string(),
            "lookahead is not supported by the linear dialect"
        );
    }

    #[test]
    fn test_runtime_display() {
        let err = FactoryError::Runtime("backtrack limit exceeded".into());
        assert_eq!(err.to_string(), "runtime error: backtrack limit exceeded");
    }
}
