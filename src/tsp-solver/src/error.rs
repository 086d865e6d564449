//! Error types for the colony.
//!
//! Every fallible operation returns `AcoResult<T>`; any error aborts the run.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type AcoResult<T> = Result<T, AcoError>;

#[derive(Debug, Error)]
pub enum AcoError {
    /// The distance matrix cannot describe a tour problem.
    #[error("invalid distance matrix: {message}")]
    InvalidInput { message: String },

    /// Roulette selection found nothing to choose from.
    #[error("ant {ant_id} has no reachable city from {from} ({remaining} unvisited)")]
    NoReachableCity {
        ant_id: usize,
        from: usize,
        remaining: usize,
    },

    /// A colony parameter is out of range.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// An instance file could not be parsed.
    #[error("parse error at line {line}: {cause}")]
    Parse { line: usize, cause: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl AcoError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn parse(line: usize, cause: impl Into<String>) -> Self {
        Self::Parse {
            line,
            cause: cause.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = AcoError::invalid_input("matrix is 2x3");
        let msg = err.to_string();
        assert!(msg.contains("invalid distance matrix"));
        assert!(msg.contains("2x3"));
    }

    #[test]
    fn test_no_reachable_city_display() {
        let err = AcoError::NoReachableCity {
            ant_id: 3,
            from: 7,
            remaining: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("ant 3"));
        assert!(msg.contains("from 7"));
        assert!(msg.contains("2 unvisited"));
    }

    #[test]
    fn test_config_display() {
        let err = AcoError::config("ant_count must be positive");
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "brazil58.tsp");
        let err: AcoError = io.into();
        assert!(matches!(err, AcoError::Io(_)));
        assert!(err.to_string().contains("brazil58.tsp"));
    }
}
