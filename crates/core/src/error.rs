//! Error types for the evflat domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error variant. Conditions that only degrade a single row
//! are not errors; see [`crate::Warning`].

use thiserror::Error;

/// The top-level error type for all evflat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Event source errors ---
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    // --- Persistence errors ---
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    // --- Registry (trigger / filter) errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Failed to read input: {0}")]
    Read(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open sink at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Failed to write row for event {event}: {reason}")]
    Write { event: u64, reason: String },

    #[error("Failed to flush sink: {0}")]
    Flush(String),
}

/// Configuration-time failures of the trigger and filter registries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid pattern '{pattern}' for '{name}': {reason}")]
    InvalidPattern {
        name: String,
        pattern: String,
        reason: String,
    },

    #[error("Duplicate {registry} name: {name}")]
    DuplicateName { registry: String, name: String },

    #[error("Empty {registry} name at position {position}")]
    EmptyName { registry: String, position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_displays_correctly() {
        let err = Error::Registry(RegistryError::InvalidPattern {
            name: "dijet_170".into(),
            pattern: "HLT_(".into(),
            reason: "unclosed group".into(),
        });
        assert!(err.to_string().contains("dijet_170"));
        assert!(err.to_string().contains("unclosed group"));
    }

    #[test]
    fn sink_error_displays_correctly() {
        let err = Error::Sink(SinkError::Write {
            event: 4242,
            reason: "disk full".into(),
        });
        assert!(err.to_string().contains("4242"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn source_error_converts_into_top_level() {
        let err: Error = SourceError::Malformed {
            line: 7,
            reason: "expected value".into(),
        }
        .into();
        assert!(matches!(err, Error::Source(SourceError::Malformed { line: 7, .. })));
    }
}
