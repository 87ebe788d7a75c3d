//! Error types for the replacer engine

use thiserror::Error;

/// Failure to decode a persisted rule-set document.
///
/// Any syntax error fails the whole document; nothing is partially applied.
#[derive(Debug, Error)]
#[error("Invalid rules JSON at line {line}, column {column}: {reason}")]
pub struct DecodeError {
    pub line: usize,
    pub column: usize,
    pub reason: String,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    /// True when the text ended before the document was complete
    /// (unbalanced brackets, unterminated strings).
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            line: error.line(),
            column: error.column(),
            reason: error.to_string(),
            source: error,
        }
    }
}

/// Main error type for replacer operations
#[derive(Debug, Error)]
pub enum ReplacerError {
    #[error("Malformed rules document: {0}")]
    MalformedJson(#[from] DecodeError),

    #[error("Malformed HTTP request: {reason}")]
    MalformedRequest { reason: String },

    #[error("Rule not found: {name}")]
    RuleNotFound { name: String },

    #[error("Index out of range: {what} {index} (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Rule {rule} must keep at least one entry")]
    LastEntry { rule: String },

    #[error("Serialization error: {error}")]
    Serialization { error: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error classes, used by hosts to decide how to report a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The user handed us something we cannot read
    Input,
    /// The command does not fit the current store contents
    State,
    /// Filesystem or serializer trouble
    Io,
}

impl ReplacerError {
    /// Create a malformed request error
    pub fn malformed_request(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Create a rule lookup error
    pub fn rule_not_found(name: &str) -> Self {
        Self::RuleNotFound {
            name: name.to_string(),
        }
    }

    /// Create an index error
    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { what, index, len }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReplacerError::MalformedJson(_) => ErrorCategory::Input,
            ReplacerError::MalformedRequest { .. } => ErrorCategory::Input,
            ReplacerError::RuleNotFound { .. } => ErrorCategory::State,
            ReplacerError::IndexOutOfRange { .. } => ErrorCategory::State,
            ReplacerError::LastEntry { .. } => ErrorCategory::State,
            ReplacerError::Serialization { .. } => ErrorCategory::Io,
            ReplacerError::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether the caller should show the message to the user and abandon
    /// the operation without touching existing state
    pub fn is_user_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Input | ErrorCategory::State)
    }
}

/// Result type alias for replacer operations
pub type Result<T> = std::result::Result<T, ReplacerError>;
