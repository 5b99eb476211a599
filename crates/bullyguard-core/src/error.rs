//! Error types for BullyGuard

/// Result type alias using BullyGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for BullyGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classification failed on an internal inconsistency
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Training data was missing or degenerate
    #[error("training error: {0}")]
    Training(String),

    /// A persisted model could not be decoded or failed validation
    #[error("model corrupt: {0}")]
    ModelCorrupt(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new corrupt-model error
    pub fn model_corrupt(msg: impl Into<String>) -> Self {
        Self::ModelCorrupt(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::training("single class").to_string(),
            "training error: single class"
        );
        assert_eq!(
            Error::model_corrupt("bad header").to_string(),
            "model corrupt: bad header"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
