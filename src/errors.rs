use thiserror::Error;

/// Errors that can occur while validating an add-on submission.
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// The add-on URL breaks the local contract (scheme or extension).
    /// Raised before any network activity.
    #[error("invalid add-on url '{url}': {reason}")]
    InputContract { url: String, reason: String },

    /// The download did not complete successfully.
    #[error("download of '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The metadata file does not conform to the schema document.
    #[error("Add-on metadata is not valid:\n{}", violations.join("\n"))]
    SchemaViolation { violations: Vec<String> },

    /// The archive is corrupt or its manifest is absent or malformed.
    #[error("format error: {message}")]
    Format { message: String },

    /// Content discrepancies between metadata, checksum and manifest.
    #[error("{}", errors.join("\n"))]
    Validation { errors: Vec<String> },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidatorError {
    /// Shorthand for a [`ValidatorError::Format`] with the given message.
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Convenience alias for `Result<T, ValidatorError>`.
pub type Result<T> = std::result::Result<T, ValidatorError>;
