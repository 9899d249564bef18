//! Error types for add-on packaging

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for packaging operations.
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Errors that abort a packaging run.
///
/// Every variant names the file, field or key that caused it. None of them
/// are recoverable at the packaging level: a run that fails produces no
/// valid package.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// A required identity field is missing or malformed
    #[error("Invalid metadata field `{field}`: {reason}")]
    InvalidMetadata { field: String, reason: String },

    /// A template references a placeholder the substitution mapping lacks
    #[error("Template {file} references unknown placeholder `{key}`")]
    MissingPlaceholder { file: String, key: String },

    /// No template is stored under the logical path
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A text template is not valid UTF-8
    #[error("Template {0} is not valid UTF-8")]
    InvalidTemplateEncoding(String),

    /// Metadata file could not be parsed
    #[error("Failed to parse metadata file: {0}")]
    MetadataFile(#[from] serde_json::Error),

    /// Reading a template or writing the package failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The zip container rejected an entry
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl PackagerError {
    pub(crate) fn invalid_metadata(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
