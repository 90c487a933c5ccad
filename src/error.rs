use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading a corpus and rendering a report.
#[derive(Error, Debug)]
pub enum DunningError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A frequency table whose counts sum to zero cannot be compared.
    #[error("frequency table for {0} contains no tokens")]
    EmptyTable(&'static str),

    #[error("corpus '{corpus}' does not contain '{field}' metadata")]
    MissingMetadata { corpus: String, field: String },

    #[error(
        "unknown part-of-speech filter '{0}' (expected adjectives, adverbs, verbs, pronouns or \
         a comma-separated list of tags)"
    )]
    UnknownPosFilter(String),

    /// The entry exists but could not be decoded. A missing entry is not an error.
    #[error("cache entry '{key}' is corrupt: {source}")]
    CacheCorrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("failed to read {}: {reason}", .path.display())]
    Document { path: PathBuf, reason: String },

    #[error("invalid frequency table {}: {reason}", .path.display())]
    InvalidTable { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, DunningError>;

impl DunningError {
    pub(crate) fn document(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DunningError::Document {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_table(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DunningError::InvalidTable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
