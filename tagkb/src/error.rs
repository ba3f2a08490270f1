//! Error types for knowledge base loading

use std::path::PathBuf;

use prefix_tags::ErrorKind;
use thiserror::Error;

/// Failure to turn a knowledge base file into an index.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("failed to read knowledge base {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON array of records
    #[error("knowledge base is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// One record holds an invalid network or tag
    #[error("record {index} (network {network:?}, tag {tag:?}): {source}")]
    Record {
        index: usize,
        network: String,
        tag: String,
        #[source]
        source: prefix_tags::Error,
    },
}

impl LoadError {
    /// Validation kind of the offending record, if a record was at fault.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            LoadError::Record { source, .. } => Some(source.kind()),
            LoadError::Io { .. } | LoadError::Json(_) => None,
        }
    }
}
