//! Error types for netmusic-core

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for Netmusic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the Netmusic pipeline.
///
/// Marked `#[non_exhaustive]` so new failure kinds can be added without
/// breaking downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O failure on a specific file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that was being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A value could not be parsed into its declared type.
    #[error("Parse error: {message}")]
    Parse {
        /// What failed to parse, and where.
        message: String,
    },

    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. "node").
        kind: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// An edge references a node that was never declared.
    #[error("Dangling reference: {from} -[{relationship}]-> {to}")]
    DanglingReference {
        /// Source node ID.
        from: String,
        /// Target node ID.
        to: String,
        /// Relationship name.
        relationship: String,
    },

    /// A snapshot could not be read back.
    #[error("Cache error: {message}")]
    Cache {
        /// Why the snapshot is unusable.
        message: String,
    },

    /// A feature table has no row for a node index in the current mapping.
    #[error("No embedding row for node index {index}")]
    EmbeddingMismatch {
        /// Node index that was looked up.
        index: usize,
    },

    /// A classifier was given unusable data or used before fitting.
    #[error("Model error: {message}")]
    Model {
        /// What went wrong.
        message: String,
    },

    /// Binary snapshot encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl Error {
    /// Creates an I/O error tagged with the path it happened on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a model error.
    pub fn model<S: Into<String>>(message: S) -> Self {
        Error::Model {
            message: message.into(),
        }
    }

    /// Creates a cache error.
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Error::Cache {
            message: message.into(),
        }
    }

    /// Returns whether this error only means a cached artifact is unusable.
    ///
    /// Such errors fall through to a rebuild and are never fatal.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Error::Cache { .. } | Error::Serialization(_))
    }
}
