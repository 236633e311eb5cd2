//! Error types for Python extraction.

use std::io;

use apiscan_core::error::ApiscanError;
use thiserror::Error;

/// Error type for extraction from Python syntax trees.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No handler is registered for this node kind in the given table.
    ///
    /// Signals a syntax form the extractor does not support yet; it is
    /// never recovered from inside this crate.
    #[error("unsupported {kind} node in {table} at line {line}")]
    UnsupportedNode {
        table: &'static str,
        kind: String,
        line: usize,
    },

    /// The source contains syntax errors.
    #[error("syntax error in {path} at line {line}")]
    Parse { path: String, line: usize },

    /// A node has an unexpected shape (missing mandatory field).
    #[error("malformed {kind} node at line {line}: missing {field}")]
    MalformedNode {
        kind: String,
        field: &'static str,
        line: usize,
    },

    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

impl ExtractError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ExtractError::UnsupportedNode { .. })
    }
}

impl From<ExtractError> for ApiscanError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedNode { table, kind, line } => ApiscanError::UnsupportedNode {
                table: table.to_string(),
                kind,
                line,
            },
            ExtractError::Parse { .. } => ApiscanError::Parse {
                message: err.to_string(),
            },
            ExtractError::MalformedNode { .. } | ExtractError::Language(_) => {
                ApiscanError::internal(err.to_string())
            }
            ExtractError::Io(io_err) => ApiscanError::from(io_err),
        }
    }
}
