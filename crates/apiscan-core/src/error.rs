//! Error types and error code constants for apiscan.
//!
//! This module provides a unified error type (`ApiscanError`) that bridges
//! domain-specific errors from the subsystems (git worktrees, extraction,
//! name resolution) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (file not found, name not resolvable)
//! - `4`: Git errors (git missing, not a repository, worktree failures)
//! - `5`: Unsupported syntax (a node kind no extraction table handles)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::io;

use thiserror::Error;

use crate::expr::ResolutionError;
use crate::git::GitError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Resolution errors (file not found, unresolvable name).
    ResolutionError = 3,
    /// Git errors.
    GitError = 4,
    /// Syntax the extractor does not support.
    UnsupportedSyntax = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum ApiscanError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Name resolution failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Git error.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A syntax node kind has no handler in an extraction table.
    #[error("unsupported {kind} node in {table} at line {line}")]
    UnsupportedNode {
        table: String,
        kind: String,
        line: usize,
    },

    /// The source could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&ApiscanError> for OutputErrorCode {
    fn from(err: &ApiscanError) -> Self {
        match err {
            ApiscanError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ApiscanError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            ApiscanError::Resolution(_) => OutputErrorCode::ResolutionError,
            ApiscanError::Git(_) => OutputErrorCode::GitError,
            ApiscanError::UnsupportedNode { .. } => OutputErrorCode::UnsupportedSyntax,
            ApiscanError::Parse { .. } => OutputErrorCode::InvalidArguments,
            ApiscanError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<ApiscanError> for OutputErrorCode {
    fn from(err: ApiscanError) -> Self {
        OutputErrorCode::from(&err)
    }
}

impl From<io::Error> for ApiscanError {
    fn from(err: io::Error) -> Self {
        ApiscanError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ApiscanError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ApiscanError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        ApiscanError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiscanError::InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            OutputErrorCode::from(&ApiscanError::invalid_args("x")).code(),
            2
        );
        assert_eq!(
            OutputErrorCode::from(&ApiscanError::file_not_found("a.py")).code(),
            3
        );
        assert_eq!(
            OutputErrorCode::from(&ApiscanError::from(GitError::GitNotFound)).code(),
            4
        );
        let unsupported = ApiscanError::UnsupportedNode {
            table: "value".to_string(),
            kind: "await".to_string(),
            line: 3,
        };
        assert_eq!(OutputErrorCode::from(&unsupported).code(), 5);
        assert_eq!(OutputErrorCode::from(ApiscanError::internal("bug")).code(), 10);
    }

    #[test]
    fn test_git_error_message_passes_through() {
        let err = ApiscanError::from(GitError::NotARepository {
            path: PathBuf::from("/tmp/nowhere"),
        });
        assert_eq!(err.to_string(), "not a git repository: /tmp/nowhere");
    }
}
