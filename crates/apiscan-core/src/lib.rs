//! Core infrastructure for apiscan.
//!
//! This crate provides language-agnostic infrastructure:
//! - Resolvable expressions (`Expression`, `Name`) with lazy resolution
//! - Module and class scopes that resolve identifiers to qualified paths
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Temporary git worktrees for loading past revisions

pub mod error;
pub mod expr;
pub mod git;
pub mod output;
pub mod scope;

pub use error::{ApiscanError, OutputErrorCode};
pub use expr::{AttributeResolver, Expr, Expression, Fragment, Name, Resolve, ResolutionError};
pub use scope::{ClassScope, ModuleScope, Scope};
