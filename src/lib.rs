//! apiscan: static API extraction for Python packages.
//!
//! Reads Python sources without importing them and reports their public
//! API (classes, functions, parameters, attributes, docstrings) with names
//! resolved to qualified paths, from the working tree or from any git
//! revision.

// Core infrastructure - re-exported from apiscan-core
pub use apiscan_core::error;
pub use apiscan_core::expr;
pub use apiscan_core::git;
pub use apiscan_core::output;
pub use apiscan_core::scope;

// Python extraction
pub use apiscan_python as python;

pub mod loader;

pub use loader::{load_git, load_path, LoadOptions};
