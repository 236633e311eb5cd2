//! Compile-only test to verify public API surface.
//!
//! If this file fails to compile, the public API has regressed.

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

use apiscan::error::{ApiscanError, OutputErrorCode};
use apiscan::expr::{
    AttributeResolver, Expr, Expression, Fragment, Name, Resolve, ResolutionError,
};
use apiscan::git::{
    assert_git_repo, latest_tag, repo_root, with_worktree, worktree_id, GitError, TmpWorktree,
};
use apiscan::output::{
    emit_response, ErrorInfo, ErrorResponse, InspectResponse, ValueResponse, SCHEMA_VERSION,
};
use apiscan::scope::{downgrade, scoped_name, ClassScope, ModuleScope, Scope, ScopeResolver};

// ============================================================================
// Python Extraction
// ============================================================================

use apiscan::python::{
    get_annotation, get_baseclass, get_docstring, get_instance_names, get_name, get_names,
    get_parameter_default, get_value, visit_module, visit_submodule, AttributeApi, ClassApi,
    Docstring, ExtractContext, ExtractError, FunctionApi, LinesCollection, ModuleApi,
    ParameterApi, ParameterKind, ParsedModule,
};
use apiscan::python::dispatch::DispatchTable;
use apiscan::python::files::{collect_python_files, FileError, SourceFile};

// ============================================================================
// Loader
// ============================================================================

use apiscan::{load_git, load_path, LoadOptions};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    let _ = std::any::type_name::<Expression>();
    let _ = std::any::type_name::<ModuleScope>();
    let _ = std::any::type_name::<TmpWorktree>();
    let _ = std::any::type_name::<ApiscanError>();
    let _ = std::any::type_name::<ModuleApi>();
    let _ = std::any::type_name::<LoadOptions>();
}

#[test]
fn schema_version_is_stable() {
    assert_eq!(SCHEMA_VERSION, "1");
}
