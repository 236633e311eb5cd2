//! Serializable API model of Python modules.
//!
//! Each module and class owns its scope. Names stored in annotations and
//! base classes only hold weak references to those scopes, so a model value
//! must stay alive for its names to resolve.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use apiscan_core::expr::Expr;
use apiscan_core::scope::{ClassScope, ModuleScope};
use serde::Serialize;

use crate::docstring::Docstring;

// ============================================================================
// Modules
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ModuleApi {
    /// Last component of the dotted path.
    pub name: String,
    /// Dotted module path (`pkg.sub.mod`).
    pub path: String,
    pub filepath: PathBuf,
    pub is_package: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<Docstring>,
    /// Import bindings: alias -> imported path.
    pub imports: BTreeMap<String, String>,
    pub attributes: Vec<AttributeApi>,
    pub classes: Vec<ClassApi>,
    pub functions: Vec<FunctionApi>,
    #[serde(skip)]
    pub(crate) scope: Rc<ModuleScope>,
}

impl ModuleApi {
    pub fn scope(&self) -> &Rc<ModuleScope> {
        &self.scope
    }

    pub fn class(&self, name: &str) -> Option<&ClassApi> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionApi> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeApi> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }
}

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ClassApi {
    pub name: String,
    pub path: String,
    pub lineno: usize,
    pub endlineno: usize,
    pub bases: Vec<Expr>,
    pub decorators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<Docstring>,
    pub attributes: Vec<AttributeApi>,
    pub methods: Vec<FunctionApi>,
    pub classes: Vec<ClassApi>,
    #[serde(skip)]
    pub(crate) scope: Rc<ClassScope>,
}

impl ClassApi {
    pub fn scope(&self) -> &Rc<ClassScope> {
        &self.scope
    }

    pub fn method(&self, name: &str) -> Option<&FunctionApi> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeApi> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FunctionApi {
    pub name: String,
    pub path: String,
    pub lineno: usize,
    pub endlineno: usize,
    pub is_async: bool,
    pub decorators: Vec<String>,
    pub parameters: Vec<ParameterApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<Docstring>,
}

impl FunctionApi {
    pub fn parameter(&self, name: &str) -> Option<&ParameterApi> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterApi {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

// ============================================================================
// Attributes
// ============================================================================

/// A module, class or instance attribute.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeApi {
    pub name: String,
    pub path: String,
    pub lineno: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<Docstring>,
    /// Assigned on `self` in `__init__`.
    pub is_instance: bool,
}
