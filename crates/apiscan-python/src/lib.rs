//! Python support for apiscan.
//!
//! This crate extracts the API of Python modules from tree-sitter syntax
//! trees. It includes:
//! - Kind-keyed dispatch tables for base classes, annotations, values and
//!   assignment targets
//! - Docstring and parameter default extraction
//! - A module visitor producing a serializable API model
//! - Python source discovery

pub mod annotation;
pub mod baseclass;
pub mod defaults;
pub mod dispatch;
pub mod docstring;
pub mod error;
pub mod files;
pub mod literal;
pub mod model;
pub mod names;
pub mod parse;
pub mod value;
pub mod visitor;

pub use annotation::get_annotation;
pub use baseclass::get_baseclass;
pub use defaults::get_parameter_default;
pub use dispatch::ExtractContext;
pub use docstring::{get_docstring, Docstring};
pub use error::{ExtractError, ExtractResult};
pub use model::{AttributeApi, ClassApi, FunctionApi, ModuleApi, ParameterApi, ParameterKind};
pub use names::{get_instance_names, get_name, get_names};
pub use parse::{LinesCollection, ParsedModule};
pub use value::get_value;
pub use visitor::{visit_module, visit_submodule};
