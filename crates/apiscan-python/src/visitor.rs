//! Module visitor.
//!
//! Walks a parsed module and builds its [`ModuleApi`]: imports are bound in
//! the module scope, classes get their own [`ClassScope`], and every
//! annotation, base class, value, default and docstring goes through the
//! extraction tables. Statements nested in `if`/`try` blocks at module or
//! class level are visited like top-level ones (`if TYPE_CHECKING:`).

use std::path::Path;
use std::rc::{Rc, Weak};

use apiscan_core::scope::{downgrade, ClassScope, ModuleScope, Scope};
use tracing::debug;
use tree_sitter::Node;

use crate::annotation::get_optional_annotation;
use crate::baseclass::get_baseclass;
use crate::defaults::get_parameter_default;
use crate::dispatch::{field, field_children, first_named, named_children, ExtractContext};
use crate::docstring::get_docstring;
use crate::error::{ExtractError, ExtractResult};
use crate::model::{AttributeApi, ClassApi, FunctionApi, ModuleApi, ParameterApi, ParameterKind};
use crate::names::{get_instance_names, get_names};
use crate::parse::{line_of, node_text, LinesCollection, ParsedModule};
use crate::value::get_value;

// ============================================================================
// Entry points
// ============================================================================

/// Build the API of a standalone module.
///
/// `module_path` is the dotted path of the module; `lines` must contain the
/// lines of `filepath` for non-literal parameter defaults to be recovered.
pub fn visit_module(
    module_path: &str,
    filepath: &Path,
    source: &str,
    lines: &LinesCollection,
) -> ExtractResult<ModuleApi> {
    visit(module_path, filepath, source, lines, None)
}

/// Build the API of a module inside a package; names the module does not
/// define or import resolve in `package`.
pub fn visit_submodule(
    module_path: &str,
    filepath: &Path,
    source: &str,
    lines: &LinesCollection,
    package: &Rc<ModuleScope>,
) -> ExtractResult<ModuleApi> {
    visit(module_path, filepath, source, lines, Some(package))
}

fn visit(
    module_path: &str,
    filepath: &Path,
    source: &str,
    lines: &LinesCollection,
    package: Option<&Rc<ModuleScope>>,
) -> ExtractResult<ModuleApi> {
    let parsed = ParsedModule::parse(filepath, source)?;
    let is_package = filepath
        .file_stem()
        .is_some_and(|stem| stem == "__init__");
    let scope = match package {
        Some(package) => ModuleScope::with_package(module_path, package),
        None => ModuleScope::new(module_path),
    };

    let visitor = Visitor {
        source: &parsed.source,
        filepath,
        lines,
        module_path,
        is_package,
    };
    let root = parsed.root();
    let mut body = Body::default();
    visitor.visit_body(root, &Owner::Module(&scope), &mut body)?;

    Ok(ModuleApi {
        name: module_path
            .rsplit('.')
            .next()
            .unwrap_or(module_path)
            .to_string(),
        path: module_path.to_string(),
        filepath: filepath.to_path_buf(),
        is_package,
        docstring: get_docstring(root, &parsed.source, false),
        imports: scope.imports(),
        attributes: body.attributes,
        classes: body.classes,
        functions: body.functions,
        scope,
    })
}

// ============================================================================
// Visitor
// ============================================================================

/// Scope statements are visited in.
enum Owner<'s> {
    Module(&'s Rc<ModuleScope>),
    Class(&'s Rc<ClassScope>),
}

impl Owner<'_> {
    fn add_member(&self, name: &str) -> String {
        match self {
            Owner::Module(scope) => scope.add_member(name),
            Owner::Class(scope) => scope.add_member(name),
        }
    }

    fn add_import(&self, alias: &str, target: &str) {
        match self {
            Owner::Module(scope) => scope.add_import(alias, target),
            Owner::Class(scope) => scope.add_import(alias, target),
        }
    }

    fn weak(&self) -> Weak<dyn Scope> {
        match self {
            Owner::Module(scope) => downgrade(*scope),
            Owner::Class(scope) => downgrade(*scope),
        }
    }
}

/// Members collected from one body.
#[derive(Default)]
struct Body {
    attributes: Vec<AttributeApi>,
    classes: Vec<ClassApi>,
    functions: Vec<FunctionApi>,
    instance_attributes: Vec<AttributeApi>,
}

struct Visitor<'a> {
    source: &'a str,
    filepath: &'a Path,
    lines: &'a LinesCollection,
    module_path: &'a str,
    is_package: bool,
}

impl<'a> Visitor<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        node_text(node, self.source)
    }

    fn visit_body(&self, node: Node<'_>, owner: &Owner<'_>, body: &mut Body) -> ExtractResult<()> {
        let mut statements = Vec::new();
        flatten_statements(node, &mut statements);

        for statement in statements {
            match statement.kind() {
                "import_statement" => self.visit_import(statement, owner),
                "import_from_statement" => self.visit_import_from(statement, owner),
                "expression_statement" => {
                    self.visit_assignment(statement, owner, &mut body.attributes)?
                }
                "class_definition" | "function_definition" => {
                    self.visit_definition(statement, &[], owner, body)?
                }
                "decorated_definition" => {
                    let decorators: Vec<_> = named_children(statement)
                        .into_iter()
                        .filter(|child| child.kind() == "decorator")
                        .collect();
                    let definition = field(statement, "definition")?;
                    self.visit_definition(definition, &decorators, owner, body)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn visit_definition(
        &self,
        node: Node<'_>,
        decorators: &[Node<'_>],
        owner: &Owner<'_>,
        body: &mut Body,
    ) -> ExtractResult<()> {
        match node.kind() {
            "class_definition" => body.classes.push(self.visit_class(node, decorators, owner)?),
            "function_definition" => {
                let function = self.visit_function(node, decorators, owner)?;
                if let Owner::Class(scope) = owner {
                    if function.name == "__init__" {
                        body.instance_attributes = self.visit_instance_attributes(node, scope)?;
                    }
                }
                body.functions.push(function);
            }
            _ => {}
        }
        Ok(())
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn visit_import(&self, node: Node<'_>, owner: &Owner<'_>) {
        for name in field_children(node, "name") {
            match name.kind() {
                // `import a.b` binds `a`.
                "dotted_name" => {
                    let text = self.text(name);
                    let top = text.split('.').next().unwrap_or(text);
                    owner.add_import(top, top);
                }
                "aliased_import" => {
                    if let (Some(target), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) {
                        owner.add_import(self.text(alias), self.text(target));
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_import_from(&self, node: Node<'_>, owner: &Owner<'_>) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };
        let base = match module.kind() {
            "relative_import" => self.resolve_relative(module),
            _ => self.text(module).to_string(),
        };

        let names = field_children(node, "name");
        if names.is_empty() {
            debug!(
                "{}: wildcard import from {} at line {} not bound",
                self.module_path,
                base,
                line_of(node)
            );
            return;
        }
        for name in names {
            match name.kind() {
                "dotted_name" => {
                    let imported = self.text(name);
                    owner.add_import(imported, &qualify(&base, imported));
                }
                "aliased_import" => {
                    if let (Some(target), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) {
                        owner.add_import(self.text(alias), &qualify(&base, self.text(target)));
                    }
                }
                _ => {}
            }
        }
    }

    /// Absolute module path of a `relative_import` (`.`, `..sub`).
    fn resolve_relative(&self, node: Node<'_>) -> String {
        let mut level = 0;
        let mut rest = "";
        for child in named_children(node) {
            match child.kind() {
                "import_prefix" => level = self.text(child).chars().filter(|c| *c == '.').count(),
                "dotted_name" => rest = self.text(child),
                _ => {}
            }
        }

        let mut parts: Vec<&str> = self.module_path.split('.').collect();
        // A plain module's package is its parent; a package is its own.
        let mut drop = level;
        if self.is_package {
            drop = drop.saturating_sub(1);
        }
        if drop > parts.len() {
            debug!(
                "{}: relative import beyond top-level package at line {}",
                self.module_path,
                line_of(node)
            );
        }
        parts.truncate(parts.len().saturating_sub(drop));
        let package = parts.join(".");
        qualify(&package, rest)
    }

    // ========================================================================
    // Classes and functions
    // ========================================================================

    fn visit_class(
        &self,
        node: Node<'_>,
        decorators: &[Node<'_>],
        owner: &Owner<'_>,
    ) -> ExtractResult<ClassApi> {
        let name = self.text(field(node, "name")?);
        let path = owner.add_member(name);
        let parent = owner.weak();
        let ctx = ExtractContext::new(self.source, parent.clone());

        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            for base in named_children(superclasses) {
                // metaclass=..., **kwargs
                if matches!(base.kind(), "keyword_argument" | "dictionary_splat") {
                    continue;
                }
                bases.push(get_baseclass(base, &ctx)?);
            }
        }

        let scope = ClassScope::new(name, &parent);
        let mut body = Body::default();
        self.visit_body(field(node, "body")?, &Owner::Class(&scope), &mut body)?;

        let mut attributes = body.attributes;
        for attribute in body.instance_attributes {
            if attributes.iter().all(|existing| existing.name != attribute.name) {
                attributes.push(attribute);
            }
        }

        Ok(ClassApi {
            name: name.to_string(),
            path,
            lineno: line_of(node),
            endlineno: node.end_position().row + 1,
            bases,
            decorators: self.visit_decorators(decorators)?,
            docstring: get_docstring(node, self.source, false),
            attributes,
            methods: body.functions,
            classes: body.classes,
            scope,
        })
    }

    fn visit_function(
        &self,
        node: Node<'_>,
        decorators: &[Node<'_>],
        owner: &Owner<'_>,
    ) -> ExtractResult<FunctionApi> {
        let name = self.text(field(node, "name")?);
        let path = owner.add_member(name);
        let ctx = ExtractContext::new(self.source, owner.weak());

        let mut cursor = node.walk();
        let is_async = node.children(&mut cursor).any(|child| child.kind() == "async");

        Ok(FunctionApi {
            name: name.to_string(),
            path,
            lineno: line_of(node),
            endlineno: node.end_position().row + 1,
            is_async,
            decorators: self.visit_decorators(decorators)?,
            parameters: self.visit_parameters(field(node, "parameters")?, &ctx)?,
            returns: get_optional_annotation(node.child_by_field_name("return_type"), &ctx)?,
            docstring: get_docstring(node, self.source, false),
        })
    }

    fn visit_decorators(&self, decorators: &[Node<'_>]) -> ExtractResult<Vec<String>> {
        decorators
            .iter()
            .map(|decorator| get_value(first_named(*decorator)?, self.source))
            .collect()
    }

    fn visit_parameters(
        &self,
        node: Node<'_>,
        ctx: &ExtractContext<'_>,
    ) -> ExtractResult<Vec<ParameterApi>> {
        let mut parameters: Vec<ParameterApi> = Vec::new();
        let mut keyword_only = false;

        for parameter in named_children(node) {
            let regular = if keyword_only {
                ParameterKind::KeywordOnly
            } else {
                ParameterKind::PositionalOrKeyword
            };
            let (name, kind, annotation, default) = match parameter.kind() {
                "identifier" => (parameter, regular, None, None),
                "typed_parameter" => {
                    let target = first_named(parameter)?;
                    let annotation = parameter.child_by_field_name("type");
                    let (name, kind) = splat_target(target, regular)?;
                    (name, kind, annotation, None)
                }
                "default_parameter" => (
                    field(parameter, "name")?,
                    regular,
                    None,
                    parameter.child_by_field_name("value"),
                ),
                "typed_default_parameter" => (
                    field(parameter, "name")?,
                    regular,
                    parameter.child_by_field_name("type"),
                    parameter.child_by_field_name("value"),
                ),
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    let (name, kind) = splat_target(parameter, regular)?;
                    (name, kind, None, None)
                }
                "keyword_separator" => {
                    keyword_only = true;
                    continue;
                }
                "positional_separator" => {
                    for previous in parameters.iter_mut() {
                        if previous.kind == ParameterKind::PositionalOrKeyword {
                            previous.kind = ParameterKind::PositionalOnly;
                        }
                    }
                    continue;
                }
                _ => continue,
            };

            if kind == ParameterKind::VarPositional {
                keyword_only = true;
            }
            parameters.push(ParameterApi {
                name: self.text(name).to_string(),
                kind,
                annotation: get_optional_annotation(annotation, ctx)?,
                default: get_parameter_default(default, self.source, self.filepath, self.lines),
            });
        }
        Ok(parameters)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    fn visit_assignment(
        &self,
        statement: Node<'_>,
        owner: &Owner<'_>,
        attributes: &mut Vec<AttributeApi>,
    ) -> ExtractResult<()> {
        let Some(assignment) = assignment_of(statement) else {
            return Ok(());
        };
        let names = match get_names(statement, self.source) {
            Ok(names) => names,
            Err(err) => return self.skip_target(statement, err),
        };

        let ctx = ExtractContext::new(self.source, owner.weak());
        let annotation = get_optional_annotation(assignment.child_by_field_name("type"), &ctx)?;
        let value = assigned_value(assignment)
            .map(|value| get_value(value, self.source))
            .transpose()?;
        let docstring = next_statement(statement)
            .and_then(|next| get_docstring(next, self.source, true));

        for name in names {
            if name.contains('.') {
                debug!(
                    "{}: attribute target {} at line {} not recorded",
                    self.module_path,
                    name,
                    line_of(statement)
                );
                continue;
            }
            let attribute = AttributeApi {
                path: owner.add_member(&name),
                name,
                lineno: line_of(statement),
                annotation: annotation.clone(),
                value: value.clone(),
                docstring: docstring.clone(),
                is_instance: false,
            };
            match attributes.iter_mut().find(|existing| existing.name == attribute.name) {
                Some(existing) => *existing = attribute,
                None => attributes.push(attribute),
            }
        }
        Ok(())
    }

    /// Attributes assigned on `self` anywhere in the body of `__init__`.
    fn visit_instance_attributes(
        &self,
        function: Node<'_>,
        scope: &Rc<ClassScope>,
    ) -> ExtractResult<Vec<AttributeApi>> {
        let mut statements = Vec::new();
        collect_expression_statements(field(function, "body")?, &mut statements);

        let ctx = ExtractContext::new(self.source, downgrade(scope));
        let mut attributes: Vec<AttributeApi> = Vec::new();
        for statement in statements {
            let Some(assignment) = assignment_of(statement) else {
                continue;
            };
            let names = match get_instance_names(statement, self.source) {
                Ok(names) => names,
                Err(err) => {
                    self.skip_target(statement, err)?;
                    continue;
                }
            };
            if names.is_empty() {
                continue;
            }

            let annotation =
                get_optional_annotation(assignment.child_by_field_name("type"), &ctx)?;
            let value = assigned_value(assignment)
                .map(|value| get_value(value, self.source))
                .transpose()?;
            let docstring = next_statement(statement)
                .and_then(|next| get_docstring(next, self.source, true));

            for name in names {
                if name.contains('.') || attributes.iter().any(|existing| existing.name == name) {
                    continue;
                }
                attributes.push(AttributeApi {
                    path: scope.add_member(&name),
                    name,
                    lineno: line_of(statement),
                    annotation: annotation.clone(),
                    value: value.clone(),
                    docstring: docstring.clone(),
                    is_instance: true,
                });
            }
        }
        Ok(attributes)
    }

    /// Skip assignments whose targets the name table does not support.
    fn skip_target(&self, statement: Node<'_>, err: ExtractError) -> ExtractResult<()> {
        if !err.is_unsupported() {
            return Err(err);
        }
        debug!(
            "{}: skipping assignment at line {}: {}",
            self.module_path,
            line_of(statement),
            err
        );
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Statements of a body, with `if`/`try` blocks inlined.
fn flatten_statements<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    for child in named_children(node) {
        match child.kind() {
            "if_statement" | "elif_clause" | "else_clause" | "try_statement" | "except_clause"
            | "finally_clause" | "block" => flatten_statements(child, out),
            _ => out.push(child),
        }
    }
}

/// Expression statements below `node`, not entering nested scopes.
fn collect_expression_statements<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    for child in named_children(node) {
        match child.kind() {
            "expression_statement" => out.push(child),
            "function_definition" | "class_definition" | "decorated_definition" | "lambda" => {}
            _ => collect_expression_statements(child, out),
        }
    }
}

fn assignment_of(statement: Node<'_>) -> Option<Node<'_>> {
    named_children(statement)
        .into_iter()
        .next()
        .filter(|child| child.kind() == "assignment")
}

/// Right-hand side of an assignment, following chains (`a = b = value`).
fn assigned_value(assignment: Node<'_>) -> Option<Node<'_>> {
    let mut right = assignment.child_by_field_name("right")?;
    while right.kind() == "assignment" {
        right = right.child_by_field_name("right")?;
    }
    Some(right)
}

fn next_statement(node: Node<'_>) -> Option<Node<'_>> {
    let mut next = node.next_named_sibling();
    while let Some(sibling) = next {
        if sibling.kind() != "comment" {
            return Some(sibling);
        }
        next = sibling.next_named_sibling();
    }
    None
}

/// Name node and kind of `*args` / `**kwargs` patterns.
fn splat_target(node: Node<'_>, regular: ParameterKind) -> ExtractResult<(Node<'_>, ParameterKind)> {
    match node.kind() {
        "list_splat_pattern" => Ok((first_named(node)?, ParameterKind::VarPositional)),
        "dictionary_splat_pattern" => Ok((first_named(node)?, ParameterKind::VarKeyword)),
        _ => Ok((node, regular)),
    }
}

fn qualify(base: &str, name: &str) -> String {
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}.{}", base, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscan_core::expr::Expr;

    fn visit_source(module_path: &str, file: &str, source: &str) -> ModuleApi {
        let path = Path::new(file);
        let mut lines = LinesCollection::new();
        lines.insert(path, source);
        visit_module(module_path, path, source, &lines).unwrap()
    }

    fn resolved(expr: &Option<Expr>) -> String {
        expr.as_ref().map(Expr::resolved).unwrap_or_default()
    }

    #[test]
    fn test_imports_bound_in_module_scope() {
        let module = visit_source(
            "pkg.sub.mod",
            "pkg/sub/mod.py",
            "import os.path\nimport numpy as np\nfrom typing import List as L, Dict\nfrom . import sibling\nfrom ..core import Base\n",
        );
        assert_eq!(module.imports["os"], "os");
        assert_eq!(module.imports["np"], "numpy");
        assert_eq!(module.imports["L"], "typing.List");
        assert_eq!(module.imports["Dict"], "typing.Dict");
        assert_eq!(module.imports["sibling"], "pkg.sub.sibling");
        assert_eq!(module.imports["Base"], "pkg.core.Base");
    }

    #[test]
    fn test_relative_import_in_package_init() {
        let module = visit_source(
            "pkg",
            "pkg/__init__.py",
            "from .mod import Thing\nfrom . import other\n",
        );
        assert!(module.is_package);
        assert_eq!(module.imports["Thing"], "pkg.mod.Thing");
        assert_eq!(module.imports["other"], "pkg.other");
    }

    #[test]
    fn test_class_with_bases_and_docstring() {
        let source = "\
from abc import ABC
import enum

class Color(enum.Enum, metaclass=Meta):
    \"\"\"Colors.\"\"\"

    RED = 1
    \"\"\"The red one.\"\"\"

class Shape(ABC, Color):
    pass
";
        let module = visit_source("m", "m.py", source);
        let color = module.class("Color").unwrap();
        assert_eq!(color.path, "m.Color");
        assert_eq!(color.bases.len(), 1);
        assert_eq!(color.bases[0].resolved(), "enum.Enum");
        assert_eq!(color.docstring.as_ref().unwrap().value, "Colors.");
        let red = color.attribute("RED").unwrap();
        assert_eq!(red.path, "m.Color.RED");
        assert_eq!(red.value.as_deref(), Some("1"));
        assert_eq!(red.docstring.as_ref().unwrap().value, "The red one.");

        let shape = module.class("Shape").unwrap();
        let bases: Vec<_> = shape.bases.iter().map(Expr::resolved).collect();
        assert_eq!(bases, vec!["abc.ABC", "m.Color"]);
    }

    #[test]
    fn test_function_parameters() {
        let source = "\
from typing import Optional

async def fetch(a, b: int, /, c=1, *args: str, d: Optional[int] = None, **kw) -> bytes:
    '''Fetch.'''
";
        let module = visit_source("m", "m.py", source);
        let fetch = module.function("fetch").unwrap();
        assert!(fetch.is_async);
        assert_eq!(fetch.docstring.as_ref().unwrap().value, "Fetch.");
        assert_eq!(resolved(&fetch.returns), "bytes");

        let kinds: Vec<_> = fetch.parameters.iter().map(|p| (p.name.as_str(), p.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("a", ParameterKind::PositionalOnly),
                ("b", ParameterKind::PositionalOnly),
                ("c", ParameterKind::PositionalOrKeyword),
                ("args", ParameterKind::VarPositional),
                ("d", ParameterKind::KeywordOnly),
                ("kw", ParameterKind::VarKeyword),
            ]
        );
        let d = fetch.parameter("d").unwrap();
        assert_eq!(resolved(&d.annotation), "typing.Optional[int]");
        assert_eq!(d.default.as_deref(), Some("None"));
        assert_eq!(fetch.parameter("c").unwrap().default.as_deref(), Some("1"));
    }

    #[test]
    fn test_keyword_separator() {
        let module = visit_source("m", "m.py", "def f(a, *, b=x + 1):\n    pass\n");
        let f = module.function("f").unwrap();
        assert_eq!(f.parameters[1].kind, ParameterKind::KeywordOnly);
        assert_eq!(f.parameters[1].default.as_deref(), Some("x + 1"));
    }

    #[test]
    fn test_instance_attributes_and_decorators() {
        let source = "\
import dataclasses

@dataclasses.dataclass(frozen=True)
class Point:
    x: int = 0

    def __init__(self, y):
        self.y: float = y
        '''The y coordinate.'''
        if y:
            self.z = [y]
        self.x = 2

    @property
    def norm(self):
        return 0
";
        let module = visit_source("m", "m.py", source);
        let point = module.class("Point").unwrap();
        assert_eq!(point.decorators, vec!["dataclasses.dataclass(frozen=True)"]);

        let names: Vec<_> = point.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert!(!point.attribute("x").unwrap().is_instance);

        let y = point.attribute("y").unwrap();
        assert!(y.is_instance);
        assert_eq!(y.path, "m.Point.y");
        assert_eq!(resolved(&y.annotation), "float");
        assert_eq!(y.docstring.as_ref().unwrap().value, "The y coordinate.");
        assert_eq!(point.attribute("z").unwrap().value.as_deref(), Some("[y]"));

        let norm = point.method("norm").unwrap();
        assert_eq!(norm.decorators, vec!["property"]);
    }

    #[test]
    fn test_unsupported_targets_skipped() {
        let module = visit_source("m", "m.py", "a, b = 1, 2\nc = 3\nd[0] = 4\n");
        let names: Vec<_> = module.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["c"]);
    }

    #[test]
    fn test_unsupported_value_propagates() {
        let path = Path::new("m.py");
        let err = visit_module("m", path, "x = (y := 1)\n", &LinesCollection::new()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_type_checking_block_visited() {
        let source = "\
from typing import TYPE_CHECKING
if TYPE_CHECKING:
    from pathlib import Path
else:
    Path = None

def f(p: Path) -> None:
    pass
";
        let module = visit_source("m", "m.py", source);
        let p = module.function("f").unwrap().parameter("p").unwrap();
        // Members win over imports.
        assert_eq!(resolved(&p.annotation), "m.Path");
        assert_eq!(module.imports["Path"], "pathlib.Path");
    }

    #[test]
    fn test_submodule_falls_back_to_package() {
        let init = visit_source("pkg", "pkg/__init__.py", "from .base import Base\n");
        let source = "class Child(Base):\n    pass\n";
        let path = Path::new("pkg/child.py");
        let mut lines = LinesCollection::new();
        lines.insert(path, source);
        let child = visit_submodule("pkg.child", path, source, &lines, init.scope()).unwrap();
        assert_eq!(child.class("Child").unwrap().bases[0].resolved(), "pkg.base.Base");
    }

    #[test]
    fn test_serialized_model() {
        let module = visit_source("m", "m.py", "from typing import List\nX: List[int] = []\n");
        let json = serde_json::to_value(&module).unwrap();
        assert_eq!(json["path"], "m");
        assert_eq!(json["attributes"][0]["annotation"]["source"], "List[int]");
        assert_eq!(json["attributes"][0]["annotation"]["resolved"], "typing.List[int]");
        assert_eq!(json["attributes"][0]["value"], "[]");
        assert!(json.get("scope").is_none());
    }
}
