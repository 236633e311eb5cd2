//! Type annotation resolver.
//!
//! Turns an annotation node into an [`Expr`] whose names resolve lazily in
//! the enclosing scope. Literal annotations (`"Forward"`, `None`, `1`) keep
//! their Python repr.

use apiscan_core::expr::{Expr, Expression, Name};
use apiscan_core::scope::scoped_name;
use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::dispatch::{
    field, field_children, first_named, named_children, DispatchTable, ExtractContext,
};
use crate::error::{ExtractError, ExtractResult};
use crate::literal::constant_repr;
use crate::parse::line_of;

pub type AnnotationHandler = fn(Node<'_>, &ExtractContext<'_>) -> ExtractResult<Expr>;

static ANNOTATION_TABLE: Lazy<DispatchTable<AnnotationHandler>> = Lazy::new(|| {
    let mut table: DispatchTable<AnnotationHandler> = DispatchTable::new("annotation");
    table
        .register("identifier", annotation_name)
        .register("string", annotation_constant)
        .register("concatenated_string", annotation_constant)
        .register("integer", annotation_constant)
        .register("float", annotation_constant)
        .register("true", annotation_constant)
        .register("false", annotation_constant)
        .register("none", annotation_constant)
        .register("ellipsis", annotation_constant)
        .register("attribute", annotation_attribute)
        .register("binary_operator", annotation_binary)
        .register("subscript", annotation_subscript)
        .register("tuple", annotation_tuple)
        .register("list", annotation_list)
        .register("type", annotation_unwrap)
        .register("parenthesized_expression", annotation_unwrap)
        .register("generic_type", annotation_generic_type)
        .register("type_parameter", annotation_tuple)
        .register("union_type", annotation_union_type)
        .register("member_type", annotation_member_type)
        .register("|", annotation_bitor)
        .register("&", annotation_bitand);
    table
});

/// Resolve an annotation node in `ctx.parent`.
pub fn get_annotation(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let handler = ANNOTATION_TABLE.handler(node)?;
    handler(node, ctx)
}

/// Like [`get_annotation`], for optional fields (`returns`, `type`).
pub fn get_optional_annotation(
    node: Option<Node<'_>>,
    ctx: &ExtractContext<'_>,
) -> ExtractResult<Option<Expr>> {
    node.map(|node| get_annotation(node, ctx)).transpose()
}

fn annotation_name(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    Ok(Expr::Name(scoped_name(&ctx.parent, ctx.text(node))))
}

fn annotation_constant(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    match constant_repr(node, ctx.source) {
        Some(repr) => Ok(Expr::Literal(repr)),
        // Formatted strings are not constants.
        None => Err(ExtractError::UnsupportedNode {
            table: "annotation",
            kind: format!("formatted {}", node.kind()),
            line: line_of(node),
        }),
    }
}

fn annotation_attribute(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let left = get_annotation(field(node, "object")?, ctx)?;
    let attr = ctx.text(field(node, "attribute")?);
    let name = Name::attribute(&left, attr);
    Ok(Expression::new([left, Expr::from("."), Expr::Name(name)]).into())
}

fn annotation_binary(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let left = get_annotation(field(node, "left")?, ctx)?;
    let operator = get_annotation(field(node, "operator")?, ctx)?;
    let right = get_annotation(field(node, "right")?, ctx)?;
    Ok(Expression::new([left, operator, right]).into())
}

fn annotation_bitor(_: Node<'_>, _: &ExtractContext<'_>) -> ExtractResult<Expr> {
    Ok(Expr::from(" | "))
}

fn annotation_bitand(_: Node<'_>, _: &ExtractContext<'_>) -> ExtractResult<Expr> {
    Ok(Expr::from(" & "))
}

fn annotation_subscript(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let left = get_annotation(field(node, "value")?, ctx)?;
    let slice = joined(&field_children(node, "subscript"), ctx)?;
    Ok(Expression::new([left, Expr::from("["), slice, Expr::from("]")]).into())
}

/// Tuples render their elements without parentheses (`Dict[str, int]`).
fn annotation_tuple(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    joined(&named_children(node), ctx)
}

fn annotation_list(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let elements = joined(&named_children(node), ctx)?;
    Ok(Expression::new([Expr::from("["), elements, Expr::from("]")]).into())
}

fn annotation_unwrap(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    get_annotation(first_named(node)?, ctx)
}

/// `list[int]` in annotation position: an identifier followed by a
/// `type_parameter`.
fn annotation_generic_type(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let mut parts = Vec::new();
    for child in named_children(node) {
        if child.kind() == "type_parameter" {
            parts.push(Expr::from("["));
            parts.push(get_annotation(child, ctx)?);
            parts.push(Expr::from("]"));
        } else {
            parts.push(get_annotation(child, ctx)?);
        }
    }
    Ok(Expression::new(parts).into())
}

fn annotation_union_type(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let mut parts = Vec::new();
    for (index, child) in named_children(node).into_iter().enumerate() {
        if index > 0 {
            parts.push(Expr::from(" | "));
        }
        parts.push(get_annotation(child, ctx)?);
    }
    Ok(Expression::new(parts).into())
}

/// `a.B` in annotation position: a `type` followed by an identifier.
fn annotation_member_type(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let children = named_children(node);
    match children.as_slice() {
        [object, attribute] => {
            let left = get_annotation(*object, ctx)?;
            let attr = ctx.text(*attribute);
            let name = Name::attribute(&left, attr);
            Ok(Expression::new([left, Expr::from("."), Expr::Name(name)]).into())
        }
        _ => Err(ExtractError::MalformedNode {
            kind: node.kind().to_string(),
            field: "attribute",
            line: line_of(node),
        }),
    }
}

/// Elements joined by `", "`; a single element is returned as is.
fn joined(nodes: &[Node<'_>], ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    if let [single] = nodes {
        return get_annotation(*single, ctx);
    }
    let mut parts = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            parts.push(Expr::from(", "));
        }
        parts.push(get_annotation(*node, ctx)?);
    }
    Ok(Expression::new(parts).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParsedModule;
    use apiscan_core::scope::{downgrade, ModuleScope};
    use std::path::Path;

    /// Annotation of `x: <annotation>` resolved in module `pkg.mod`.
    fn annotate(annotation: &str, scope: &std::rc::Rc<ModuleScope>) -> ExtractResult<Expr> {
        let source = format!("x: {}\n", annotation);
        let parsed = ParsedModule::parse(Path::new("t.py"), source.as_str()).unwrap();
        let assignment = parsed.root().named_child(0).unwrap().named_child(0).unwrap();
        let node = assignment.child_by_field_name("type").unwrap();
        let ctx = ExtractContext::new(&parsed.source, downgrade(scope));
        get_annotation(node, &ctx)
    }

    #[test]
    fn test_name_resolves_through_imports() {
        let scope = ModuleScope::new("pkg.mod");
        scope.add_import("Path", "pathlib.Path");
        let expr = annotate("Path", &scope).unwrap();
        assert_eq!(expr.source(), "Path");
        assert_eq!(expr.resolved(), "pathlib.Path");
    }

    #[test]
    fn test_subscript_and_union() {
        let scope = ModuleScope::new("pkg.mod");
        scope.add_import("Dict", "typing.Dict");
        scope.add_member("Item");

        let expr = annotate("Dict[str, Item] | None", &scope).unwrap();
        assert_eq!(expr.source(), "Dict[str, Item] | None");
        assert_eq!(expr.resolved(), "typing.Dict[str, pkg.mod.Item] | None");
    }

    #[test]
    fn test_attribute_resolves_left_side() {
        let scope = ModuleScope::new("pkg.mod");
        scope.add_import("t", "typing");
        let expr = annotate("t.Optional[int]", &scope).unwrap();
        assert_eq!(expr.source(), "t.Optional[int]");
        assert_eq!(expr.resolved(), "typing.Optional[int]");
    }

    #[test]
    fn test_dotted_names_keep_single_prefix() {
        let scope = ModuleScope::new("pkg.mod");
        scope.add_import("t", "typing");
        scope.add_import("collections", "collections");
        let expr = annotate("collections.abc.Mapping[str, t.Dict[str, int]]", &scope).unwrap();
        assert_eq!(
            expr.resolved(),
            "collections.abc.Mapping[str, typing.Dict[str, int]]"
        );
    }

    #[test]
    fn test_literals_keep_repr() {
        let scope = ModuleScope::new("m");
        assert_eq!(annotate("\"Forward\"", &scope).unwrap().source(), "'Forward'");
        assert_eq!(annotate("None", &scope).unwrap().source(), "None");
        assert_eq!(
            annotate("Callable[..., int]", &scope).unwrap().source(),
            "Callable[Ellipsis, int]"
        );
        assert_eq!(
            annotate("Callable[[int], str]", &scope).unwrap().source(),
            "Callable[[int], str]"
        );
    }

    #[test]
    fn test_names_resolve_late() {
        let scope = ModuleScope::new("m");
        let expr = annotate("Later", &scope).unwrap();
        assert_eq!(expr.resolved(), "Later");
        scope.add_member("Later");
        assert_eq!(expr.resolved(), "m.Later");
    }

    #[test]
    fn test_unsupported_operator_fails() {
        let scope = ModuleScope::new("m");
        let err = annotate("a + b", &scope).unwrap_err();
        match err {
            ExtractError::UnsupportedNode { table, kind, .. } => {
                assert_eq!(table, "annotation");
                assert_eq!(kind, "+");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(annotate("f()", &scope).unwrap_err().is_unsupported());
    }
}
