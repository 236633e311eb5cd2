//! Base class resolver.

use apiscan_core::expr::{Expr, Expression, Name};
use apiscan_core::scope::scoped_name;
use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::dispatch::{field, field_children, DispatchTable, ExtractContext};
use crate::error::ExtractResult;

pub type BaseClassHandler = fn(Node<'_>, &ExtractContext<'_>) -> ExtractResult<Expr>;

static BASECLASS_TABLE: Lazy<DispatchTable<BaseClassHandler>> = Lazy::new(|| {
    let mut table: DispatchTable<BaseClassHandler> = DispatchTable::new("baseclass");
    table
        .register("identifier", baseclass_name)
        .register("attribute", baseclass_attribute)
        .register("subscript", baseclass_subscript);
    table
});

/// Resolve one entry of a class's superclass list.
///
/// Only names, dotted names and subscripted generics (`Generic[T]`) are
/// supported; anything else is an unsupported-node error.
pub fn get_baseclass(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let handler = BASECLASS_TABLE.handler(node)?;
    handler(node, ctx)
}

fn baseclass_name(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    Ok(Expr::Name(scoped_name(&ctx.parent, ctx.text(node))))
}

fn baseclass_attribute(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let left = get_baseclass(field(node, "object")?, ctx)?;
    let attr = ctx.text(field(node, "attribute")?);
    let name = Name::attribute(&left, attr);
    Ok(Expression::new([left, Expr::from("."), Expr::Name(name)]).into())
}

fn baseclass_subscript(node: Node<'_>, ctx: &ExtractContext<'_>) -> ExtractResult<Expr> {
    let left = get_baseclass(field(node, "value")?, ctx)?;
    let mut parts = vec![left, Expr::from("[")];
    for (index, element) in field_children(node, "subscript").into_iter().enumerate() {
        if index > 0 {
            parts.push(Expr::from(", "));
        }
        parts.push(get_baseclass(element, ctx)?);
    }
    parts.push(Expr::from("]"));
    Ok(Expression::new(parts).into())
}
