//! Docstring locator.

use serde::Serialize;
use tree_sitter::Node;

use crate::dispatch::named_children;
use crate::literal::{string_literal, StringLiteral, StringValue};

/// A docstring and the 1-based lines its literal spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Docstring {
    pub value: String,
    pub lineno: usize,
    pub endlineno: usize,
}

/// Find the docstring of `node`.
///
/// An `expression_statement` is itself the candidate (the docstring of an
/// attribute follows its assignment). Otherwise, unless `strict` is set, the
/// first statement of the node's body is: module children, or the `body`
/// block of a class or function definition. Only plain `str` literals
/// qualify.
pub fn get_docstring(node: Node<'_>, source: &str, strict: bool) -> Option<Docstring> {
    let candidate = if node.kind() == "expression_statement" {
        node
    } else if strict {
        return None;
    } else {
        first_statement(node)?
    };
    if candidate.kind() != "expression_statement" {
        return None;
    }

    let children = named_children(candidate);
    let [literal] = children.as_slice() else {
        return None;
    };
    match string_literal(*literal, source)? {
        StringLiteral::Plain(StringValue::Str(value)) => Some(Docstring {
            value,
            lineno: literal.start_position().row + 1,
            endlineno: literal.end_position().row + 1,
        }),
        _ => None,
    }
}

fn first_statement(node: Node<'_>) -> Option<Node<'_>> {
    let body = match node.kind() {
        "module" | "block" => node,
        "decorated_definition" => return first_statement(node.child_by_field_name("definition")?),
        _ => node.child_by_field_name("body")?,
    };
    named_children(body).into_iter().next()
}
