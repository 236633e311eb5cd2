//! Kind-keyed dispatch tables.
//!
//! Each extraction family (base classes, annotations, values, names) owns a
//! [`DispatchTable`] mapping tree-sitter node kinds to handler functions.
//! Lookup is an exact match on [`Node::kind`]. A kind with no handler is a
//! hard [`ExtractError::UnsupportedNode`] failure, never a silent default:
//! it marks a syntax form the table does not support.
//!
//! Operator tokens are dispatched like any other node, by their token kind
//! (`|`, `*`, `not in`, ...), so a table decides which operators it accepts.

use std::collections::HashMap;
use std::rc::Weak;

use apiscan_core::scope::Scope;
use tree_sitter::Node;

use crate::error::{ExtractError, ExtractResult};
use crate::parse::{line_of, node_text};

/// Mapping from node kind to handler.
pub struct DispatchTable<H: Copy> {
    name: &'static str,
    handlers: HashMap<&'static str, H>,
}

impl<H: Copy> DispatchTable<H> {
    /// Create an empty table; `name` appears in unsupported-node errors.
    pub fn new(name: &'static str) -> Self {
        DispatchTable {
            name,
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for nodes of `kind`.
    pub fn register(&mut self, kind: &'static str, handler: H) -> &mut Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Handler for `node`, or an unsupported-node error.
    pub fn handler(&self, node: Node<'_>) -> ExtractResult<H> {
        match self.handlers.get(node.kind()) {
            Some(handler) => Ok(*handler),
            None => {
                tracing::trace!(
                    "{} table has no handler for {} at line {}",
                    self.name,
                    node.kind(),
                    line_of(node)
                );
                Err(ExtractError::UnsupportedNode {
                    table: self.name,
                    kind: node.kind().to_string(),
                    line: line_of(node),
                })
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

/// Context for the scope-aware tables (base classes, annotations).
pub struct ExtractContext<'a> {
    /// Source text the nodes point into.
    pub source: &'a str,
    /// Scope names are resolved in; not kept alive by the context.
    pub parent: Weak<dyn Scope>,
}

impl<'a> ExtractContext<'a> {
    pub fn new(source: &'a str, parent: Weak<dyn Scope>) -> Self {
        ExtractContext { source, parent }
    }

    pub fn text(&self, node: Node<'_>) -> &'a str {
        node_text(node, self.source)
    }
}

// ============================================================================
// Node helpers shared by the tables
// ============================================================================

/// Mandatory field of a node.
pub(crate) fn field<'t>(node: Node<'t>, name: &'static str) -> ExtractResult<Node<'t>> {
    node.child_by_field_name(name)
        .ok_or_else(|| ExtractError::MalformedNode {
            kind: node.kind().to_string(),
            field: name,
            line: line_of(node),
        })
}

/// Named children, skipping comments.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// All children for a field name (e.g. the several `subscript` fields).
pub(crate) fn field_children<'t>(node: Node<'t>, name: &'static str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// First named, non-comment child.
pub(crate) fn first_named<'t>(node: Node<'t>) -> ExtractResult<Node<'t>> {
    named_children(node)
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::MalformedNode {
            kind: node.kind().to_string(),
            field: "child",
            line: line_of(node),
        })
}
