//! Parameter default values.

use std::path::Path;

use tracing::debug;
use tree_sitter::Node;

use crate::literal::constant_repr;
use crate::parse::{node_text, LinesCollection};

/// Text of a parameter's default value.
///
/// Constants are rendered as Python's `repr()` prints them (`...` becomes
/// `Ellipsis`), identifiers verbatim. Any other expression is sliced from its
/// source line, keeping the original formatting. Expressions spanning
/// several lines are not supported and yield `None`.
pub fn get_parameter_default(
    node: Option<Node<'_>>,
    source: &str,
    filepath: &Path,
    lines: &LinesCollection,
) -> Option<String> {
    let node = node?;

    if let Some(repr) = constant_repr(node, source) {
        return Some(repr);
    }
    if node.kind() == "identifier" {
        return Some(node_text(node, source).to_string());
    }

    let start = node.start_position();
    let end = node.end_position();
    if start.row != end.row {
        return None;
    }

    let Some(file_lines) = lines.get(filepath) else {
        debug!("no source lines for {}", filepath.display());
        return None;
    };
    let line = file_lines.get(start.row)?;
    line.get(start.column..end.column).map(str::to_string)
}
