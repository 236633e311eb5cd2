//! Parsing Python source with tree-sitter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{ExtractError, ExtractResult};

/// A parsed Python source file.
#[derive(Debug)]
pub struct ParsedModule {
    pub source: String,
    pub tree: Tree,
}

impl ParsedModule {
    /// Parse `source`, rejecting trees that contain syntax errors.
    pub fn parse(path: &Path, source: impl Into<String>) -> ExtractResult<Self> {
        let source = source.into();
        let mut parser = Parser::new();
        let language: Language = tree_sitter_python::LANGUAGE.into();
        parser.set_language(&language)?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ExtractError::Parse {
                path: path.display().to_string(),
                line: 1,
            })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ExtractError::Parse {
                path: path.display().to_string(),
                line: first_error_line(root),
            });
        }

        Ok(ParsedModule { source, tree })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node<'_>) -> &str {
        node_text(node, &self.source)
    }
}

/// Source text covered by `node`.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// 1-based line where `node` starts.
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

fn first_error_line(node: Node<'_>) -> usize {
    if node.is_error() || node.is_missing() {
        return line_of(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(child);
        }
    }
    line_of(node)
}

// ============================================================================
// Lines collection
// ============================================================================

/// Source lines of every loaded file, indexed by path.
#[derive(Debug, Default, Clone)]
pub struct LinesCollection {
    files: HashMap<PathBuf, Vec<String>>,
}

impl LinesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the lines of `source` for `path`, replacing previous content.
    pub fn insert(&mut self, path: impl Into<PathBuf>, source: &str) {
        let lines = source.lines().map(str::to_string).collect();
        self.files.insert(path.into(), lines);
    }

    /// Lines of `path`; line `n` is at index `n - 1`.
    pub fn get(&self, path: &Path) -> Option<&[String]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
