//! Assignment target names.

use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::dispatch::{field, first_named, DispatchTable};
use crate::error::ExtractResult;
use crate::parse::node_text;

pub type NameHandler = fn(Node<'_>, &str) -> ExtractResult<String>;
pub type NamesHandler = fn(Node<'_>, &str) -> ExtractResult<Vec<String>>;

static NAME_TABLE: Lazy<DispatchTable<NameHandler>> = Lazy::new(|| {
    let mut table: DispatchTable<NameHandler> = DispatchTable::new("name");
    table
        .register("identifier", name_identifier)
        .register("attribute", name_attribute);
    table
});

static STATEMENT_TABLE: Lazy<DispatchTable<NamesHandler>> = Lazy::new(|| {
    let mut table: DispatchTable<NamesHandler> = DispatchTable::new("assignment");
    table
        .register("expression_statement", names_expression_statement)
        .register("assignment", names_assignment);
    table
});

/// Dotted name of an assignment target (`x`, `self.x`, `a.b.c`).
pub fn get_name(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let handler = NAME_TABLE.handler(node)?;
    handler(node, source)
}

/// Names bound by an assignment statement.
///
/// `a = b = 1` binds `["a", "b"]`; `x: int = 1` and `x: int` bind `["x"]`.
/// Targets the name table does not support (tuple unpacking, subscripts)
/// fail with an unsupported-node error.
pub fn get_names(node: Node<'_>, source: &str) -> ExtractResult<Vec<String>> {
    let handler = STATEMENT_TABLE.handler(node)?;
    handler(node, source)
}

/// Attribute names assigned on `self`, without the `self.` qualifier.
pub fn get_instance_names(node: Node<'_>, source: &str) -> ExtractResult<Vec<String>> {
    Ok(get_names(node, source)?
        .into_iter()
        .filter_map(|name| name.strip_prefix("self.").map(str::to_string))
        .collect())
}

fn name_identifier(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(node_text(node, source).to_string())
}

fn name_attribute(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let object = get_name(field(node, "object")?, source)?;
    Ok(format!("{}.{}", object, node_text(field(node, "attribute")?, source)))
}

fn names_expression_statement(node: Node<'_>, source: &str) -> ExtractResult<Vec<String>> {
    get_names(first_named(node)?, source)
}

fn names_assignment(node: Node<'_>, source: &str) -> ExtractResult<Vec<String>> {
    let mut names = vec![get_name(field(node, "left")?, source)?];
    if node.child_by_field_name("type").is_some() {
        return Ok(names);
    }
    let mut right = node.child_by_field_name("right");
    while let Some(next) = right.filter(|next| next.kind() == "assignment") {
        names.push(get_name(field(next, "left")?, source)?);
        right = next.child_by_field_name("right");
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParsedModule;
    use std::path::Path;

    fn names(source: &str) -> ExtractResult<Vec<String>> {
        let parsed = ParsedModule::parse(Path::new("t.py"), source).unwrap();
        let statement = parsed.root().named_child(0).unwrap();
        get_names(statement, &parsed.source)
    }

    #[test]
    fn test_simple_and_chained() {
        assert_eq!(names("x = 1\n").unwrap(), vec!["x"]);
        assert_eq!(names("a = b = c = 1\n").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_annotated() {
        assert_eq!(names("x: int = 1\n").unwrap(), vec!["x"]);
        assert_eq!(names("x: int\n").unwrap(), vec!["x"]);
    }

    #[test]
    fn test_instance_names() {
        let parsed = ParsedModule::parse(Path::new("t.py"), "self.a = other.b = 1\n").unwrap();
        let statement = parsed.root().named_child(0).unwrap();
        assert_eq!(
            get_names(statement, &parsed.source).unwrap(),
            vec!["self.a", "other.b"]
        );
        assert_eq!(get_instance_names(statement, &parsed.source).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_unsupported_targets() {
        assert!(names("a, b = 1, 2\n").unwrap_err().is_unsupported());
        assert!(names("a[0] = 1\n").unwrap_err().is_unsupported());
        assert!(names("x += 1\n").unwrap_err().is_unsupported());
    }
}
