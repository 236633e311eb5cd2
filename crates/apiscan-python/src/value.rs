//! General value renderer.
//!
//! Re-renders an expression node into canonical source text: constants as
//! Python's `repr()` prints them, operators with single spaces around them,
//! containers with `", "` separators. Rendering is purely syntactic; no name
//! is resolved.

use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::dispatch::{field, field_children, first_named, named_children, DispatchTable};
use crate::error::{ExtractError, ExtractResult};
use crate::literal::{constant_repr, repr_str, string_literal, FormattedPart, StringLiteral};
use crate::parse::{line_of, node_text};

/// Handler signature of the value table.
pub type ValueHandler = fn(Node<'_>, &str) -> ExtractResult<String>;

static VALUE_TABLE: Lazy<DispatchTable<ValueHandler>> = Lazy::new(|| {
    let mut table: DispatchTable<ValueHandler> = DispatchTable::new("value");
    table
        .register("identifier", render_text)
        .register("keyword_identifier", render_text)
        .register("integer", render_constant)
        .register("float", render_constant)
        .register("true", render_constant)
        .register("false", render_constant)
        .register("none", render_constant)
        .register("ellipsis", render_constant)
        .register("string", render_string)
        .register("concatenated_string", render_string)
        .register("attribute", render_attribute)
        .register("binary_operator", render_binary)
        .register("unary_operator", render_unary)
        .register("not_operator", render_not)
        .register("boolean_operator", render_binary)
        .register("comparison_operator", render_comparison)
        .register("call", render_call)
        .register("keyword_argument", render_keyword_argument)
        .register("list_splat", render_list_splat)
        .register("dictionary_splat", render_dictionary_splat)
        .register("list", render_list)
        .register("list_pattern", render_list)
        .register("tuple", render_tuple)
        .register("tuple_pattern", render_tuple)
        .register("expression_list", render_tuple)
        .register("pattern_list", render_tuple)
        .register("set", render_set)
        .register("dictionary", render_dictionary)
        .register("pair", render_pair)
        .register("list_comprehension", render_list_comprehension)
        .register("set_comprehension", render_set_comprehension)
        .register("dictionary_comprehension", render_set_comprehension)
        .register("generator_expression", render_generator)
        .register("for_in_clause", render_for_in_clause)
        .register("if_clause", render_if_clause)
        .register("conditional_expression", render_conditional)
        .register("lambda", render_lambda)
        .register("subscript", render_subscript)
        .register("slice", render_slice)
        .register("parenthesized_expression", render_parenthesized)
        .register("type", render_parenthesized)
        .register("generic_type", render_generic_type)
        .register("type_parameter", render_type_parameter)
        .register("union_type", render_union_type)
        .register("member_type", render_member_type);

    // Operator tokens.
    for token in [
        "+", "-", "*", "/", "//", "%", "**", "@", "<<", ">>", "&", "|", "^", "~", "and", "or",
        "<", ">", "==", ">=", "<=", "!=", "<>", "in", "not in", "is", "is not",
    ] {
        table.register(token, render_text);
    }
    table
});

/// Render `node` as canonical source text.
///
/// Fails with an unsupported-node error when `node` (or any node below it)
/// has a kind the value table does not know, such as `await` or `yield`.
pub fn get_value(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let handler = VALUE_TABLE.handler(node)?;
    handler(node, source)
}

/// Kinds the value renderer accepts.
pub fn value_kinds() -> Vec<&'static str> {
    VALUE_TABLE.kinds()
}

fn join(nodes: &[Node<'_>], source: &str) -> ExtractResult<String> {
    let rendered = nodes
        .iter()
        .map(|node| get_value(*node, source))
        .collect::<ExtractResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

// ============================================================================
// Leaves
// ============================================================================

fn render_text(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(node_text(node, source).to_string())
}

fn render_constant(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(constant_repr(node, source).unwrap_or_else(|| node_text(node, source).to_string()))
}

fn render_string(node: Node<'_>, source: &str) -> ExtractResult<String> {
    match string_literal(node, source) {
        Some(StringLiteral::Plain(value)) => Ok(value.repr()),
        Some(StringLiteral::Formatted(parts)) => {
            let mut out = String::new();
            for part in parts {
                match part {
                    FormattedPart::Text(text) => out.push_str(&repr_str(&text)),
                    FormattedPart::Expression(expression) => {
                        out.push('{');
                        out.push_str(&get_value(expression, source)?);
                        out.push('}');
                    }
                }
            }
            Ok(out)
        }
        None => render_text(node, source),
    }
}

// ============================================================================
// Operators
// ============================================================================

fn render_attribute(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let object = get_value(field(node, "object")?, source)?;
    let attribute = node_text(field(node, "attribute")?, source);
    Ok(format!("{}.{}", object, attribute))
}

/// `binary_operator` and `boolean_operator`.
fn render_binary(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let left = get_value(field(node, "left")?, source)?;
    let operator = get_value(field(node, "operator")?, source)?;
    let right = get_value(field(node, "right")?, source)?;
    Ok(format!("{} {} {}", left, operator, right))
}

fn render_unary(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let operator = get_value(field(node, "operator")?, source)?;
    let argument = get_value(field(node, "argument")?, source)?;
    Ok(format!("{}{}", operator, argument))
}

fn render_not(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let argument = get_value(field(node, "argument")?, source)?;
    Ok(format!("not {}", argument))
}

/// Operands are named children, operators the anonymous tokens between
/// them (`not in` and `is not` are single tokens).
fn render_comparison(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        let rendered = get_value(child, source)?;
        if child.is_named() {
            out.push_str(&rendered);
        } else {
            out.push(' ');
            out.push_str(&rendered);
            out.push(' ');
        }
    }
    Ok(out)
}

// ============================================================================
// Calls
// ============================================================================

fn render_call(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let function = get_value(field(node, "function")?, source)?;
    let arguments = field(node, "arguments")?;

    if arguments.kind() == "generator_expression" {
        return Ok(format!("{}({})", function, get_value(arguments, source)?));
    }

    let mut positional = Vec::new();
    let mut keywords = Vec::new();
    for argument in named_children(arguments) {
        match argument.kind() {
            "keyword_argument" | "dictionary_splat" => keywords.push(argument),
            _ => positional.push(argument),
        }
    }
    positional.extend(keywords);
    Ok(format!("{}({})", function, join(&positional, source)?))
}

fn render_keyword_argument(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let name = node_text(field(node, "name")?, source);
    let value = get_value(field(node, "value")?, source)?;
    Ok(format!("{}={}", name, value))
}

fn render_list_splat(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("*{}", get_value(first_named(node)?, source)?))
}

fn render_dictionary_splat(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("**{}", get_value(first_named(node)?, source)?))
}

// ============================================================================
// Containers
// ============================================================================

fn render_list(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("[{}]", join(&named_children(node), source)?))
}

fn render_tuple(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("({})", join(&named_children(node), source)?))
}

fn render_set(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("{{{}}}", join(&named_children(node), source)?))
}

fn render_dictionary(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let mut entries = Vec::new();
    for entry in named_children(node) {
        if entry.kind() == "dictionary_splat" {
            entries.push(format!("None: {}", get_value(first_named(entry)?, source)?));
        } else {
            entries.push(get_value(entry, source)?);
        }
    }
    Ok(format!("{{{}}}", entries.join(", ")))
}

fn render_pair(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let key = get_value(field(node, "key")?, source)?;
    let value = get_value(field(node, "value")?, source)?;
    Ok(format!("{}: {}", key, value))
}

// ============================================================================
// Comprehensions
// ============================================================================

/// `elt clause clause...` without the surrounding brackets.
fn comprehension_body(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let body = field(node, "body")?;
    let mut out = get_value(body, source)?;
    for clause in named_children(node) {
        if clause.id() == body.id() {
            continue;
        }
        out.push(' ');
        out.push_str(&get_value(clause, source)?);
    }
    Ok(out)
}

fn render_list_comprehension(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("[{}]", comprehension_body(node, source)?))
}

/// Set and dict comprehensions; a dict body is a `pair`.
fn render_set_comprehension(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("{{{}}}", comprehension_body(node, source)?))
}

fn render_generator(node: Node<'_>, source: &str) -> ExtractResult<String> {
    comprehension_body(node, source)
}

fn render_for_in_clause(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let target = get_value(field(node, "left")?, source)?;
    let iterables = field_children(node, "right");
    let iterable = match iterables.as_slice() {
        [single] => get_value(*single, source)?,
        many => format!("({})", join(many, source)?),
    };

    let mut cursor = node.walk();
    let is_async = node
        .children(&mut cursor)
        .any(|child| child.kind() == "async");
    let prefix = if is_async { "async " } else { "" };
    Ok(format!("{}for {} in {}", prefix, target, iterable))
}

fn render_if_clause(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("if {}", get_value(first_named(node)?, source)?))
}

// ============================================================================
// Other expressions
// ============================================================================

fn render_conditional(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let parts = named_children(node);
    match parts.as_slice() {
        [body, test, orelse] => Ok(format!(
            "{} if {} else {}",
            get_value(*body, source)?,
            get_value(*test, source)?,
            get_value(*orelse, source)?
        )),
        _ => Err(ExtractError::MalformedNode {
            kind: node.kind().to_string(),
            field: "alternative",
            line: line_of(node),
        }),
    }
}

fn render_lambda(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let mut names = Vec::new();
    if let Some(parameters) = node.child_by_field_name("parameters") {
        for parameter in named_children(parameters) {
            let name = match parameter.kind() {
                "identifier" => Some(parameter),
                "default_parameter" | "typed_default_parameter" => {
                    parameter.child_by_field_name("name")
                }
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    first_named(parameter).ok()
                }
                _ => None,
            };
            if let Some(name) = name {
                names.push(node_text(name, source));
            }
        }
    }
    let body = get_value(field(node, "body")?, source)?;
    Ok(format!("lambda {}: {}", names.join(", "), body))
}

fn render_subscript(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let value = get_value(field(node, "value")?, source)?;
    let elements = field_children(node, "subscript");
    // `a[(x, y)]` renders like `a[x, y]`.
    let slice = match elements.as_slice() {
        [tuple] if tuple.kind() == "tuple" => join(&named_children(*tuple), source)?,
        _ => join(&elements, source)?,
    };
    Ok(format!("{}[{}]", value, slice))
}

/// `lower:upper` plus `:step` only when a step expression is present.
fn render_slice(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let mut parts = [String::new(), String::new(), String::new()];
    let mut position = 0;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == ":" {
            position += 1;
        } else if child.is_named() && child.kind() != "comment" && position < parts.len() {
            parts[position] = get_value(child, source)?;
        }
    }
    let [lower, upper, step] = parts;
    if step.is_empty() {
        Ok(format!("{}:{}", lower, upper))
    } else {
        Ok(format!("{}:{}:{}", lower, upper, step))
    }
}

/// Wrapper nodes: `(expr)` and the `type` node of annotations.
fn render_parenthesized(node: Node<'_>, source: &str) -> ExtractResult<String> {
    get_value(first_named(node)?, source)
}

fn render_generic_type(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let mut out = String::new();
    for child in named_children(node) {
        out.push_str(&get_value(child, source)?);
    }
    Ok(out)
}

fn render_type_parameter(node: Node<'_>, source: &str) -> ExtractResult<String> {
    Ok(format!("[{}]", join(&named_children(node), source)?))
}

fn render_union_type(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let parts = named_children(node)
        .into_iter()
        .map(|child| get_value(child, source))
        .collect::<ExtractResult<Vec<_>>>()?;
    Ok(parts.join(" | "))
}

fn render_member_type(node: Node<'_>, source: &str) -> ExtractResult<String> {
    let parts = named_children(node)
        .into_iter()
        .map(|child| get_value(child, source))
        .collect::<ExtractResult<Vec<_>>>()?;
    Ok(parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParsedModule;
    use std::path::Path;

    /// Render the right-hand side of `x = <expr>`.
    fn render(expr: &str) -> ExtractResult<String> {
        let source = format!("x = {}\n", expr);
        let parsed = ParsedModule::parse(Path::new("t.py"), source.as_str()).unwrap();
        let statement = parsed.root().named_child(0).unwrap();
        let assignment = statement.named_child(0).unwrap();
        let right = assignment.child_by_field_name("right").unwrap();
        get_value(right, &parsed.source)
    }

    fn ok(expr: &str) -> String {
        render(expr).unwrap()
    }

    #[test]
    fn test_constants() {
        assert_eq!(ok("1_000"), "1000");
        assert_eq!(ok("0x10"), "16");
        assert_eq!(ok("1.5"), "1.5");
        assert_eq!(ok("\"abc\""), "'abc'");
        assert_eq!(ok("'it\\'s'"), "\"it's\"");
        assert_eq!(ok("b'x'"), "b'x'");
        assert_eq!(ok("True"), "True");
        assert_eq!(ok("None"), "None");
        assert_eq!(ok("..."), "Ellipsis");
        assert_eq!(ok("'a' 'b'"), "'ab'");
    }

    #[test]
    fn test_operators() {
        assert_eq!(ok("a+b*c"), "a + b * c");
        assert_eq!(ok("-x"), "-x");
        assert_eq!(ok("~x"), "~x");
        assert_eq!(ok("not  x"), "not x");
        assert_eq!(ok("a and b or c"), "a and b or c");
        assert_eq!(ok("a<b<=c"), "a < b <= c");
        assert_eq!(ok("a not in b"), "a not in b");
        assert_eq!(ok("a is not None"), "a is not None");
    }

    #[test]
    fn test_calls_and_attributes() {
        assert_eq!(ok("os.path.join"), "os.path.join");
        assert_eq!(ok("f(1,*a,k=2,**kw)"), "f(1, *a, k=2, **kw)");
        assert_eq!(ok("f(k=1, *a)"), "f(*a, k=1)");
        assert_eq!(ok("sum(x for x in y)"), "sum(x for x in y)");
    }

    #[test]
    fn test_containers() {
        assert_eq!(ok("[1,2]"), "[1, 2]");
        assert_eq!(ok("(1,2)"), "(1, 2)");
        assert_eq!(ok("1, 2"), "(1, 2)");
        assert_eq!(ok("{1,2}"), "{1, 2}");
        assert_eq!(ok("{'a':1, **m}"), "{'a': 1, None: m}");
        assert_eq!(ok("[]"), "[]");
        assert_eq!(ok("{}"), "{}");
    }

    #[test]
    fn test_comprehensions() {
        assert_eq!(ok("[x for x in y if x if z]"), "[x for x in y if x if z]");
        assert_eq!(ok("{k: v for k, v in d}"), "{k: v for (k, v) in d}");
        assert_eq!(ok("{x for x in y}"), "{x for x in y}");
    }

    #[test]
    fn test_other_expressions() {
        assert_eq!(ok("a if b else c"), "a if b else c");
        assert_eq!(ok("lambda a, b=1: a"), "lambda a, b: a");
        assert_eq!(ok("(a)"), "a");
        assert_eq!(ok("f'x{y}z'"), "'x'{y}'z'");
    }

    #[test]
    fn test_slices() {
        assert_eq!(ok("a[:5]"), "a[:5]");
        assert_eq!(ok("a[2:5:2]"), "a[2:5:2]");
        assert_eq!(ok("a[:]"), "a[:]");
        assert_eq!(ok("a[1, 2]"), "a[1, 2]");
        assert_eq!(ok("a[(1, 2)]"), "a[1, 2]");
    }

    #[test]
    fn test_subscript_keeps_inner_parentheses() {
        assert_eq!(ok("a[f(x)]"), "a[f(x)]");
        assert_eq!(ok("a[(1, 2), (3, 4)]"), "a[(1, 2), (3, 4)]");
        assert_eq!(
            ok("Annotated[int, Field(gt=0)]"),
            "Annotated[int, Field(gt=0)]"
        );
        assert_eq!(ok("a[(x)]"), "a[x]");
        for expr in ["a[f(x)]", "a[(1, 2), (3, 4)]", "m[g(1)][h()]"] {
            let once = ok(expr);
            assert_eq!(ok(&once), once);
        }
    }

    #[test]
    fn test_unsupported_kinds() {
        for expr in ["(y := 1)", "await z", "(yield)", "f(await z)"] {
            let err = render(expr).unwrap_err();
            assert!(err.is_unsupported(), "{expr}: {err}");
        }
    }

    #[test]
    fn test_literal_rendering_is_idempotent() {
        for expr in ["'a\\tb'", "1e20", "0o17", "[1, 'x', None]", "{'k': (1, 2.5)}"] {
            let once = ok(expr);
            assert_eq!(ok(&once), once);
        }
    }
}
