//! Resolvable expressions.
//!
//! An [`Expression`] is an ordered sequence of fragments: literal tokens
//! (operators, punctuation, keywords) and [`Name`]s. A `Name` keeps the
//! spelling found in source together with a deferred resolver that computes
//! the fully-qualified path only when asked.
//!
//! Resolution is never performed while extracting: the scope a name belongs
//! to may still be under construction at that point (forward references,
//! partially loaded packages).

use std::fmt;
use std::rc::Rc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

// ============================================================================
// Resolution
// ============================================================================

/// Error raised when a name cannot be resolved to a qualified path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The scope chain does not know the name.
    #[error("could not resolve '{name}' from {scope}")]
    NotFound { name: String, scope: String },

    /// The scope the name was extracted from has been dropped.
    #[error("scope of '{name}' is no longer alive")]
    ScopeDropped { name: String },
}

/// Deferred computation of a qualified path.
pub trait Resolve {
    /// Compute the qualified path now.
    fn resolve(&self) -> Result<String, ResolutionError>;
}

impl<F> Resolve for F
where
    F: Fn() -> Result<String, ResolutionError>,
{
    fn resolve(&self) -> Result<String, ResolutionError> {
        self()
    }
}

/// Resolver for the right-hand side of an attribute access (`a.b`).
///
/// Resolves to the resolved left-hand side followed by `.attr`.
pub struct AttributeResolver {
    left: Expr,
    attr: String,
}

impl AttributeResolver {
    pub fn new(left: Expr, attr: impl Into<String>) -> Self {
        AttributeResolver {
            left,
            attr: attr.into(),
        }
    }
}

impl Resolve for AttributeResolver {
    fn resolve(&self) -> Result<String, ResolutionError> {
        Ok(format!("{}.{}", self.left.resolved(), self.attr))
    }
}

// ============================================================================
// Name
// ============================================================================

/// A name as written in source, resolvable on demand.
#[derive(Clone)]
pub struct Name {
    source: String,
    resolver: Rc<dyn Resolve>,
    /// Number of fragments right before this name (left operand and `.`)
    /// that its resolved path already includes; 0 for plain names.
    qualifier_len: usize,
}

impl Name {
    /// Create a name with its resolver.
    pub fn new(source: impl Into<String>, resolver: impl Resolve + 'static) -> Self {
        Name {
            source: source.into(),
            resolver: Rc::new(resolver),
            qualifier_len: 0,
        }
    }

    /// The `attr` of `left.attr`, resolved through an [`AttributeResolver`].
    ///
    /// Must be placed in an expression right after `left` and a `"."`.
    pub fn attribute(left: &Expr, attr: &str) -> Self {
        Name {
            source: attr.to_string(),
            resolver: Rc::new(AttributeResolver::new(left.clone(), attr)),
            qualifier_len: left.fragment_count() + 1,
        }
    }

    /// The spelling found in source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the resolver.
    pub fn try_full(&self) -> Result<String, ResolutionError> {
        self.resolver.resolve()
    }

    /// The qualified path of this name.
    ///
    /// The resolver runs on every call, so the result follows changes made
    /// to the owning scope after extraction. Falls back to the source
    /// spelling when the name cannot be resolved.
    pub fn full(&self) -> String {
        match self.resolver.resolve() {
            Ok(path) => path,
            Err(err) => {
                tracing::trace!("unresolved name '{}': {}", self.source, err);
                self.source.clone()
            }
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Name").field(&self.source).finish()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// Expression
// ============================================================================

/// One element of an [`Expression`].
#[derive(Debug, Clone)]
pub enum Fragment {
    Literal(String),
    Name(Name),
}

impl Fragment {
    fn source(&self) -> &str {
        match self {
            Fragment::Literal(text) => text,
            Fragment::Name(name) => name.source(),
        }
    }
}

/// Ordered sequence of literal tokens and names.
///
/// Nested expressions are flattened on construction, so an expression is
/// always a flat list of fragments.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    fragments: Vec<Fragment>,
}

impl Expression {
    /// Build an expression from strings, names and other expressions.
    ///
    /// ```ignore
    /// let expr = Expression::new([Expr::from("a"), ".".into(), "b".into()]);
    /// assert_eq!(expr.full(), "a.b");
    /// ```
    pub fn new<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        let mut fragments = Vec::new();
        for part in parts {
            match part.into() {
                Expr::Literal(text) => fragments.push(Fragment::Literal(text)),
                Expr::Name(name) => fragments.push(Fragment::Name(name)),
                Expr::Expression(inner) => fragments.extend(inner.fragments),
            }
        }
        Expression { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Names referenced by this expression, in order.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Name(name) => Some(name),
            Fragment::Literal(_) => None,
        })
    }

    /// Source spelling: fragments concatenated, names as written.
    pub fn full(&self) -> String {
        self.fragments.iter().map(Fragment::source).collect()
    }

    /// Like [`Expression::full`], with every name replaced by its qualified path.
    ///
    /// The resolved path of an attribute name already contains its left
    /// operand, so it replaces the rendering of `left.` instead of
    /// following it.
    pub fn resolved(&self) -> String {
        // Rendered pieces with the number of fragments each one covers.
        let mut pieces: Vec<(String, usize)> = Vec::with_capacity(self.fragments.len());
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => pieces.push((text.clone(), 1)),
                Fragment::Name(name) => match name.try_full() {
                    Ok(path) if name.qualifier_len > 0 => {
                        let mut covered = 0;
                        let mut end = pieces.len();
                        while covered < name.qualifier_len && end > 0 {
                            end -= 1;
                            covered += pieces[end].1;
                        }
                        if covered == name.qualifier_len {
                            pieces.truncate(end);
                            pieces.push((path, covered + 1));
                        } else {
                            // Left operand not in this expression.
                            pieces.push((name.source().to_string(), 1));
                        }
                    }
                    Ok(path) => pieces.push((path, 1)),
                    Err(err) => {
                        tracing::trace!("unresolved name '{}': {}", name.source(), err);
                        pieces.push((name.source().to_string(), 1));
                    }
                },
            }
        }
        pieces.into_iter().map(|(text, _)| text).collect()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            f.write_str(fragment.source())?;
        }
        Ok(())
    }
}

// ============================================================================
// Expr
// ============================================================================

/// Result of resolving an annotation or base class node.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Plain text, such as the repr of a literal annotation.
    Literal(String),
    Name(Name),
    Expression(Expression),
}

impl Expr {
    /// Source spelling.
    pub fn source(&self) -> String {
        match self {
            Expr::Literal(text) => text.clone(),
            Expr::Name(name) => name.source().to_string(),
            Expr::Expression(expression) => expression.full(),
        }
    }

    /// Spelling with every name replaced by its qualified path.
    pub fn resolved(&self) -> String {
        match self {
            Expr::Literal(text) => text.clone(),
            Expr::Name(name) => name.full(),
            Expr::Expression(expression) => expression.resolved(),
        }
    }

    /// Number of fragments this value contributes to an enclosing expression.
    fn fragment_count(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Name(_) => 1,
            Expr::Expression(expression) => expression.fragments.len(),
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Expr::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(text) => f.write_str(text),
            Expr::Name(name) => fmt::Display::fmt(name, f),
            Expr::Expression(expression) => fmt::Display::fmt(expression, f),
        }
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Expr::Literal(text.to_string())
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        Expr::Literal(text)
    }
}

impl From<Name> for Expr {
    fn from(name: Name) -> Self {
        Expr::Name(name)
    }
}

impl From<Expression> for Expr {
    fn from(expression: Expression) -> Self {
        Expr::Expression(expression)
    }
}

/// Serialized as `{"source": ..., "resolved": ...}`; resolution happens at
/// serialization time.
impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Expr", 2)?;
        state.serialize_field("source", &self.source())?;
        state.serialize_field("resolved", &self.resolved())?;
        state.end()
    }
}

// ============================================================================
// Tests
// ============================================================================
