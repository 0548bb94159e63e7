use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::{AstNode, NodeKind};
use crate::syntax::Span;

/// The value held by an AST field.
///
/// # Examples
///
/// ```rust
/// use plsql_ast::ast::{Terminal, Value};
/// use plsql_ast::syntax::Span;
///
/// let v = Value::Terminal(Terminal::normalize("SELECT", Span::new(0, 6)));
/// assert_eq!(v.as_str(), Some("select"));
/// assert!(Value::default().is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Terminal(Terminal),
    Node(Arc<AstNode>),
    List(Vec<Value>),
}

impl Value {
    pub fn node(node: AstNode) -> Self {
        Value::Node(Arc::new(node))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for a Fallback (`Unshaped`) node.
    pub fn is_fallback(&self) -> bool {
        self.kind() == Some(NodeKind::Unshaped)
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.as_node().map(AstNode::kind)
    }

    pub fn as_node(&self) -> Option<&AstNode> {
        match self {
            Value::Node(node) => Some(node.as_ref()),
            _ => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Value::Terminal(t) => Some(t),
            _ => None,
        }
    }

    /// Normalized text of a terminal.
    ///
    /// ```rust
    /// use plsql_ast::ast::{Terminal, Value};
    /// use plsql_ast::syntax::Span;
    ///
    /// let quoted = Value::Terminal(Terminal::normalize("'Greg'", Span::default()));
    /// assert_eq!(quoted.as_str(), Some("'Greg'"));
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        self.as_terminal().map(|t| t.text.as_str())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Span covered by this value. Lists cover their first to last element.
    pub fn span(&self) -> Option<Span> {
        match self {
            Value::Null => None,
            Value::Terminal(t) => Some(t.span),
            Value::Node(node) => Some(node.span()),
            Value::List(items) => items
                .iter()
                .filter_map(Value::span)
                .reduce(Span::cover),
        }
    }

    /// Verbatim source text covered by this value.
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.span().map(|span| span.slice(source))
    }

    pub fn dump(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Terminal(t) => serde_json::Value::String(t.text.clone()),
            Value::Node(node) => node.dump(),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::dump).collect()),
        }
    }
}

impl From<AstNode> for Value {
    fn from(node: AstNode) -> Self {
        Value::node(node)
    }
}

impl From<Terminal> for Value {
    fn from(terminal: Terminal) -> Self {
        Value::Terminal(terminal)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dump().serialize(serializer)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Terminal(t) => write!(f, "'{}'", t.text),
            Value::Node(node) => write!(f, "{node}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A leaf token after normalization.
///
/// Equality compares text only.
#[derive(Debug, Clone, Eq)]
pub struct Terminal {
    pub text: String,
    pub span: Span,
}

impl Terminal {
    /// Lower-cases the token unless it is quoted with `'` or `"`.
    pub fn normalize(raw: &str, span: Span) -> Self {
        let text = if is_quoted(raw) {
            raw.to_owned()
        } else {
            raw.to_lowercase()
        };
        Self { text, span }
    }

    /// Keeps the text as written.
    pub fn raw(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

impl PartialEq for Terminal {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

fn is_quoted(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last)) => bytes.len() >= 2 && first == last && (first == b'\'' || first == b'"'),
        _ => false,
    }
}
