//! AST module for PL/SQL queries.
//!
//! Every node is an [`AstNode`]: a [`NodeKind`] plus one [`Value`] per field
//! the kind declares, in declaration order, and the span it was built from.
//! Structural equality ignores spans.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

pub mod value;

pub use crate::syntax::Span;
pub use value::{Terminal, Value};

// ============================================================================
// NODE KINDS
// ============================================================================

/// The kinds of AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Script,
    SelectStmt,
    Union,
    Identifier,
    Star,
    TableAliasExpr,
    AliasExpr,
    BinaryExpr,
    UnaryExpr,
    OrderByExpr,
    SortBy,
    JoinExpr,
    Call,
    OverClause,
    Case,
    CaseWhen,
    /// Fallback for CST shapes no kind claims. Its single field `arr` holds
    /// the surviving children verbatim.
    Unshaped,
}

impl NodeKind {
    pub const ALL: [NodeKind; 17] = [
        NodeKind::Script,
        NodeKind::SelectStmt,
        NodeKind::Union,
        NodeKind::Identifier,
        NodeKind::Star,
        NodeKind::TableAliasExpr,
        NodeKind::AliasExpr,
        NodeKind::BinaryExpr,
        NodeKind::UnaryExpr,
        NodeKind::OrderByExpr,
        NodeKind::SortBy,
        NodeKind::JoinExpr,
        NodeKind::Call,
        NodeKind::OverClause,
        NodeKind::Case,
        NodeKind::CaseWhen,
        NodeKind::Unshaped,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Script => "Script",
            NodeKind::SelectStmt => "SelectStmt",
            NodeKind::Union => "Union",
            NodeKind::Identifier => "Identifier",
            NodeKind::Star => "Star",
            NodeKind::TableAliasExpr => "TableAliasExpr",
            NodeKind::AliasExpr => "AliasExpr",
            NodeKind::BinaryExpr => "BinaryExpr",
            NodeKind::UnaryExpr => "UnaryExpr",
            NodeKind::OrderByExpr => "OrderByExpr",
            NodeKind::SortBy => "SortBy",
            NodeKind::JoinExpr => "JoinExpr",
            NodeKind::Call => "Call",
            NodeKind::OverClause => "OverClause",
            NodeKind::Case => "Case",
            NodeKind::CaseWhen => "CaseWhen",
            NodeKind::Unshaped => "Unshaped",
        }
    }

    pub fn from_name(name: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Declared fields, in order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            NodeKind::Script => &["body"],
            NodeKind::SelectStmt => &[
                "pref",
                "target_list",
                "into_clause",
                "from_clause",
                "where_clause",
                "hierarchical_query_clause",
                "group_by_clause",
                "having_clause",
                "for_update_clause",
                "order_by_clause",
                "limit_clause",
                "with_clause",
            ],
            NodeKind::Union => &["left", "op", "right", "order_by_clause"],
            NodeKind::Identifier => &["fields"],
            NodeKind::Star => &[],
            NodeKind::TableAliasExpr => &["alias", "alias_columns", "subquery"],
            NodeKind::AliasExpr => &["expr", "alias"],
            NodeKind::BinaryExpr => &["left", "op", "right"],
            NodeKind::UnaryExpr => &["op", "expr"],
            NodeKind::OrderByExpr => &["expr"],
            NodeKind::SortBy => &["expr", "direction", "nulls"],
            NodeKind::JoinExpr => &["left", "join_type", "right", "cond", "using"],
            NodeKind::Call => &["name", "pref", "args", "component", "over_clause"],
            NodeKind::OverClause => &["partition", "order_by_clause", "windowing_clause"],
            NodeKind::Case => &["expr", "switches", "else_expr"],
            NodeKind::CaseWhen => &["when", "then"],
            NodeKind::Unshaped => &["arr"],
        }
    }

    pub fn field_index(self, field: &str) -> Option<usize> {
        self.fields().iter().position(|f| *f == field)
    }

    /// Search priority. A selector only descends into nodes whose priority is
    /// strictly below its bound.
    pub fn priority(self) -> u32 {
        match self {
            NodeKind::Script => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// NODES
// ============================================================================

static NULL: Value = Value::Null;

#[derive(Debug, Clone)]
pub struct AstNode {
    kind: NodeKind,
    fields: Vec<Value>,
    span: Span,
}

impl AstNode {
    /// A node of `kind` with every field `Null`.
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            fields: vec![Value::Null; kind.fields().len()],
            span,
        }
    }

    /// A Fallback node holding `arr`.
    pub fn fallback(arr: Vec<Value>, span: Span) -> Self {
        let mut node = Self::new(NodeKind::Unshaped, span);
        node.fields[0] = Value::List(arr);
        node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn priority(&self) -> u32 {
        self.kind.priority()
    }

    /// Value of a declared field; `None` if the kind has no such field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.kind.field_index(field).map(|i| &self.fields[i])
    }

    /// Value of `field`, `Null` when absent or undeclared.
    pub fn field(&self, field: &str) -> &Value {
        self.get(field).unwrap_or(&NULL)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.kind.fields().iter().copied().zip(self.fields.iter())
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.fields
    }

    /// Items of a Fallback node's `arr`.
    pub fn arr(&self) -> &[Value] {
        match self.kind {
            NodeKind::Unshaped => self.field("arr").as_list().unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Verbatim source text of this node.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.slice(source)
    }

    /// `{"type": kind, "data": {field: value}}`, omitting null fields.
    pub fn dump(&self) -> serde_json::Value {
        let data: serde_json::Map<String, serde_json::Value> = self
            .fields()
            .filter(|(_, v)| !v.is_null())
            .map(|(name, v)| (name.to_owned(), v.dump()))
            .collect();
        serde_json::json!({ "type": self.kind.name(), "data": data })
    }

    // Construction-time corrections, made before the node is shared.

    pub(crate) fn set(&mut self, field: &str, value: Value) -> bool {
        match self.kind.field_index(field) {
            Some(i) => {
                self.fields[i] = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn take(&mut self, field: &str) -> Value {
        match self.kind.field_index(field) {
            Some(i) => std::mem::take(&mut self.fields[i]),
            None => Value::Null,
        }
    }

    pub(crate) fn field_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.kind.field_index(field).map(|i| &mut self.fields[i])
    }

    pub(crate) fn set_span(&mut self, span: Span) {
        self.span = span;
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fields == other.fields
    }
}

impl Serialize for AstNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dump().serialize(serializer)
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        let mut first = true;
        for (name, value) in self.fields().filter(|(_, v)| !v.is_null()) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
            first = false;
        }
        f.write_str(")")
    }
}

/// Verbatim source text of `node`.
pub fn get_text<'s>(node: &AstNode, source: &'s str) -> &'s str {
    node.text(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Value {
        let mut node = AstNode::new(NodeKind::Identifier, Span::new(start, start + name.len()));
        node.set(
            "fields",
            Value::List(vec![Terminal::normalize(name, Span::new(start, start + name.len())).into()]),
        );
        node.into()
    }

    #[test]
    fn every_kind_round_trips_its_name() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(NodeKind::Unshaped.fields(), &["arr"]);
    }

    #[test]
    fn only_script_outranks_statements() {
        assert_eq!(NodeKind::Script.priority(), 0);
        assert!(NodeKind::ALL[1..].iter().all(|k| k.priority() == 1));
    }

    #[test]
    fn equality_ignores_spans() {
        assert_eq!(ident("a", 0), ident("A", 20));
        assert_ne!(ident("a", 0), ident("b", 0));
    }

    #[test]
    fn set_rejects_undeclared_fields() {
        let mut node = AstNode::new(NodeKind::Star, Span::default());
        assert!(!node.set("expr", Value::Null));
        assert!(node.field("expr").is_null());
        assert!(node.get("expr").is_none());
    }

    #[test]
    fn dump_omits_null_fields() {
        let mut node = AstNode::new(NodeKind::UnaryExpr, Span::new(0, 2));
        node.set("op", Terminal::normalize("-", Span::new(0, 1)).into());
        node.set("expr", Terminal::normalize("1", Span::new(1, 2)).into());
        assert_eq!(
            node.dump(),
            serde_json::json!({"type": "UnaryExpr", "data": {"op": "-", "expr": "1"}})
        );

        let star = AstNode::new(NodeKind::Star, Span::default());
        assert_eq!(star.dump(), serde_json::json!({"type": "Star", "data": {}}));
    }

    #[test]
    fn display_reads_like_a_constructor() {
        let mut node = AstNode::new(NodeKind::AliasExpr, Span::default());
        node.set("expr", ident("a", 0));
        node.set("alias", Terminal::normalize("b", Span::default()).into());
        assert_eq!(node.to_string(), "AliasExpr(expr = Identifier(fields = ['a']), alias = 'b')");
    }
}
