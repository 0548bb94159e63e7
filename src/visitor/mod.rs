//! Simplifying tree visitor.
//!
//! Walks a CST top-down. Tokens become normalized terminals; bound rules are
//! handed to their factory or resolved through their field spec; everything
//! else is collapsed generically so that grammar noise never reaches the AST.

use std::cell::Cell;

use tracing::{debug, trace, warn};

use crate::ast::{AstNode, NodeKind, Terminal, Value};
use crate::binder::{Binding, RuleBindingTable, SyntaxFilter};
use crate::syntax::cst::CstNode;

mod resolve;

/// Depth of nested AST-building rules past which the visitor keeps raw text.
pub const MAX_VISIT_DEPTH: usize = 512;

pub struct Visitor<'t> {
    table: &'t RuleBindingTable,
    source: &'t str,
    depth: Cell<usize>,
    max_depth: usize,
}

impl<'t> Visitor<'t> {
    pub fn new(table: &'t RuleBindingTable, source: &'t str) -> Self {
        Self {
            table,
            source,
            depth: Cell::new(0),
            max_depth: MAX_VISIT_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn table(&self) -> &'t RuleBindingTable {
        self.table
    }

    /// The complete source text the visited CST was parsed from.
    pub fn source(&self) -> &'t str {
        self.source
    }

    pub fn visit(&self, node: &CstNode<'_>) -> Value {
        if node.is_terminal() {
            return Terminal::normalize(node.text, node.span).into();
        }

        match self.table.binding(&node.name) {
            Some(Binding::Syntax(filter)) => self.visit_children(node, Some(filter)),
            Some(binding) => self.visit_bound(binding, node),
            None => self.visit_children(node, None),
        }
    }

    /// Rules that build AST values are the only ones counted towards the
    /// depth limit; pass-through rules are free.
    fn visit_bound(&self, binding: &Binding, node: &CstNode<'_>) -> Value {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            warn!(rule = %node.name, depth, "nesting too deep; keeping raw text");
            return raw_fallback(node);
        }
        trace!(rule = %node.name, depth, "visit");

        self.depth.set(depth + 1);
        let value = match binding {
            Binding::Node {
                factory: Some(factory),
                ..
            }
            | Binding::Hook(factory) => factory(self, node),
            Binding::Node { kind, factory: None } => self.resolve(*kind, node).into(),
            Binding::Syntax(filter) => self.visit_children(node, Some(filter)),
        };
        self.depth.set(depth);
        value
    }

    /// Visit the children `filter` keeps, then collapse the results.
    pub fn visit_children(&self, node: &CstNode<'_>, filter: Option<&SyntaxFilter>) -> Value {
        let results = node
            .children
            .iter()
            .filter(|c| !filter.is_some_and(|f| f.drops(c)))
            .map(|c| self.visit(c))
            .collect();
        collapse(node, results)
    }

    /// Visit the first child matching `key`, or `Null` when there is none.
    pub fn visit_child(&self, node: &CstNode<'_>, key: &str) -> Value {
        node.child(key).map_or(Value::Null, |c| self.visit(c))
    }
}

/// Reduce the visited children of `node` to one value.
///
/// No results give `Null`, a single result is passed through, all-terminal
/// results are joined by single spaces, and results that are all proper
/// nodes form a list. Anything else is kept in a Fallback node.
pub fn collapse(node: &CstNode<'_>, mut results: Vec<Value>) -> Value {
    if results.len() <= 1 {
        return results.pop().unwrap_or_default();
    }

    if results.iter().all(|v| matches!(v, Value::Terminal(_))) {
        let span = results
            .iter()
            .filter_map(Value::span)
            .reduce(|a, b| a.cover(b))
            .unwrap_or(node.span);
        let text = results
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        return Terminal::raw(text, span).into();
    }

    if results
        .iter()
        .all(|v| matches!(v, Value::Node(n) if n.kind() != NodeKind::Unshaped))
    {
        return Value::List(results);
    }

    debug!(rule = %node.name, "no node kind for rule; keeping fallback");
    if results.iter().all(Value::is_null) {
        return raw_fallback(node);
    }
    AstNode::fallback(results, node.span).into()
}

/// A Fallback node holding the verbatim source text of `node`.
pub fn raw_fallback(node: &CstNode<'_>) -> Value {
    AstNode::fallback(vec![Terminal::raw(node.text, node.span).into()], node.span).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn cst(name: &str, text: &'static str, span: Span) -> CstNode<'static> {
        CstNode {
            name: name.into(),
            tag: None,
            span,
            text,
            children: vec![],
        }
    }

    fn ident(text: &str, span: Span) -> Value {
        let mut node = AstNode::new(NodeKind::Identifier, span);
        node.set("fields", Value::List(vec![Terminal::normalize(text, span).into()]));
        node.into()
    }

    #[test]
    fn collapse_passes_single_result_through() {
        let node = cst("expression", "a", Span::new(0, 1));
        let value = ident("a", Span::new(0, 1));
        assert_eq!(collapse(&node, vec![value.clone()]), value);
        assert_eq!(collapse(&node, vec![]), Value::Null);
    }

    #[test]
    fn collapse_joins_terminals() {
        let node = cst("nulls_order", "NULLS  FIRST", Span::new(0, 12));
        let value = collapse(
            &node,
            vec![
                Terminal::normalize("NULLS", Span::new(0, 5)).into(),
                Terminal::normalize("FIRST", Span::new(7, 12)).into(),
            ],
        );
        assert_eq!(value.as_str(), Some("nulls first"));
        assert_eq!(value.span(), Some(Span::new(0, 12)));
    }

    #[test]
    fn collapse_lists_proper_nodes() {
        let node = cst("group_by_clause", "a, b", Span::new(0, 4));
        let value = collapse(&node, vec![ident("a", Span::new(0, 1)), ident("b", Span::new(3, 4))]);
        assert_eq!(value.as_list().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn collapse_keeps_mixed_results_in_a_fallback() {
        let node = cst("cursor_subquery", "(a)", Span::new(0, 3));
        let value = collapse(
            &node,
            vec![
                Terminal::normalize("(", Span::new(0, 1)).into(),
                ident("a", Span::new(1, 2)),
                Terminal::normalize(")", Span::new(2, 3)).into(),
            ],
        );
        assert!(value.is_fallback());
        assert_eq!(value.as_node().unwrap().arr().len(), 3);
    }

    #[test]
    fn collapse_of_nulls_keeps_source_text() {
        let node = cst("for_update_clause", "FOR UPDATE", Span::new(0, 10));
        let value = collapse(&node, vec![Value::Null, Value::Null]);
        let arr = value.as_node().unwrap().arr();
        assert_eq!(arr[0].as_str(), Some("FOR UPDATE"));
    }

    #[test]
    fn depth_limit_keeps_raw_text() {
        let table = RuleBindingTable::build().unwrap();
        let source = "SELECT a FROM b";
        let tree = crate::syntax::parser::parse_cst(source, crate::syntax::parser::StartRule::SqlScript).unwrap();
        let value = Visitor::new(&table, source).with_max_depth(2).visit(&tree);

        let script = value.as_node().unwrap();
        assert_eq!(script.kind(), NodeKind::Script);
        let stmt = &script.field("body").as_list().unwrap()[0];
        assert!(stmt.is_fallback());
        assert_eq!(stmt.text(source), Some(source));
    }
}
