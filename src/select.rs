//! Priority-bounded search and the two-level dispatcher.
//!
//! The selector walks an AST depth-first in pre-order, recording every node
//! of the target kind. It only descends into a node whose declared priority
//! is strictly below the search bound, so by default a search for SELECT
//! statements stops at the first SELECT on each path and never reports the
//! nested subqueries. A bound above every priority searches the whole tree.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ast::{AstNode, NodeKind, Value};
use crate::errors::LookupError;

// ============================================================================
// SELECTOR
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Selector {
    target: NodeKind,
    priority: u32,
}

impl Selector {
    /// A search bounded by the target kind's own priority.
    pub fn new(target: NodeKind) -> Self {
        Self {
            target,
            priority: target.priority(),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Every match below `root`, in document order.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a AstNode> {
        let mut out = Vec::new();
        self.walk(root, &mut out);
        out
    }

    pub fn select_node<'a>(&self, root: &'a AstNode) -> Vec<&'a AstNode> {
        let mut out = Vec::new();
        self.visit(root, &mut out);
        out
    }

    fn walk<'a>(&self, value: &'a Value, out: &mut Vec<&'a AstNode>) {
        match value {
            Value::Node(node) => self.visit(node, out),
            Value::List(items) => {
                for item in items {
                    self.walk(item, out);
                }
            }
            Value::Null | Value::Terminal(_) => {}
        }
    }

    fn visit<'a>(&self, node: &'a AstNode, out: &mut Vec<&'a AstNode>) {
        if node.kind() == self.target {
            out.push(node);
        }
        if self.priority > node.priority() {
            for value in node.values() {
                self.walk(value, out);
            }
        }
    }
}

/// Matches of `target` below `root`. `priority` defaults to the target's.
///
/// # Examples
///
/// ```rust
/// use plsql_ast::{parse, NodeKind, ParseOptions, RuleBindingTable};
/// use plsql_ast::select::select;
///
/// let table = RuleBindingTable::build().unwrap();
/// let tree = parse("SELECT a FROM x WHERE a = (SELECT b FROM y)", &ParseOptions::default(), &table).unwrap();
///
/// assert_eq!(select(&tree, NodeKind::SelectStmt, None).len(), 1);
/// assert_eq!(select(&tree, NodeKind::SelectStmt, Some(999)).len(), 2);
/// ```
pub fn select(root: &Value, target: NodeKind, priority: Option<u32>) -> Vec<&AstNode> {
    let selector = Selector::new(target);
    match priority {
        Some(priority) => selector.with_priority(priority).select(root),
        None => selector.select(root),
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Resolves `(kind, name)` pairs such as `("statement", "select")` or
/// `("other", "binaryexpr")` to node kinds.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    kinds: HashMap<&'static str, HashMap<String, NodeKind>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let mut kinds: HashMap<&'static str, HashMap<String, NodeKind>> = HashMap::new();
        for kind in NodeKind::ALL {
            let (group, name) = Self::classify(kind);
            kinds.entry(group).or_default().insert(name, kind);
        }
        Self { kinds }
    }

    /// Group and lookup name of `kind`.
    pub fn classify(kind: NodeKind) -> (&'static str, String) {
        match kind.name().strip_suffix("Stmt") {
            Some(stem) => ("statement", stem.to_lowercase()),
            None => ("other", kind.name().to_lowercase()),
        }
    }

    pub fn resolve(&self, kind: &str, name: &str) -> Result<NodeKind, LookupError> {
        self.kinds
            .get(kind)
            .and_then(|names| names.get(name))
            .copied()
            .ok_or_else(|| LookupError::UnknownNode {
                kind: kind.to_owned(),
                name: name.to_owned(),
            })
    }

    /// The `index`-th match (zero-based, document order) of the kind named by
    /// `(kind, name)`, searched with that kind's default bound.
    pub fn dispatch<'a>(
        &self,
        kind: &str,
        name: &str,
        index: usize,
        root: &'a Value,
    ) -> Result<&'a AstNode, LookupError> {
        let target = self.resolve(kind, name)?;
        let matches = Selector::new(target).select(root);
        let found = matches.len();
        matches
            .into_iter()
            .nth(index)
            .ok_or_else(|| LookupError::IndexOutOfRange {
                kind: kind.to_owned(),
                name: name.to_owned(),
                index,
                found,
            })
    }
}

static DISPATCHER: Lazy<Dispatcher> = Lazy::new(Dispatcher::new);

/// [`Dispatcher::dispatch`] on the crate-wide naming convention.
pub fn dispatch<'a>(kind: &str, name: &str, index: usize, root: &'a Value) -> Result<&'a AstNode, LookupError> {
    DISPATCHER.dispatch(kind, name, index, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn select_stmt(span: Span, nested: Option<Value>) -> Value {
        let mut node = AstNode::new(NodeKind::SelectStmt, span);
        if let Some(nested) = nested {
            node.set("where_clause", nested);
        }
        node.into()
    }

    fn script(body: Vec<Value>) -> Value {
        let mut node = AstNode::new(NodeKind::Script, Span::default());
        node.set("body", Value::List(body));
        node.into()
    }

    #[test]
    fn default_bound_stops_at_the_target_priority() {
        let inner = select_stmt(Span::new(10, 20), None);
        let tree = script(vec![select_stmt(Span::new(0, 20), Some(inner))]);

        assert_eq!(select(&tree, NodeKind::SelectStmt, None).len(), 1);
        let deep = select(&tree, NodeKind::SelectStmt, Some(999));
        assert_eq!(deep.len(), 2);
        assert_eq!(deep[0].span(), Span::new(0, 20));
        assert_eq!(deep[1].span(), Span::new(10, 20));
    }

    #[test]
    fn zero_bound_only_checks_the_root() {
        let tree = script(vec![select_stmt(Span::new(0, 5), None)]);
        assert!(select(&tree, NodeKind::SelectStmt, Some(0)).is_empty());
        assert_eq!(select(&tree, NodeKind::Script, Some(0)).len(), 1);
    }

    #[test]
    fn names_follow_the_statement_convention() {
        assert_eq!(Dispatcher::classify(NodeKind::SelectStmt), ("statement", "select".to_owned()));
        assert_eq!(Dispatcher::classify(NodeKind::BinaryExpr), ("other", "binaryexpr".to_owned()));

        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.resolve("statement", "select"), Ok(NodeKind::SelectStmt));
        assert_eq!(dispatcher.resolve("other", "unshaped"), Ok(NodeKind::Unshaped));
        assert!(matches!(
            dispatcher.resolve("other", "select"),
            Err(LookupError::UnknownNode { .. })
        ));
    }

    #[test]
    fn dispatch_indexes_matches() {
        let tree = script(vec![select_stmt(Span::new(0, 5), None), select_stmt(Span::new(6, 9), None)]);
        assert_eq!(dispatch("statement", "select", 1, &tree).unwrap().span(), Span::new(6, 9));
        assert_eq!(
            dispatch("statement", "select", 2, &tree).unwrap_err(),
            LookupError::IndexOutOfRange {
                kind: "statement".into(),
                name: "select".into(),
                index: 2,
                found: 2,
            }
        );
    }
}
