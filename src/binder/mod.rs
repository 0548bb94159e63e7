//! Rule binding table.
//!
//! Maps every CST rule or alternative label the AST layer cares about to what
//! the visitor should do with it: build a node kind (optionally through a
//! custom factory), run a classless rewrite hook, or drop syntax tokens before
//! collapsing. The table is built once from the declarations in [`decls`] and
//! passed by reference; it is read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::ast::{NodeKind, Value};
use crate::errors::BinderConfigError;
use crate::syntax::cst::CstNode;
use crate::visitor::Visitor;

pub mod decls;
pub mod spec;

pub use decls::NodeDecl;
pub use spec::{FieldPath, FieldSpec};

/// Builds the value for a CST node the visitor reached.
pub type Factory = fn(&Visitor<'_>, &CstNode<'_>) -> Value;

/// Which pure syntax tokens an otherwise unbound rule discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxFilter {
    /// Every direct token child.
    AllTokens,
    /// Only the named token rules.
    Tokens(&'static [&'static str]),
}

impl SyntaxFilter {
    pub fn drops(&self, node: &CstNode<'_>) -> bool {
        node.is_terminal()
            && match self {
                SyntaxFilter::AllTokens => true,
                SyntaxFilter::Tokens(names) => names.contains(&node.name.as_str()),
            }
    }
}

#[derive(Clone, Copy)]
pub enum Binding {
    /// Build `kind` from its field spec, or through `factory` when present.
    Node {
        kind: NodeKind,
        factory: Option<Factory>,
    },
    /// Rewrite without a node kind of its own.
    Hook(Factory),
    /// Generic collapse after dropping tokens.
    Syntax(SyntaxFilter),
}

impl Binding {
    fn owner(&self) -> String {
        match self {
            Binding::Node { kind, .. } => kind.name().to_owned(),
            Binding::Hook(_) => "a hook".to_owned(),
            Binding::Syntax(_) => "a syntax filter".to_owned(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Node { kind, factory } => f
                .debug_struct("Node")
                .field("kind", kind)
                .field("custom_factory", &factory.is_some())
                .finish(),
            Binding::Hook(_) => f.write_str("Hook"),
            Binding::Syntax(filter) => f.debug_tuple("Syntax").field(filter).finish(),
        }
    }
}

static EMPTY_SPEC: FieldSpec = FieldSpec::empty();

/// Immutable mapping from rule names to bindings, plus the compiled field
/// spec of every node kind.
#[derive(Debug, Default)]
pub struct RuleBindingTable {
    bindings: HashMap<String, Binding>,
    specs: HashMap<NodeKind, FieldSpec>,
}

impl RuleBindingTable {
    /// Build the table from the crate's own declarations.
    pub fn build() -> Result<Self, BinderConfigError> {
        Self::from_decls(decls::NODES, decls::HOOKS, decls::SYNTAX)
    }

    /// Build a table from explicit declarations. A rule name bound twice, a
    /// malformed path or an undeclared target field is an error.
    pub fn from_decls(
        nodes: &[NodeDecl],
        hooks: &[(&'static str, Factory)],
        syntax: &[(&'static str, SyntaxFilter)],
    ) -> Result<Self, BinderConfigError> {
        let mut table = Self::default();

        for decl in nodes {
            let spec = FieldSpec::compile(decl.kind, decl.fields, decl.merges)?;
            table.specs.insert(decl.kind, spec);
            for &(rule, factory) in decl.rules {
                table.bind(rule, Binding::Node { kind: decl.kind, factory })?;
            }
        }
        for &(rule, factory) in hooks {
            table.bind(rule, Binding::Hook(factory))?;
        }
        for &(rule, filter) in syntax {
            table.bind(rule, Binding::Syntax(filter))?;
        }

        debug!(
            rules = table.bindings.len(),
            kinds = table.specs.len(),
            "built rule binding table"
        );
        Ok(table)
    }

    fn bind(&mut self, rule: &str, binding: Binding) -> Result<(), BinderConfigError> {
        if let Some(existing) = self.bindings.get(rule) {
            return Err(BinderConfigError::DuplicateBinding {
                rule: rule.to_owned(),
                first: existing.owner(),
                second: binding.owner(),
            });
        }
        self.bindings.insert(rule.to_owned(), binding);
        Ok(())
    }

    pub fn binding(&self, rule: &str) -> Option<&Binding> {
        self.bindings.get(rule)
    }

    /// Compiled spec of `kind`; empty for kinds without declarations.
    pub fn spec(&self, kind: NodeKind) -> &FieldSpec {
        self.specs.get(&kind).unwrap_or(&EMPTY_SPEC)
    }

    /// Every bound rule name, sorted.
    pub fn rules(&self) -> Vec<&str> {
        let mut rules: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        rules.sort_unstable();
        rules
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nothing(_: &Visitor<'_>, _: &CstNode<'_>) -> Value {
        Value::Null
    }

    #[test]
    fn crate_declarations_build() {
        let table = RuleBindingTable::build().unwrap();
        assert!(matches!(
            table.binding("query_block"),
            Some(Binding::Node { kind: NodeKind::SelectStmt, factory: None })
        ));
        assert!(matches!(table.binding("SubqueryParen"), Some(Binding::Hook(_))));
        assert!(matches!(
            table.binding("where_clause"),
            Some(Binding::Syntax(SyntaxFilter::Tokens(&["WHERE"])))
        ));
        assert!(table.binding("hierarchical_query_clause").is_none());
        assert!(table.spec(NodeKind::Unshaped).is_empty());
    }

    #[test]
    fn table_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleBindingTable>();
    }

    #[test]
    fn duplicate_binding_is_rejected() {
        let err = RuleBindingTable::from_decls(
            &[NodeDecl {
                kind: NodeKind::Star,
                rules: &[("star", None)],
                fields: &[],
                merges: &[],
            }],
            &[("star", nothing as Factory)],
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            BinderConfigError::DuplicateBinding {
                rule: "star".into(),
                first: "Star".into(),
                second: "a hook".into(),
            }
        );
    }

    #[test]
    fn malformed_path_fails_at_construction() {
        let err = RuleBindingTable::from_decls(
            &[NodeDecl {
                kind: NodeKind::SortBy,
                rules: &[("order_by_elements", None)],
                fields: &[("expr", "expression[].x")],
                merges: &[],
            }],
            &[],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, BinderConfigError::MalformedPath { .. }));
    }

    #[test]
    fn syntax_filters_only_drop_tokens() {
        let token = CstNode {
            name: "WHERE".into(),
            tag: None,
            span: Default::default(),
            text: "WHERE",
            children: vec![],
        };
        let rule = CstNode {
            name: "condition".into(),
            ..token.clone()
        };
        assert!(SyntaxFilter::AllTokens.drops(&token));
        assert!(SyntaxFilter::Tokens(&["WHERE"]).drops(&token));
        assert!(!SyntaxFilter::Tokens(&["HAVING"]).drops(&token));
        assert!(!SyntaxFilter::AllTokens.drops(&rule));
    }
}
