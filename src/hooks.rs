//! Transform hooks.
//!
//! Custom factories for the CST shapes that a plain field spec cannot
//! normalize: parenthesis unwrapping, ORDER BY hoisting on set operations,
//! NOT wrapping, join re-association and friends. Every hook receives the
//! visitor and the CST node it is bound to, and returns the finished value.
//! Corrections to a freshly built node happen here, before it is shared.

use std::sync::Arc;

use crate::ast::{AstNode, NodeKind, Terminal, Value};
use crate::syntax::cst::CstNode;
use crate::syntax::Span;
use crate::visitor::Visitor;

// ============================================================================
// STATEMENTS
// ============================================================================

/// `sql_script`: the body is every statement, in order.
pub fn script(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let body = cst
        .children
        .iter()
        .filter(|c| !c.is_terminal())
        .map(|c| v.visit(c))
        .collect();
    script_node(body, cst.span)
}

pub fn script_node(body: Vec<Value>, span: Span) -> Value {
    let mut node = AstNode::new(NodeKind::Script, span);
    node.set("body", Value::List(body));
    node.into()
}

/// `select_statement`: visit the query and hand it the WITH clause.
pub fn select_statement(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let mut query = v.visit_child(cst, "subquery");
    let Some(with) = cst.child("subquery_factoring_clause") else {
        return query;
    };

    match attach_with(&mut query, v.visit(with), with.span) {
        Ok(()) => query,
        Err(with) => AstNode::fallback(vec![with, query], cst.span).into(),
    }
}

/// Give `with` to the leftmost SELECT of `query`, widening the spans along
/// the way to `span`. Hands `with` back when there is no SELECT to attach
/// it to.
fn attach_with(query: &mut Value, with: Value, span: Span) -> Result<(), Value> {
    let Value::Node(node) = query else {
        return Err(with);
    };
    let node = Arc::make_mut(node);

    match node.kind() {
        NodeKind::SelectStmt => {
            node.set("with_clause", with);
        }
        NodeKind::Union => match node.field_mut("left") {
            Some(left) => attach_with(left, with, span)?,
            None => return Err(with),
        },
        _ => return Err(with),
    }

    node.set_span(node.span().cover(span));
    Ok(())
}

/// `( subquery )` at statement level is the subquery itself.
pub fn subquery_paren(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    v.visit_child(cst, "subquery")
}

/// Set operations. An ORDER BY parsed onto the right-hand SELECT applies to
/// the whole compound, unless that SELECT was parenthesized.
pub fn set_operation(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let mut node = v.resolve(NodeKind::Union, cst);
    let parenthesized = cst.child("right").is_some_and(|r| r.name == "SubqueryParen");

    let order_by = match node.field_mut("right") {
        Some(Value::Node(right)) if !parenthesized && right.kind() == NodeKind::SelectStmt => {
            Arc::make_mut(right).take("order_by_clause")
        }
        _ => Value::Null,
    };
    node.set("order_by_clause", order_by);
    node.into()
}

// ============================================================================
// SELECT LIST AND FROM CLAUSE
// ============================================================================

/// `alias_expr`: an expression without an alias is just the expression.
pub fn alias_expr(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    if cst.has_child("alias") {
        v.resolve(NodeKind::AliasExpr, cst).into()
    } else {
        v.visit_children(cst, None)
    }
}

/// `table_ref_aux`: a table expression, wrapped in an alias when it has one.
pub fn table_ref_aux(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let expr = v.visit_child(cst, "dml_table_expression_clause");
    match cst.child("table_alias") {
        Some(alias) => {
            let mut node = AstNode::new(NodeKind::AliasExpr, cst.span);
            node.set("expr", expr);
            node.set("alias", v.visit(alias));
            node.into()
        }
        None => expr,
    }
}

/// `JoinExpr`: fields come from the join clause, the left side from the
/// enclosing alternative. Chains come out left-deep.
pub fn join_expr(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let Some(clause) = cst.child("join_clause") else {
        return v.visit_children(cst, None);
    };
    let mut node = v.resolve(NodeKind::JoinExpr, clause);
    node.set_span(cst.span);
    node.set("left", v.visit_child(cst, "left"));
    node.into()
}

/// `t.*`: the identifier's parts followed by a Star node.
pub fn star_table(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let mut ident = match cst.child("dot_id").map(|c| v.visit(c)) {
        Some(Value::Node(ident)) if ident.kind() == NodeKind::Identifier => ident,
        _ => return v.visit_children(cst, None),
    };
    let star = v.visit_child(cst, "star");

    let node = Arc::make_mut(&mut ident);
    if let Some(Value::List(fields)) = node.field_mut("fields") {
        fields.push(star);
    }
    node.set_span(cst.span);
    Value::Node(ident)
}

pub fn into_clause(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    Value::List(cst.children_matching("variable_name").map(|c| v.visit(c)).collect())
}

// ============================================================================
// OPERATORS
// ============================================================================

/// A predicate that may be negated in place (`a NOT LIKE b`).
///
/// The negated form is a UnaryExpr around the predicate; both shapes expose
/// the predicate so that hooks can finish it before the wrapper is built.
enum Wrapped {
    Negated { op: Value, span: Span, inner: AstNode },
    Plain(AstNode),
}

impl Wrapped {
    fn new(v: &Visitor<'_>, cst: &CstNode<'_>, inner: AstNode) -> Self {
        match cst.child("NOT") {
            Some(not) => Wrapped::Negated {
                op: v.visit(not),
                span: cst.span,
                inner,
            },
            None => Wrapped::Plain(inner),
        }
    }

    fn attach_right(&mut self, right: Value) {
        match self {
            Wrapped::Negated { inner, .. } | Wrapped::Plain(inner) => {
                inner.set("right", right);
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Wrapped::Plain(inner) => inner.into(),
            Wrapped::Negated { op, span, inner } => {
                let mut node = AstNode::new(NodeKind::UnaryExpr, span);
                node.set("op", op);
                node.set("expr", inner.into());
                node.into()
            }
        }
    }
}

/// BETWEEN, LIKE and MEMBER OF, with optional NOT.
pub fn not_wrapped(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let inner = v.resolve(NodeKind::BinaryExpr, cst);
    Wrapped::new(v, cst, inner).finish()
}

/// IN, with optional NOT. The right side is a subquery or an expression
/// list and always lands on the predicate, never on the NOT wrapper.
pub fn in_expr(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let inner = v.resolve(NodeKind::BinaryExpr, cst);
    let mut wrapped = Wrapped::new(v, cst, inner);

    let right = match cst.child("subquery") {
        Some(subquery) => v.visit(subquery),
        None => v.visit_child(cst, "expression_list"),
    };
    wrapped.attach_right(right);
    wrapped.finish()
}

pub fn expression_list(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    Value::List(cst.children_matching("expression").map(|c| v.visit(c)).collect())
}

// ============================================================================
// CALLS
// ============================================================================

/// Built-in aggregate, analytic and string functions: the name is the
/// upper-cased function keyword.
pub fn builtin_call(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    let mut node = v.resolve(NodeKind::Call, cst);
    if let Some(keyword) = cst.children.first() {
        node.set("name", Terminal::raw(keyword.text.to_uppercase(), keyword.span).into());
    }
    node.into()
}

/// `(arg, ...)`: one value per argument, however the arguments collapse.
pub fn argument_list(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    Value::List(cst.children_matching("argument").map(|c| v.visit(c)).collect())
}

/// A plain analytic argument list is the list of its arguments.
pub fn analytic_arguments(v: &Visitor<'_>, cst: &CstNode<'_>) -> Value {
    if cst.has_child("respect_or_ignore_nulls") {
        return v.visit_children(cst, None);
    }
    argument_list(v, cst)
}
