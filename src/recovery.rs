//! Best-effort trees for input the grammar rejects.
//!
//! A script is cut at its top-level `;` boundaries and every statement is
//! parsed on its own: statements that parse keep their full AST, the others
//! become Fallback nodes holding their raw text. Any other start rule falls
//! back to the whole input.

use tracing::warn;

use crate::ast::{AstNode, Terminal, Value};
use crate::hooks::script_node;
use crate::syntax::parser::{parse_cst_at, split_statements, StartRule};
use crate::syntax::Span;
use crate::visitor::Visitor;

pub fn recover(visitor: &Visitor<'_>, start: StartRule) -> Value {
    let source = visitor.source();
    let whole = Span::new(0, source.len());
    if start != StartRule::SqlScript {
        return raw_text(source, whole);
    }

    let body = split_statements(source)
        .into_iter()
        .map(|span| match parse_cst_at(source, span, StartRule::SelectStatement) {
            Ok(tree) => visitor.visit(&tree),
            Err(err) => {
                warn!(line = err.line, column = err.column, "keeping unparsable statement as raw text");
                raw_text(source, span)
            }
        })
        .collect();
    script_node(body, whole)
}

fn raw_text(source: &str, span: Span) -> Value {
    AstNode::fallback(vec![Terminal::raw(span.slice(source), span).into()], span).into()
}
