//! Error types.
//!
//! Each operation returns its own error type; [`AstError`] gathers them for
//! callers (the CLI, fixture batches) that drive several operations at once.
//! Every error is a `miette` diagnostic with a stable code.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::parser::StartRule;
use crate::syntax::Span;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// The grammar rejected the input in strict mode.
#[derive(Debug, Error, Diagnostic)]
#[error("Parse error: {message} (line {line}, column {column})")]
#[diagnostic(code(plsql_ast::parse))]
pub struct ParseError {
    pub message: String,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure, in characters.
    pub column: usize,
    pub start_rule: StartRule,
    #[source_code]
    src: Arc<NamedSource<String>>,
    #[label("{label}")]
    span: SourceSpan,
    label: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, source: &str, span: Span, start_rule: StartRule) -> Self {
        let (line, column) = line_col(source, span.start);
        Self {
            message: message.into(),
            line,
            column,
            start_rule,
            src: Arc::new(NamedSource::new(format!("<{start_rule}>"), source.to_owned())),
            span: span.into(),
            label: format!("while parsing {start_rule}"),
        }
    }

    /// Byte offset of the failure.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

/// A start rule name that the grammar does not expose.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
#[error("unknown start rule '{name}'")]
#[diagnostic(
    code(plsql_ast::parse::start_rule),
    help("expected one of: sql_script, select_statement, subquery, query_block, expression, condition, unary_expression, where_clause, order_by_clause, table_ref, from_clause")
)]
pub struct UnknownStartRule {
    pub name: String,
}

// ============================================================================
// BINDER ERRORS
// ============================================================================

/// The rule binding table could not be built from its declarations.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum BinderConfigError {
    #[error("rule '{rule}' is bound twice: by {first} and by {second}")]
    #[diagnostic(code(plsql_ast::binder::duplicate))]
    DuplicateBinding {
        rule: String,
        first: String,
        second: String,
    },

    #[error("malformed field path '{path}' for {kind}.{field}")]
    #[diagnostic(
        code(plsql_ast::binder::path),
        help("paths are dotted identifiers; only the last segment may end in []")
    )]
    MalformedPath {
        kind: &'static str,
        field: String,
        path: String,
    },

    #[error("{kind} has no field named '{field}'")]
    #[diagnostic(code(plsql_ast::binder::field))]
    UnknownField { kind: &'static str, field: String },

    #[error("{kind}.{field} is both assigned and merged")]
    #[diagnostic(code(plsql_ast::binder::conflict))]
    ConflictingField { kind: &'static str, field: String },
}

// ============================================================================
// LOOKUP ERRORS
// ============================================================================

/// A dispatcher lookup failed.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum LookupError {
    #[error("no {kind} node named '{name}'")]
    #[diagnostic(code(plsql_ast::lookup::unknown))]
    UnknownNode { kind: String, name: String },

    #[error("index {index} out of range: found {found} {kind} '{name}' node(s)")]
    #[diagnostic(code(plsql_ast::lookup::index))]
    IndexOutOfRange {
        kind: String,
        name: String,
        index: usize,
        found: usize,
    },
}

// ============================================================================
// UMBRELLA
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum AstError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Binder(#[from] BinderConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    StartRule(#[from] UnknownStartRule),

    #[error("invalid fixture batch: {0}")]
    #[diagnostic(code(plsql_ast::fixture))]
    Fixture(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code(plsql_ast::io))]
    Io(#[from] std::io::Error),
}

// ============================================================================
// UTILITIES
// ============================================================================

/// 1-based (line, column) of a byte offset. Columns count characters.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
