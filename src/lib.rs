//! PL/SQL concrete syntax trees, normalized into a uniform AST.
//!
//! ```rust
//! use plsql_ast::{parse, ParseOptions, RuleBindingTable};
//! use plsql_ast::select::dispatch;
//!
//! let table = RuleBindingTable::build().unwrap();
//! let source = "SELECT a FROM x; SELECT b FROM y;";
//! let tree = parse(source, &ParseOptions::default(), &table).unwrap();
//!
//! let second = dispatch("statement", "select", 1, &tree).unwrap();
//! assert_eq!(second.text(source), "SELECT b FROM y");
//! ```

use tracing::warn;

pub mod ast;
pub mod binder;
pub mod cli;
pub mod errors;
pub mod fixtures;
pub mod hooks;
pub mod recovery;
pub mod select;
pub mod syntax;
pub mod visitor;

pub use ast::{get_text, AstNode, NodeKind, Terminal, Value};
pub use binder::RuleBindingTable;
pub use errors::{AstError, BinderConfigError, LookupError, ParseError};
pub use select::{dispatch, select, Dispatcher, Selector};
pub use syntax::parser::StartRule;
pub use syntax::Span;
pub use visitor::Visitor;

/// How a parse is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub start: StartRule,
    /// Fail on input the grammar rejects instead of recovering.
    pub strict: bool,
}

impl ParseOptions {
    pub fn new(start: StartRule) -> Self {
        Self { start, strict: false }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Parse `source` from `options.start` and normalize it into an AST.
pub fn parse(source: &str, options: &ParseOptions, table: &RuleBindingTable) -> Result<Value, ParseError> {
    let visitor = Visitor::new(table, source);
    match syntax::parser::parse_cst(source, options.start) {
        Ok(tree) => Ok(visitor.visit(&tree)),
        Err(err) if options.strict => Err(err),
        Err(err) => {
            warn!(start = %options.start, line = err.line, column = err.column, "{}; recovering", err.message);
            Ok(recovery::recover(&visitor, options.start))
        }
    }
}
