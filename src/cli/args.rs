//! Command-line arguments and subcommands, declared with `clap` derive.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::syntax::parser::StartRule;
use crate::ParseOptions;

#[derive(Debug, Parser)]
#[command(
    name = "plsql-ast",
    version,
    about = "Normalize PL/SQL into a uniform AST and look up nodes in it."
)]
pub struct PlSqlArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// How the input is parsed; shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ParseArgs {
    /// Grammar rule to start from (sql_script, expression, query_block, ...).
    #[arg(long, default_value = "sql_script")]
    pub start: StartRule,

    /// Fail on syntax errors instead of recovering.
    #[arg(long)]
    pub strict: bool,
}

impl ParseArgs {
    pub fn options(&self) -> ParseOptions {
        ParseOptions::new(self.start).strict(self.strict)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the AST as JSON.
    Dump {
        #[command(flatten)]
        parse: ParseArgs,
        /// SQL file to parse, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print the source text of a dispatched node.
    Text {
        #[command(flatten)]
        parse: ParseArgs,
        /// Node group: `statement` or `other`.
        #[arg(long)]
        kind: String,
        /// Node name within the group, e.g. `select` or `binaryexpr`.
        #[arg(long)]
        name: String,
        /// Zero-based match index.
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print every node of a kind, one per line.
    Select {
        #[command(flatten)]
        parse: ParseArgs,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        name: String,
        /// Search below matches as well.
        #[arg(long)]
        deep: bool,
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Show a line diff of two ASTs. Exits with 1 when they differ.
    Diff {
        #[command(flatten)]
        parse: ParseArgs,
        #[arg(required = true)]
        left: PathBuf,
        #[arg(required = true)]
        right: PathBuf,
    },
}
