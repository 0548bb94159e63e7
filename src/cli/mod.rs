//! The `plsql-ast` command-line interface.
//!
//! Parses SQL files with the library and prints dumps, node text, selector
//! matches or AST diffs. Errors are rendered as miette diagnostics.

use std::io::{self, Read};
use std::path::Path;
use std::{fs, process};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, ParseArgs, PlSqlArgs};
use crate::errors::AstError;
use crate::select::{Dispatcher, Selector};
use crate::{parse, RuleBindingTable, Value};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = PlSqlArgs::parse();

    match execute(args.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            process::exit(1);
        }
    }
}

/// `RUST_LOG` filtering, `warn` by default, written to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Runs one subcommand. `Ok(false)` means a clean run with a negative
/// answer (a diff was found).
fn execute(command: Command) -> Result<bool, AstError> {
    let table = RuleBindingTable::build()?;

    match command {
        Command::Dump { parse, file } => {
            let source = read_source(&file)?;
            let tree = parse_with(&parse, &source, &table)?;
            output::print_dump(&tree);
        }
        Command::Text {
            parse,
            kind,
            name,
            index,
            file,
        } => {
            let source = read_source(&file)?;
            let tree = parse_with(&parse, &source, &table)?;
            let node = crate::select::dispatch(&kind, &name, index, &tree)?;
            println!("{}", node.text(&source));
        }
        Command::Select {
            parse,
            kind,
            name,
            deep,
            file,
        } => {
            let source = read_source(&file)?;
            let tree = parse_with(&parse, &source, &table)?;
            let target = Dispatcher::new().resolve(&kind, &name)?;
            let mut selector = Selector::new(target);
            if deep {
                selector = selector.with_priority(u32::MAX);
            }
            output::print_matches(&selector.select(&tree), &source);
        }
        Command::Diff { parse, left, right } => {
            let left_source = read_source(&left)?;
            let right_source = read_source(&right)?;
            let left = parse_with(&parse, &left_source, &table)?;
            let right = parse_with(&parse, &right_source, &table)?;
            return Ok(!output::print_dump_diff(&left, &right));
        }
    }
    Ok(true)
}

fn parse_with(args: &ParseArgs, source: &str, table: &RuleBindingTable) -> Result<Value, AstError> {
    Ok(parse(source, &args.options(), table)?)
}

/// File contents, or stdin for `-`.
fn read_source(path: &Path) -> Result<String, AstError> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    Ok(fs::read_to_string(path)?)
}
