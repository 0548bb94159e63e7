//! Handles all user-facing output for the CLI.
//!
//! JSON dumps, node listings and colored diffs are printed from here so that
//! every subcommand formats its results the same way.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::{AstNode, Value};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Pretty JSON for a dump.
pub fn render_dump(value: &Value) -> String {
    // A `serde_json::Value` always serializes.
    serde_json::to_string_pretty(&value.dump()).unwrap_or_default()
}

pub fn print_dump(value: &Value) {
    println!("{}", render_dump(value));
}

/// One line per node: its span, then its verbatim text.
pub fn print_matches(nodes: &[&AstNode], source: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for node in nodes {
        let span = node.span();
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        print!("{}..{}", span.start, span.end);
        let _ = stdout.reset();
        println!(" {}", node.text(source));
    }
}

/// Prints a line diff of two dumps. Returns true when they differ.
pub fn print_dump_diff(left: &Value, right: &Value) -> bool {
    let left = render_dump(left);
    let right = render_dump(right);
    let changeset = Changeset::new(&left, &right, "\n");

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    print_diff(&mut stdout, &changeset.diffs);
    changeset.distance != 0
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                print_lines(' ', x);
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                print_lines('+', x);
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                print_lines('-', x);
            }
        }
    }
    let _ = stdout.reset();
}

fn print_lines(marker: char, text: &str) {
    for line in text.lines() {
        println!("{marker}{line}");
    }
}
