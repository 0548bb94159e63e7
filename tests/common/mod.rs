//! # Shared test helpers
//!
//! One binding table for every integration test, plus loaders for the SQL
//! example corpus under `tests/fixtures/`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use plsql_ast::{parse, AstNode, NodeKind, ParseOptions, RuleBindingTable, StartRule, Value};
use walkdir::WalkDir;

pub static TABLE: Lazy<RuleBindingTable> =
    Lazy::new(|| RuleBindingTable::build().expect("binding declarations are valid"));

/// Non-strict parse from `start`.
pub fn parse_as(source: &str, start: StartRule) -> Value {
    parse(source, &ParseOptions::new(start), &TABLE).expect("non-strict parses never fail")
}

/// Strict parse from `start`.
pub fn parse_strict(source: &str, start: StartRule) -> Value {
    match parse(source, &ParseOptions::new(start).strict(true), &TABLE) {
        Ok(tree) => tree,
        Err(e) => panic!("failed to parse {source:?}: {e}"),
    }
}

pub fn script(source: &str) -> Value {
    parse_strict(source, StartRule::SqlScript)
}

/// The statements of a parsed script.
pub fn body(tree: &Value) -> &[Value] {
    tree.as_node()
        .expect("script node")
        .field("body")
        .as_list()
        .expect("script body")
}

pub fn node(value: &Value) -> &AstNode {
    value.as_node().unwrap_or_else(|| panic!("expected a node, got {value}"))
}

pub fn expect_kind(value: &Value, kind: NodeKind) -> &AstNode {
    let node = node(value);
    assert_eq!(node.kind(), kind, "unexpected node {node}");
    node
}

/// Text parts of an Identifier.
pub fn ident_parts(value: &Value) -> Vec<String> {
    expect_kind(value, NodeKind::Identifier)
        .field("fields")
        .as_list()
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Every `.sql` file below `dir`, sorted by path.
pub fn load_sql_files(dir: &Path) -> Vec<(PathBuf, String)> {
    let mut files: Vec<(PathBuf, String)> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "sql"))
        .map(|e| {
            let source = std::fs::read_to_string(e.path())
                .unwrap_or_else(|err| panic!("failed to read '{}': {err}", e.path().display()));
            (e.path().to_path_buf(), source)
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}
