// tests/fixture_tests.rs
//
// Runs the SQL example corpus under tests/fixtures/ through the parser.

mod common;

use common::{body, fixtures_dir, load_sql_files, parse_strict, TABLE};
use plsql_ast::fixtures::parse_yaml_batch;
use plsql_ast::{select, NodeKind, StartRule, Value};

#[test]
fn every_example_parses_strictly() {
    let files = load_sql_files(&fixtures_dir());
    assert!(files.len() >= 4, "example corpus is missing");

    for (path, source) in &files {
        let tree = parse_strict(source, StartRule::SqlScript);
        let statements = body(&tree);
        assert!(!statements.is_empty(), "{} has no statements", path.display());

        for stmt in statements {
            assert!(
                matches!(stmt.kind(), Some(NodeKind::SelectStmt | NodeKind::Union)),
                "{}: unexpected statement {stmt}",
                path.display()
            );
        }
    }
}

#[test]
fn statement_text_round_trips() {
    for (path, source) in load_sql_files(&fixtures_dir()) {
        let tree = parse_strict(&source, StartRule::SqlScript);
        for stmt in body(&tree) {
            let text = stmt.text(&source).unwrap();
            let reparsed = parse_strict(text, StartRule::SelectStatement);
            assert_eq!(&reparsed, stmt, "{}: {text}", path.display());
        }
    }
}

#[test]
fn dumps_are_valid_json() {
    for (path, source) in load_sql_files(&fixtures_dir()) {
        let tree = parse_strict(&source, StartRule::SqlScript);
        let json = serde_json::to_string(&tree).unwrap();
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree.dump(), "{}", path.display());
        assert_eq!(back["type"], "Script");
    }
}

#[test]
fn nested_selects_are_found_only_on_request() {
    let source = std::fs::read_to_string(fixtures_dir().join("queries").join("subqueries.sql")).unwrap();
    let tree = parse_strict(&source, StartRule::SqlScript);

    let top = select(&tree, NodeKind::SelectStmt, None);
    let all = select(&tree, NodeKind::SelectStmt, Some(u32::MAX));
    assert!(all.len() > top.len());
    assert!(top.iter().all(|stmt| all.contains(stmt)));
}

#[test]
fn yaml_batch_parses_every_snippet() {
    let yaml = std::fs::read_to_string(fixtures_dir().join("batch.yml")).unwrap();
    let batch = parse_yaml_batch(&yaml, &TABLE).unwrap();

    let starts: Vec<&str> = batch.keys().map(String::as_str).collect();
    assert_eq!(starts, ["condition", "expression", "from_clause", "sql_script"]);
    assert_eq!(batch["expression"].len(), 4);
    assert_eq!(batch["expression"][1].kind(), Some(NodeKind::UnaryExpr));
    assert_eq!(batch["condition"][0].kind(), Some(NodeKind::UnaryExpr));
    assert_eq!(batch["from_clause"][0].kind(), Some(NodeKind::JoinExpr));

    let script: &Value = &batch["sql_script"][0];
    assert_eq!(body(script).len(), 2);
}
