//! YAML fixture batches.
//!
//! A batch maps start rule names to lists of SQL snippets, either at the top
//! level or under a `code` key:
//!
//! ```yaml
//! code:
//!   expression:
//!     - a + b
//!   sql_script:
//!     - SELECT a FROM b
//! ```
//!
//! Every snippet is parsed strictly.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::ast::Value;
use crate::binder::RuleBindingTable;
use crate::errors::AstError;
use crate::syntax::parser::StartRule;
use crate::{parse, ParseOptions};

type Snippets = BTreeMap<String, Vec<String>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Batch {
    Nested { code: Snippets },
    Flat(Snippets),
}

impl Batch {
    fn into_snippets(self) -> Snippets {
        match self {
            Batch::Nested { code } => code,
            Batch::Flat(snippets) => snippets,
        }
    }
}

/// Parse every snippet of a YAML batch, keyed by start rule name.
pub fn parse_yaml_batch(yaml: &str, table: &RuleBindingTable) -> Result<BTreeMap<String, Vec<Value>>, AstError> {
    let batch: Batch = serde_yaml::from_str(yaml)?;
    let mut out = BTreeMap::new();

    for (start, snippets) in batch.into_snippets() {
        let options = ParseOptions::new(start.parse::<StartRule>()?).strict(true);
        let trees = snippets
            .iter()
            .map(|sql| parse(sql, &options, table))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(start = %start, count = trees.len(), "parsed fixture snippets");
        out.insert(start, trees);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn nested_and_flat_batches_agree() {
        let table = RuleBindingTable::build().unwrap();
        let nested = "code:\n  expression:\n    - a + b\n    - NOT a\n";
        let flat = "expression:\n  - a + b\n  - NOT a\n";

        let nested = parse_yaml_batch(nested, &table).unwrap();
        assert_eq!(nested, parse_yaml_batch(flat, &table).unwrap());

        let trees = &nested["expression"];
        assert_eq!(trees[0].kind(), Some(NodeKind::BinaryExpr));
        assert_eq!(trees[1].kind(), Some(NodeKind::UnaryExpr));
    }

    #[test]
    fn batches_are_strict() {
        let table = RuleBindingTable::build().unwrap();
        let err = parse_yaml_batch("sql_script:\n  - SELECT x FROM ____\n", &table).unwrap_err();
        assert!(matches!(err, AstError::Parse(_)));

        let err = parse_yaml_batch("statement:\n  - SELECT 1\n", &table).unwrap_err();
        assert!(matches!(err, AstError::StartRule(_)));
    }
}
