//! Field specifications.
//!
//! A [`FieldSpec`] maps AST field names to [`FieldPath`]s into the CST. Paths
//! are dotted segments, each naming a tag or a rule; a trailing `[]` collects
//! every match as a list. Paths are compiled once, when the binding table is
//! built.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::NodeKind;
use crate::errors::BinderConfigError;

static PATH_SYNTAX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*(\[\])?$")
        .expect("path syntax pattern is valid")
});

/// A compiled CST path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
    many: bool,
}

impl FieldPath {
    /// Compile `path`; `None` when it is malformed.
    pub fn parse(path: &str) -> Option<Self> {
        if !PATH_SYNTAX.is_match(path) {
            return None;
        }
        let (body, many) = match path.strip_suffix("[]") {
            Some(body) => (body, true),
            None => (path, false),
        };
        Some(Self {
            segments: body.split('.').map(str::to_owned).collect(),
            many,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the last segment collects every match.
    pub fn is_many(&self) -> bool {
        self.many
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))?;
        if self.many {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// The compiled field specification of one node kind.
///
/// Plain entries are tried in order and the first non-null result wins for
/// each field. Merge entries visit every listed path and splice the results
/// into a single list.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    entries: Vec<(&'static str, FieldPath)>,
    merges: Vec<(&'static str, Vec<FieldPath>)>,
}

impl FieldSpec {
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
            merges: Vec::new(),
        }
    }

    pub fn compile(
        kind: NodeKind,
        fields: &[(&'static str, &str)],
        merges: &[(&'static str, &[&str])],
    ) -> Result<Self, BinderConfigError> {
        let mut spec = Self::empty();

        for &(field, path) in fields {
            check_field(kind, field)?;
            spec.entries.push((field, compile_path(kind, field, path)?));
        }

        for &(field, paths) in merges {
            check_field(kind, field)?;
            if spec.entries.iter().any(|(f, _)| *f == field) {
                return Err(BinderConfigError::ConflictingField {
                    kind: kind.name(),
                    field: field.to_owned(),
                });
            }
            let paths = paths
                .iter()
                .map(|p| compile_path(kind, field, p))
                .collect::<Result<Vec<_>, _>>()?;
            spec.merges.push((field, paths));
        }

        Ok(spec)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &FieldPath)> {
        self.entries.iter().map(|(f, p)| (*f, p))
    }

    pub fn merges(&self) -> impl Iterator<Item = (&'static str, &[FieldPath])> {
        self.merges.iter().map(|(f, p)| (*f, p.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.merges.is_empty()
    }
}

fn check_field(kind: NodeKind, field: &str) -> Result<(), BinderConfigError> {
    match kind.field_index(field) {
        Some(_) => Ok(()),
        None => Err(BinderConfigError::UnknownField {
            kind: kind.name(),
            field: field.to_owned(),
        }),
    }
}

fn compile_path(kind: NodeKind, field: &str, path: &str) -> Result<FieldPath, BinderConfigError> {
    FieldPath::parse(path).ok_or_else(|| BinderConfigError::MalformedPath {
        kind: kind.name(),
        field: field.to_owned(),
        path: path.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_compile() {
        let path = FieldPath::parse("join_using_part.paren_column_list.identifier[]").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert!(path.is_many());
        assert_eq!(path.to_string(), "join_using_part.paren_column_list.identifier[]");

        let single = FieldPath::parse("ASTERISK").unwrap();
        assert!(!single.is_many());
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for bad in ["", "a..b", "a[].b", ".a", "a.", "a b", "a[]x", "1a", "a-b"] {
            assert!(FieldPath::parse(bad).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn compile_reports_the_offending_field() {
        let err = FieldSpec::compile(NodeKind::SortBy, &[("expr", "expression"), ("direction", "sort..direction")], &[])
            .unwrap_err();
        assert_eq!(
            err,
            BinderConfigError::MalformedPath {
                kind: "SortBy",
                field: "direction".into(),
                path: "sort..direction".into(),
            }
        );
    }

    #[test]
    fn undeclared_target_field_is_rejected() {
        let err = FieldSpec::compile(NodeKind::Star, &[("expr", "expression")], &[]).unwrap_err();
        assert!(matches!(err, BinderConfigError::UnknownField { kind: "Star", .. }));
    }

    #[test]
    fn merged_fields_cannot_also_be_assigned() {
        let err = FieldSpec::compile(NodeKind::Call, &[("args", "function_argument")], &[("args", &["concatenation"])])
            .unwrap_err();
        assert!(matches!(err, BinderConfigError::ConflictingField { .. }));
    }
}
