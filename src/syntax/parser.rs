//! PL/SQL parser front end.
//!
//! Runs the pest grammar from a chosen start rule and hands back a reshaped
//! [`CstNode`]. This layer is purely syntactic.

use std::fmt;
use std::str::FromStr;

use pest::error::{Error, InputLocation};
use pest::Parser;
use pest_derive::Parser;

use super::cst::{CstBuilder, CstNode};
use super::Span;
use crate::errors::{ParseError, UnknownStartRule};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct PlSqlParser;

// ============================================================================
// START RULES
// ============================================================================

/// Grammar rule a parse starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StartRule {
    #[default]
    SqlScript,
    SelectStatement,
    Subquery,
    QueryBlock,
    Expression,
    Condition,
    UnaryExpression,
    WhereClause,
    OrderByClause,
    TableRef,
    FromClause,
}

impl StartRule {
    pub const ALL: [StartRule; 11] = [
        StartRule::SqlScript,
        StartRule::SelectStatement,
        StartRule::Subquery,
        StartRule::QueryBlock,
        StartRule::Expression,
        StartRule::Condition,
        StartRule::UnaryExpression,
        StartRule::WhereClause,
        StartRule::OrderByClause,
        StartRule::TableRef,
        StartRule::FromClause,
    ];

    /// Grammar name of the rule, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            StartRule::SqlScript => "sql_script",
            StartRule::SelectStatement => "select_statement",
            StartRule::Subquery => "subquery",
            StartRule::QueryBlock => "query_block",
            StartRule::Expression => "expression",
            StartRule::Condition => "condition",
            StartRule::UnaryExpression => "unary_expression",
            StartRule::WhereClause => "where_clause",
            StartRule::OrderByClause => "order_by_clause",
            StartRule::TableRef => "table_ref",
            StartRule::FromClause => "from_clause",
        }
    }

    fn entry(self) -> Rule {
        match self {
            StartRule::SqlScript => Rule::entry_sql_script,
            StartRule::SelectStatement => Rule::entry_select_statement,
            StartRule::Subquery => Rule::entry_subquery,
            StartRule::QueryBlock => Rule::entry_query_block,
            StartRule::Expression => Rule::entry_expression,
            StartRule::Condition => Rule::entry_condition,
            StartRule::UnaryExpression => Rule::entry_unary_expression,
            StartRule::WhereClause => Rule::entry_where_clause,
            StartRule::OrderByClause => Rule::entry_order_by_clause,
            StartRule::TableRef => Rule::entry_table_ref,
            StartRule::FromClause => Rule::entry_from_clause,
        }
    }
}

impl fmt::Display for StartRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StartRule {
    type Err = UnknownStartRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StartRule::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| UnknownStartRule { name: s.to_owned() })
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse the whole of `source` from `start`.
pub fn parse_cst(source: &str, start: StartRule) -> Result<CstNode<'_>, ParseError> {
    parse_cst_at(source, Span::new(0, source.len()), start)
}

/// Parse the part of `source` under `span` from `start`. Spans in the
/// resulting tree stay relative to the whole of `source`.
pub fn parse_cst_at(source: &str, span: Span, start: StartRule) -> Result<CstNode<'_>, ParseError> {
    let input = span.slice(source);
    let mut pairs = PlSqlParser::parse(start.entry(), input)
        .map_err(|e| convert_parse_error(e, source, span.start, start))?;

    // Entry rules wrap exactly one non-silent rule followed by EOI.
    let root = pairs.find(|p| p.as_rule() != Rule::EOI).ok_or_else(|| {
        ParseError::new("empty parse tree", source, span, start)
    })?;

    Ok(CstBuilder::with_offset(source, span.start).build(root))
}

/// Split a script into the spans of its top-level statements.
///
/// Statements end at `;` outside quotes, comments and parentheses. Each span
/// is trimmed of surrounding whitespace; blank statements are skipped.
pub fn split_statements(source: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut chars = source.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' if depth == 0 => {
                push_trimmed(source, start, i, &mut spans);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_trimmed(source, start, source.len(), &mut spans);
    spans
}

// ============================================================================
// UTILITIES
// ============================================================================

fn push_trimmed(source: &str, start: usize, end: usize, spans: &mut Vec<Span>) {
    let piece = Span::new(start, end).slice(source);
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = piece.len() - piece.trim_start().len();
    spans.push(Span::new(start + lead, start + lead + trimmed.len()));
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, source: &str, offset: usize, start: StartRule) -> ParseError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos + offset, pos + offset),
        InputLocation::Span((s, e)) => Span::new(s + offset, e + offset),
    };
    let message = error.variant.message().into_owned();
    ParseError::new(message, source, span, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_rule_names_round_trip() {
        for rule in StartRule::ALL {
            assert_eq!(rule.name().parse::<StartRule>().unwrap(), rule);
        }
        assert!("statement".parse::<StartRule>().is_err());
    }

    #[test]
    fn empty_script_parses() {
        let cst = parse_cst("", StartRule::SqlScript).unwrap();
        assert_eq!(cst.name, "sql_script");
        assert!(cst.children.is_empty());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert!(parse_cst("select a from b", StartRule::SqlScript).is_ok());
        assert!(parse_cst("SeLeCt a FrOm b", StartRule::SqlScript).is_ok());
    }

    #[test]
    fn keyword_prefixes_stay_identifiers() {
        let cst = parse_cst("SELECT inner_id, orders FROM intersections", StartRule::QueryBlock).unwrap();
        assert_eq!(cst.text, "SELECT inner_id, orders FROM intersections");
    }

    #[test]
    fn trailing_input_is_rejected() {
        let err = parse_cst("SELECT x FROM ____", StartRule::SqlScript).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.column > 1);
    }

    #[test]
    fn error_position_is_reported_on_the_failing_line() {
        let err = parse_cst("SELECT a\nFROM b\nWHERE", StartRule::SqlScript).unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn statements_split_at_top_level_semicolons() {
        let source = "SELECT ';' FROM a;\n  SELECT (b) FROM c -- x; y\n;;";
        let spans = split_statements(source);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].slice(source), "SELECT ';' FROM a");
        assert_eq!(spans[1].slice(source), "SELECT (b) FROM c -- x; y");
    }
}
