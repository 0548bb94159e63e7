//! Declarations the rule binding table is built from.
//!
//! Each node kind claims the rules and alternative labels it is built from,
//! and declares how its fields are found in the CST.

use super::{Factory, SyntaxFilter};
use crate::ast::NodeKind;
use crate::hooks;

/// What one node kind claims from the grammar.
#[derive(Clone, Copy)]
pub struct NodeDecl {
    pub kind: NodeKind,
    /// Rule or alternative names, each with an optional custom factory.
    pub rules: &'static [(&'static str, Option<Factory>)],
    /// `(field, path)` entries; the first non-null result wins per field.
    pub fields: &'static [(&'static str, &'static str)],
    /// `(field, paths)` entries whose results are spliced into one list.
    pub merges: &'static [(&'static str, &'static [&'static str])],
}

pub const NODES: &[NodeDecl] = &[
    NodeDecl {
        kind: NodeKind::Script,
        rules: &[("sql_script", Some(hooks::script as Factory))],
        fields: &[],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::SelectStmt,
        rules: &[("query_block", None)],
        fields: &[
            ("pref", "set_quantifier"),
            ("target_list", "target_list[]"),
            ("into_clause", "into_clause"),
            ("from_clause", "from_clause"),
            ("where_clause", "where_clause"),
            ("hierarchical_query_clause", "hierarchical_query_clause"),
            ("group_by_clause", "group_by_clause"),
            ("having_clause", "having_clause"),
            ("for_update_clause", "for_update_clause"),
            ("order_by_clause", "order_by_clause"),
            ("limit_clause", "limit_clause"),
        ],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::Union,
        rules: &[("SubqueryCompound", Some(hooks::set_operation as Factory))],
        fields: &[("left", "left"), ("op", "op"), ("right", "right")],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::Identifier,
        rules: &[("dot_id", None), ("StarTable", Some(hooks::star_table as Factory))],
        fields: &[("fields", "id_expression[]")],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::Star,
        rules: &[("star", None)],
        fields: &[],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::TableAliasExpr,
        rules: &[("factoring_element", None)],
        fields: &[
            ("alias", "query_name"),
            ("alias_columns", "paren_column_list.identifier[]"),
            ("subquery", "subquery"),
        ],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::AliasExpr,
        rules: &[
            ("alias_expr", Some(hooks::alias_expr as Factory)),
            ("table_ref_aux", Some(hooks::table_ref_aux as Factory)),
        ],
        fields: &[("expr", "expr"), ("alias", "alias")],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::BinaryExpr,
        rules: &[
            ("BinaryExpr", None),
            ("OrExpr", None),
            ("AndExpr", None),
            ("RelExpr", None),
            ("IsExpr", None),
            ("InExpr", Some(hooks::in_expr as Factory)),
            ("BetweenExpr", Some(hooks::not_wrapped as Factory)),
            ("LikeExpr", Some(hooks::not_wrapped as Factory)),
            ("ModExpr", Some(hooks::not_wrapped as Factory)),
        ],
        fields: &[("left", "left"), ("op", "op"), ("right", "right")],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::UnaryExpr,
        rules: &[
            ("UnaryExpr", None),
            ("NotExpr", None),
            ("CursorExpr", None),
            ("ExistsExpr", None),
        ],
        fields: &[("op", "op"), ("expr", "unary_expression")],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::OrderByExpr,
        rules: &[("order_by_clause", None)],
        fields: &[("expr", "order_by_elements[]")],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::SortBy,
        rules: &[("order_by_elements", None)],
        fields: &[
            ("expr", "expression"),
            ("direction", "sort_direction"),
            ("nulls", "nulls_order"),
        ],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::JoinExpr,
        rules: &[("JoinExpr", Some(hooks::join_expr as Factory))],
        fields: &[
            ("join_type", "join_type"),
            ("right", "table_ref"),
            ("cond", "join_on_part"),
            ("using", "join_using_part.paren_column_list.identifier[]"),
        ],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::Call,
        rules: &[
            ("aggregate_windowed_function", Some(hooks::builtin_call as Factory)),
            ("string_function", Some(hooks::builtin_call as Factory)),
            ("extract_function", Some(hooks::builtin_call as Factory)),
            ("FuncCall", None),
        ],
        fields: &[
            ("name", "dot_id"),
            ("pref", "set_quantifier"),
            ("component", "datetime_part"),
            ("over_clause", "over_clause"),
        ],
        merges: &[(
            "args",
            &[
                "ASTERISK",
                "concatenation",
                "function_argument",
                "function_argument_analytic",
                "string_function_arguments",
            ],
        )],
    },
    NodeDecl {
        kind: NodeKind::OverClause,
        rules: &[("over_clause", None)],
        fields: &[
            ("partition", "query_partition_clause"),
            ("order_by_clause", "order_by_clause"),
            ("windowing_clause", "windowing_clause"),
        ],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::Case,
        rules: &[("simple_case_statement", None), ("searched_case_statement", None)],
        fields: &[
            ("expr", "case_operand"),
            ("switches", "simple_case_when_part[]"),
            ("switches", "searched_case_when_part[]"),
            ("else_expr", "case_else_part"),
        ],
        merges: &[],
    },
    NodeDecl {
        kind: NodeKind::CaseWhen,
        rules: &[("simple_case_when_part", None), ("searched_case_when_part", None)],
        fields: &[("when", "whenExpr"), ("then", "thenExpr")],
        merges: &[],
    },
];

/// Classless rewrites.
pub const HOOKS: &[(&str, Factory)] = &[
    ("select_statement", hooks::select_statement as Factory),
    ("SubqueryParen", hooks::subquery_paren as Factory),
    ("expression_list", hooks::expression_list as Factory),
    ("into_clause", hooks::into_clause as Factory),
    ("function_argument_analytic", hooks::analytic_arguments as Factory),
    ("function_argument", hooks::argument_list as Factory),
    ("string_function_arguments", hooks::expression_list as Factory),
];

/// Unbound rules that drop syntax tokens before collapsing.
pub const SYNTAX: &[(&str, SyntaxFilter)] = &[
    ("from_clause", SyntaxFilter::AllTokens),
    ("table_ref_list", SyntaxFilter::AllTokens),
    ("table_alias", SyntaxFilter::AllTokens),
    ("dml_table_expression_clause", SyntaxFilter::AllTokens),
    ("join_on_part", SyntaxFilter::AllTokens),
    ("group_by_clause", SyntaxFilter::AllTokens),
    ("subquery_factoring_clause", SyntaxFilter::AllTokens),
    ("atom", SyntaxFilter::AllTokens),
    ("ParenExpr", SyntaxFilter::AllTokens),
    ("exists_subquery", SyntaxFilter::AllTokens),
    ("case_else_part", SyntaxFilter::AllTokens),
    ("query_partition_clause", SyntaxFilter::AllTokens),
    ("where_clause", SyntaxFilter::Tokens(&["WHERE"])),
    ("having_clause", SyntaxFilter::Tokens(&["HAVING"])),
    ("limit_clause", SyntaxFilter::Tokens(&["LIMIT"])),
    ("column_alias", SyntaxFilter::Tokens(&["AS"])),
];
