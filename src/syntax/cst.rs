//! Concrete syntax tree.
//!
//! pest yields one pair per non-silent grammar rule. [`CstBuilder`] turns
//! those pairs into owned [`CstNode`]s and reshapes the iterative rules the
//! grammar uses in place of left recursion. After reshaping, the AST layer
//! sees the left-deep labelled alternatives (`SubqueryCompound`, `JoinExpr`,
//! `BinaryExpr`, `InExpr`, ...) with `left`/`op`/`right` tags, exactly as a
//! left-recursive grammar would have produced them.

use pest::iterators::Pair;

use super::parser::Rule;
use super::Span;

/// A node of the concrete syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CstNode<'i> {
    /// Grammar rule or alternative label.
    pub name: String,
    /// Label given to this node by its parent (`#left = ...` in the grammar).
    pub tag: Option<String>,
    pub span: Span,
    /// Raw source text under `span`.
    pub text: &'i str,
    pub children: Vec<CstNode<'i>>,
}

impl<'i> CstNode<'i> {
    /// Token rules are spelled in upper case in the grammar.
    pub fn is_terminal(&self) -> bool {
        is_token_name(&self.name)
    }

    /// True when `key` names this node's tag or its rule.
    pub fn matches(&self, key: &str) -> bool {
        self.tag.as_deref() == Some(key) || self.name == key
    }

    /// First child matching `key` by tag or rule name.
    pub fn child(&self, key: &str) -> Option<&CstNode<'i>> {
        self.children.iter().find(|c| c.matches(key))
    }

    /// Every child matching `key` by tag or rule name, in source order.
    pub fn children_matching<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a CstNode<'i>> + 'a {
        self.children.iter().filter(move |c| c.matches(key))
    }

    pub fn has_child(&self, key: &str) -> bool {
        self.child(key).is_some()
    }
}

/// Upper-case rule names (digits and `_` allowed) denote tokens.
pub fn is_token_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && name.chars().any(|c| c.is_ascii_uppercase())
}

// ============================================================================
// RESHAPING TABLES
// ============================================================================

/// `operand (step operand)*` rule folded left-deep under `label`.
struct Chain {
    rule: &'static str,
    label: &'static str,
    /// Tags assigned to each element of one repetition step.
    step: &'static [Option<&'static str>],
}

/// `operand tail?` rule whose tail names the alternative.
struct Suffix {
    rule: &'static str,
    tail: &'static str,
    label: &'static str,
}

const BINARY_STEP: &[Option<&str>] = &[Some("op"), Some("right")];

const CHAINS: &[Chain] = &[
    Chain { rule: "subquery", label: "SubqueryCompound", step: BINARY_STEP },
    Chain { rule: "table_ref", label: "JoinExpr", step: &[None] },
    Chain { rule: "logical_or", label: "OrExpr", step: BINARY_STEP },
    Chain { rule: "logical_and", label: "AndExpr", step: BINARY_STEP },
    Chain { rule: "relational_expression", label: "RelExpr", step: BINARY_STEP },
    Chain { rule: "concatenation", label: "BinaryExpr", step: BINARY_STEP },
    Chain { rule: "additive", label: "BinaryExpr", step: BINARY_STEP },
    Chain { rule: "multiplicative", label: "BinaryExpr", step: BINARY_STEP },
];

const SUFFIXES: &[Suffix] = &[
    Suffix { rule: "equality_expression", tail: "is_tail", label: "IsExpr" },
    Suffix { rule: "compound_expression", tail: "in_tail", label: "InExpr" },
    Suffix { rule: "compound_expression", tail: "between_tail", label: "BetweenExpr" },
    Suffix { rule: "compound_expression", tail: "like_tail", label: "LikeExpr" },
    Suffix { rule: "compound_expression", tail: "member_tail", label: "ModExpr" },
];

// ============================================================================
// BUILDER
// ============================================================================

/// Converts pest pairs into [`CstNode`]s.
///
/// `source` is always the complete input; `offset` shifts the spans of pairs
/// that were parsed from a slice of it.
pub struct CstBuilder<'i> {
    source: &'i str,
    offset: usize,
}

impl<'i> CstBuilder<'i> {
    pub fn with_offset(source: &'i str, offset: usize) -> Self {
        Self { source, offset }
    }

    pub fn build(&self, pair: Pair<'i, Rule>) -> CstNode<'i> {
        let span = pair.as_span();
        let mut span = Span::new(span.start() + self.offset, span.end() + self.offset);
        let name = format!("{:?}", pair.as_rule());
        let tag = pair.as_node_tag().map(str::to_owned);
        let mut text = pair.as_str();
        let children: Vec<CstNode<'i>> = pair
            .into_inner()
            .filter(|p| p.as_rule() != Rule::EOI)
            .map(|p| self.build(p))
            .collect();

        // A rule ending in a failed optional keeps the whitespace and
        // comments skipped before it; they are not part of the node.
        if !is_token_name(&name) {
            let from = children.last().map_or(0, |c| c.span.end - span.start);
            text = &text[..content_end(text, from)];
            span.end = span.start + text.len();
        }

        self.reshape(CstNode {
            name,
            tag,
            span,
            text,
            children,
        })
    }

    fn reshape(&self, node: CstNode<'i>) -> CstNode<'i> {
        if let Some(chain) = CHAINS.iter().find(|c| c.rule == node.name) {
            return self.fold_chain(node, chain);
        }
        let tail = node.children.get(1).map(|c| c.name.as_str());
        match SUFFIXES
            .iter()
            .find(|s| s.rule == node.name && Some(s.tail) == tail)
        {
            Some(suffix) => split_suffix(node, suffix),
            None => node,
        }
    }

    fn fold_chain(&self, mut node: CstNode<'i>, chain: &Chain) -> CstNode<'i> {
        if node.children.len() <= chain.step.len() {
            return node;
        }

        let mut rest = std::mem::take(&mut node.children).into_iter();
        let Some(mut acc) = rest.next() else {
            return node;
        };

        loop {
            let mut group = Vec::with_capacity(chain.step.len());
            for tag in chain.step {
                let Some(mut child) = rest.next() else { break };
                if let Some(tag) = tag {
                    child.tag = Some((*tag).to_owned());
                }
                group.push(child);
            }
            let Some(last) = group.last() else { break };

            let span = Span::new(acc.span.start, last.span.end);
            acc.tag = Some("left".to_owned());
            let mut children = Vec::with_capacity(group.len() + 1);
            children.push(acc);
            children.extend(group);
            acc = CstNode {
                name: chain.label.to_owned(),
                tag: None,
                span,
                text: self.slice(span),
                children,
            };
        }

        node.children = vec![acc];
        node
    }

    fn slice(&self, span: Span) -> &'i str {
        span.slice(self.source)
    }
}

/// Byte offset just past the last character of `text` that is neither
/// whitespace nor inside a comment, scanning from `from`.
fn content_end(text: &str, from: usize) -> usize {
    let mut end = from;
    let mut rest = &text[from..];
    while let Some(c) = rest.chars().next() {
        let skip = if rest.starts_with("--") {
            rest.find('\n').unwrap_or(rest.len())
        } else if rest.starts_with("/*") {
            rest[2..].find("*/").map_or(rest.len(), |n| n + 4)
        } else {
            if !c.is_whitespace() {
                end = text.len() - rest.len() + c.len_utf8();
            }
            c.len_utf8()
        };
        rest = &rest[skip..];
    }
    end
}

fn split_suffix<'i>(mut node: CstNode<'i>, suffix: &Suffix) -> CstNode<'i> {
    let (Some(tail), Some(mut left)) = (node.children.pop(), node.children.pop()) else {
        return node;
    };
    left.tag = Some("left".to_owned());

    let mut children = Vec::with_capacity(tail.children.len() + 1);
    children.push(left);
    children.extend(tail.children);
    node.children = vec![CstNode {
        name: suffix.label.to_owned(),
        tag: None,
        span: node.span,
        text: node.text,
        children,
    }];
    node
}
