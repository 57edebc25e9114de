//! The node-kind → rewrite-rule table.
//!
//! [`rule_for`] is a total match over [`NodeKind`]: adding a kind without
//! deciding its rule does not compile.

use serde::Serialize;

use crate::ast::NodeKind;

/// How a node kind is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rule {
    /// Source text emitted unchanged.
    Identity,
    /// Source text with a dialect substitution (function names, literals,
    /// quoting, `&`, `\`, `MOD`).
    Mapped,
    /// Children rewritten and joined with the node's keywords.
    Composite,
    /// `a op b`, collapsing into the conditional when `a` is an `IIF`.
    Comparison,
    /// `IIF(c, t, f)` → `(CASE WHEN c THEN t ELSE f END)`.
    Conditional,
    /// No target equivalent; conversion fails.
    Unsupported,
}

impl Rule {
    pub fn describe(self) -> &'static str {
        match self {
            Rule::Identity => "emit source text unchanged",
            Rule::Mapped => "emit source text with dialect substitutions",
            Rule::Composite => "rewrite children and join",
            Rule::Comparison => "a op b; collapses to CASE when a is IIF",
            Rule::Conditional => "(CASE WHEN c THEN t ELSE f END)",
            Rule::Unsupported => "rejected: no target equivalent",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

pub fn rule_for(kind: NodeKind) -> Rule {
    match kind {
        NodeKind::Query
        | NodeKind::SelectItem
        | NodeKind::TableRef
        | NodeKind::Join
        | NodeKind::OrderItem
        | NodeKind::LogicalExpr
        | NodeKind::NotExpr
        | NodeKind::IsNull
        | NodeKind::InList
        | NodeKind::Between
        | NodeKind::Negate
        | NodeKind::Grouped => Rule::Composite,
        NodeKind::ComparisonExpr => Rule::Comparison,
        NodeKind::ConditionalCall => Rule::Conditional,
        NodeKind::Operator | NodeKind::Star => Rule::Identity,
        NodeKind::ArithmeticExpr
        | NodeKind::FunctionCall
        | NodeKind::Identifier
        | NodeKind::QualifiedStar
        | NodeKind::Literal => Rule::Mapped,
        NodeKind::Crosstab => Rule::Unsupported,
    }
}

/// The full table, in [`NodeKind::ALL`] order.
pub fn rule_table() -> Vec<(NodeKind, Rule)> {
    NodeKind::ALL.iter().map(|&k| (k, rule_for(k))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_kind_once() {
        let table = rule_table();
        assert_eq!(table.len(), NodeKind::ALL.len());
        for (i, (kind, _)) in table.iter().enumerate() {
            assert_eq!(*kind, NodeKind::ALL[i]);
        }
    }

    #[test]
    fn test_only_crosstab_is_unsupported() {
        let unsupported: Vec<NodeKind> = rule_table()
            .into_iter()
            .filter(|(_, r)| *r == Rule::Unsupported)
            .map(|(k, _)| k)
            .collect();
        assert_eq!(unsupported, vec![NodeKind::Crosstab]);
    }

    #[test]
    fn test_predicates_and_joins_rewrite_children() {
        for kind in [
            NodeKind::Join,
            NodeKind::IsNull,
            NodeKind::InList,
            NodeKind::Between,
            NodeKind::Negate,
        ] {
            assert_eq!(rule_for(kind), Rule::Composite, "{kind}");
        }
        assert_eq!(rule_for(NodeKind::QualifiedStar), Rule::Mapped);
    }
}
