//! Access SQL → target SQL rewriter.
//!
//! Walks a [`ParseNode`] tree bottom-up and produces target-dialect text.
//! Dispatch is an exhaustive match over node variants; kinds whose rule is
//! [`Rule::Unsupported`] fail loudly instead of degrading to partial output.

pub mod dialect;
mod literals;
pub mod rules;
pub mod sql;


use std::collections::HashMap;

use tracing::{debug, trace};

use crate::ast::*;
use crate::config::Config;
use crate::error::{ConvertError, ConvertResult};
pub use dialect::{Dialect, TargetDialect};
use literals::AccessDate;
pub use rules::{Rule, rule_for, rule_table};

/// Default bound on nesting, shared by the parser and the rewriter.
///
/// Sized so a conversion stays well inside a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Rewrites a parse tree into one target dialect.
///
/// A `Rewriter` holds no per-conversion state, so one instance can serve
/// many conversions, including from several threads.
pub struct Rewriter {
    dialect: Box<dyn TargetDialect>,
    functions: HashMap<String, String>,
    max_depth: usize,
}

impl Rewriter {
    pub fn new(dialect: Dialect) -> Self {
        let dialect = dialect.generator();
        let functions = dialect
            .function_map()
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self {
            dialect,
            functions,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Build from config: dialect, depth bound and function overrides.
    pub fn from_config(config: &Config) -> Self {
        let mut rewriter = Self::new(config.dialect).with_max_depth(config.max_depth);
        for (from, to) in &config.functions {
            rewriter = rewriter.with_function(from, to);
        }
        rewriter
    }

    /// Add or override a function rename (matched case-insensitively).
    pub fn with_function(mut self, from: &str, to: &str) -> Self {
        self.functions
            .insert(from.to_ascii_uppercase(), to.to_string());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Active function renames, sorted by source name.
    pub fn functions(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .functions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        out.sort();
        out
    }

    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }

    /// Rewrite a whole tree. Either the full text or an error; never partial.
    pub fn rewrite(&self, node: &ParseNode) -> ConvertResult<String> {
        debug!(dialect = self.dialect.name(), root = %node.kind(), "rewriting");
        self.visit(node, 1)
    }

    fn visit(&self, node: &ParseNode, depth: usize) -> ConvertResult<String> {
        if depth > self.max_depth {
            return Err(ConvertError::InputTooDeep {
                depth,
                limit: self.max_depth,
            });
        }
        trace!(kind = %node.kind(), depth, "visit");
        let next = depth + 1;

        match node {
            ParseNode::Query(q) => self.query(q, next),
            ParseNode::SelectItem { expr, alias } => {
                let mut sql = self.visit(expr, next)?;
                if let Some(alias) = alias {
                    sql.push_str(" AS ");
                    sql.push_str(&self.ident_part(alias));
                }
                Ok(sql)
            }
            ParseNode::TableRef { name, alias } => {
                let mut sql = self.visit(name, next)?;
                if let Some(alias) = alias {
                    sql.push_str(" AS ");
                    sql.push_str(&self.ident_part(alias));
                }
                Ok(sql)
            }
            ParseNode::Join {
                left,
                kind,
                right,
                on,
            } => Ok(format!(
                "{} {} {} ON {}",
                self.visit(left, next)?,
                kind,
                self.visit(right, next)?,
                self.visit(on, next)?
            )),
            ParseNode::OrderItem { expr, order } => {
                let sql = self.visit(expr, next)?;
                Ok(match order {
                    Some(SortOrder::Asc) => format!("{} ASC", sql),
                    Some(SortOrder::Desc) => format!("{} DESC", sql),
                    None => sql,
                })
            }
            ParseNode::LogicalExpr { left, op, right } => Ok(format!(
                "{} {} {}",
                self.visit(left, next)?,
                op,
                self.visit(right, next)?
            )),
            ParseNode::NotExpr(expr) => Ok(format!("NOT {}", self.visit(expr, next)?)),
            ParseNode::ComparisonExpr {
                left,
                operator,
                right,
            } => {
                // IIF as first operand: the comparison collapses into the CASE
                if let ParseNode::ConditionalCall(cond) = left.as_ref() {
                    debug!(dropped = ?operator, "collapsing comparison into conditional");
                    return self.conditional(cond, next);
                }
                let right = match (operator.as_ref(), right.as_ref()) {
                    (
                        ParseNode::Operator(CompareOp::Like | CompareOp::NotLike),
                        ParseNode::Literal(Literal::String { value, quote }),
                    ) => literals::like_pattern(value, *quote)?,
                    _ => self.visit(right, next)?,
                };
                Ok(format!(
                    "{} {} {}",
                    self.visit(left, next)?,
                    self.visit(operator, next)?,
                    right
                ))
            }
            ParseNode::Operator(op) => Ok(op.to_string()),
            ParseNode::IsNull { expr, negated } => Ok(format!(
                "{} IS {}NULL",
                self.visit(expr, next)?,
                if *negated { "NOT " } else { "" }
            )),
            ParseNode::InList {
                expr,
                list,
                negated,
            } => Ok(format!(
                "{} {}IN ({})",
                self.visit(expr, next)?,
                if *negated { "NOT " } else { "" },
                self.list(list, next)?
            )),
            ParseNode::Between {
                expr,
                low,
                high,
                negated,
            } => Ok(format!(
                "{} {}BETWEEN {} AND {}",
                self.visit(expr, next)?,
                if *negated { "NOT " } else { "" },
                self.visit(low, next)?,
                self.visit(high, next)?
            )),
            ParseNode::ArithmeticExpr {
                op: ArithOp::Concat,
                ..
            } => {
                let parts = concat_operands(node)
                    .into_iter()
                    .map(|part| self.visit(part, next))
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(self.dialect.concat(&parts))
            }
            ParseNode::ArithmeticExpr { left, op, right } => {
                let l = self.arith_operand(*op, left, true, next)?;
                let r = self.arith_operand(*op, right, false, next)?;
                Ok(match op {
                    ArithOp::Concat => self.dialect.concat(&[l, r]),
                    ArithOp::IntDiv => self.dialect.int_div(&l, &r),
                    ArithOp::Mod => format!("{} % {}", l, r),
                    ArithOp::Add | ArithOp::Sub | ArithOp::Mul | ArithOp::Div => {
                        format!("{} {} {}", l, op, r)
                    }
                })
            }
            ParseNode::Negate(expr) => {
                let sql = self.visit(expr, next)?;
                // `--` would start a comment
                Ok(match expr.as_ref() {
                    ParseNode::ArithmeticExpr { .. } | ParseNode::Negate(_) => {
                        format!("-({})", sql)
                    }
                    _ => format!("-{}", sql),
                })
            }
            ParseNode::ConditionalCall(cond) => self.conditional(cond, next),
            ParseNode::FunctionCall { name, args } => {
                let target = self
                    .functions
                    .get(&name.to_ascii_uppercase())
                    .map(String::as_str)
                    .unwrap_or(name.as_str());
                Ok(format!("{}({})", target, self.list(args, next)?))
            }
            ParseNode::Grouped(expr) => Ok(format!("({})", self.visit(expr, next)?)),
            ParseNode::Identifier(parts) => Ok(self.ident_parts(parts)),
            ParseNode::Literal(lit) => self.literal(lit),
            ParseNode::Star => Ok("*".to_string()),
            ParseNode::QualifiedStar(parts) => Ok(format!("{}.*", self.ident_parts(parts))),
            ParseNode::Crosstab { .. } => Err(ConvertError::unsupported(node.kind())),
        }
    }

    /// One side of an arithmetic operator, parenthesized when the target
    /// would otherwise group it differently from Access.
    fn arith_operand(
        &self,
        parent: ArithOp,
        operand: &ParseNode,
        left: bool,
        depth: usize,
    ) -> ConvertResult<String> {
        let sql = self.visit(operand, depth)?;
        Ok(match operand {
            ParseNode::ArithmeticExpr { op, .. } if needs_parens(parent, *op, left) => {
                format!("({})", sql)
            }
            _ => sql,
        })
    }

    fn conditional(&self, cond: &Conditional, depth: usize) -> ConvertResult<String> {
        Ok(format!(
            "(CASE WHEN {} THEN {} ELSE {} END)",
            self.visit(&cond.condition, depth)?,
            self.visit(&cond.then_value, depth)?,
            self.visit(&cond.else_value, depth)?
        ))
    }

    fn query(&self, q: &Query, depth: usize) -> ConvertResult<String> {
        let mut sql = String::from("SELECT");
        if q.distinct {
            sql.push_str(" DISTINCT");
        }
        sql.push(' ');
        sql.push_str(&self.list(&q.items, depth)?);

        if !q.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.list(&q.from, depth)?);
        }
        if let Some(cond) = &q.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.visit(cond, depth)?);
        }
        if !q.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.list(&q.group_by, depth)?);
        }
        if let Some(cond) = &q.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.visit(cond, depth)?);
        }
        if !q.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.list(&q.order_by, depth)?);
        }
        if let Some(n) = q.top {
            sql.push(' ');
            sql.push_str(&self.dialect.limit(n));
        }
        Ok(sql)
    }

    fn list(&self, nodes: &[ParseNode], depth: usize) -> ConvertResult<String> {
        let parts = nodes
            .iter()
            .map(|n| self.visit(n, depth))
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    fn ident_part(&self, part: &IdentPart) -> String {
        if part.bracketed {
            self.dialect.quote_identifier(&part.name)
        } else {
            part.name.clone()
        }
    }

    fn ident_parts(&self, parts: &[IdentPart]) -> String {
        parts
            .iter()
            .map(|p| self.ident_part(p))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn literal(&self, lit: &Literal) -> ConvertResult<String> {
        match lit {
            Literal::String { value, quote } => {
                Ok(format!("'{}'", literals::string_body(value, *quote)))
            }
            Literal::Number(text) => Ok(text.clone()),
            Literal::Bool(b) => Ok(self.dialect.bool_literal(*b)),
            Literal::Null => Ok("NULL".to_string()),
            Literal::Date(raw) => {
                let date = literals::parse_date(raw)?;
                Ok(match date {
                    AccessDate::Date(_) => self.dialect.date_literal(&date.iso()),
                    AccessDate::Timestamp(_) => self.dialect.timestamp_literal(&date.iso()),
                })
            }
        }
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

/// Operands of a left-deep `a & b & c` chain, in source order.
fn concat_operands(node: &ParseNode) -> Vec<&ParseNode> {
    let mut parts = Vec::new();
    let mut node = node;
    while let ParseNode::ArithmeticExpr {
        left,
        op: ArithOp::Concat,
        right,
    } = node
    {
        parts.push(right.as_ref());
        node = left;
    }
    parts.push(node);
    parts.reverse();
    parts
}

/// Whether `child`, an operand of `parent`, needs parentheses in the target.
///
/// `+ - * /` rank the same everywhere. `\` and `MOD` sit between `* /` and
/// `+ -` in Access but nowhere else, so any mix with them is made explicit.
fn needs_parens(parent: ArithOp, child: ArithOp, left: bool) -> bool {
    let (p, c) = (parent.precedence(), child.precedence());
    if parent.is_standard() && child.is_standard() {
        c < p || (!left && c == p)
    } else {
        !(left && c == p)
    }
}
