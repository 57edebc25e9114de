//! Parse tree for Access SQL.
//!
//! Every grammar construct is one variant of [`ParseNode`], and every variant
//! has exactly one [`NodeKind`]. Nodes are immutable once the parser has
//! built them; the rewriter only reads them.

use serde::Serialize;

use crate::error::{ConvertError, ConvertResult};

/// The closed set of node kinds the grammar can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeKind {
    Query,
    SelectItem,
    TableRef,
    Join,
    OrderItem,
    LogicalExpr,
    NotExpr,
    ComparisonExpr,
    Operator,
    IsNull,
    InList,
    Between,
    ArithmeticExpr,
    Negate,
    ConditionalCall,
    FunctionCall,
    Grouped,
    Identifier,
    Literal,
    Star,
    QualifiedStar,
    Crosstab,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 22] = [
        NodeKind::Query,
        NodeKind::SelectItem,
        NodeKind::TableRef,
        NodeKind::Join,
        NodeKind::OrderItem,
        NodeKind::LogicalExpr,
        NodeKind::NotExpr,
        NodeKind::ComparisonExpr,
        NodeKind::Operator,
        NodeKind::IsNull,
        NodeKind::InList,
        NodeKind::Between,
        NodeKind::ArithmeticExpr,
        NodeKind::Negate,
        NodeKind::ConditionalCall,
        NodeKind::FunctionCall,
        NodeKind::Grouped,
        NodeKind::Identifier,
        NodeKind::Literal,
        NodeKind::Star,
        NodeKind::QualifiedStar,
        NodeKind::Crosstab,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Query => "Query",
            NodeKind::SelectItem => "SelectItem",
            NodeKind::TableRef => "TableRef",
            NodeKind::Join => "Join",
            NodeKind::OrderItem => "OrderItem",
            NodeKind::LogicalExpr => "LogicalExpr",
            NodeKind::NotExpr => "NotExpr",
            NodeKind::ComparisonExpr => "ComparisonExpr",
            NodeKind::Operator => "Operator",
            NodeKind::IsNull => "IsNull",
            NodeKind::InList => "InList",
            NodeKind::Between => "Between",
            NodeKind::ArithmeticExpr => "ArithmeticExpr",
            NodeKind::Negate => "Negate",
            NodeKind::ConditionalCall => "ConditionalCall",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::Grouped => "Grouped",
            NodeKind::Identifier => "Identifier",
            NodeKind::Literal => "Literal",
            NodeKind::Star => "Star",
            NodeKind::QualifiedStar => "QualifiedStar",
            NodeKind::Crosstab => "Crosstab",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    /// `<>` (Access also accepts `!=`)
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "<>"),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Like => write!(f, "LIKE"),
            CompareOp::NotLike => write!(f, "NOT LIKE"),
        }
    }
}

/// Arithmetic and string operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Integer division (`\`)
    IntDiv,
    /// `MOD`
    Mod,
    /// String concatenation (`&`)
    Concat,
}

impl ArithOp {
    /// Access binding strength, tighter binds higher:
    /// `* /` over `\` over `MOD` over `+ -` over `&`.
    pub fn precedence(self) -> u8 {
        match self {
            ArithOp::Mul | ArithOp::Div => 9,
            ArithOp::IntDiv => 8,
            ArithOp::Mod => 7,
            ArithOp::Add | ArithOp::Sub => 6,
            ArithOp::Concat => 5,
        }
    }

    /// `+ - * /`, which every target ranks the same way Access does.
    pub fn is_standard(self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Sub | ArithOp::Mul | ArithOp::Div)
    }
}

impl std::fmt::Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
            ArithOp::IntDiv => write!(f, "\\"),
            ArithOp::Mod => write!(f, "MOD"),
            ArithOp::Concat => write!(f, "&"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
            JoinKind::Right => write!(f, "RIGHT JOIN"),
        }
    }
}

/// One segment of a (possibly dotted) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentPart {
    pub name: String,
    /// Written as `[name]` in the source.
    pub bracketed: bool,
}

impl IdentPart {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bracketed: false,
        }
    }

    pub fn bracketed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bracketed: true,
        }
    }
}

/// Literal leaves, kept as matched in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    /// String literal; `quote` is the delimiter used in the source.
    String { value: String, quote: char },
    /// Numeric literal, source text unchanged.
    Number(String),
    Bool(bool),
    Null,
    /// `#...#` date literal, inner text unchanged.
    Date(String),
}

/// A `SELECT` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub distinct: bool,
    pub top: Option<u64>,
    pub items: Vec<ParseNode>,
    pub from: Vec<ParseNode>,
    pub where_clause: Option<Box<ParseNode>>,
    pub group_by: Vec<ParseNode>,
    pub having: Option<Box<ParseNode>>,
    pub order_by: Vec<ParseNode>,
}

/// The three children of an `IIF` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditional {
    pub condition: ParseNode,
    pub then_value: ParseNode,
    pub else_value: ParseNode,
}

/// A node of the parse tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParseNode {
    Query(Box<Query>),
    SelectItem {
        expr: Box<ParseNode>,
        alias: Option<IdentPart>,
    },
    TableRef {
        name: Box<ParseNode>,
        alias: Option<IdentPart>,
    },
    /// `left INNER|LEFT|RIGHT JOIN right ON on`
    Join {
        left: Box<ParseNode>,
        kind: JoinKind,
        right: Box<ParseNode>,
        on: Box<ParseNode>,
    },
    OrderItem {
        expr: Box<ParseNode>,
        order: Option<SortOrder>,
    },
    LogicalExpr {
        left: Box<ParseNode>,
        op: LogicalOp,
        right: Box<ParseNode>,
    },
    NotExpr(Box<ParseNode>),
    /// `operand operator operand`; `operator` is always a [`ParseNode::Operator`].
    ComparisonExpr {
        left: Box<ParseNode>,
        operator: Box<ParseNode>,
        right: Box<ParseNode>,
    },
    Operator(CompareOp),
    /// `expr IS [NOT] NULL`
    IsNull {
        expr: Box<ParseNode>,
        negated: bool,
    },
    /// `expr [NOT] IN (list)`
    InList {
        expr: Box<ParseNode>,
        list: Vec<ParseNode>,
        negated: bool,
    },
    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<ParseNode>,
        low: Box<ParseNode>,
        high: Box<ParseNode>,
        negated: bool,
    },
    ArithmeticExpr {
        left: Box<ParseNode>,
        op: ArithOp,
        right: Box<ParseNode>,
    },
    /// Unary minus.
    Negate(Box<ParseNode>),
    /// `IIF(condition, then, else)`. Build through [`ParseNode::conditional`].
    ConditionalCall(Box<Conditional>),
    FunctionCall {
        name: String,
        args: Vec<ParseNode>,
    },
    Grouped(Box<ParseNode>),
    Identifier(Vec<IdentPart>),
    Literal(Literal),
    Star,
    /// `t.*`
    QualifiedStar(Vec<IdentPart>),
    /// Access `TRANSFORM agg SELECT ... PIVOT expr` crosstab query.
    Crosstab {
        transform: Box<ParseNode>,
        query: Box<ParseNode>,
        pivot: Box<ParseNode>,
    },
}

impl ParseNode {
    /// Build a ConditionalCall from a parsed argument list.
    ///
    /// Fails with a structural error unless there are exactly three arguments.
    pub fn conditional(args: Vec<ParseNode>) -> ConvertResult<ParseNode> {
        let count = args.len();
        let [condition, then_value, else_value]: [ParseNode; 3] =
            args.try_into().map_err(|_| {
                ConvertError::structural(
                    "IIF",
                    format!("expected 3 arguments (condition, true, false), found {count}"),
                )
            })?;
        Ok(ParseNode::ConditionalCall(Box::new(Conditional {
            condition,
            then_value,
            else_value,
        })))
    }

    pub fn comparison(left: ParseNode, op: CompareOp, right: ParseNode) -> ParseNode {
        ParseNode::ComparisonExpr {
            left: Box::new(left),
            operator: Box::new(ParseNode::Operator(op)),
            right: Box::new(right),
        }
    }

    /// Plain column or table name, split on dots.
    pub fn ident(name: &str) -> ParseNode {
        ParseNode::Identifier(name.split('.').map(IdentPart::plain).collect())
    }

    pub fn string(value: impl Into<String>) -> ParseNode {
        ParseNode::Literal(Literal::String {
            value: value.into(),
            quote: '\'',
        })
    }

    pub fn number(text: impl Into<String>) -> ParseNode {
        ParseNode::Literal(Literal::Number(text.into()))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ParseNode::Query(_) => NodeKind::Query,
            ParseNode::SelectItem { .. } => NodeKind::SelectItem,
            ParseNode::TableRef { .. } => NodeKind::TableRef,
            ParseNode::Join { .. } => NodeKind::Join,
            ParseNode::OrderItem { .. } => NodeKind::OrderItem,
            ParseNode::LogicalExpr { .. } => NodeKind::LogicalExpr,
            ParseNode::NotExpr(_) => NodeKind::NotExpr,
            ParseNode::ComparisonExpr { .. } => NodeKind::ComparisonExpr,
            ParseNode::Operator(_) => NodeKind::Operator,
            ParseNode::IsNull { .. } => NodeKind::IsNull,
            ParseNode::InList { .. } => NodeKind::InList,
            ParseNode::Between { .. } => NodeKind::Between,
            ParseNode::ArithmeticExpr { .. } => NodeKind::ArithmeticExpr,
            ParseNode::Negate(_) => NodeKind::Negate,
            ParseNode::ConditionalCall(_) => NodeKind::ConditionalCall,
            ParseNode::FunctionCall { .. } => NodeKind::FunctionCall,
            ParseNode::Grouped(_) => NodeKind::Grouped,
            ParseNode::Identifier(_) => NodeKind::Identifier,
            ParseNode::Literal(_) => NodeKind::Literal,
            ParseNode::Star => NodeKind::Star,
            ParseNode::QualifiedStar(_) => NodeKind::QualifiedStar,
            ParseNode::Crosstab { .. } => NodeKind::Crosstab,
        }
    }

    /// Positional children, in source order.
    pub fn children(&self) -> Vec<&ParseNode> {
        match self {
            ParseNode::Query(q) => {
                let mut out: Vec<&ParseNode> = q.items.iter().collect();
                out.extend(q.from.iter());
                out.extend(q.where_clause.as_deref());
                out.extend(q.group_by.iter());
                out.extend(q.having.as_deref());
                out.extend(q.order_by.iter());
                out
            }
            ParseNode::SelectItem { expr, .. }
            | ParseNode::OrderItem { expr, .. }
            | ParseNode::NotExpr(expr)
            | ParseNode::Negate(expr)
            | ParseNode::IsNull { expr, .. }
            | ParseNode::Grouped(expr) => vec![expr.as_ref()],
            ParseNode::Join {
                left, right, on, ..
            } => vec![left.as_ref(), right.as_ref(), on.as_ref()],
            ParseNode::InList { expr, list, .. } => {
                let mut out = vec![expr.as_ref()];
                out.extend(list.iter());
                out
            }
            ParseNode::Between {
                expr, low, high, ..
            } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
            ParseNode::TableRef { name, .. } => vec![name.as_ref()],
            ParseNode::LogicalExpr { left, right, .. }
            | ParseNode::ArithmeticExpr { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            ParseNode::ComparisonExpr {
                left,
                operator,
                right,
            } => vec![left.as_ref(), operator.as_ref(), right.as_ref()],
            ParseNode::ConditionalCall(c) => vec![&c.condition, &c.then_value, &c.else_value],
            ParseNode::FunctionCall { args, .. } => args.iter().collect(),
            ParseNode::Crosstab {
                transform,
                query,
                pivot,
            } => vec![transform.as_ref(), query.as_ref(), pivot.as_ref()],
            ParseNode::Operator(_)
            | ParseNode::Identifier(_)
            | ParseNode::Literal(_)
            | ParseNode::Star
            | ParseNode::QualifiedStar(_) => vec![],
        }
    }

    /// Short label used by `explain` output and diagnostics.
    pub fn label(&self) -> String {
        match self {
            ParseNode::Operator(op) => format!("Operator {op}"),
            ParseNode::LogicalExpr { op, .. } => format!("LogicalExpr {op}"),
            ParseNode::ArithmeticExpr { op, .. } => format!("ArithmeticExpr {op}"),
            ParseNode::FunctionCall { name, .. } => format!("FunctionCall {name}"),
            ParseNode::Join { kind, .. } => format!("Join {kind}"),
            ParseNode::IsNull { negated: true, .. } => "IsNull NOT".to_string(),
            ParseNode::InList { negated: true, .. } => "InList NOT".to_string(),
            ParseNode::Between { negated: true, .. } => "Between NOT".to_string(),
            ParseNode::Identifier(parts) => {
                let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
                format!("Identifier {}", names.join("."))
            }
            ParseNode::Literal(lit) => format!("Literal {lit:?}"),
            ParseNode::SelectItem {
                alias: Some(alias), ..
            } => format!("SelectItem AS {}", alias.name),
            other => other.kind().to_string(),
        }
    }
}
