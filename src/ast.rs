// ABOUTME: The AST node sum type produced by the parser and walked by the evaluator

use crate::range::Bound;
use crate::value::Number;

/// Binary operations that require both operands to share a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

/// String predicate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrOp {
    Contains,
    StartsWith,
    EndsWith,
    Matches,
}

/// List aggregate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    Contains,
    Count,
    All,
    Any,
}

/// A time zone annotation split off a temporal literal: either a zone name
/// (`Area/City`, `UTC`) or a fixed offset (`±HH:MM`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TzInfo {
    pub kind: TzKind,
    pub literal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TzKind {
    Name,
    Offset,
}

/// One `key: value` member of a context literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: String,
    pub value: AstNode,
}

/// Arguments of a registry invocation: exactly one of the two forms.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    Positional(Vec<AstNode>),
    Named(Vec<(String, AstNode)>),
}

/// An evaluable FEEL expression node. Nodes are immutable after
/// construction and own their children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    // Literals
    Null,
    Number(Number),
    Str(String),
    Bool(bool),

    // Collections
    List(Vec<AstNode>),
    Context(Vec<Pair>),

    // Access
    Variable(String),
    ContextItem {
        expr: Box<AstNode>,
        keys: Vec<String>,
    },
    ListItem {
        list: Box<AstNode>,
        index: i64,
    },
    ListFilter {
        list: Box<AstNode>,
        predicate: Box<AstNode>,
    },

    // Quantifiers: each iteration pair binds a name to a list expression
    ListEvery {
        iter_pairs: Vec<(String, AstNode)>,
        predicate: Box<AstNode>,
    },
    ListSome {
        iter_pairs: Vec<(String, AstNode)>,
        predicate: Box<AstNode>,
    },

    // Arithmetic and comparison over same-typed operands
    Binary {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    /// `!=` performs no operand type check: mismatched types are unequal.
    NotEqual {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },

    // Boolean connectives
    And {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    Or {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    Not(Box<AstNode>),

    // Intervals
    Between {
        value: Box<AstNode>,
        low: Box<AstNode>,
        high: Box<AstNode>,
    },
    Range {
        low: Box<AstNode>,
        high: Box<AstNode>,
        low_bound: Bound,
        high_bound: Bound,
    },
    In {
        value: Box<AstNode>,
        target: Box<AstNode>,
    },

    // Temporal constructors; payloads stay textual until evaluation
    DateLiteral(String),
    TimeLiteral {
        literal: String,
        zone: Option<TzInfo>,
    },
    DateTimeLiteral {
        date: Box<AstNode>,
        time: Box<AstNode>,
    },
    Now,
    Today,
    DayOfWeek(Box<AstNode>),
    MonthOfYear(Box<AstNode>),

    // Range predicates
    Before {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    After {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    Includes {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },

    // Utilities
    GetOrElse {
        value: Box<AstNode>,
        default: Box<AstNode>,
    },
    IsDefined(Box<AstNode>),
    ToString(Box<AstNode>),

    // String predicates and list aggregates
    StringOp {
        op: StrOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    ListOp {
        op: ListOp,
        args: Vec<AstNode>,
    },

    // Invocation, two pathways:
    /// A single-word call resolved against the evaluation context; missing
    /// names are an error.
    FunctionCall {
        name: String,
        args: Vec<AstNode>,
    },
    /// A registry-resolved call (multi-word name or named arguments);
    /// missing names evaluate to null.
    FuncInvocation {
        name: String,
        args: CallArgs,
    },
}

impl AstNode {
    pub(crate) fn boxed(self) -> Box<AstNode> {
        Box::new(self)
    }
}
