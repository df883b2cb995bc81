use serde::{Deserialize, Serialize};

pub mod source_map;
pub use source_map::SourceMap;

/// Byte range within source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const UNKNOWN: Span = Span { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(r: std::ops::Range<usize>) -> Self {
        Span { start: r.start, end: r.end }
    }
}

/// A program is an ordered list of statements separated by `;`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
    #[serde(skip)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// An expression evaluated for its value, which is then discarded.
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Integer(i64),
    Boolean(bool),

    /// `left <operator> right`. The operator is kept as written; the compiler
    /// decides which symbols it supports.
    Infix {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
        #[serde(skip)]
        span: Span,
    },
}

impl Expr {
    /// Build an infix node with no source position, for hand-assembled trees.
    pub fn infix(operator: &str, left: Expr, right: Expr) -> Expr {
        Expr::Infix {
            operator: operator.to_string(),
            left: Box::new(left),
            right: Box::new(right),
            span: Span::UNKNOWN,
        }
    }
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Program { statements, source: None }
    }
}
