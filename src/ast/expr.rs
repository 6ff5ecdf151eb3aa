//! Expression nodes.

use crate::token::{Span, Token};
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Primary {
    Literal(Value),
    Parenthesized(Box<Expr>),
    Identifier(Token),
    Call { callee: Token, args: Vec<Expr> },
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ternary {
        cond: Box<Expr>,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Binary {
        op: Token,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: Token,
        right: Box<Expr>,
    },
    Primary(Primary),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}
