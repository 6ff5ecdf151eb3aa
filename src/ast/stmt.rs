//! Statement nodes.

use crate::ast::expr::Expr;
use crate::token::{Span, Token};
use crate::value::ValueKind;

/// Shared shape behind `const`, `let` and assignment statements.
/// `declared_type` is `None` for plain assignment: `IDENT '<-' expr ';'`
/// carries no type annotation of its own; the evaluator checks the target
/// binding's existing kind instead.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub identifier: Token,
    pub declared_type: Option<ValueKind>,
    pub expr: Expr,
    pub kw: Span,
}

/// A function's parameter types are parsed (to keep the grammar regular)
/// but discarded once parsing completes, see the spec's open question on
/// parameter types never being checked against call-site arguments.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Stmt,
    pub ret_type: ValueKind,
    pub kw: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    ExprStmt(Expr),
    Group(Vec<Stmt>),
    Func(std::rc::Rc<FuncDecl>),
    Return {
        expr: Option<Expr>,
        kw: Span,
    },
    Const(VarDecl),
    Define(VarDecl),
    Assign(VarDecl),
    If {
        cond: Expr,
        body: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        kw: Span,
    },
    Output {
        expr: Expr,
        kw: Span,
    },
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}
