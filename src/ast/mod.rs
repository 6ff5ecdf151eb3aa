//! Abstract syntax tree: expressions form a tree, statements form a forest
//! with `Group` as the only recursive container.

mod expr;
mod stmt;

pub use expr::{Expr, ExprKind, Primary};
pub use stmt::{FuncDecl, Stmt, StmtKind, VarDecl};
