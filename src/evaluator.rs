//! Tree-walking evaluator: walks statements and expressions, enforces
//! static-typing rules at assignment/return boundaries, and propagates
//! `return` values out of nested `Group` frames. Mirrors
//! `original_source/interpreter/{statements,expressions,interpret}.c`.

use std::rc::Rc;

use crate::ast::{Expr, ExprKind, FuncDecl, Primary, Stmt, StmtKind};
use crate::diagnostics::Diagnostics;
use crate::environment::{Binding, Environment, ScopeKind};
use crate::source::SourceInput;
use crate::token::{Span, Token, TokenKind};
use crate::value::{Value, ValueKind};

/// What a statement did to control flow: either nothing, or a `return`
/// carrying its value and the span to blame if it escapes its function.
enum Flow {
    Next,
    Return(Value, Span),
}

/// Runs the whole top-level statement forest against a fresh global
/// environment. Mirrors `Eps_Interpret`'s `while (!EpsErr_WasError() && ...)`
/// loop: the flag is checked *before* each statement, including the first.
/// So a prior lexical or syntax error suppresses evaluation entirely rather
/// than running atop a damaged AST.
pub fn run(stmts: &[Stmt], diagnostics: &Diagnostics, input: &SourceInput) {
    let global = Environment::new_global();

    for stmt in stmts {
        if diagnostics.was_error() {
            break;
        }

        if let Flow::Return(_, span) = exec_stmt(stmt, &global, diagnostics, input) {
            runtime_error(diagnostics, input, &span, "cannot return outside of the function");
        }
    }
}

fn runtime_error(diagnostics: &Diagnostics, input: &SourceInput, span: &Span, message: &str) {
    diagnostics.raise(input, span, "Runtime Error", message);
}

// ---- statements ---------------------------------------------------------

fn exec_stmt(
    stmt: &Stmt,
    env: &Rc<Environment>,
    diagnostics: &Diagnostics,
    input: &SourceInput,
) -> Flow {
    match &stmt.kind {
        StmtKind::ExprStmt(expr) => {
            eval_expr(expr, env, diagnostics, input);
            Flow::Next
        }
        StmtKind::Group(children) => {
            let block = Environment::new_child(env, ScopeKind::Block);
            for child in children {
                match exec_stmt(child, &block, diagnostics, input) {
                    Flow::Next => {}
                    ret @ Flow::Return(..) => return ret,
                }
            }
            Flow::Next
        }
        StmtKind::Func(decl) => {
            exec_func_decl(decl, env, diagnostics, input);
            Flow::Next
        }
        StmtKind::Return { expr, kw } => {
            let value = match expr {
                Some(e) => eval_expr(e, env, diagnostics, input),
                None => Value::void(),
            };
            Flow::Return(value, kw.clone())
        }
        StmtKind::Const(decl) => {
            exec_var_decl(decl, env, diagnostics, input, false);
            Flow::Next
        }
        StmtKind::Define(decl) => {
            exec_var_decl(decl, env, diagnostics, input, true);
            Flow::Next
        }
        StmtKind::Assign(decl) => {
            exec_assign(decl, env, diagnostics, input);
            Flow::Next
        }
        StmtKind::If {
            cond,
            body,
            else_branch,
            ..
        } => {
            let cond_val = eval_expr(cond, env, diagnostics, input);
            if cond_val.kind() != ValueKind::Bool {
                runtime_error(
                    diagnostics,
                    input,
                    &cond.span,
                    &format!("invalid condition type '{}'", cond_val.kind()),
                );
                return Flow::Next;
            }

            if cond_val.as_bool().unwrap() {
                exec_stmt(body, env, diagnostics, input)
            } else if let Some(else_stmt) = else_branch {
                exec_stmt(else_stmt, env, diagnostics, input)
            } else {
                Flow::Next
            }
        }
        StmtKind::Output { expr, .. } => {
            exec_output(expr, env, diagnostics, input);
            Flow::Next
        }
    }
}

fn exec_func_decl(
    decl: &Rc<FuncDecl>,
    env: &Rc<Environment>,
    diagnostics: &Diagnostics,
    input: &SourceInput,
) {
    let name = decl.name.lexeme.as_str();

    if env.get(name).is_some() {
        runtime_error(
            diagnostics,
            input,
            &decl.name.span,
            &format!("function '{}' is already defined", name),
        );
        return;
    }

    env.define(name, Binding::Func(Rc::clone(decl)));
}

fn exec_var_decl(
    decl: &crate::ast::VarDecl,
    env: &Rc<Environment>,
    diagnostics: &Diagnostics,
    input: &SourceInput,
    mutable: bool,
) {
    let name = decl.identifier.lexeme.as_str();

    if env.get_local(name).is_some() {
        let what = if mutable { "variable" } else { "constant" };
        runtime_error(
            diagnostics,
            input,
            &decl.identifier.span,
            &format!("{} '{}' is already defined", what, name),
        );
        return;
    }

    let declared = decl
        .declared_type
        .expect("const/let statements always carry a declared type");
    let mut value = eval_expr(&decl.expr, env, diagnostics, input);

    if value.kind() != declared {
        let what = if mutable { "variable" } else { "const" };
        runtime_error(
            diagnostics,
            input,
            &decl.identifier.span,
            &format!(
                "cannot assign value type '{}' to {} type '{}'",
                value.kind(),
                what,
                declared
            ),
        );
        return;
    }

    value.mutable = mutable;
    env.define(name, Binding::Var(value));
}

fn exec_assign(
    decl: &crate::ast::VarDecl,
    env: &Rc<Environment>,
    diagnostics: &Diagnostics,
    input: &SourceInput,
) {
    let name = decl.identifier.lexeme.as_str();
    let new_value = eval_expr(&decl.expr, env, diagnostics, input);

    let existing = match env.get(name) {
        Some(Binding::Var(v)) => v,
        Some(Binding::Func(_)) | None => {
            runtime_error(
                diagnostics,
                input,
                &decl.identifier.span,
                &format!("variable '{}' is not defined", name),
            );
            return;
        }
    };

    if existing.kind() != new_value.kind() {
        runtime_error(
            diagnostics,
            input,
            &decl.identifier.span,
            &format!(
                "cannot assign '{}' to variable type '{}'",
                new_value.kind(),
                existing.kind()
            ),
        );
        return;
    }

    if !existing.mutable {
        runtime_error(
            diagnostics,
            input,
            &decl.identifier.span,
            &format!("cannot assign value to const '{}'", name),
        );
        return;
    }

    let mut replacement = new_value;
    replacement.mutable = true;
    env.assign(name, replacement);
}

fn exec_output(expr: &Expr, env: &Rc<Environment>, diagnostics: &Diagnostics, input: &SourceInput) {
    let value = eval_expr(expr, env, diagnostics, input);

    if value.kind() == ValueKind::Void {
        runtime_error(
            diagnostics,
            input,
            &expr.span,
            "cannot output value type of 'void'",
        );
        return;
    }

    println!("{}", value.to_output_string());
}

// ---- expressions ----------------------------------------------------------

fn eval_expr(expr: &Expr, env: &Rc<Environment>, diagnostics: &Diagnostics, input: &SourceInput) -> Value {
    match &expr.kind {
        ExprKind::Ternary { cond, left, right } => {
            let cond_val = eval_expr(cond, env, diagnostics, input);
            if cond_val.kind() != ValueKind::Bool {
                return Value::void();
            }

            if cond_val.as_bool().unwrap() {
                eval_expr(left, env, diagnostics, input)
            } else {
                eval_expr(right, env, diagnostics, input)
            }
        }
        ExprKind::Binary { op, left, right } => {
            let lval = eval_expr(left, env, diagnostics, input);
            let rval = eval_expr(right, env, diagnostics, input);
            eval_binary(op, lval, rval, diagnostics, input)
        }
        ExprKind::Unary { op, right } => {
            let rval = eval_expr(right, env, diagnostics, input);
            eval_unary(op, rval, diagnostics, input)
        }
        ExprKind::Primary(primary) => eval_primary(primary, &expr.span, env, diagnostics, input),
    }
}

fn eval_binary(
    op: &Token,
    lval: Value,
    rval: Value,
    diagnostics: &Diagnostics,
    input: &SourceInput,
) -> Value {
    if lval.kind() == ValueKind::Void || rval.kind() == ValueKind::Void {
        return Value::void();
    }

    if lval.kind() == ValueKind::Real && rval.kind() == ValueKind::Real {
        let l = lval.as_real().unwrap();
        let r = rval.as_real().unwrap();

        return match op.kind {
            TokenKind::Plus => Value::real(l + r, true),
            TokenKind::Minus => Value::real(l - r, true),
            TokenKind::Star => Value::real(l * r, true),
            TokenKind::Slash => Value::real(l / r, true),
            TokenKind::Equal => Value::boolean(l == r, true),
            TokenKind::BangEqual => Value::boolean(l != r, true),
            TokenKind::Less => Value::boolean(l < r, true),
            TokenKind::LessEqual => Value::boolean(l <= r, true),
            TokenKind::Greater => Value::boolean(l > r, true),
            TokenKind::GreaterEqual => Value::boolean(l >= r, true),
            _ => Value::void(),
        };
    }

    if lval.kind() == ValueKind::Str && rval.kind() == ValueKind::Str {
        return match op.kind {
            TokenKind::Plus => {
                Value::string(format!("{}{}", lval.as_str().unwrap(), rval.as_str().unwrap()), true)
            }
            _ => {
                runtime_error(
                    diagnostics,
                    input,
                    &op.span,
                    &format!("cannot apply '{}' to arguments type 'string'", op.lexeme),
                );
                Value::void()
            }
        };
    }

    if lval.kind() == rval.kind() {
        // Both BOOL: spec.md gives no binary operator on two booleans.
        runtime_error(
            diagnostics,
            input,
            &op.span,
            &format!("cannot apply '{}' to arguments type '{}'", op.lexeme, lval.kind()),
        );
        return Value::void();
    }

    runtime_error(
        diagnostics,
        input,
        &op.span,
        &format!(
            "cannot apply binary operator to operands type '{}' and '{}'",
            lval.kind(),
            rval.kind()
        ),
    );
    Value::void()
}

fn eval_unary(op: &Token, rval: Value, diagnostics: &Diagnostics, input: &SourceInput) -> Value {
    match op.kind {
        TokenKind::Minus => match rval.kind() {
            ValueKind::Real => Value::real(-rval.as_real().unwrap(), true),
            ValueKind::Void => Value::void(),
            other => {
                runtime_error(
                    diagnostics,
                    input,
                    &op.span,
                    &format!("cannot apply - to expression type {}", other),
                );
                Value::void()
            }
        },
        TokenKind::Str => match rval.kind() {
            ValueKind::Void => {
                runtime_error(
                    diagnostics,
                    input,
                    &op.span,
                    "cannot apply str to expression type void",
                );
                Value::void()
            }
            _ => Value::string(rval.to_display_string(), true),
        },
        _ => Value::void(),
    }
}

fn eval_primary(
    primary: &Primary,
    span: &Span,
    env: &Rc<Environment>,
    diagnostics: &Diagnostics,
    input: &SourceInput,
) -> Value {
    match primary {
        Primary::Literal(value) => {
            let mut cloned = value.clone();
            cloned.mutable = true;
            cloned
        }
        Primary::Parenthesized(inner) => eval_expr(inner, env, diagnostics, input),
        Primary::Identifier(token) => match env.get(token.lexeme.as_str()) {
            Some(Binding::Var(v)) => {
                let mut cloned = v;
                cloned.mutable = true;
                cloned
            }
            Some(Binding::Func(_)) | None => {
                runtime_error(
                    diagnostics,
                    input,
                    span,
                    &format!("reference to undefined name '{}'", token.lexeme),
                );
                Value::void()
            }
        },
        Primary::Call { callee, args } => eval_call(callee, args, env, diagnostics, input),
    }
}

fn eval_call(
    callee: &Token,
    args: &[Expr],
    env: &Rc<Environment>,
    diagnostics: &Diagnostics,
    input: &SourceInput,
) -> Value {
    let name = callee.lexeme.as_str();

    let decl = match env.get(name) {
        Some(Binding::Func(decl)) => decl,
        Some(Binding::Var(_)) | None => {
            runtime_error(
                diagnostics,
                input,
                &callee.span,
                &format!("call undefined function '{}'", name),
            );
            return Value::void();
        }
    };

    let arg_values: Vec<Value> = args
        .iter()
        .map(|a| eval_expr(a, env, diagnostics, input))
        .collect();

    if arg_values.len() < decl.params.len() {
        runtime_error(diagnostics, input, &callee.span, "too few arguments");
        return Value::void();
    }
    if arg_values.len() > decl.params.len() {
        runtime_error(diagnostics, input, &callee.span, "too many arguments");
        return Value::void();
    }

    let call_env = Environment::new_child(env, ScopeKind::Func);
    for (param, mut arg_value) in decl.params.iter().zip(arg_values.into_iter()) {
        arg_value.mutable = true;
        call_env.define(param.lexeme.as_str(), Binding::Var(arg_value));
    }

    let result = exec_stmt(&decl.body, &call_env, diagnostics, input);

    let value = match result {
        Flow::Return(value, ret_span) => {
            if value.kind() != decl.ret_type {
                runtime_error(
                    diagnostics,
                    input,
                    &ret_span,
                    &format!(
                        "cannot return '{}' from a function type '{}'",
                        value.kind(),
                        decl.ret_type
                    ),
                );
                Value::void()
            } else {
                value
            }
        }
        Flow::Next => Value::void(),
    };

    let mut value = value;
    value.mutable = true;
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser as EpsParser;

    fn run_src(src: &str) -> bool {
        let input = SourceInput::new("test.eps", src.as_bytes().to_vec());
        let diagnostics = Diagnostics::new();
        let tokens = Lexer::new(&input, &diagnostics).lex();
        let stmts = EpsParser::new(tokens, &input, &diagnostics).parse();
        run(&stmts, &diagnostics, &input);
        diagnostics.was_error()
    }

    #[test]
    fn arithmetic_precedence_evaluates_correctly() {
        assert!(!run_src("output 1 + 2 * 3;"));
    }

    #[test]
    fn mutable_let_can_be_reassigned() {
        assert!(!run_src("let x: real <- 10; x <- x - 4; output x;"));
    }

    #[test]
    fn recursive_function_calls_work() {
        assert!(!run_src(
            "func f(n: real) -> real { return n if n <= 1 else n * f(n - 1); } output f(5);"
        ));
    }

    #[test]
    fn string_concatenation() {
        assert!(!run_src("output \"hi\" + \", \" + \"world\";"));
    }

    #[test]
    fn assigning_to_const_raises_runtime_error_but_leaves_binding_unchanged() {
        assert!(run_src("const pi: real <- 3.14; pi <- 0;"));
    }

    #[test]
    fn if_statement_with_bool_condition_executes_body() {
        assert!(!run_src("if true { output 1; } else { output 2; }"));
    }

    #[test]
    fn if_statement_with_non_bool_condition_raises() {
        assert!(run_src("if 1 { output 1; } else { output 2; }"));
    }

    #[test]
    fn ternary_with_non_bool_condition_silently_yields_void_not_an_error() {
        // The ternary/if asymmetry from spec.md §9: a non-bool ternary
        // condition yields VOID, but outputting VOID is itself an error.
        assert!(run_src("output 1 if 1 else 2;"));
    }

    #[test]
    fn binary_void_absorption_raises_no_error() {
        assert!(!run_src("1 + void;"));
    }

    #[test]
    fn return_outside_function_is_a_runtime_error() {
        assert!(run_src("return 1;"));
    }

    #[test]
    fn call_with_too_few_arguments_raises() {
        assert!(run_src("func f(a: real, b: real) -> real { return a; } output f(1);"));
    }

    #[test]
    fn call_with_too_many_arguments_raises() {
        assert!(run_src("func f(a: real) -> real { return a; } output f(1, 2);"));
    }

    #[test]
    fn undefined_variable_reference_raises() {
        assert!(run_src("output missing;"));
    }

    #[test]
    fn block_scoped_let_does_not_leak_to_enclosing_scope() {
        assert!(run_src("{ let x: real <- 1; } output x;"));
    }

    #[test]
    fn identifier_evaluation_returns_a_clone_not_the_binding() {
        // A let binding's re-read must reflect only what Assign wrote --
        // not any mutation performed on a previously cloned evaluation result.
        assert!(!run_src(
            "let x: real <- 1; let y: real <- x; y <- 99; output x;"
        ));
    }
}
