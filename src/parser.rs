//! Recursive-descent parser with one-token lookahead (plus a single extra
//! lookahead token used to disambiguate calls and assignment). Syntax
//! errors are panic-mode recovered so that later statements still get
//! reported, mirrors `original_source/parser/parser.c`.

use std::rc::Rc;

use crate::ast::{Expr, ExprKind, FuncDecl, Primary, Stmt, StmtKind, VarDecl};
use crate::diagnostics::Diagnostics;
use crate::lexer::decode_string_literal;
use crate::source::SourceInput;
use crate::token::{Span, Token, TokenKind};
use crate::value::{Value, ValueKind};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    input: &'a SourceInput,
    diagnostics: &'a Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, input: &'a SourceInput, diagnostics: &'a Diagnostics) -> Self {
        Self {
            tokens,
            current: 0,
            input,
            diagnostics,
        }
    }

    /// Parses the whole token stream into a forest of top-level statements.
    /// Parsing never aborts early: a malformed statement is skipped via
    /// `synchronize` so subsequent statements are still reported.
    pub fn parse(mut self) -> Vec<Stmt> {
        log::debug!("----------------- PARSER -----------------");

        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }

        log::debug!("parsed {} top-level statements", statements.len());
        statements
    }

    // ---- token stream helpers ----------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|k| self.check(*k)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn describe(token: &Token) -> &str {
        if token.kind == TokenKind::Eof {
            "<EOF>"
        } else {
            token.lexeme.as_str()
        }
    }

    fn syntax_error(&self, span: &Span, message: impl AsRef<str>) {
        self.diagnostics
            .raise(self.input, span, "Syntax Error", message.as_ref());
    }

    /// Consumes the current token if it matches `kind`, else emits a syntax
    /// error and returns `None`.
    fn consume(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            let tok = self.peek().clone();
            self.syntax_error(
                &tok.span,
                format!("expected {} instead of '{}'", what, Self::describe(&tok)),
            );
            None
        }
    }

    /// Advances until the previous token is `;` or the next token begins a
    /// fresh statement, or EOF is reached.
    fn synchronize(&mut self) {
        if matches!(
            self.peek().kind,
            TokenKind::Output
                | TokenKind::If
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Func
        ) {
            return;
        }

        if !self.is_at_end() {
            self.advance();
        }

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            if matches!(
                self.peek().kind,
                TokenKind::Output
                    | TokenKind::If
                    | TokenKind::Let
                    | TokenKind::Const
                    | TokenKind::Func
            ) {
                return;
            }

            self.advance();
        }
    }

    fn parse_type(&mut self) -> Option<ValueKind> {
        if !self.peek().kind.is_type_specifier() {
            let tok = self.peek().clone();
            self.syntax_error(
                &tok.span,
                format!("expected a type instead of '{}'", Self::describe(&tok)),
            );
            return None;
        }

        let tok = self.advance();
        Some(match tok.kind {
            TokenKind::Real => ValueKind::Real,
            TokenKind::Bool => ValueKind::Bool,
            TokenKind::Void => ValueKind::Void,
            _ => unreachable!("is_type_specifier guards this"),
        })
    }

    // ---- statements -----------------------------------------------------

    fn statement(&mut self) -> Option<Stmt> {
        match self.peek().kind {
            TokenKind::LBrace => self.group_stmt(),
            TokenKind::Output => self.output_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::Func => self.func_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Const => self.var_decl_stmt(true),
            TokenKind::Let => self.var_decl_stmt(false),
            TokenKind::Identifier if self.peek_at(1).kind == TokenKind::ArrowLeft => {
                self.assign_stmt()
            }
            _ => self.expr_stmt(),
        }
    }

    fn group_stmt(&mut self) -> Option<Stmt> {
        let open = self.consume(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }

        let close = self.consume(TokenKind::RBrace, "'}'")?;
        let span = Span::merge(&open.span, &close.span);
        Some(Stmt::new(StmtKind::Group(statements), span))
    }

    fn output_stmt(&mut self) -> Option<Stmt> {
        let kw = self.advance();
        let expr = self.expression()?;
        let semi = self.consume(TokenKind::Semicolon, "';'")?;
        let span = Span::merge(&kw.span, &semi.span);
        Some(Stmt::new(
            StmtKind::Output {
                expr,
                kw: kw.span,
            },
            span,
        ))
    }

    fn if_stmt(&mut self) -> Option<Stmt> {
        let kw = self.advance();
        let cond = self.expression()?;
        let body = self.statement()?;
        let mut end_span = body.span.clone();

        let else_branch = if self.match_kind(&[TokenKind::Else]) {
            let else_stmt = self.statement()?;
            end_span = else_stmt.span.clone();
            Some(Box::new(else_stmt))
        } else {
            None
        };

        let span = Span::merge(&kw.span, &end_span);
        Some(Stmt::new(
            StmtKind::If {
                cond,
                body: Box::new(body),
                else_branch,
                kw: kw.span,
            },
            span,
        ))
    }

    fn func_stmt(&mut self) -> Option<Stmt> {
        let kw = self.advance();
        let name = self.consume(TokenKind::Identifier, "a function name")?;
        self.consume(TokenKind::LParen, "'('")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self.consume(TokenKind::Identifier, "a parameter name")?;
                self.consume(TokenKind::Colon, "':'")?;
                self.parse_type()?;
                params.push(param);

                if !self.match_kind(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RParen, "')'")?;
        self.consume(TokenKind::ArrowRight, "'->'")?;
        let ret_type = self.parse_type()?;
        let body = self.statement()?;
        let span = Span::merge(&kw.span, &body.span.clone());

        let decl = FuncDecl {
            name,
            params,
            body,
            ret_type,
            kw: kw.span,
        };

        Some(Stmt::new(StmtKind::Func(Rc::new(decl)), span))
    }

    fn return_stmt(&mut self) -> Option<Stmt> {
        let kw = self.advance();

        let expr = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };

        let semi = self.consume(TokenKind::Semicolon, "';'")?;
        let span = Span::merge(&kw.span, &semi.span);
        Some(Stmt::new(
            StmtKind::Return {
                expr,
                kw: kw.span,
            },
            span,
        ))
    }

    fn var_decl_stmt(&mut self, is_const: bool) -> Option<Stmt> {
        let kw = self.advance();
        let identifier = self.consume(TokenKind::Identifier, "a variable name")?;
        self.consume(TokenKind::Colon, "':'")?;
        let declared_type = self.parse_type()?;
        self.consume(TokenKind::ArrowLeft, "'<-'")?;
        let expr = self.expression()?;
        let semi = self.consume(TokenKind::Semicolon, "';'")?;
        let span = Span::merge(&kw.span, &semi.span);

        let decl = VarDecl {
            identifier,
            declared_type: Some(declared_type),
            expr,
            kw: kw.span,
        };

        let kind = if is_const {
            StmtKind::Const(decl)
        } else {
            StmtKind::Define(decl)
        };

        Some(Stmt::new(kind, span))
    }

    fn assign_stmt(&mut self) -> Option<Stmt> {
        let identifier = self.advance();
        let kw = self.consume(TokenKind::ArrowLeft, "'<-'")?;
        let expr = self.expression()?;
        let semi = self.consume(TokenKind::Semicolon, "';'")?;
        let span = Span::merge(&identifier.span.clone(), &semi.span);

        let decl = VarDecl {
            identifier,
            declared_type: None,
            expr,
            kw: kw.span,
        };

        Some(Stmt::new(StmtKind::Assign(decl), span))
    }

    fn expr_stmt(&mut self) -> Option<Stmt> {
        let expr = self.expression()?;
        let semi = self.consume(TokenKind::Semicolon, "';'")?;
        let span = Span::merge(&expr.span.clone(), &semi.span);
        Some(Stmt::new(StmtKind::ExprStmt(expr), span))
    }

    // ---- expressions ------------------------------------------------

    fn expression(&mut self) -> Option<Expr> {
        self.ternary()
    }

    fn ternary(&mut self) -> Option<Expr> {
        let left = self.equality()?;

        if self.match_kind(&[TokenKind::If]) {
            let cond = self.equality()?;
            self.consume(TokenKind::Else, "'else'")?;
            let right = self.ternary()?;
            let span = Span::merge(&left.span.clone(), &right.span.clone());
            return Some(Expr::new(
                ExprKind::Ternary {
                    cond: Box::new(cond),
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            ));
        }

        Some(left)
    }

    fn equality(&mut self) -> Option<Expr> {
        let mut expr = self.comparison()?;

        while self.match_kind(&[TokenKind::BangEqual, TokenKind::Equal]) {
            let op = self.previous().clone();
            let right = self.comparison()?;
            let span = Span::merge(&expr.span.clone(), &right.span.clone());
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span,
            );
        }

        Some(expr)
    }

    fn comparison(&mut self) -> Option<Expr> {
        let mut expr = self.term()?;

        while self.match_kind(&[
            TokenKind::Equal,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
        ]) {
            let op = self.previous().clone();
            let right = self.term()?;
            let span = Span::merge(&expr.span.clone(), &right.span.clone());
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span,
            );
        }

        Some(expr)
    }

    fn term(&mut self) -> Option<Expr> {
        let mut expr = self.factor()?;

        while self.match_kind(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.factor()?;
            let span = Span::merge(&expr.span.clone(), &right.span.clone());
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span,
            );
        }

        Some(expr)
    }

    fn factor(&mut self) -> Option<Expr> {
        let mut expr = self.unary()?;

        while self.match_kind(&[TokenKind::Star, TokenKind::Slash]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            let span = Span::merge(&expr.span.clone(), &right.span.clone());
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span,
            );
        }

        Some(expr)
    }

    fn unary(&mut self) -> Option<Expr> {
        if self.match_kind(&[TokenKind::Minus]) || self.match_kind(&[TokenKind::Str]) {
            let op = self.previous().clone();
            let right = self.primary()?;
            let span = Span::merge(&op.span.clone(), &right.span.clone());
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    right: Box::new(right),
                },
                span,
            ));
        }

        self.primary()
    }

    fn primary(&mut self) -> Option<Expr> {
        let tok = self.peek().clone();

        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let n: f64 = tok.lexeme.parse().unwrap_or(0.0);
                Some(Expr::new(
                    ExprKind::Primary(Primary::Literal(Value::real(n, false))),
                    tok.span,
                ))
            }
            TokenKind::String => {
                self.advance();
                let s = decode_string_literal(&tok.lexeme);
                Some(Expr::new(
                    ExprKind::Primary(Primary::Literal(Value::string(s, false))),
                    tok.span,
                ))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(
                    ExprKind::Primary(Primary::Literal(Value::boolean(true, false))),
                    tok.span,
                ))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(
                    ExprKind::Primary(Primary::Literal(Value::boolean(false, false))),
                    tok.span,
                ))
            }
            TokenKind::Void => {
                self.advance();
                Some(Expr::new(
                    ExprKind::Primary(Primary::Literal(Value::void())),
                    tok.span,
                ))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();

                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.match_kind(&[TokenKind::Comma]) {
                                break;
                            }
                        }
                    }

                    let close = self.consume(TokenKind::RParen, "')'")?;
                    let span = Span::merge(&tok.span, &close.span);
                    Some(Expr::new(
                        ExprKind::Primary(Primary::Call {
                            callee: tok,
                            args,
                        }),
                        span,
                    ))
                } else {
                    Some(Expr::new(
                        ExprKind::Primary(Primary::Identifier(tok.clone())),
                        tok.span,
                    ))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                let close = self.consume(TokenKind::RParen, "')'")?;
                let span = Span::merge(&tok.span, &close.span);
                Some(Expr::new(
                    ExprKind::Primary(Primary::Parenthesized(Box::new(inner))),
                    span,
                ))
            }
            _ => {
                self.syntax_error(
                    &tok.span,
                    format!("expected an expression instead of '{}'", Self::describe(&tok)),
                );
                None
            }
        }
    }
}
