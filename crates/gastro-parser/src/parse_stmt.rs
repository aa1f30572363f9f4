//! Statement parsing.

use crate::parser::{Parser, MAX_NESTING};
use gastro_lexer::TokenKind;
use gastro_types::ast::*;

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        self.block_depth += 1;
        if self.block_depth > MAX_NESTING {
            self.error_at(format!("blocks nested deeper than {MAX_NESTING} levels"), start);
            self.block_depth -= 1;
            return None;
        }
        self.skip_separators();
        let mut stmts = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
            self.skip_separators();
        }
        self.block_depth -= 1;
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// Parse a single statement, including its terminator.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        self.skip_separators();
        if self.at_end() || self.check_exact(&TokenKind::RBrace) {
            return None;
        }
        let stmt = match self.peek_kind() {
            TokenKind::Var => self.parse_var_decl()?,
            TokenKind::If => Stmt::If(self.parse_if_stmt()?),
            TokenKind::Import => Stmt::Import(self.parse_import_decl()?),
            TokenKind::LBrace => {
                let start = self.current_span();
                self.skip_balanced();
                Stmt::Unsupported {
                    construct: "block statement".into(),
                    span: start.merge(self.previous_span()),
                }
            }
            kind if kind.is_unsupported_keyword() => self.parse_unsupported_stmt(),
            _ => self.parse_simple_stmt()?,
        };
        self.expect_statement_end();
        Some(stmt)
    }

    /// `var a [, b] [Type] [= expr [, expr]]`
    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `var`
        if self.check_exact(&TokenKind::LParen) {
            self.skip_balanced();
            return Some(Stmt::Unsupported {
                construct: "grouped var declaration".into(),
                span: start.merge(self.previous_span()),
            });
        }

        let mut names = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }

        let type_ann = match self.peek_kind() {
            TokenKind::Eq
            | TokenKind::Newline
            | TokenKind::Semicolon
            | TokenKind::RBrace
            | TokenKind::Eof => None,
            _ => Some(self.parse_type()?),
        };

        let values = if self.eat(&TokenKind::Eq) {
            self.skip_newlines();
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        if type_ann.is_none() && values.is_empty() {
            self.error_with_suggestion(
                "variable declaration needs a type or an initial value",
                start.merge(self.previous_span()),
                "write `var name = value`",
            );
            return None;
        }

        let span = start.merge(self.previous_span());
        Some(Stmt::Var(VarDecl {
            names,
            type_ann,
            values,
            span,
        }))
    }

    /// `if cond { ... } [else if ... | else { ... }]`
    pub(crate) fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let start = self.advance().span; // eat `if`

        let saved = std::mem::replace(&mut self.no_brace_literal, true);
        let condition = self.parse_expression();
        self.no_brace_literal = saved;
        let condition = condition?;

        if self.check_exact(&TokenKind::Semicolon) || self.check_exact(&TokenKind::ColonEq) {
            self.error_with_suggestion(
                "if statements with an init statement are not supported",
                self.current_span(),
                "declare the variable on its own line before the `if`",
            );
            return None;
        }

        let then_block = self.parse_block()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check_exact(&TokenKind::If) {
                Some(ElseBranch::ElseIf(Box::new(self.parse_if_stmt()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        let span = start.merge(self.previous_span());
        Some(IfStmt {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `import "p"`, `import alias "p"`, `import alias from "p"`, or a grouped
    /// `import ( ... )`.
    fn parse_import_decl(&mut self) -> Option<ImportDecl> {
        let start = self.advance().span; // eat `import`
        let mut specs = Vec::new();
        if self.eat(&TokenKind::LParen) {
            self.skip_separators();
            while !self.check_exact(&TokenKind::RParen) && !self.at_end() {
                specs.push(self.parse_import_spec()?);
                self.skip_separators();
            }
            self.expect(&TokenKind::RParen)?;
        } else {
            specs.push(self.parse_import_spec()?);
        }
        let span = start.merge(self.previous_span());
        Some(ImportDecl { specs, span })
    }

    fn parse_import_spec(&mut self) -> Option<ImportSpec> {
        let start = self.current_span();
        let alias = match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                // `import Card from "./Card.gastro"`
                if matches!(self.peek_kind(), TokenKind::Identifier(kw) if kw == "from") {
                    self.advance();
                }
                Some(Ident::new(name, span))
            }
            TokenKind::Dot => {
                let span = self.advance().span;
                Some(Ident::new(".", span))
            }
            _ => None,
        };
        match self.peek_kind().clone() {
            TokenKind::StringLit(path) => {
                self.advance();
                Some(ImportSpec {
                    alias,
                    path,
                    span: start.merge(self.previous_span()),
                })
            }
            other => {
                self.error_at_current(format!("expected import path string, got '{other}'"));
                None
            }
        }
    }

    /// `for`, `func`, `return`, ... are recognised and skipped; the interpreter
    /// reports them when executed.
    fn parse_unsupported_stmt(&mut self) -> Stmt {
        let token = self.advance();
        let construct = format!("'{}' statement", token.kind);
        let has_body = matches!(
            token.kind,
            TokenKind::For | TokenKind::Func | TokenKind::Switch
        );
        if has_body {
            let mut depth = 0usize;
            while !self.at_end() {
                match self.peek_kind() {
                    TokenKind::LBrace if depth == 0 => break,
                    TokenKind::LParen | TokenKind::LBracket => depth += 1,
                    TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                    _ => {}
                }
                self.advance();
            }
            while self.check_exact(&TokenKind::LBrace) {
                self.skip_balanced();
            }
        } else {
            self.skip_to_statement_end();
        }
        Stmt::Unsupported {
            construct,
            span: token.span.merge(self.previous_span()),
        }
    }

    /// Skip to the next newline or `;` outside any bracket, without consuming it.
    fn skip_to_statement_end(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::Semicolon if depth == 0 => return,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Assignment (`:=` / `=`), increment, or a bare expression.
    fn parse_simple_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let mut lhs = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            lhs.push(self.parse_expression()?);
        }

        match self.peek_kind().clone() {
            TokenKind::ColonEq | TokenKind::Eq => {
                let op = if self.advance().kind == TokenKind::ColonEq {
                    AssignOp::Define
                } else {
                    AssignOp::Assign
                };
                self.skip_newlines();
                let values = self.parse_expr_list()?;
                let span = start.merge(self.previous_span());

                let mut names = Vec::with_capacity(lhs.len());
                for expr in &lhs {
                    match &expr.kind {
                        ExprKind::Identifier(name) => names.push(Ident::new(name.clone(), expr.span)),
                        _ if op == AssignOp::Define => {
                            self.error_at("non-name on left side of ':='", expr.span);
                            return None;
                        }
                        _ => {
                            return Some(Stmt::Unsupported {
                                construct: "assignment to a field or element".into(),
                                span,
                            });
                        }
                    }
                }
                Some(Stmt::Assign(AssignStmt {
                    names,
                    op,
                    values,
                    span,
                }))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let token = self.advance();
                let construct = if token.kind == TokenKind::PlusPlus {
                    "increment statement"
                } else {
                    "decrement statement"
                };
                Some(Stmt::Unsupported {
                    construct: construct.into(),
                    span: start.merge(token.span),
                })
            }
            _ if lhs.len() > 1 => {
                self.error_at_current("expected ':=' or '=' after expression list");
                None
            }
            _ => {
                let expr = lhs.remove(0);
                let span = expr.span;
                Some(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    pub(crate) fn parse_expr_list(&mut self) -> Option<Vec<Expr>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            self.skip_newlines();
            exprs.push(self.parse_expression()?);
        }
        Some(exprs)
    }
}
