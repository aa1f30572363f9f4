//! Expression parsing with operator precedence.
//!
//! Precedence (lowest → highest):
//! 5. `||`
//! 4. `&&`
//! 3. `==`, `!=`, `<`, `<=`, `>`, `>=`
//! 2. `+`, `-`
//! 1. `*`, `/`, `%`
//!
//! then unary `-`, `!`, and postfix selectors, calls and composite bodies.

use gastro_lexer::TokenKind;
use gastro_types::ast::*;
use gastro_types::Span;

use crate::parser::{Parser, MAX_NESTING};

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_NESTING {
            self.error_at_current(format!(
                "expression nested deeper than {MAX_NESTING} levels"
            ));
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_or();
        self.expr_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            self.skip_newlines();
            let right = self.parse_and()?;
            left = binary(left, BinOp::Or, right);
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat(&TokenKind::AndAnd) {
            self.skip_newlines();
            let right = self.parse_comparison()?;
            left = binary(left, BinOp::And, right);
        }
        Some(left)
    }

    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_add()?;
        while let Some(op) = self.match_comparison_op() {
            self.advance();
            self.skip_newlines();
            let right = self.parse_add()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    fn parse_add(&mut self) -> Option<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_mul()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_mul(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Plus => None,
            TokenKind::Amp => {
                self.advance();
                let operand = self.parse_unary()?;
                return Some(unsupported("address-of operator '&'", start.merge(operand.span)));
            }
            TokenKind::Star => {
                self.advance();
                let operand = self.parse_unary()?;
                return Some(unsupported("pointer dereference", start.merge(operand.span)));
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        let Some(op) = op else {
            // Unary plus is the identity.
            return Some(operand);
        };
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Postfix: selectors, calls, composite bodies
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    if self.check_exact(&TokenKind::LParen) {
                        // `x.(T)`
                        self.skip_balanced();
                        let span = expr.span.merge(self.previous_span());
                        expr = unsupported("type assertion", span);
                        continue;
                    }
                    let field = self.expect_member_name()?;
                    let span = expr.span.merge(field.span);
                    expr = Expr::new(
                        ExprKind::Selector {
                            object: Box::new(expr),
                            field,
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    let args = self.parse_arg_list()?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.skip_balanced();
                    let span = expr.span.merge(self.previous_span());
                    expr = unsupported("index expression", span);
                }
                TokenKind::LBrace if !self.no_brace_literal => {
                    // `Type{...}` / `pkg.Type{...}`
                    let Some(ty) = type_of_expr(&expr) else {
                        break;
                    };
                    let start = expr.span;
                    expr = self.parse_composite_body(Some(ty), start)?;
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_arg_list(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let saved = std::mem::replace(&mut self.no_brace_literal, false);
        let args = self.parse_arg_list_inner();
        self.no_brace_literal = saved;
        args
    }

    fn parse_arg_list_inner(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        self.skip_newlines();
        while !self.check_exact(&TokenKind::RParen) && !self.at_end() {
            args.push(self.parse_expression()?);
            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let span = token.span;
        let kind = match token.kind {
            TokenKind::IntLit(n) => ExprKind::IntLit(n),
            TokenKind::FloatLit(n) => ExprKind::FloatLit(n),
            TokenKind::StringLit(s) => ExprKind::StringLit(s),
            TokenKind::CharLit(c) => ExprKind::CharLit(c),
            TokenKind::True => ExprKind::BoolLit(true),
            TokenKind::False => ExprKind::BoolLit(false),
            TokenKind::Nil => ExprKind::NilLit,
            TokenKind::Identifier(name) => ExprKind::Identifier(name),
            TokenKind::LParen => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_brace_literal, false);
                let inner = self.parse_paren_inner();
                self.no_brace_literal = saved;
                let inner = inner?;
                let span = span.merge(self.previous_span());
                return Some(Expr::new(ExprKind::Paren(Box::new(inner)), span));
            }
            TokenKind::LBracket | TokenKind::Map => {
                let ty = self.parse_type()?;
                if !self.check_exact(&TokenKind::LBrace) {
                    self.error_at_current(format!(
                        "expected '{{' after composite type '{ty}', got '{}'",
                        self.peek_kind()
                    ));
                    return None;
                }
                return self.parse_composite_body(Some(ty), span);
            }
            TokenKind::Func => {
                self.advance();
                // Parameters, optional results, then the body.
                while !self.at_end() && !self.check_exact(&TokenKind::LBrace) {
                    if matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
                        break;
                    }
                    self.skip_balanced();
                }
                if self.check_exact(&TokenKind::LBrace) {
                    self.skip_balanced();
                }
                return Some(unsupported("function literal", span.merge(self.previous_span())));
            }
            other => {
                self.error_at_current(format!("expected expression, got '{other}'"));
                return None;
            }
        };
        self.advance();
        Some(Expr::new(kind, span))
    }

    fn parse_paren_inner(&mut self) -> Option<Expr> {
        self.skip_newlines();
        let inner = self.parse_expression()?;
        self.skip_newlines();
        self.expect(&TokenKind::RParen)?;
        Some(inner)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Composite literals
    // ══════════════════════════════════════════════════════════════════════════

    /// `{ elem, key: value, {nested}, ... }` after an optional type.
    fn parse_composite_body(&mut self, ty: Option<TypeExpr>, start: Span) -> Option<Expr> {
        self.expect(&TokenKind::LBrace)?;
        let saved = std::mem::replace(&mut self.no_brace_literal, false);
        let elements = self.parse_elements();
        self.no_brace_literal = saved;
        let elements = elements?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Composite { ty, elements }, span))
    }

    fn parse_elements(&mut self) -> Option<Vec<Element>> {
        let mut elements = Vec::new();
        self.skip_newlines();
        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            let first = self.parse_element_value()?;
            let element = if self.eat(&TokenKind::Colon) {
                self.skip_newlines();
                let value = self.parse_element_value()?;
                Element::KeyValue { key: first, value }
            } else {
                Element::Positional(first)
            };
            elements.push(element);
            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        self.expect(&TokenKind::RBrace)?;
        Some(elements)
    }

    /// An element value; a bare `{...}` is a composite with its type elided.
    fn parse_element_value(&mut self) -> Option<Expr> {
        if self.check_exact(&TokenKind::LBrace) {
            let start = self.current_span();
            self.parse_composite_body(None, start)
        } else {
            self.parse_expression()
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn unsupported(construct: &str, span: Span) -> Expr {
    Expr::new(ExprKind::Unsupported(construct.to_string()), span)
}

/// The type named by `T` or `pkg.T`, when used in front of a composite body.
fn type_of_expr(expr: &Expr) -> Option<TypeExpr> {
    match &expr.kind {
        ExprKind::Identifier(name) => Some(TypeExpr::Named(name.clone())),
        ExprKind::Selector { object, field } => match &object.kind {
            ExprKind::Identifier(pkg) => Some(TypeExpr::Named(format!("{pkg}.{}", field.name))),
            _ => None,
        },
        _ => None,
    }
}
