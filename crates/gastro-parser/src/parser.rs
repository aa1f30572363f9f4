//! Core parser infrastructure: token cursor, error reporting, helpers.

use gastro_lexer::{Lexer, Token, TokenKind};
use gastro_types::ast::{Ident, Program};
use gastro_types::{Diagnostics, SourceFile, Span, SyntaxError};

/// Maximum nesting of expressions and blocks before the parser gives up.
pub(crate) const MAX_NESTING: u32 = 64;

/// The frontmatter parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery when possible.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    errors: Diagnostics,
    /// Current expression nesting depth.
    pub(crate) expr_depth: u32,
    /// Current block nesting depth.
    pub(crate) block_depth: u32,
    /// Set while parsing an `if` condition, where `ident {` opens the body
    /// rather than a composite literal.
    pub(crate) no_brace_literal: bool,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: Diagnostics,
}

impl ParseResult {
    /// The program if parsing produced no errors at all.
    pub fn into_result(self) -> Result<Program, Diagnostics> {
        match self.program {
            Some(program) if !self.errors.has_errors() => Ok(program),
            _ => Err(self.errors),
        }
    }
}

/// Lex and parse a frontmatter block in one step.
pub fn parse_frontmatter(code: &str) -> ParseResult {
    let source_file = SourceFile::new("frontmatter", code);
    let lexed = Lexer::new(&source_file).lex();
    let mut errors = lexed.errors;
    let result = Parser::new(lexed.tokens, &source_file).parse();
    errors.extend(result.errors);
    ParseResult {
        program: result.program,
        errors,
    }
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::new(TokenKind::Eof, Span::point(1, 1))]
        } else {
            tokens
        };
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::empty(),
            expr_depth: 0,
            block_depth: 0,
            no_brace_literal: false,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[(self.pos - 1).min(self.tokens.len() - 1)].span
        } else {
            Span::point(1, 1)
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    pub(crate) fn skip_newlines(&mut self) {
        while self.check_exact(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skip newlines and semicolons between statements.
    pub(crate) fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// A statement must end with a newline, `;`, the closing `}` of its
    /// block, or end of input.
    pub(crate) fn expect_statement_end(&mut self) {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Semicolon => self.skip_separators(),
            TokenKind::RBrace | TokenKind::Eof => {}
            other => {
                let message = format!("expected newline or ';' after statement, got '{other}'");
                self.error_at_current(message);
                self.synchronize();
            }
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(format!("expected '{}', got '{}'", expected, self.peek_kind()));
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(format!("expected identifier, got '{other}'"));
                None
            }
        }
    }

    /// Identifier after `.`: keywords are valid member names (`m.map`, `x.type`).
    pub(crate) fn expect_member_name(&mut self) -> Option<Ident> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            TokenKind::Var
            | TokenKind::If
            | TokenKind::Else
            | TokenKind::Map
            | TokenKind::Import
            | TokenKind::Interface
            | TokenKind::For
            | TokenKind::Func
            | TokenKind::Return
            | TokenKind::Switch
            | TokenKind::Const
            | TokenKind::Type
            | TokenKind::Defer
            | TokenKind::Go => {
                let span = self.advance().span;
                Some(Ident::new(kind.to_string(), span))
            }
            _ => {
                self.error_at_current(format!("expected field or method name, got '{kind}'"));
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(message, span);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        self.errors.push(SyntaxError::new(message, span, source_line));
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        self.errors
            .push(SyntaxError::new(message, span, source_line).with_suggestion(suggestion));
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until the next statement boundary.
    /// Used after an error to resume at a known-good position.
    pub(crate) fn synchronize(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::Semicolon if depth == 0 => {
                    self.skip_separators();
                    return;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::RBrace => {
                    if depth == 0 {
                        // Closing brace of the enclosing block
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip a balanced `( )`, `[ ]` or `{ }` group starting at the current token.
    pub(crate) fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.advance().kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ if depth == 0 => return,
                _ => {}
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut stmts = Vec::new();
        self.skip_separators();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.check_exact(&TokenKind::RBrace) {
                self.error_at_current("unexpected '}'");
                self.advance();
                self.skip_separators();
                continue;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
            self.skip_separators();
        }
        let span = start.merge(self.previous_span());
        ParseResult {
            program: Some(Program { stmts, span }),
            errors: self.errors,
        }
    }
}
