//! Frontmatter lexer: converts source text to a token stream.
//!
//! Features:
//! - Integer (decimal, hex, `_` separators), float, string, raw string and char literals
//! - `//` line comments and `/* */` block comments are skipped
//! - Newlines are tokens; semicolons are an explicit alternative separator
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use gastro_types::{Diagnostics, SourceFile, Span, SyntaxError, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// The frontmatter lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in characters).
    col: u32,
    errors: Diagnostics,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: Diagnostics,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::empty(),
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    /// The full character at the cursor (handles multi-byte UTF-8).
    fn peek_char(&self) -> Option<char> {
        self.source_file.source.get(self.pos..)?.chars().next()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // Continuation bytes do not start a new column.
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume one full character.
    fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        for _ in 0..ch.len_utf8() {
            self.advance();
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(start_line, start_col, self.line, self.col.saturating_sub(1).max(1))
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        self.errors.push(SyntaxError::new(message, span, source_line));
    }

    fn emit_error_with_suggestion(
        &mut self,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        self.errors
            .push(SyntaxError::new(message, span, source_line).with_suggestion(suggestion));
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs and comments (NOT newlines, those are tokens).
    ///
    /// A block comment that spans lines counts as one newline.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start_line = self.line;
                    let start_col = self.col;
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while !self.at_end() {
                        if self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    let span = self.span_from(start_line, start_col);
                    if !closed {
                        self.emit_error("Unterminated block comment", span);
                    } else if self.line > start_line {
                        return Some(Token::new(TokenKind::Newline, span));
                    }
                }
                _ => return None,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        if let Some(newline) = self.skip_trivia() {
            return newline;
        }

        // Stop once the error cap is hit
        if self.at_end() || self.errors.is_full() {
            return Token::new(TokenKind::Eof, self.current_span());
        }

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;

        let Some(ch) = self.peek_char() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        if ch.is_alphabetic() || ch == '_' {
            return self.scan_identifier(start, start_line, start_col);
        }
        if ch.is_ascii_digit() {
            return self.scan_number(start, start_line, start_col);
        }
        if ch == '.' && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            return self.scan_number(start, start_line, start_col);
        }

        self.advance_char();
        let single = |kind: TokenKind, lexer: &Self| Token::new(kind, lexer.span_from(start_line, start_col));

        match ch {
            '\n' => single(TokenKind::Newline, self),
            '"' => self.scan_string(start_line, start_col),
            '`' => self.scan_raw_string(start_line, start_col),
            '\'' => self.scan_char(start_line, start_col),

            '+' => {
                if self.peek() == Some(b'+') {
                    self.advance();
                    single(TokenKind::PlusPlus, self)
                } else {
                    single(TokenKind::Plus, self)
                }
            }
            '-' => {
                if self.peek() == Some(b'-') {
                    self.advance();
                    single(TokenKind::MinusMinus, self)
                } else {
                    single(TokenKind::Minus, self)
                }
            }
            '*' => single(TokenKind::Star, self),
            '/' => single(TokenKind::Slash, self),
            '%' => single(TokenKind::Percent, self),

            '=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    single(TokenKind::EqEq, self)
                } else {
                    single(TokenKind::Eq, self)
                }
            }
            '!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    single(TokenKind::BangEq, self)
                } else {
                    single(TokenKind::Bang, self)
                }
            }
            '<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    single(TokenKind::LessEq, self)
                } else {
                    single(TokenKind::Less, self)
                }
            }
            '>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    single(TokenKind::GreaterEq, self)
                } else {
                    single(TokenKind::Greater, self)
                }
            }
            '&' => {
                if self.peek() == Some(b'&') {
                    self.advance();
                    single(TokenKind::AndAnd, self)
                } else {
                    single(TokenKind::Amp, self)
                }
            }
            '|' => {
                if self.peek() == Some(b'|') {
                    self.advance();
                    single(TokenKind::OrOr, self)
                } else {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        "Unexpected character '|'",
                        span,
                        "Use '||' for boolean or",
                    );
                    self.scan_token()
                }
            }
            ':' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    single(TokenKind::ColonEq, self)
                } else {
                    single(TokenKind::Colon, self)
                }
            }

            '(' => single(TokenKind::LParen, self),
            ')' => single(TokenKind::RParen, self),
            '{' => single(TokenKind::LBrace, self),
            '}' => single(TokenKind::RBrace, self),
            '[' => single(TokenKind::LBracket, self),
            ']' => single(TokenKind::RBracket, self),
            ',' => single(TokenKind::Comma, self),
            ';' => single(TokenKind::Semicolon, self),
            '.' => single(TokenKind::Dot, self),

            other => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(format!("Unexpected character '{other}'"), span);
                // Error recovery: skip the character and try again
                self.scan_token()
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.advance();
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' | b'_')) {
                self.advance();
            }
            let digits: String = self.text_from(start)[2..].chars().filter(|c| *c != '_').collect();
            let span = self.span_from(start_line, start_col);
            return match i64::from_str_radix(&digits, 16) {
                Ok(n) => Token::new(TokenKind::IntLit(n), span),
                Err(_) => {
                    self.emit_error(format!("Invalid hex literal '{}'", self.text_from(start)), span);
                    Token::new(TokenKind::IntLit(0), span)
                }
            };
        }

        let mut is_float = false;
        self.eat_digits();
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.advance();
            self.eat_digits();
        } else if self.peek() == Some(b'.') && !matches!(self.peek_at(1), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_')) {
            // `1.` is a float; `1.String()` is not
            is_float = true;
            self.advance();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if matches!(self.peek_at(1 + sign), Some(b'0'..=b'9')) {
                is_float = true;
                for _ in 0..=sign {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let span = self.span_from(start_line, start_col);
        let text: String = self.text_from(start).chars().filter(|c| *c != '_').collect();
        if is_float {
            match text.parse::<f64>() {
                Ok(n) => Token::new(TokenKind::FloatLit(n), span),
                Err(_) => {
                    self.emit_error(format!("Invalid float literal '{text}'"), span);
                    Token::new(TokenKind::FloatLit(0.0), span)
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => Token::new(TokenKind::IntLit(n), span),
                Err(_) => {
                    self.emit_error_with_suggestion(
                        format!("Integer literal '{text}' does not fit in 64 bits"),
                        span,
                        "Use a float literal for very large numbers",
                    );
                    Token::new(TokenKind::IntLit(0), span)
                }
            }
        }
    }

    fn eat_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9' | b'_')) {
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance_char();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        let span = self.span_from(start_line, start_col);
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, span)
    }

    // ─────────────────────────────────────────────────────────────
    // String & char literals
    // ─────────────────────────────────────────────────────────────

    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        "Unterminated string literal",
                        span,
                        "Close the string with '\"' or use a `raw string` for multiple lines",
                    );
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(c) = self.scan_escape('"') {
                        value.push(c);
                    }
                }
                Some(c) => {
                    self.advance_char();
                    value.push(c);
                }
            }
        }
        Token::new(TokenKind::StringLit(value), self.span_from(start_line, start_col))
    }

    fn scan_raw_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == b'`' {
                break;
            }
            self.advance();
        }
        let value = self.text_from(start).replace('\r', "");
        if self.peek() == Some(b'`') {
            self.advance();
        } else {
            let span = self.span_from(start_line, start_col);
            self.emit_error("Unterminated raw string literal", span);
        }
        Token::new(TokenKind::StringLit(value), self.span_from(start_line, start_col))
    }

    fn scan_char(&mut self, start_line: u32, start_col: u32) -> Token {
        let value = match self.peek_char() {
            Some('\\') => {
                self.advance();
                self.scan_escape('\'')
            }
            Some('\'') | Some('\n') | None => None,
            Some(c) => {
                self.advance_char();
                Some(c)
            }
        };
        if self.peek() == Some(b'\'') && value.is_some() {
            self.advance();
        } else {
            // Consume up to the closing quote on this line.
            while let Some(ch) = self.peek() {
                if ch == b'\n' {
                    break;
                }
                self.advance();
                if ch == b'\'' {
                    break;
                }
            }
            let span = self.span_from(start_line, start_col);
            self.emit_error("Character literal must contain exactly one character", span);
        }
        Token::new(
            TokenKind::CharLit(value.unwrap_or('\0')),
            self.span_from(start_line, start_col),
        )
    }

    /// Decode the escape after a consumed `\`.
    fn scan_escape(&mut self, quote: char) -> Option<char> {
        let esc_line = self.line;
        let esc_col = self.col.saturating_sub(1).max(1);
        let c = self.peek_char()?;
        if c == '\n' {
            return None;
        }
        self.advance_char();
        let decoded = match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            'u' => self.scan_unicode_escape(4),
            'U' => self.scan_unicode_escape(8),
            'x' => self.scan_unicode_escape(2),
            q if q == quote => Some(q),
            _ => None,
        };
        if decoded.is_none() {
            let span = self.span_from(esc_line, esc_col);
            self.emit_error(format!("Unknown escape sequence '\\{c}'"), span);
        }
        decoded
    }

    fn scan_unicode_escape(&mut self, digits: usize) -> Option<char> {
        let start = self.pos;
        for _ in 0..digits {
            if matches!(self.peek(), Some(b) if b.is_ascii_hexdigit()) {
                self.advance();
            } else {
                return None;
            }
        }
        u32::from_str_radix(self.text_from(start), 16)
            .ok()
            .and_then(char::from_u32)
    }
}
