//! Token types for the frontmatter lexer.
//!
//! Defines [`TokenKind`] covering every lexeme the frontmatter language
//! recognises and [`Token`], which pairs a kind with a source [`Span`].

use gastro_types::Span;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `42`, `0x2a`, `1_000`
    IntLit(i64),
    /// `3.14`, `1e3`
    FloatLit(f64),
    /// `"text"` or a raw back-quoted string, already unescaped.
    StringLit(String),
    /// `'a'`
    CharLit(char),
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────
    Var,
    If,
    Else,
    Nil,
    True,
    False,
    Map,
    Import,
    Interface,
    // Recognised only so the parser can name them as unsupported.
    For,
    Func,
    Return,
    Switch,
    Const,
    Type,
    Defer,
    Go,

    // ── Operators ────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,
    Bang,
    Amp,
    /// `=`
    Eq,
    /// `:=`
    ColonEq,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,

    // ── Special ──────────────────────────────────────────────
    /// Newline (statement separator)
    Newline,
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for plain identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "var" => TokenKind::Var,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "nil" => TokenKind::Nil,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "map" => TokenKind::Map,
            "import" => TokenKind::Import,
            "interface" => TokenKind::Interface,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "return" => TokenKind::Return,
            "switch" => TokenKind::Switch,
            "const" => TokenKind::Const,
            "type" => TokenKind::Type,
            "defer" => TokenKind::Defer,
            "go" => TokenKind::Go,
            _ => return None,
        })
    }

    /// Keywords that start a statement the interpreter does not run.
    pub fn is_unsupported_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::For
                | TokenKind::Func
                | TokenKind::Return
                | TokenKind::Switch
                | TokenKind::Const
                | TokenKind::Type
                | TokenKind::Defer
                | TokenKind::Go
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::FloatLit(n) => write!(f, "{n}"),
            TokenKind::StringLit(s) => write!(f, "\"{s}\""),
            TokenKind::CharLit(c) => write!(f, "'{c}'"),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::Nil => write!(f, "nil"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Map => write!(f, "map"),
            TokenKind::Import => write!(f, "import"),
            TokenKind::Interface => write!(f, "interface"),
            TokenKind::For => write!(f, "for"),
            TokenKind::Func => write!(f, "func"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::Switch => write!(f, "switch"),
            TokenKind::Const => write!(f, "const"),
            TokenKind::Type => write!(f, "type"),
            TokenKind::Defer => write!(f, "defer"),
            TokenKind::Go => write!(f, "go"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::BangEq => write!(f, "!="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEq => write!(f, "<="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEq => write!(f, ">="),
            TokenKind::AndAnd => write!(f, "&&"),
            TokenKind::OrOr => write!(f, "||"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Amp => write!(f, "&"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::ColonEq => write!(f, ":="),
            TokenKind::PlusPlus => write!(f, "++"),
            TokenKind::MinusMinus => write!(f, "--"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
