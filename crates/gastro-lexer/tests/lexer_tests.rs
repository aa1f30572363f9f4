//! Lexer tests for the frontmatter language.
//!
//! Covers: keywords, operators, literals (int, float, string, raw, char),
//! comments, newline handling, error recovery and determinism.

use gastro_lexer::{Lexer, TokenKind};
use gastro_types::SourceFile;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.gastro", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_count(source: &str) -> usize {
    let sf = SourceFile::new("test.gastro", source);
    Lexer::new(&sf).lex().errors.total_errors
}

fn first_error(source: &str) -> String {
    let sf = SourceFile::new("test.gastro", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

fn string(s: &str) -> TokenKind {
    TokenKind::StringLit(s.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_keywords() {
    let pairs = [
        ("var", TokenKind::Var),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("nil", TokenKind::Nil),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("map", TokenKind::Map),
        ("import", TokenKind::Import),
        ("interface", TokenKind::Interface),
        ("for", TokenKind::For),
        ("func", TokenKind::Func),
        ("return", TokenKind::Return),
    ];
    for (src, expected) in &pairs {
        assert_eq!(kinds(src), vec![expected.clone()], "keyword '{src}'");
    }
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("variable"), vec![ident("variable")]);
    assert_eq!(kinds("iffy"), vec![ident("iffy")]);
    assert_eq!(kinds("from"), vec![ident("from")]);
    assert_eq!(kinds("_"), vec![ident("_")]);
    assert_eq!(kinds("_tmp2"), vec![ident("_tmp2")]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_operators() {
    assert_eq!(
        kinds("+ - * / % == != < <= > >= && || ! & = := ++ --"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::Less,
            TokenKind::LessEq,
            TokenKind::Greater,
            TokenKind::GreaterEq,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::Bang,
            TokenKind::Amp,
            TokenKind::Eq,
            TokenKind::ColonEq,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
        ]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] , : ; ."),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Dot,
        ]
    );
}

#[test]
fn test_short_var_decl() {
    assert_eq!(
        kinds("a, b := pkg.Load()"),
        vec![
            ident("a"),
            TokenKind::Comma,
            ident("b"),
            TokenKind::ColonEq,
            ident("pkg"),
            TokenKind::Dot,
            ident("Load"),
            TokenKind::LParen,
            TokenKind::RParen,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_literals() {
    assert_eq!(kinds("42"), vec![TokenKind::IntLit(42)]);
    assert_eq!(kinds("0"), vec![TokenKind::IntLit(0)]);
    assert_eq!(kinds("1_000_000"), vec![TokenKind::IntLit(1_000_000)]);
    assert_eq!(kinds("0x1F"), vec![TokenKind::IntLit(31)]);
}

#[test]
fn test_float_literals() {
    assert_eq!(kinds("3.14"), vec![TokenKind::FloatLit(3.14)]);
    assert_eq!(kinds(".5"), vec![TokenKind::FloatLit(0.5)]);
    assert_eq!(kinds("1e3"), vec![TokenKind::FloatLit(1000.0)]);
    assert_eq!(kinds("2.5e-1"), vec![TokenKind::FloatLit(0.25)]);
}

#[test]
fn test_integer_overflow_is_error() {
    assert_eq!(error_count("99999999999999999999"), 1);
    assert!(first_error("99999999999999999999").contains("64 bits"));
}

#[test]
fn test_string_literal_with_escapes() {
    assert_eq!(kinds(r#""a\"b\n\t\\""#), vec![string("a\"b\n\t\\")]);
    assert_eq!(kinds(r#""é""#), vec![string("é")]);
    assert_eq!(kinds(r#""""#), vec![string("")]);
}

#[test]
fn test_raw_string_spans_lines() {
    assert_eq!(kinds("`line1\nline2 \\n`"), vec![string("line1\nline2 \\n")]);
}

#[test]
fn test_char_literals() {
    assert_eq!(kinds("'a'"), vec![TokenKind::CharLit('a')]);
    assert_eq!(kinds(r"'\n'"), vec![TokenKind::CharLit('\n')]);
    assert_eq!(kinds("'é'"), vec![TokenKind::CharLit('é')]);
}

#[test]
fn test_bad_char_literal_is_error() {
    assert_eq!(error_count("'ab'"), 1);
    assert_eq!(error_count("''"), 1);
}

#[test]
fn test_unterminated_string() {
    assert_eq!(error_count("\"abc"), 1);
    assert_eq!(first_error("\"abc"), "Unterminated string literal");
    // The string stops at the end of the line and lexing continues.
    assert_eq!(
        kinds("\"abc\nx"),
        vec![string("abc"), TokenKind::Newline, ident("x")]
    );
}

#[test]
fn test_unknown_escape() {
    assert!(first_error(r#""\q""#).contains("escape"));
}

// ─────────────────────────────────────────────────────────────────────
// Comments & newlines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment_keeps_newline() {
    assert_eq!(
        kinds("a // comment\nb"),
        vec![ident("a"), TokenKind::Newline, ident("b")]
    );
}

#[test]
fn test_block_comment_inline_and_multiline() {
    assert_eq!(kinds("a /* x */ b"), vec![ident("a"), ident("b")]);
    assert_eq!(
        kinds("a /* x\n y */ b"),
        vec![ident("a"), TokenKind::Newline, ident("b")]
    );
    assert_eq!(error_count("/* never closed"), 1);
}

#[test]
fn test_newlines_are_tokens() {
    assert_eq!(
        kinds("a\n\nb"),
        vec![ident("a"), TokenKind::Newline, TokenKind::Newline, ident("b")]
    );
    assert_eq!(
        kinds("a\r\nb"),
        vec![ident("a"), TokenKind::Newline, ident("b")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_recovers() {
    assert_eq!(kinds("a # b"), vec![ident("a"), ident("b")]);
    assert_eq!(first_error("a # b"), "Unexpected character '#'");
}

#[test]
fn test_error_carries_source_line() {
    let sf = SourceFile::new("test.gastro", "var a = 1\nvar b = @");
    let result = Lexer::new(&sf).lex();
    let err = result.errors.first().unwrap();
    assert_eq!(err.span.start_line, 2);
    assert_eq!(err.span.start_col, 9);
    assert_eq!(err.source_line, "var b = @");
}

#[test]
fn test_determinism() {
    let source = "var items = []string{\"a\", \"b\"}\nif len(items) > 1 { ok := true }";
    let first = kinds(source);
    for _ in 0..100 {
        assert_eq!(kinds(source), first);
    }
}

proptest! {
    #[test]
    fn prop_lexer_never_panics_and_ends_with_eof(source in "\\PC{0,64}") {
        let sf = SourceFile::new("fuzz.gastro", source);
        let result = Lexer::new(&sf).lex();
        prop_assert_eq!(result.tokens.last().map(|t| t.kind.clone()), Some(TokenKind::Eof));
    }

    #[test]
    fn prop_integer_literals_round_trip(n in 0i64..i64::MAX) {
        prop_assert_eq!(kinds(&n.to_string()), vec![TokenKind::IntLit(n)]);
    }
}
