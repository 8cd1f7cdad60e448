//! Lexer built on logos.
//!
//! Produces a flat token stream with trivia (whitespace and comments)
//! removed. Tokens carry spans only; callers slice the source for text.

use logos::Logos;

use crate::Span;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("func")]
    Func,

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r"`[^`]*`")]
    RawString,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Rune,
    #[regex(r"[0-9][0-9a-zA-Z_.]*")]
    Number,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("*")]
    Star,
    #[regex(r"[-+/%&|^<>=!:~?]+")]
    Operator,
}

/// Kind of a lexed token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Package,
    Import,
    Func,
    Ident,
    /// Interpreted string literal, quotes included.
    String,
    /// Raw string literal, backticks included.
    RawString,
    Rune,
    Number,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Semicolon,
    Star,
    Operator,
    /// Input logos could not match, such as an unterminated literal.
    Unknown,
}

impl TokenKind {
    /// Whether this token is a string literal of either flavor.
    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::String | TokenKind::RawString)
    }
}

/// A lexed token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Source text covered by this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(self.span.start as usize..self.span.end as usize)
            .unwrap_or("")
    }
}

/// Byte order mark, accepted only at the start of a file.
const BOM: char = '\u{feff}';

/// Lex source text into tokens, dropping comments and whitespace.
///
/// A leading byte order mark is skipped; spans still index `source`.
pub fn lex(source: &str) -> Vec<Token> {
    let (body, offset) = match source.strip_prefix(BOM) {
        Some(rest) => (rest, BOM.len_utf8()),
        None => (source, 0),
    };
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(body);

    while let Some(raw) = lexer.next() {
        let range = lexer.span();
        let span = Span::from_range(range.start + offset..range.end + offset);
        let kind = match raw {
            Ok(RawToken::LineComment | RawToken::BlockComment) => continue,
            Ok(RawToken::Package) => TokenKind::Package,
            Ok(RawToken::Import) => TokenKind::Import,
            Ok(RawToken::Func) => TokenKind::Func,
            Ok(RawToken::Ident) => TokenKind::Ident,
            Ok(RawToken::String) => TokenKind::String,
            Ok(RawToken::RawString) => TokenKind::RawString,
            Ok(RawToken::Rune) => TokenKind::Rune,
            Ok(RawToken::Number) => TokenKind::Number,
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::LBrace) => TokenKind::LBrace,
            Ok(RawToken::RBrace) => TokenKind::RBrace,
            Ok(RawToken::LBracket) => TokenKind::LBracket,
            Ok(RawToken::RBracket) => TokenKind::RBracket,
            Ok(RawToken::Dot) => TokenKind::Dot,
            Ok(RawToken::Comma) => TokenKind::Comma,
            Ok(RawToken::Semicolon) => TokenKind::Semicolon,
            Ok(RawToken::Star) => TokenKind::Star,
            Ok(RawToken::Operator) => TokenKind::Operator,
            Err(()) => TokenKind::Unknown,
        };
        tokens.push(Token { kind, span });
    }

    tokens
}

/// Decode the value of a string literal token.
///
/// Raw strings are taken verbatim. Interpreted strings have the common
/// escapes decoded; unknown escapes are kept as written.
pub(crate) fn unquote(literal: &str) -> Option<String> {
    if let Some(inner) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Some(inner.to_string());
    }

    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Some(out)
}
