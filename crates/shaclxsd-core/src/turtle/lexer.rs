//! Turtle tokens

use logos::{Lexer, Logos};

/// Turtle token. Borrowed slices keep their escapes; the parser unescapes.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\r\n]*")]
pub enum Token<'a> {
    #[token("@prefix")]
    PrefixDirective,

    #[token("@base")]
    BaseDirective,

    #[token("PREFIX", ignore(ascii_case))]
    SparqlPrefix,

    #[token("BASE", ignore(ascii_case))]
    SparqlBase,

    #[regex(r"<[^<>\x00-\x20]*>", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Iri(&'a str),

    /// `prefix:local`, local part possibly empty
    #[regex(r"([A-Za-z][A-Za-z0-9_\-]*)?:[A-Za-z0-9_\-/@%]*", prefixed_name)]
    PrefixedName(&'a str),

    #[regex(r"_:[A-Za-z0-9_\-]+", |lex| &lex.slice()[2..])]
    BlankNodeLabel(&'a str),

    #[regex(r#""([^"\\\r\n]|\\.)*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    #[regex(r"'([^'\\\r\n]|\\.)*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    #[token(r#"""""#, long_string)]
    #[token("'''", long_string)]
    String(&'a str),

    #[regex(r"@[a-zA-Z]+(-[a-zA-Z0-9]+)*", |lex| &lex.slice()[1..])]
    LangTag(&'a str),

    /// Integer, decimal or double; the parser tells them apart
    #[regex(r"[+-]?[0-9]+", number)]
    #[regex(r"[+-]?\.[0-9]+", number)]
    Number(&'a str),

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("a")]
    A,

    #[token("^^")]
    DoubleCaret,

    #[token(".")]
    Dot,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

/// Extend a matched digit run with an optional fraction and exponent.
///
/// A `.` is only taken when a digit follows it, so `1.` at the end of a
/// statement lexes as a number and a dot.
fn number<'s>(lex: &mut Lexer<'s, Token<'s>>) -> &'s str {
    let bytes = lex.remainder().as_bytes();
    let is_digit = |i: usize| bytes.get(i).map_or(false, u8::is_ascii_digit);
    let mut len = 0;

    if !lex.slice().contains('.') && bytes.first() == Some(&b'.') && is_digit(1) {
        len = 1;
        while is_digit(len) {
            len += 1;
        }
    }

    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut end = len + 1;
        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        if is_digit(end) {
            while is_digit(end) {
                end += 1;
            }
            len = end;
        }
    }

    lex.bump(len);
    lex.slice()
}

/// Take interior dots into a non-empty local name.
///
/// A run of dots is only taken when a name character follows it, so
/// `ex:v1.0` is one name and `ex:c.` is a name and a dot.
fn prefixed_name<'s>(lex: &mut Lexer<'s, Token<'s>>) -> &'s str {
    if lex.slice().ends_with(':') {
        return lex.slice();
    }
    let bytes = lex.remainder().as_bytes();
    let is_name = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'/' | b'@' | b'%');
    let mut len = 0;
    loop {
        let dots = bytes[len..].iter().take_while(|&&b| b == b'.').count();
        let name = bytes[len + dots..].iter().take_while(|&&b| is_name(b)).count();
        if dots == 0 || name == 0 {
            break;
        }
        len += dots + name;
    }

    lex.bump(len);
    lex.slice()
}

/// Scan a triple-quoted string up to its unescaped closing delimiter
fn long_string<'s>(lex: &mut Lexer<'s, Token<'s>>) -> Option<&'s str> {
    let delimiter = if lex.slice().starts_with('"') { "\"\"\"" } else { "'''" };
    let rest: &'s str = lex.remainder();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if rest[i..].starts_with(delimiter) {
            lex.bump(i + delimiter.len());
            return Some(&rest[..i]);
        }
    }
    None
}
