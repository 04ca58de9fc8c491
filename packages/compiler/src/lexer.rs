//! Lexer for JavaScript / TypeScript modules using logos
//!
//! Only the tokens needed to find imports and css calls, and to read the
//! literal arguments of those calls, are distinguished. Anything else lexes
//! to an error and is dropped by [`tokenize`].

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    // Keywords
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("from")]
    From,
    #[token("as")]
    As,
    #[token("type")]
    Type,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // Literals keep their quotes; see `unquote`
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice())]
    Template(&'src str),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice())]
    Number(&'src str),

    // Operators
    #[token("=>")]
    Arrow,
    #[token("...")]
    Spread,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,

    #[regex(r"//[^\n]*")]
    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
    Comment,
}

impl<'src> Token<'src> {
    /// Name usable as an object key or after `.`
    pub fn as_name(&self) -> Option<&'src str> {
        Some(match self {
            Token::Ident(name) => *name,
            Token::Import => "import",
            Token::Export => "export",
            Token::From => "from",
            Token::As => "as",
            Token::Type => "type",
            Token::Function => "function",
            Token::Return => "return",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            _ => return None,
        })
    }
}

pub type SpannedToken<'src> = (Token<'src>, Range<usize>);

/// Lex a module into tokens with byte spans, dropping comments and
/// characters outside the recognized subset
pub fn tokenize(source: &str) -> Vec<SpannedToken<'_>> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(result, span)| match result {
            Ok(Token::Comment) | Err(_) => None,
            Ok(token) => Some((token, span)),
        })
        .collect()
}

/// Decode the text of a string or template literal token
pub fn unquote(raw: &str) -> String {
    let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
    let mut output = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some('r') => output.push('\r'),
            Some('0') => output.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => output.push(decoded),
                    None => {
                        output.push_str("\\u");
                        output.push_str(&hex);
                    }
                }
            }
            // line continuation
            Some('\n') => {}
            Some(other) => output.push(other),
            None => output.push('\\'),
        }
    }

    output
}
