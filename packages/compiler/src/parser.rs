//! Module scanning and literal expression parsing
//!
//! Modules are never parsed in full. [`parse_module`] picks import and
//! re-export declarations out of the token stream, [`find_css_calls`] finds
//! `<css>.make(...)` / `<css>.extend(...)` and parses their argument with
//! [`ExprParser`], which understands literal data and single-parameter
//! functions returning literal data.

use crate::error::{ParseError, ParseResult};
use crate::lexer::{unquote, SpannedToken, Token};
use std::mem;
use std::ops::Range;

/// Literal expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Object(Vec<Property>),
    Array(Vec<Expr>),
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Neg(Box<Expr>),
    Ident(String),
    Member { object: Box<Expr>, property: String },
    Call { callee: Box<Expr>, arguments: Vec<Expr> },
    /// Arrow or `function` expression
    Function {
        param: Option<String>,
        body: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Entry(String, Expr),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub source: String,
    /// Named specifiers only; default and namespace imports are not listed
    pub specifiers: Vec<ImportSpecifier>,
    /// From `import` to the closing `;` when present
    pub span: Range<usize>,
}

impl ImportDeclaration {
    /// Local binding of the named import `imported`
    pub fn local_name(&self, imported: &str) -> Option<&str> {
        self.specifiers
            .iter()
            .find(|specifier| specifier.imported == imported)
            .map(|specifier| specifier.local.as_str())
    }
}

/// Imports and module dependencies of one source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleScan {
    pub imports: Vec<ImportDeclaration>,
    /// Every specifier the module loads: static and dynamic imports and
    /// `export ... from` sources, in source order
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Make,
    Extend,
}

impl CallKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "make" => Some(CallKind::Make),
            "extend" => Some(CallKind::Extend),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CallKind::Make => "make",
            CallKind::Extend => "extend",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssCall {
    pub kind: CallKind,
    /// The argument when it is an object or a function, `None` otherwise
    pub argument: Option<Expr>,
    /// From the `css` identifier to the closing parenthesis
    pub span: Range<usize>,
}

/// Collect import declarations and dependency specifiers
pub fn parse_module(tokens: &[SpannedToken<'_>]) -> ModuleScan {
    let mut scan = ModuleScan::default();
    let mut i = 0;

    while i < tokens.len() {
        i = match &tokens[i].0 {
            Token::Import if !follows_dot(tokens, i) => scan_import(tokens, i, &mut scan),
            Token::Export => scan_export(tokens, i, &mut scan),
            _ => i + 1,
        };
    }

    scan
}

fn follows_dot(tokens: &[SpannedToken<'_>], i: usize) -> bool {
    i > 0 && tokens[i - 1].0 == Token::Dot
}

fn string_at(tokens: &[SpannedToken<'_>], i: usize) -> Option<String> {
    match tokens.get(i) {
        Some((Token::String(raw), _)) => Some(unquote(raw)),
        _ => None,
    }
}

/// Returns the index to resume scanning from
fn scan_import(tokens: &[SpannedToken<'_>], start: usize, scan: &mut ModuleScan) -> usize {
    let mut i = start + 1;

    match tokens.get(i).map(|(token, _)| token) {
        // import("./lazy")
        Some(Token::LParen) => {
            if let Some(source) = string_at(tokens, i + 1) {
                scan.dependencies.push(source);
            }
            return i + 1;
        }
        // import "./side-effect"
        Some(Token::String(_)) => {
            if let Some(source) = string_at(tokens, i) {
                scan.dependencies.push(source);
            }
            return i + 1;
        }
        // import.meta
        Some(Token::Dot) | None => return i,
        _ => {}
    }

    let type_only = matches!(tokens.get(i), Some((Token::Type, _)))
        && !matches!(tokens.get(i + 1), Some((Token::From, _)) | Some((Token::Comma, _)));
    if type_only {
        i += 1;
    }

    let mut specifiers = Vec::new();
    while let Some((token, _)) = tokens.get(i) {
        match token {
            Token::From => break,
            Token::LBrace => {
                let (parsed, next) = scan_specifiers(tokens, i + 1);
                specifiers = parsed;
                i = next;
            }
            // anything else in the clause: default binding, `* as ns`, commas
            Token::Ident(_) | Token::Star | Token::As | Token::Comma | Token::Type => i += 1,
            _ => return i,
        }
    }

    let Some(source) = string_at(tokens, i + 1) else {
        return i;
    };
    let mut end = tokens[i + 1].1.end;
    let mut next = i + 2;
    if let Some((Token::Semi, span)) = tokens.get(next) {
        end = span.end;
        next += 1;
    }

    if !type_only {
        scan.dependencies.push(source.clone());
        scan.imports.push(ImportDeclaration {
            source,
            specifiers,
            span: tokens[start].1.start..end,
        });
    }

    next
}

fn scan_specifiers(tokens: &[SpannedToken<'_>], mut i: usize) -> (Vec<ImportSpecifier>, usize) {
    let mut specifiers = Vec::new();

    while let Some((token, _)) = tokens.get(i) {
        match token {
            Token::RBrace => return (specifiers, i + 1),
            Token::Comma => i += 1,
            _ => {
                // `type` modifier on a single specifier
                let inline_type = *token == Token::Type
                    && tokens.get(i + 1).and_then(|(t, _)| t.as_name()).is_some()
                    && !matches!(tokens.get(i + 1), Some((Token::As, _)));
                if inline_type {
                    i += 2;
                    skip_alias(tokens, &mut i);
                    continue;
                }

                let imported = match token {
                    Token::String(raw) => unquote(raw),
                    other => match other.as_name() {
                        Some(name) => name.to_string(),
                        None => return (specifiers, i),
                    },
                };
                i += 1;

                let mut local = imported.clone();
                if matches!(tokens.get(i), Some((Token::As, _))) {
                    if let Some(name) = tokens.get(i + 1).and_then(|(t, _)| t.as_name()) {
                        local = name.to_string();
                    }
                    i += 2;
                }

                specifiers.push(ImportSpecifier { imported, local });
            }
        }
    }

    (specifiers, i)
}

fn skip_alias(tokens: &[SpannedToken<'_>], i: &mut usize) {
    if matches!(tokens.get(*i), Some((Token::As, _))) {
        *i += 2;
    }
}

fn scan_export(tokens: &[SpannedToken<'_>], start: usize, scan: &mut ModuleScan) -> usize {
    let mut i = start + 1;
    if matches!(tokens.get(i), Some((Token::Type, _))) {
        return i + 1;
    }

    match tokens.get(i).map(|(token, _)| token) {
        // export * from "x" / export * as ns from "x"
        Some(Token::Star) => {
            i += 1;
            skip_alias(tokens, &mut i);
        }
        // export { a, b as c } from "x"
        Some(Token::LBrace) => {
            let (_, next) = scan_specifiers(tokens, i + 1);
            i = next;
        }
        _ => return i,
    }

    if matches!(tokens.get(i), Some((Token::From, _))) {
        if let Some(source) = string_at(tokens, i + 1) {
            scan.dependencies.push(source);
            return i + 2;
        }
    }

    i
}

/// Find `make` / `extend` calls on any of the `css_locals` bindings
pub fn find_css_calls(
    tokens: &[SpannedToken<'_>],
    source_len: usize,
    css_locals: &[&str],
) -> ParseResult<Vec<CssCall>> {
    let mut calls = Vec::new();
    let mut i = 0;

    while i + 3 < tokens.len() {
        let kind = match (&tokens[i].0, &tokens[i + 1].0, &tokens[i + 2].0, &tokens[i + 3].0) {
            (Token::Ident(object), Token::Dot, Token::Ident(method), Token::LParen)
                if css_locals.iter().any(|local| *local == *object) && !follows_dot(tokens, i) =>
            {
                CallKind::from_name(method)
            }
            _ => None,
        };
        let Some(kind) = kind else {
            i += 1;
            continue;
        };

        let start = tokens[i].1.start;
        let mut parser = ExprParser::new(tokens, i + 4, source_len);
        let argument = if parser.at_object_or_function() {
            let expr = parser.parse_expression()?;
            parser.eat(&Token::Comma);
            Some(expr).filter(|expr| matches!(expr, Expr::Object(_) | Expr::Function { .. }))
        } else {
            parser.skip_to_closing_paren()?;
            None
        };
        let end = parser.expect(&Token::RParen, ")")?.end;

        calls.push(CssCall {
            kind,
            argument,
            span: start..end,
        });
        i = parser.index();
    }

    Ok(calls)
}

/// Recursive-descent parser over a token slice
pub struct ExprParser<'t, 'src> {
    tokens: &'t [SpannedToken<'src>],
    pos: usize,
    source_len: usize,
}

impl<'t, 'src> ExprParser<'t, 'src> {
    pub fn new(tokens: &'t [SpannedToken<'src>], pos: usize, source_len: usize) -> Self {
        Self {
            tokens,
            pos,
            source_len,
        }
    }

    /// Index of the next unread token
    pub fn index(&self) -> usize {
        self.pos
    }

    // ========== Helper methods ==========

    fn peek(&self) -> Option<&'t SpannedToken<'src>> {
        let tokens = self.tokens;
        tokens.get(self.pos)
    }

    fn peek_token(&self, offset: usize) -> Option<&'t Token<'src>> {
        let tokens = self.tokens;
        tokens.get(self.pos + offset).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<&'t SpannedToken<'src>> {
        let tokens = self.tokens;
        let token = tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .map(|(token, _)| mem::discriminant(token) == mem::discriminant(expected))
            .unwrap_or(false)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn current_offset(&self) -> usize {
        self.peek()
            .map(|(_, span)| span.start)
            .unwrap_or(self.source_len)
    }

    fn expect(&mut self, expected: &Token, name: &str) -> ParseResult<Range<usize>> {
        match self.peek() {
            Some((token, span)) if mem::discriminant(token) == mem::discriminant(expected) => {
                self.pos += 1;
                Ok(span.clone())
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                name,
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(self.source_len)),
        }
    }

    fn at_object_or_function(&self) -> bool {
        match self.peek_token(0) {
            Some(Token::LBrace) | Some(Token::Function) | Some(Token::LParen) => true,
            Some(Token::Ident(_)) => self.peek_token(1) == Some(&Token::Arrow),
            _ => false,
        }
    }

    /// Index of the `)` closing the group that `from` is inside of
    fn closing_paren(&self, from: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (index, (token, _)) in self.tokens.iter().enumerate().skip(from) {
            match token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => return Some(index),
                Token::RParen => depth -= 1,
                _ => {}
            }
        }
        None
    }

    fn skip_to_closing_paren(&mut self) -> ParseResult<()> {
        match self.closing_paren(self.pos) {
            Some(index) => {
                self.pos = index;
                Ok(())
            }
            None => Err(ParseError::unexpected_eof(self.source_len)),
        }
    }

    // ========== Expressions ==========

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        if let Some(Token::Ident(param)) = self.peek_token(0) {
            if self.peek_token(1) == Some(&Token::Arrow) {
                self.pos += 2;
                return self.parse_function_body(Some(param.to_string()));
            }
        }
        if self.check(&Token::LParen) {
            if let Some(arrow) = self.try_parse_arrow()? {
                return Ok(arrow);
            }
        }
        self.parse_unary()
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            // optional chaining reads the same as plain member access here
            if self.check(&Token::Question) && self.peek_token(1) == Some(&Token::Dot) {
                self.pos += 1;
            }

            if self.eat(&Token::Dot) {
                let offset = self.current_offset();
                let property = self
                    .advance()
                    .and_then(|(token, _)| token.as_name())
                    .ok_or_else(|| ParseError::invalid_syntax(offset, "expected property name"))?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: property.to_string(),
                };
            } else if self.eat(&Token::LBracket) {
                let offset = self.current_offset();
                let property = match self.parse_expression()? {
                    Expr::String(key) => key,
                    Expr::Number(index) => format_key(index),
                    _ => {
                        return Err(ParseError::invalid_syntax(
                            offset,
                            "computed member access needs a literal key",
                        ))
                    }
                };
                self.expect(&Token::RBracket, "]")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.eat(&Token::LParen) {
                let arguments = self.parse_list(&Token::RParen, ")")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    arguments,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some((token, span)) = self.advance() else {
            return Err(ParseError::unexpected_eof(self.source_len));
        };

        match token {
            Token::LBrace => self.parse_object(),
            Token::LBracket => Ok(Expr::Array(self.parse_list(&Token::RBracket, "]")?)),
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen, ")")?;
                Ok(expr)
            }
            Token::String(raw) => Ok(Expr::String(unquote(raw))),
            Token::Template(raw) => {
                if raw.contains("${") {
                    return Err(ParseError::invalid_syntax(
                        span.start,
                        "template literal substitutions are not supported",
                    ));
                }
                Ok(Expr::String(unquote(raw)))
            }
            Token::Number(raw) => parse_number(raw)
                .map(Expr::Number)
                .ok_or_else(|| ParseError::invalid_syntax(span.start, "invalid number")),
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::Null => Ok(Expr::Null),
            Token::Function => {
                // optional function name
                if let Some(Token::Ident(_)) = self.peek_token(0) {
                    self.pos += 1;
                }
                self.expect(&Token::LParen, "(")?;
                let param = self.parse_params()?;
                if !self.check(&Token::LBrace) {
                    return Err(ParseError::unexpected_token(
                        self.current_offset(),
                        "{",
                        self.describe_next(),
                    ));
                }
                self.parse_function_body(param)
            }
            Token::Ident(name) => Ok(Expr::Ident(name.to_string())),
            other => Err(ParseError::unexpected_token(
                span.start,
                "expression",
                format!("{:?}", other),
            )),
        }
    }

    fn describe_next(&self) -> String {
        self.peek()
            .map(|(token, _)| format!("{:?}", token))
            .unwrap_or_else(|| "end of file".to_string())
    }

    /// `(` already consumed; reads at most one plain parameter through `)`
    fn parse_params(&mut self) -> ParseResult<Option<String>> {
        let close = self
            .closing_paren(self.pos)
            .ok_or_else(|| ParseError::unexpected_eof(self.source_len))?;

        let param = match self.peek() {
            Some((Token::RParen, _)) => None,
            Some((Token::Ident(name), _)) => Some(name.to_string()),
            Some((token, span)) => {
                return Err(ParseError::unexpected_token(
                    span.start,
                    "parameter name",
                    format!("{:?}", token),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.source_len)),
        };

        // skips a type annotation on the parameter
        self.pos = close + 1;
        Ok(param)
    }

    fn try_parse_arrow(&mut self) -> ParseResult<Option<Expr>> {
        let Some(close) = self.closing_paren(self.pos + 1) else {
            return Ok(None);
        };
        if self.tokens.get(close + 1).map(|(token, _)| token) != Some(&Token::Arrow) {
            return Ok(None);
        }

        self.pos += 1;
        let param = self.parse_params()?;
        self.expect(&Token::Arrow, "=>")?;
        self.parse_function_body(param).map(Some)
    }

    /// Expression body, or a block whose only statement is `return expr`
    fn parse_function_body(&mut self, param: Option<String>) -> ParseResult<Expr> {
        let body = if self.eat(&Token::LBrace) {
            if !self.eat(&Token::Return) {
                return Err(ParseError::invalid_syntax(
                    self.current_offset(),
                    "function body must be a single return statement",
                ));
            }
            let expr = self.parse_expression()?;
            self.eat(&Token::Semi);
            self.expect(&Token::RBrace, "}")?;
            expr
        } else {
            self.parse_expression()?
        };

        Ok(Expr::Function {
            param,
            body: Box::new(body),
        })
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed
    fn parse_list(&mut self, close: &Token, name: &str) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();

        while !self.check(close) {
            items.push(self.parse_expression()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        self.expect(close, name)?;
        Ok(items)
    }

    fn parse_object(&mut self) -> ParseResult<Expr> {
        let mut properties = Vec::new();

        while !self.check(&Token::RBrace) {
            if self.eat(&Token::Spread) {
                properties.push(Property::Spread(self.parse_expression()?));
            } else {
                let Some((token, span)) = self.advance() else {
                    return Err(ParseError::unexpected_eof(self.source_len));
                };
                let (key, shorthand) = match token {
                    Token::String(raw) => (unquote(raw), false),
                    Token::Number(raw) => match parse_number(raw) {
                        Some(value) => (format_key(value), false),
                        None => return Err(ParseError::invalid_syntax(span.start, "invalid number")),
                    },
                    other => match other.as_name() {
                        Some(name) => (name.to_string(), matches!(other, Token::Ident(_))),
                        None => {
                            return Err(ParseError::unexpected_token(
                                span.start,
                                "property key",
                                format!("{:?}", other),
                            ))
                        }
                    },
                };

                if self.eat(&Token::Colon) {
                    let value = self.parse_expression()?;
                    properties.push(Property::Entry(key, value));
                } else if shorthand && (self.check(&Token::Comma) || self.check(&Token::RBrace)) {
                    properties.push(Property::Entry(key.clone(), Expr::Ident(key)));
                } else {
                    return Err(ParseError::unexpected_token(
                        self.current_offset(),
                        ":",
                        self.describe_next(),
                    ));
                }
            }

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        self.expect(&Token::RBrace, "}")?;
        Ok(Expr::Object(properties))
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(|value| value as f64),
        None => raw.parse().ok(),
    }
}

/// Property key spelling of a numeric literal
fn format_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
