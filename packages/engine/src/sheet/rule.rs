//! Tagged-variant CSS rules and a small `cssparser`-based reader for them.
//!
//! Only the shapes the engine itself emits are understood: style rules with a
//! flat declaration block, `@keyframes` blocks and `@media` wrappers. Rule
//! text is stored in compact form, so `parse_rule(&rule.to_string())` yields
//! the same rule back.

use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};
use std::fmt;

type RuleParseError<'i> = ParseError<'i, ()>;

/// `property:value`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)
    }
}

/// `selector{declarations}`
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    /// Generated class name carried by the selector: `.x-abc:hover` -> `x-abc`
    pub fn class_name(&self) -> Option<&str> {
        let name = self.selector.strip_prefix('.')?;
        let end = name.find(':').unwrap_or(name.len());
        let name = &name[..end];
        (!name.is_empty()).then_some(name)
    }

    /// Property of the last declaration; the standard name for dual declarations
    pub fn primary_property(&self) -> Option<&str> {
        self.declarations.last().map(|decl| decl.property.as_str())
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.selector)?;
        for (i, declaration) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", declaration)?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssRule {
    Style(StyleRule),
    /// Frames are style rules whose selector is a percentage
    Keyframes { name: String, frames: Vec<StyleRule> },
    Media { condition: String, rules: Vec<CssRule> },
}

impl CssRule {
    pub fn as_style(&self) -> Option<&StyleRule> {
        match self {
            CssRule::Style(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, CssRule::Media { .. })
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssRule::Style(rule) => write!(f, "{}", rule),
            CssRule::Keyframes { name, frames } => {
                write!(f, "@keyframes {}{{", name)?;
                for frame in frames {
                    write!(f, "{}", frame)?;
                }
                f.write_str("}")
            }
            CssRule::Media { condition, rules } => {
                write!(f, "@media {}{{", condition)?;
                for rule in rules {
                    write!(f, "{}", rule)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Parse exactly one rule
pub fn parse_rule(css: &str) -> Result<CssRule, String> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parser.parse_entirely(read_rule).map_err(describe)
}

/// Parse a whole sheet
pub fn parse_rules(css: &str) -> Result<Vec<CssRule>, String> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    read_rules(&mut parser).map_err(describe)
}

fn describe(error: RuleParseError<'_>) -> String {
    format!(
        "invalid CSS at line {}, column {}",
        error.location.line + 1,
        error.location.column
    )
}

fn read_rules<'i>(parser: &mut Parser<'i, '_>) -> Result<Vec<CssRule>, RuleParseError<'i>> {
    let mut rules = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            return Ok(rules);
        }
        rules.push(read_rule(parser)?);
    }
}

fn read_rule<'i>(parser: &mut Parser<'i, '_>) -> Result<CssRule, RuleParseError<'i>> {
    parser.skip_whitespace();
    let start = parser.state();

    let at_keyword = match parser.next()? {
        Token::AtKeyword(name) => Some(name.to_ascii_lowercase()),
        _ => None,
    };

    let Some(keyword) = at_keyword else {
        parser.reset(&start);
        let selector = read_prelude(parser)?;
        let declarations = read_block(parser, read_declarations)?;
        return Ok(CssRule::Style(StyleRule {
            selector,
            declarations,
        }));
    };

    let prelude = read_prelude(parser)?;
    match keyword.as_str() {
        "media" => {
            let rules = read_block(parser, read_rules)?;
            Ok(CssRule::Media {
                condition: prelude,
                rules,
            })
        }
        "keyframes" => {
            let frames = read_block(parser, read_frames)?;
            Ok(CssRule::Keyframes {
                name: prelude,
                frames,
            })
        }
        _ => Err(parser.new_custom_error(())),
    }
}

/// Text up to the next `{`, trimmed; never empty
fn read_prelude<'i>(parser: &mut Parser<'i, '_>) -> Result<String, RuleParseError<'i>> {
    let prelude = parser.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
        let start = p.position();
        while p.next().is_ok() {}
        Ok::<_, RuleParseError<'i>>(p.slice_from(start).trim())
    })?;

    if prelude.is_empty() {
        return Err(parser.new_custom_error(()));
    }
    Ok(prelude.to_string())
}

fn read_block<'i, T, F>(parser: &mut Parser<'i, '_>, read: F) -> Result<T, RuleParseError<'i>>
where
    F: for<'tt> FnOnce(&mut Parser<'i, 'tt>) -> Result<T, RuleParseError<'i>>,
{
    if !matches!(parser.next()?, Token::CurlyBracketBlock) {
        return Err(parser.new_custom_error(()));
    }
    parser.parse_nested_block(read)
}

fn read_frames<'i>(parser: &mut Parser<'i, '_>) -> Result<Vec<StyleRule>, RuleParseError<'i>> {
    let mut frames = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            return Ok(frames);
        }
        let selector = read_prelude(parser)?;
        let declarations = read_block(parser, read_declarations)?;
        frames.push(StyleRule {
            selector,
            declarations,
        });
    }
}

fn read_declarations<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Vec<Declaration>, RuleParseError<'i>> {
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            return Ok(declarations);
        }
        if parser.try_parse(|p| p.expect_semicolon()).is_ok() {
            continue;
        }

        let property = parser.expect_ident()?.to_string();
        parser.expect_colon()?;

        let value = parser.parse_until_before(Delimiter::Semicolon, |p| {
            let start = p.position();
            while p.next().is_ok() {}
            Ok::<_, RuleParseError<'i>>(p.slice_from(start).trim())
        })?;

        if value.is_empty() {
            return Err(parser.new_custom_error(()));
        }

        declarations.push(Declaration {
            property,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style_rule() {
        let rule = parse_rule(".x-1abc{color:#f00}").unwrap();
        let style = rule.as_style().unwrap();

        assert_eq!(style.selector, ".x-1abc");
        assert_eq!(style.class_name(), Some("x-1abc"));
        assert_eq!(style.primary_property(), Some("color"));
        assert_eq!(rule.to_string(), ".x-1abc{color:#f00}");
    }

    #[test]
    fn test_pseudo_selector_class_name() {
        let rule = parse_rule(".f-9z:focus-visible{outline-width:2px}").unwrap();
        assert_eq!(rule.as_style().and_then(StyleRule::class_name), Some("f-9z"));
    }

    #[test]
    fn test_dual_declaration_primary_property() {
        let rule = parse_rule(".x-q{-webkit-appearance:none;appearance:none}").unwrap();
        let style = rule.as_style().unwrap();

        assert_eq!(style.declarations.len(), 2);
        assert_eq!(style.declarations[0].property, "-webkit-appearance");
        assert_eq!(style.primary_property(), Some("appearance"));
    }

    #[test]
    fn test_values_keep_their_spelling() {
        let rule = parse_rule(".x-a { background-image : url(data:image/png;base64,AAAA) ; }").unwrap();
        assert_eq!(rule.to_string(), ".x-a{background-image:url(data:image/png;base64,AAAA)}");
    }

    #[test]
    fn test_parse_keyframes() {
        let css = "@keyframes k-abc{0%{opacity:0}100%{opacity:1;transform:scale(1)}}";
        let rule = parse_rule(css).unwrap();

        match &rule {
            CssRule::Keyframes { name, frames } => {
                assert_eq!(name, "k-abc");
                assert_eq!(frames.len(), 2);
                assert_eq!(frames[1].declarations[1].value, "scale(1)");
            }
            other => panic!("expected keyframes, got {:?}", other),
        }
        assert_eq!(rule.to_string(), css);
    }

    #[test]
    fn test_parse_media_wrappers() {
        let css = "@media all{}\n@media (hover: hover){.h-1:hover{color:#00f}}";
        let rules = parse_rules(css).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].to_string(), "@media all{}");
        match &rules[1] {
            CssRule::Media { condition, rules } => {
                assert_eq!(condition, "(hover: hover)");
                assert_eq!(rules.len(), 1);
            }
            other => panic!("expected media block, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_rules_are_rejected() {
        assert!(parse_rule(".x-a{color}").is_err());
        assert!(parse_rule(".x-a{color:}").is_err());
        assert!(parse_rule("{color:red}").is_err());
        assert!(parse_rule(".x-a{color:red}.x-b{color:blue}").is_err());
        assert!(parse_rule("@font-face{font-family:x}").is_err());
        assert!(parse_rule(".x-a color:red").is_err());
    }
}
