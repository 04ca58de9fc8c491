//! Property-name and value canonicalization

use crate::color::{format_color, ColorResolver, CssColorResolver};
use crate::style::{format_number, StyleValue};
use std::collections::HashMap;

/// Properties accepting bare numbers that are not lengths
const UNITLESS_PROPERTIES: &[&str] = &[
    "animationIterationCount",
    "aspectRatio",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "columnCount",
    "flex",
    "flexGrow",
    "flexShrink",
    "fontWeight",
    "gridColumnEnd",
    "gridColumnStart",
    "gridRowEnd",
    "gridRowStart",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "scale",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
    // SVG
    "fillOpacity",
    "floodOpacity",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
];

/// Properties whose string values are resolved as colors
const COLOR_PROPERTIES: &[&str] = &[
    "backgroundColor",
    "borderBottomColor",
    "borderColor",
    "borderLeftColor",
    "borderRightColor",
    "borderTopColor",
    "color",
    "textDecorationColor",
];

/// Color values that must reach the sheet untouched
const COLOR_KEYWORDS: &[&str] = &[
    "currentcolor",
    "currentColor",
    "inherit",
    "initial",
    "unset",
    "revert",
];

pub fn is_unitless(property: &str) -> bool {
    UNITLESS_PROPERTIES.contains(&property)
}

pub fn is_color_property(property: &str) -> bool {
    COLOR_PROPERTIES.contains(&property)
}

fn is_color_keyword(value: &str) -> bool {
    COLOR_KEYWORDS.contains(&value) || value.starts_with("var(")
}

/// `backgroundColor` -> `background-color`, `WebkitAppearance` -> `-webkit-appearance`
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Memoizing normalizer owned by a style engine
pub struct Normalizer {
    resolver: Box<dyn ColorResolver>,
    names: HashMap<String, String>,
    colors: HashMap<String, String>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_resolver(Box::new(CssColorResolver))
    }

    pub fn with_resolver(resolver: Box<dyn ColorResolver>) -> Self {
        Self {
            resolver,
            names: HashMap::new(),
            colors: HashMap::new(),
        }
    }

    pub fn normalize_name(&mut self, property: &str) -> String {
        if let Some(name) = self.names.get(property) {
            return name.clone();
        }

        let name = hyphenate(property);
        self.names.insert(property.to_string(), name.clone());
        name
    }

    pub fn normalize_value(&mut self, property: &str, value: &StyleValue) -> String {
        match value {
            StyleValue::Number(number) => {
                let text = format_number(*number);
                if is_unitless(property) {
                    text
                } else {
                    format!("{}px", text)
                }
            }
            StyleValue::Text(text) if is_color_property(property) => self.normalize_color(text),
            StyleValue::Text(text) => text.clone(),
        }
    }

    fn normalize_color(&mut self, value: &str) -> String {
        if is_color_keyword(value) {
            return value.to_string();
        }

        if let Some(color) = self.colors.get(value) {
            return color.clone();
        }

        match self.resolver.resolve(value) {
            Some(packed) => {
                let color = format_color(packed);
                self.colors.insert(value.to_string(), color.clone());
                color
            }
            // Unresolvable colors are kept as written
            None => value.to_string(),
        }
    }

    /// Canonical rule body for one declaration, e.g. `color:#f00`
    pub fn stringify(&mut self, property: &str, value: &StyleValue) -> String {
        match property {
            "appearance" => format!("-webkit-appearance:{value};appearance:{value}"),
            "lineClamp" => format!("-webkit-line-clamp:{value};line-clamp:{value}"),
            _ => {
                let name = self.normalize_name(property);
                let value = self.normalize_value(property, value);
                format!("{}:{}", name, value)
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
