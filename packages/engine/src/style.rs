//! Style object model: declarations, nested pseudo-state buckets and keyframes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single declaration value: a length-like number or raw CSS text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(text) => Some(text),
            StyleValue::Number(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(value) => f.write_str(&format_number(*value)),
            StyleValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

/// Entry of a style object. Nested objects are only meaningful under the
/// pseudo-state keys; `null` entries are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleEntry {
    Value(StyleValue),
    Nested(Style),
    Unset,
}

impl From<StyleValue> for StyleEntry {
    fn from(value: StyleValue) -> Self {
        StyleEntry::Value(value)
    }
}

impl From<f64> for StyleEntry {
    fn from(value: f64) -> Self {
        StyleEntry::Value(value.into())
    }
}

impl From<i32> for StyleEntry {
    fn from(value: i32) -> Self {
        StyleEntry::Value(value.into())
    }
}

impl From<&str> for StyleEntry {
    fn from(value: &str) -> Self {
        StyleEntry::Value(value.into())
    }
}

impl From<String> for StyleEntry {
    fn from(value: String) -> Self {
        StyleEntry::Value(value.into())
    }
}

impl From<Style> for StyleEntry {
    fn from(style: Style) -> Self {
        StyleEntry::Nested(style)
    }
}

/// Ordered style object as written by the caller
pub type Style = IndexMap<String, StyleEntry>;

/// Preprocessed style: longhand properties only, no nesting
pub type FlatStyle = IndexMap<String, StyleValue>;

/// Keyframes as written by the caller (`from`/`to`/percentages)
pub type Keyframes = IndexMap<String, Style>;

/// Preprocessed keyframes keyed by percentage selector
pub type KeyframeBlocks = IndexMap<String, FlatStyle>;

/// Input of `make`: semantic key to style object
pub type StyleMap = IndexMap<String, Style>;

/// Output of `make`: semantic key to generated class names
pub type ClassMap = IndexMap<String, String>;

/// Interaction states routed to their own cascade layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoState {
    Hover,
    Focus,
    Active,
}

impl PseudoState {
    /// Emission order of pseudo-state buckets
    pub const ALL: [PseudoState; 3] = [PseudoState::Hover, PseudoState::Focus, PseudoState::Active];

    /// Marker key used in style objects
    pub fn key(self) -> &'static str {
        match self {
            PseudoState::Hover => ":hover",
            PseudoState::Focus => ":focus",
            PseudoState::Active => ":active",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        PseudoState::ALL.into_iter().find(|state| state.key() == key)
    }
}

/// Render a number the way a JavaScript host stringifies it
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        // also covers -0
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        // `{:e}` gives the shortest digits; JS spells positive exponents with `+`
        let text = format!("{:e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        };
    }
    value.to_string()
}

/// Build a [`Style`] inline.
///
/// Values are single tokens (literals or parenthesized expressions); a braced
/// value becomes a nested bucket:
///
/// ```
/// use swatch_engine::style;
///
/// let button = style! {
///     "color": "red",
///     "padding": 8,
///     ":hover": { "color": "blue" },
/// };
/// assert_eq!(button.len(), 3);
/// ```
#[macro_export]
macro_rules! style {
    ($($key:literal : $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut style = $crate::Style::new();
        $( style.insert($key.to_string(), $crate::style!(@entry $value)); )*
        style
    }};
    (@entry { $($inner:tt)* }) => {
        $crate::StyleEntry::Nested($crate::style!($($inner)*))
    };
    (@entry $value:expr) => {
        $crate::StyleEntry::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_format_number_exponents() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_deserialize_style_object() {
        let json = r#"{
            "color": "red",
            "margin": 10,
            "opacity": null,
            ":hover": { "color": "blue" }
        }"#;

        let style: Style = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = style.keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["color", "margin", "opacity", ":hover"]);
        assert_eq!(style["color"], StyleEntry::Value(StyleValue::from("red")));
        assert_eq!(style["margin"], StyleEntry::Value(StyleValue::Number(10.0)));
        assert_eq!(style["opacity"], StyleEntry::Unset);
        assert!(matches!(style[":hover"], StyleEntry::Nested(_)));
    }

    #[test]
    fn test_style_macro() {
        let style = style! {
            "color": "red",
            "zIndex": 2,
            ":focus": { "outlineWidth": (-1) },
        };

        assert_eq!(style["zIndex"], StyleEntry::Value(StyleValue::Number(2.0)));
        match &style[":focus"] {
            StyleEntry::Nested(nested) => {
                assert_eq!(
                    nested["outlineWidth"],
                    StyleEntry::Value(StyleValue::Number(-1.0))
                )
            }
            other => panic!("expected nested bucket, got {:?}", other),
        }
    }

    #[test]
    fn test_pseudo_state_keys() {
        assert_eq!(PseudoState::from_key(":hover"), Some(PseudoState::Hover));
        assert_eq!(PseudoState::from_key(":focus"), Some(PseudoState::Focus));
        assert_eq!(PseudoState::from_key(":active"), Some(PseudoState::Active));
        assert_eq!(PseudoState::from_key(":visited"), None);
    }
}
