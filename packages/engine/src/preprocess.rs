//! Shorthand expansion and pseudo-state partitioning

use crate::style::{FlatStyle, KeyframeBlocks, Keyframes, PseudoState, Style, StyleEntry, StyleValue};
use cssparser::{Parser, ParserInput};

/// Shorthands whose value is copied verbatim to every longhand
const SHORTHANDS: &[(&str, &[&str])] = &[
    (
        "borderColor",
        &["borderTopColor", "borderRightColor", "borderBottomColor", "borderLeftColor"],
    ),
    (
        "borderRadius",
        &[
            "borderTopLeftRadius",
            "borderTopRightRadius",
            "borderBottomRightRadius",
            "borderBottomLeftRadius",
        ],
    ),
    (
        "borderStyle",
        &["borderTopStyle", "borderRightStyle", "borderBottomStyle", "borderLeftStyle"],
    ),
    (
        "borderWidth",
        &["borderTopWidth", "borderRightWidth", "borderBottomWidth", "borderLeftWidth"],
    ),
    ("gap", &["rowGap", "columnGap"]),
    ("inset", &["top", "right", "bottom", "left"]),
    ("insetBlock", &["insetBlockStart", "insetBlockEnd"]),
    ("insetInline", &["insetInlineStart", "insetInlineEnd"]),
    ("margin", &["marginTop", "marginRight", "marginBottom", "marginLeft"]),
    ("marginBlock", &["marginBlockStart", "marginBlockEnd"]),
    ("marginHorizontal", &["marginRight", "marginLeft"]),
    ("marginInline", &["marginInlineStart", "marginInlineEnd"]),
    ("marginVertical", &["marginTop", "marginBottom"]),
    ("overflow", &["overflowX", "overflowY"]),
    ("overscrollBehavior", &["overscrollBehaviorX", "overscrollBehaviorY"]),
    ("padding", &["paddingTop", "paddingRight", "paddingBottom", "paddingLeft"]),
    ("paddingBlock", &["paddingBlockStart", "paddingBlockEnd"]),
    ("paddingHorizontal", &["paddingRight", "paddingLeft"]),
    ("paddingInline", &["paddingInlineStart", "paddingInlineEnd"]),
    ("paddingVertical", &["paddingTop", "paddingBottom"]),
    ("scrollMarginBlock", &["scrollMarginBlockStart", "scrollMarginBlockEnd"]),
    ("scrollMarginInline", &["scrollMarginInlineStart", "scrollMarginInlineEnd"]),
    ("scrollPaddingBlock", &["scrollPaddingBlockStart", "scrollPaddingBlockEnd"]),
    ("scrollPaddingInline", &["scrollPaddingInlineStart", "scrollPaddingInlineEnd"]),
];

pub fn longhands(property: &str) -> Option<&'static [&'static str]> {
    SHORTHANDS
        .iter()
        .find(|(shorthand, _)| *shorthand == property)
        .map(|(_, longhands)| *longhands)
}

fn is_shorthand(property: &str) -> bool {
    longhands(property).is_some() || property == "backgroundPosition" || property == "flex"
}

/// More than one top-level CSS component value, e.g. `10px 20px`
fn is_multi_token(value: &str) -> bool {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);

    let mut count = 0;
    while parser.next().is_ok() {
        count += 1;
        if count > 1 {
            return true;
        }
    }
    false
}

/// Atomic style split into a base bucket and ordered pseudo-state buckets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomicStyle {
    pub base: FlatStyle,
    pub hover: Option<FlatStyle>,
    pub focus: Option<FlatStyle>,
    pub active: Option<FlatStyle>,
}

impl AtomicStyle {
    pub fn pseudo(&self, state: PseudoState) -> Option<&FlatStyle> {
        match state {
            PseudoState::Hover => self.hover.as_ref(),
            PseudoState::Focus => self.focus.as_ref(),
            PseudoState::Active => self.active.as_ref(),
        }
    }

    fn pseudo_mut(&mut self, state: PseudoState) -> &mut Option<FlatStyle> {
        match state {
            PseudoState::Hover => &mut self.hover,
            PseudoState::Focus => &mut self.focus,
            PseudoState::Active => &mut self.active,
        }
    }

    /// Base bucket first, then hover, focus and active when present
    pub fn buckets(&self) -> impl Iterator<Item = (Option<PseudoState>, &FlatStyle)> {
        std::iter::once((None, &self.base)).chain(
            PseudoState::ALL
                .into_iter()
                .filter_map(move |state| self.pseudo(state).map(|bucket| (Some(state), bucket))),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.buckets().all(|(_, bucket)| bucket.is_empty())
    }
}

fn preprocess_rule(output: &mut FlatStyle, key: &str, entry: &StyleEntry, diagnostics: bool) {
    let value = match entry {
        StyleEntry::Unset => return,
        StyleEntry::Value(value) => value,
        StyleEntry::Nested(_) => {
            diagnostic!(diagnostics, property = %key, "Nested style objects are only supported under :hover, :focus and :active");
            return;
        }
    };

    if is_shorthand(key) {
        if let StyleValue::Text(text) = value {
            if is_multi_token(text) {
                diagnostic!(diagnostics, property = %key, value = %text, "Value is \"{}\" but only single values are supported", text);
                return;
            }
        }
    }

    if let Some(longhands) = longhands(key) {
        for longhand in longhands {
            output.insert(longhand.to_string(), value.clone());
        }
        return;
    }

    match key {
        "backgroundPosition" => {
            let text = value.as_text();
            if !matches!(text, Some("top" | "bottom")) {
                output.insert("backgroundPositionX".to_string(), value.clone());
            }
            if !matches!(text, Some("left" | "right")) {
                output.insert("backgroundPositionY".to_string(), value.clone());
            }
        }
        "flex" => match value {
            StyleValue::Number(grow) if grow.is_finite() && *grow >= 0.0 => {
                output.insert("flexGrow".to_string(), StyleValue::Number(*grow));
                output.insert("flexShrink".to_string(), StyleValue::Number(1.0));
                output.insert("flexBasis".to_string(), StyleValue::from("0%"));
            }
            _ => {
                diagnostic!(diagnostics, value = %value, "flex only accepts a non-negative number");
            }
        },
        _ => {
            output.insert(key.to_string(), value.clone());
        }
    }
}

/// Expand shorthands of a flat style object
pub fn preprocess_style(style: &Style, diagnostics: bool) -> FlatStyle {
    let mut output = FlatStyle::new();
    for (key, entry) in style {
        preprocess_rule(&mut output, key, entry, diagnostics);
    }
    output
}

/// Expand shorthands and pull pseudo-state buckets out in fixed order
pub fn preprocess_atomic_style(style: &Style, diagnostics: bool) -> AtomicStyle {
    let mut output = AtomicStyle::default();

    for (key, entry) in style {
        match PseudoState::from_key(key) {
            Some(state) => match entry {
                StyleEntry::Nested(nested) => {
                    *output.pseudo_mut(state) = Some(preprocess_style(nested, diagnostics));
                }
                StyleEntry::Unset => {}
                StyleEntry::Value(value) => {
                    diagnostic!(diagnostics, key = %key, value = %value, "Pseudo-state keys expect a style object");
                }
            },
            None => preprocess_rule(&mut output.base, key, entry, diagnostics),
        }
    }

    output
}

/// Expand shorthands of a reset style; pseudo-state keys are skipped
pub fn preprocess_reset_style(style: &Style, diagnostics: bool) -> FlatStyle {
    let mut output = FlatStyle::new();

    for (key, entry) in style {
        if PseudoState::from_key(key).is_some() {
            diagnostic!(diagnostics, key = %key, "\"{}\" is not supported in reset styles", key);
            continue;
        }
        preprocess_rule(&mut output, key, entry, diagnostics);
    }

    output
}

/// Rename `from`/`to` to percentages and expand each frame
pub fn preprocess_keyframes(keyframes: &Keyframes, diagnostics: bool) -> KeyframeBlocks {
    let mut output = KeyframeBlocks::new();

    for (selector, style) in keyframes {
        let selector = match selector.as_str() {
            "from" => "0%",
            "to" => "100%",
            other => other,
        };
        output.insert(selector.to_string(), preprocess_style(style, diagnostics));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style;

    fn keys(style: &FlatStyle) -> Vec<&str> {
        style.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_margin_expands_to_four_longhands() {
        let output = preprocess_style(&style! { "margin": 10 }, false);

        assert_eq!(keys(&output), vec!["marginTop", "marginRight", "marginBottom", "marginLeft"]);
        assert!(output.values().all(|value| *value == StyleValue::Number(10.0)));
    }

    #[test]
    fn test_longhand_after_shorthand_overrides_in_place() {
        let output = preprocess_style(&style! { "padding": 4, "paddingTop": 8 }, false);

        assert_eq!(keys(&output)[0], "paddingTop");
        assert_eq!(output["paddingTop"], StyleValue::Number(8.0));
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn test_flex_expansion() {
        let output = preprocess_style(&style! { "flex": 1 }, false);

        assert_eq!(keys(&output), vec!["flexGrow", "flexShrink", "flexBasis"]);
        assert_eq!(output["flexGrow"], StyleValue::Number(1.0));
        assert_eq!(output["flexShrink"], StyleValue::Number(1.0));
        assert_eq!(output["flexBasis"], StyleValue::from("0%"));
    }

    #[test]
    fn test_invalid_flex_is_dropped() {
        assert!(preprocess_style(&style! { "flex": (-1) }, false).is_empty());
        assert!(preprocess_style(&style! { "flex": "1 1 auto" }, false).is_empty());
        assert!(preprocess_style(&style! { "flex": (f64::INFINITY) }, false).is_empty());
    }

    #[test]
    fn test_background_position_axes() {
        let both = preprocess_style(&style! { "backgroundPosition": "center" }, false);
        assert_eq!(keys(&both), vec!["backgroundPositionX", "backgroundPositionY"]);

        let top = preprocess_style(&style! { "backgroundPosition": "top" }, false);
        assert_eq!(keys(&top), vec!["backgroundPositionY"]);

        let left = preprocess_style(&style! { "backgroundPosition": "left" }, false);
        assert_eq!(keys(&left), vec!["backgroundPositionX"]);
    }

    #[test]
    fn test_multi_token_shorthand_is_dropped() {
        let output = preprocess_style(&style! { "margin": "10px 20px", "color": "red" }, false);
        assert_eq!(keys(&output), vec!["color"]);
    }

    #[test]
    fn test_single_function_value_expands() {
        let output = preprocess_style(&style! { "gap": "calc(1rem + 2px)" }, false);
        assert_eq!(keys(&output), vec!["rowGap", "columnGap"]);
    }

    #[test]
    fn test_multi_token_longhand_is_kept() {
        let output = preprocess_style(&style! { "transition": "opacity 200ms ease" }, false);
        assert_eq!(keys(&output), vec!["transition"]);
    }

    #[test]
    fn test_pseudo_buckets_in_fixed_order() {
        let output = preprocess_atomic_style(
            &style! {
                ":active": { "color": "green" },
                "color": "red",
                ":hover": { "margin": 2 },
                ":focus": { "color": "blue" },
            },
            false,
        );

        let order: Vec<_> = output.buckets().map(|(state, _)| state).collect();
        assert_eq!(
            order,
            vec![None, Some(PseudoState::Hover), Some(PseudoState::Focus), Some(PseudoState::Active)]
        );
        assert_eq!(keys(&output.base), vec!["color"]);
        assert_eq!(output.hover.as_ref().map(FlatStyle::len), Some(4));
    }

    #[test]
    fn test_unset_values_are_skipped() {
        let mut input = style! { "color": "red" };
        input.insert("opacity".to_string(), StyleEntry::Unset);

        assert_eq!(keys(&preprocess_style(&input, false)), vec!["color"]);
    }

    #[test]
    fn test_reset_style_ignores_pseudo_keys() {
        let output = preprocess_reset_style(
            &style! { "margin": 0, ":hover": { "color": "red" } },
            false,
        );
        assert_eq!(output.len(), 4);
        assert!(!output.contains_key(":hover"));
    }

    #[test]
    fn test_keyframe_selectors_are_renamed() {
        let mut frames = Keyframes::new();
        frames.insert("from".to_string(), style! { "opacity": 0 });
        frames.insert("50%".to_string(), style! { "opacity": 0.3 });
        frames.insert("to".to_string(), style! { "opacity": 1 });

        let output = preprocess_keyframes(&frames, false);
        let selectors: Vec<_> = output.keys().map(String::as_str).collect();
        assert_eq!(selectors, vec!["0%", "50%", "100%"]);
    }
}
