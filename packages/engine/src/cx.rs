//! Class-name composition: `cx`

use crate::sheet::Layer;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Generated names per layer. Atomic and pseudo-state layers keep the
/// hyphenated property each class sets, which is what `cx` dedups on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityCaches {
    pub reset: IndexSet<String>,
    pub atomic: IndexMap<String, String>,
    pub hover: IndexMap<String, String>,
    pub focus: IndexMap<String, String>,
    pub active: IndexMap<String, String>,
}

impl IdentityCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Property map of an atomic or pseudo-state layer
    pub fn properties(&self, layer: Layer) -> Option<&IndexMap<String, String>> {
        match layer {
            Layer::Atomic => Some(&self.atomic),
            Layer::Hover => Some(&self.hover),
            Layer::Focus => Some(&self.focus),
            Layer::Active => Some(&self.active),
            Layer::Keyframes | Layer::Reset => None,
        }
    }

    pub fn properties_mut(&mut self, layer: Layer) -> Option<&mut IndexMap<String, String>> {
        match layer {
            Layer::Atomic => Some(&mut self.atomic),
            Layer::Hover => Some(&mut self.hover),
            Layer::Focus => Some(&mut self.focus),
            Layer::Active => Some(&mut self.active),
            Layer::Keyframes | Layer::Reset => None,
        }
    }

    pub fn len(&self) -> usize {
        self.reset.len() + self.atomic.len() + self.hover.len() + self.focus.len() + self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layer owning `class_name`, checked atomic, hover, focus, active, then reset
    pub fn classify(&self, class_name: &str) -> Option<(Layer, Option<&str>)> {
        for layer in [Layer::Atomic, Layer::Hover, Layer::Focus, Layer::Active] {
            if let Some(property) = self.properties(layer).and_then(|map| map.get(class_name)) {
                return Some((layer, Some(property.as_str())));
            }
        }

        self.reset
            .contains(class_name)
            .then_some((Layer::Reset, None))
    }
}

/// A `cx` argument: a class string, a nested list, or anything else (ignored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassNames {
    Name(String),
    List(Vec<ClassNames>),
    Ignored(serde_json::Value),
}

impl ClassNames {
    fn collect_into<'a>(&'a self, tokens: &mut Vec<&'a str>) {
        match self {
            ClassNames::Name(name) => tokens.extend(name.split_whitespace()),
            ClassNames::List(items) => {
                for item in items {
                    item.collect_into(tokens);
                }
            }
            ClassNames::Ignored(_) => {}
        }
    }
}

impl From<&str> for ClassNames {
    fn from(name: &str) -> Self {
        ClassNames::Name(name.to_string())
    }
}

impl From<String> for ClassNames {
    fn from(name: String) -> Self {
        ClassNames::Name(name)
    }
}

impl From<&String> for ClassNames {
    fn from(name: &String) -> Self {
        ClassNames::Name(name.clone())
    }
}

impl From<bool> for ClassNames {
    fn from(flag: bool) -> Self {
        ClassNames::Ignored(serde_json::Value::Bool(flag))
    }
}

impl<T: Into<ClassNames>> From<Option<T>> for ClassNames {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => ClassNames::Ignored(serde_json::Value::Null),
        }
    }
}

impl<T: Into<ClassNames>> From<Vec<T>> for ClassNames {
    fn from(items: Vec<T>) -> Self {
        ClassNames::List(items.into_iter().map(Into::into).collect())
    }
}

/// Flatten fragments depth-first into whitespace-separated tokens
pub fn flatten(fragments: &[ClassNames]) -> Vec<&str> {
    let mut tokens = Vec::new();
    for fragment in fragments {
        fragment.collect_into(&mut tokens);
    }
    tokens
}

/// Resolves `cx` against a set of identity caches
pub struct Composer<'a> {
    caches: &'a IdentityCaches,
    diagnostics: bool,
}

impl<'a> Composer<'a> {
    pub fn new(caches: &'a IdentityCaches) -> Self {
        Self {
            caches,
            diagnostics: cfg!(debug_assertions),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Merge fragments: external classes, one reset class, then the last
    /// class per property for atomic, hover, focus and active in that order.
    pub fn cx(&self, fragments: &[ClassNames]) -> String {
        let mut external: IndexSet<&str> = IndexSet::new();
        let mut reset: Option<&str> = None;
        let mut atomic: IndexMap<&str, &str> = IndexMap::new();
        let mut hover: IndexMap<&str, &str> = IndexMap::new();
        let mut focus: IndexMap<&str, &str> = IndexMap::new();
        let mut active: IndexMap<&str, &str> = IndexMap::new();

        for token in flatten(fragments) {
            match self.caches.classify(token) {
                Some((Layer::Reset, _)) => match reset {
                    None => reset = Some(token),
                    Some(current) if current != token => {
                        diagnostic!(self.diagnostics, kept = %current, dropped = %token, "`cx` only accepts one reset style");
                    }
                    Some(_) => {}
                },
                Some((layer, Some(property))) => {
                    let bucket = match layer {
                        Layer::Hover => &mut hover,
                        Layer::Focus => &mut focus,
                        Layer::Active => &mut active,
                        _ => &mut atomic,
                    };
                    bucket.insert(property, token);
                }
                _ => {
                    external.insert(token);
                }
            }
        }

        let mut output: Vec<&str> = external.into_iter().collect();
        output.extend(reset);
        for bucket in [atomic, hover, focus, active] {
            output.extend(bucket.into_values());
        }

        output.join(" ")
    }
}

/// Compose class names from heterogeneous fragments.
///
/// The first argument is anything with a `cx(&[ClassNames]) -> String` method:
/// a [`Css`](crate::Css), a [`StyleEngine`](crate::StyleEngine) or a
/// [`Composer`].
#[macro_export]
macro_rules! cx {
    ($composer:expr $(, $fragment:expr)* $(,)?) => {
        $composer.cx(&[$($crate::ClassNames::from($fragment)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caches() -> IdentityCaches {
        let mut caches = IdentityCaches::new();
        caches.atomic.insert("x-red".into(), "color".into());
        caches.atomic.insert("x-blue".into(), "color".into());
        caches.atomic.insert("x-pad".into(), "padding-top".into());
        caches.hover.insert("h-red".into(), "color".into());
        caches.focus.insert("f-ring".into(), "outline-width".into());
        caches.active.insert("a-dim".into(), "opacity".into());
        caches.reset.insert("r-one".into());
        caches.reset.insert("r-two".into());
        caches
    }

    #[test]
    fn test_flatten_nested_and_sparse() {
        let fragments = vec![
            ClassNames::from("a  b"),
            ClassNames::from(false),
            ClassNames::from(vec![Some("c"), None, Some(" d ")]),
        ];
        assert_eq!(flatten(&fragments), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_later_argument_wins_per_property() {
        let caches = caches();
        let composer = Composer::new(&caches);

        assert_eq!(cx!(composer, "x-red", "x-blue"), "x-blue");
        assert_eq!(cx!(composer, "x-blue", "x-red"), "x-red");
    }

    #[test]
    fn test_property_keeps_first_position() {
        let caches = caches();
        let composer = Composer::new(&caches);

        assert_eq!(cx!(composer, "x-red x-pad", "x-blue"), "x-blue x-pad");
    }

    #[test]
    fn test_output_layer_order() {
        let caches = caches();
        let composer = Composer::new(&caches);

        let output = cx!(composer, "a-dim", "f-ring", "h-red", "x-pad", "r-one", "custom");
        assert_eq!(output, "custom r-one x-pad h-red f-ring a-dim");
    }

    #[test]
    fn test_single_reset() {
        let caches = caches();
        let composer = Composer::new(&caches).with_diagnostics(false);

        assert_eq!(cx!(composer, "r-one", "r-two"), "r-one");
        assert_eq!(cx!(composer, "r-two", "r-one", "r-two"), "r-two");
    }

    #[test]
    fn test_external_tokens_deduplicated() {
        let caches = caches();
        let composer = Composer::new(&caches);

        assert_eq!(cx!(composer, "foo", "x-red", "bar foo"), "foo bar x-red");
    }

    #[test]
    fn test_empty_input() {
        let caches = caches();
        let composer = Composer::new(&caches);

        assert_eq!(cx!(composer), "");
        assert_eq!(cx!(composer, None::<&str>, false, ""), "");
    }

    #[test]
    fn test_deserialize_fragments() {
        let fragments: Vec<ClassNames> =
            serde_json::from_str(r#"["a", null, false, ["b", ["c"]], 3]"#).unwrap();
        assert_eq!(flatten(&fragments), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_caches_snapshot_roundtrip() {
        let caches = caches();
        let json = serde_json::to_string(&caches).unwrap();
        let restored: IdentityCaches = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, caches);
        assert_eq!(restored.classify("h-red"), Some((Layer::Hover, Some("color"))));
        assert_eq!(restored.classify("r-two"), Some((Layer::Reset, None)));
        assert_eq!(restored.classify("nope"), None);
    }
}
