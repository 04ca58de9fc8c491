use super::host::{SheetBackend, SheetHost};
use super::layer::Layer;
use super::rule::CssRule;
use crate::cx::{ClassNames, Composer, IdentityCaches};
use crate::error::{EngineError, EngineResult};
use crate::fingerprint::fingerprint;
use crate::normalize::Normalizer;
use crate::options::EngineOptions;
use crate::preprocess::AtomicStyle;
use crate::style::{FlatStyle, KeyframeBlocks};
use indexmap::IndexSet;
use tracing::{debug, info, instrument};

/// Per-layer bookkeeping
#[derive(Debug, Default)]
struct LayerState {
    /// Inserts go to the host's media block at the layer index
    attached: bool,
    /// Rule texts in insertion order, rendered by `serialize`
    rules: IndexSet<String>,
}

/// Atomic rule cache over six cascade layers.
///
/// Without a host (or when a layer wrapper cannot be created on it) the
/// engine buffers rules in memory; dedup, naming and serialization behave the
/// same either way.
pub struct StyleEngine {
    options: EngineOptions,
    normalizer: Normalizer,
    backend: Option<Box<dyn SheetBackend>>,
    layers: [LayerState; 6],
    keyframes: IndexSet<String>,
    caches: IdentityCaches,
}

impl StyleEngine {
    /// Detached engine buffering rules in memory
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            normalizer: Normalizer::new(),
            backend: None,
            layers: Default::default(),
            keyframes: IndexSet::new(),
            caches: IdentityCaches::new(),
        }
    }

    /// Engine bound to the sheet `options.sheet_id` on `host`, with its
    /// caches rehydrated from the rules already present there
    #[instrument(skip(host, options), fields(sheet = %options.sheet_id))]
    pub fn attach(host: &mut dyn SheetHost, options: EngineOptions) -> EngineResult<Self> {
        let backend = host
            .find_or_create(&options.sheet_id)
            .map_err(|source| EngineError::ContainerUnavailable {
                id: options.sheet_id.clone(),
                source,
            })?;

        let mut engine = Self::new(options);
        engine.backend = Some(backend);
        engine.ensure_layers();
        engine.rehydrate();

        info!(cached = engine.caches.len(), keyframes = engine.keyframes.len(), "Attached style engine");
        Ok(engine)
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn caches(&self) -> &IdentityCaches {
        &self.caches
    }

    /// Whether any layer is held in memory instead of on a host sheet
    pub fn is_buffered(&self) -> bool {
        self.layers.iter().any(|layer| !layer.attached)
    }

    pub fn keyframe_names(&self) -> impl Iterator<Item = &str> {
        self.keyframes.iter().map(String::as_str)
    }

    /// Rule texts currently recorded for `layer`
    pub fn layer_rules(&self, layer: Layer) -> impl Iterator<Item = &str> {
        self.layers[layer.index()].rules.iter().map(String::as_str)
    }

    fn ensure_layers(&mut self) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        for layer in Layer::ALL {
            let index = layer.index();
            let existing = backend.rules();

            let attached = match existing.get(index) {
                Some(rule) if rule.is_media() => true,
                Some(rule) => {
                    diagnostic!(self.options.diagnostics, index, found = %rule, "Unexpected rule in place of a layer wrapper");
                    false
                }
                None => match backend.insert_rule(&layer.wrapper(), index) {
                    Ok(()) => true,
                    Err(error) => {
                        diagnostic!(self.options.diagnostics, %error, index, "Failed to create layer wrapper");
                        false
                    }
                },
            };

            if !attached {
                debug!(?layer, "Buffering layer in memory");
            }
            self.layers[index].attached = attached;
        }
    }

    fn rehydrate(&mut self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let rules = backend.rules();

        for layer in Layer::ALL {
            let state = &mut self.layers[layer.index()];
            if !state.attached {
                continue;
            }

            let nested = match rules.get(layer.index()) {
                Some(CssRule::Media { rules, .. }) => rules.as_slice(),
                _ => continue,
            };

            for rule in nested {
                match (layer, rule) {
                    (Layer::Keyframes, CssRule::Keyframes { name, .. }) => {
                        self.keyframes.insert(name.clone());
                    }
                    (Layer::Reset, CssRule::Style(style)) => {
                        if let Some(class_name) = style.class_name() {
                            self.caches.reset.insert(class_name.to_string());
                        }
                    }
                    (_, CssRule::Style(style)) => {
                        let entry = style.class_name().zip(style.primary_property());
                        let map = self.caches.properties_mut(layer);
                        if let (Some((class_name, property)), Some(map)) = (entry, map) {
                            map.insert(class_name.to_string(), property.to_string());
                        }
                    }
                    _ => {
                        debug!(?layer, rule = %rule, "Skipping foreign rule during rehydration");
                        continue;
                    }
                }
                state.rules.insert(rule.to_string());
            }

            debug!(?layer, rules = state.rules.len(), "Rehydrated layer");
        }
    }

    /// Physically insert `rule` into `layer`. Failures are reported and
    /// swallowed; the rule is then missing from `serialize` output.
    fn insert_rule(&mut self, layer: Layer, rule: String) {
        let state = &mut self.layers[layer.index()];

        if state.attached {
            if let Some(backend) = self.backend.as_mut() {
                if let Err(error) = backend.insert_nested_rule(layer.index(), &rule) {
                    diagnostic!(self.options.diagnostics, %error, ?layer, "Failed to insert rule");
                    return;
                }
            }
        }

        state.rules.insert(rule);
    }

    /// Register every declaration of a preprocessed style as its own class,
    /// returning the class names space-separated in bucket order
    pub fn insert_atomic_rules(&mut self, style: &AtomicStyle) -> String {
        let mut class_names = Vec::new();

        for (state, bucket) in style.buckets() {
            let layer = state.map(Layer::from).unwrap_or(Layer::Atomic);

            for (property, value) in bucket {
                let body = self.normalizer.stringify(property, value);
                let class_name = format!("{}-{}", layer.prefix(), fingerprint(&body));

                let cached = self
                    .caches
                    .properties(layer)
                    .is_some_and(|map| map.contains_key(&class_name));

                if !cached {
                    debug!(class = %class_name, body = %body, ?layer, "Inserting atomic rule");
                    let rule = format!(".{}{}{{{}}}", class_name, layer.selector_suffix(), body);
                    self.insert_rule(layer, rule);

                    let property = self.normalizer.normalize_name(property);
                    if let Some(map) = self.caches.properties_mut(layer) {
                        map.insert(class_name.clone(), property);
                    }
                }

                class_names.push(class_name);
            }
        }

        class_names.join(" ")
    }

    /// Register a whole flat style as one compound reset rule
    pub fn insert_reset_rule(&mut self, style: &FlatStyle) -> String {
        let body = self.stringify_block(style);
        let class_name = format!("{}-{}", Layer::Reset.prefix(), fingerprint(&body));

        if !self.caches.reset.contains(&class_name) {
            debug!(class = %class_name, body = %body, "Inserting reset rule");
            self.insert_rule(Layer::Reset, format!(".{}{{{}}}", class_name, body));
            self.caches.reset.insert(class_name.clone());
        }

        class_name
    }

    /// Register a keyframes block, returning its animation name. An empty
    /// block has no name.
    pub fn insert_keyframes(&mut self, keyframes: &KeyframeBlocks) -> Option<String> {
        if keyframes.is_empty() {
            diagnostic!(self.options.diagnostics, "Ignoring empty keyframes");
            return None;
        }

        let mut body = String::new();
        for (selector, style) in keyframes {
            let block = self.stringify_block(style);
            body.push_str(&format!("{}{{{}}}", selector, block));
        }

        let name = format!("{}-{}", Layer::Keyframes.prefix(), fingerprint(&body));

        if !self.keyframes.contains(&name) {
            debug!(name = %name, "Inserting keyframes");
            self.insert_rule(Layer::Keyframes, format!("@keyframes {}{{{}}}", name, body));
            self.keyframes.insert(name.clone());
        }

        Some(name)
    }

    fn stringify_block(&mut self, style: &FlatStyle) -> String {
        style
            .iter()
            .map(|(property, value)| self.normalizer.stringify(property, value))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// All six layers, each in its media wrapper, one per line
    pub fn serialize(&self) -> String {
        Layer::ALL
            .iter()
            .map(|layer| {
                let rules: String = self.layers[layer.index()].rules.iter().map(String::as_str).collect();
                format!("@media {}{{{}}}", layer.media(), rules)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn composer(&self) -> Composer<'_> {
        Composer::new(&self.caches).with_diagnostics(self.options.diagnostics)
    }

    pub fn cx(&self, fragments: &[ClassNames]) -> String {
        self.composer().cx(fragments)
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
