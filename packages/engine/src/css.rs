//! Application-facing call surface: `make`, `keyframes`, `extend`, `cx`

use crate::cx::{ClassNames, IdentityCaches};
use crate::error::EngineResult;
use crate::options::EngineOptions;
use crate::preprocess::{preprocess_atomic_style, preprocess_keyframes, preprocess_reset_style};
use crate::sheet::{SheetHost, StyleEngine};
use crate::style::{ClassMap, Keyframes, StyleMap};
use serde_json::{Map, Value};
use tracing::instrument;

/// Style registry: an engine plus the values shared through `extend`
pub struct Css {
    engine: StyleEngine,
    input: Map<String, Value>,
}

/// Argument handed to `make_with` callbacks
pub struct MakeInput<'a> {
    engine: &'a mut StyleEngine,
    values: &'a Map<String, Value>,
}

impl<'a> MakeInput<'a> {
    pub fn keyframes(&mut self, keyframes: &Keyframes) -> Option<String> {
        let diagnostics = self.engine.options().diagnostics;
        self.engine
            .insert_keyframes(&preprocess_keyframes(keyframes, diagnostics))
    }

    /// A value registered with `extend`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        self.values
    }
}

impl Css {
    pub fn new(engine: StyleEngine) -> Self {
        Self {
            engine,
            input: Map::new(),
        }
    }

    /// Registry writing to the sheet `options.sheet_id` of `host`
    pub fn attach(host: &mut dyn SheetHost, options: EngineOptions) -> EngineResult<Self> {
        Ok(Self::new(StyleEngine::attach(host, options)?))
    }

    /// Register a style map. Keys starting with the reset marker become one
    /// compound reset class; every other key gets atomic classes.
    #[instrument(skip_all, fields(keys = styles.len()))]
    pub fn make(&mut self, styles: &StyleMap) -> ClassMap {
        let diagnostics = self.engine.options().diagnostics;
        let mut output = ClassMap::new();

        for (key, style) in styles {
            let class_names = if self.engine.options().is_reset_key(key) {
                self.engine
                    .insert_reset_rule(&preprocess_reset_style(style, diagnostics))
            } else {
                self.engine
                    .insert_atomic_rules(&preprocess_atomic_style(style, diagnostics))
            };
            output.insert(key.clone(), class_names);
        }

        output
    }

    /// `make` with a style map built from the extended input
    pub fn make_with<F>(&mut self, build: F) -> ClassMap
    where
        F: FnOnce(&mut MakeInput<'_>) -> StyleMap,
    {
        let styles = {
            let mut input = MakeInput {
                engine: &mut self.engine,
                values: &self.input,
            };
            build(&mut input)
        };
        self.make(&styles)
    }

    pub fn keyframes(&mut self, keyframes: &Keyframes) -> Option<String> {
        let diagnostics = self.engine.options().diagnostics;
        self.engine
            .insert_keyframes(&preprocess_keyframes(keyframes, diagnostics))
    }

    /// Shallow-merge `values` into the `make_with` input; returns them unchanged
    pub fn extend(&mut self, values: Map<String, Value>) -> Map<String, Value> {
        for (key, value) in &values {
            self.input.insert(key.clone(), value.clone());
        }
        values
    }

    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    pub fn cx(&self, fragments: &[ClassNames]) -> String {
        self.engine.cx(fragments)
    }

    pub fn serialize_sheet(&self) -> String {
        self.engine.serialize()
    }

    pub fn caches(&self) -> &IdentityCaches {
        self.engine.caches()
    }

    pub fn engine(&self) -> &StyleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut StyleEngine {
        &mut self.engine
    }
}

impl Default for Css {
    fn default() -> Self {
        Self::new(StyleEngine::default())
    }
}
