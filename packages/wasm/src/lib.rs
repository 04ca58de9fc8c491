//! WebAssembly bindings: a style sheet object for runtime use in the
//! browser, plus the module transform for bundler plugins.

use std::path::Path;
use swatch_compiler::{transform_module, ModuleSource, DEFAULT_PACKAGE_NAME};
use swatch_engine::{ClassNames, Composer, Css, EngineOptions, IdentityCaches, Keyframes, StyleEngine, StyleMap};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, error))
}

#[wasm_bindgen]
pub struct TransformResult {
    code: String,
    map: String,
}

#[wasm_bindgen]
impl TransformResult {
    #[wasm_bindgen(getter)]
    pub fn code(&self) -> String {
        self.code.clone()
    }

    /// Source map as JSON
    #[wasm_bindgen(getter)]
    pub fn map(&self) -> String {
        self.map.clone()
    }
}

/// An engine holding every rule generated so far
#[wasm_bindgen]
pub struct StyleSheet {
    css: Css,
    package_sources: Vec<String>,
}

#[wasm_bindgen]
impl StyleSheet {
    #[wasm_bindgen(constructor)]
    pub fn new(diagnostics: Option<bool>) -> StyleSheet {
        let options = EngineOptions::default().with_diagnostics(diagnostics.unwrap_or(true));
        StyleSheet {
            css: Css::new(StyleEngine::new(options)),
            package_sources: vec![DEFAULT_PACKAGE_NAME.to_string()],
        }
    }

    /// Treat `source` as an import of the css package during `transform`
    #[wasm_bindgen(js_name = addPackageSource)]
    pub fn add_package_source(&mut self, source: &str) {
        if !self.package_sources.iter().any(|existing| existing == source) {
            self.package_sources.push(source.to_string());
        }
    }

    /// Register a JSON style map, returning the JSON class map
    pub fn make(&mut self, styles: &str) -> Result<String, JsValue> {
        self.make_json(styles).map_err(|e| js_error("Invalid styles", e))
    }

    /// Register JSON keyframes, returning the animation name
    pub fn keyframes(&mut self, keyframes: &str) -> Result<Option<String>, JsValue> {
        self.keyframes_json(keyframes)
            .map_err(|e| js_error("Invalid keyframes", e))
    }

    /// Merge a JSON object into the `make` input; returns the object as given
    pub fn extend(&mut self, values: &str) -> Result<String, JsValue> {
        self.extend_json(values).map_err(|e| js_error("Invalid input", e))
    }

    /// Merge a JSON array of class name fragments
    pub fn cx(&self, fragments: &str) -> Result<String, JsValue> {
        self.cx_json(fragments).map_err(|e| js_error("Invalid class names", e))
    }

    /// Full style sheet text
    pub fn serialize(&self) -> String {
        self.css.serialize_sheet()
    }

    /// Identity caches as JSON, for hydrating `composeClassNames`
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.css.caches()).map_err(|e| js_error("Snapshot failed", e))
    }

    /// Rewrite the css calls of one module; `undefined` when it has none
    pub fn transform(&mut self, source: &str, file_path: &str) -> Result<Option<TransformResult>, JsValue> {
        self.transform_source(source, file_path)
            .map_err(|e| JsValue::from_str(&e))
    }
}

impl StyleSheet {
    fn make_json(&mut self, styles: &str) -> serde_json::Result<String> {
        let styles: StyleMap = serde_json::from_str(styles)?;
        serde_json::to_string(&self.css.make(&styles))
    }

    fn keyframes_json(&mut self, keyframes: &str) -> serde_json::Result<Option<String>> {
        let keyframes: Keyframes = serde_json::from_str(keyframes)?;
        Ok(self.css.keyframes(&keyframes))
    }

    fn extend_json(&mut self, values: &str) -> serde_json::Result<String> {
        let values = serde_json::from_str(values)?;
        serde_json::to_string(&self.css.extend(values))
    }

    fn cx_json(&self, fragments: &str) -> serde_json::Result<String> {
        let fragments: Vec<ClassNames> = serde_json::from_str(fragments)?;
        Ok(self.css.cx(&fragments))
    }

    fn transform_source(&mut self, source: &str, file_path: &str) -> Result<Option<TransformResult>, String> {
        let module = ModuleSource::parse(source);
        let rewritten = transform_module(&mut self.css, Path::new(file_path), &module, &self.package_sources)
            .map_err(|e| format!("Transform error: {}", e))?;

        rewritten
            .map(|rewritten| {
                let map = swatch_sourcemap::to_json(&rewritten.map).map_err(|e| e.to_string())?;
                Ok(TransformResult {
                    code: rewritten.code,
                    map,
                })
            })
            .transpose()
    }
}

/// Merge class names against a snapshot written by the build
#[wasm_bindgen(js_name = composeClassNames)]
pub fn compose_class_names(snapshot: &str, fragments: &str) -> Result<String, JsValue> {
    compose(snapshot, fragments).map_err(|e| js_error("Invalid snapshot", e))
}

fn compose(snapshot: &str, fragments: &str) -> serde_json::Result<String> {
    let caches: IdentityCaches = serde_json::from_str(snapshot)?;
    let fragments: Vec<ClassNames> = serde_json::from_str(fragments)?;
    Ok(Composer::new(&caches).with_diagnostics(false).cx(&fragments))
}
