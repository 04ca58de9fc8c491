use serde::{Deserialize, Serialize};

/// Identifier of the style element/asset that backs the engine
pub const DEFAULT_SHEET_ID: &str = "swatch-stylesheet";

/// Key prefix selecting the reset layer in `make`
pub const DEFAULT_RESET_MARKER: char = '$';

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Id of the sheet container looked up (or created) on the host
    pub sheet_id: String,

    /// Development diagnostics: recoverable problems are reported as warnings
    pub diagnostics: bool,

    /// Style map keys starting with this character become reset rules
    pub reset_marker: char,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sheet_id: DEFAULT_SHEET_ID.to_string(),
            diagnostics: cfg!(debug_assertions),
            reset_marker: DEFAULT_RESET_MARKER,
        }
    }
}

impl EngineOptions {
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_sheet_id(mut self, sheet_id: impl Into<String>) -> Self {
        self.sheet_id = sheet_id.into();
        self
    }

    pub fn is_reset_key(&self, key: &str) -> bool {
        key.starts_with(self.reset_marker)
    }
}
