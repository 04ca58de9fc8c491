use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swatch_compiler::{BuildOptions, DEFAULT_EXTENSIONS, DEFAULT_PACKAGE_NAME};
use swatch_engine::EngineOptions;

pub const DEFAULT_CONFIG_NAME: &str = "swatch.config.json";

/// Swatch configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Directory holding the application modules
    pub src_dir: String,

    /// HTML pages or modules the build starts from, relative to the project
    pub entries: Vec<String>,

    pub out_dir: String,

    /// Directory of the stylesheet asset inside `outDir`
    pub assets_dir: String,

    /// Stylesheet name before the content hash
    pub file_name: String,

    /// Import source providing `css` and `cx`
    pub package_name: String,

    /// Specifier prefix to project-relative path
    pub aliases: IndexMap<String, String>,

    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: "src".to_string(),
            entries: vec!["index.html".to_string()],
            out_dir: "dist".to_string(),
            assets_dir: "assets".to_string(),
            file_name: "styles".to_string(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            aliases: IndexMap::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.src_dir)
    }

    pub fn get_out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }

    /// Compiler options for a project rooted at `root`
    pub fn build_options(&self, root: &Path, engine: EngineOptions) -> BuildOptions {
        BuildOptions {
            root: root.to_path_buf(),
            entries: self.entries.iter().map(PathBuf::from).collect(),
            package_name: self.package_name.clone(),
            aliases: self.aliases.clone(),
            extensions: self.extensions.clone(),
            assets_dir: self.assets_dir.clone(),
            file_name: self.file_name.clone(),
            engine,
        }
    }
}
