//! Whole-project build: walk the module graph from the entries, rewrite
//! every module that uses the css package, then emit the stylesheet asset,
//! the patched HTML pages and the `cx` snapshot.

use crate::asset::{cx_snapshot, inject_stylesheet_link, Asset};
use crate::error::{CompileError, CompileResult};
use crate::graph::{is_html, Resolver, DEFAULT_EXTENSIONS};
use crate::transform::{transform_module, ModuleSource};
use indexmap::{IndexMap, IndexSet};
use std::path::PathBuf;
use swatch_common::{CommonError, FileSystem};
use swatch_engine::{Css, EngineOptions, IdentityCaches, StyleEngine};
use swatch_sourcemap::RewrittenSource;
use tracing::{debug, info, instrument};

pub const DEFAULT_PACKAGE_NAME: &str = "@swatch/css";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Project root; entries, aliases and root-absolute imports resolve from here
    pub root: PathBuf,
    pub entries: Vec<PathBuf>,
    /// Import source that provides `css` and `cx`
    pub package_name: String,
    /// Specifier prefix to root-relative replacement
    pub aliases: IndexMap<String, String>,
    pub extensions: Vec<String>,
    pub assets_dir: String,
    pub file_name: String,
    pub engine: EngineOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            entries: vec![PathBuf::from("index.html")],
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            aliases: IndexMap::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            assets_dir: "assets".to_string(),
            file_name: "styles".to_string(),
            engine: EngineOptions::default(),
        }
    }
}

impl BuildOptions {
    /// Import sources treated as the css package: its name plus whatever
    /// the name is aliased to
    pub fn package_sources(&self) -> Vec<String> {
        let mut sources = vec![self.package_name.clone()];
        if let Some(alias) = self.aliases.get(&self.package_name) {
            sources.push(alias.clone());
        }
        sources
    }
}

#[derive(Debug)]
pub struct BuildOutput {
    /// Rewritten modules, in the order their styles were registered
    pub modules: IndexMap<PathBuf, RewrittenSource>,
    /// HTML entries with the stylesheet link injected
    pub pages: IndexMap<PathBuf, String>,
    pub asset: Asset,
    pub caches: IdentityCaches,
    pub snapshot: String,
    /// Every file the walk reached, in visit order
    pub visited: Vec<PathBuf>,
}

pub struct BuildSession<'a> {
    fs: &'a dyn FileSystem,
    options: &'a BuildOptions,
    package_sources: Vec<String>,
    css: Css,
    visited: IndexSet<PathBuf>,
    modules: IndexMap<PathBuf, RewrittenSource>,
    pages: IndexMap<PathBuf, String>,
}

impl<'a> BuildSession<'a> {
    pub fn new(fs: &'a dyn FileSystem, options: &'a BuildOptions) -> Self {
        Self {
            fs,
            options,
            package_sources: options.package_sources(),
            css: Css::new(StyleEngine::new(options.engine.clone())),
            visited: IndexSet::new(),
            modules: IndexMap::new(),
            pages: IndexMap::new(),
        }
    }

    #[instrument(skip_all, fields(root = %self.options.root.display()))]
    pub fn run(mut self) -> CompileResult<BuildOutput> {
        let options = self.options;

        for entry in &options.entries {
            let path = options.root.join(entry);
            if !self.fs.exists(&path) {
                return Err(CompileError::EntryNotFound(path));
            }
            let path = self
                .fs
                .canonicalize(&path)
                .map_err(|e| CompileError::Common(CommonError::Io(e)))?;
            self.visit(path)?;
        }

        let asset = Asset::new(
            &options.assets_dir,
            &options.file_name,
            self.css.serialize_sheet(),
        );
        let href = asset.href();
        let pages = self
            .pages
            .iter()
            .map(|(path, html)| {
                let patched = inject_stylesheet_link(html, &options.engine.sheet_id, &href);
                (path.clone(), patched)
            })
            .collect();

        let caches = self.css.caches().clone();
        let snapshot = cx_snapshot(&caches).map_err(CommonError::from)?;

        info!(
            modules = self.visited.len(),
            rewritten = self.modules.len(),
            asset = %asset.file_name,
            "build finished"
        );

        Ok(BuildOutput {
            modules: self.modules,
            pages,
            asset,
            caches,
            snapshot,
            visited: self.visited.into_iter().collect(),
        })
    }

    /// Depth-first: dependencies are visited, and their styles registered,
    /// before the importing module is rewritten
    fn visit(&mut self, path: PathBuf) -> CompileResult<()> {
        if !self.visited.insert(path.clone()) {
            return Ok(());
        }

        let fs = self.fs;
        let options = self.options;
        let resolver = Resolver::new(fs, &options.root, &options.aliases, &options.extensions);

        if is_html(&path) {
            let html = fs.read_to_string(&path)?;
            for entry in resolver.html_entries(&path, &html) {
                self.visit(entry)?;
            }
            self.pages.insert(path, html);
            return Ok(());
        }

        if !resolver.is_script(&path) {
            return Ok(());
        }

        let source = fs.read_to_string(&path)?;
        let module = ModuleSource::parse(&source);
        let dependencies: Vec<PathBuf> = module
            .dependencies()
            .iter()
            .filter_map(|specifier| resolver.resolve(&path, specifier))
            .collect();
        debug!(path = %path.display(), dependencies = dependencies.len(), "visiting module");

        for dependency in dependencies {
            self.visit(dependency)?;
        }

        if let Some(rewritten) = transform_module(&mut self.css, &path, &module, &self.package_sources)? {
            self.modules.insert(path, rewritten);
        }

        Ok(())
    }
}

/// Run a build over `fs`
pub fn build(fs: &dyn FileSystem, options: &BuildOptions) -> CompileResult<BuildOutput> {
    BuildSession::new(fs, options).run()
}
