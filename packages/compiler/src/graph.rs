//! Module resolution and entry discovery
//!
//! Handles resolving import specifiers against the file system (relative
//! paths, root-absolute paths, configured aliases, extension and `index`
//! probing) and reading module script entries out of HTML pages.

use indexmap::IndexMap;
use scraper::{Html, Selector};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use swatch_common::FileSystem;

/// Extensions probed when a specifier omits one
pub const DEFAULT_EXTENSIONS: [&str; 6] = [".mjs", ".js", ".mts", ".ts", ".jsx", ".tsx"];

pub struct Resolver<'a> {
    fs: &'a dyn FileSystem,
    root: &'a Path,
    aliases: &'a IndexMap<String, String>,
    extensions: &'a [String],
}

impl<'a> Resolver<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        root: &'a Path,
        aliases: &'a IndexMap<String, String>,
        extensions: &'a [String],
    ) -> Self {
        Self {
            fs,
            root,
            aliases,
            extensions,
        }
    }

    /// Whether `path` is a module the build reads
    pub fn is_script(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.extensions.iter().any(|known| *known == ext))
            .unwrap_or(false)
    }

    /// Resolve `specifier` imported by `importer`. Bare package specifiers
    /// and missing files resolve to `None`.
    pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        let base = if let Some(target) = self.alias_target(specifier) {
            target
        } else if specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier == "."
            || specifier == ".."
        {
            importer.parent().unwrap_or(self.root).join(specifier)
        } else if let Some(rooted) = specifier.strip_prefix('/') {
            self.root.join(rooted)
        } else {
            return None;
        };

        self.probe(&normalize_path(&base))
    }

    fn alias_target(&self, specifier: &str) -> Option<PathBuf> {
        self.aliases.iter().find_map(|(find, replacement)| {
            if specifier == find {
                return Some(self.root.join(replacement));
            }
            specifier
                .strip_prefix(find.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| self.root.join(replacement).join(rest))
        })
    }

    /// The file itself, then with each extension, then its `index` module
    fn probe(&self, base: &Path) -> Option<PathBuf> {
        let with_extensions = self.extensions.iter().map(|ext| {
            let mut name = OsString::from(base.as_os_str());
            name.push(ext);
            PathBuf::from(name)
        });
        let index_files = self
            .extensions
            .iter()
            .map(|ext| base.join(format!("index{}", ext)));

        std::iter::once(base.to_path_buf())
            .chain(with_extensions)
            .chain(index_files)
            .find(|candidate| self.fs.exists(candidate))
            .and_then(|found| self.fs.canonicalize(&found).ok())
    }

    /// Module scripts of an HTML page. Root-absolute sources are taken from
    /// the page's directory, relative ones from the project root.
    pub fn html_entries(&self, page: &Path, html: &str) -> Vec<PathBuf> {
        let dir = page.parent().unwrap_or(self.root);

        script_sources(html)
            .into_iter()
            .filter_map(|src| {
                let path = match src.strip_prefix('/') {
                    Some(rooted) => dir.join(rooted),
                    None => self.root.join(&src),
                };
                let path = normalize_path(&path);
                if self.is_script(&path) && self.fs.exists(&path) {
                    self.fs.canonicalize(&path).ok()
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Extension with its leading dot, e.g. `.ts`
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

pub fn is_html(path: &Path) -> bool {
    matches!(extension_of(path).as_deref(), Some(".html") | Some(".htm"))
}

/// Lexically resolve `.` and `..` components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// `src` of every `<script type="module">` element, in document order.
/// Commented-out scripts are not elements and are skipped; entities in
/// `src` are decoded.
pub fn script_sources(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(r#"script[type="module"][src]"#) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|script| script.value().attr("src"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swatch_common::MockFileSystem;

    fn extensions() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }

    #[test]
    fn test_script_sources() {
        let html = r#"<!doctype html>
<html>
  <head>
    <SCRIPT type="module" src="/src/main.tsx"></SCRIPT>
    <script src="/legacy.js"></script>
    <script type='module' src=./src/admin.ts defer></script>
    <script type="module">console.log("inline")</script>
  </head>
</html>"#;

        assert_eq!(script_sources(html), vec!["/src/main.tsx", "./src/admin.ts"]);
    }

    #[test]
    fn test_script_sources_skip_comments_and_decode_entities() {
        let html = r#"<html><head>
<!-- <script type="module" src="/old.ts"></script> -->
<script type="module" src="/src/main.ts?v=1&amp;x=2"></script>
</head></html>"#;

        assert_eq!(script_sources(html), vec!["/src/main.ts?v=1&x=2"]);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/app/src/./components/../theme.ts")),
            PathBuf::from("/app/src/theme.ts")
        );
    }

    #[test]
    fn test_resolve_relative_with_extensions() {
        let fs = MockFileSystem::new()
            .with_file("/app/src/theme.ts", "")
            .with_file("/app/src/components/index.tsx", "");
        let aliases = IndexMap::new();
        let extensions = extensions();
        let resolver = Resolver::new(&fs, Path::new("/app"), &aliases, &extensions);
        let importer = Path::new("/app/src/main.tsx");

        assert_eq!(
            resolver.resolve(importer, "./theme"),
            Some(PathBuf::from("/app/src/theme.ts"))
        );
        assert_eq!(
            resolver.resolve(importer, "./components"),
            Some(PathBuf::from("/app/src/components/index.tsx"))
        );
        assert_eq!(
            resolver.resolve(Path::new("/app/src/components/index.tsx"), "../theme.ts"),
            Some(PathBuf::from("/app/src/theme.ts"))
        );
        assert_eq!(resolver.resolve(importer, "react"), None);
        assert_eq!(resolver.resolve(importer, "./missing"), None);
    }

    #[test]
    fn test_resolve_alias() {
        let fs = MockFileSystem::new().with_file("/app/src/ui/button.tsx", "");
        let mut aliases = IndexMap::new();
        aliases.insert("~".to_string(), "src".to_string());
        let extensions = extensions();
        let resolver = Resolver::new(&fs, Path::new("/app"), &aliases, &extensions);

        assert_eq!(
            resolver.resolve(Path::new("/app/src/main.tsx"), "~/ui/button"),
            Some(PathBuf::from("/app/src/ui/button.tsx"))
        );
        // a longer name sharing the prefix is not the alias
        assert_eq!(resolver.resolve(Path::new("/app/src/main.tsx"), "~ui/button"), None);
    }

    #[test]
    fn test_html_entries() {
        let fs = MockFileSystem::new()
            .with_file("/app/src/main.tsx", "")
            .with_file("/app/pages/admin.ts", "");
        let aliases = IndexMap::new();
        let extensions = extensions();
        let resolver = Resolver::new(&fs, Path::new("/app"), &aliases, &extensions);

        let html = r#"<script type="module" src="/src/main.tsx"></script>
<script type="module" src="pages/admin.ts"></script>
<script type="module" src="/styles.css"></script>"#;

        assert_eq!(
            resolver.html_entries(Path::new("/app/index.html"), html),
            vec![
                PathBuf::from("/app/src/main.tsx"),
                PathBuf::from("/app/pages/admin.ts")
            ]
        );
    }
}
