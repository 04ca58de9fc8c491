//! Emitted build artifacts: the stylesheet asset, its `<link>` tag and the
//! `cx` cache snapshot

use scraper::{Html, Node, Selector};
use serde::Serialize;
use swatch_engine::IdentityCaches;

/// The serialized sheet with its content-hashed file name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Path relative to the output directory, `/`-separated
    pub file_name: String,
    pub source: String,
}

impl Asset {
    /// `<assets_dir>/<name>-<hash>.css`, hashing `source` with CRC32
    pub fn new(assets_dir: &str, name: &str, source: String) -> Self {
        let hash = crc32fast::hash(source.as_bytes());
        let stem = format!("{}-{:08x}.css", name, hash);
        let dir = assets_dir.trim_matches('/');

        Self {
            file_name: if dir.is_empty() {
                stem
            } else {
                format!("{}/{}", dir, stem)
            },
            source,
        }
    }

    /// URL the page loads the asset from
    pub fn href(&self) -> String {
        format!("/{}", self.file_name)
    }

    /// Snapshot file written next to the asset
    pub fn snapshot_file_name(&self) -> String {
        let stem = self
            .file_name
            .strip_suffix(".css")
            .unwrap_or(&self.file_name);
        format!("{}.cx.json", stem)
    }
}

pub fn link_tag(sheet_id: &str, href: &str) -> String {
    format!(
        "<link rel=\"stylesheet\" id=\"{}\" crossorigin href=\"{}\">",
        sheet_id, href
    )
}

/// Append the stylesheet link to the page's `<head>` and re-serialize the
/// document. Pages without a head get one from the HTML parser.
pub fn inject_stylesheet_link(html: &str, sheet_id: &str, href: &str) -> String {
    let mut document = Html::parse_document(html);
    let fragment = Html::parse_fragment(&link_tag(sheet_id, href));

    let (Ok(head_selector), Ok(link_selector)) = (Selector::parse("head"), Selector::parse("link")) else {
        return html.to_string();
    };
    let head = document.select(&head_selector).next().map(|head| head.id());
    let link = fragment
        .select(&link_selector)
        .next()
        .map(|link| link.value().clone());

    match (head.and_then(|id| document.tree.get_mut(id)), link) {
        (Some(mut head), Some(link)) => {
            head.append(Node::Element(link));
        }
        _ => return html.to_string(),
    }

    document.html()
}

/// Identity caches as pretty JSON, for hydrating a `Composer` at runtime
pub fn cx_snapshot(caches: &IdentityCaches) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(caches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_file_name() {
        let asset = Asset::new("assets", "styles", "@media all{}".to_string());
        let hash = format!("{:08x}", crc32fast::hash(b"@media all{}"));

        assert_eq!(asset.file_name, format!("assets/styles-{}.css", hash));
        assert_eq!(asset.href(), format!("/assets/styles-{}.css", hash));
        assert_eq!(asset.snapshot_file_name(), format!("assets/styles-{}.cx.json", hash));
    }

    #[test]
    fn test_asset_name_changes_with_content() {
        let a = Asset::new("assets", "styles", ".x-a{color:#f00}".to_string());
        let b = Asset::new("assets", "styles", ".x-a{color:#00f}".to_string());
        assert_ne!(a.file_name, b.file_name);

        let root = Asset::new("", "styles", String::new());
        assert!(root.file_name.starts_with("styles-"));
    }

    #[test]
    fn test_inject_into_head() {
        let html = "<!doctype html>\n<html>\n<head>\n<title>App</title>\n</head>\n<body></body>\n</html>";
        let output = inject_stylesheet_link(html, "swatch-stylesheet", "/assets/a.css");

        assert!(output.contains(
            "<title>App</title>\n<link rel=\"stylesheet\" id=\"swatch-stylesheet\" crossorigin=\"\" href=\"/assets/a.css\"></head>"
        ));
        assert!(output.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_inject_without_head() {
        let output = inject_stylesheet_link("<BODY>hi</BODY>", "s", "/a.css");
        assert_eq!(
            output,
            "<html><head><link rel=\"stylesheet\" id=\"s\" crossorigin=\"\" href=\"/a.css\"></head><body>hi</body></html>"
        );
    }

    #[test]
    fn test_inject_ignores_head_text_in_comments_and_scripts() {
        let html = "<html><head><!-- </head> --><script>const end = \"</head>\";</script></head><body></body></html>";
        let output = inject_stylesheet_link(html, "s", "/a.css");

        let link = output.find("<link").unwrap();
        let script_end = output.find("</script>").unwrap();
        assert!(link > script_end);
        assert!(output.contains("<!-- </head> -->"));
        assert_eq!(output.matches("<link").count(), 1);
    }

    #[test]
    fn test_snapshot_round_trips() {
        let mut caches = IdentityCaches::new();
        caches.reset.insert("r-1".to_string());
        caches.atomic.insert("x-1".to_string(), "color".to_string());

        let snapshot = cx_snapshot(&caches).unwrap();
        let restored: IdentityCaches = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(restored, caches);
    }
}
