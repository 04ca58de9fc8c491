//! Module rewrite: css calls become their JSON result, package imports are
//! removed or redirected to the virtual `cx` module

use crate::error::{CompileError, CompileResult};
use crate::evaluator::Evaluator;
use crate::lexer::{tokenize, SpannedToken};
use crate::parser::{find_css_calls, parse_module, ModuleScan};
use std::ops::Range;
use std::path::Path;
use swatch_engine::Css;
use swatch_sourcemap::{LineIndex, RewrittenSource, SourceMapBuilder};
use tracing::{debug, instrument};

/// Module that `cx` imports are redirected to
pub const VIRTUAL_CX_MODULE: &str = "virtual:swatch/cx";

/// A lexed module with its imports
pub struct ModuleSource<'src> {
    source: &'src str,
    tokens: Vec<SpannedToken<'src>>,
    scan: ModuleScan,
}

impl<'src> ModuleSource<'src> {
    pub fn parse(source: &'src str) -> Self {
        let tokens = tokenize(source);
        let scan = parse_module(&tokens);
        Self {
            source,
            tokens,
            scan,
        }
    }

    pub fn dependencies(&self) -> &[String] {
        &self.scan.dependencies
    }

    pub fn scan(&self) -> &ModuleScan {
        &self.scan
    }
}

struct Edit {
    range: Range<usize>,
    text: String,
    name: Option<&'static str>,
}

/// Import statement binding `cx` (possibly renamed) from the virtual module
pub fn cx_import(local: &str) -> String {
    if local == "cx" {
        format!("import {{ cx }} from \"{}\";", VIRTUAL_CX_MODULE)
    } else {
        format!("import {{ cx as {} }} from \"{}\";", local, VIRTUAL_CX_MODULE)
    }
}

/// Rewrite `module`, registering its styles with `css`.
///
/// Returns `None` when the module imports neither `css` nor `cx` from one
/// of `package_sources`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn transform_module(
    css: &mut Css,
    path: &Path,
    module: &ModuleSource<'_>,
    package_sources: &[String],
) -> CompileResult<Option<RewrittenSource>> {
    let mut edits = Vec::new();
    let mut css_locals = Vec::new();
    let mut imports_package = false;

    for import in &module.scan.imports {
        if !package_sources.contains(&import.source) {
            continue;
        }

        let css_local = import.local_name("css");
        let cx_local = import.local_name("cx");
        if css_local.is_none() && cx_local.is_none() {
            continue;
        }
        imports_package = true;

        if let Some(local) = css_local {
            css_locals.push(local);
        }
        edits.push(Edit {
            range: import.span.clone(),
            text: cx_local.map(cx_import).unwrap_or_default(),
            name: None,
        });
    }

    if !imports_package {
        return Ok(None);
    }

    let calls = find_css_calls(&module.tokens, module.source.len(), &css_locals).map_err(|source| {
        CompileError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut evaluator = Evaluator::new(css);
    let mut lines: Option<LineIndex> = None;

    for call in &calls {
        let value = evaluator
            .evaluate_call(call.kind, call.argument.as_ref())
            .map_err(|source| {
                let index = lines.get_or_insert_with(|| LineIndex::new(module.source));
                CompileError::Eval {
                    path: path.to_path_buf(),
                    line: index.position(module.source, call.span.start).0 + 1,
                    source,
                }
            })?;

        edits.push(Edit {
            range: call.span.clone(),
            text: serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string()),
            name: Some(call.kind.name()),
        });
    }

    debug!(calls = calls.len(), "rewrote css calls");
    Ok(Some(apply_edits(path, module.source, edits)))
}

fn apply_edits(path: &Path, source: &str, mut edits: Vec<Edit>) -> RewrittenSource {
    edits.sort_by_key(|edit| edit.range.start);

    let file = path.to_string_lossy();
    let mut builder = SourceMapBuilder::new(&file, source);
    let mut cursor = 0;

    for edit in &edits {
        if edit.range.start < cursor {
            continue;
        }
        builder.copy(cursor..edit.range.start);
        builder.replace(edit.range.start, &edit.text, edit.name);
        cursor = edit.range.end;
    }
    builder.copy(cursor..source.len());

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swatch_engine::{EngineOptions, StyleEngine};

    fn css() -> Css {
        Css::new(StyleEngine::new(EngineOptions::default().with_diagnostics(false)))
    }

    fn packages() -> Vec<String> {
        vec!["@swatch/css".to_string(), "~/styles".to_string()]
    }

    fn transform(css: &mut Css, source: &str) -> CompileResult<Option<RewrittenSource>> {
        transform_module(css, Path::new("src/app.ts"), &ModuleSource::parse(source), &packages())
    }

    #[test]
    fn test_make_is_replaced_with_class_names() {
        let mut css = css();
        let source = "import { css } from \"@swatch/css\";\nconst styles = css.make({ title: { color: \"red\" } });\n";

        let output = transform(&mut css, source).unwrap().unwrap();

        let class = css.caches().atomic.keys().next().cloned().unwrap_or_default();
        assert_eq!(
            output.code,
            format!("\nconst styles = {{\n  \"title\": \"{}\"\n}};\n", class)
        );
    }

    #[test]
    fn test_cx_import_is_redirected() {
        let mut css = css();
        let source = "import { css, cx as merge } from '~/styles';\nmerge('a');";

        let output = transform(&mut css, source).unwrap().unwrap();
        assert_eq!(
            output.code,
            "import { cx as merge } from \"virtual:swatch/cx\";\nmerge('a');"
        );

        let output = transform(&mut css, "import { cx } from '@swatch/css';").unwrap().unwrap();
        assert_eq!(output.code, "import { cx } from \"virtual:swatch/cx\";");
    }

    #[test]
    fn test_unrelated_module_is_untouched() {
        let mut css = css();
        assert!(transform(&mut css, "import { css } from 'other';\ncss.make({});")
            .unwrap()
            .is_none());
        assert!(transform(&mut css, "import { keyframes } from '@swatch/css';")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_non_literal_argument_becomes_empty_object() {
        let mut css = css();
        let source = "import { css } from '@swatch/css';\nexport const a = css.make(styles);\nexport const b = css.extend(theme);";

        let output = transform(&mut css, source).unwrap().unwrap();
        assert_eq!(output.code, "\nexport const a = {};\nexport const b = {};");
    }

    #[test]
    fn test_extend_then_make_in_one_module() {
        let mut css = css();
        let source = r#"import { css as s } from "@swatch/css";
export const theme = s.extend({ accent: "blue" });
export const styles = s.make((input) => ({ link: { color: input.accent } }));
"#;

        let output = transform(&mut css, source).unwrap().unwrap();

        assert!(output.code.contains("export const theme = {\n  \"accent\": \"blue\"\n};"));
        assert!(css.serialize_sheet().contains("{color:#00f}"));
    }

    #[test]
    fn test_source_map_points_at_call() {
        let mut css = css();
        let source = "import { css } from '@swatch/css';\nconst a = 1;\nconst s = css.make({ b: { zIndex: 1 } });";

        let output = transform(&mut css, source).unwrap().unwrap();

        // the import line is emptied, so the call now sits on line 2
        let token = output.map.lookup_token(2, 10).unwrap();
        assert_eq!((token.get_src_line(), token.get_src_col()), (2, 10));
        assert_eq!(token.get_name(), Some("make"));
    }

    #[test]
    fn test_evaluation_error_reports_line() {
        let mut css = css();
        let source = "import { css } from '@swatch/css';\n\nconst s = css.make({ a: { color: theme.red } });";

        let error = transform(&mut css, source).unwrap_err();
        assert!(matches!(error, CompileError::Eval { line: 3, .. }));
    }
}
