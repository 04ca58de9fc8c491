use crate::line_index::{advance, LineIndex};
use sourcemap::{SourceMap, SourceMapBuilder as ExternalBuilder};
use std::ops::Range;

/// Rewritten module text with its source map
#[derive(Debug)]
pub struct RewrittenSource {
    pub code: String,
    pub map: SourceMap,
}

/// Builds rewritten text and its source map together
pub struct SourceMapBuilder<'a> {
    source: &'a str,
    index: LineIndex,
    builder: ExternalBuilder,
    output: String,
    position: (u32, u32),
}

impl<'a> SourceMapBuilder<'a> {
    /// # Arguments
    /// * `source_file` - Path of the original module, as recorded in `sources`
    /// * `source` - The original module text
    pub fn new(source_file: &str, source: &'a str) -> Self {
        let mut builder = ExternalBuilder::new(Some(source_file));
        let source_id = builder.add_source(source_file);
        builder.set_source_contents(source_id, Some(source));

        Self {
            source,
            index: LineIndex::new(source),
            builder,
            output: String::with_capacity(source.len()),
            position: (0, 0),
        }
    }

    fn map_to(&mut self, offset: usize, name: Option<&str>) {
        let (src_line, src_col) = self.index.position(self.source, offset);
        let name_id = name.map(|n| self.builder.add_name(n));
        self.builder.add_raw(
            self.position.0,
            self.position.1,
            src_line,
            src_col,
            Some(0),
            name_id,
            false,
        );
    }

    /// Copy `range` of the original text verbatim, mapping its start and the
    /// start of every line inside it
    pub fn copy(&mut self, range: Range<usize>) {
        let source = self.source;
        let Some(text) = source.get(range.clone()) else {
            return;
        };
        if text.is_empty() {
            return;
        }

        self.map_to(range.start, None);

        let mut offset = range.start;
        for segment in text.split_inclusive('\n') {
            self.output.push_str(segment);
            advance(&mut self.position, segment);
            offset += segment.len();

            if segment.ends_with('\n') && offset < range.end {
                self.map_to(offset, None);
            }
        }
    }

    /// Emit generated `text` standing for the original expression at `origin`
    pub fn replace(&mut self, origin: usize, text: &str, name: Option<&str>) {
        if text.is_empty() {
            return;
        }
        self.map_to(origin, name);
        self.output.push_str(text);
        advance(&mut self.position, text);
    }

    /// Current (line, column) in the generated output
    pub fn position(&self) -> (u32, u32) {
        self.position
    }

    pub fn finish(self) -> RewrittenSource {
        RewrittenSource {
            code: self.output,
            map: self.builder.into_sourcemap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_json;

    #[test]
    fn test_identity_copy() {
        let source = "import a from \"a\";\nconsole.log(a);\n";
        let mut builder = SourceMapBuilder::new("main.ts", source);
        builder.copy(0..source.len());

        let rewritten = builder.finish();
        assert_eq!(rewritten.code, source);

        let token = rewritten.map.lookup_token(1, 3).unwrap();
        assert_eq!((token.get_src_line(), token.get_src_col()), (1, 0));
    }

    #[test]
    fn test_replacement_maps_to_origin() {
        let source = "const s = css.make({ a: { color: \"red\" } });\nexport { s };";
        let call = source.find("css.make").unwrap_or_default();
        let end = source.find(";\n").unwrap_or_default();

        let mut builder = SourceMapBuilder::new("styles.ts", source);
        builder.copy(0..call);
        builder.replace(call, "{\n  \"a\": \"x-1\"\n}", Some("make"));
        builder.copy(end..source.len());

        let rewritten = builder.finish();
        assert_eq!(rewritten.code, "const s = {\n  \"a\": \"x-1\"\n};\nexport { s };");

        let token = rewritten.map.lookup_token(0, 10).unwrap();
        assert_eq!((token.get_src_line(), token.get_src_col()), (0, 10));
        assert_eq!(token.get_name(), Some("make"));

        // text after the replacement maps back to the original tail
        let tail = rewritten.map.lookup_token(3, 0).unwrap();
        assert_eq!(tail.get_src_line(), 1);
    }

    #[test]
    fn test_json_output() {
        let source = "let a = 1;";
        let mut builder = SourceMapBuilder::new("a.js", source);
        builder.copy(0..source.len());

        let json = to_json(&builder.finish().map).unwrap();

        assert!(json.contains("\"version\":3"));
        assert!(json.contains("a.js"));
        assert!(json.contains("let a = 1;"));
    }
}
