/// Byte offset to line/column lookup over one source text.
///
/// Lines and columns are 0-indexed; columns count UTF-16 code units, which is
/// what source map consumers in a JavaScript host expect.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of `offset`, clamped to the end of `source`
    pub fn position(&self, source: &str, offset: usize) -> (u32, u32) {
        let offset = offset.min(source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };

        let start = self.line_starts[line];
        let column = source
            .get(start..offset)
            .map(|text| text.encode_utf16().count())
            .unwrap_or(0);

        (line as u32, column as u32)
    }
}

/// Advance a generated-text cursor over `text`
pub(crate) fn advance(position: &mut (u32, u32), text: &str) {
    for segment in text.split_inclusive('\n') {
        if segment.ends_with('\n') {
            position.0 += 1;
            position.1 = 0;
        } else {
            position.1 += segment.encode_utf16().count() as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        let source = "line 1\nline 2\nline 3";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position(source, 0), (0, 0));
        assert_eq!(index.position(source, 7), (1, 0));
        assert_eq!(index.position(source, 10), (1, 3));
        assert_eq!(index.position(source, 14), (2, 0));
    }

    #[test]
    fn test_out_of_bounds_clamps() {
        let source = "short";
        assert_eq!(LineIndex::new(source).position(source, 1000), (0, 5));
    }

    #[test]
    fn test_utf16_columns() {
        let source = "const a = \"日本\"; b\n😀x";
        let index = LineIndex::new(source);

        let b = source.find(" b").unwrap_or_default() + 1;
        assert_eq!(index.position(source, b), (0, 16));

        let x = source.find('x').unwrap_or_default();
        assert_eq!(index.position(source, x), (1, 2));
    }

    #[test]
    fn test_advance() {
        let mut position = (0, 0);
        advance(&mut position, "ab\ncd");
        assert_eq!(position, (1, 2));
        advance(&mut position, "\n");
        assert_eq!(position, (2, 0));
    }
}
