use lsp_types::Position;

/// Maps byte offsets ↔ LSP line:column positions for a single module.
/// Columns are counted in UTF-16 code units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line. line_starts[0] == 0 always.
    line_starts: Vec<usize>,
    ascii: bool,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts, ascii: source.is_ascii() }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of a line, excluding its line break.
    pub fn line_range(&self, source: &str, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let mut end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => source.len(),
        };
        if end > start && source.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some((start, end))
    }

    /// Offsets past the end clamp to the end of the text.
    pub fn offset_to_position(&self, source: &str, offset: usize) -> Position {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(ins) => ins.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let character = if self.ascii {
            offset - line_start
        } else {
            source[line_start..offset].encode_utf16().count()
        };
        Position { line: line as u32, character: character as u32 }
    }

    /// Columns past the end of a line clamp to the line end; lines past the
    /// end of the text map to the text length.
    pub fn position_to_offset(&self, source: &str, pos: Position) -> usize {
        let Some((start, end)) = self.line_range(source, pos.line as usize) else {
            return source.len();
        };
        // Keep a trailing `\r` addressable so every byte offset has a position.
        let end = match self.line_starts.get(pos.line as usize + 1) {
            Some(next) => next - 1,
            None => end,
        };
        if self.ascii {
            return (start + pos.character as usize).min(end);
        }
        let mut units = 0usize;
        for (i, ch) in source[start..end].char_indices() {
            if units >= pos.character as usize {
                return start + i;
            }
            units += ch.len_utf16();
        }
        end
    }
}
