//! Document store and position mapping.
//!
//! A [`Document`] owns its text and two line tables built once at construction:
//! byte offsets (for slicing) and character offsets (for index mapping). Both tables hold one
//! entry per line plus a sentinel equal to `total + 1`, as if the final line were terminated by a
//! newline, so line `l` always spans `starts[l]..starts[l + 1] - 1`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::error::DocumentError;
use crate::position::TextPosition;

const UTF8_BOM: char = '\u{feff}';

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a document, used to key derived caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Immutable text content with a line index.
///
/// A document has a single owner. Dropping it releases the buffer, and every cache keyed by its
/// [`DocumentId`] becomes stale.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    text: String,
    /// Byte offset of every line start, plus sentinel.
    line_starts: Vec<usize>,
    /// Character offset of every line start, plus sentinel.
    char_starts: Vec<usize>,
}

impl Document {
    /// Build a document from in-memory text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let (line_starts, char_starts) = build_line_tables(&text);
        let document = Self {
            id: DocumentId::next(),
            text,
            line_starts,
            char_starts,
        };
        debug!(
            id = document.id.get(),
            lines = document.line_count(),
            bytes = document.byte_len(),
            "document created"
        );
        document
    }

    /// Read a file fully and build a document from it.
    ///
    /// This is the only blocking call in the engine. Hosts that must not block their UI thread run
    /// it elsewhere and hand the result back through [`handoff`](crate::handoff).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "document read failed");
            DocumentError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let mut text = String::from_utf8(bytes).map_err(|_| {
            warn!(path = %path.display(), "document is not UTF-8");
            DocumentError::Decode {
                path: path.to_path_buf(),
            }
        })?;
        if text.starts_with(UTF8_BOM) {
            text.replace_range(..UTF8_BOM.len_utf8(), "");
        }
        Ok(Self::from_text(text))
    }

    /// Identity of this document.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Full content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of logical lines. Never zero: an empty document has one empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Total number of characters, newlines included.
    pub fn char_count(&self) -> usize {
        self.char_starts[self.line_count()] - 1
    }

    /// Total number of bytes.
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    /// Text of `line`, without its trailing newline.
    pub fn line_text(&self, line: usize) -> Result<&str, DocumentError> {
        self.check_line(line)?;
        Ok(self.line_slice(line))
    }

    /// Number of characters on `line`, without its trailing newline.
    pub fn line_char_count(&self, line: usize) -> Result<usize, DocumentError> {
        self.check_line(line)?;
        Ok(self.line_len_chars(line))
    }

    /// Iterate over all line texts in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.line_count()).map(|line| self.line_slice(line))
    }

    /// Map a flat character index to a position.
    ///
    /// Total function: indices before the start clamp to `(0, 0)`, indices past the end clamp to
    /// the end of the last line. An index addressing a newline maps to the end of its line.
    pub fn position_from_index(&self, char_index: i64) -> TextPosition {
        if char_index <= 0 {
            return TextPosition::new(0, 0);
        }
        let index = usize::try_from(char_index)
            .unwrap_or(usize::MAX)
            .min(self.char_count());
        // The sentinel is always greater than `index`, so the partition point is >= 1.
        let line = (self.char_starts.partition_point(|&start| start <= index) - 1)
            .min(self.line_count() - 1);
        TextPosition::new(line, index - self.char_starts[line])
    }

    /// Map a position to a flat character index, clamping line and column into the document.
    pub fn index_from_position(&self, position: TextPosition) -> usize {
        let line = position.line.min(self.line_count() - 1);
        let column = position.column.min(self.line_len_chars(line));
        self.char_starts[line] + column
    }

    /// Byte offset of a (clamped) position within [`Document::text`].
    pub fn byte_offset_from_position(&self, position: TextPosition) -> usize {
        let line = position.line.min(self.line_count() - 1);
        let start = self.line_starts[line];
        start + column_to_byte(self.line_slice(line), position.column)
    }

    fn check_line(&self, line: usize) -> Result<(), DocumentError> {
        if line >= self.line_count() {
            return Err(DocumentError::OutOfRange {
                line,
                line_count: self.line_count(),
            });
        }
        Ok(())
    }

    fn line_slice(&self, line: usize) -> &str {
        &self.text[self.line_starts[line]..self.line_starts[line + 1] - 1]
    }

    fn line_len_chars(&self, line: usize) -> usize {
        self.char_starts[line + 1] - 1 - self.char_starts[line]
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::from_text(String::new())
    }
}

/// Byte offset of `column` within `line`, clamped to the line length.
pub(crate) fn column_to_byte(line: &str, column: usize) -> usize {
    if line.is_ascii() {
        return column.min(line.len());
    }
    line.char_indices()
        .nth(column)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}

fn build_line_tables(text: &str) -> (Vec<usize>, Vec<usize>) {
    let mut line_starts = vec![0];
    let mut char_starts = vec![0];
    let mut chars = 0usize;

    if text.is_ascii() {
        for (byte, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(byte + 1);
                char_starts.push(byte + 1);
            }
        }
        chars = text.len();
    } else {
        for (byte, ch) in text.char_indices() {
            chars += 1;
            if ch == '\n' {
                line_starts.push(byte + 1);
                char_starts.push(chars);
            }
        }
    }

    line_starts.push(text.len() + 1);
    char_starts.push(chars + 1);
    (line_starts, char_starts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_has_one_line() {
        let doc = Document::from_text("");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.char_count(), 0);
        assert_eq!(doc.line_text(0).unwrap(), "");
        assert_eq!(doc.position_from_index(0), TextPosition::new(0, 0));
        assert_eq!(doc.position_from_index(5), TextPosition::new(0, 0));
    }

    #[test]
    fn test_line_tables_are_strictly_increasing() {
        let doc = Document::from_text("a\n\nbc\n");
        assert_eq!(doc.line_starts, vec![0, 2, 3, 6, 7]);
        assert_eq!(doc.char_starts, vec![0, 2, 3, 6, 7]);
        assert!(doc.line_starts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(doc.line_starts.len(), doc.line_count() + 1);
    }

    #[test]
    fn test_line_text() {
        let doc = Document::from_text("first\nsecond\n\nlast");
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines, vec!["first", "second", "", "last"]);
        assert!(matches!(
            doc.line_text(4),
            Err(DocumentError::OutOfRange {
                line: 4,
                line_count: 4
            })
        ));
    }

    #[test]
    fn test_trailing_newline_creates_empty_line() {
        let doc = Document::from_text("abc\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1).unwrap(), "");
        assert_eq!(doc.position_from_index(4), TextPosition::new(1, 0));
    }

    #[test]
    fn test_position_from_index_cjk() {
        let doc = Document::from_text("你好\n世界");
        assert_eq!(doc.char_count(), 5);
        assert_eq!(doc.position_from_index(1), TextPosition::new(0, 1));
        assert_eq!(doc.position_from_index(2), TextPosition::new(0, 2));
        assert_eq!(doc.position_from_index(3), TextPosition::new(1, 0));
        assert_eq!(doc.position_from_index(5), TextPosition::new(1, 2));
    }

    #[test]
    fn test_index_from_position_clamps() {
        let doc = Document::from_text("ABC\nDEF\nGHI");
        assert_eq!(doc.index_from_position(TextPosition::new(1, 0)), 4);
        assert_eq!(doc.index_from_position(TextPosition::new(1, 99)), 7);
        assert_eq!(doc.index_from_position(TextPosition::new(9, 1)), 9);
        assert_eq!(doc.index_from_position(TextPosition::NONE), 11);
    }

    #[test]
    fn test_byte_offset_from_position() {
        let doc = Document::from_text("ab\n你好x");
        assert_eq!(doc.byte_offset_from_position(TextPosition::new(0, 1)), 1);
        assert_eq!(doc.byte_offset_from_position(TextPosition::new(1, 1)), 6);
        assert_eq!(doc.byte_offset_from_position(TextPosition::new(1, 2)), 9);
        assert_eq!(doc.byte_offset_from_position(TextPosition::new(1, 50)), 10);
    }

    #[test]
    fn test_document_ids_are_unique() {
        let a = Document::from_text("x");
        let b = Document::from_text("x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_column_to_byte() {
        assert_eq!(column_to_byte("hello", 3), 3);
        assert_eq!(column_to_byte("hello", 30), 5);
        assert_eq!(column_to_byte("añb", 2), 3);
    }
}
