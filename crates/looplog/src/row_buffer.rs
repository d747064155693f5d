use std::borrow::Cow;

pub const SEPARATOR: char = ',';
pub const TERMINATOR: char = '\n';

/// Accumulates the text of the current row.
///
/// The buffer knows nothing about fields; header and data rows go through the
/// same cells. Cells containing the separator, quotes or line breaks are
/// quoted so every row parses back to the same number of columns.
#[derive(Debug)]
pub struct RowBuffer {
    line: String,
}

impl Default for RowBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RowBuffer {
    const INITIAL_CAPACITY: usize = 128;

    #[must_use]
    pub fn new() -> Self {
        Self {
            line: String::with_capacity(Self::INITIAL_CAPACITY),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn append(&mut self, text: &str) {
        if !self.line.is_empty() {
            self.line.push(SEPARATOR);
        }
        self.line.push_str(&escape(text));
    }

    /// Insert a cell in front of everything appended so far.
    pub fn prepend(&mut self, text: &str) {
        let mut cell = escape(text).into_owned();
        if !self.line.is_empty() {
            cell.push(SEPARATOR);
        }
        self.line.insert_str(0, &cell);
    }

    /// Take the terminated row, leaving the buffer empty for the next one.
    pub fn flush_and_reset(&mut self) -> String {
        let capacity = self.line.capacity();
        let mut row = std::mem::replace(&mut self.line, String::with_capacity(capacity));
        row.push(TERMINATOR);
        row
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if text.contains([SEPARATOR, '"', '\r', TERMINATOR]) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}
