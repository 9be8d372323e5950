use std::io::{BufRead, BufReader, Read};

use l5d_inject_base::consts::DOCUMENT_SEPARATOR;
use snafu::ResultExt;

use crate::manifest::{Error, error};

/// Size of the read buffer placed in front of unbuffered inputs.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Splits a YAML stream into raw documents.
///
/// A document ends at a line consisting of `---`, optionally followed by
/// whitespace or a comment. The bytes of each document are handed out
/// verbatim, comments and blank lines included. Empty documents, produced by
/// a leading separator or by two separators in a row, are skipped.
pub struct DocumentReader<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: Read> DocumentReader<BufReader<R>> {
    pub fn new(inner: R) -> Self {
        Self::from_buf_read(BufReader::with_capacity(READ_BUFFER_SIZE, inner))
    }
}

impl<R: BufRead> DocumentReader<R> {
    pub const fn from_buf_read(reader: R) -> Self { Self { reader, line: Vec::new() } }

    /// Returns the next document, or `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadInput`] when the underlying reader fails.
    pub fn next_document(&mut self) -> Result<Option<Vec<u8>>, Error> {
        let mut document = Vec::new();
        loop {
            self.line.clear();
            let read =
                self.reader.read_until(b'\n', &mut self.line).context(error::ReadInputSnafu)?;
            if read == 0 {
                return Ok((!document.is_empty()).then_some(document));
            }
            if is_separator(&self.line) {
                if document.is_empty() {
                    continue;
                }
                return Ok(Some(document));
            }
            document.extend_from_slice(&self.line);
        }
    }
}

impl<R: BufRead> Iterator for DocumentReader<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> { self.next_document().transpose() }
}

fn is_separator(line: &[u8]) -> bool {
    line.strip_prefix(DOCUMENT_SEPARATOR.as_bytes()).is_some_and(|rest| {
        let trimmed = rest.trim_ascii_start();
        trimmed.is_empty()
            || (trimmed.starts_with(b"#") && rest.first().is_some_and(u8::is_ascii_whitespace))
    })
}
