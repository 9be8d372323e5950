use std::io::Write;

use l5d_inject_base::consts::DOCUMENT_SEPARATOR;
use snafu::ResultExt;

use crate::manifest::{Error, error};

/// Writes documents back into a YAML stream.
///
/// Every document, the last one included, is followed by a `---` line.
pub struct DocumentWriter<W> {
    writer: W,
}

impl<W: Write> DocumentWriter<W> {
    pub const fn new(writer: W) -> Self { Self { writer } }

    /// # Errors
    ///
    /// Returns [`Error::WriteOutput`] when the underlying writer fails.
    pub fn write_document(&mut self, document: &[u8]) -> Result<(), Error> {
        self.writer.write_all(document).context(error::WriteOutputSnafu)?;
        // A document read from the final, unterminated line of the input
        // must not swallow the separator.
        if !document.is_empty() && !document.ends_with(b"\n") {
            self.writer.write_all(b"\n").context(error::WriteOutputSnafu)?;
        }
        self.writer.write_all(DOCUMENT_SEPARATOR.as_bytes()).context(error::WriteOutputSnafu)?;
        self.writer.write_all(b"\n").context(error::WriteOutputSnafu)
    }

    /// # Errors
    ///
    /// Returns [`Error::WriteOutput`] when the underlying writer fails.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush().context(error::WriteOutputSnafu)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_separator_follows_every_document() {
        let mut output = Vec::new();
        let mut writer = DocumentWriter::new(&mut output);
        writer.write_document(b"kind: A\n").unwrap();
        writer.write_document(b"kind: B\n").unwrap();
        assert_eq!(output, b"kind: A\n---\nkind: B\n---\n");
    }

    #[test]
    fn test_unterminated_document_gets_a_newline() {
        let mut output = Vec::new();
        DocumentWriter::new(&mut output).write_document(b"kind: A").unwrap();
        assert_eq!(output, b"kind: A\n---\n");
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::StorageFull))
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let err = DocumentWriter::new(FullDisk).write_document(b"kind: A\n").unwrap_err();
        assert!(matches!(err, Error::WriteOutput { .. }));
    }
}
