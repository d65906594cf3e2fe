//! Page output.

use std::io::{self, Write};

use crate::packet::Page;

/// Destination for finished pages.
pub trait PageSink {
    /// Appends the page header followed by its body.
    fn write_page(&mut self, page: &Page) -> io::Result<()>;

    /// Flushes anything buffered. Called once after the last page.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: PageSink + ?Sized> PageSink for &mut S {
    fn write_page(&mut self, page: &Page) -> io::Result<()> {
        (**self).write_page(page)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Accumulates pages in memory.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    bytes: Vec<u8>,
    pages: usize,
}

impl VecSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pages written so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Consumes the sink and returns the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl PageSink for VecSink {
    fn write_page(&mut self, page: &Page) -> io::Result<()> {
        self.bytes.extend_from_slice(&page.header);
        self.bytes.extend_from_slice(&page.body);
        self.pages += 1;
        Ok(())
    }
}

/// Streams pages to any writer.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PageSink for WriterSink<W> {
    fn write_page(&mut self, page: &Page) -> io::Result<()> {
        self.writer.write_all(&page.header)?;
        self.writer.write_all(&page.body)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page() -> Page {
        Page {
            header: b"OggS-header".to_vec(),
            body: b"-body".to_vec(),
        }
    }

    #[test]
    fn test_vec_sink_appends_header_then_body() {
        let mut sink = VecSink::new();
        sink.write_page(&page()).unwrap();
        sink.write_page(&page()).unwrap();

        assert_eq!(sink.page_count(), 2);
        assert_eq!(sink.as_bytes(), b"OggS-header-bodyOggS-header-body");
    }

    #[test]
    fn test_writer_sink_matches_page_bytes() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_page(&page()).unwrap();
        sink.finish().unwrap();

        assert_eq!(sink.into_inner(), page().to_bytes());
    }

    #[test]
    fn test_mut_ref_sink_forwards() {
        fn write_one<S: PageSink>(mut sink: S) {
            sink.write_page(&page()).unwrap();
        }

        let mut inner = VecSink::new();
        write_one(&mut inner);
        assert_eq!(inner.page_count(), 1);
    }
}
