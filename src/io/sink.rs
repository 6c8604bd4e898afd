use anyhow::Result;
use std::io::Write;

/// Incremental byte destination that keeps a running byte count.
pub trait Sink {
    fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<()>;

    /// Bytes accepted so far.
    fn written(&self) -> u64;

    fn write_text(
        &mut self,
        text: &str,
    ) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }
}

/// Collects everything into one owned buffer.
#[derive(Debug, Default)]
pub struct MemorySink {
    buf: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Sink for MemorySink {
    fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn written(&self) -> u64 {
        self.buf.len() as u64
    }
}

/// Adapts any `io::Write` (file, stdout, socket) into a sink.
pub struct WriterSink<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Flushes and hands back the writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn written(&self) -> u64 {
        self.written
    }
}

/// Size-accounting wrapper: counts from zero regardless of what the inner
/// sink already holds. Can also keep a copy of the first few bytes.
pub struct CountingSink<'a> {
    inner: &'a mut dyn Sink,
    written: u64,
    prefix: Vec<u8>,
    prefix_limit: usize,
}

impl<'a> CountingSink<'a> {
    pub fn new(inner: &'a mut dyn Sink) -> Self {
        Self {
            inner,
            written: 0,
            prefix: Vec::new(),
            prefix_limit: 0,
        }
    }

    /// Retain up to `limit` leading bytes, readable through [`Self::prefix`].
    pub fn with_prefix(
        mut self,
        limit: usize,
    ) -> Self {
        self.prefix_limit = limit;
        self
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }
}

impl Sink for CountingSink<'_> {
    fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<()> {
        self.inner.write_bytes(bytes)?;
        let room = self.prefix_limit - self.prefix.len();
        if room > 0 {
            self.prefix
                .extend_from_slice(&bytes[..room.min(bytes.len())]);
        }
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn written(&self) -> u64 {
        self.written
    }
}

/// Writes `len` bytes by cycling over `block`.
pub fn write_repeated(
    sink: &mut dyn Sink,
    block: &[u8],
    len: u64,
) -> Result<()> {
    if block.is_empty() {
        anyhow::ensure!(len == 0, "cannot fill {len} bytes from an empty block");
        return Ok(());
    }
    let mut remaining = len;
    while remaining > 0 {
        let take = remaining.min(block.len() as u64) as usize;
        sink.write_bytes(&block[..take])?;
        remaining -= take as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_sink_counts_from_zero() {
        let mut mem = MemorySink::new();
        mem.write_text("prefix").unwrap();
        {
            let mut counting = CountingSink::new(&mut mem);
            counting.write_text("abc").unwrap();
            assert_eq!(counting.written(), 3);
        }
        assert_eq!(mem.written(), 9);
        assert_eq!(mem.finish(), b"prefixabc");
    }

    #[test]
    fn counting_sink_keeps_a_bounded_prefix() {
        let mut mem = MemorySink::new();
        let mut counting = CountingSink::new(&mut mem).with_prefix(4);
        counting.write_text("ab").unwrap();
        counting.write_text("cdef").unwrap();
        counting.write_text("gh").unwrap();
        assert_eq!(counting.prefix(), b"abcd");
        assert_eq!(counting.written(), 8);
    }

    #[test]
    fn writer_sink_tracks_and_flushes() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_bytes(&[1, 2, 3]).unwrap();
        sink.write_text("xy").unwrap();
        assert_eq!(sink.written(), 5);
        assert_eq!(sink.finish().unwrap(), vec![1, 2, 3, b'x', b'y']);
    }

    #[test]
    fn write_repeated_cycles_block() {
        let mut sink = MemorySink::new();
        write_repeated(&mut sink, b"abc", 8).unwrap();
        assert_eq!(sink.finish(), b"abcabcab");
        let mut empty = MemorySink::new();
        assert!(write_repeated(&mut empty, b"", 0).is_ok());
        assert!(write_repeated(&mut empty, b"", 1).is_err());
    }
}
