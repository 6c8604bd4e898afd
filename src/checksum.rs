use crate::io::Sink;
use anyhow::Result;
use flate2::Crc;

/// CRC-32 (IEEE 802.3, as used by PNG and ZIP) of `bytes`.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(bytes);
    crc.sum()
}

/// CRC-32 over several slices as if they were one contiguous buffer.
pub fn crc32_parts(parts: &[&[u8]]) -> u32 {
    let mut crc = Crc::new();
    for part in parts {
        crc.update(part);
    }
    crc.sum()
}

/// Sink that checksums everything passing through it, optionally forwarding
/// the bytes to an inner sink.
pub struct ChecksumSink<'a> {
    inner: Option<&'a mut dyn Sink>,
    crc: Crc,
    written: u64,
}

impl<'a> ChecksumSink<'a> {
    /// Checksums and drops the bytes.
    pub fn discard() -> Self {
        Self {
            inner: None,
            crc: Crc::new(),
            written: 0,
        }
    }

    pub fn tee(inner: &'a mut dyn Sink) -> Self {
        Self {
            inner: Some(inner),
            crc: Crc::new(),
            written: 0,
        }
    }

    pub fn sum(&self) -> u32 {
        self.crc.sum()
    }
}

impl Sink for ChecksumSink<'_> {
    fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<()> {
        if let Some(inner) = self.inner.as_mut() {
            inner.write_bytes(bytes)?;
        }
        self.crc.update(bytes);
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn written(&self) -> u64 {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySink;

    #[test]
    fn known_vectors() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn iend_chunk_crc() {
        // every PNG ends with IEND whose CRC is fixed
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn parts_match_contiguous() {
        assert_eq!(crc32_parts(&[b"1234", b"", b"56789"]), crc32(b"123456789"));
    }

    #[test]
    fn checksum_sink_tees_and_sums() {
        let mut mem = MemorySink::new();
        let sum = {
            let mut tee = ChecksumSink::tee(&mut mem);
            tee.write_text("12345").unwrap();
            tee.write_text("6789").unwrap();
            assert_eq!(tee.written(), 9);
            tee.sum()
        };
        assert_eq!(sum, 0xCBF4_3926);
        assert_eq!(mem.finish(), b"123456789");

        let mut discard = ChecksumSink::discard();
        discard.write_text("123456789").unwrap();
        assert_eq!(discard.sum(), 0xCBF4_3926);
    }
}
