use super::{EncodeContext, Encoder, filler_block};
use crate::checksum::{ChecksumSink, crc32_parts};
use crate::format::Format;
use crate::io::Sink;
use crate::io::sink::write_repeated;
use anyhow::{Result, anyhow, bail};
use thiserror::Error;
use tracing::debug;

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// Signature, IHDR, IDAT framing and IEND.
pub const OVERHEAD: u64 = 57;
const BYTES_PER_PIXEL: u64 = 3;
const MAX_CHUNK_LEN: u64 = i32::MAX as u64;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("image dimensions must be non-zero (got {width}x{height})")]
pub struct InvalidDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self { width, height }
    }

    /// Largest square whose RGB pixel data fits in `payload` bytes, at least 1x1.
    pub fn square_for(payload: u64) -> Self {
        let pixels = (payload / BYTES_PER_PIXEL).max(1);
        let side = (pixels as f64).sqrt().floor().clamp(1.0, u32::MAX as f64) as u32;
        Self::new(side, side)
    }

    pub fn validate(self) -> Result<Self, InvalidDimensions> {
        if self.width == 0 || self.height == 0 {
            return Err(InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

/// Signature, IHDR, a single IDAT sized to the target and IEND. Every chunk
/// carries a real CRC; the IDAT payload is filler, not a zlib stream.
pub struct PngEncoder;

impl Encoder for PngEncoder {
    fn format(&self) -> Format {
        Format::Png
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let payload = ctx.target_bytes.saturating_sub(OVERHEAD);
        if payload > MAX_CHUNK_LEN {
            bail!("PNG chunk payload of {payload} bytes exceeds the {MAX_CHUNK_LEN} byte chunk limit");
        }
        let dims = ctx
            .dimensions
            .unwrap_or_else(|| ImageDimensions::square_for(payload))
            .validate()
            .map_err(|e| anyhow!(e))?;
        debug!(payload, width = dims.width, height = dims.height, "png layout");

        sink.write_bytes(&SIGNATURE)?;
        write_chunk(sink, b"IHDR", &ihdr(dims))?;
        write_idat(sink, payload)?;
        write_chunk(sink, b"IEND", &[])
    }
}

fn ihdr(dims: ImageDimensions) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[..4].copy_from_slice(&dims.width.to_be_bytes());
    data[4..8].copy_from_slice(&dims.height.to_be_bytes());
    // bit depth 8, truecolor; compression, filter and interlace all 0
    data[8] = 8;
    data[9] = 2;
    data
}

fn write_chunk(
    sink: &mut dyn Sink,
    kind: &[u8; 4],
    data: &[u8],
) -> Result<()> {
    sink.write_bytes(&(data.len() as u32).to_be_bytes())?;
    sink.write_bytes(kind)?;
    sink.write_bytes(data)?;
    sink.write_bytes(&crc32_parts(&[&kind[..], data]).to_be_bytes())
}

/// Streams the filler payload; the CRC is taken while writing.
fn write_idat(
    sink: &mut dyn Sink,
    payload: u64,
) -> Result<()> {
    sink.write_bytes(&(payload as u32).to_be_bytes())?;
    let crc = {
        let mut tee = ChecksumSink::tee(sink);
        tee.write_bytes(b"IDAT")?;
        write_repeated(&mut tee, filler_block(), payload)?;
        tee.sum()
    };
    sink.write_bytes(&crc.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Fixture, encode};
    use super::*;
    use crate::checksum::crc32;

    /// (type, data, stored crc) for every chunk after the signature.
    fn chunks(png: &[u8]) -> Vec<([u8; 4], &[u8], u32)> {
        let mut out = Vec::new();
        let mut pos = SIGNATURE.len();
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
            let data = &png[pos + 8..pos + 8 + len];
            let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
            out.push((kind, data, crc));
            pos += 12 + len;
        }
        out
    }

    #[test]
    fn layout_is_exact_with_valid_crcs() {
        let fx = Fixture::new(10_240);
        let out = encode(Format::Png, &fx.ctx("image.png"));
        assert_eq!(out.len(), 10_240);
        assert_eq!(out[..8], SIGNATURE);

        let chunks = chunks(&out);
        let kinds: Vec<&[u8]> = chunks.iter().map(|(k, _, _)| &k[..]).collect();
        assert_eq!(kinds, vec![&b"IHDR"[..], &b"IDAT"[..], &b"IEND"[..]]);
        for (kind, data, crc) in &chunks {
            assert_eq!(crc32_parts(&[&kind[..], *data]), *crc);
        }
        assert_eq!(chunks[1].1.len() as u64, 10_240 - OVERHEAD);
        assert_eq!(chunks[2].2, crc32(b"IEND"));
    }

    #[test]
    fn default_dimensions_are_square() {
        let fx = Fixture::new(10_240);
        let out = encode(Format::Png, &fx.ctx("image.png"));
        let ihdr = chunks(&out)[0].1.to_vec();
        let width = u32::from_be_bytes(ihdr[..4].try_into().unwrap());
        let height = u32::from_be_bytes(ihdr[4..8].try_into().unwrap());
        assert_eq!((width, height), (58, 58));
        assert_eq!(&ihdr[8..], &[8, 2, 0, 0, 0]);
    }

    #[test]
    fn requested_dimensions_are_written() {
        let fx = Fixture::new(4096);
        let mut ctx = fx.ctx("image.png");
        ctx.dimensions = Some(ImageDimensions::new(640, 480));
        let out = encode(Format::Png, &ctx);
        let ihdr = chunks(&out)[0].1.to_vec();
        assert_eq!(u32::from_be_bytes(ihdr[..4].try_into().unwrap()), 640);
        assert_eq!(u32::from_be_bytes(ihdr[4..8].try_into().unwrap()), 480);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = ImageDimensions::new(0, 10).validate().unwrap_err();
        assert_eq!(err.to_string(), "image dimensions must be non-zero (got 0x10)");

        let fx = Fixture::new(4096);
        let mut ctx = fx.ctx("image.png");
        ctx.dimensions = Some(ImageDimensions::new(5, 0));
        let mut sink = crate::io::MemorySink::new();
        let err = PngEncoder.encode(&ctx, &mut sink).unwrap_err();
        assert!(err.downcast_ref::<InvalidDimensions>().is_some());
    }

    #[test]
    fn tiny_target_is_minimal_png() {
        let fx = Fixture::new(10);
        let out = encode(Format::Png, &fx.ctx("image.png"));
        assert_eq!(out.len() as u64, OVERHEAD);
        assert_eq!(ImageDimensions::square_for(0), ImageDimensions::new(1, 1));
    }
}
