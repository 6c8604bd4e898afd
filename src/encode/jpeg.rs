use super::{EncodeContext, Encoder, filler_block};
use crate::format::Format;
use crate::io::Sink;
use crate::io::sink::write_repeated;
use anyhow::Result;

pub const SOI: [u8; 2] = [0xFF, 0xD8];
pub const EOI: [u8; 2] = [0xFF, 0xD9];
/// APP0 segment: JFIF 1.1, no density units, 1x1 aspect, no thumbnail.
pub const APP0_JFIF: [u8; 18] = [
    0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00,
    0x01, 0x00, 0x00,
];
pub const OVERHEAD: u64 = (SOI.len() + APP0_JFIF.len() + EOI.len()) as u64;

/// SOI, APP0/JFIF, marker-free filler, EOI.
pub struct JpegEncoder;

impl Encoder for JpegEncoder {
    fn format(&self) -> Format {
        Format::Jpeg
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        sink.write_bytes(&SOI)?;
        sink.write_bytes(&APP0_JFIF)?;
        // filler never contains 0xFF, so no byte can be read as a marker
        write_repeated(sink, filler_block(), ctx.target_bytes.saturating_sub(OVERHEAD))?;
        sink.write_bytes(&EOI)
    }
}
