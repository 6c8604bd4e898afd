use super::{EncodeContext, Encoder, truncate_bytes};
use crate::content::padding::write_exact_padding;
use crate::format::Format;
use crate::io::Sink;
use anyhow::Result;

pub const PADDING_LABEL: &str = "\n\n--- padding ---\n";

/// Raw assembled content plus a padding section; byte-exact.
pub struct PlainTextEncoder;

impl Encoder for PlainTextEncoder {
    fn format(&self) -> Format {
        Format::PlainText
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let target = ctx.target_bytes;
        if ctx.content.len() as u64 >= target {
            let head = truncate_bytes(ctx.content, target);
            sink.write_text(head)?;
            // a split multi-byte char leaves at most 3 bytes
            let short = target - head.len() as u64;
            sink.write_text(&" ".repeat(short as usize))?;
            return Ok(());
        }

        sink.write_text(ctx.content)?;
        let mut remaining = target - ctx.content.len() as u64;
        if remaining >= PADDING_LABEL.len() as u64 {
            sink.write_text(PADDING_LABEL)?;
            remaining -= PADDING_LABEL.len() as u64;
        }
        write_exact_padding(sink, remaining, ctx.chunk_chars())?;
        Ok(())
    }
}
