use super::{EncodeContext, Encoder};
use crate::constants::{CSV_EXCERPT_CHARS, CSV_PADDING_FIELD_CHARS};
use crate::content::SourceWork;
use crate::content::padding::{FILLER, exact_filler};
use crate::format::Format;
use crate::io::Sink;
use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::debug;

pub const HEADER: &str = "id,title,author,excerpt\n";

static FULL_FILLER: Lazy<String> =
    Lazy::new(|| std::iter::repeat_n(FILLER, CSV_PADDING_FIELD_CHARS).collect());

/// Header, one row per planned work, then padding rows whose filler field is
/// never wider than `CSV_PADDING_FIELD_CHARS` characters. The last one or two
/// rows are shorter so the file lands on the target.
pub struct CsvEncoder;

impl Encoder for CsvEncoder {
    fn format(&self) -> Format {
        Format::Csv
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let target = ctx.target_bytes;
        sink.write_text(HEADER)?;
        let mut written = HEADER.len() as u64;

        let mut work_rows = 0usize;
        for work in ctx.works {
            if written >= target {
                break;
            }
            let row = work_row(work);
            sink.write_text(&row)?;
            written += row.len() as u64;
            work_rows += 1;
        }

        let mut id = ctx.works.iter().map(|w| w.id).max().unwrap_or(0) as u64 + 1;
        let mut padding_rows = 0usize;
        while written < target {
            let remaining = target - written;
            let overhead = padding_row(id, "").len() as u64;
            if remaining <= overhead {
                break;
            }
            let room = remaining - overhead;
            let next_overhead = padding_row(id + 1, "").len() as u64;
            let full = FULL_FILLER.len() as u64;
            let filler = if room <= full {
                room
            } else if room - full <= next_overhead {
                // leave the next row a one-byte filler instead of a remainder it cannot hold
                room - next_overhead - 1
            } else {
                full
            };
            let row = if filler == full {
                padding_row(id, &FULL_FILLER)
            } else {
                padding_row(id, &exact_filler(filler, ctx.chunk_chars()))
            };
            sink.write_text(&row)?;
            written += row.len() as u64;
            padding_rows += 1;
            id += 1;
        }
        debug!(target, written, work_rows, padding_rows, "csv rows written");
        Ok(())
    }
}

pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// First `CSV_EXCERPT_CHARS` characters with whitespace runs collapsed.
pub fn excerpt(content: &str) -> String {
    let mut out = String::new();
    let mut count = 0usize;
    for word in content.split_whitespace() {
        for c in (!out.is_empty()).then_some(' ').into_iter().chain(word.chars()) {
            if count == CSV_EXCERPT_CHARS {
                return out;
            }
            out.push(c);
            count += 1;
        }
    }
    out
}

pub fn work_row(work: &SourceWork) -> String {
    format!(
        "{},{},{},{}\n",
        work.id,
        quote(&work.title),
        quote(&work.author),
        quote(&excerpt(&work.content))
    )
}

fn padding_row(
    id: u64,
    filler: &str,
) -> String {
    format!("{id},padding,filler,\"{filler}\"\n")
}
