use super::{EncodeContext, Encoder, truncate_chars};
use crate::constants::{GENERATOR_NAME, SOURCE_MARKER, YAML_CONTENT_CHARS, YAML_PADDING_CAP};
use crate::content::padding::exact_filler;
use crate::format::Format;
use crate::io::Sink;
use anyhow::Result;
use std::fmt::Write;

const PADDING_PREFIX: &str = "# padding: ";

/// Block-scalar YAML document with a trailing padding comment line.
pub struct YamlEncoder;

impl Encoder for YamlEncoder {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let doc = render(ctx)?;
        sink.write_text(&doc)?;
        let slot = (doc.len() + PADDING_PREFIX.len() + 1) as u64;
        if slot > ctx.target_bytes {
            return Ok(());
        }
        let need = (ctx.target_bytes - slot).min(YAML_PADDING_CAP);
        sink.write_text(PADDING_PREFIX)?;
        sink.write_text(&exact_filler(need, ctx.chunk_chars()))?;
        sink.write_text("\n")
    }
}

/// YAML double-quoted scalars accept JSON string syntax.
fn quoted(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

fn render(ctx: &EncodeContext<'_>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "# {GENERATOR_NAME} sample document")?;
    writeln!(out, "generator: {}", quoted(GENERATOR_NAME)?)?;
    writeln!(out, "generated_at: {}", quoted(&ctx.timestamp())?)?;
    writeln!(out, "target_size: {}", ctx.target_bytes)?;
    writeln!(out, "source: {}", quoted(SOURCE_MARKER)?)?;

    let authors = ctx.authors();
    if authors.is_empty() {
        writeln!(out, "authors: []")?;
    } else {
        writeln!(out, "authors:")?;
        for author in authors {
            writeln!(out, "  - {}", quoted(author)?)?;
        }
    }

    if ctx.works.is_empty() {
        writeln!(out, "works: []")?;
    } else {
        writeln!(out, "works:")?;
        for work in ctx.works {
            writeln!(out, "  - id: {}", work.id)?;
            writeln!(out, "    title: {}", quoted(&work.title)?)?;
            writeln!(out, "    author: {}", quoted(&work.author)?)?;
        }
    }

    // explicit indentation indicator: content lines may start with spaces
    writeln!(out, "content: |2")?;
    for line in truncate_chars(ctx.content, YAML_CONTENT_CHARS).lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(out)
}
