use super::{EncodeContext, Encoder, truncate_chars};
use crate::constants::{GENERATOR_NAME, JSON_CONTENT_CHARS, JSON_PADDING_CAP, SOURCE_MARKER};
use crate::content::padding::exact_filler;
use crate::format::Format;
use crate::io::Sink;
use anyhow::Result;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    generator: &'a str,
    generated_at: String,
    target_size: u64,
    source: &'a str,
}

#[derive(Serialize)]
struct WorkEntry<'a> {
    id: u32,
    title: &'a str,
    author: &'a str,
    characters: usize,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    metadata: Metadata<'a>,
    content: &'a str,
    authors: Vec<&'a str>,
    works: Vec<WorkEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    padding: Option<String>,
}

/// Metadata, capped content excerpt, authors, works index and an optional
/// `padding` string (at most 1 MiB).
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let target = ctx.target_bytes;
        let mut doc = JsonDocument {
            metadata: Metadata {
                generator: GENERATOR_NAME,
                generated_at: ctx.timestamp(),
                target_size: target,
                source: SOURCE_MARKER,
            },
            content: truncate_chars(ctx.content, JSON_CONTENT_CHARS),
            authors: ctx.authors(),
            works: ctx
                .works
                .iter()
                .map(|w| WorkEntry {
                    id: w.id,
                    title: &w.title,
                    author: &w.author,
                    characters: w.content.chars().count(),
                })
                .collect(),
            padding: None,
        };

        let bare = serde_json::to_vec_pretty(&doc)?;
        if bare.len() as u64 >= target {
            return sink.write_bytes(&bare);
        }

        // measure the cost of an empty padding field, then fill the gap
        doc.padding = Some(String::new());
        let slot = serde_json::to_vec_pretty(&doc)?.len() as u64;
        if slot > target {
            return sink.write_bytes(&bare);
        }
        let need = (target - slot).min(JSON_PADDING_CAP);
        doc.padding = Some(exact_filler(need, ctx.chunk_chars()));
        let out = serde_json::to_vec_pretty(&doc)?;
        debug!(target, base = slot, padding = need, "json padding applied");
        sink.write_bytes(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Fixture, encode};
    use super::*;
    use serde_json::Value;

    #[test]
    fn parses_and_hits_target() {
        for target in [8_000u64, 64 * 1024, 512 * 1024] {
            let fx = Fixture::new(target);
            let out = encode(Format::Json, &fx.ctx("d.json"));
            let value: Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(value["metadata"]["targetSize"], target);
            assert_eq!(out.len() as u64, target, "target {target}");
        }
    }

    #[test]
    fn padding_omitted_when_base_exceeds_target() {
        let fx = Fixture::new(100);
        let out = encode(Format::Json, &fx.ctx("d.json"));
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("padding").is_none());
        assert!(out.len() > 100);
    }

    #[test]
    fn padding_is_capped_at_one_mebibyte() {
        let fx = Fixture::new(4 * 1024 * 1024);
        let out = encode(Format::Json, &fx.ctx("d.json"));
        let value: Value = serde_json::from_slice(&out).unwrap();
        let padding = value["padding"].as_str().unwrap();
        assert_eq!(padding.len() as u64, JSON_PADDING_CAP);
        assert!(out.len() < 2 * 1024 * 1024);
    }

    #[test]
    fn authors_are_distinct() {
        let fx = Fixture::new(16_000);
        let out = encode(Format::Json, &fx.ctx("d.json"));
        let value: Value = serde_json::from_slice(&out).unwrap();
        let authors = value["authors"].as_array().unwrap();
        assert_eq!(authors.len(), value["works"].as_array().unwrap().len());
        assert_eq!(authors[0], "Jane Austen");
    }
}
