// Per-format encoders behind one trait; dispatch is an exhaustive match.
pub mod csv;
pub mod jpeg;
pub mod json;
pub mod pdf;
pub mod png;
pub mod text;
pub mod xml;
pub mod yaml;
pub mod zip;

use crate::config::Policy;
use crate::constants::BINARY_BLOCK_BYTES;
use crate::content::SourceWork;
use crate::format::Format;
use crate::io::Sink;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;

pub use png::ImageDimensions;

/// Everything an encoder needs for one request.
pub struct EncodeContext<'a> {
    pub file_name: &'a str,
    pub target_bytes: u64,
    /// The content plan, in catalog order.
    pub works: &'a [SourceWork],
    /// Assembled base document (banner + works).
    pub content: &'a str,
    pub generated_at: DateTime<Utc>,
    pub policy: &'a Policy,
    pub dimensions: Option<ImageDimensions>,
}

impl EncodeContext<'_> {
    pub fn timestamp(&self) -> String {
        self.generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn chunk_chars(&self) -> usize {
        self.policy.chunk_chars()
    }

    /// Distinct authors in plan order.
    pub fn authors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for work in self.works {
            if !out.contains(&work.author.as_str()) {
                out.push(&work.author);
            }
        }
        out
    }
}

pub trait Encoder {
    fn format(&self) -> Format;

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()>;
}

pub fn encoder_for(format: Format) -> &'static dyn Encoder {
    match format {
        Format::PlainText => &text::PlainTextEncoder,
        Format::Json => &json::JsonEncoder,
        Format::Csv => &csv::CsvEncoder,
        Format::Xml => &xml::XmlEncoder,
        Format::Yaml => &yaml::YamlEncoder,
        Format::Pdf => &pdf::PdfEncoder,
        Format::Png => &png::PngEncoder,
        Format::Jpeg => &jpeg::JpegEncoder,
        Format::Zip => &zip::ZipEncoder,
    }
}

/// At most `max_chars` characters of `s`.
pub fn truncate_chars(
    s: &str,
    max_chars: usize,
) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Longest prefix of `s` no longer than `max_bytes` that ends on a char boundary.
pub fn truncate_bytes(
    s: &str,
    max_bytes: u64,
) -> &str {
    if s.len() as u64 <= max_bytes {
        return s;
    }
    let mut end = max_bytes as usize;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Deterministic binary filler that never contains `0xFF`.
pub(crate) fn filler_block() -> &'static [u8] {
    static BLOCK: Lazy<Vec<u8>> = Lazy::new(|| {
        (0..BINARY_BLOCK_BYTES)
            .map(|i| ((i * 31) % 251) as u8)
            .collect()
    });
    &BLOCK
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_has_its_own_encoder() {
        for format in Format::ALL {
            assert_eq!(encoder_for(format).format(), format);
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_bytes("héllo", 2), "h");
        assert_eq!(truncate_bytes("héllo", 3), "hé");
        assert_eq!(truncate_bytes("abc", 99), "abc");
    }

    #[test]
    fn filler_block_has_no_marker_bytes() {
        assert_eq!(filler_block().len(), BINARY_BLOCK_BYTES);
        assert!(!filler_block().contains(&0xFF));
    }
}
