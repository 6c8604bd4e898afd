use super::{EncodeContext, Encoder};
use crate::constants::{PDF_LINE_CHARS, PDF_MAX_LINES, PDF_PADDING_LINE_BYTES};
use crate::format::Format;
use crate::io::Sink;
use crate::io::sink::write_repeated;
use anyhow::Result;
use std::fmt::Write;
use tracing::debug;

pub const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";
pub const TRAILER_END: &str = "%%EOF";
const OBJECT_COUNT: usize = 5;
/// Lines per padding block written at once.
const PADDING_BLOCK_LINES: usize = 1000;

/// One-page PDF: catalog, pages, page, content stream and font, with `%`
/// comment padding between the body and the xref table.
pub struct PdfEncoder;

impl Encoder for PdfEncoder {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let (head, offsets) = body(ctx.content)?;
        let head_len = head.len() as u64;
        let (padding, widened) = solve_padding(head_len, &offsets, ctx.target_bytes)?;
        debug!(target = ctx.target_bytes, head_len, padding, widened, "pdf layout solved");

        sink.write_bytes(&head)?;
        write_comment_padding(sink, padding)?;
        sink.write_text(&tail(&offsets, head_len + padding, widened)?)
    }
}

/// Header plus objects 1..=5; returns the bytes and each object's offset.
fn body(text: &str) -> Result<(Vec<u8>, Vec<u64>)> {
    let stream = content_stream(text)?;
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        // Length is the exact byte length of the escaped stream
        format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    let mut out = HEADER.to_vec();
    let mut offsets = Vec::with_capacity(OBJECT_COUNT);
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len() as u64);
        out.extend_from_slice(format!("{} 0 obj\n{obj}\nendobj\n", i + 1).as_bytes());
    }
    Ok((out, offsets))
}

fn content_stream(text: &str) -> Result<String> {
    let mut s = String::from("BT\n/F1 10 Tf\n12 TL\n50 750 Td\n");
    for line in wrap_lines(text).iter().take(PDF_MAX_LINES) {
        writeln!(s, "({}) Tj T*", escape_pdf_text(line))?;
    }
    s.push_str("ET");
    Ok(s)
}

fn wrap_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for piece in chars.chunks(PDF_LINE_CHARS) {
            lines.push(piece.iter().collect());
        }
    }
    lines
}

/// Escapes a literal string; characters outside printable ASCII become `?`.
pub fn escape_pdf_text(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Xref table and trailer. `widened` adds one space inside the trailer
/// dictionary, which is still the same dictionary.
fn tail(
    offsets: &[u64],
    xref_offset: u64,
    widened: bool,
) -> Result<String> {
    let mut s = String::new();
    writeln!(s, "xref\n0 {}", offsets.len() + 1)?;
    s.push_str("0000000000 65535 f \n");
    for off in offsets {
        writeln!(s, "{off:010} 00000 n ")?;
    }
    write!(
        s,
        "trailer\n<< /Size {} /Root 1 0 R {}>>\nstartxref\n{xref_offset}\n{TRAILER_END}",
        offsets.len() + 1,
        if widened { " " } else { "" }
    )?;
    Ok(s)
}

/// Padding bytes such that head + padding + tail lands on `target`, and
/// whether the trailer needs its extra space. The xref offset printed in the
/// tail depends on the padding, so iterate until the digit count settles.
///
/// Where the offset gains a digit, one more padding byte grows the file by
/// two; no padding is exact there, so the widened trailer takes the odd byte.
fn solve_padding(
    head_len: u64,
    offsets: &[u64],
    target: u64,
) -> Result<(u64, bool)> {
    let total = |padding: u64, widened: bool| -> Result<u64> {
        Ok(head_len + padding + tail(offsets, head_len + padding, widened)?.len() as u64)
    };
    let fixed = total(0, false)?;
    if target <= fixed {
        return Ok((0, false));
    }
    let mut padding = target - fixed;
    for _ in 0..4 {
        let t = total(padding, false)?;
        if t == target {
            return Ok((padding, false));
        }
        if t > target {
            padding = padding.saturating_sub(t - target);
        } else {
            padding += target - t;
        }
    }
    // settled one byte either side of the target
    for candidate in [padding.saturating_sub(1), padding] {
        if total(candidate, true)? == target {
            return Ok((candidate, true));
        }
    }
    Ok((padding, false))
}

/// `%....\n` comment lines; a lone trailing byte becomes a blank line.
fn write_comment_padding(
    sink: &mut dyn Sink,
    len: u64,
) -> Result<()> {
    let line_len = PDF_PADDING_LINE_BYTES as u64;
    let mut line = String::with_capacity(PDF_PADDING_LINE_BYTES);
    line.push('%');
    line.push_str(&".".repeat(PDF_PADDING_LINE_BYTES - 2));
    line.push('\n');
    let block = line.repeat(PADDING_BLOCK_LINES);

    let full = len / line_len * line_len;
    write_repeated(sink, block.as_bytes(), full)?;
    match len - full {
        0 => {}
        1 => sink.write_text("\n")?,
        rest => {
            let mut last = String::from("%");
            last.push_str(&".".repeat(rest as usize - 2));
            last.push('\n');
            sink.write_text(&last)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Fixture, encode};
    use super::*;

    fn find(
        hay: &[u8],
        needle: &[u8],
    ) -> Option<usize> {
        hay.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape_pdf_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_pdf_text("caf\u{e9}"), "caf?");
    }

    #[test]
    fn framing_and_exact_size() {
        for target in [16_384u64, 100_000, 1024 * 1024] {
            let fx = Fixture::new(target);
            let out = encode(Format::Pdf, &fx.ctx("doc.pdf"));
            assert!(out.starts_with(b"%PDF-1.4"));
            assert!(out.ends_with(b"%%EOF"));
            assert_eq!(out.len() as u64, target, "target {target}");
        }
    }

    #[test]
    fn stream_length_matches_escaped_stream() {
        let fx = Fixture::new(20_000);
        let out = encode(Format::Pdf, &fx.ctx("doc.pdf"));
        let len_at = find(&out, b"/Length ").unwrap() + b"/Length ".len();
        let len_end = len_at + out[len_at..].iter().position(|b| *b == b' ').unwrap();
        let declared: usize = std::str::from_utf8(&out[len_at..len_end])
            .unwrap()
            .parse()
            .unwrap();
        let start = find(&out, b"stream\n").unwrap() + b"stream\n".len();
        let end = find(&out, b"\nendstream").unwrap();
        assert_eq!(end - start, declared);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let fx = Fixture::new(50_000);
        let out = encode(Format::Pdf, &fx.ctx("doc.pdf"));
        let startxref = find(&out, b"startxref\n").unwrap() + b"startxref\n".len();
        let xref_offset: usize = std::str::from_utf8(&out[startxref..out.len() - 6])
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(out[xref_offset..].starts_with(b"xref\n0 6\n"));
        let entries = &out[xref_offset + b"xref\n0 6\n".len()..];
        for obj in 1..=5usize {
            let entry = &entries[obj * 20..obj * 20 + 10];
            let off: usize = std::str::from_utf8(entry).unwrap().parse().unwrap();
            assert!(out[off..].starts_with(format!("{obj} 0 obj").as_bytes()));
        }
    }

    #[test]
    fn exact_where_xref_offset_gains_a_digit() {
        // the xref offset sits a few hundred bytes below the target
        for range in [9_700u64..10_300, 99_700..100_300] {
            for target in range {
                let fx = Fixture::new(target);
                let out = encode(Format::Pdf, &fx.ctx("doc.pdf"));
                assert_eq!(out.len() as u64, target, "target {target}");
                assert!(out.ends_with(b"%%EOF"));
            }
        }
    }

    #[test]
    fn widened_trailer_only_at_the_digit_boundary() {
        let (head, offsets) = body("text").unwrap();
        let head_len = head.len() as u64;
        let plain = tail(&offsets, 9_999, false).unwrap();
        let wide = tail(&offsets, 9_999, true).unwrap();
        assert_eq!(wide.len(), plain.len() + 1);
        assert!(wide.contains("<< /Size 6 /Root 1 0 R  >>"));

        // offset 9_999 -> 10_000 adds a digit, so this target is unreachable
        // without the extra trailer byte
        let pad = 9_999 - head_len;
        let target = 10_000 + tail(&offsets, 10_000, false).unwrap().len() as u64 - 1;
        assert_eq!(solve_padding(head_len, &offsets, target).unwrap(), (pad, true));
        let target = 20_000;
        let (_, widened) = solve_padding(head_len, &offsets, target).unwrap();
        assert!(!widened);
    }

    #[test]
    fn tiny_target_yields_minimal_document() {
        let fx = Fixture::new(10);
        let out = encode(Format::Pdf, &fx.ctx("doc.pdf"));
        assert!(out.len() > 10);
        assert!(out.ends_with(b"%%EOF"));
        assert!(!out.windows(3).any(|w| w == b"\n%."));
    }
}
