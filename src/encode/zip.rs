use super::{EncodeContext, Encoder, truncate_bytes};
use crate::checksum::ChecksumSink;
use crate::content::padding::write_exact_padding;
use crate::format::Format;
use crate::io::Sink;
use anyhow::{Result, bail, ensure};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::path::Path;
use tracing::debug;

pub const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
pub const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;

const LOCAL_HEADER_LEN: u64 = 30;
const CENTRAL_HEADER_LEN: u64 = 46;
const END_OF_CENTRAL_DIR_LEN: u64 = 22;
const VERSION: u16 = 10;
const METHOD_STORED: u16 = 0;
const FLAG_UTF8_NAME: u16 = 0x0800;
const INTERNAL_ATTR_TEXT: u16 = 1;
const FALLBACK_ENTRY_NAME: &str = "content.txt";

/// Fixed archive bytes around an entry whose name is `name_len` bytes long.
pub fn overhead(name_len: u64) -> u64 {
    LOCAL_HEADER_LEN + CENTRAL_HEADER_LEN + END_OF_CENTRAL_DIR_LEN + 2 * name_len
}

/// `report.zip` stores `report.txt`.
pub fn entry_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|stem| format!("{stem}.txt"))
        .unwrap_or_else(|| FALLBACK_ENTRY_NAME.to_string())
}

/// Single stored (uncompressed) text entry with local header, central
/// directory and end record all populated, including the CRC-32.
pub struct ZipEncoder;

impl Encoder for ZipEncoder {
    fn format(&self) -> Format {
        Format::Zip
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let name = entry_name(ctx.file_name);
        let Ok(name_len) = u16::try_from(name.len()) else {
            bail!("ZIP entry name is {} bytes, more than a header can hold", name.len());
        };
        let data_len = ctx.target_bytes.saturating_sub(overhead(name_len.into()));

        // first pass: checksum and measure the entry without keeping it
        let (crc, size) = {
            let mut measure = ChecksumSink::discard();
            write_entry_data(&mut measure, ctx, data_len)?;
            (measure.sum(), measure.written())
        };
        let Ok(size32) = u32::try_from(size) else {
            bail!("ZIP entry of {size} bytes needs ZIP64, which is not supported");
        };
        let cd_offset = LOCAL_HEADER_LEN + u64::from(name_len) + size;
        let Ok(cd_offset32) = u32::try_from(cd_offset) else {
            bail!("ZIP central directory offset {cd_offset} needs ZIP64, which is not supported");
        };
        debug!(entry = %name, size, crc, "zip entry measured");

        let entry = Entry {
            name: &name,
            flags: if name.is_ascii() { 0 } else { FLAG_UTF8_NAME },
            dos: DosDateTime::from(ctx.generated_at),
            crc,
            size: size32,
        };

        sink.write_bytes(&entry.local_header())?;
        {
            let mut tee = ChecksumSink::tee(sink);
            write_entry_data(&mut tee, ctx, data_len)?;
            ensure!(
                tee.sum() == crc && tee.written() == size,
                "ZIP entry changed between passes (crc {:08x} vs {crc:08x})",
                tee.sum()
            );
        }
        sink.write_bytes(&entry.central_header())?;
        sink.write_bytes(&end_of_central_dir(
            CENTRAL_HEADER_LEN as u32 + u32::from(name_len),
            cd_offset32,
        ))
    }
}

/// Assembled text cut to `len` bytes, or topped up with padding to `len`.
fn write_entry_data(
    sink: &mut dyn Sink,
    ctx: &EncodeContext<'_>,
    len: u64,
) -> Result<()> {
    let head = truncate_bytes(ctx.content, len);
    sink.write_text(head)?;
    write_exact_padding(sink, len - head.len() as u64, ctx.chunk_chars())?;
    Ok(())
}

/// MS-DOS packed time and date; years outside 1980..=2107 are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl From<DateTime<Utc>> for DosDateTime {
    fn from(ts: DateTime<Utc>) -> Self {
        let year = ts.year().clamp(1980, 2107) as u16;
        Self {
            time: ((ts.hour() as u16) << 11) | ((ts.minute() as u16) << 5) | (ts.second() as u16 / 2),
            date: ((year - 1980) << 9) | ((ts.month() as u16) << 5) | ts.day() as u16,
        }
    }
}

struct Entry<'a> {
    name: &'a str,
    flags: u16,
    dos: DosDateTime,
    crc: u32,
    size: u32,
}

impl Entry<'_> {
    /// Fields shared by both headers, from "version needed" to "extra length".
    fn common(
        &self,
        out: &mut Vec<u8>,
    ) {
        put_u16(out, VERSION);
        put_u16(out, self.flags);
        put_u16(out, METHOD_STORED);
        put_u16(out, self.dos.time);
        put_u16(out, self.dos.date);
        put_u32(out, self.crc);
        put_u32(out, self.size); // compressed
        put_u32(out, self.size); // uncompressed
        put_u16(out, self.name.len() as u16);
        put_u16(out, 0);
    }

    fn local_header(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(LOCAL_HEADER_LEN as usize + self.name.len());
        put_u32(&mut out, LOCAL_HEADER_SIG);
        self.common(&mut out);
        out.extend_from_slice(self.name.as_bytes());
        out
    }

    fn central_header(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CENTRAL_HEADER_LEN as usize + self.name.len());
        put_u32(&mut out, CENTRAL_HEADER_SIG);
        put_u16(&mut out, VERSION); // made by
        self.common(&mut out);
        put_u16(&mut out, 0); // comment length
        put_u16(&mut out, 0); // disk number start
        put_u16(&mut out, INTERNAL_ATTR_TEXT);
        put_u32(&mut out, 0); // external attributes
        put_u32(&mut out, 0); // local header offset
        out.extend_from_slice(self.name.as_bytes());
        out
    }
}

fn end_of_central_dir(
    cd_size: u32,
    cd_offset: u32,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(END_OF_CENTRAL_DIR_LEN as usize);
    put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
    put_u16(&mut out, 0); // this disk
    put_u16(&mut out, 0); // disk with central directory
    put_u16(&mut out, 1); // entries on this disk
    put_u16(&mut out, 1); // entries total
    put_u32(&mut out, cd_size);
    put_u32(&mut out, cd_offset);
    put_u16(&mut out, 0); // comment length
    out
}

fn put_u16(
    out: &mut Vec<u8>,
    v: u16,
) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(
    out: &mut Vec<u8>,
    v: u32,
) {
    out.extend_from_slice(&v.to_le_bytes());
}
