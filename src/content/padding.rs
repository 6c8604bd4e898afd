use crate::io::Sink;
use anyhow::Result;
use std::collections::TryReserveError;
use tracing::warn;

/// Single multi-byte filler character.
pub const FILLER: char = '█';
pub const FILLER_WIDTH: usize = FILLER.len_utf8();
/// ASCII top-up for the 0..FILLER_WIDTH remainder.
pub const FILLER_TAIL: &str = "..";
pub const FALLBACK_PADDING: &str = "[padding generation failed]";

/// Emits `floor(target_bytes / FILLER_WIDTH)` filler characters in runs of at
/// most `chunk_chars`, reusing one run buffer. Returns the bytes emitted.
///
/// If a run cannot be allocated the fallback label is emitted instead and
/// generation stops early; this is not an error.
pub fn fill_with_padding<F>(
    target_bytes: u64,
    chunk_chars: usize,
    mut emit: F,
) -> Result<u64>
where
    F: FnMut(&str) -> Result<()>,
{
    let chunk_chars = chunk_chars.max(1);
    let mut budget = target_bytes / FILLER_WIDTH as u64;
    let mut run = String::new();
    let mut emitted = 0u64;
    while budget > 0 {
        let chars = budget.min(chunk_chars as u64) as usize;
        if let Err(e) = refill(&mut run, chars) {
            warn!(target_bytes, emitted, error = %e, "padding generation failed, using fallback filler");
            emit(FALLBACK_PADDING)?;
            return Ok(emitted + FALLBACK_PADDING.len() as u64);
        }
        emit(&run)?;
        emitted += run.len() as u64;
        budget -= chars as u64;
    }
    Ok(emitted)
}

fn refill(
    run: &mut String,
    chars: usize,
) -> Result<(), TryReserveError> {
    let bytes = chars * FILLER_WIDTH;
    if run.len() == bytes {
        return Ok(());
    }
    run.clear();
    run.try_reserve(bytes)?;
    run.extend(std::iter::repeat_n(FILLER, chars));
    Ok(())
}

/// Like [`fill_with_padding`] but tops up the sub-character remainder with
/// ASCII so exactly `target_bytes` are emitted (unless degraded).
pub fn fill_exact<F>(
    target_bytes: u64,
    chunk_chars: usize,
    mut emit: F,
) -> Result<u64>
where
    F: FnMut(&str) -> Result<()>,
{
    let emitted = fill_with_padding(target_bytes, chunk_chars, &mut emit)?;
    match top_up(target_bytes, emitted) {
        Some(tail) => {
            emit(tail)?;
            Ok(emitted + tail.len() as u64)
        }
        None => Ok(emitted),
    }
}

/// ASCII bytes still owed after `emitted` filler bytes, if any. Nothing is
/// owed after a degraded run.
fn top_up(
    target_bytes: u64,
    emitted: u64,
) -> Option<&'static str> {
    let short = target_bytes.checked_sub(emitted)?;
    (short > 0 && short < FILLER_WIDTH as u64).then(|| &FILLER_TAIL[..short as usize])
}

/// Materializes padding for `target_bytes` as a string.
pub fn generate_padding(
    target_bytes: u64,
    chunk_chars: usize,
) -> String {
    collect(target_bytes, chunk_chars, false)
}

/// Padding of exactly `target_bytes` bytes.
pub fn exact_filler(
    target_bytes: u64,
    chunk_chars: usize,
) -> String {
    collect(target_bytes, chunk_chars, true)
}

fn collect(
    target_bytes: u64,
    chunk_chars: usize,
    exact: bool,
) -> String {
    let mut out = String::new();
    let push = |run: &str| -> Result<()> {
        out.try_reserve(run.len())?;
        out.push_str(run);
        Ok(())
    };
    let res = if exact {
        fill_exact(target_bytes, chunk_chars, push)
    } else {
        fill_with_padding(target_bytes, chunk_chars, push)
    };
    match res {
        Ok(_) => out,
        Err(e) => {
            warn!(target_bytes, error = %e, "padding generation failed, using fallback filler");
            FALLBACK_PADDING.to_string()
        }
    }
}

/// Streams whole filler characters into `sink`.
pub fn write_padding(
    sink: &mut dyn Sink,
    target_bytes: u64,
    chunk_chars: usize,
) -> Result<u64> {
    fill_with_padding(target_bytes, chunk_chars, |run| sink.write_text(run))
}

pub fn write_exact_padding(
    sink: &mut dyn Sink,
    target_bytes: u64,
    chunk_chars: usize,
) -> Result<u64> {
    let emitted = write_padding(sink, target_bytes, chunk_chars)?;
    match top_up(target_bytes, emitted) {
        Some(tail) => {
            sink.write_text(tail)?;
            Ok(emitted + tail.len() as u64)
        }
        None => Ok(emitted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySink;

    #[test]
    fn filler_is_three_bytes() {
        assert_eq!(FILLER_WIDTH, 3);
    }

    #[test]
    fn budget_is_floor_of_target_over_width() {
        assert_eq!(generate_padding(0, 10).len(), 0);
        assert_eq!(generate_padding(2, 10).len(), 0);
        assert_eq!(generate_padding(3, 10).chars().count(), 1);
        assert_eq!(generate_padding(1000, 10).chars().count(), 333);
        assert!(generate_padding(1000, 10).chars().all(|c| c == FILLER));
    }

    #[test]
    fn runs_never_exceed_chunk_cap() {
        let mut runs = Vec::new();
        let emitted = fill_with_padding(3 * 25, 10, |run| {
            runs.push(run.chars().count());
            Ok(())
        })
        .unwrap();
        assert_eq!(emitted, 75);
        assert_eq!(runs, vec![10, 10, 5]);
    }

    #[test]
    fn exact_filler_hits_every_length() {
        for n in 0..40u64 {
            assert_eq!(exact_filler(n, 4).len() as u64, n, "length {n}");
        }
    }

    #[test]
    fn streaming_padding_matches_materialized() {
        let mut sink = MemorySink::new();
        let written = write_exact_padding(&mut sink, 100_001, 1000).unwrap();
        assert_eq!(written, 100_001);
        let bytes = sink.finish();
        assert_eq!(bytes, exact_filler(100_001, 7).into_bytes());
    }

    #[test]
    fn sink_padding_writes_whole_characters_only() {
        let mut sink = MemorySink::new();
        assert_eq!(write_padding(&mut sink, 11, 2).unwrap(), 9);
        assert_eq!(sink.finish(), "\u{2588}".repeat(3).into_bytes());
    }

    #[test]
    fn oversized_run_degrades_to_fallback() {
        let mut seen = Vec::new();
        let emitted = fill_with_padding(usize::MAX as u64, usize::MAX / 4, |run| {
            seen.push(run.to_owned());
            Ok(())
        })
        .unwrap();
        assert_eq!(emitted, 27);
        assert_eq!(seen, vec![FALLBACK_PADDING.to_string()]);
    }

    #[test]
    fn degraded_exact_padding_skips_the_top_up() {
        let mut sink = MemorySink::new();
        let target = usize::MAX as u64 - 1;
        let written = write_exact_padding(&mut sink, target, usize::MAX / 4).unwrap();
        assert_eq!(written, FALLBACK_PADDING.len() as u64);
        assert_eq!(sink.finish(), FALLBACK_PADDING.as_bytes());
        assert_eq!(generate_padding(target, usize::MAX / 4), FALLBACK_PADDING);
    }

    #[test]
    fn emit_errors_propagate() {
        let res = fill_with_padding(30, 2, |_| anyhow::bail!("sink closed"));
        assert!(res.is_err());
    }
}
