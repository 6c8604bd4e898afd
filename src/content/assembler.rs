use super::types::{Catalog, SourceWork};
use crate::config::Policy;
use crate::constants::{AVERAGE_WORK_CHARS, GENERATOR_NAME};
use crate::size::format_size;
use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;
use tracing::debug;

const BANNER_RULE: &str = "================================================================";
const WORK_RULE: &str = "----------------------------------------";

/// Picks how many works to draw on, assuming ~2000 characters per work.
/// Deterministic: always a prefix of the catalog, at least one work when the
/// catalog is non-empty.
pub fn select_optimal_works(
    catalog: &Catalog,
    target_bytes: u64,
) -> &[SourceWork] {
    let works = catalog.works();
    let wanted = target_bytes.div_ceil(AVERAGE_WORK_CHARS).max(1);
    let count = usize::try_from(wanted)
        .unwrap_or(usize::MAX)
        .min(works.len());
    &works[..count]
}

/// Banner followed by each work that still fits under the target.
pub fn assemble_content(
    target_bytes: u64,
    works: &[SourceWork],
    generated_at: DateTime<Utc>,
    policy: &Policy,
) -> Result<String> {
    policy.check(target_bytes).map_err(|e| anyhow!(e))?;

    let mut doc = banner(target_bytes, works.len(), generated_at);
    let mut included = 0usize;
    for work in works {
        let block = work_block(work);
        if (doc.len() + block.len()) as u64 > target_bytes {
            break;
        }
        doc.push_str(&block);
        included += 1;
    }
    debug!(
        target_bytes,
        planned = works.len(),
        included,
        base_len = doc.len(),
        "assembled base content"
    );
    Ok(doc)
}

pub fn banner(
    target_bytes: u64,
    work_count: usize,
    generated_at: DateTime<Utc>,
) -> String {
    let ts = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut s = String::new();
    // writing into a String cannot fail
    let _ = write!(
        s,
        "{BANNER_RULE}\n{GENERATOR_NAME} sample document\nGenerated: {ts}\nTarget size: {} ({target_bytes} bytes)\nWorks: {work_count}\n{BANNER_RULE}\n\n",
        format_size(target_bytes),
    );
    s
}

fn work_block(work: &SourceWork) -> String {
    format!(
        "{}\nby {}\n{WORK_RULE}\n{}\n\n",
        work.title, work.author, work.content
    )
}
