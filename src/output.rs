use crate::format::Format;

/// First `max_chars` characters of `bytes` read as UTF-8; invalid sequences
/// become U+FFFD.
pub fn preview_text(
    bytes: &[u8],
    max_chars: usize,
) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(max_chars)
        .collect()
}

/// `1 - |actual - target| / target`, clamped to `[0, 1]`. A zero target is
/// only accurate when nothing was produced.
pub fn accuracy(
    target: u64,
    actual: u64,
) -> f64 {
    if target == 0 {
        return if actual == 0 { 1.0 } else { 0.0 };
    }
    let diff = target.abs_diff(actual) as f64;
    (1.0 - diff / target as f64).clamp(0.0, 1.0)
}

/// One-line CLI summary, e.g.
/// `OK report.csv: 1048576 bytes (target 1048576, accuracy 100.00%, text/csv)`.
pub fn format_summary(
    name: &str,
    format: Format,
    target: u64,
    actual: u64,
) -> String {
    format!(
        "OK {name}: {actual} bytes (target {target}, accuracy {:.2}%, {})",
        accuracy(target, actual) * 100.0,
        format.mime_type()
    )
}
