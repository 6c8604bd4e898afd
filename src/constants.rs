// Centralized magic numbers & default values
pub const GENERATOR_NAME: &str = "fixture-forge";
pub const SOURCE_MARKER: &str = "literary-catalog";

pub const DEFAULT_MAX_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_PADDING_CHUNK_CHARS: usize = 100_000;
pub const AVERAGE_WORK_CHARS: u64 = 2000;

pub const PREVIEW_CHARS: usize = 500;

pub const CSV_EXCERPT_CHARS: usize = 100;
pub const CSV_PADDING_FIELD_CHARS: usize = 100;

pub const JSON_CONTENT_CHARS: usize = 10_000;
pub const JSON_PADDING_CAP: u64 = 1024 * 1024;

pub const XML_CONTENT_CHARS: usize = 50_000;
pub const XML_PADDING_CAP: u64 = 500_000;

pub const YAML_CONTENT_CHARS: usize = 30_000;
pub const YAML_PADDING_CAP: u64 = 300_000;

pub const PDF_LINE_CHARS: usize = 90;
pub const PDF_MAX_LINES: usize = 60;
pub const PDF_PADDING_LINE_BYTES: usize = 100;

/// Filler block size for binary payloads.
pub const BINARY_BLOCK_BYTES: usize = 64 * 1024;
