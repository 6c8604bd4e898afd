#![allow(dead_code)]
use chrono::{DateTime, TimeZone, Utc};
use fixture_forge::Generator;

pub fn pinned_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Built-in catalog, default policy, fixed banner timestamp.
pub fn pinned_generator() -> Generator {
    Generator::builtin().with_timestamp(pinned_time())
}

pub fn le_u16(
    b: &[u8],
    at: usize,
) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

pub fn le_u32(
    b: &[u8],
    at: usize,
) -> u32 {
    u32::from_le_bytes(b[at..at + 4].try_into().unwrap())
}

pub fn be_u32(
    b: &[u8],
    at: usize,
) -> u32 {
    u32::from_be_bytes(b[at..at + 4].try_into().unwrap())
}
