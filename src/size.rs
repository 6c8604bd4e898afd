use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Binary size unit. `KB` is always 1024 bytes, never 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    Byte,
    Kibibyte,
    Mebibyte,
    Gibibyte,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown size unit {0:?} (expected B, KB, MB or GB)")]
pub struct UnknownUnit(pub String);

impl SizeUnit {
    pub fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Byte => 1,
            SizeUnit::Kibibyte => 1024,
            SizeUnit::Mebibyte => 1024 * 1024,
            SizeUnit::Gibibyte => 1024 * 1024 * 1024,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            SizeUnit::Byte => "B",
            SizeUnit::Kibibyte => "KB",
            SizeUnit::Mebibyte => "MB",
            SizeUnit::Gibibyte => "GB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(SizeUnit::Byte),
            "KB" | "KIB" | "K" => Ok(SizeUnit::Kibibyte),
            "MB" | "MIB" | "M" => Ok(SizeUnit::Mebibyte),
            "GB" | "GIB" | "G" => Ok(SizeUnit::Gibibyte),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A magnitude paired with a unit, e.g. `1.5 MB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    pub magnitude: f64,
    pub unit: SizeUnit,
}

impl SizeSpec {
    pub fn new(
        magnitude: f64,
        unit: SizeUnit,
    ) -> Self {
        Self { magnitude, unit }
    }

    /// Lenient parse: anything that does not start with a number becomes 0.
    pub fn parse(
        magnitude: &str,
        unit: SizeUnit,
    ) -> Self {
        Self::new(parse_magnitude(magnitude), unit)
    }

    pub fn bytes(bytes: u64) -> Self {
        Self::new(bytes as f64, SizeUnit::Byte)
    }

    /// `floor(magnitude * multiplier)`, never negative, saturating at `u64::MAX`.
    pub fn resolve(&self) -> u64 {
        let raw = self.magnitude * self.unit.multiplier() as f64;
        if raw.is_nan() || raw <= 0.0 {
            return 0;
        }
        if raw >= u64::MAX as f64 {
            return u64::MAX;
        }
        raw.floor() as u64
    }
}

/// Reads the longest leading decimal number, `parseFloat` style.
fn parse_magnitude(input: &str) -> f64 {
    let s = input.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// Human-readable binary size, e.g. `10.00 KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [SizeUnit; 4] = [
        SizeUnit::Byte,
        SizeUnit::Kibibyte,
        SizeUnit::Mebibyte,
        SizeUnit::Gibibyte,
    ];
    let unit = UNITS
        .iter()
        .rev()
        .find(|u| bytes >= u.multiplier())
        .copied()
        .unwrap_or(SizeUnit::Byte);
    if unit == SizeUnit::Byte {
        return format!("{bytes} B");
    }
    let value = bytes as f64 / unit.multiplier() as f64;
    format!("{value:.2} {unit}")
}
