use crate::cli::Cli;
use crate::constants::{DEFAULT_MAX_BYTES, DEFAULT_PADDING_CHUNK_CHARS};
use crate::size::{SizeSpec, SizeUnit, format_size};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Raised before any content is assembled when the target is over the cap.
#[derive(Debug, PartialEq, Eq)]
pub struct SizeLimitExceeded {
    pub requested: u64,
    pub limit: u64,
}

impl std::fmt::Display for SizeLimitExceeded {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "requested size {} ({} bytes) exceeds the maximum of {} ({} bytes)",
            format_size(self.requested),
            self.requested,
            format_size(self.limit),
            self.limit
        )
    }
}

impl std::error::Error for SizeLimitExceeded {}

/// Resource policy applied to every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub max_bytes: u64,
    pub padding_chunk_chars: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            padding_chunk_chars: DEFAULT_PADDING_CHUNK_CHARS,
        }
    }
}

impl Policy {
    pub fn with_max_bytes(
        mut self,
        max_bytes: u64,
    ) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_padding_chunk_chars(
        mut self,
        chars: usize,
    ) -> Self {
        self.padding_chunk_chars = chars.max(1);
        self
    }

    /// Pre-flight check; must run before any assembly work.
    pub fn check(
        &self,
        requested: u64,
    ) -> Result<(), SizeLimitExceeded> {
        if requested > self.max_bytes {
            return Err(SizeLimitExceeded {
                requested,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    pub(crate) fn chunk_chars(&self) -> usize {
        self.padding_chunk_chars.max(1)
    }
}

/// Application configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct Config {
    pub file_name: String,
    pub size: SizeSpec,
    pub output: PathBuf,
    pub stdout: bool,
    pub preview: bool,
    pub dimensions: Option<(u32, u32)>,
    pub policy: Policy,
}

impl Config {
    /// Parse CLI arguments into a Config
    pub fn from_cli() -> Result<Self> {
        Self::from_args(Cli::parse())
    }

    pub fn from_args(cli: Cli) -> Result<Self> {
        let unit: SizeUnit = cli.unit;
        let size = SizeSpec::parse(&cli.size, unit);
        let output = cli
            .output
            .unwrap_or_else(|| PathBuf::from(&cli.file_name));
        let policy = Policy::default()
            .with_max_bytes(cli.max_size_mb.saturating_mul(SizeUnit::Mebibyte.multiplier()));
        let dimensions = match (cli.width, cli.height) {
            (Some(w), Some(h)) => Some((w, h)),
            (Some(w), None) => Some((w, w)),
            (None, Some(h)) => Some((h, h)),
            (None, None) => None,
        };
        Ok(Config {
            file_name: cli.file_name,
            size,
            output,
            stdout: cli.stdout,
            preview: cli.preview,
            dimensions,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_caps_at_fifty_mebibytes() {
        let policy = Policy::default();
        assert!(policy.check(50 * 1024 * 1024).is_ok());
        let err = policy.check(50 * 1024 * 1024 + 1).unwrap_err();
        assert_eq!(err.limit, 50 * 1024 * 1024);
        assert!(err.to_string().contains("50.00 MB"), "{err}");
    }

    #[test]
    fn chunk_chars_never_zero() {
        let policy = Policy::default().with_padding_chunk_chars(0);
        assert_eq!(policy.chunk_chars(), 1);
    }

    #[test]
    fn cli_args_build_config() {
        let cli = Cli::parse_from(["fixture-forge", "image.png", "10", "KB", "--width", "32"]);
        let config = Config::from_args(cli).unwrap();
        assert_eq!(config.size.resolve(), 10 * 1024);
        assert_eq!(config.output, PathBuf::from("image.png"));
        assert_eq!(config.dimensions, Some((32, 32)));
        assert_eq!(config.policy.max_bytes, 50 * 1024 * 1024);
    }
}
