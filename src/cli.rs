use crate::size::SizeUnit;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fixture-forge")]
#[command(
    about = "Synthesize a structurally valid file of an exact size (txt, json, csv, xml, yaml, \
                   pdf, png, jpg, zip) for upload and parser testing."
)]
pub struct Cli {
    /// Target file name; its extension selects the format.
    pub file_name: String,

    /// Size magnitude, e.g. 10 or 1.5. Non-numeric values resolve to 0.
    pub size: String,

    /// Binary size unit: B, KB, MB or GB.
    #[arg(default_value = "KB")]
    pub unit: SizeUnit,

    /// Write to this path instead of FILE_NAME.
    #[arg(short = 'o', long = "output", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write the generated bytes to stdout.
    #[arg(long = "stdout")]
    pub stdout: bool,

    /// Refuse targets above this many mebibytes.
    #[arg(short = 'L', long = "max-size-mb", default_value_t = 50)]
    pub max_size_mb: u64,

    /// PNG width in pixels.
    #[arg(long = "width", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// PNG height in pixels.
    #[arg(long = "height", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Print a preview of text formats to stderr.
    #[arg(short = 'p', long = "preview")]
    pub preview: bool,
}
