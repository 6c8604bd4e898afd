pub mod checksum;
pub mod cli;
pub mod config;
pub mod constants;
pub mod content;
pub mod encode;
pub mod format;
pub mod generator;
pub mod io;
pub mod output;
pub mod size;

pub use config::{Policy, SizeLimitExceeded};
pub use encode::ImageDimensions;
pub use encode::png::InvalidDimensions;
pub use format::{Family, Format};
pub use generator::{GenerationReport, GenerationRequest, GenerationResult, Generator, generate};
pub use size::{SizeSpec, SizeUnit, UnknownUnit};
