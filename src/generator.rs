use crate::config::Policy;
use crate::constants::PREVIEW_CHARS;
use crate::content::{Catalog, assemble_content, select_optimal_works};
use crate::encode::{EncodeContext, ImageDimensions, encoder_for};
use crate::format::Format;
use crate::io::{CountingSink, MemorySink, Sink};
use crate::output;
use crate::size::{SizeSpec, SizeUnit};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Upper bound on the in-memory buffer reserved up front.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// What to build: a file name (its extension picks the format) and a size.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub file_name: String,
    pub size: SizeSpec,
    /// PNG only; other formats ignore it.
    pub dimensions: Option<ImageDimensions>,
}

impl GenerationRequest {
    pub fn new(
        file_name: impl Into<String>,
        size: SizeSpec,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            size,
            dimensions: None,
        }
    }

    pub fn with_dimensions(
        mut self,
        width: u32,
        height: u32,
    ) -> Self {
        self.dimensions = Some(ImageDimensions::new(width, height));
        self
    }

    pub fn format(&self) -> Format {
        Format::from_file_name(&self.file_name)
    }
}

/// Outcome of a sink-based run; the bytes went to the caller's sink.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub format: Format,
    pub target_bytes: u64,
    pub actual_bytes: u64,
    pub preview_text: Option<String>,
}

impl GenerationReport {
    pub fn accuracy(&self) -> f64 {
        output::accuracy(self.target_bytes, self.actual_bytes)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub bytes: Vec<u8>,
    /// Measured from `bytes`, never assumed.
    pub actual_byte_length: u64,
    pub target_bytes: u64,
    pub format: Format,
    /// Text formats only.
    pub preview_text: Option<String>,
}

impl GenerationResult {
    pub fn accuracy(&self) -> f64 {
        output::accuracy(self.target_bytes, self.actual_byte_length)
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Builds fixtures from a catalog under a policy.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    catalog: Catalog,
    policy: Policy,
    timestamp: Option<DateTime<Utc>>,
}

impl Generator {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            policy: Policy::default(),
            timestamp: None,
        }
    }

    pub fn builtin() -> Self {
        Self::new(Catalog::builtin())
    }

    pub fn with_policy(
        mut self,
        policy: Policy,
    ) -> Self {
        self.policy = policy;
        self
    }

    /// Pin the banner timestamp so repeated runs produce identical bytes.
    pub fn with_timestamp(
        mut self,
        timestamp: DateTime<Utc>,
    ) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves the target and format and runs every check that must pass
    /// before any content is assembled or any byte is written.
    pub fn preflight(
        &self,
        req: &GenerationRequest,
    ) -> Result<(u64, Format)> {
        let target = req.size.resolve();
        self.policy.check(target).map_err(|e| anyhow!(e))?;
        if let Some(dims) = req.dimensions {
            dims.validate().map_err(|e| anyhow!(e))?;
        }
        Ok((target, req.format()))
    }

    /// `generate("report.csv", "1", SizeUnit::Mebibyte)`.
    pub fn generate(
        &self,
        file_name: &str,
        magnitude: &str,
        unit: SizeUnit,
    ) -> Result<GenerationResult> {
        self.generate_request(&GenerationRequest::new(
            file_name,
            SizeSpec::parse(magnitude, unit),
        ))
    }

    pub fn generate_request(
        &self,
        req: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let (target, _) = self.preflight(req)?;
        let mut sink = MemorySink::with_capacity(target.min(MAX_PREALLOC) as usize);
        let report = self.generate_into(req, &mut sink)?;
        let bytes = sink.finish();
        Ok(GenerationResult {
            actual_byte_length: bytes.len() as u64,
            bytes,
            target_bytes: report.target_bytes,
            format: report.format,
            preview_text: report.preview_text,
        })
    }

    /// Streams the fixture into `sink`. Nothing is written when a pre-flight
    /// check fails.
    pub fn generate_into(
        &self,
        req: &GenerationRequest,
        sink: &mut dyn Sink,
    ) -> Result<GenerationReport> {
        let (target, format) = self.preflight(req)?;
        let generated_at = self.timestamp.unwrap_or_else(Utc::now);
        let works = select_optimal_works(&self.catalog, target);
        let content = assemble_content(target, works, generated_at, &self.policy)?;
        debug!(
            file = %req.file_name,
            %format,
            target,
            works = works.len(),
            base_len = content.len(),
            "generation planned"
        );

        let ctx = EncodeContext {
            file_name: &req.file_name,
            target_bytes: target,
            works,
            content: &content,
            generated_at,
            policy: &self.policy,
            dimensions: req.dimensions,
        };
        // 4 bytes per char covers any UTF-8 prefix
        let prefix = if format.is_text() { PREVIEW_CHARS * 4 } else { 0 };
        let mut counting = CountingSink::new(sink).with_prefix(prefix);
        encoder_for(format)
            .encode(&ctx, &mut counting)
            .with_context(|| format!("failed to generate {format} file {:?}", req.file_name))?;

        let actual = counting.written();
        let preview_text = format
            .is_text()
            .then(|| output::preview_text(counting.prefix(), PREVIEW_CHARS));
        debug!(target, actual, "generation finished");
        Ok(GenerationReport {
            format,
            target_bytes: target,
            actual_bytes: actual,
            preview_text,
        })
    }
}

/// One-shot generation with the built-in catalog and default policy.
pub fn generate(
    file_name: &str,
    magnitude: &str,
    unit: SizeUnit,
) -> Result<GenerationResult> {
    Generator::builtin().generate(file_name, magnitude, unit)
}
