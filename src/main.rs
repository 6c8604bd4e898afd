use anyhow::{Context, Result};
use fixture_forge::config::{Config, SizeLimitExceeded};
use fixture_forge::io::WriterSink;
use fixture_forge::output::format_summary;
use fixture_forge::{GenerationReport, GenerationRequest, Generator};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_SIZE_LIMIT: i32 = 3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("fixture-forge: {e:#}");
        let code = if e.downcast_ref::<SizeLimitExceeded>().is_some() {
            EXIT_SIZE_LIMIT
        } else {
            EXIT_FAILURE
        };
        process::exit(code);
    }
}

fn run() -> Result<()> {
    let config = Config::from_cli()?;
    let mut req = GenerationRequest::new(&config.file_name, config.size);
    if let Some((width, height)) = config.dimensions {
        req = req.with_dimensions(width, height);
    }
    let generator = Generator::builtin().with_policy(config.policy);

    // fail before creating the output file
    generator.preflight(&req)?;

    let report = if config.stdout {
        let stdout = std::io::stdout();
        let mut sink = WriterSink::new(BufWriter::new(stdout.lock()));
        let report = generator.generate_into(&req, &mut sink)?;
        sink.finish()?;
        report
    } else {
        write_file(&generator, &req, &config.output)?
    };

    eprintln!(
        "{}",
        format_summary(
            &config.file_name,
            report.format,
            report.target_bytes,
            report.actual_bytes
        )
    );
    if config.preview {
        if let Some(preview) = &report.preview_text {
            eprintln!("{preview}");
        }
    }
    Ok(())
}

/// Streams into `path`; a partially written file is removed on failure.
fn write_file(
    generator: &Generator,
    req: &GenerationRequest,
    path: &Path,
) -> Result<GenerationReport> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut sink = WriterSink::new(BufWriter::new(file));
    let result = match generator.generate_into(req, &mut sink) {
        Ok(report) => sink.finish().map(|_| report),
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = std::fs::remove_file(path);
    }
    result.with_context(|| format!("failed to write {}", path.display()))
}
