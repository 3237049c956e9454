mod cli;
mod input;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tubemux_core::{
    load_config, load_default_config, validate_config, Config, FfmpegMuxer, HttpStreamSource,
    MetadataProvider, Muxer, PipelineConfig, PipelineContext, PipelineError,
    PipelineOrchestrator, SourceId, YtDlpMetadataProvider,
};

use cli::Args;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "tubemux.toml";

const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_json);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Logs go to stderr so they never interleave with the stdout progress display.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_configuration(args.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    let identifiers = input::collect_identifiers(&args.items);
    let identifiers: Vec<String> = identifiers
        .into_iter()
        .filter(|identifier| match SourceId::parse(identifier) {
            Ok(_) => true,
            Err(e) => {
                warn!("Skipping \"{}\": {}", identifier, e);
                false
            }
        })
        .collect();
    if identifiers.is_empty() {
        bail!("No valid identifiers given");
    }

    // Tools must be runnable before any item starts
    let metadata = Arc::new(YtDlpMetadataProvider::new(config.metadata.clone()));
    metadata.validate().await.context("yt-dlp is not available")?;

    let muxer = Arc::new(FfmpegMuxer::new(config.encoder.clone()));
    muxer.validate().await.context("ffmpeg is not available")?;

    let source =
        Arc::new(HttpStreamSource::new(&config.http).context("Failed to create stream source")?);

    let mut pipeline_config = PipelineConfig::from(&config).with_audio(args.audio);
    if let Some(output) = args.output {
        pipeline_config.output_dir = output;
    }
    info!("Writing files to {:?}", pipeline_config.output_dir);

    let context = PipelineContext::new(metadata, source, muxer, pipeline_config);
    let show_progress =
        config.reporter.enabled && !args.no_progress && std::io::stdout().is_terminal();

    let total = identifiers.len();
    let mut failed = 0usize;
    for identifier in &identifiers {
        let mut orchestrator = PipelineOrchestrator::new(identifier.as_str(), context.clone());
        if show_progress {
            orchestrator = orchestrator.with_display(Box::new(std::io::stdout()));
        }

        // Dropping the run on interrupt clears the display and kills the encoder.
        tokio::select! {
            result = orchestrator.run() => {
                if let Err(e) = result {
                    failed += 1;
                    report_failure(identifier, &e);
                }
            }
            Ok(()) = signal::ctrl_c() => {
                warn!("Interrupted");
                return Ok(ExitCode::from(EXIT_INTERRUPTED));
            }
        }
    }

    if failed > 0 {
        error!("{} of {} items failed", failed, total);
        return Ok(ExitCode::from(EXIT_FAILURE));
    }

    info!("All {} items processed", total);
    Ok(ExitCode::SUCCESS)
}

/// Loads `--config`, else `tubemux.toml` if present, else defaults and environment.
fn load_configuration(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => load_default_config().context("Failed to load default configuration"),
    }
}

fn report_failure(identifier: &str, error: &PipelineError) {
    error!("Failed to process \"{}\": {}", identifier, error);
    if let PipelineError::EncodingFailed {
        stderr: Some(stderr),
        ..
    } = error
    {
        warn!("Encoder output:\n{}", stderr.trim_end());
    }
}
