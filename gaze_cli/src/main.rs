mod cli;
mod commands;
mod error_fmt;
mod report;
mod source;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use gaze_core::error::GazeError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error handler: {e}");
    }

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => gaze_config::Config::default(),
    };
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);

    match cli.cmd {
        Commands::Replay {
            samples,
            layout,
            calibration_error,
            fixations,
        } => commands::run_replay(&cfg, &samples, &layout, calibration_error, fixations, cli.json),
        Commands::Stream {
            layout,
            calibration_error,
            tick_ms,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            commands::run_stream(&cfg, &layout, calibration_error, tick_ms, cli.json, shutdown)
        }
        Commands::Calibrate { validation } => commands::run_calibrate(&validation, cli.json),
        Commands::SelfCheck => commands::run_self_check(&cfg, cli.json),
    }
}

fn load_config(path: &Path) -> eyre::Result<gaze_config::Config> {
    gaze_config::load_config_file(path).map_err(|e| GazeError::Config(e.to_string()).into())
}

/// Console logs go to stderr so stdout carries only the report.
fn init_tracing(json: bool, level: Option<&str>, logging: &gaze_config::Logging) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.or(logging.level.as_deref()).unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if json {
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    } else {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    if let Some(file) = logging.file.as_deref() {
        match file_layer(file, logging.rotation.as_deref()) {
            Ok(layer) => layers.push(layer),
            Err(e) => eprintln!("log file disabled: {e}"),
        }
    }

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
}

/// Non-blocking JSON-lines file writer; the worker guard lives in `FILE_GUARD`.
fn file_layer(file: &str, rotation: Option<&str>) -> eyre::Result<BoxedLayer> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gaze.log".to_string());
    let rotation = match rotation {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    };
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name)
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);
    Ok(tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .boxed())
}
