//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "gaze", version, about = "Gaze-based read verification")]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print reports and logs as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins, then this, then [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a recorded gaze trace against a span layout
    Replay {
        /// Gaze trace CSV (timestamp_ms,x,y)
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
        /// Span layout CSV (id,page,x,y,width,height)
        #[arg(long, value_name = "FILE")]
        layout: PathBuf,
        /// Average calibration error in px; overrides [calibration] in the config
        #[arg(long, value_name = "PX")]
        calibration_error: Option<f64>,
        /// Also list every fixation
        #[arg(long, action = ArgAction::SetTrue)]
        fixations: bool,
    },
    /// Read live gaze lines (timestamp_ms,x,y) from stdin until EOF or Ctrl-C
    Stream {
        /// Span layout CSV (id,page,x,y,width,height)
        #[arg(long, value_name = "FILE")]
        layout: PathBuf,
        /// Average calibration error in px; overrides [calibration] in the config
        #[arg(long, value_name = "PX")]
        calibration_error: Option<f64>,
        /// How often the loop wakes to run drift checks
        #[arg(long, value_name = "MS", default_value_t = gaze_core::runner::DEFAULT_TICK_MS)]
        tick_ms: u64,
    },
    /// Judge a calibration from validation samples
    Calibrate {
        /// Validation CSV (target_x,target_y,gaze_x,gaze_y)
        #[arg(long, value_name = "FILE")]
        validation: PathBuf,
    },
    /// Validate the config and build a session without reading any gaze
    SelfCheck,
}
