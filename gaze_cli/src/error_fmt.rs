//! Human-readable error descriptions and structured JSON error formatting.

use gaze_core::error::{BuildError, GazeError};

/// Exit code for configuration that parses but is out of range.
pub const EXIT_INVALID_CONFIG: i32 = 3;
/// Exit code for unreadable or malformed input files.
pub const EXIT_BAD_INPUT: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingLocator => {
                "What happened: No span layout was provided to the reading session.\nLikely causes: The layout failed to load or was not wired into the builder.\nHow to fix: Pass a layout CSV with --layout.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or the flag, then rerun."
            ),
        };
    }

    if let Some(ge) = err.downcast_ref::<GazeError>() {
        return match ge {
            GazeError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            GazeError::Input(msg) => humanize_input(msg),
        };
    }

    // String-based heuristics for untyped errors
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") || lower.starts_with("read config") {
        return format!(
            "What happened: Configuration could not be loaded.\nLikely causes: Wrong --config path or a TOML syntax error.\nHow to fix: Fix the file and try again. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

fn humanize_input(msg: &str) -> String {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("csv must have headers") {
        return format!("Invalid headers in input CSV. {msg}.");
    }
    if lower.starts_with("open ") {
        return format!(
            "What happened: Could not open an input file.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the path and rerun. Original: {msg}"
        );
    }
    format!(
        "What happened: An input file was rejected ({msg}).\nLikely causes: A row breaks the rule named above.\nHow to fix: Correct the file and rerun."
    )
}

/// Stable exit codes per error kind; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_INVALID_CONFIG;
    }
    match err.downcast_ref::<GazeError>() {
        Some(GazeError::Config(_)) => EXIT_INVALID_CONFIG,
        Some(GazeError::Input(_)) => EXIT_BAD_INPUT,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingLocator => "MissingLocator",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    match err.downcast_ref::<GazeError>() {
        Some(GazeError::Config(_)) => "InvalidConfig",
        Some(GazeError::Input(_)) => "BadInput",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}
