#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Gaze-signal pipeline for read verification (renderer-agnostic).
//!
//! This crate turns a noisy stream of estimated gaze points into an account of
//! which parts of a document were actually read. The document side is reached
//! only through `gaze_traits::SpanLocator`; the estimator through
//! `gaze_traits::GazeSource` or a `GazeDispatcher` listener.
//!
//! ## Architecture
//!
//! - **Outlier rejection**: z-score gate over recent accepted samples (`outlier`)
//! - **Smoothing**: adaptive One-Euro filter per axis (`smoothing`)
//! - **Fixations**: dispersion clustering resolved to spans (`fixation`)
//! - **Read tracking**: per-span dwell and read state (`tracker`)
//! - **Drift**: tracking-loss and off-screen watchdog (`drift`)
//! - **Verification**: coverage, average fixation, verdict (`verification`)
//! - **Session**: owns all of the above (`session`, `builder`)
//! - **Drivers**: background feed thread and replay/stream loops (`feed`, `runner`)
//!
//! All times are milliseconds as `f64`, on whatever clock the samples use.

// Module declarations
pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod drift;
pub mod error;
pub mod feed;
pub mod fixation;
pub mod layout;
pub mod listener;
pub mod mocks;
pub mod outlier;
pub mod runner;
pub mod session;
pub mod smoothing;
pub mod status;
pub mod tracker;
pub mod util;
pub mod verification;

// Re-exports
pub use builder::{Missing, ReadingSessionBuilder, Set, build_session};
pub use calibration::{CalibrationQuality, CalibrationReport, ValidationPoint};
pub use config::{
    DriftCfg, FixationCfg, OutlierCfg, SessionCfg, SmoothingCfg, TrackingCfg, Viewport,
};
pub use drift::{DriftMonitor, DriftReport, DriftStatus};
pub use error::{BuildError, GazeError, Report, Result};
pub use feed::{FeedEvent, GazeFeed};
pub use fixation::{Fixation, FixationDetector};
pub use layout::RectLayout;
pub use listener::{GazeDispatcher, ListenerHandle};
pub use outlier::OutlierRejector;
pub use runner::RunSummary;
pub use session::{Progress, ReadingSession, SessionStats};
pub use smoothing::{GazeFilter, OneEuroFilter};
pub use status::SampleOutcome;
pub use tracker::{ReadMap, ReadStatus, ReadTracker, RegionReadState};
pub use verification::{Verdict, VerificationInput, VerificationResult, compute_verification};

pub use gaze_traits::{GazeSample, SpanId, SpanLocator};
