//! Gaze lines from a text stream (stdin in practice).
//!
//! A reader thread parses `timestamp_ms,x,y` records and hands them over a
//! bounded channel, so `next_sample` honours its timeout even while the
//! underlying read blocks.

use crossbeam_channel as xch;
use gaze_config::TraceRow;
use gaze_core::conversions::sample_from_row;
use gaze_traits::{BoxError, GazeSample, GazeSource};
use std::io::Read;
use std::time::Duration;

const LINE_BUFFER: usize = 256;

pub struct LineSource {
    rx: xch::Receiver<GazeSample>,
}

impl LineSource {
    pub fn spawn<R: Read + Send + 'static>(input: R) -> Self {
        let (tx, rx) = xch::bounded(LINE_BUFFER);
        // Detached: a blocked read must not hold up shutdown.
        std::thread::spawn(move || {
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .trim(csv::Trim::All)
                .comment(Some(b'#'))
                .flexible(true)
                .from_reader(input);
            let mut line = 0u64;
            for rec in rdr.records() {
                line += 1;
                let rec = match rec {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!(line, error = %e, "unreadable gaze line");
                        continue;
                    }
                };
                if rec.get(0) == Some("timestamp_ms") {
                    continue;
                }
                match rec.deserialize::<TraceRow>(None) {
                    Ok(row) => {
                        if tx.send(sample_from_row(&row)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(line, error = %e, "skipping malformed gaze line"),
                }
            }
            tracing::trace!(lines = line, "gaze input closed");
        });
        Self { rx }
    }
}

impl GazeSource for LineSource {
    fn next_sample(&mut self, timeout: Duration) -> Result<Option<GazeSample>, BoxError> {
        match self.rx.recv_timeout(timeout) {
            Ok(s) => Ok(Some(s)),
            Err(xch::RecvTimeoutError::Timeout) => Err("no gaze line within timeout".into()),
            Err(xch::RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}
