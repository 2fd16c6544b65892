//! Background gaze feed.
//!
//! Spawns a thread that owns the `GazeSource` and pushes samples via a
//! bounded channel. The source's own blocking read paces the thread.
//!
//! Each `GazeFeed` spawns exactly one thread that is shut down when the feed
//! is dropped.
use crossbeam_channel as xch;
use gaze_traits::{GazeSample, GazeSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Channel depth; a slow consumer applies backpressure to the source.
pub const FEED_CAPACITY: usize = 64;

/// What the consumer receives from the feed thread.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Sample(GazeSample),
    /// The source reported end of stream; no more events follow.
    Ended,
}

pub struct GazeFeed {
    rx: xch::Receiver<FeedEvent>,
    shutdown: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl GazeFeed {
    /// Spawn the feed thread. `read_timeout` bounds each blocking read so the
    /// thread notices shutdown promptly.
    pub fn spawn<S>(mut source: S, read_timeout: Duration) -> Self
    where
        S: GazeSource + Send + 'static,
    {
        let (tx, rx) = xch::bounded(FEED_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let ended = Arc::new(AtomicBool::new(false));
        let ended_clone = ended.clone();

        let join_handle = std::thread::spawn(move || {
            tracing::trace!("gaze feed thread started");
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("gaze feed received shutdown signal");
                    break;
                }

                match source.next_sample(read_timeout) {
                    Ok(Some(sample)) => {
                        // Consumer gone: exit quietly.
                        if tx.send(FeedEvent::Sample(sample)).is_err() {
                            tracing::debug!("gaze feed consumer disconnected, exiting thread");
                            break;
                        }
                    }
                    Ok(None) => {
                        ended_clone.store(true, Ordering::Relaxed);
                        let _ = tx.send(FeedEvent::Ended);
                        tracing::debug!("gaze source ended");
                        break;
                    }
                    Err(e) => {
                        // Timeouts and transient faults; the drift monitor reports prolonged silence.
                        tracing::trace!(error = %e, "gaze source read failed");
                    }
                }
            }
            tracing::trace!("gaze feed thread exiting cleanly");
        });

        Self {
            rx,
            shutdown,
            ended,
            join_handle: Some(join_handle),
        }
    }

    /// Receiver side, for use in `crossbeam_channel::select!`.
    pub fn receiver(&self) -> &xch::Receiver<FeedEvent> {
        &self.rx
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FeedEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Everything queued right now, without blocking.
    pub fn drain(&self) -> Vec<FeedEvent> {
        self.rx.try_iter().collect()
    }

    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Relaxed)
    }

}

impl Drop for GazeFeed {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // Unblock a thread stuck on a full channel.
        while self.rx.try_recv().is_ok() {}

        // The thread exits after its current read returns (bounded by read_timeout).
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("gaze feed thread joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "gaze feed thread panicked during shutdown");
                }
            }
        }
    }
}
