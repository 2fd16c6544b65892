//! Single-consumer push delivery of raw gaze samples.
//!
//! The estimator side calls `dispatch`; at most one listener receives each
//! sample. Installing a listener replaces the previous one and returns a
//! handle that can cancel exactly that listener. Cancelling twice, or
//! cancelling after a newer listener was installed, does nothing.

use std::sync::{Arc, Mutex};

use gaze_traits::GazeSample;

type Listener = Box<dyn FnMut(GazeSample) + Send>;

#[derive(Default)]
struct Slot {
    generation: u64,
    listener: Option<Listener>,
}

#[derive(Clone, Default)]
pub struct GazeDispatcher {
    slot: Arc<Mutex<Slot>>,
}

impl core::fmt::Debug for GazeDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GazeDispatcher")
            .field("has_listener", &self.has_listener())
            .finish()
    }
}

impl GazeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `f` as the only listener, replacing any previous one.
    pub fn set_listener<F>(&self, f: F) -> ListenerHandle
    where
        F: FnMut(GazeSample) + Send + 'static,
    {
        let mut generation = 0;
        if let Ok(mut slot) = self.slot.lock() {
            slot.generation = slot.generation.wrapping_add(1);
            slot.listener = Some(Box::new(f));
            generation = slot.generation;
        }
        tracing::trace!(generation, "gaze listener installed");
        ListenerHandle {
            slot: Arc::clone(&self.slot),
            generation,
        }
    }

    /// Remove the current listener, if any. Idempotent.
    pub fn clear_listener(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.generation = slot.generation.wrapping_add(1);
            slot.listener = None;
        }
    }

    pub fn has_listener(&self) -> bool {
        self.slot.lock().map(|s| s.listener.is_some()).unwrap_or(false)
    }

    /// Deliver a sample to the current listener. Returns `false` when nobody is listening.
    ///
    /// The lock is not held while the listener runs, so a listener may
    /// replace or cancel itself from inside the callback.
    pub fn dispatch(&self, sample: GazeSample) -> bool {
        let (generation, mut listener) = match self.slot.lock() {
            Ok(mut slot) => match slot.listener.take() {
                Some(l) => (slot.generation, l),
                None => return false,
            },
            Err(_) => return false,
        };

        listener(sample);

        if let Ok(mut slot) = self.slot.lock()
            && slot.generation == generation
            && slot.listener.is_none()
        {
            slot.listener = Some(listener);
        }
        true
    }
}

/// Cancels the listener it was returned for, and nothing else.
pub struct ListenerHandle {
    slot: Arc<Mutex<Slot>>,
    generation: u64,
}

impl core::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("generation", &self.generation)
            .finish()
    }
}

impl ListenerHandle {
    /// True while this handle's listener is still the installed one.
    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .map(|s| s.generation == self.generation && s.listener.is_some())
            .unwrap_or(false)
    }

    pub fn cancel(&self) {
        if let Ok(mut slot) = self.slot.lock()
            && slot.generation == self.generation
        {
            slot.listener = None;
            tracing::trace!(generation = self.generation, "gaze listener cancelled");
        }
    }
}
