//! Outcome of pushing one raw sample through the session.

use crate::fixation::Fixation;

/// What happened to a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// The session is not running; the sample was ignored.
    Inactive,
    /// NaN or infinite coordinates or timestamp; dropped.
    Malformed,
    /// Dropped by the outlier rejector.
    Rejected,
    /// Smoothed and clustered; carries the fixation this sample closed, if any.
    Accepted { fixation: Option<Fixation> },
}

impl SampleOutcome {
    pub fn fixation(&self) -> Option<&Fixation> {
        match self {
            SampleOutcome::Accepted { fixation } => fixation.as_ref(),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleOutcome::Accepted { .. })
    }
}
