//! Temporal stabilization (anti-flicker)
//!
//! Raw per-frame classifications fluctuate with lighting and compression
//! noise. A state change is only accepted after the raw classification
//! agrees for a configured number of consecutive frames.

use lot_model::SpaceStatus;

/// Per-space hysteresis record. Lives for the classifier's lifetime and is
/// never persisted; a restart starts over from Empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilityRecord {
    /// Last confirmed status, the only externally visible value
    pub stable: SpaceStatus,

    /// Pending status awaiting confirmation
    pub candidate: SpaceStatus,

    /// Consecutive frames the candidate has been observed
    pub counter: u32,
}

impl StabilityRecord {
    /// Feed one raw observation and return the resulting stable status.
    ///
    /// - raw agreeing with the stable state abandons the candidate
    /// - raw agreeing with the candidate accumulates one frame
    /// - any other raw value starts a fresh candidate at count 1
    ///
    /// Once the candidate has `hold_frames` consecutive confirmations it
    /// is promoted and the counter resets.
    pub fn observe(&mut self, raw: SpaceStatus, hold_frames: u32) -> SpaceStatus {
        if raw == self.stable {
            self.counter = 0;
        } else if raw == self.candidate {
            self.counter += 1;
        } else {
            self.candidate = raw;
            self.counter = 1;
        }

        if self.counter >= hold_frames {
            self.stable = self.candidate;
            self.counter = 0;
        }
        self.stable
    }
}
