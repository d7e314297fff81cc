//! Occupancy engine
//!
//! Turns raw camera frames into stable per-space occupancy states:
//! - Activity mask preprocessing (blur, adaptive threshold, morphology)
//! - Per-space active-pixel counting and threshold classification
//! - Anti-flicker stabilization over consecutive frames

pub mod classifier;
pub mod preprocess;
pub mod stability;

pub use classifier::{classify_raw, ClassifierConfig, FrameStats, OccupancyClassifier, SpaceDetail};
pub use preprocess::{preprocess, PreprocessParams};
pub use stability::StabilityRecord;
