//! Per-space occupancy classification
//!
//! Counts active mask pixels inside each space polygon, thresholds the
//! count into a raw state and filters it through the per-space
//! stabilization records. Spaces are processed in the canonical id order
//! so downstream route priority is deterministic.

use std::collections::HashMap;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lot_model::{count_active_pixels, sort_spaces, ParkingSpace, Point, SpaceStatus};

use crate::stability::StabilityRecord;

/// Classification tuning, per lot (not per space)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Active-pixel count at or above which a space is raw-Occupied
    pub occupancy_threshold: u32,

    /// Consecutive agreeing frames required before a stable state change
    pub stabilization_frames: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            occupancy_threshold: 900,
            stabilization_frames: 5,
        }
    }
}

/// Raw threshold classification: Empty iff the count is below threshold
pub fn classify_raw(count: u32, threshold: u32) -> SpaceStatus {
    if count < threshold {
        SpaceStatus::Empty
    } else {
        SpaceStatus::Occupied
    }
}

/// Per-frame, per-space result used for annotation and route planning
#[derive(Debug, Clone, Serialize)]
pub struct SpaceDetail {
    pub id: String,
    pub points: Vec<Point>,
    /// Stabilized status; raw values are never exposed
    pub status: SpaceStatus,
    /// Raw active-pixel count, kept for diagnostics
    pub pixel_count: u32,
    pub irregular: bool,
}

/// Per-frame aggregate statistics
#[derive(Debug, Clone, Serialize)]
pub struct FrameStats {
    pub empty_count: usize,
    pub occupied_count: usize,
    pub total_count: usize,
    pub occupancy_rate_percent: f32,
    /// Details in canonical order (numeric ids ascending, others last)
    pub spaces: Vec<SpaceDetail>,
}

/// Occupancy classifier owning the sorted space list and the stabilization
/// buffers. Buffers are keyed by space id and reset only on restart or
/// layout reload.
pub struct OccupancyClassifier {
    spaces: Vec<ParkingSpace>,
    config: ClassifierConfig,
    stability: HashMap<String, StabilityRecord>,
}

impl OccupancyClassifier {
    pub fn new(mut spaces: Vec<ParkingSpace>, config: ClassifierConfig) -> Self {
        sort_spaces(&mut spaces);
        let stability = spaces
            .iter()
            .map(|s| (s.id.clone(), StabilityRecord::default()))
            .collect();
        info!(
            spaces = spaces.len(),
            threshold = config.occupancy_threshold,
            hold_frames = config.stabilization_frames,
            "occupancy classifier ready"
        );
        Self {
            spaces,
            config,
            stability,
        }
    }

    /// Spaces in canonical classification order
    pub fn spaces(&self) -> &[ParkingSpace] {
        &self.spaces
    }

    /// Classify every space against one preprocessed activity mask.
    pub fn process_mask(&mut self, mask: &GrayImage) -> FrameStats {
        let mut details = Vec::with_capacity(self.spaces.len());
        let mut empty_count = 0;

        for space in &self.spaces {
            let count = count_active_pixels(mask, &space.points, space.irregular);
            let raw = classify_raw(count, self.config.occupancy_threshold);

            let record = self.stability.entry(space.id.clone()).or_default();
            let stable = record.observe(raw, self.config.stabilization_frames);

            if stable.is_empty() {
                empty_count += 1;
            }
            debug!(id = %space.id, count, ?raw, ?stable, "space classified");

            details.push(SpaceDetail {
                id: space.id.clone(),
                points: space.points.clone(),
                status: stable,
                pixel_count: count,
                irregular: space.irregular,
            });
        }

        let total = self.spaces.len();
        let occupied = total - empty_count;
        FrameStats {
            empty_count,
            occupied_count: occupied,
            total_count: total,
            occupancy_rate_percent: if total > 0 {
                occupied as f32 / total as f32 * 100.0
            } else {
                0.0
            },
            spaces: details,
        }
    }

    /// Forget all stabilization history (layout reload / reconfiguration)
    pub fn reset(&mut self) {
        for record in self.stability.values_mut() {
            *record = StabilityRecord::default();
        }
    }
}
