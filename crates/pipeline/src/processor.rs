//! Frame processing orchestration

use image::{GrayImage, RgbImage};
use tracing::{debug, info};

use annotate::{Annotator, AnnotatorStyle};
use lot_model::LotLayout;
use occupancy::{preprocess, FrameStats, OccupancyClassifier};
use route_plan::{PlannedRoute, RoutePlanner};

use crate::config::{LotConfig, PipelineError};

/// Everything produced for one frame: aggregate statistics for reporting
/// collaborators and the route that was drawn (if any).
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub stats: FrameStats,
    pub route: Option<PlannedRoute>,
}

/// Owns the whole per-frame pipeline. All mutable state (stabilization
/// buffers) lives inside and is only touched from the processing thread.
pub struct FrameProcessor {
    config: LotConfig,
    classifier: OccupancyClassifier,
    planner: RoutePlanner,
    annotator: Annotator,
    frame_index: u64,
}

impl FrameProcessor {
    /// Build the processor from validated configuration and a loaded
    /// layout. The proximity graph is built here, once, and only
    /// [`FrameProcessor::replace_layout`] rebuilds it.
    pub fn new(
        config: LotConfig,
        layout: LotLayout,
        style: AnnotatorStyle,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let classifier =
            OccupancyClassifier::new(layout.spaces, config.classification.clone());
        let planner = RoutePlanner::new(&layout.route_points, config.planner.clone());
        info!(
            route_points = layout.route_points.len(),
            "frame processor ready"
        );
        Ok(Self {
            config,
            classifier,
            planner,
            annotator: Annotator::new(style),
            frame_index: 0,
        })
    }

    /// Convenience constructor: load the layout from the configured
    /// positions path (missing file degrades to an empty lot; corrupt
    /// data fails).
    pub fn from_config(config: LotConfig, style: AnnotatorStyle) -> Result<Self, PipelineError> {
        let layout = LotLayout::load_or_default(&config.positions_path)?;
        Self::new(config, layout, style)
    }

    /// Process one frame in place: preprocess, classify, plan, annotate.
    pub fn process(&mut self, frame: &mut RgbImage) -> Result<FrameResult, PipelineError> {
        let mask = preprocess(frame, &self.config.processing);
        self.process_prepared(frame, &mask)
    }

    /// Same as [`FrameProcessor::process`] but with a caller-supplied
    /// activity mask. The mask must match the frame dimensions; a
    /// mismatch is an explicit error, never a corrupted overlay.
    pub fn process_prepared(
        &mut self,
        frame: &mut RgbImage,
        mask: &GrayImage,
    ) -> Result<FrameResult, PipelineError> {
        if mask.dimensions() != frame.dimensions() {
            return Err(PipelineError::DimensionMismatch {
                frame_w: frame.width(),
                frame_h: frame.height(),
                mask_w: mask.width(),
                mask_h: mask.height(),
            });
        }

        let stats = self.classifier.process_mask(mask);
        let route = self.planner.plan(&stats.spaces);
        self.annotator.annotate(frame, &stats, route.as_ref());

        self.frame_index += 1;
        debug!(
            frame = self.frame_index,
            empty = stats.empty_count,
            occupied = stats.occupied_count,
            routed = route.is_some(),
            "frame processed"
        );
        Ok(FrameResult { stats, route })
    }

    /// Swap in a re-edited layout: stabilization buffers reset and the
    /// proximity graph is rebuilt.
    pub fn replace_layout(&mut self, layout: LotLayout) {
        info!(
            spaces = layout.spaces.len(),
            route_points = layout.route_points.len(),
            "replacing lot layout"
        );
        self.classifier =
            OccupancyClassifier::new(layout.spaces, self.config.classification.clone());
        self.planner = RoutePlanner::new(&layout.route_points, self.config.planner.clone());
    }

    pub fn config(&self) -> &LotConfig {
        &self.config
    }
}
