//! Pipeline configuration
//!
//! The lot configuration owns parameter validation: kernel constraints
//! are enforced here, before any frame is processed, so the preprocessor
//! itself never has to self-correct.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use lot_model::PositionsError;
use occupancy::{ClassifierConfig, PreprocessParams};
use route_plan::PlannerConfig;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Positions file error: {0}")]
    Positions(#[from] PositionsError),

    #[error("Mask dimensions {mask_w}x{mask_h} do not match frame {frame_w}x{frame_h}")]
    DimensionMismatch {
        frame_w: u32,
        frame_h: u32,
        mask_w: u32,
        mask_h: u32,
    },
}

/// Full lot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotConfig {
    /// Path to the persisted positions file
    pub positions_path: String,

    /// Classification thresholds and stabilization
    pub classification: ClassifierConfig,

    /// Activity mask preprocessing parameters
    pub processing: PreprocessParams,

    /// Route planner tunables
    pub planner: PlannerConfig,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            positions_path: "data/positions.json".into(),
            classification: ClassifierConfig::default(),
            processing: PreprocessParams::default(),
            planner: PlannerConfig::default(),
        }
    }
}

impl LotConfig {
    /// Load configuration from a file, layered over the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&LotConfig::default()).map_err(to_config_err)?)
            .add_source(::config::File::from(path.as_ref()))
            .build()
            .map_err(to_config_err)?;
        let cfg: LotConfig = settings.try_deserialize().map_err(to_config_err)?;
        cfg.validate()?;
        info!(path = %path.as_ref().display(), "lot configuration loaded");
        Ok(cfg)
    }

    /// Enforce parameter constraints the image primitives require.
    /// Violations are fatal configuration errors, never silently fixed.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let p = &self.processing;
        if p.threshold_block_size < 3 || p.threshold_block_size % 2 == 0 {
            return Err(PipelineError::Config(format!(
                "threshold_block_size must be an odd integer >= 3, got {}",
                p.threshold_block_size
            )));
        }
        if p.median_kernel == 0 || p.median_kernel % 2 == 0 {
            return Err(PipelineError::Config(format!(
                "median_kernel must be a positive odd integer, got {}",
                p.median_kernel
            )));
        }
        if p.blur_kernel.0 == 0 || p.blur_kernel.1 == 0 {
            return Err(PipelineError::Config("blur_kernel sides must be nonzero".into()));
        }
        if p.dilate_kernel.0 == 0 || p.dilate_kernel.1 == 0 {
            return Err(PipelineError::Config("dilate_kernel sides must be nonzero".into()));
        }
        if self.classification.stabilization_frames == 0 {
            return Err(PipelineError::Config(
                "stabilization_frames must be at least 1".into(),
            ));
        }
        if self.planner.max_connection_dist <= 0.0 || self.planner.sample_step <= 0.0 {
            return Err(PipelineError::Config(
                "planner distances must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn to_config_err(e: ::config::ConfigError) -> PipelineError {
    PipelineError::Config(e.to_string())
}
