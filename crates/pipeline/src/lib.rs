//! Per-frame processing pipeline
//!
//! Single-threaded, frame-synchronous orchestration:
//! preprocess -> classify/stabilize -> plan -> annotate, in that strict
//! order, one frame at a time. Video acquisition and display are external
//! collaborators; this crate defines the data they exchange.

pub mod config;
pub mod processor;

pub use config::{LotConfig, PipelineError};
pub use processor::{FrameProcessor, FrameResult};

use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber. Call once at startup.
pub fn init_tracing(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("tracing initialized");
    }
}
