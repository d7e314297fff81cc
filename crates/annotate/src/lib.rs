//! Frame annotator
//!
//! Pure rendering of classification and routing results onto the output
//! frame: color-coded space outlines, id labels, an info panel, the
//! planned route with direction arrowheads and a target marker.

mod annotator;

pub use annotator::{Annotator, AnnotatorStyle};
