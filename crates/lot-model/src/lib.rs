//! Parking lot data model
//!
//! Shared spatial model for the occupancy and routing pipeline:
//! - Parking space polygons and route waypoints
//! - Polygon geometry (bounding boxes, hit tests, masked pixel counts)
//! - Positions file persistence with old-schema upgrade

pub mod geometry;
pub mod positions;
pub mod types;

pub use geometry::{
    count_active_pixels, distance_to_boundary, fill_mask, point_in_polygon, polygon_centroid,
    signed_distance, BoundingBox,
};
pub use positions::{LotLayout, PositionsError};
pub use types::{sort_spaces, ParkingSpace, Point, SpaceStatus};
