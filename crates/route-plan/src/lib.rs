//! Route planner
//!
//! Guides a driver from the lot entrance to the first available empty
//! space:
//! - Proximity graph over route waypoints, built once per layout
//! - A* shortest path with straight-line heuristic
//! - Occupied-space polygons block edges, re-evaluated every frame

pub mod collision;
pub mod graph;
pub mod planner;

pub use collision::segment_blocked;
pub use graph::ProximityGraph;
pub use planner::{PlannedRoute, PlannerConfig, RoutePlanner};
