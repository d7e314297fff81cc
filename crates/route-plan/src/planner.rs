//! A* route planning over the proximity graph
//!
//! Each frame: pick the first empty space in canonical order, find the
//! route node nearest its centroid and search for the cheapest path from
//! the entry node, skipping edges blocked by currently occupied spaces.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use lot_model::{polygon_centroid, Point};
use occupancy::SpaceDetail;

use crate::collision::segment_blocked;
use crate::graph::ProximityGraph;

/// Planner tunables. Sampling step and safety margin are empirical and
/// deployment-specific, so they stay configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Maximum Euclidean distance for a graph edge (px)
    pub max_connection_dist: f64,

    /// Collision sampling step along an edge (px)
    pub sample_step: f64,

    /// Extra clearance around occupied polygons (px)
    pub safety_margin: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_connection_dist: 250.0,
            sample_step: 10.0,
            safety_margin: 5.0,
        }
    }
}

/// A planned route for the current frame
#[derive(Debug, Clone, Serialize)]
pub struct PlannedRoute {
    /// Ordered points from the entry node to the target centroid
    pub points: Vec<Point>,

    /// Id of the selected target space
    pub target_id: String,

    /// Target space centroid, the final hop
    pub target: Point,
}

struct SearchNode {
    index: usize,
    g_cost: f64,
    f_cost: f64,
    /// Insertion order, the tie-break for equal f costs
    seq: u64,
}

impl Eq for SearchNode {}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; earlier insertion wins ties
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Route planner owning the static graph. Occupancy is supplied per frame;
/// the graph itself is rebuilt only when route points change.
pub struct RoutePlanner {
    graph: ProximityGraph,
    config: PlannerConfig,
}

impl RoutePlanner {
    /// Build the planner from the authored route points. The first point
    /// is the entry node.
    pub fn new(route_points: &[Point], config: PlannerConfig) -> Self {
        let graph = ProximityGraph::build(route_points, config.max_connection_dist);
        Self { graph, config }
    }

    pub fn graph(&self) -> &ProximityGraph {
        &self.graph
    }

    /// Plan a route to the first available empty space.
    ///
    /// `spaces` must already be in canonical order (the classifier's
    /// output is). Returns `None` when the lot is full, no route points
    /// exist, or every path is blocked; all of these are normal per-frame
    /// outcomes rather than errors.
    pub fn plan(&self, spaces: &[SpaceDetail]) -> Option<PlannedRoute> {
        if self.graph.is_empty() {
            return None;
        }

        let target_space = spaces.iter().find(|s| s.status.is_empty())?;
        let occupied: Vec<&SpaceDetail> =
            spaces.iter().filter(|s| !s.status.is_empty()).collect();

        let target = polygon_centroid(&target_space.points);
        let exit_node = self.graph.nearest_node(target)?;

        let mut points = self.search(0, exit_node, &occupied)?;
        points.push(target);

        debug!(
            target_id = %target_space.id,
            hops = points.len(),
            "route planned"
        );
        Some(PlannedRoute {
            points,
            target_id: target_space.id.clone(),
            target,
        })
    }

    /// A* from `start` to `goal` over graph indices. Edges blocked by an
    /// occupied polygon are skipped; blocking is re-evaluated per call
    /// because occupancy changes between frames.
    fn search(&self, start: usize, goal: usize, occupied: &[&SpaceDetail]) -> Option<Vec<Point>> {
        if start == goal {
            return Some(vec![self.graph.node(start)]);
        }

        let goal_point = self.graph.node(goal);
        let heuristic = |i: usize| self.graph.node(i).distance(&goal_point);

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<usize, usize> = HashMap::new();
        let mut g_scores: HashMap<usize, f64> = HashMap::new();
        let mut seq = 0u64;

        open_set.push(SearchNode {
            index: start,
            g_cost: 0.0,
            f_cost: heuristic(start),
            seq,
        });
        g_scores.insert(start, 0.0);

        while let Some(current) = open_set.pop() {
            if current.index == goal {
                return Some(self.reconstruct(&came_from, goal));
            }
            // Stale heap entry superseded by a cheaper path
            if current.g_cost > g_scores.get(&current.index).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            let current_point = self.graph.node(current.index);
            for &neighbor in self.graph.neighbors(current.index) {
                let neighbor_point = self.graph.node(neighbor);

                if segment_blocked(
                    current_point,
                    neighbor_point,
                    occupied,
                    self.config.sample_step,
                    self.config.safety_margin,
                ) {
                    continue;
                }

                let tentative_g = current.g_cost + current_point.distance(&neighbor_point);
                let best_g = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < best_g {
                    came_from.insert(neighbor, current.index);
                    g_scores.insert(neighbor, tentative_g);
                    seq += 1;
                    open_set.push(SearchNode {
                        index: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + heuristic(neighbor),
                        seq,
                    });
                }
            }
        }

        debug!("no safe route between entry and graph-exit node");
        None
    }

    fn reconstruct(&self, came_from: &HashMap<usize, usize>, goal: usize) -> Vec<Point> {
        let mut indices = vec![goal];
        let mut current = goal;
        while let Some(&prev) = came_from.get(&current) {
            indices.push(prev);
            current = prev;
        }
        indices.reverse();
        indices.into_iter().map(|i| self.graph.node(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lot_model::SpaceStatus;

    fn detail(id: &str, points: Vec<Point>, status: SpaceStatus) -> SpaceDetail {
        SpaceDetail {
            id: id.into(),
            points,
            status,
            pixel_count: 0,
            irregular: false,
        }
    }

    fn square(x: i32, y: i32, size: i32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_plans_direct_route_to_first_empty_space() {
        // End-to-end scenario: "1" occupied, "2" and "3" empty;
        // the planner picks "2" (lowest empty id).
        let planner = RoutePlanner::new(
            &[Point::new(0, 0), Point::new(50, 0)],
            PlannerConfig::default(),
        );
        let spaces = vec![
            detail("1", square(200, 200, 20), SpaceStatus::Occupied),
            detail("2", square(50, -10, 20), SpaceStatus::Empty),
            detail("3", square(300, 300, 20), SpaceStatus::Empty),
        ];
        // centroid of "2" is (60, 0)
        let route = planner.plan(&spaces).expect("route expected");
        assert_eq!(route.target_id, "2");
        assert_eq!(
            route.points,
            vec![Point::new(0, 0), Point::new(50, 0), Point::new(60, 0)]
        );
    }

    #[test]
    fn test_full_lot_yields_no_route() {
        let planner = RoutePlanner::new(
            &[Point::new(0, 0), Point::new(50, 0)],
            PlannerConfig::default(),
        );
        let spaces = vec![detail("1", square(100, 0, 20), SpaceStatus::Occupied)];
        assert!(planner.plan(&spaces).is_none());
    }

    #[test]
    fn test_no_route_points_yields_no_route() {
        let planner = RoutePlanner::new(&[], PlannerConfig::default());
        let spaces = vec![detail("1", square(100, 0, 20), SpaceStatus::Empty)];
        assert!(planner.plan(&spaces).is_none());
    }

    #[test]
    fn test_occupied_space_forces_detour() {
        // Colinear nodes 0 -> 1 -> 2 with an occupied polygon straddling
        // the 0 -> 1 segment; node 3 offers a detour above it.
        let nodes = [
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(200, 0),
            Point::new(100, 120),
        ];
        let config = PlannerConfig {
            max_connection_dist: 180.0,
            ..Default::default()
        };
        let planner = RoutePlanner::new(&nodes, config);

        let blocker = detail("9", square(40, -15, 30), SpaceStatus::Occupied);
        // Target next to node 2
        let target = detail("1", square(195, 20, 10), SpaceStatus::Empty);
        let spaces = vec![target, blocker];

        let route = planner.plan(&spaces).expect("detour expected");
        // Direct edge 0 -> 1 is blocked; the route must go through node 3
        assert!(route.points.contains(&Point::new(100, 120)));
        assert!(!route
            .points
            .windows(2)
            .any(|w| w[0] == Point::new(0, 0) && w[1] == Point::new(100, 0)));
    }

    #[test]
    fn test_blocked_everywhere_reports_no_path() {
        let nodes = [Point::new(0, 0), Point::new(100, 0)];
        let planner = RoutePlanner::new(&nodes, PlannerConfig::default());

        let blocker = detail("9", square(30, -40, 40), SpaceStatus::Occupied);
        let target = detail("1", square(95, 30, 10), SpaceStatus::Empty);
        let route = planner.plan(&[target, blocker]);
        assert!(route.is_none());
    }

    #[test]
    fn test_exit_node_equal_to_entry_is_trivial() {
        let planner = RoutePlanner::new(
            &[Point::new(0, 0), Point::new(500, 500)],
            PlannerConfig::default(),
        );
        // Target centroid right next to the entry node
        let target = detail("1", square(-10, -10, 20), SpaceStatus::Empty);
        let route = planner.plan(&[target]).expect("trivial route expected");
        assert_eq!(route.points, vec![Point::new(0, 0), Point::new(0, 0)]);
    }
}
