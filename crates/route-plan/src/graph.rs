//! Proximity graph over route waypoints
//!
//! Nodes are the authored route points; an undirected edge connects two
//! nodes whose Euclidean distance is below the connection radius. The
//! graph is static for the lot's lifetime and is rebuilt only when the
//! route points change, never per frame.

use tracing::{debug, info};

use lot_model::Point;

/// Static waypoint graph. Node 0 is the canonical entry node.
#[derive(Debug, Clone)]
pub struct ProximityGraph {
    nodes: Vec<Point>,
    adjacency: Vec<Vec<usize>>,
}

impl ProximityGraph {
    /// Build the graph by connecting every node pair closer than
    /// `max_connection_dist`. Too small a radius leaves isolated nodes;
    /// too large a radius costs search time.
    pub fn build(route_points: &[Point], max_connection_dist: f64) -> Self {
        let nodes: Vec<Point> = route_points.to_vec();
        let mut adjacency = vec![Vec::new(); nodes.len()];

        for i in 0..nodes.len() {
            for j in 0..nodes.len() {
                if i == j {
                    continue;
                }
                if nodes[i].distance(&nodes[j]) < max_connection_dist {
                    adjacency[i].push(j);
                }
            }
        }

        let edges: usize = adjacency.iter().map(Vec::len).sum::<usize>() / 2;
        info!(nodes = nodes.len(), edges, "proximity graph built");
        for (i, neighbors) in adjacency.iter().enumerate() {
            if neighbors.is_empty() && nodes.len() > 1 {
                debug!(node = i, "isolated route node, consider a larger connection radius");
            }
        }

        Self { nodes, adjacency }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: usize) -> Point {
        self.nodes[index]
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    /// Index of the node nearest (Euclidean) to the given point
    pub fn nearest_node(&self, target: Point) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance(&target)
                    .partial_cmp(&b.distance(&target))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_respect_connection_radius() {
        let points = vec![Point::new(0, 0), Point::new(100, 0), Point::new(500, 0)];
        let graph = ProximityGraph::build(&points, 250.0);

        assert_eq!(graph.neighbors(0), &[1]);
        assert_eq!(graph.neighbors(1), &[0]);
        // 500 px from node 1, beyond the radius
        assert!(graph.neighbors(2).is_empty());
    }

    #[test]
    fn test_edges_are_undirected() {
        let points = vec![Point::new(0, 0), Point::new(50, 50), Point::new(100, 0)];
        let graph = ProximityGraph::build(&points, 200.0);
        for i in 0..graph.len() {
            for &j in graph.neighbors(i) {
                assert!(graph.neighbors(j).contains(&i));
            }
        }
    }

    #[test]
    fn test_nearest_node() {
        let points = vec![Point::new(0, 0), Point::new(50, 0), Point::new(200, 0)];
        let graph = ProximityGraph::build(&points, 250.0);
        assert_eq!(graph.nearest_node(Point::new(60, 0)), Some(1));
        assert_eq!(graph.nearest_node(Point::new(-5, 3)), Some(0));
        assert_eq!(ProximityGraph::build(&[], 250.0).nearest_node(Point::new(0, 0)), None);
    }
}
