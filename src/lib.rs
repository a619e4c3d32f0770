// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Hazard-aware routing over small city road networks.
//!
//! Roads are stored in an undirected weighted [Graph], where the cost of every
//! [Edge] combines its physical length with a hazard penalty and a safety bonus.
//! [find_safest_path] runs Dijkstra's algorithm over those costs, and reports
//! the real distance and a safety score of the chosen route. Penalties are derived
//! from point hazards registered in a [HazardRegistry]. Points of interest
//! (hospitals, police stations, ...) are indexed in a [KDTree] for nearest-neighbor
//! lookups.
//!
//! The [Engine] bundles all three registries behind locks, so that a long-lived
//! process can share them between concurrent requests.
//!
//! # Example
//!
//! ```
//! let mut g = saferoute::Graph::default();
//! g.add_node(1, 0.0, 0.0, "A");
//! g.add_node(2, 1.0, 0.0, "B");
//! g.add_node(3, 2.0, 0.0, "C");
//! g.add_edge(1, 2, 1.0, 0.0, 0.0);
//! g.add_edge(2, 3, 1.0, 0.0, 0.0);
//! g.add_edge(1, 3, 1.5, 0.0, 0.0);
//!
//! let route = saferoute::find_safest_path(&g, 1, 3);
//! assert!(route.success);
//! assert_eq!(route.path, vec![1, 3]);
//! ```

mod dataset;
mod dijkstra;
mod distance;
mod engine;
mod graph;
mod hazards;
mod kd;

pub use dataset::{Dataset, EdgeDescriptor};
pub use dijkstra::{find_safest_path, safety_score, PathResult};
pub use distance::earth_distance;
pub use engine::Engine;
pub use graph::{Graph, GraphError};
pub use hazards::{Hazard, HazardRegistry, DEFAULT_HAZARD_RADIUS};
pub use kd::{Facility, KDTree};

/// Represents an intersection or a landmark in the [Graph].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Represents a road leading from a specific [Node] to `to`.
///
/// Roads are bidirectional; [Graph::add_edge] stores one Edge in each
/// endpoint's adjacency list, both carrying the same values.
///
/// `to` might not exist in the [Graph]. Such edges are silently ignored
/// by [find_safest_path].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub to: i64,

    /// Physical length of the road, in kilometers.
    pub distance: f64,

    /// Cost increase caused by nearby hazards, `>= 0`.
    pub hazard_penalty: f64,

    /// Cost decrease for well-lit or secured roads, `>= 0`.
    pub safety_bonus: f64,
}

impl Edge {
    /// Returns the cost of traversing this road: `distance + hazard_penalty - safety_bonus`.
    ///
    /// Dijkstra's algorithm requires non-negative costs, so a safety bonus
    /// outweighing the rest of the cost yields zero instead of a negative weight.
    pub fn weight(&self) -> f64 {
        self.raw_weight().max(0.0)
    }

    /// Returns `distance + hazard_penalty - safety_bonus` without the zero floor.
    pub fn raw_weight(&self) -> f64 {
        self.distance + self.hazard_penalty - self.safety_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_weight() {
        let e = Edge {
            to: 1,
            distance: 2.5,
            hazard_penalty: 0.5,
            safety_bonus: 0.2,
        };
        assert!((e.weight() - 2.8).abs() < 1e-9);
    }

    #[test]
    fn edge_weight_never_negative() {
        let e = Edge {
            to: 1,
            distance: 0.3,
            hazard_penalty: 0.0,
            safety_bonus: 1.0,
        };
        assert!(e.raw_weight() < 0.0);
        assert_eq!(e.weight(), 0.0);
    }
}
