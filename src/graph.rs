// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};

/// Error returned when accessing [Nodes](Node) absent from a [Graph].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NotFound(i64),
}

/// Represents a city road network as a set of [Nodes](Node)
/// and bidirectional roads ([Edges](Edge)) between them.
///
/// Adjacency lists are kept separately from the node registry, so edges
/// may be added before (or without) their endpoints.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<i64, Node>,
    edges: BTreeMap<i64, Vec<Edge>>,
}

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no nodes were registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns the ids of all [Nodes](Node) in the graph, in ascending order.
    pub fn all_node_ids(&self) -> Vec<i64> {
        self.nodes.keys().copied().collect()
    }

    /// Returns `true` if a [Node] with the given id was registered.
    pub fn has_node(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NotFound(id))
    }

    /// Creates or overwrites a [Node] with the provided id.
    ///
    /// Edges of an overwritten node are preserved.
    pub fn add_node(&mut self, id: i64, lat: f64, lon: f64, name: impl Into<String>) {
        self.set_node(Node {
            id,
            lat,
            lon,
            name: name.into(),
        });
    }

    /// Creates or overwrites a [Node] with `node.id`.
    pub fn set_node(&mut self, node: Node) {
        match self.nodes.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert(node);
            }
            Entry::Occupied(mut e) => {
                log::debug!("overwriting node {}", node.id);
                *e.get_mut() = node;
            }
        }
    }

    /// Connects two nodes with a bidirectional road.
    ///
    /// One [Edge] is appended to each endpoint's adjacency list, both with the same
    /// `distance`, `hazard_penalty` and `safety_bonus`. Existing roads between the same
    /// endpoints are kept; lookups by endpoint ([Graph::get_edge]) return the first one.
    pub fn add_edge(&mut self, u: i64, v: i64, distance: f64, hazard_penalty: f64, safety_bonus: f64) {
        let forward = Edge {
            to: v,
            distance,
            hazard_penalty,
            safety_bonus,
        };
        let backward = Edge { to: u, ..forward };

        if forward.raw_weight() < 0.0 {
            log::warn!(
                "road {} <-> {}: safety bonus {} exceeds cost {}, clamping weight to zero",
                u,
                v,
                safety_bonus,
                distance + hazard_penalty,
            );
        }

        self.edges.entry(u).or_default().push(forward);
        self.edges.entry(v).or_default().push(backward);
    }

    /// Gets all [Edges](Edge) leading away from a node with a given id.
    ///
    /// Returns an empty slice for nodes without any roads (including unknown nodes).
    pub fn get_neighbors(&self, id: i64) -> &[Edge] {
        self.edges
            .get(&id)
            .map(|e| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the first [Edge] from one node to another.
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> Option<&Edge> {
        self.get_neighbors(from_id).iter().find(|e| e.to == to_id)
    }
}
