// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use super::{safety_score, PathResult};
use crate::Graph;

#[derive(Debug, Clone, Copy)]
struct FrontierItem {
    at: i64,
    cost: f64,
}

impl PartialEq for FrontierItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl PartialOrd for FrontierItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for FrontierItem {}

impl Ord for FrontierItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.cost.total_cmp(&self.cost)
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, start_id: i64, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while last != start_id {
        match came_from.get(&last) {
            Some(&nd) => {
                path.push(nd);
                last = nd;
            }
            None => break,
        }
    }

    path.reverse();
    return path;
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the cheapest route between two nodes in the provided graph,
/// where the cost of every road is its [weight](crate::Edge::weight).
///
/// Hazard penalties must already be folded into the edges, e.g. by
/// [Engine::add_road](crate::Engine::add_road).
///
/// Returns a [PathResult] with `success == false` if `start_id` is not a node of the graph,
/// or if there is no route to `end_id`. Edges leading to unregistered nodes are ignored,
/// so every id of a successful path refers to an existing [Node](crate::Node).
///
/// Once the route is fixed, its real `total_distance` and [safety_score] are recomputed
/// from the raw `distance` and `hazard_penalty` of the first road between every
/// pair of consecutive nodes.
pub fn find_safest_path(g: &Graph, start_id: i64, end_id: i64) -> PathResult {
    if !g.has_node(start_id) {
        log::debug!("route {} -> {}: unknown start node", start_id, end_id);
        return PathResult::failure();
    }

    let mut queue: BinaryHeap<FrontierItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    queue.push(FrontierItem {
        at: start_id,
        cost: 0.0,
    });
    known_costs.insert(start_id, 0.0);

    while let Some(item) = queue.pop() {
        // Multiple items may be kept in the queue for the same node; skip the stale ones.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        if item.at == end_id {
            break;
        }

        steps += 1;

        for edge in g.get_neighbors(item.at) {
            // Roads may lead to unregistered nodes; those are never routed through
            if !g.has_node(edge.to) {
                continue;
            }

            let neighbor_cost = item.cost + edge.weight();
            if neighbor_cost
                < known_costs
                    .get(&edge.to)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                came_from.insert(edge.to, item.at);
                known_costs.insert(edge.to, neighbor_cost);
                queue.push(FrontierItem {
                    at: edge.to,
                    cost: neighbor_cost,
                });
            }
        }
    }

    if !known_costs.contains_key(&end_id) {
        log::debug!(
            "route {} -> {}: no route after expanding {} nodes",
            start_id,
            end_id,
            steps
        );
        return PathResult::failure();
    }

    let path = reconstruct_path(&came_from, start_id, end_id);

    let mut total_distance = 0.0;
    let mut hazard_sum = 0.0;
    for pair in path.windows(2) {
        if let Some(edge) = g.get_edge(pair[0], pair[1]) {
            total_distance += edge.distance;
            hazard_sum += edge.hazard_penalty;
        }
    }

    log::debug!(
        "route {} -> {}: {} nodes, {:.3} km, expanded {} nodes",
        start_id,
        end_id,
        path.len(),
        total_distance,
        steps
    );

    PathResult {
        path,
        total_distance,
        safety_score: safety_score(hazard_sum, total_distance),
        success: true,
    }
}
