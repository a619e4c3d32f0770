// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Outcome of [find_safest_path](crate::find_safest_path).
///
/// An unreachable destination (or an unknown start node) is not an error;
/// it is reported with `success == false` and an empty `path`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Ids of visited nodes, starting with the start node and ending with the end node.
    pub path: Vec<i64>,

    /// Sum of physical lengths of all traversed roads, in kilometers.
    #[cfg_attr(feature = "serde", serde(rename = "distance"))]
    pub total_distance: f64,

    /// See [safety_score].
    pub safety_score: f64,

    pub success: bool,
}

impl PathResult {
    /// Result of a search which did not find any route.
    pub fn failure() -> Self {
        Self {
            path: Vec::new(),
            total_distance: 0.0,
            safety_score: 0.0,
            success: false,
        }
    }
}

/// Summarizes hazard exposure per kilometer of a route: `100 - hazard_sum / (distance + 0.1) * 10`.
///
/// 100 means no exposure at all. The score is floored at zero, but never capped at 100,
/// so a negative `hazard_sum` yields more than 100.
pub fn safety_score(hazard_sum: f64, total_distance: f64) -> f64 {
    let score = 100.0 - hazard_sum / (total_distance + 0.1) * 10.0;
    score.max(0.0)
}
