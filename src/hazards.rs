// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

/// Default radius of a hazard's zone of influence, in coordinate units (degrees).
pub const DEFAULT_HAZARD_RADIUS: f64 = 0.005;

/// Represents a point threat or obstacle in the city (traffic jam, road works, protest, ...).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hazard {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,

    /// Magnitude of impact, from 1 (minor delay) to 10 (complete blockage).
    pub severity: u8,

    /// Free-form classification, e.g. "Traffic" or "Construction".
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
}

/// Set of active [Hazards](Hazard), keyed by id.
///
/// Penalty evaluation scans every hazard, which is only suitable
/// for small numbers of hazards.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HazardRegistry(BTreeMap<i64, Hazard>);

impl HazardRegistry {
    /// Returns the number of registered hazards.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no hazards were registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Retrieves a [Hazard] with the provided id.
    pub fn get(&self, id: i64) -> Option<&Hazard> {
        self.0.get(&id)
    }

    /// Registers a [Hazard], replacing any hazard with the same id.
    pub fn add_hazard(&mut self, h: Hazard) {
        if !(1..=10).contains(&h.severity) {
            log::warn!("hazard {}: severity {} outside of 1..=10", h.id, h.severity);
        }
        let id = h.id;
        if self.0.insert(id, h).is_some() {
            log::debug!("replaced hazard {}", id);
        }
    }

    /// Computes the cumulative penalty for a position.
    ///
    /// Every hazard closer than `radius` (euclidean distance in coordinate units)
    /// contributes `severity * (1 - distance / radius)`; the contributions
    /// of overlapping zones are summed without any cap.
    pub fn penalty_at(&self, lat: f64, lon: f64, radius: f64) -> f64 {
        self.0
            .values()
            .filter_map(|h| {
                let dist = (lat - h.lat).hypot(lon - h.lon);
                if dist < radius {
                    Some(h.severity as f64 * (1.0 - dist / radius))
                } else {
                    None
                }
            })
            .fold(0.0, |total, penalty| total + penalty)
    }

    /// Returns a snapshot of all hazards, in ascending id order.
    pub fn all_hazards(&self) -> Vec<Hazard> {
        self.0.values().cloned().collect()
    }
}
