// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Facility, Hazard, Node};

/// Describes a bidirectional road between two [Nodes](Node).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeDescriptor {
    pub from: i64,
    pub to: i64,

    /// Physical length of the road, in kilometers.
    pub distance: f64,

    #[cfg_attr(feature = "serde", serde(default))]
    pub hazard_penalty: f64,

    #[cfg_attr(feature = "serde", serde(default))]
    pub safety_bonus: f64,
}

/// All features of a city, ready to be loaded into an [Engine](crate::Engine).
///
/// With the `serde` feature, a Dataset can be deserialized from a document like:
///
/// ```json
/// {
///   "nodes": [{"id": 1, "lat": 33.7103, "lon": 73.0601, "name": "Blue Area"}],
///   "edges": [{"from": 1, "to": 2, "distance": 2.5, "hazard_penalty": 0.5}],
///   "hazards": [{"id": 501, "lat": 33.7, "lon": 73.04, "severity": 8, "type": "Traffic"}],
///   "facilities": [{"id": 101, "name": "PIMS Hospital", "type": "Emergency", "lat": 33.7051, "lon": 73.0451}]
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Dataset {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeDescriptor>,
    pub hazards: Vec<Hazard>,
    pub facilities: Vec<Facility>,
}

impl Dataset {
    /// Demo data covering a handful of landmarks in Islamabad.
    pub fn islamabad() -> Self {
        let node = |id, lat, lon, name: &str| Node {
            id,
            lat,
            lon,
            name: name.to_string(),
        };
        let edge = |from, to, distance, hazard_penalty, safety_bonus| EdgeDescriptor {
            from,
            to,
            distance,
            hazard_penalty,
            safety_bonus,
        };
        let facility = |id, name: &str, kind: &str, lat, lon| Facility {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            lat,
            lon,
        };
        let hazard = |id, lat, lon, severity, kind: &str| Hazard {
            id,
            lat,
            lon,
            severity,
            kind: kind.to_string(),
        };

        Self {
            nodes: vec![
                node(1, 33.7103, 73.0601, "Blue Area"),
                node(2, 33.7299, 73.0747, "F-6 Sector"),
                node(3, 33.6923, 73.0238, "G-9 Sector"),
                node(4, 33.7144, 73.0234, "E-9 (Air University)"),
                node(5, 33.7077, 73.0501, "Centaurus Mall"),
            ],
            edges: vec![
                edge(1, 2, 2.5, 0.5, 0.2),
                edge(1, 5, 1.2, 0.1, 0.5),
                edge(5, 3, 3.0, 1.5, 0.0), // busy, higher hazard
                edge(1, 3, 5.0, 0.2, 1.0), // longer, but safer
                edge(3, 4, 2.8, 0.3, 0.1),
                edge(5, 4, 3.5, 0.0, 0.8),
            ],
            hazards: vec![
                hazard(501, 33.7000, 73.0400, 8, "Traffic Jam - Blue Area Plaza"),
                hazard(502, 33.7200, 73.0700, 5, "Road Construction - F-7 Link"),
            ],
            facilities: vec![
                facility(101, "PIMS Hospital", "Emergency", 33.7051, 73.0451),
                facility(102, "Margalla Police Station", "Security", 33.7199, 73.0647),
                facility(103, "G-9 Markaz Fire Station", "Fire", 33.6823, 73.0238),
            ],
        }
    }
}
