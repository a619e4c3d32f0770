// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    earth_distance, find_safest_path, Dataset, Facility, Graph, GraphError, Hazard,
    HazardRegistry, KDTree, Node, PathResult, DEFAULT_HAZARD_RADIUS,
};

/// Owns a road [Graph], a [HazardRegistry] and a [KDTree] of facilities,
/// and serves routing and proximity requests over them.
///
/// Each registry sits behind its own [RwLock]: mutations take the lock
/// exclusively, while queries share it. Queries never observe a registry
/// in the middle of a mutation.
#[derive(Debug, Default)]
pub struct Engine {
    graph: RwLock<Graph>,
    hazards: RwLock<HazardRegistry>,
    facilities: RwLock<KDTree>,
}

impl Engine {
    /// Creates an engine from already-built registries.
    pub fn new(graph: Graph, hazards: HazardRegistry, facilities: KDTree) -> Self {
        Self {
            graph: RwLock::new(graph),
            hazards: RwLock::new(hazards),
            facilities: RwLock::new(facilities),
        }
    }

    /// Creates an engine and loads all features from a [Dataset].
    ///
    /// Roads of the dataset are added with their hazard penalties as-is.
    /// Roads with an endpoint missing from `dataset.nodes` are skipped.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let engine = Self::default();
        {
            let mut g = engine.graph_mut();
            dataset.nodes.iter().cloned().for_each(|n| g.set_node(n));

            for e in &dataset.edges {
                if !g.has_node(e.from) || !g.has_node(e.to) {
                    log::warn!(
                        "road {} <-> {} refers to an unknown node, ignoring",
                        e.from,
                        e.to
                    );
                    continue;
                }
                g.add_edge(e.from, e.to, e.distance, e.hazard_penalty, e.safety_bonus);
            }
        }
        {
            let mut h = engine.hazards_mut();
            dataset.hazards.iter().cloned().for_each(|x| h.add_hazard(x));
        }
        {
            let mut kd = engine.facilities_mut();
            dataset.facilities.iter().cloned().for_each(|f| kd.insert(f));
        }

        log::debug!(
            "loaded {} nodes, {} roads, {} hazards and {} facilities",
            dataset.nodes.len(),
            dataset.edges.len(),
            dataset.hazards.len(),
            dataset.facilities.len(),
        );
        engine
    }

    /// Tears down the engine, returning the owned registries.
    pub fn into_parts(self) -> (Graph, HazardRegistry, KDTree) {
        (
            self.graph.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.hazards.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.facilities
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    // Poisoned locks are recovered: every mutation is a single insertion,
    // so a registry is never left half-updated.

    fn graph(&self) -> RwLockReadGuard<'_, Graph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn graph_mut(&self) -> RwLockWriteGuard<'_, Graph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn hazards(&self) -> RwLockReadGuard<'_, HazardRegistry> {
        self.hazards.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn hazards_mut(&self) -> RwLockWriteGuard<'_, HazardRegistry> {
        self.hazards.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn facilities(&self) -> RwLockReadGuard<'_, KDTree> {
        self.facilities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn facilities_mut(&self) -> RwLockWriteGuard<'_, KDTree> {
        self.facilities.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates or overwrites a [Node].
    pub fn add_node(&self, id: i64, lat: f64, lon: f64, name: impl Into<String>) {
        self.graph_mut().add_node(id, lat, lon, name);
    }

    /// Retrieves a copy of the [Node] with the provided id.
    pub fn node(&self, id: i64) -> Result<Node, GraphError> {
        self.graph().get_node(id).cloned()
    }

    /// Adds a road with explicit values, see [Graph::add_edge].
    pub fn add_edge(&self, u: i64, v: i64, distance: f64, hazard_penalty: f64, safety_bonus: f64) {
        self.graph_mut()
            .add_edge(u, v, distance, hazard_penalty, safety_bonus);
    }

    /// Adds a road whose hazard penalty is evaluated by the [HazardRegistry]
    /// at the midpoint between `u` and `v`, with [DEFAULT_HAZARD_RADIUS].
    ///
    /// If either endpoint is unknown, the road gets no hazard penalty.
    /// Hazards registered afterwards do not affect existing roads.
    ///
    /// The graph stays locked for writing from reading the endpoints until the road
    /// is inserted, so concurrent node updates can't skew the penalty.
    pub fn add_road(&self, u: i64, v: i64, distance: f64, safety_bonus: f64) {
        // Lock order: graph, then hazards
        let mut g = self.graph_mut();
        let midpoint = match (g.get_node(u), g.get_node(v)) {
            (Ok(a), Ok(b)) => Some(((a.lat + b.lat) * 0.5, (a.lon + b.lon) * 0.5)),
            _ => None,
        };

        let hazard_penalty = midpoint
            .map(|(lat, lon)| self.penalty_at(lat, lon, DEFAULT_HAZARD_RADIUS))
            .unwrap_or(0.0);

        g.add_edge(u, v, distance, hazard_penalty, safety_bonus);
    }

    /// Same as [Engine::add_road], but the road's distance is the
    /// [great-circle distance](earth_distance) between its endpoints.
    pub fn add_measured_road(&self, u: i64, v: i64, safety_bonus: f64) -> Result<(), GraphError> {
        let distance = {
            let g = self.graph();
            let a = g.get_node(u)?;
            let b = g.get_node(v)?;
            earth_distance(a.lat, a.lon, b.lat, b.lon)
        };
        self.add_road(u, v, distance, safety_bonus);
        Ok(())
    }

    /// Registers a [Hazard], see [HazardRegistry::add_hazard].
    pub fn add_hazard(&self, h: Hazard) {
        self.hazards_mut().add_hazard(h);
    }

    /// Returns all registered hazards, in ascending id order.
    pub fn hazards_snapshot(&self) -> Vec<Hazard> {
        self.hazards().all_hazards()
    }

    /// Computes the cumulative hazard penalty for a position, see [HazardRegistry::penalty_at].
    pub fn penalty_at(&self, lat: f64, lon: f64, radius: f64) -> f64 {
        self.hazards().penalty_at(lat, lon, radius)
    }

    /// Adds a point of interest.
    pub fn add_facility(&self, f: Facility) {
        self.facilities_mut().insert(f);
    }

    /// Finds the closest facility to a position, or [Facility::sentinel] if there are none.
    pub fn nearest(&self, lat: f64, lon: f64) -> Facility {
        self.facilities().nearest(lat, lon)
    }

    /// Finds the safest route between two nodes, see [find_safest_path].
    pub fn route(&self, start_id: i64, end_id: i64) -> PathResult {
        find_safest_path(&self.graph(), start_id, end_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeDescriptor;
    use std::sync::Arc;
    use std::thread;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn demo_dataset() {
        let e = Engine::from_dataset(&Dataset::islamabad());

        let r = e.route(1, 3);
        assert!(r.success);
        assert_eq!(r.path, vec![1, 3]);

        assert_eq!(e.nearest(33.7103, 73.0601).id, 102);
        assert_eq!(e.hazards_snapshot().len(), 2);
        assert_eq!(e.node(5).unwrap().name, "Centaurus Mall");
        assert_eq!(e.node(6), Err(GraphError::NotFound(6)));
    }

    #[test]
    fn add_road_folds_hazard_penalty() {
        let e = Engine::default();
        e.add_node(1, 0.0, 0.0, "A");
        e.add_node(2, 0.0, 0.004, "B");
        e.add_node(3, 0.01, 0.0, "C");
        e.add_hazard(Hazard {
            id: 1,
            lat: 0.0,
            lon: 0.002,
            severity: 10,
            kind: String::from("Protest"),
        });

        e.add_road(1, 2, 1.0, 0.0);
        e.add_road(1, 3, 1.0, 0.0);
        e.add_road(1, 99, 1.0, 0.0);

        let (g, _, _) = e.into_parts();
        assert_almost_eq!(g.get_edge(1, 2).unwrap().hazard_penalty, 10.0);
        assert_almost_eq!(g.get_edge(2, 1).unwrap().hazard_penalty, 10.0);
        assert_eq!(g.get_edge(1, 3).unwrap().hazard_penalty, 0.0);
        assert_eq!(g.get_edge(1, 99).unwrap().hazard_penalty, 0.0);
    }

    #[test]
    fn route_avoids_hazard() {
        let e = Engine::default();
        e.add_node(1, 0.0, 0.0, "A");
        e.add_node(2, 0.0, 0.01, "B");
        e.add_node(3, 0.01, 0.005, "C");
        e.add_hazard(Hazard {
            id: 1,
            lat: 0.0,
            lon: 0.005,
            severity: 8,
            kind: String::from("Traffic"),
        });

        e.add_road(1, 2, 1.0, 0.0);
        e.add_road(1, 3, 0.8, 0.0);
        e.add_road(3, 2, 0.8, 0.0);

        let r = e.route(1, 2);
        assert!(r.success);
        assert_eq!(r.path, vec![1, 3, 2]);
        assert_almost_eq!(r.total_distance, 1.6);
        assert_almost_eq!(r.safety_score, 100.0);
    }

    #[test]
    fn add_measured_road() {
        let e = Engine::default();
        e.add_node(1, 33.7103, 73.0601, "Blue Area");
        e.add_node(2, 33.7299, 73.0747, "F-6 Sector");

        assert_eq!(e.add_measured_road(1, 3, 0.0), Err(GraphError::NotFound(3)));
        e.add_measured_road(1, 2, 0.0).unwrap();

        let r = e.route(1, 2);
        assert!(r.success);
        assert!((r.total_distance - 2.56).abs() < 0.05, "got {}", r.total_distance);
    }

    #[test]
    fn nearest_on_empty_engine() {
        let e = Engine::new(Graph::default(), HazardRegistry::default(), KDTree::default());
        assert!(e.nearest(33.7, 73.0).is_sentinel());
        assert!(!e.route(1, 2).success);
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let e = Arc::new(Engine::from_dataset(&Dataset::islamabad()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let e = Arc::clone(&e);
                thread::spawn(move || {
                    for j in 0..50 {
                        let id = 1000 + i * 100 + j;
                        e.add_facility(Facility {
                            id,
                            name: format!("Kiosk {}", id),
                            kind: String::from("Security"),
                            lat: 40.0 + j as f64,
                            lon: 80.0,
                        });
                        assert!(e.route(2, 4).success);
                        assert_eq!(e.nearest(33.6923, 73.0238).id, 103);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let (_, _, kd) = Arc::try_unwrap(e).unwrap().into_parts();
        assert_eq!(kd.len(), 3 + 4 * 50);
    }

    #[test]
    fn dataset_roads_to_unknown_nodes_are_skipped() {
        let mut d = Dataset::islamabad();
        d.edges.push(EdgeDescriptor {
            from: 1,
            to: 42,
            distance: 0.1,
            hazard_penalty: 0.0,
            safety_bonus: 0.0,
        });

        let (g, _, _) = Engine::from_dataset(&d).into_parts();
        assert!(g.get_edge(1, 42).is_none());
        assert!(g.get_neighbors(42).is_empty());
        assert_eq!(g.get_neighbors(1).len(), 3);
    }

    #[test]
    fn add_road_uses_current_coordinates() {
        let e = Engine::default();
        e.add_node(1, 0.0, 0.0, "A");
        e.add_node(2, 0.0, 0.004, "B");
        e.add_hazard(Hazard {
            id: 1,
            lat: 1.0,
            lon: 1.002,
            severity: 6,
            kind: String::from("Construction"),
        });

        e.add_road(1, 2, 1.0, 0.0);
        e.add_node(1, 1.0, 1.0, "A");
        e.add_node(2, 1.0, 1.004, "B");
        e.add_road(1, 2, 1.0, 0.0);

        let (g, _, _) = e.into_parts();
        let penalties: Vec<f64> = g.get_neighbors(1).iter().map(|r| r.hazard_penalty).collect();
        assert_eq!(penalties.len(), 2);
        assert_eq!(penalties[0], 0.0);
        assert_almost_eq!(penalties[1], 6.0);
    }
}
