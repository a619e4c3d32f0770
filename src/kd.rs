// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Represents a point of interest, like a hospital, police or fire station.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facility {
    pub id: i64,
    pub name: String,

    /// Free-form classification, e.g. "Emergency" or "Security".
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,

    pub lat: f64,
    pub lon: f64,
}

impl Facility {
    /// Id of the [Facility::sentinel].
    pub const SENTINEL_ID: i64 = -1;

    /// Placeholder returned by [KDTree::nearest] when the tree is empty.
    pub fn sentinel() -> Self {
        Self {
            id: Self::SENTINEL_ID,
            name: String::from("None"),
            kind: String::from("None"),
            lat: 0.0,
            lon: 0.0,
        }
    }

    /// Returns `true` if this is the [Facility::sentinel].
    pub fn is_sentinel(&self) -> bool {
        self.id == Self::SENTINEL_ID
    }
}

/// KDTree implements a 2-dimensional [k-d tree](https://en.wikipedia.org/wiki/K-d_tree)
/// over [Facilities](Facility), for nearest-neighbor lookups.
///
/// Levels alternate between splitting on latitude (even depths, starting at the root)
/// and longitude (odd depths). Points are inserted one at a time and the tree is never
/// rebalanced, so its shape depends solely on the insertion order. Sorted insertions
/// degrade lookups to linear time.
///
/// Distances are euclidean over raw coordinates.
#[derive(Debug, Default, Clone)]
pub struct KDTree {
    root: Option<Box<KDNode>>,
    len: usize,
}

#[derive(Debug, Clone)]
struct KDNode {
    pivot: Facility,
    left: Option<Box<KDNode>>,
    right: Option<Box<KDNode>>,
}

impl KDTree {
    /// Returns the number of facilities in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no facilities.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Adds a [Facility] to the tree.
    ///
    /// Points with a coordinate equal to the splitting one descend into the right subtree.
    pub fn insert(&mut self, f: Facility) {
        KDNode::insert_impl(&mut self.root, f, false);
        self.len += 1;
    }

    /// Finds the closest [Facility] to the given position,
    /// or [Facility::sentinel] if the tree is empty.
    pub fn nearest(&self, lat: f64, lon: f64) -> Facility {
        self.find_nearest(lat, lon)
            .cloned()
            .unwrap_or_else(Facility::sentinel)
    }

    /// Finds the closest [Facility] to the given position.
    ///
    /// If multiple facilities are equally close, the first one visited by the search wins.
    pub fn find_nearest(&self, lat: f64, lon: f64) -> Option<&Facility> {
        let mut best: Option<&Facility> = None;
        let mut best_dist = f64::INFINITY;
        if let Some(ref root) = self.root {
            root.find_nearest_impl(lat, lon, false, &mut best, &mut best_dist);
        }
        best
    }
}

impl KDNode {
    fn insert_impl(slot: &mut Option<Box<KDNode>>, f: Facility, lon_divides: bool) {
        match slot {
            None => {
                *slot = Some(Box::new(KDNode {
                    pivot: f,
                    left: None,
                    right: None,
                }))
            }
            Some(node) => {
                let go_left = if lon_divides {
                    f.lon < node.pivot.lon
                } else {
                    f.lat < node.pivot.lat
                };
                let branch = if go_left {
                    &mut node.left
                } else {
                    &mut node.right
                };
                Self::insert_impl(branch, f, !lon_divides);
            }
        }
    }

    fn find_nearest_impl<'a>(
        &'a self,
        lat: f64,
        lon: f64,
        lon_divides: bool,
        best: &mut Option<&'a Facility>,
        best_dist: &mut f64,
    ) {
        // Check whether the pivot is closer than the best candidate
        let dist = squared_distance(lat, lon, self.pivot.lat, self.pivot.lon);
        if dist < *best_dist {
            *best = Some(&self.pivot);
            *best_dist = dist;
        }

        // Select which branch to recurse into first, same as insertion would
        let (first_left, dist_to_axis) = if lon_divides {
            (lon < self.pivot.lon, (lon - self.pivot.lon).powi(2))
        } else {
            (lat < self.pivot.lat, (lat - self.pivot.lat).powi(2))
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            branch.find_nearest_impl(lat, lon, !lon_divides, best, best_dist);
        }

        // A closer point is possible in the second branch if and only if
        // the splitting axis is closer than the current best candidate.
        if let Some(ref branch) = second {
            if dist_to_axis < *best_dist {
                branch.find_nearest_impl(lat, lon, !lon_divides, best, best_dist);
            }
        }
    }
}

impl FromIterator<Facility> for KDTree {
    /// Builds a k-d tree by inserting facilities in iteration order.
    fn from_iter<I: IntoIterator<Item = Facility>>(facilities: I) -> Self {
        let mut tree = Self::default();
        facilities.into_iter().for_each(|f| tree.insert(f));
        tree
    }
}

#[inline]
fn squared_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat1 - lat2;
    let dlon = lon1 - lon2;
    dlat * dlat + dlon * dlon
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn facility(id: i64, lat: f64, lon: f64) -> Facility {
        Facility {
            id,
            name: format!("Facility {}", id),
            kind: String::from("Emergency"),
            lat,
            lon,
        }
    }

    fn brute_force_dist(facilities: &[Facility], lat: f64, lon: f64) -> f64 {
        facilities
            .iter()
            .map(|f| squared_distance(lat, lon, f.lat, f.lon))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn kd_tree() {
        let tree: KDTree = [
            facility(1, 0.01, 0.01),
            facility(2, 0.01, 0.05),
            facility(3, 0.03, 0.09),
            facility(4, 0.04, 0.03),
            facility(5, 0.04, 0.07),
            facility(6, 0.07, 0.03),
            facility(7, 0.07, 0.01),
            facility(8, 0.08, 0.05),
            facility(9, 0.08, 0.09),
        ]
        .into_iter()
        .collect();

        assert_eq!(tree.len(), 9);
        assert_eq!(tree.nearest(0.02, 0.02).id, 1);
        assert_eq!(tree.nearest(0.05, 0.03).id, 4);
        assert_eq!(tree.nearest(0.05, 0.08).id, 5);
        assert_eq!(tree.nearest(0.09, 0.06).id, 8);
    }

    #[test]
    fn empty_tree_returns_sentinel() {
        let tree = KDTree::default();
        assert!(tree.is_empty());
        assert!(tree.find_nearest(33.7, 73.0).is_none());

        let f = tree.nearest(33.7, 73.0);
        assert!(f.is_sentinel());
        assert_eq!(f.name, "None");
    }

    #[test]
    fn islamabad_facilities() {
        let mut tree = KDTree::default();
        tree.insert(Facility {
            id: 101,
            name: String::from("PIMS Hospital"),
            kind: String::from("Emergency"),
            lat: 33.7051,
            lon: 73.0451,
        });
        tree.insert(Facility {
            id: 102,
            name: String::from("Margalla Police Station"),
            kind: String::from("Security"),
            lat: 33.7199,
            lon: 73.0647,
        });
        tree.insert(Facility {
            id: 103,
            name: String::from("G-9 Markaz Fire Station"),
            kind: String::from("Fire"),
            lat: 33.6823,
            lon: 73.0238,
        });

        assert_eq!(tree.nearest(33.7103, 73.0601).id, 102);
        assert_eq!(tree.nearest(33.6923, 73.0238).id, 103);
        assert_eq!(tree.nearest(33.7077, 73.0501).id, 101);
    }

    #[test]
    fn ties_on_axis_go_right() {
        let mut tree = KDTree::default();
        tree.insert(facility(1, 1.0, 1.0));
        tree.insert(facility(2, 1.0, 5.0));
        tree.insert(facility(3, 1.0, 0.0));

        let root = tree.root.as_ref().unwrap();
        assert!(root.left.is_none());
        let right = root.right.as_ref().unwrap();
        assert_eq!(right.pivot.id, 2);
        assert_eq!(right.left.as_ref().unwrap().pivot.id, 3);
    }

    #[test]
    fn coincident_points() {
        let mut tree = KDTree::default();
        tree.insert(facility(1, 2.0, 2.0));
        tree.insert(facility(2, 2.0, 2.0));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.nearest(2.0, 2.0).id, 1);
        assert_eq!(tree.nearest(3.0, 3.0).id, 1);
    }

    #[test]
    fn sorted_insertions() {
        let facilities: Vec<Facility> = (0..64)
            .map(|i| facility(i, i as f64 * 0.001, i as f64 * 0.002))
            .collect();
        let tree: KDTree = facilities.iter().cloned().collect();

        assert_eq!(tree.nearest(0.0101, 0.0199).id, 10);
        assert_eq!(tree.nearest(-1.0, -1.0).id, 0);
        assert_eq!(tree.nearest(1.0, 1.0).id, 63);
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5afe);

        for _ in 0..20 {
            let count = rng.gen_range(1..200);
            let facilities: Vec<Facility> = (0..count)
                .map(|i| facility(i, rng.gen_range(33.6..33.8), rng.gen_range(72.9..73.2)))
                .collect();
            let tree: KDTree = facilities.iter().cloned().collect();

            for _ in 0..50 {
                let lat = rng.gen_range(33.5..33.9);
                let lon = rng.gen_range(72.8..73.3);

                let got = tree.find_nearest(lat, lon).unwrap();
                let got_dist = squared_distance(lat, lon, got.lat, got.lon);
                assert_eq!(got_dist, brute_force_dist(&facilities, lat, lon));
            }
        }
    }
}
