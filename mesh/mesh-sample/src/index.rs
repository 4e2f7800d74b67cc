//! Nearest-neighbour search over a fixed point set.

use std::num::NonZero;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

use crate::error::{SampleError, SampleResult};
use crate::PointCloud;

/// The result of a neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point in the indexed set.
    pub index: usize,
    /// Euclidean distance to the query.
    pub distance: f64,
}

/// Exact nearest-neighbour queries in O(log N).
///
/// Built once over a point set and then read-only. The index is owned by
/// whoever built it and holds its own copy of the coordinates.
///
/// # Example
///
/// ```
/// use mesh_sample::NearestNeighborIndex;
/// use nalgebra::Point3;
///
/// let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
/// let index = NearestNeighborIndex::new(&points).unwrap();
///
/// let hit = index.nearest(&Point3::new(0.9, 0.1, 0.0));
/// assert_eq!(hit.index, 1);
/// ```
pub struct NearestNeighborIndex {
    tree: ImmutableKdTree<f64, 3>,
    len: usize,
}

impl NearestNeighborIndex {
    /// Build an index over `points`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::EmptyPointCloud`] when `points` is empty.
    pub fn new(points: &[Point3<f64>]) -> SampleResult<Self> {
        if points.is_empty() {
            return Err(SampleError::EmptyPointCloud);
        }
        let coords: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        Ok(Self {
            tree: ImmutableKdTree::new_from_slice(&coords),
            len: coords.len(),
        })
    }

    /// Build an index over the positions of a cloud.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::EmptyPointCloud`] for an empty cloud.
    pub fn from_cloud(cloud: &PointCloud) -> SampleResult<Self> {
        Self::new(&cloud.positions())
    }

    /// Number of indexed points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; empty indices cannot be built.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The closest indexed point to `query`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn nearest(&self, query: &Point3<f64>) -> Neighbor {
        let hit = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x, query.y, query.z]);
        Neighbor {
            index: hit.item as usize,
            distance: hit.distance.sqrt(),
        }
    }

    /// Up to `k` closest points, nearest first.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn nearest_n(&self, query: &Point3<f64>, k: NonZero<usize>) -> Vec<Neighbor> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|hit| Neighbor {
                index: hit.item as usize,
                distance: hit.distance.sqrt(),
            })
            .collect()
    }

    /// Up to `max_neighbors` closest points that lie within `radius`.
    ///
    /// This is the hybrid (radius + count) search used for normal estimation.
    #[must_use]
    pub fn nearest_within(
        &self,
        query: &Point3<f64>,
        radius: f64,
        max_neighbors: NonZero<usize>,
    ) -> Vec<Neighbor> {
        let mut hits = self.nearest_n(query, max_neighbors);
        hits.retain(|n| n.distance <= radius);
        hits
    }
}

impl std::fmt::Debug for NearestNeighborIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearestNeighborIndex")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Brute-force nearest point by linear scan, ties resolved to the lowest index.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn nearest_by_scan(points: &[Point3<f64>], query: &Point3<f64>) -> Option<Neighbor> {
    points
        .iter()
        .enumerate()
        .map(|(index, p)| (index, (p - query).norm_squared()))
        .fold(None, |best: Option<(usize, f64)>, (index, d2)| match best {
            Some((_, best_d2)) if best_d2 <= d2 => best,
            _ => Some((index, d2)),
        })
        .map(|(index, d2)| Neighbor {
            index,
            distance: d2.sqrt(),
        })
}
