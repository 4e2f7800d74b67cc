//! Point cloud containers.

use mesh_types::Aabb;
use nalgebra::{Point3, Vector3};

/// A sampled point with an optional unit normal.
///
/// # Example
///
/// ```
/// use mesh_sample::CloudPoint;
/// use nalgebra::{Point3, Vector3};
///
/// let p = CloudPoint::with_normal(Point3::new(1.0, 2.0, 3.0), Vector3::z());
/// assert!(p.normal.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    /// Position.
    pub position: Point3<f64>,
    /// Unit normal, once estimated.
    pub normal: Option<Vector3<f64>>,
}

impl CloudPoint {
    /// A point without a normal.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
        }
    }

    /// A point with a normal.
    #[must_use]
    pub const fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
        }
    }
}

/// An unordered set of sampled points.
///
/// Normals are either present on every point or on none; see
/// [`has_normals`](PointCloud::has_normals).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// The points.
    pub points: Vec<CloudPoint>,
}

impl PointCloud {
    /// An empty cloud.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// A cloud of normal-less points.
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        Self {
            points: positions.iter().copied().map(CloudPoint::new).collect(),
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the cloud is non-empty and every point carries a normal.
    #[must_use]
    pub fn has_normals(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.normal.is_some())
    }

    /// Positions, in point order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Mean position, or `None` for an empty cloud.
    #[must_use]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.points.iter().map(|p| p.position.coords).sum();
        #[allow(clippy::cast_precision_loss)]
        let n = self.points.len() as f64;
        Some(Point3::from(sum / n))
    }

    /// Bounding box of all positions.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter().map(|p| &p.position))
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CloudPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn centroid_of_square() {
        let cloud = PointCloud::from_positions(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]);
        assert_eq!(cloud.len(), 4);
        assert!(!cloud.has_normals());
        let c = cloud.centroid().unwrap_or_else(Point3::origin);
        assert_relative_eq!(c, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn empty_cloud() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert!(cloud.centroid().is_none());
        assert!(!cloud.has_normals());
        assert!(cloud.bounds().is_empty());
    }

    #[test]
    fn partial_normals_do_not_count() {
        let cloud: PointCloud = [
            CloudPoint::with_normal(Point3::origin(), Vector3::z()),
            CloudPoint::new(Point3::new(1.0, 0.0, 0.0)),
        ]
        .into_iter()
        .collect();
        assert!(!cloud.has_normals());
    }
}
