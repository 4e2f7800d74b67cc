//! PCA normal estimation for sampled clouds.

use std::num::NonZero;

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use tracing::debug;

use crate::error::{SampleError, SampleResult};
use crate::{NearestNeighborIndex, PointCloud};

/// Parameters for hybrid radius/count normal estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalParams {
    /// Neighbour search radius. Default: 0.1.
    pub radius: f64,
    /// Maximum neighbours per point. Default: 30.
    pub max_neighbors: usize,
    /// Flip normals to point away from the cloud centroid. Default: true.
    pub orient_outward: bool,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            radius: 0.1,
            max_neighbors: 30,
            orient_outward: true,
        }
    }
}

impl NormalParams {
    /// Default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the neighbour cap.
    #[must_use]
    pub const fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    /// Set whether normals are oriented away from the centroid.
    #[must_use]
    pub const fn with_orient_outward(mut self, orient: bool) -> Self {
        self.orient_outward = orient;
        self
    }
}

/// Estimate a unit normal for every point of `cloud`.
///
/// Each normal is the eigenvector of the smallest eigenvalue of the
/// neighbourhood covariance, where the neighbourhood is at most
/// `max_neighbors` points within `radius` (the point itself included).
/// Points with fewer than three neighbours get `+Z`.
///
/// # Errors
///
/// Returns [`SampleError::EmptyPointCloud`] for an empty cloud and
/// [`SampleError::InvalidParameter`] for a non-positive radius or a zero
/// neighbour cap.
pub fn estimate_normals(cloud: &mut PointCloud, params: &NormalParams) -> SampleResult<()> {
    if params.radius <= 0.0 || !params.radius.is_finite() {
        return Err(SampleError::InvalidParameter {
            reason: format!("normal radius must be positive, got {}", params.radius),
        });
    }
    let k = NonZero::new(params.max_neighbors).ok_or_else(|| SampleError::InvalidParameter {
        reason: "max_neighbors must be greater than 0".to_string(),
    })?;

    let positions = cloud.positions();
    let index = NearestNeighborIndex::new(&positions)?;

    let mut sparse = 0usize;
    let normals: Vec<Vector3<f64>> = positions
        .iter()
        .map(|p| {
            let neighbors: Vec<Point3<f64>> = index
                .nearest_within(p, params.radius, k)
                .iter()
                .map(|n| positions[n.index])
                .collect();
            pca_normal(&neighbors).unwrap_or_else(|| {
                sparse += 1;
                Vector3::z()
            })
        })
        .collect();

    for (point, normal) in cloud.points.iter_mut().zip(normals) {
        point.normal = Some(normal);
    }

    if params.orient_outward {
        orient_outward(cloud);
    }

    debug!(points = cloud.len(), sparse, radius = params.radius, "Estimated normals");
    Ok(())
}

/// Smallest-variance direction of a neighbourhood, `None` below three points.
fn pca_normal(neighbors: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if neighbors.len() < 3 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let centroid = neighbors.iter().map(|p| p.coords).sum::<Vector3<f64>>() / neighbors.len() as f64;

    let mut cov = Matrix3::zeros();
    for p in neighbors {
        let d = p.coords - centroid;
        cov += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let min_idx = eigen.eigenvalues.imin();
    let normal: Vector3<f64> = eigen.eigenvectors.column(min_idx).into_owned();
    let norm = normal.norm();
    (norm > 1e-10).then(|| normal / norm)
}

fn orient_outward(cloud: &mut PointCloud) {
    let Some(centroid) = cloud.centroid() else {
        return;
    };
    for point in &mut cloud.points {
        if let Some(normal) = point.normal.as_mut() {
            if normal.dot(&(point.position - centroid)) < 0.0 {
                *normal = -*normal;
            }
        }
    }
}
