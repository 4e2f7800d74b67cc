//! Cloud-to-mesh (C2M) comparison with a bounding-box sign.

use mesh_measure::distance_to_mesh;
use mesh_sample::{nearest_by_scan, sample_points_uniformly};
use mesh_types::{Aabb, IndexedMesh, MeshBounds, Point3};
use tracing::info;

use crate::{
    CompareError, CompareParams, CompareResult, DistanceSample, DistanceStatistics, MeshRole,
    NearestTarget, Outcome, SampleTag,
};

/// Result of a signed cloud-to-mesh comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudToMesh {
    /// One signed distance per sampled point.
    pub samples: Vec<DistanceSample>,
    /// Statistics over the signed distances, with sign counts.
    pub stats: DistanceStatistics,
    /// Whether the comparison ran or this is a placeholder.
    pub outcome: Outcome,
}

impl CloudToMesh {
    /// Signed distances in sample order.
    pub fn signed_distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.distance)
    }
}

/// Apply the bounding-box sign to an unsigned distance.
///
/// Positive when any coordinate of `point` lies strictly outside `bounds`,
/// negative otherwise. A zero distance stays `0.0`.
///
/// This is an approximation: a point inside the box but outside a concave
/// surface is still reported as inside.
///
/// # Example
///
/// ```
/// use mesh_compare::bbox_signed_distance;
/// use mesh_types::Aabb;
/// use nalgebra::Point3;
///
/// let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// assert!(bbox_signed_distance(0.2, &Point3::new(1.2, 0.5, 0.5), &bounds) > 0.0);
/// assert!(bbox_signed_distance(0.2, &Point3::new(0.5, 0.5, 0.8), &bounds) < 0.0);
/// ```
#[must_use]
#[allow(clippy::float_cmp)]
pub fn bbox_signed_distance(distance: f64, point: &Point3<f64>, bounds: &Aabb) -> f64 {
    if distance == 0.0 {
        0.0
    } else if bounds.is_outside(point) {
        distance
    } else {
        -distance
    }
}

/// Signed distances from the surface of `cloud_mesh` to `reference`.
///
/// Samples `sample_count` points on `cloud_mesh` only. With
/// [`NearestTarget::Vertices`] each distance is to the nearest reference
/// vertex, found by exhaustive scan; with [`NearestTarget::Surface`] it is
/// the exact distance to the reference triangles. Either way the sign comes
/// from [`bbox_signed_distance`] against the reference vertex bounds.
///
/// # Errors
///
/// - [`CompareError::InvalidMesh`] when either mesh fails validation.
/// - [`CompareError::Sampling`] when `cloud_mesh` cannot be sampled.
///
/// # Example
///
/// ```
/// use mesh_compare::{CompareParams, cloud_to_mesh};
/// use mesh_types::unit_cube;
/// use nalgebra::Vector3;
///
/// let mut outside = unit_cube();
/// outside.translate(Vector3::new(5.0, 0.0, 0.0));
///
/// let params = CompareParams::new().with_sample_count(500);
/// let c2m = cloud_to_mesh(&unit_cube(), &outside, &params).unwrap();
/// assert_eq!(c2m.stats.signs.unwrap().positive, 500);
/// ```
pub fn cloud_to_mesh(
    reference: &IndexedMesh,
    cloud_mesh: &IndexedMesh,
    params: &CompareParams,
) -> CompareResult<CloudToMesh> {
    reference
        .validate()
        .map_err(|source| CompareError::invalid(MeshRole::Reference, source))?;
    cloud_mesh
        .validate()
        .map_err(|source| CompareError::invalid(MeshRole::Compared, source))?;

    let cloud = sample_points_uniformly(cloud_mesh, &params.sampling(1))?;
    let bounds = reference.bounds();
    let vertices: Vec<Point3<f64>> = reference.vertices.iter().map(|v| v.position).collect();

    let samples = cloud
        .points
        .iter()
        .map(|p| {
            let distance = match params.nearest_target {
                NearestTarget::Vertices => nearest_by_scan(&vertices, &p.position)
                    .map(|n| n.distance),
                NearestTarget::Surface => distance_to_mesh(reference, &p.position),
            }
            .ok_or(CompareError::EmptySample)?;
            Ok(DistanceSample::new(
                bbox_signed_distance(distance, &p.position, &bounds),
                SampleTag::CloudToMesh,
            ))
        })
        .collect::<CompareResult<Vec<_>>>()?;

    let distances: Vec<f64> = samples.iter().map(|s| s.distance).collect();
    let stats = DistanceStatistics::from_signed_distances(&distances)?;
    if let Some(signs) = stats.signs {
        info!(
            count = stats.count,
            mean = stats.mean,
            positive = signs.positive,
            negative = signs.negative,
            zero = signs.zero,
            "Cloud-to-mesh comparison complete"
        );
    }

    Ok(CloudToMesh {
        samples,
        stats,
        outcome: Outcome::Complete,
    })
}
