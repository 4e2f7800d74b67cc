//! Cloud-to-cloud (C2C) comparison.

use mesh_sample::{NearestNeighborIndex, PointCloud, sample_points_uniformly};
use mesh_types::IndexedMesh;
use tracing::{debug, info};

use crate::{
    CompareError, CompareParams, CompareResult, DistanceSample, DistanceStatistics, MeshRole,
    Outcome, SampleTag,
};

/// Result of a symmetric cloud-to-cloud comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudToCloud {
    /// Every distance, A→B samples first, then B→A.
    pub samples: Vec<DistanceSample>,
    /// Statistics over both directions pooled.
    pub stats: DistanceStatistics,
    /// Number of A→B samples.
    pub a_to_b_count: usize,
    /// Number of B→A samples.
    pub b_to_a_count: usize,
    /// Whether the comparison ran or this is a placeholder.
    pub outcome: Outcome,
}

impl CloudToCloud {
    /// Distances of one direction.
    pub fn distances(&self, tag: SampleTag) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .filter(move |s| s.tag == tag)
            .map(|s| s.distance)
    }
}

fn sample(mesh: &IndexedMesh, role: MeshRole, params: &CompareParams) -> CompareResult<PointCloud> {
    mesh.validate()
        .map_err(|source| CompareError::invalid(role, source))?;
    let stream = match role {
        MeshRole::Reference => 0,
        MeshRole::Compared => 1,
    };
    Ok(sample_points_uniformly(mesh, &params.sampling(stream))?)
}

fn nearest_distances(
    queries: &PointCloud,
    targets: &PointCloud,
    tag: SampleTag,
) -> CompareResult<Vec<DistanceSample>> {
    let index = NearestNeighborIndex::from_cloud(targets)?;
    Ok(queries
        .points
        .iter()
        .map(|p| DistanceSample::new(index.nearest(&p.position).distance, tag))
        .collect())
}

/// Symmetric nearest-neighbour distances between the surfaces of `a` and `b`.
///
/// Samples `sample_count` points on each mesh, measures every A sample
/// against its nearest B sample and every B sample against its nearest A
/// sample, and pools both directions into one set of statistics. Swapping
/// `a` and `b` gives the same pooled count.
///
/// # Errors
///
/// - [`CompareError::InvalidMesh`] when either mesh fails validation.
/// - [`CompareError::Sampling`] when a surface cannot be sampled.
///
/// # Example
///
/// ```
/// use mesh_compare::{CompareParams, cloud_to_cloud};
/// use mesh_types::unit_cube;
///
/// let params = CompareParams::new().with_sample_count(2_000);
/// let c2c = cloud_to_cloud(&unit_cube(), &unit_cube(), &params).unwrap();
///
/// assert_eq!(c2c.stats.count, 4_000);
/// assert!(c2c.stats.mean < 0.05);
/// ```
pub fn cloud_to_cloud(
    a: &IndexedMesh,
    b: &IndexedMesh,
    params: &CompareParams,
) -> CompareResult<CloudToCloud> {
    let cloud_a = sample(a, MeshRole::Reference, params)?;
    let cloud_b = sample(b, MeshRole::Compared, params)?;
    debug!(a = cloud_a.len(), b = cloud_b.len(), "Sampled comparison clouds");

    let mut samples = nearest_distances(&cloud_a, &cloud_b, SampleTag::AToB)?;
    let a_to_b_count = samples.len();
    samples.extend(nearest_distances(&cloud_b, &cloud_a, SampleTag::BToA)?);
    let b_to_a_count = samples.len() - a_to_b_count;

    let stats = DistanceStatistics::from_samples(&samples)?;
    info!(
        count = stats.count,
        mean = stats.mean,
        max = stats.max,
        "Cloud-to-cloud comparison complete"
    );

    Ok(CloudToCloud {
        samples,
        stats,
        a_to_b_count,
        b_to_a_count,
        outcome: Outcome::Complete,
    })
}
