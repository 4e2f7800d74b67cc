//! Never-failing comparison entry points.
//!
//! Downstream reports expect a distance table for every run. When a
//! comparison cannot run, these wrappers return a single zero-distance
//! [`SampleTag::Error`] sample instead, and carry the cause in
//! [`Outcome::Degraded`].

use mesh_types::IndexedMesh;
use tracing::warn;

use crate::{
    CloudToCloud, CloudToMesh, CompareError, CompareParams, DistanceSample, DistanceStatistics,
    SignCounts, cloud_to_cloud, cloud_to_mesh,
};

/// Whether a comparison result is real or a placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
    /// The comparison ran to completion.
    #[default]
    Complete,
    /// The comparison failed; the result holds sentinel values.
    Degraded(CompareError),
}

impl Outcome {
    /// Whether this is [`Outcome::Degraded`].
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// The failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&CompareError> {
        match self {
            Self::Complete => None,
            Self::Degraded(err) => Some(err),
        }
    }
}

/// Statistics of the lone sentinel sample.
fn sentinel_stats() -> DistanceStatistics {
    DistanceStatistics {
        count: 1,
        mean: 0.0,
        std_dev: 0.0,
        min: 0.0,
        max: 0.0,
        median: 0.0,
        rms: 0.0,
        signs: None,
    }
}

impl CloudToCloud {
    /// Placeholder for a failed cloud-to-cloud comparison.
    #[must_use]
    pub fn sentinel(error: CompareError) -> Self {
        Self {
            samples: vec![DistanceSample::sentinel()],
            stats: sentinel_stats(),
            a_to_b_count: 0,
            b_to_a_count: 0,
            outcome: Outcome::Degraded(error),
        }
    }
}

impl CloudToMesh {
    /// Placeholder for a failed cloud-to-mesh comparison.
    #[must_use]
    pub fn sentinel(error: CompareError) -> Self {
        Self {
            samples: vec![DistanceSample::sentinel()],
            stats: DistanceStatistics {
                signs: Some(SignCounts {
                    zero: 1,
                    ..SignCounts::default()
                }),
                ..sentinel_stats()
            },
            outcome: Outcome::Degraded(error),
        }
    }
}

/// [`cloud_to_cloud`], falling back to [`CloudToCloud::sentinel`].
#[must_use]
pub fn cloud_to_cloud_or_sentinel(
    a: &IndexedMesh,
    b: &IndexedMesh,
    params: &CompareParams,
) -> CloudToCloud {
    cloud_to_cloud(a, b, params).unwrap_or_else(|err| {
        warn!(error = %err, "Cloud-to-cloud comparison failed; writing sentinel");
        CloudToCloud::sentinel(err)
    })
}

/// [`cloud_to_mesh`], falling back to [`CloudToMesh::sentinel`].
#[must_use]
pub fn cloud_to_mesh_or_sentinel(
    reference: &IndexedMesh,
    cloud_mesh: &IndexedMesh,
    params: &CompareParams,
) -> CloudToMesh {
    cloud_to_mesh(reference, cloud_mesh, params).unwrap_or_else(|err| {
        warn!(error = %err, "Cloud-to-mesh comparison failed; writing sentinel");
        CloudToMesh::sentinel(err)
    })
}
