//! Comparison parameters.

use mesh_sample::{DEFAULT_SEED, SampleParams};

/// What the cloud-to-mesh comparison measures distance to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NearestTarget {
    /// Nearest reference vertex, by exhaustive scan.
    #[default]
    Vertices,
    /// Nearest point on any reference triangle.
    Surface,
}

/// Parameters for [`cloud_to_cloud`](crate::cloud_to_cloud) and
/// [`cloud_to_mesh`](crate::cloud_to_mesh).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareParams {
    /// Points sampled from each compared surface (default: 50 000).
    pub sample_count: usize,
    /// Base sampling seed.
    pub seed: u64,
    /// Cloud-to-mesh distance target.
    pub nearest_target: NearestTarget,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            sample_count: 50_000,
            seed: DEFAULT_SEED,
            nearest_target: NearestTarget::default(),
        }
    }
}

impl CompareParams {
    /// Default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of samples per surface.
    #[must_use]
    pub const fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the cloud-to-mesh distance target.
    #[must_use]
    pub const fn with_nearest_target(mut self, target: NearestTarget) -> Self {
        self.nearest_target = target;
        self
    }

    /// Sampling parameters for the `stream`-th surface of a comparison.
    ///
    /// Each surface gets its own seed so two identical meshes are not
    /// sampled at identical points.
    pub(crate) const fn sampling(&self, stream: u64) -> SampleParams {
        SampleParams {
            count: self.sample_count,
            seed: self.seed.wrapping_add(stream),
        }
    }
}
