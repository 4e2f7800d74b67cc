//! Error types for distance comparison.

use mesh_sample::SampleError;
use mesh_types::MeshError;
use thiserror::Error;

/// Errors that can occur while comparing two meshes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    /// One of the meshes failed validation.
    #[error("invalid {role} mesh: {source}")]
    InvalidMesh {
        /// Which input was rejected.
        role: MeshRole,
        /// The validation failure.
        source: MeshError,
    },

    /// Surface sampling failed.
    #[error("sampling failed: {0}")]
    Sampling(#[from] SampleError),

    /// A comparison produced no distances.
    #[error("comparison produced no distance samples")]
    EmptySample,
}

/// The two inputs of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshRole {
    /// The reference mesh (mesh1).
    Reference,
    /// The compared mesh (mesh2).
    Compared,
}

impl std::fmt::Display for MeshRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Compared => "compared",
        })
    }
}

/// Result type for comparison operations.
pub type CompareResult<T> = Result<T, CompareError>;

impl CompareError {
    pub(crate) const fn invalid(role: MeshRole, source: MeshError) -> Self {
        Self::InvalidMesh { role, source }
    }
}
