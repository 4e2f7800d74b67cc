//! Error types for mesh registration operations.

use mesh_sample::SampleError;
use mesh_types::MeshError;
use thiserror::Error;

/// Errors that can occur during mesh registration.
///
/// Alignment never falls back to the identity on its own; callers that want
/// a best-effort result decide what to do with these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// Source mesh or point set is empty.
    #[error("source mesh has no usable geometry")]
    EmptySourceMesh,

    /// Target mesh or point set is empty.
    #[error("target mesh has no usable geometry")]
    EmptyTargetMesh,

    /// A mesh failed structural validation for a reason other than being
    /// empty.
    #[error("invalid {role} mesh: {source}")]
    InvalidMesh {
        /// Which input failed.
        role: MeshRole,
        /// The validation failure.
        source: MeshError,
    },

    /// Too few correspondences survived distance rejection.
    #[error("found {found} correspondences within range, at least {required} required")]
    InsufficientCorrespondences {
        /// Correspondences accepted.
        found: usize,
        /// Minimum needed for a rigid solve.
        required: usize,
    },

    /// SVD computation failed during transform estimation.
    #[error("SVD computation failed during transform estimation")]
    SvdFailed,

    /// The estimated or supplied rotation is not a proper rotation.
    #[error("transform estimate is not a proper rotation")]
    DegenerateRotation,

    /// Surface sampling failed.
    #[error("sampling failed: {0}")]
    Sampling(#[from] SampleError),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Which side of an alignment a mesh is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshRole {
    /// The mesh being moved.
    Source,
    /// The mesh it is moved onto.
    Target,
}

impl std::fmt::Display for MeshRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Target => "target",
        })
    }
}

impl RegistrationError {
    /// Map a validation failure of one input. Empty meshes keep their
    /// dedicated variants.
    pub(crate) fn invalid(role: MeshRole, source: MeshError) -> Self {
        match (role, source) {
            (MeshRole::Source, MeshError::NoVertices | MeshError::NoFaces) => Self::EmptySourceMesh,
            (MeshRole::Target, MeshError::NoVertices | MeshError::NoFaces) => Self::EmptyTargetMesh,
            (role, source) => Self::InvalidMesh { role, source },
        }
    }
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_mesh_names_the_role() {
        let err = RegistrationError::invalid(
            MeshRole::Target,
            MeshError::NonFiniteVertex { vertex: 2 },
        );
        assert_eq!(
            err.to_string(),
            "invalid target mesh: vertex 2 has a non-finite coordinate"
        );
    }

    #[test]
    fn empty_meshes_keep_their_variants() {
        assert_eq!(
            RegistrationError::invalid(MeshRole::Source, MeshError::NoFaces),
            RegistrationError::EmptySourceMesh
        );
        assert_eq!(
            RegistrationError::invalid(MeshRole::Target, MeshError::NoVertices),
            RegistrationError::EmptyTargetMesh
        );
    }
}
