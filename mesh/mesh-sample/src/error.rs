//! Error types for sampling and neighbour search.

use mesh_types::MeshError;
use thiserror::Error;

/// Result type for sampling operations.
pub type SampleResult<T> = Result<T, SampleError>;

/// Errors that can occur while sampling a surface or building an index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// The mesh failed structural validation.
    #[error("cannot sample invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),

    /// Every triangle of the mesh has zero area.
    #[error("mesh has zero surface area")]
    ZeroSurfaceArea,

    /// A sample count of zero was requested.
    #[error("sample count must be greater than zero")]
    ZeroCount,

    /// A point cloud or index was built from no points.
    #[error("point cloud is empty")]
    EmptyPointCloud,

    /// Not enough points for the requested operation.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Why the parameter is invalid.
        reason: String,
    },
}
