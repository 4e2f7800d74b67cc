//! Error types for measurement operations.

use mesh_types::MeshError;
use thiserror::Error;

/// Result type alias for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors that can occur during measurement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// The mesh failed validation (no vertices, no faces, bad indices).
    #[error("cannot measure mesh: {0}")]
    InvalidMesh(#[from] MeshError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_cause() {
        let err = MeasureError::from(MeshError::NoFaces);
        assert_eq!(err.to_string(), "cannot measure mesh: mesh has no triangles");
    }
}
