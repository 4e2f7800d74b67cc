//! Structural validation errors for meshes.

use thiserror::Error;

/// Result type for mesh validation.
pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh that cannot be measured, sampled or compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    NoVertices,

    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    NoFaces,

    /// A triangle references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Index of the offending face.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Index of the offending vertex.
        vertex: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::IndexOutOfRange {
            face: 3,
            index: 42,
            vertex_count: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("face 3"));
        assert!(msg.contains("42"));
        assert!(msg.contains('8'));

        assert!(MeshError::NoFaces.to_string().contains("no triangles"));
    }
}
