//! Traits shared by mesh-like containers.

use crate::{Aabb, Triangle};

/// Read-only topology access.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// Whether the mesh lacks vertices or triangles.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Triangle `face_index` with resolved positions, or `None` when the face
    /// or one of its vertex indices is out of range.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Iterate over every triangle whose indices resolve.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Types with an axis-aligned bounding box.
pub trait MeshBounds {
    /// Bounding box of all vertices; empty when there are none.
    fn bounds(&self) -> Aabb;

    /// Bounding box, or `None` when empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }
}
