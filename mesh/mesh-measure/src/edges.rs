//! Edge usage and watertightness.

use hashbrown::HashMap;

/// How often an undirected edge is traversed in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EdgeUses {
    /// Traversals from the lower to the higher vertex index.
    forward: u32,
    /// Traversals from the higher to the lower vertex index.
    backward: u32,
}

impl EdgeUses {
    const fn total(self) -> u32 {
        self.forward + self.backward
    }
}

/// Per-edge traversal counts for a triangle list.
///
/// A closed, consistently wound surface uses every edge exactly twice, once
/// in each direction.
///
/// # Example
///
/// ```
/// use mesh_measure::EdgeUsage;
/// use mesh_types::unit_cube;
///
/// let usage = EdgeUsage::build(&unit_cube().faces);
/// assert_eq!(usage.edge_count(), 18);
/// assert!(usage.is_watertight());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeUsage {
    edges: HashMap<(u32, u32), EdgeUses>,
    degenerate_faces: usize,
}

impl EdgeUsage {
    /// Count edge traversals over `faces`.
    ///
    /// Faces that repeat a vertex index contribute no edges and are counted
    /// as degenerate.
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edges: HashMap<(u32, u32), EdgeUses> = HashMap::with_capacity(faces.len() * 3 / 2);
        let mut degenerate_faces = 0;

        for &[a, b, c] in faces {
            if a == b || b == c || c == a {
                degenerate_faces += 1;
                continue;
            }
            for (from, to) in [(a, b), (b, c), (c, a)] {
                let uses = edges.entry((from.min(to), from.max(to))).or_default();
                if from < to {
                    uses.forward += 1;
                } else {
                    uses.backward += 1;
                }
            }
        }

        Self {
            edges,
            degenerate_faces,
        }
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges used by exactly one face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.values().filter(|u| u.total() == 1).count()
    }

    /// Edges used by more than two faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edges.values().filter(|u| u.total() > 2).count()
    }

    /// Edges used by exactly two faces that traverse it in the same direction.
    #[must_use]
    pub fn inconsistent_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|u| u.total() == 2 && u.forward != 1)
            .count()
    }

    /// Faces with a repeated vertex index.
    #[must_use]
    pub const fn degenerate_face_count(&self) -> usize {
        self.degenerate_faces
    }

    /// Every edge is shared by exactly two faces with opposite winding, and
    /// there is at least one edge.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.degenerate_faces == 0
            && !self.edges.is_empty()
            && self
                .edges
                .values()
                .all(|u| u.forward == 1 && u.backward == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn closed_cube_is_watertight() {
        let usage = EdgeUsage::build(&unit_cube().faces);
        assert!(usage.is_watertight());
        assert_eq!(usage.boundary_edge_count(), 0);
        assert_eq!(usage.non_manifold_edge_count(), 0);
        assert_eq!(usage.inconsistent_edge_count(), 0);
    }

    #[test]
    fn missing_face_opens_the_surface() {
        let mut faces = unit_cube().faces;
        faces.pop();
        let usage = EdgeUsage::build(&faces);
        assert!(!usage.is_watertight());
        assert_eq!(usage.boundary_edge_count(), 3);
    }

    #[test]
    fn flipped_face_breaks_winding() {
        let mut faces = unit_cube().faces;
        faces[0].swap(1, 2);
        let usage = EdgeUsage::build(&faces);
        assert!(!usage.is_watertight());
        assert_eq!(usage.boundary_edge_count(), 0);
        assert_eq!(usage.inconsistent_edge_count(), 3);
    }

    #[test]
    fn fin_is_non_manifold() {
        let mut faces = unit_cube().faces;
        let [a, b, _] = faces[0];
        faces.push([b, a, 7]);
        let usage = EdgeUsage::build(&faces);
        assert!(!usage.is_watertight());
        assert!(usage.non_manifold_edge_count() >= 1);
    }

    #[test]
    fn single_triangle_is_open() {
        let usage = EdgeUsage::build(&[[0, 1, 2]]);
        assert_eq!(usage.edge_count(), 3);
        assert_eq!(usage.boundary_edge_count(), 3);
        assert!(!usage.is_watertight());
    }

    #[test]
    fn degenerate_faces_are_counted() {
        let mut faces = unit_cube().faces;
        faces.push([0, 0, 1]);
        let usage = EdgeUsage::build(&faces);
        assert_eq!(usage.degenerate_face_count(), 1);
        assert!(!usage.is_watertight());
        assert!(!EdgeUsage::build(&[]).is_watertight());
    }
}
