//! Whole-mesh metrics.

use mesh_types::{IndexedMesh, MeshTopology, Vector3};
use tracing::debug;

use crate::{EdgeUsage, MeasureResult, dimensions};

/// Distribution of per-triangle areas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleAreaStats {
    /// Smallest triangle area.
    pub min: f64,
    /// Largest triangle area.
    pub max: f64,
    /// Mean triangle area.
    pub mean: f64,
    /// Population standard deviation of triangle areas.
    pub std_dev: f64,
}

impl TriangleAreaStats {
    /// Statistics over `areas`; all zero when empty.
    #[must_use]
    pub fn from_areas(areas: &[f64]) -> Self {
        if areas.is_empty() {
            return Self::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let n = areas.len() as f64;
        let mean = areas.iter().sum::<f64>() / n;
        let variance = areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;

        Self {
            min: areas.iter().copied().fold(f64::INFINITY, f64::min),
            max: areas.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Geometric properties of one mesh.
///
/// `volume` is computed for every mesh but only describes an enclosed
/// volume when `is_watertight` is true.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshMetrics {
    /// Sum of triangle areas.
    pub surface_area: f64,
    /// Absolute divergence-theorem volume.
    pub volume: f64,
    /// Divergence-theorem volume before taking the absolute value; negative
    /// for inside-out winding.
    pub signed_volume: f64,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of triangles.
    pub triangle_count: usize,
    /// Per-axis bounding box extent.
    pub bbox_extent: Vector3<f64>,
    /// Product of the bounding box extents.
    pub bbox_volume: f64,
    /// Triangles per unit of bounding box volume; zero for a flat box.
    pub mesh_density: f64,
    /// Every edge shared by exactly two oppositely wound triangles.
    pub is_watertight: bool,
    /// Per-triangle area distribution.
    pub triangle_areas: TriangleAreaStats,
    /// `surface_area / triangle_count`.
    pub average_triangle_area: f64,
}

/// Measure `mesh`.
///
/// # Errors
///
/// Returns [`MeasureError::InvalidMesh`](crate::MeasureError::InvalidMesh)
/// when the mesh has no vertices, no triangles, an out-of-range index or a
/// non-finite vertex.
///
/// # Example
///
/// ```
/// use mesh_measure::measure;
/// use mesh_types::unit_cube;
///
/// let metrics = measure(&unit_cube()).unwrap();
/// assert!((metrics.surface_area - 6.0).abs() < 1e-12);
/// assert!((metrics.volume - 1.0).abs() < 1e-12);
/// assert!(metrics.is_watertight);
/// ```
pub fn measure(mesh: &IndexedMesh) -> MeasureResult<MeshMetrics> {
    mesh.validate()?;

    let areas: Vec<f64> = mesh.triangles().map(|tri| tri.area()).collect();
    let surface_area: f64 = areas.iter().sum();
    let signed_volume = mesh.signed_volume();
    let triangle_count = mesh.face_count();

    let dims = dimensions(mesh);
    #[allow(clippy::cast_precision_loss)]
    let mesh_density = if dims.bounding_volume > 0.0 {
        triangle_count as f64 / dims.bounding_volume
    } else {
        0.0
    };

    let edges = EdgeUsage::build(&mesh.faces);
    let is_watertight = edges.is_watertight();
    if !is_watertight {
        debug!(
            boundary = edges.boundary_edge_count(),
            non_manifold = edges.non_manifold_edge_count(),
            inconsistent = edges.inconsistent_edge_count(),
            degenerate_faces = edges.degenerate_face_count(),
            "Mesh is not watertight; volume is not meaningful"
        );
    }

    #[allow(clippy::cast_precision_loss)]
    let average_triangle_area = surface_area / triangle_count as f64;

    Ok(MeshMetrics {
        surface_area,
        volume: signed_volume.abs(),
        signed_volume,
        vertex_count: mesh.vertex_count(),
        triangle_count,
        bbox_extent: dims.extent,
        bbox_volume: dims.bounding_volume,
        mesh_density,
        is_watertight,
        triangle_areas: TriangleAreaStats::from_areas(&areas),
        average_triangle_area,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::MeasureError;
    use approx::assert_relative_eq;
    use mesh_types::{MeshError, Vertex, unit_cube};

    #[test]
    fn unit_cube_metrics() {
        let m = measure(&unit_cube()).unwrap();

        assert_relative_eq!(m.surface_area, 6.0, epsilon = 1e-12);
        assert_relative_eq!(m.volume, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.signed_volume, 1.0, epsilon = 1e-12);
        assert!(m.is_watertight);
        assert_eq!(m.vertex_count, 8);
        assert_eq!(m.triangle_count, 12);
        assert_relative_eq!(m.bbox_extent, Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(m.bbox_volume, 1.0);
        assert_relative_eq!(m.mesh_density, 12.0);
        assert_relative_eq!(m.average_triangle_area, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.triangle_areas.min, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.triangle_areas.max, 0.5, epsilon = 1e-12);
        assert!(m.triangle_areas.std_dev < 1e-12);
    }

    #[test]
    fn inside_out_cube_has_negative_signed_volume() {
        let mut cube = unit_cube();
        cube.flip_normals();
        let m = measure(&cube).unwrap();
        assert_relative_eq!(m.signed_volume, -1.0, epsilon = 1e-12);
        assert_relative_eq!(m.volume, 1.0, epsilon = 1e-12);
        assert!(m.is_watertight);
    }

    #[test]
    fn open_mesh_still_reports_volume() {
        let mut cube = unit_cube();
        cube.faces.truncate(10);
        let m = measure(&cube).unwrap();
        assert!(!m.is_watertight);
        assert!(m.volume.is_finite());
        assert_relative_eq!(m.surface_area, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_mesh_has_zero_density() {
        let tri = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(2.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 2.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let m = measure(&tri).unwrap();
        assert!(m.bbox_volume.abs() < f64::EPSILON);
        assert!(m.mesh_density.abs() < f64::EPSILON);
        assert_relative_eq!(m.surface_area, 2.0);
        assert!(!m.is_watertight);
    }

    #[test]
    fn invalid_meshes_are_rejected() {
        assert_eq!(
            measure(&IndexedMesh::new()),
            Err(MeasureError::InvalidMesh(MeshError::NoVertices))
        );

        let mut no_faces = unit_cube();
        no_faces.faces.clear();
        assert_eq!(
            measure(&no_faces),
            Err(MeasureError::InvalidMesh(MeshError::NoFaces))
        );

        let mut bad_index = unit_cube();
        bad_index.faces[3] = [0, 1, 99];
        assert!(matches!(
            measure(&bad_index),
            Err(MeasureError::InvalidMesh(MeshError::IndexOutOfRange { face: 3, .. }))
        ));
    }

    #[test]
    fn area_stats_use_population_std() {
        let stats = TriangleAreaStats::from_areas(&[1.0, 3.0]);
        assert_relative_eq!(stats.mean, 2.0);
        assert_relative_eq!(stats.std_dev, 1.0);
        assert_relative_eq!(stats.min, 1.0);
        assert_relative_eq!(stats.max, 3.0);
        assert_eq!(TriangleAreaStats::from_areas(&[]), TriangleAreaStats::default());
    }
}
