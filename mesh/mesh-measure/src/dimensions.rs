//! Axis-aligned dimensions.

use mesh_types::{IndexedMesh, MeshBounds, Point3, Vector3};

/// Axis-aligned bounding box of a mesh's vertices and derived sizes.
///
/// # Example
///
/// ```
/// use mesh_measure::dimensions;
/// use mesh_types::unit_cube;
///
/// let dims = dimensions(&unit_cube());
/// assert!((dims.extent.x - 1.0).abs() < 1e-12);
/// assert!((dims.bounding_volume - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    /// Bounding box minimum corner.
    pub min: Point3<f64>,
    /// Bounding box maximum corner.
    pub max: Point3<f64>,
    /// Per-axis extent `max - min`.
    pub extent: Vector3<f64>,
    /// Length of the box diagonal.
    pub diagonal: f64,
    /// Product of the three extents.
    pub bounding_volume: f64,
    /// Box center.
    pub center: Point3<f64>,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
            extent: Vector3::zeros(),
            diagonal: 0.0,
            bounding_volume: 0.0,
            center: Point3::origin(),
        }
    }
}

impl Dimensions {
    /// Shortest extent.
    #[must_use]
    pub fn min_extent(&self) -> f64 {
        self.extent.min()
    }

    /// Longest extent.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        self.extent.max()
    }

    /// Longest over shortest extent; infinite for a flat box.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        let min = self.min_extent();
        if min.abs() < f64::EPSILON {
            f64::INFINITY
        } else {
            self.max_extent() / min
        }
    }
}

/// Dimensions of the vertex bounding box; all zero for a mesh without
/// vertices.
#[must_use]
pub fn dimensions(mesh: &IndexedMesh) -> Dimensions {
    let Some(bounds) = mesh.bounds_opt() else {
        return Dimensions::default();
    };

    Dimensions {
        min: bounds.min,
        max: bounds.max,
        extent: bounds.extent(),
        diagonal: bounds.diagonal(),
        bounding_volume: bounds.volume(),
        center: bounds.center(),
    }
}
