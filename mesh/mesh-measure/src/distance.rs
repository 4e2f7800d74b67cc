//! Exact point-to-surface distance.

use mesh_types::{IndexedMesh, MeshTopology, Point3, Triangle};

/// Closest point of `triangle` to `point`.
///
/// Classifies `point` against the Voronoi regions of the three vertices,
/// three edges and the face, so degenerate (zero-area) triangles still give
/// a point on their segment.
///
/// # Example
///
/// ```
/// use mesh_measure::closest_point_on_triangle;
/// use mesh_types::Triangle;
/// use nalgebra::Point3;
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// let p = closest_point_on_triangle(&Point3::new(0.25, 0.25, 2.0), &tri);
/// assert!((p - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-12);
/// ```
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn closest_point_on_triangle(point: &Point3<f64>, triangle: &Triangle) -> Point3<f64> {
    let (a, b, c) = (triangle.v0, triangle.v1, triangle.v2);
    let p = *point;
    let ab = b - a;
    let ac = c - a;

    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1.mul_add(d4, -(d3 * d2));
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5.mul_add(d2, -(d1 * d6));
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3.mul_add(d6, -(d5 * d4));
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::MIN_POSITIVE {
        return a;
    }
    a + ab * (vb / denom) + ac * (vc / denom)
}

/// Closest point on any triangle of `mesh`, by exhaustive scan.
///
/// Returns `None` when no face resolves to a triangle.
#[must_use]
pub fn closest_point_on_mesh(mesh: &IndexedMesh, point: &Point3<f64>) -> Option<Point3<f64>> {
    mesh.triangles()
        .map(|tri| {
            let q = closest_point_on_triangle(point, &tri);
            ((q - point).norm_squared(), q)
        })
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, q)| q)
}

/// Unsigned distance from `point` to the surface of `mesh`.
///
/// # Example
///
/// ```
/// use mesh_measure::distance_to_mesh;
/// use mesh_types::unit_cube;
/// use nalgebra::Point3;
///
/// let d = distance_to_mesh(&unit_cube(), &Point3::new(2.0, 0.5, 0.5)).unwrap();
/// assert!((d - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn distance_to_mesh(mesh: &IndexedMesh, point: &Point3<f64>) -> Option<f64> {
    closest_point_on_mesh(mesh, point).map(|q| (q - point).norm())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn vertex_region() {
        let q = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.5), &right_triangle());
        assert_relative_eq!(q, Point3::origin());
    }

    #[test]
    fn edge_region() {
        let q = closest_point_on_triangle(&Point3::new(0.5, -1.0, 0.0), &right_triangle());
        assert_relative_eq!(q, Point3::new(0.5, 0.0, 0.0), epsilon = 1e-12);

        let q = closest_point_on_triangle(&Point3::new(1.0, 1.0, 0.0), &right_triangle());
        assert_relative_eq!(q, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn face_region() {
        let q = closest_point_on_triangle(&Point3::new(0.2, 0.3, -4.0), &right_triangle());
        assert_relative_eq!(q, Point3::new(0.2, 0.3, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_triangle_projects_onto_segment() {
        let tri = Triangle::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let q = closest_point_on_triangle(&Point3::new(1.5, 1.0, 0.0), &tri);
        assert_relative_eq!(q.y, 0.0, epsilon = 1e-12);
        assert!((0.0..=2.0).contains(&q.x));
    }

    #[test]
    fn outside_point_hits_nearest_face() {
        let q = closest_point_on_mesh(&unit_cube(), &Point3::new(10.0, 0.5, 0.5)).unwrap();
        assert_relative_eq!(q, Point3::new(1.0, 0.5, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn inside_point_distance_is_to_nearest_face() {
        let d = distance_to_mesh(&unit_cube(), &Point3::new(0.5, 0.5, 0.9)).unwrap();
        assert_relative_eq!(d, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn empty_mesh_has_no_closest_point() {
        assert!(closest_point_on_mesh(&IndexedMesh::new(), &Point3::origin()).is_none());
        assert!(distance_to_mesh(&IndexedMesh::new(), &Point3::origin()).is_none());
    }
}
