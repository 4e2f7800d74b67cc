//! Area-weighted uniform sampling of triangle surfaces.

use mesh_types::{IndexedMesh, MeshTopology, Triangle};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{SampleError, SampleResult};
use crate::{CloudPoint, PointCloud};

/// Default seed; sampling is deterministic unless a caller picks another.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Parameters for surface sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleParams {
    /// Number of points to draw. Default: 10 000.
    pub count: usize,
    /// RNG seed. Default: [`DEFAULT_SEED`].
    pub seed: u64,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            seed: DEFAULT_SEED,
        }
    }
}

impl SampleParams {
    /// Default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of points.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Draw `params.count` points uniformly over the surface of `mesh`.
///
/// A triangle is chosen with probability proportional to its area, then a
/// point is drawn uniformly inside it. The sampled points carry no normals.
///
/// # Errors
///
/// - [`SampleError::ZeroCount`] when `params.count == 0`.
/// - [`SampleError::InvalidMesh`] when the mesh fails validation.
/// - [`SampleError::ZeroSurfaceArea`] when every triangle is degenerate.
///
/// # Example
///
/// ```
/// use mesh_sample::{sample_points_uniformly, SampleParams};
/// use mesh_types::unit_cube;
///
/// let cloud = sample_points_uniformly(&unit_cube(), &SampleParams::new().with_count(500)).unwrap();
/// assert_eq!(cloud.len(), 500);
/// ```
pub fn sample_points_uniformly(mesh: &IndexedMesh, params: &SampleParams) -> SampleResult<PointCloud> {
    if params.count == 0 {
        return Err(SampleError::ZeroCount);
    }
    mesh.validate()?;

    let triangles: Vec<Triangle> = mesh.triangles().collect();
    let areas: Vec<f64> = triangles.iter().map(Triangle::area).collect();
    let chooser = WeightedIndex::new(&areas).map_err(|_| SampleError::ZeroSurfaceArea)?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let points: PointCloud = (0..params.count)
        .map(|_| {
            let tri = &triangles[chooser.sample(&mut rng)];
            let (mut u, mut v): (f64, f64) = (rng.r#gen(), rng.r#gen());
            if u + v > 1.0 {
                u = 1.0 - u;
                v = 1.0 - v;
            }
            CloudPoint::new(tri.point_at(u, v))
        })
        .collect();

    debug!(
        count = points.len(),
        triangles = triangles.len(),
        seed = params.seed,
        "Sampled mesh surface"
    );

    Ok(points)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{Aabb, Point3, Vertex, unit_cube};

    #[test]
    fn samples_lie_on_cube_surface() {
        let cloud = sample_points_uniformly(&unit_cube(), &SampleParams::new().with_count(2000)).unwrap();
        assert_eq!(cloud.len(), 2000);

        let eps = 1e-9;
        let bounds = Aabb::new(
            Point3::new(-eps, -eps, -eps),
            Point3::new(1.0 + eps, 1.0 + eps, 1.0 + eps),
        );
        for p in &cloud.points {
            assert!(bounds.contains(&p.position));
            let on_face = [p.position.x, p.position.y, p.position.z]
                .iter()
                .any(|c| c.abs() < 1e-9 || (c - 1.0).abs() < 1e-9);
            assert!(on_face, "{:?} is not on a face", p.position);
        }
    }

    #[test]
    fn sampling_follows_area() {
        // Two triangles, the second with nine times the area.
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
                Vertex::from_coords(10.0, 0.0, 0.0),
                Vertex::from_coords(13.0, 0.0, 0.0),
                Vertex::from_coords(10.0, 3.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        );
        let cloud = sample_points_uniformly(&mesh, &SampleParams::new().with_count(10_000)).unwrap();
        let in_large = cloud.points.iter().filter(|p| p.position.x >= 10.0).count();
        assert!((8500..9500).contains(&in_large), "got {in_large}");
    }

    #[test]
    fn same_seed_same_points() {
        let params = SampleParams::new().with_count(100).with_seed(42);
        let a = sample_points_uniformly(&unit_cube(), &params).unwrap();
        let b = sample_points_uniformly(&unit_cube(), &params).unwrap();
        let c = sample_points_uniformly(&unit_cube(), &params.with_seed(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let params = SampleParams::new();
        assert!(matches!(
            sample_points_uniformly(&IndexedMesh::new(), &params),
            Err(SampleError::InvalidMesh(_))
        ));
        assert_eq!(
            sample_points_uniformly(&unit_cube(), &params.with_count(0)),
            Err(SampleError::ZeroCount)
        );

        let flat = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        assert_eq!(
            sample_points_uniformly(&flat, &params),
            Err(SampleError::ZeroSurfaceArea)
        );
    }
}
