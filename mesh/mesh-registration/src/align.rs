//! Mesh-to-mesh alignment: sample both surfaces, run ICP, move the source.

use mesh_sample::{
    NormalParams, PointCloud, SampleParams, estimate_normals, sample_points_uniformly,
};
use mesh_types::IndexedMesh;
use tracing::{info, warn};

use crate::{
    IcpParams, MeshRole, RegistrationError, RegistrationResult, RigidTransform, icp_align_points,
    transform_mesh,
};

/// Parameters for [`align_meshes`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentParams {
    /// Points sampled from each surface (default: 10 000).
    pub sample_count: usize,
    /// Sampling seed for the source; the target uses `seed + 1` so the two
    /// clouds are drawn independently.
    pub seed: u64,
    /// Normal estimation on the sampled clouds (radius 0.1, 30 neighbours).
    /// `None` skips it.
    pub normals: Option<NormalParams>,
    /// ICP settings.
    pub icp: IcpParams,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            sample_count: 10_000,
            seed: SampleParams::default().seed,
            normals: Some(NormalParams::default()),
            icp: IcpParams::default(),
        }
    }
}

impl AlignmentParams {
    /// Default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of samples per surface.
    #[must_use]
    pub const fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set or disable normal estimation.
    #[must_use]
    pub const fn with_normals(mut self, normals: Option<NormalParams>) -> Self {
        self.normals = normals;
        self
    }

    /// Set the ICP parameters.
    #[must_use]
    pub const fn with_icp(mut self, icp: IcpParams) -> Self {
        self.icp = icp;
        self
    }

    const fn sample_params(&self, role: MeshRole) -> SampleParams {
        let stream = match role {
            MeshRole::Source => 0,
            MeshRole::Target => 1,
        };
        SampleParams {
            count: self.sample_count,
            seed: self.seed.wrapping_add(stream),
        }
    }
}

/// Outcome of a successful alignment.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Maps source coordinates into the target frame.
    pub transform: RigidTransform,
    /// Fraction of source samples with an accepted correspondence.
    pub fitness: f64,
    /// RMS distance over accepted correspondences.
    pub inlier_rmse: f64,
    /// ICP iterations performed.
    pub iterations: u32,
    /// Whether ICP met its tolerance before the iteration cap.
    pub converged: bool,
    /// Accepted correspondences at the final transform.
    pub correspondence_count: usize,
    /// The full source mesh with `transform` applied.
    pub aligned: IndexedMesh,
}

fn sample_surface(
    mesh: &IndexedMesh,
    params: &AlignmentParams,
    role: MeshRole,
) -> RegistrationResult<PointCloud> {
    mesh.validate().map_err(|source| RegistrationError::invalid(role, source))?;
    let mut cloud = sample_points_uniformly(mesh, &params.sample_params(role))?;
    if let Some(normals) = &params.normals {
        estimate_normals(&mut cloud, normals)?;
    }
    Ok(cloud)
}

/// Rigidly align `source` onto `target`.
///
/// Both surfaces are sampled, point-to-point ICP estimates the transform
/// from the source samples to the target samples, and the transform is then
/// applied to every vertex (and normal) of the full source mesh. Neither
/// input is modified.
///
/// # Errors
///
/// - [`RegistrationError::EmptySourceMesh`] / [`RegistrationError::EmptyTargetMesh`]
///   when a mesh has no vertices or no triangles.
/// - [`RegistrationError::InvalidMesh`] when a mesh fails validation
///   otherwise (bad face index, non-finite vertex).
/// - [`RegistrationError::Sampling`] when a surface cannot be sampled
///   (for example zero area).
/// - Any ICP error; in particular
///   [`RegistrationError::InsufficientCorrespondences`] when the meshes are
///   too far apart for the correspondence cutoff.
///
/// # Example
///
/// ```
/// use mesh_registration::{AlignmentParams, align_meshes};
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// let params = AlignmentParams::new().with_sample_count(5_000);
/// let alignment = align_meshes(&cube, &cube, &params).unwrap();
///
/// assert!(alignment.transform.translation.norm() < 1e-2);
/// assert!(alignment.fitness > 0.95);
/// ```
pub fn align_meshes(
    source: &IndexedMesh,
    target: &IndexedMesh,
    params: &AlignmentParams,
) -> RegistrationResult<Alignment> {
    let source_cloud = sample_surface(source, params, MeshRole::Source)?;
    let target_cloud = sample_surface(target, params, MeshRole::Target)?;

    let result = icp_align_points(
        &source_cloud.positions(),
        &target_cloud.positions(),
        &params.icp,
    )?;

    if !result.converged {
        warn!(
            iterations = result.iterations,
            fitness = result.fitness,
            "ICP stopped at the iteration cap"
        );
    }
    info!(
        fitness = result.fitness,
        inlier_rmse = result.inlier_rmse,
        iterations = result.iterations,
        translation = ?result.transform.translation.as_slice(),
        "Aligned meshes"
    );

    Ok(Alignment {
        aligned: transform_mesh(source, &result.transform),
        transform: result.transform,
        fitness: result.fitness,
        inlier_rmse: result.inlier_rmse,
        iterations: result.iterations,
        converged: result.converged,
        correspondence_count: result.correspondence_count,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{MeshError, MeshTopology, Vertex, unit_cube};
    use nalgebra::Vector3;

    fn quick() -> AlignmentParams {
        AlignmentParams::new().with_sample_count(10_000)
    }

    #[test]
    fn source_and_target_are_sampled_independently() {
        let params = quick();
        let source = params.sample_params(MeshRole::Source);
        let target = params.sample_params(MeshRole::Target);
        assert_ne!(source.seed, target.seed);

        let cube = unit_cube();
        let a = sample_points_uniformly(&cube, &source).unwrap();
        let b = sample_points_uniformly(&cube, &target).unwrap();
        assert_ne!(a.positions(), b.positions());
    }

    #[test]
    fn aligning_a_mesh_to_itself_is_identity() {
        let cube = unit_cube();
        let alignment = align_meshes(&cube, &cube, &quick()).unwrap();

        assert!(alignment.transform.translation.norm() < 5e-3);
        assert!(alignment.transform.rotation.angle() < 5e-3);
        assert!(alignment.fitness > 0.99);
        // Independent clouds never coincide, so the residual is the sample spacing.
        assert!(alignment.inlier_rmse > 1e-4);
        assert!(alignment.inlier_rmse < 3e-2);
        for (a, b) in alignment.aligned.vertices.iter().zip(&cube.vertices) {
            assert_relative_eq!(a.position, b.position, epsilon = 1e-2);
        }
    }

    #[test]
    fn translated_copy_is_recovered() {
        let original = unit_cube();
        let t = Vector3::new(0.02, -0.015, 0.01);
        let mut translated = original.clone();
        translated.translate(t);

        let alignment = align_meshes(&translated, &original, &quick()).unwrap();

        assert_relative_eq!(alignment.transform.translation, -t, epsilon = 5e-3);
        assert!(alignment.transform.rotation.angle() < 5e-3);
        assert!(alignment.fitness > 0.99);
        assert!(alignment.inlier_rmse < 3e-2);
        for (a, b) in alignment.aligned.vertices.iter().zip(&original.vertices) {
            assert_relative_eq!(a.position, b.position, epsilon = 1e-2);
        }
    }

    #[test]
    fn inputs_are_not_modified() {
        let source = unit_cube();
        let mut target = unit_cube();
        target.translate(Vector3::new(0.01, 0.0, 0.0));
        let before = (source.clone(), target.clone());

        let _ = align_meshes(&source, &target, &quick()).unwrap();
        assert_eq!((source, target), before);
    }

    #[test]
    fn empty_meshes_are_rejected() {
        let cube = unit_cube();
        assert_eq!(
            align_meshes(&IndexedMesh::new(), &cube, &quick()).unwrap_err(),
            RegistrationError::EmptySourceMesh
        );
        assert_eq!(
            align_meshes(&cube, &IndexedMesh::new(), &quick()).unwrap_err(),
            RegistrationError::EmptyTargetMesh
        );
    }

    #[test]
    fn out_of_range_index_is_reported_as_invalid() {
        let mut broken = unit_cube();
        broken.faces[0][0] = 99;
        assert_eq!(
            align_meshes(&broken, &unit_cube(), &quick()).unwrap_err(),
            RegistrationError::InvalidMesh {
                role: MeshRole::Source,
                source: MeshError::IndexOutOfRange {
                    face: 0,
                    index: 99,
                    vertex_count: 8,
                },
            }
        );

        let mut nan = unit_cube();
        nan.vertices[3].position.x = f64::NAN;
        assert!(matches!(
            align_meshes(&unit_cube(), &nan, &quick()),
            Err(RegistrationError::InvalidMesh {
                role: MeshRole::Target,
                source: MeshError::NonFiniteVertex { vertex: 3 },
            })
        ));
    }

    #[test]
    fn zero_area_mesh_is_a_sampling_error() {
        let flat = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        assert_eq!(flat.face_count(), 1);
        assert!(matches!(
            align_meshes(&flat, &unit_cube(), &quick()),
            Err(RegistrationError::Sampling(_))
        ));
    }

    #[test]
    fn distant_meshes_fail_instead_of_returning_identity() {
        let mut far = unit_cube();
        far.translate(Vector3::new(10.0, 0.0, 0.0));
        assert!(matches!(
            align_meshes(&far, &unit_cube(), &quick()),
            Err(RegistrationError::InsufficientCorrespondences { .. })
        ));
    }
}
