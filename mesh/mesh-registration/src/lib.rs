//! Rigid registration of one mesh onto another.
//!
//! - [`align_meshes`] - sample both surfaces, run ICP, move the full source mesh
//! - [`icp_align_points`] - point-to-point ICP over raw point sets
//! - [`compute_rigid_transform`] - Kabsch solve for paired points
//! - [`RigidTransform`] - rotation plus translation, with a 4x4 text form
//!
//! Only proper rigid motions are estimated: no scale, no shear, no
//! reflection.
//!
//! # Example
//!
//! ```
//! use mesh_registration::{AlignmentParams, align_meshes};
//! use mesh_types::unit_cube;
//! use nalgebra::Vector3;
//!
//! let target = unit_cube();
//! let mut source = unit_cube();
//! source.translate(Vector3::new(0.01, -0.02, 0.005));
//!
//! let params = AlignmentParams::new().with_sample_count(10_000);
//! let alignment = align_meshes(&source, &target, &params).unwrap();
//!
//! assert!((alignment.transform.translation + Vector3::new(0.01, -0.02, 0.005)).norm() < 5e-3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod align;
mod error;
mod icp;
mod kabsch;
mod transform;

pub use align::{Alignment, AlignmentParams, align_meshes};
pub use error::{MeshRole, RegistrationError, RegistrationResult};
pub use icp::{IcpParams, IcpResult, icp_align_points};
pub use kabsch::{MIN_CORRESPONDENCES, compute_rigid_transform};
pub use transform::RigidTransform;

use mesh_types::IndexedMesh;

/// A copy of `mesh` with `transform` applied to every vertex position and
/// rotated into every vertex normal. Faces are unchanged.
///
/// # Example
///
/// ```
/// use mesh_registration::{RigidTransform, transform_mesh};
/// use mesh_types::unit_cube;
/// use nalgebra::Vector3;
///
/// let moved = transform_mesh(&unit_cube(), &RigidTransform::from_translation(Vector3::x() * 5.0));
/// assert!((moved.vertices[0].position.x - 5.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn transform_mesh(mesh: &IndexedMesh, transform: &RigidTransform) -> IndexedMesh {
    let mut result = mesh.clone();
    for v in &mut result.vertices {
        v.position = transform.transform_point(&v.position);
        if let Some(normal) = v.normal.as_mut() {
            *normal = transform.transform_vector(normal);
        }
    }
    result
}

/// RMS and maximum distance between `transform`-ed source vertices and the
/// target vertices with the same index.
///
/// Only meaningful for meshes that share vertex order, such as a mesh and
/// its transformed copy. Two empty meshes give `(0.0, 0.0)`.
///
/// # Errors
///
/// Returns [`RegistrationError::InvalidParameter`] if the vertex counts differ.
pub fn compute_alignment_error(
    source: &IndexedMesh,
    target: &IndexedMesh,
    transform: &RigidTransform,
) -> RegistrationResult<(f64, f64)> {
    if source.vertices.len() != target.vertices.len() {
        return Err(RegistrationError::InvalidParameter(format!(
            "vertex counts differ: {} vs {}",
            source.vertices.len(),
            target.vertices.len()
        )));
    }
    if source.vertices.is_empty() {
        return Ok((0.0, 0.0));
    }

    let (sum_sq, max_sq) = source.vertices.iter().zip(&target.vertices).fold(
        (0.0_f64, 0.0_f64),
        |(sum, max), (sv, tv)| {
            let d = (transform.transform_point(&sv.position) - tv.position).norm_squared();
            (sum + d, max.max(d))
        },
    );

    #[allow(clippy::cast_precision_loss)]
    let rms = (sum_sq / source.vertices.len() as f64).sqrt();
    Ok((rms, max_sq.sqrt()))
}
