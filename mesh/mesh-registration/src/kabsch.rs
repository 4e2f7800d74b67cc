//! Kabsch solve: the least-squares rotation and translation between paired
//! point sets.

use crate::{RegistrationError, RegistrationResult, RigidTransform};
use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion, Vector3};

/// Minimum pairs for a determined rigid solve.
pub const MIN_CORRESPONDENCES: usize = 3;

const SVD_MAX_ITERATIONS: usize = 1_000;

/// The rigid transform minimizing `Σ |R·sᵢ + t − tᵢ|²`.
///
/// With centroids `c_s`, `c_t` and `H = Σ (sᵢ − c_s)(tᵢ − c_t)ᵀ = U Σ Vᵀ`,
/// the rotation is `R = V Uᵀ`, with the last column of `V` negated when that
/// would be a reflection, and `t = c_t − R·c_s`.
///
/// # Errors
///
/// - [`RegistrationError::InvalidParameter`] if the slices differ in length.
/// - [`RegistrationError::InsufficientCorrespondences`] below three pairs.
/// - [`RegistrationError::SvdFailed`] / [`RegistrationError::DegenerateRotation`]
///   when the decomposition does not produce a finite proper rotation.
///
/// # Example
///
/// ```
/// use mesh_registration::compute_rigid_transform;
/// use nalgebra::Point3;
///
/// let source = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let target = source.map(|p| p + nalgebra::Vector3::new(1.0, 2.0, 3.0));
///
/// let transform = compute_rigid_transform(&source, &target).unwrap();
/// assert!((transform.transform_point(&source[1]) - target[1]).norm() < 1e-9);
/// ```
pub fn compute_rigid_transform(
    source_points: &[Point3<f64>],
    target_points: &[Point3<f64>],
) -> RegistrationResult<RigidTransform> {
    if source_points.len() != target_points.len() {
        return Err(RegistrationError::InvalidParameter(format!(
            "point sets must have equal length: {} vs {}",
            source_points.len(),
            target_points.len()
        )));
    }
    if source_points.len() < MIN_CORRESPONDENCES {
        return Err(RegistrationError::InsufficientCorrespondences {
            found: source_points.len(),
            required: MIN_CORRESPONDENCES,
        });
    }

    let source_centroid = compute_centroid(source_points);
    let target_centroid = compute_centroid(target_points);

    let mut h = Matrix3::zeros();
    for (s, t) in source_points.iter().zip(target_points) {
        h += (s.coords - source_centroid) * (t.coords - target_centroid).transpose();
    }

    if !h.iter().all(|x| x.is_finite()) {
        return Err(RegistrationError::SvdFailed);
    }
    let svd = h
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or(RegistrationError::SvdFailed)?;
    let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(RegistrationError::SvdFailed)?;

    let mut v = v_t.transpose();
    if (v * u.transpose()).determinant() < 0.0 {
        v.column_mut(2).neg_mut();
    }
    let rotation_matrix = v * u.transpose();

    if !rotation_matrix.iter().all(|x| x.is_finite()) {
        return Err(RegistrationError::DegenerateRotation);
    }

    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
        rotation_matrix,
    ));
    let translation = target_centroid - rotation * source_centroid;

    let transform = RigidTransform::new(rotation, translation);
    if transform.is_finite() {
        Ok(transform)
    } else {
        Err(RegistrationError::DegenerateRotation)
    }
}

/// Mean of the points as a vector.
pub(crate) fn compute_centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len().max(1) as f64;
    points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.3, 0.2, 0.8),
        ]
    }

    fn apply(points: &[Point3<f64>], t: &RigidTransform) -> Vec<Point3<f64>> {
        points.iter().map(|p| t.transform_point(p)).collect()
    }

    #[test]
    fn recovers_translation() {
        let source = tetrahedron();
        let translation = Vector3::new(5.0, 3.0, 2.0);
        let target = apply(&source, &RigidTransform::from_translation(translation));

        let transform = compute_rigid_transform(&source, &target).unwrap();
        assert!(transform.rotation.angle() < 1e-9);
        assert_relative_eq!(transform.translation, translation, epsilon = 1e-9);
    }

    #[test]
    fn recovers_rotation_and_translation() {
        let truth = RigidTransform::new(
            UnitQuaternion::from_euler_angles(0.3, -0.2, PI / 3.0),
            Vector3::new(10.0, 5.0, -1.0),
        );
        let source = tetrahedron();
        let target = apply(&source, &truth);

        let transform = compute_rigid_transform(&source, &target).unwrap();
        assert_relative_eq!(transform.to_matrix4(), truth.to_matrix4(), epsilon = 1e-9);
    }

    #[test]
    fn mirrored_target_still_gives_proper_rotation() {
        let source = tetrahedron();
        let target: Vec<_> = source.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();

        let transform = compute_rigid_transform(&source, &target).unwrap();
        let det = transform
            .to_matrix4()
            .fixed_view::<3, 3>(0, 0)
            .determinant();
        assert_relative_eq!(det, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn too_few_pairs() {
        let pts = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            compute_rigid_transform(&pts, &pts),
            Err(RegistrationError::InsufficientCorrespondences {
                found: 2,
                required: 3
            })
        );
    }

    #[test]
    fn mismatched_lengths() {
        let source = tetrahedron();
        let result = compute_rigid_transform(&source, &source[..3]);
        assert!(matches!(result, Err(RegistrationError::InvalidParameter(_))));
    }

    #[test]
    fn non_finite_input_is_degenerate() {
        let mut source = tetrahedron();
        source[0].x = f64::NAN;
        let target = tetrahedron();
        assert_eq!(
            compute_rigid_transform(&source, &target),
            Err(RegistrationError::SvdFailed)
        );
    }
}
