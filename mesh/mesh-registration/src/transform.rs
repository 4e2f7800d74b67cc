//! Rigid transforms: rotation followed by translation, no scale.

use std::fmt::Write as _;

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

use crate::{RegistrationError, RegistrationResult};

/// Tolerance for accepting a 3x3 block as a proper rotation.
const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// A proper rigid transform `p ↦ R·p + t`.
///
/// # Example
///
/// ```
/// use mesh_registration::RigidTransform;
/// use nalgebra::{Point3, UnitQuaternion, Vector3};
/// use std::f64::consts::FRAC_PI_2;
///
/// let transform = RigidTransform::new(
///     UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
///     Vector3::new(1.0, 2.0, 3.0),
/// );
///
/// let p = transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p - Point3::new(1.0, 3.0, 3.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// Rotation.
    pub rotation: UnitQuaternion<f64>,
    /// Translation, applied after rotation.
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Transform from a rotation and translation.
    #[must_use]
    pub const fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(UnitQuaternion::identity(), Vector3::zeros())
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(UnitQuaternion::identity(), translation)
    }

    /// Pure rotation about the origin.
    #[must_use]
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    /// Apply to a point.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Apply to a direction (rotation only).
    #[must_use]
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// `self ∘ other`: applies `other` first, then `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.translation + self.rotation * other.translation,
        }
    }

    /// The inverse transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: rotation * -self.translation,
        }
    }

    /// Homogeneous 4x4 matrix with `[0 0 0 1]` as the last row.
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        mat.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(self.rotation.to_rotation_matrix().matrix());
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        mat
    }

    /// Recover a transform from a homogeneous matrix.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DegenerateRotation`] if the bottom row is
    /// not `[0 0 0 1]`, the upper-left block is not orthonormal, or its
    /// determinant is not `+1`.
    pub fn from_matrix4(mat: &Matrix4<f64>) -> RegistrationResult<Self> {
        let bottom = mat.fixed_view::<1, 4>(3, 0);
        let expected_bottom = [0.0, 0.0, 0.0, 1.0];
        if bottom
            .iter()
            .zip(expected_bottom)
            .any(|(a, b)| (a - b).abs() > ORTHONORMAL_TOLERANCE)
        {
            return Err(RegistrationError::DegenerateRotation);
        }

        let r: Matrix3<f64> = mat.fixed_view::<3, 3>(0, 0).into_owned();
        if !is_proper_rotation(&r) {
            return Err(RegistrationError::DegenerateRotation);
        }

        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r));
        Ok(Self::new(rotation, mat.fixed_view::<3, 1>(0, 3).into_owned()))
    }

    /// Whether rotation angle and translation norm are both below `epsilon`.
    #[must_use]
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.rotation.angle().abs() < epsilon && self.translation.norm() < epsilon
    }

    /// Whether every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.rotation.coords.iter().all(|c| c.is_finite())
            && self.translation.iter().all(|c| c.is_finite())
    }

    /// The 4x4 matrix as text: a `#` comment line, then four rows of four
    /// space-separated numbers.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mat = self.to_matrix4();
        let mut out = String::from("# 4x4 rigid transform (row-major), mesh2 -> mesh1\n");
        for row in mat.row_iter() {
            let line: Vec<String> = row.iter().map(|v| format!("{v:.10e}")).collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        out
    }

    /// Parse the format written by [`to_text`](Self::to_text).
    ///
    /// Lines starting with `#` and blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidParameter`] unless exactly sixteen
    /// numbers are present, and the errors of
    /// [`from_matrix4`](Self::from_matrix4).
    pub fn from_text(text: &str) -> RegistrationResult<Self> {
        let values: Vec<f64> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .flat_map(str::split_whitespace)
            .map(|tok| {
                tok.parse::<f64>().map_err(|e| {
                    RegistrationError::InvalidParameter(format!("bad matrix entry {tok:?}: {e}"))
                })
            })
            .collect::<RegistrationResult<_>>()?;

        if values.len() != 16 {
            return Err(RegistrationError::InvalidParameter(format!(
                "expected 16 matrix entries, found {}",
                values.len()
            )));
        }

        Self::from_matrix4(&Matrix4::from_row_slice(&values))
    }
}

fn is_proper_rotation(r: &Matrix3<f64>) -> bool {
    let orthonormal = (r.transpose() * r - Matrix3::identity())
        .iter()
        .all(|v| v.abs() < ORTHONORMAL_TOLERANCE);
    orthonormal && (r.determinant() - 1.0).abs() < ORTHONORMAL_TOLERANCE
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sample_transform() -> RigidTransform {
        RigidTransform::new(
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 4.0),
            Vector3::new(1.0, 2.0, 3.0),
        )
    }

    #[test]
    fn rotation_then_translation() {
        let t = RigidTransform::new(
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0),
            Vector3::new(10.0, 0.0, 0.0),
        );
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(10.0, 1.0, 0.0), epsilon = 1e-12);
        let v = t.transform_vector(&Vector3::x());
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn compose_applies_right_operand_first() {
        let a = RigidTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let b = RigidTransform::from_rotation(UnitQuaternion::from_axis_angle(
            &Vector3::z_axis(),
            PI / 2.0,
        ));
        let p = Point3::new(1.0, 0.0, 0.0);

        // Rotate, then translate.
        assert_relative_eq!(
            a.compose(&b).transform_point(&p),
            Point3::new(1.0, 1.0, 0.0),
            epsilon = 1e-12
        );
        // Translate, then rotate.
        assert_relative_eq!(
            b.compose(&a).transform_point(&p),
            Point3::new(0.0, 2.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = sample_transform();
        let p = Point3::new(-3.0, 0.5, 7.0);
        assert_relative_eq!(t.inverse().transform_point(&t.transform_point(&p)), p, epsilon = 1e-12);
        assert!(t.compose(&t.inverse()).is_identity(1e-12));
    }

    #[test]
    fn matrix_has_homogeneous_layout() {
        let mat = RigidTransform::from_translation(Vector3::new(1.0, 2.0, 3.0)).to_matrix4();
        assert_eq!(mat[(0, 3)], 1.0);
        assert_eq!(mat[(1, 3)], 2.0);
        assert_eq!(mat[(2, 3)], 3.0);
        assert_eq!(mat.row(3).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn matrix_roundtrip() {
        let t = sample_transform();
        let back = RigidTransform::from_matrix4(&t.to_matrix4()).unwrap();
        assert_relative_eq!(back.to_matrix4(), t.to_matrix4(), epsilon = 1e-12);
    }

    #[test]
    fn reflection_matrix_is_rejected() {
        let mut mat = Matrix4::identity();
        mat[(0, 0)] = -1.0;
        assert_eq!(
            RigidTransform::from_matrix4(&mat),
            Err(RegistrationError::DegenerateRotation)
        );

        let mut scaled = Matrix4::identity();
        scaled[(1, 1)] = 2.0;
        assert!(RigidTransform::from_matrix4(&scaled).is_err());

        let mut projective = Matrix4::identity();
        projective[(3, 0)] = 0.5;
        assert!(RigidTransform::from_matrix4(&projective).is_err());
    }

    #[test]
    fn text_roundtrip() {
        let t = sample_transform();
        let text = t.to_text();
        assert!(text.starts_with('#'));
        assert_eq!(text.lines().filter(|l| !l.starts_with('#')).count(), 4);

        let back = RigidTransform::from_text(&text).unwrap();
        assert_relative_eq!(back.to_matrix4(), t.to_matrix4(), epsilon = 1e-9);
    }

    #[test]
    fn text_with_wrong_entry_count_is_rejected() {
        assert!(matches!(
            RigidTransform::from_text("1 0 0\n0 1 0\n0 0 1\n"),
            Err(RegistrationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(RigidTransform::default(), RigidTransform::identity());
        assert!(RigidTransform::default().is_finite());
    }
}
