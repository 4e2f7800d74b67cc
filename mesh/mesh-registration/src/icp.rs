//! Point-to-point Iterative Closest Point.
//!
//! Each iteration pairs every transformed source point with its nearest
//! target point, drops pairs farther apart than the correspondence cutoff,
//! solves the Kabsch problem on the survivors and composes the increment onto
//! the running estimate. Iteration stops when the mean squared residual
//! stops changing (relative to its previous value) or the iteration cap is
//! reached.

use crate::kabsch::{MIN_CORRESPONDENCES, compute_rigid_transform};
use crate::{RegistrationError, RegistrationResult, RigidTransform};
use mesh_sample::NearestNeighborIndex;
use nalgebra::Point3;
use tracing::{debug, trace};

/// Parameters for ICP registration.
#[derive(Debug, Clone, PartialEq)]
pub struct IcpParams {
    /// Maximum number of iterations (default: 100).
    pub max_iterations: u32,
    /// Stop once `|mse_prev − mse| / mse_prev` falls below this (default: 1e-6).
    pub relative_mse_tolerance: f64,
    /// Pairs farther apart than this are rejected (default: 0.05).
    pub max_correspondence_distance: f64,
    /// Starting estimate (default: identity).
    pub initial_transform: RigidTransform,
}

impl Default for IcpParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            relative_mse_tolerance: 1e-6,
            max_correspondence_distance: 0.05,
            initial_transform: RigidTransform::identity(),
        }
    }
}

impl IcpParams {
    /// Creates new ICP parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the relative MSE convergence tolerance.
    #[must_use]
    pub const fn with_relative_mse_tolerance(mut self, tolerance: f64) -> Self {
        self.relative_mse_tolerance = tolerance;
        self
    }

    /// Sets the correspondence rejection distance.
    #[must_use]
    pub const fn with_max_correspondence_distance(mut self, distance: f64) -> Self {
        self.max_correspondence_distance = distance;
        self
    }

    /// Sets the initial transform guess.
    #[must_use]
    pub const fn with_initial_transform(mut self, transform: RigidTransform) -> Self {
        self.initial_transform = transform;
        self
    }

    pub(crate) fn validate(&self) -> RegistrationResult<()> {
        if self.max_iterations == 0 {
            return Err(RegistrationError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.max_correspondence_distance.is_finite() && self.max_correspondence_distance > 0.0)
        {
            return Err(RegistrationError::InvalidParameter(format!(
                "max_correspondence_distance must be positive and finite, got {}",
                self.max_correspondence_distance
            )));
        }
        if self.relative_mse_tolerance.is_nan() || self.relative_mse_tolerance < 0.0 {
            return Err(RegistrationError::InvalidParameter(format!(
                "relative_mse_tolerance must be non-negative, got {}",
                self.relative_mse_tolerance
            )));
        }
        if !self.initial_transform.is_finite() {
            return Err(RegistrationError::DegenerateRotation);
        }
        Ok(())
    }
}

/// Result of ICP registration.
#[derive(Debug, Clone, PartialEq)]
pub struct IcpResult {
    /// Maps source coordinates into the target frame.
    pub transform: RigidTransform,
    /// Accepted correspondences / source points, at the final transform.
    pub fitness: f64,
    /// RMS distance over accepted correspondences, at the final transform.
    pub inlier_rmse: f64,
    /// Kabsch solves performed.
    pub iterations: u32,
    /// Whether the relative MSE tolerance was met before the iteration cap.
    pub converged: bool,
    /// Accepted correspondences at the final transform.
    pub correspondence_count: usize,
}

/// Accepted pairs for one transform estimate.
struct Matching {
    source: Vec<Point3<f64>>,
    target: Vec<Point3<f64>>,
    sum_sq: f64,
}

impl Matching {
    fn len(&self) -> usize {
        self.source.len()
    }

    #[allow(clippy::cast_precision_loss)]
    fn mse(&self) -> f64 {
        if self.source.is_empty() {
            0.0
        } else {
            self.sum_sq / self.source.len() as f64
        }
    }
}

fn find_correspondences(
    source_points: &[Point3<f64>],
    target_points: &[Point3<f64>],
    index: &NearestNeighborIndex,
    transform: &RigidTransform,
    max_distance: f64,
) -> Matching {
    let mut matching = Matching {
        source: Vec::with_capacity(source_points.len()),
        target: Vec::with_capacity(source_points.len()),
        sum_sq: 0.0,
    };
    for p in source_points {
        let moved = transform.transform_point(p);
        let hit = index.nearest(&moved);
        if hit.distance <= max_distance {
            matching.source.push(moved);
            matching.target.push(target_points[hit.index]);
            matching.sum_sq += hit.distance * hit.distance;
        }
    }
    matching
}

/// Change in MSE relative to the previous value; residuals at rounding level
/// count as zero.
fn relative_change(previous: f64, current: f64) -> f64 {
    (previous - current).abs() / previous.max(f64::EPSILON)
}

/// Aligns source points onto target points.
///
/// # Errors
///
/// - [`RegistrationError::EmptySourceMesh`] / [`RegistrationError::EmptyTargetMesh`]
///   for empty inputs.
/// - [`RegistrationError::InvalidParameter`] for unusable parameters.
/// - [`RegistrationError::InsufficientCorrespondences`] when fewer than three
///   pairs are within range at any iteration.
/// - Kabsch errors from the rigid solve.
///
/// # Example
///
/// ```
/// use mesh_registration::{IcpParams, icp_align_points};
/// use nalgebra::{Point3, Vector3};
///
/// let target: Vec<Point3<f64>> = (0..8)
///     .flat_map(|i| (0..8).map(move |j| Point3::new(f64::from(i) * 0.1, f64::from(j) * 0.1, f64::from(i * j) * 0.01)))
///     .collect();
/// let shift = Vector3::new(0.01, -0.02, 0.005);
/// let source: Vec<_> = target.iter().map(|p| p + shift).collect();
///
/// let result = icp_align_points(&source, &target, &IcpParams::default()).unwrap();
/// assert!((result.transform.translation + shift).norm() < 1e-6);
/// assert!(result.fitness > 0.99);
/// ```
pub fn icp_align_points(
    source_points: &[Point3<f64>],
    target_points: &[Point3<f64>],
    params: &IcpParams,
) -> RegistrationResult<IcpResult> {
    if source_points.is_empty() {
        return Err(RegistrationError::EmptySourceMesh);
    }
    if target_points.is_empty() {
        return Err(RegistrationError::EmptyTargetMesh);
    }
    params.validate()?;

    let index = NearestNeighborIndex::new(target_points)?;
    let cutoff = params.max_correspondence_distance;

    let mut transform = params.initial_transform;
    let mut matching = find_correspondences(source_points, target_points, &index, &transform, cutoff);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iterations {
        if matching.len() < MIN_CORRESPONDENCES {
            return Err(RegistrationError::InsufficientCorrespondences {
                found: matching.len(),
                required: MIN_CORRESPONDENCES,
            });
        }

        let incremental = compute_rigid_transform(&matching.source, &matching.target)?;
        transform = incremental.compose(&transform);
        iterations += 1;

        let previous_mse = matching.mse();
        matching = find_correspondences(source_points, target_points, &index, &transform, cutoff);
        let change = relative_change(previous_mse, matching.mse());
        trace!(
            iteration = iterations,
            inliers = matching.len(),
            mse = matching.mse(),
            change,
            "ICP iteration"
        );

        if change < params.relative_mse_tolerance {
            converged = true;
            break;
        }
    }

    if matching.len() < MIN_CORRESPONDENCES {
        return Err(RegistrationError::InsufficientCorrespondences {
            found: matching.len(),
            required: MIN_CORRESPONDENCES,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let fitness = matching.len() as f64 / source_points.len() as f64;
    let inlier_rmse = matching.mse().sqrt();

    debug!(iterations, converged, fitness, inlier_rmse, "ICP finished");

    Ok(IcpResult {
        transform,
        fitness,
        inlier_rmse,
        iterations,
        converged,
        correspondence_count: matching.len(),
    })
}
