//! Summary statistics over distance samples.

use crate::{CompareError, CompareResult, DistanceSample};

/// Counts of positive, negative and exactly-zero signed distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignCounts {
    /// Distances `> 0` (outside).
    pub positive: usize,
    /// Distances `< 0` (inside).
    pub negative: usize,
    /// Distances `== 0`.
    pub zero: usize,
}

impl SignCounts {
    /// Classify every distance.
    #[must_use]
    pub fn from_distances(distances: &[f64]) -> Self {
        distances.iter().fold(Self::default(), |mut counts, &d| {
            if d > 0.0 {
                counts.positive += 1;
            } else if d < 0.0 {
                counts.negative += 1;
            } else {
                counts.zero += 1;
            }
            counts
        })
    }

    /// Sum of the three counts.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.positive + self.negative + self.zero
    }
}

/// Mean, spread and extremes of a set of distances.
///
/// `std_dev` is the population standard deviation. `signs` is only filled
/// for signed (cloud-to-mesh) comparisons.
///
/// # Example
///
/// ```
/// use mesh_compare::DistanceStatistics;
///
/// let stats = DistanceStatistics::from_distances(&[1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(stats.count, 4);
/// assert!((stats.median - 2.5).abs() < 1e-12);
/// assert!((stats.rms - 7.5_f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceStatistics {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Middle value; mean of the two middle values for an even count.
    pub median: f64,
    /// Root mean square.
    pub rms: f64,
    /// Sign breakdown, for signed distances.
    pub signs: Option<SignCounts>,
}

impl DistanceStatistics {
    /// Statistics over `distances`.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::EmptySample`] for an empty slice.
    pub fn from_distances(distances: &[f64]) -> CompareResult<Self> {
        if distances.is_empty() {
            return Err(CompareError::EmptySample);
        }

        #[allow(clippy::cast_precision_loss)]
        let n = distances.len() as f64;
        let mean = distances.iter().sum::<f64>() / n;
        let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
        let mean_square = distances.iter().map(|d| d * d).sum::<f64>() / n;

        let mut sorted = distances.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            f64::midpoint(sorted[mid - 1], sorted[mid])
        } else {
            sorted[mid]
        };

        Ok(Self {
            count: distances.len(),
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median,
            rms: mean_square.sqrt(),
            signs: None,
        })
    }

    /// Statistics over signed distances, with sign counts.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::EmptySample`] for an empty slice.
    pub fn from_signed_distances(distances: &[f64]) -> CompareResult<Self> {
        let mut stats = Self::from_distances(distances)?;
        stats.signs = Some(SignCounts::from_distances(distances));
        Ok(stats)
    }

    /// Statistics over the distances of `samples`.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::EmptySample`] when `samples` is empty.
    pub fn from_samples(samples: &[DistanceSample]) -> CompareResult<Self> {
        let distances: Vec<f64> = samples.iter().map(|s| s.distance).collect();
        Self::from_distances(&distances)
    }
}
