//! Run configuration, loadable from TOML.

use std::path::Path;

use mesh_compare::{CompareParams, NearestTarget};
use mesh_registration::{AlignmentParams, IcpParams};
use mesh_sample::{DEFAULT_SEED, NormalParams};
use serde::{Deserialize, Serialize};

use crate::{DiffError, DiffResult};

/// Everything a comparison run can be tuned with.
///
/// Every field has a default, so an empty TOML file is a valid config.
///
/// # Example
///
/// ```
/// use mesh_diff::DiffConfig;
///
/// let config = DiffConfig::from_toml_str(
///     "seed = 7\n[alignment]\nmax_correspondence_distance = 0.5\n",
/// )
/// .unwrap();
///
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.comparison.sample_count, 50_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Base seed for every sampling step.
    pub seed: u64,
    /// Alignment settings.
    pub alignment: AlignmentConfig,
    /// Comparison settings.
    pub comparison: ComparisonConfig,
    /// Artifact names for the two meshes.
    pub measurement_names: MeasurementNames,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            alignment: AlignmentConfig::default(),
            comparison: ComparisonConfig::default(),
            measurement_names: MeasurementNames::default(),
        }
    }
}

/// ICP and sampling settings for the alignment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignmentConfig {
    /// Points sampled from each surface.
    pub sample_count: usize,
    /// Neighbourhood radius for normal estimation.
    pub normal_radius: f64,
    /// Neighbour cap for normal estimation.
    pub normal_max_neighbors: usize,
    /// ICP iteration cap.
    pub max_iterations: u32,
    /// Correspondences farther apart than this are rejected.
    pub max_correspondence_distance: f64,
    /// Convergence threshold on the relative change in mean squared residual.
    pub relative_mse_tolerance: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        let icp = IcpParams::default();
        let normals = NormalParams::default();
        Self {
            sample_count: AlignmentParams::default().sample_count,
            normal_radius: normals.radius,
            normal_max_neighbors: normals.max_neighbors,
            max_iterations: icp.max_iterations,
            max_correspondence_distance: icp.max_correspondence_distance,
            relative_mse_tolerance: icp.relative_mse_tolerance,
        }
    }
}

/// Settings for the C2C and C2M stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Points sampled from each compared surface.
    pub sample_count: usize,
    /// Cloud-to-mesh distance target.
    pub nearest_target: NearestTarget,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        let params = CompareParams::default();
        Self {
            sample_count: params.sample_count,
            nearest_target: params.nearest_target,
        }
    }
}

/// Names used in measurement artifact file names and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasurementNames {
    /// Name of the reference mesh.
    pub reference: String,
    /// Name of the compared mesh.
    pub compared: String,
}

impl Default for MeasurementNames {
    fn default() -> Self {
        Self {
            reference: "mesh1".to_owned(),
            compared: "mesh2".to_owned(),
        }
    }
}

impl DiffConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::ParseToml`] for malformed TOML or unknown keys,
    /// and [`DiffError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> DiffResult<Self> {
        let config: Self = toml::from_str(content).map_err(|source| DiffError::ParseToml {
            path: "<string>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::ReadFile`] if the file cannot be read, otherwise
    /// the errors of [`from_toml_str`](Self::from_toml_str) with the real path.
    pub fn from_file(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DiffError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| DiffError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> DiffResult<String> {
        toml::to_string_pretty(self).map_err(|e| DiffError::InvalidConfig(e.to_string()))
    }

    /// Reject values no stage can run with.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> DiffResult<()> {
        let a = &self.alignment;
        let checks = [
            (a.sample_count > 0, "alignment.sample_count must be positive"),
            (
                a.normal_radius > 0.0 && a.normal_radius.is_finite(),
                "alignment.normal_radius must be positive",
            ),
            (a.normal_max_neighbors > 0, "alignment.normal_max_neighbors must be positive"),
            (
                a.max_correspondence_distance > 0.0 && a.max_correspondence_distance.is_finite(),
                "alignment.max_correspondence_distance must be positive",
            ),
            (
                a.relative_mse_tolerance >= 0.0 && a.relative_mse_tolerance.is_finite(),
                "alignment.relative_mse_tolerance must be non-negative",
            ),
            (self.comparison.sample_count > 0, "comparison.sample_count must be positive"),
            (
                !self.measurement_names.reference.is_empty()
                    && !self.measurement_names.compared.is_empty()
                    && self.measurement_names.reference != self.measurement_names.compared,
                "measurement_names must be non-empty and distinct",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(DiffError::InvalidConfig((*message).to_owned())),
            None => Ok(()),
        }
    }

    /// Parameters for the alignment stage.
    #[must_use]
    pub fn alignment_params(&self) -> AlignmentParams {
        let a = &self.alignment;
        AlignmentParams::new()
            .with_sample_count(a.sample_count)
            .with_seed(self.seed)
            .with_normals(Some(
                NormalParams::new()
                    .with_radius(a.normal_radius)
                    .with_max_neighbors(a.normal_max_neighbors),
            ))
            .with_icp(
                IcpParams::new()
                    .with_max_iterations(a.max_iterations)
                    .with_max_correspondence_distance(a.max_correspondence_distance)
                    .with_relative_mse_tolerance(a.relative_mse_tolerance),
            )
    }

    /// Parameters for the comparison stages.
    #[must_use]
    pub fn compare_params(&self) -> CompareParams {
        CompareParams::new()
            .with_sample_count(self.comparison.sample_count)
            .with_seed(self.seed)
            .with_nearest_target(self.comparison.nearest_target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DiffConfig::from_toml_str("").unwrap(), DiffConfig::default());
    }

    #[test]
    fn defaults_match_stage_defaults() {
        let config = DiffConfig::default();
        let alignment = config.alignment_params();
        assert_eq!(alignment.sample_count, 10_000);
        assert!((alignment.icp.max_correspondence_distance - 0.05).abs() < f64::EPSILON);
        assert_eq!(alignment.icp.max_iterations, 100);
        assert_eq!(config.compare_params().sample_count, 50_000);
        assert_eq!(config.compare_params().nearest_target, NearestTarget::Vertices);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DiffConfig::from_toml_str(
            r#"
            [comparison]
            nearest_target = "surface"

            [measurement_names]
            reference = "before"
            "#,
        )
        .unwrap();
        assert_eq!(config.comparison.nearest_target, NearestTarget::Surface);
        assert_eq!(config.comparison.sample_count, 50_000);
        assert_eq!(config.measurement_names.reference, "before");
        assert_eq!(config.measurement_names.compared, "mesh2");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            DiffConfig::from_toml_str("sample_cnt = 3"),
            Err(DiffError::ParseToml { .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = DiffConfig::from_toml_str("[alignment]\nmax_correspondence_distance = -1.0")
            .unwrap_err();
        assert!(err.to_string().contains("max_correspondence_distance"));

        let err = DiffConfig::from_toml_str(
            "[measurement_names]\nreference = \"same\"\ncompared = \"same\"",
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::InvalidConfig(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = DiffConfig::default();
        config.seed = 99;
        config.alignment.max_correspondence_distance = 0.5;
        let text = config.to_toml_string().unwrap();
        assert_eq!(DiffConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            DiffConfig::from_file("/nonexistent/mesh-diff.toml"),
            Err(DiffError::ReadFile { .. })
        ));
    }
}
