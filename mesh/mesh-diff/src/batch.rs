//! Many comparison runs from one manifest.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ComparisonRun, DiffConfig, DiffError, DiffResult, run_to_directory};

/// One mesh pair and where its artifacts go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonJob {
    /// Reference mesh file.
    pub mesh1: PathBuf,
    /// Compared mesh file.
    pub mesh2: PathBuf,
    /// Artifact directory for this pair.
    pub output_dir: PathBuf,
}

/// A list of jobs, written in TOML as repeated `[[job]]` tables.
///
/// Relative paths are resolved against the manifest's directory by
/// [`from_file`](Self::from_file).
///
/// ```toml
/// [[job]]
/// mesh1 = "scans/2024-01.obj"
/// mesh2 = "scans/2024-06.obj"
/// output_dir = "out/jan-jun"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchManifest {
    /// Jobs in manifest order.
    #[serde(rename = "job", default)]
    pub jobs: Vec<ComparisonJob>,
}

impl BatchManifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::ParseToml`] for malformed documents.
    pub fn from_toml_str(content: &str) -> DiffResult<Self> {
        toml::from_str(content).map_err(|source| DiffError::ParseToml {
            path: "<string>".into(),
            source,
        })
    }

    /// Load a manifest file, resolving relative job paths against its
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::ReadFile`] or [`DiffError::ParseToml`].
    pub fn from_file(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DiffError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest: Self = toml::from_str(&content).map_err(|source| DiffError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            for job in &mut manifest.jobs {
                for p in [&mut job.mesh1, &mut job.mesh2, &mut job.output_dir] {
                    if p.is_relative() {
                        *p = base.join(&*p);
                    }
                }
            }
        }
        Ok(manifest)
    }
}

/// Run every job in parallel with the same configuration.
///
/// Results are in job order. A job only errors when its artifacts cannot be
/// written; stage failures stay inside each [`ComparisonRun`].
pub fn run_batch(jobs: &[ComparisonJob], config: &DiffConfig) -> Vec<DiffResult<ComparisonRun>> {
    info!(jobs = jobs.len(), "Starting batch");
    let results: Vec<_> = jobs
        .par_iter()
        .map(|job| {
            let result = run_to_directory(&job.mesh1, &job.mesh2, &job.output_dir, config);
            if let Err(err) = &result {
                warn!(output_dir = %job.output_dir.display(), error = %err, "Batch job failed");
            }
            result
        })
        .collect();

    let degraded = results
        .iter()
        .filter(|r| r.as_ref().is_ok_and(ComparisonRun::is_degraded))
        .count();
    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(jobs = jobs.len(), degraded, failed, "Batch complete");
    results
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn manifest_with_jobs() {
        let manifest = BatchManifest::from_toml_str(
            r#"
            [[job]]
            mesh1 = "a.obj"
            mesh2 = "b.obj"
            output_dir = "out/ab"

            [[job]]
            mesh1 = "c.stl"
            mesh2 = "d.stl"
            output_dir = "out/cd"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.jobs.len(), 2);
        assert_eq!(manifest.jobs[1].mesh1, PathBuf::from("c.stl"));
    }

    #[test]
    fn empty_manifest_has_no_jobs() {
        assert!(BatchManifest::from_toml_str("").unwrap().jobs.is_empty());
    }

    #[test]
    fn job_missing_a_field_is_rejected() {
        assert!(matches!(
            BatchManifest::from_toml_str("[[job]]\nmesh1 = \"a.obj\"\n"),
            Err(DiffError::ParseToml { .. })
        ));
    }

    #[test]
    fn relative_paths_follow_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(
            &path,
            "[[job]]\nmesh1 = \"a.obj\"\nmesh2 = \"/abs/b.obj\"\noutput_dir = \"out\"\n",
        )
        .unwrap();

        let manifest = BatchManifest::from_file(&path).unwrap();
        let job = &manifest.jobs[0];
        assert_eq!(job.mesh1, dir.path().join("a.obj"));
        assert_eq!(job.mesh2, PathBuf::from("/abs/b.obj"));
        assert_eq!(job.output_dir, dir.path().join("out"));
    }

    #[test]
    fn empty_batch_runs_nothing() {
        assert!(run_batch(&[], &DiffConfig::default()).is_empty());
    }
}
