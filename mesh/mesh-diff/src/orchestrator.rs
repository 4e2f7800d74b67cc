//! The comparison run: align, compare, measure, never abort.

use std::path::Path;

use mesh_compare::{
    CloudToCloud, CloudToMesh, Outcome, cloud_to_cloud_or_sentinel, cloud_to_mesh_or_sentinel,
};
use mesh_io::load_mesh;
use mesh_measure::{MeasureError, MeshMetrics, measure};
use mesh_registration::{RigidTransform, align_meshes};
use mesh_types::IndexedMesh;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::artifacts::{ArtifactContext, write_artifacts, write_measurement};
use crate::{DiffConfig, DiffResult, RunState, Stage, StageFailure};

/// The two meshes of a run.
#[derive(Debug, Clone, Default)]
pub struct ComparisonInputs {
    /// Reference mesh (mesh1).
    pub reference: IndexedMesh,
    /// Mesh compared against the reference (mesh2).
    pub compared: IndexedMesh,
}

impl ComparisonInputs {
    /// Inputs from two meshes.
    #[must_use]
    pub const fn new(reference: IndexedMesh, compared: IndexedMesh) -> Self {
        Self {
            reference,
            compared,
        }
    }
}

/// Alignment quality figures of a successful alignment stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentRecord {
    /// Fraction of source samples with an accepted correspondence.
    pub fitness: f64,
    /// RMS distance over accepted correspondences.
    pub inlier_rmse: f64,
    /// ICP iterations performed.
    pub iterations: u32,
    /// Whether ICP met its tolerance.
    pub converged: bool,
    /// Accepted correspondences at the final transform.
    pub correspondence_count: usize,
}

/// Everything one run produced, including placeholders for failed stages.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    /// Always [`RunState::Complete`] once returned.
    pub state: RunState,
    /// Alignment figures; `None` when alignment failed.
    pub alignment: Option<AlignmentRecord>,
    /// Transform applied to the compared mesh; identity when alignment failed.
    pub transform: RigidTransform,
    /// The compared mesh after alignment, or unaligned on failure.
    pub aligned: IndexedMesh,
    /// Cloud-to-cloud result or sentinel.
    pub c2c: CloudToCloud,
    /// Cloud-to-mesh result or sentinel.
    pub c2m: CloudToMesh,
    /// Metrics of the reference mesh.
    pub reference_metrics: Result<MeshMetrics, MeasureError>,
    /// Metrics of the aligned compared mesh.
    pub compared_metrics: Result<MeshMetrics, MeasureError>,
    /// Every stage that fell back, in run order.
    pub failures: Vec<StageFailure>,
}

impl ComparisonRun {
    /// Whether any stage fell back.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The failure recorded for `stage`, if any.
    #[must_use]
    pub fn failure(&self, stage: Stage) -> Option<&StageFailure> {
        self.failures.iter().find(|f| f.stage == stage)
    }
}

struct Runner {
    state: RunState,
    failures: Vec<StageFailure>,
}

impl Runner {
    const fn new(failures: Vec<StageFailure>) -> Self {
        Self {
            state: RunState::Start,
            failures,
        }
    }

    fn advance(&mut self) {
        self.state = self.state.next();
        debug!(state = ?self.state, "Run advanced");
    }

    fn fail(&mut self, stage: Stage, error: &impl std::fmt::Display) {
        let failure = StageFailure::new(stage, error);
        warn!(%failure, "Stage degraded");
        self.failures.push(failure);
    }

    fn record_outcome(&mut self, stage: Stage, outcome: &Outcome) {
        if let Some(err) = outcome.error() {
            self.fail(stage, err);
        }
    }
}

fn run_stages(
    inputs: &ComparisonInputs,
    config: &DiffConfig,
    failures: Vec<StageFailure>,
) -> ComparisonRun {
    let mut runner = Runner::new(failures);

    let (alignment, transform, aligned) =
        match align_meshes(&inputs.compared, &inputs.reference, &config.alignment_params()) {
            Ok(a) => (
                Some(AlignmentRecord {
                    fitness: a.fitness,
                    inlier_rmse: a.inlier_rmse,
                    iterations: a.iterations,
                    converged: a.converged,
                    correspondence_count: a.correspondence_count,
                }),
                a.transform,
                a.aligned,
            ),
            Err(err) => {
                runner.fail(Stage::Align, &err);
                (None, RigidTransform::identity(), inputs.compared.clone())
            }
        };
    runner.advance();

    let compare = config.compare_params();
    let c2c = cloud_to_cloud_or_sentinel(&inputs.reference, &aligned, &compare);
    runner.record_outcome(Stage::CloudToCloud, &c2c.outcome);
    runner.advance();

    let c2m = cloud_to_mesh_or_sentinel(&inputs.reference, &aligned, &compare);
    runner.record_outcome(Stage::CloudToMesh, &c2m.outcome);
    runner.advance();

    let reference_metrics = measure(&inputs.reference);
    if let Err(err) = &reference_metrics {
        runner.fail(Stage::MeasureReference, err);
    }
    runner.advance();

    let compared_metrics = measure(&aligned);
    if let Err(err) = &compared_metrics {
        runner.fail(Stage::MeasureCompared, err);
    }
    runner.advance();

    runner.advance();
    info!(
        degraded_stages = runner.failures.len(),
        c2c_mean = c2c.stats.mean,
        c2m_mean = c2m.stats.mean,
        "Comparison run complete"
    );

    ComparisonRun {
        state: runner.state,
        alignment,
        transform,
        aligned,
        c2c,
        c2m,
        reference_metrics,
        compared_metrics,
        failures: runner.failures,
    }
}

/// Run every stage over in-memory meshes.
///
/// Never fails: each stage that errors is recorded in
/// [`ComparisonRun::failures`] and replaced by its fallback, and later
/// stages still run.
///
/// # Example
///
/// ```
/// use mesh_diff::{ComparisonInputs, DiffConfig, RunState, Stage, run_comparison};
/// use mesh_types::{IndexedMesh, unit_cube};
///
/// let inputs = ComparisonInputs::new(unit_cube(), IndexedMesh::new());
/// let run = run_comparison(&inputs, &DiffConfig::default());
///
/// assert_eq!(run.state, RunState::Complete);
/// assert!(run.failure(Stage::Align).is_some());
/// assert!(run.reference_metrics.is_ok());
/// ```
#[must_use]
pub fn run_comparison(inputs: &ComparisonInputs, config: &DiffConfig) -> ComparisonRun {
    run_stages(inputs, config, Vec::new())
}

fn load_or_empty(path: &Path, stage: Stage, failures: &mut Vec<StageFailure>) -> IndexedMesh {
    load_mesh(path).unwrap_or_else(|err| {
        let failure = StageFailure::new(stage, &err);
        warn!(%failure, path = %path.display(), "Could not load mesh");
        failures.push(failure);
        IndexedMesh::new()
    })
}

/// Load two mesh files, run every stage and write all artifacts to
/// `out_dir`.
///
/// Unreadable meshes become [`Stage::LoadReference`] /
/// [`Stage::LoadCompared`] failures and the run continues with an empty
/// mesh, so the artifact set is always complete.
///
/// # Errors
///
/// Only artifact output can fail: [`DiffError::WriteArtifact`](crate::DiffError::WriteArtifact)
/// when `out_dir` or a file in it cannot be written.
pub fn run_to_directory(
    reference_path: impl AsRef<Path>,
    compared_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &DiffConfig,
) -> DiffResult<ComparisonRun> {
    let (reference_path, compared_path, out_dir) =
        (reference_path.as_ref(), compared_path.as_ref(), out_dir.as_ref());
    info!(
        reference = %reference_path.display(),
        compared = %compared_path.display(),
        out_dir = %out_dir.display(),
        "Starting comparison run"
    );

    let mut failures = Vec::new();
    let inputs = ComparisonInputs::new(
        load_or_empty(reference_path, Stage::LoadReference, &mut failures),
        load_or_empty(compared_path, Stage::LoadCompared, &mut failures),
    );

    let run = run_stages(&inputs, config, failures);
    write_artifacts(
        &run,
        &ArtifactContext {
            out_dir,
            reference_path,
            compared_path,
            names: &config.measurement_names,
        },
    )?;
    Ok(run)
}

/// Load and measure one mesh on its own, writing its measurement
/// artifacts under `name` into `out_dir`.
///
/// A mesh that cannot be loaded or measured produces
/// `<name>_measure_error.txt` and `Ok(None)`.
///
/// # Errors
///
/// Returns [`DiffError::WriteArtifact`](crate::DiffError::WriteArtifact)
/// when the artifacts cannot be written.
pub fn measure_to_directory(
    mesh_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    name: &str,
) -> DiffResult<Option<MeshMetrics>> {
    let (mesh_path, out_dir) = (mesh_path.as_ref(), out_dir.as_ref());
    let label = mesh_path.display().to_string();

    let mesh = match load_mesh(mesh_path) {
        Ok(mesh) => mesh,
        Err(err) => {
            warn!(path = %label, error = %err, "Could not load mesh");
            write_measurement(out_dir, name, &label, Err(&err))?;
            return Ok(None);
        }
    };

    let metrics = measure(&mesh);
    match &metrics {
        Ok(m) => info!(
            path = %label,
            surface_area = m.surface_area,
            volume = m.volume,
            watertight = m.is_watertight,
            "Mesh measured"
        ),
        Err(err) => warn!(path = %label, error = %err, "Could not measure mesh"),
    }
    write_measurement(out_dir, name, &label, metrics.as_ref())?;
    Ok(metrics.ok())
}
