//! Writing a run's artifact set to a directory.

use std::fmt::{self, Write as _};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mesh_compare::{CloudToCloud, CloudToMesh, DistanceStatistics};
use mesh_io::write_obj;
use mesh_measure::{MeasureError, MeshMetrics};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::MeasurementNames;
use crate::orchestrator::AlignmentRecord;
use crate::report::{self, interpretation};
use crate::{ComparisonRun, DiffError, DiffResult, RunState, Stage, StageFailure};

/// Aligned compared mesh.
pub const ALIGNED_MESH: &str = "mesh2_aligned.obj";
/// ICP transform matrix.
pub const TRANSFORM: &str = "icp_transformation.txt";
/// Per-sample C2C distances.
pub const C2C_DISTANCES: &str = "c2c_distances.csv";
/// C2C statistics row.
pub const C2C_STATISTICS: &str = "c2c_statistics.csv";
/// C2C text report.
pub const C2C_REPORT: &str = "c2c_report.txt";
/// Per-sample signed C2M distances.
pub const C2M_DISTANCES: &str = "c2m_distances.csv";
/// C2M statistics row.
pub const C2M_STATISTICS: &str = "c2m_statistics.csv";
/// C2M text report.
pub const C2M_REPORT: &str = "c2m_report.txt";
/// Run summary.
pub const SUMMARY: &str = "summary.txt";
/// Machine-readable run record.
pub const RUN_RECORD: &str = "run.json";

/// Paths and names a run's artifacts refer to.
pub(crate) struct ArtifactContext<'a> {
    pub out_dir: &'a Path,
    pub reference_path: &'a Path,
    pub compared_path: &'a Path,
    pub names: &'a MeasurementNames,
}

impl ArtifactContext<'_> {
    fn path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }

    fn write(&self, file: &str, content: &str) -> DiffResult<()> {
        write_file(self.out_dir, file, content)
    }
}

fn write_file(out_dir: &Path, file: &str, content: &str) -> DiffResult<()> {
    let path = out_dir.join(file);
    fs::write(&path, content).map_err(|source| DiffError::WriteArtifact {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
    Ok(())
}

fn create_dir(out_dir: &Path) -> DiffResult<()> {
    fs::create_dir_all(out_dir).map_err(|source| DiffError::WriteArtifact {
        path: out_dir.to_path_buf(),
        source,
    })
}

fn stats_header(signed: bool) -> &'static str {
    if signed {
        "mean,std,min,max,median,rms,positive_count,negative_count,zero_count"
    } else {
        "mean,std,min,max,median,rms"
    }
}

fn stats_csv(stats: &DistanceStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", stats_header(stats.signs.is_some()));
    let _ = write!(
        out,
        "{},{},{},{},{},{}",
        stats.mean, stats.std_dev, stats.min, stats.max, stats.median, stats.rms
    );
    if let Some(signs) = stats.signs {
        let _ = write!(out, ",{},{},{}", signs.positive, signs.negative, signs.zero);
    }
    out.push('\n');
    out
}

fn c2c_distances_csv(c2c: &CloudToCloud) -> String {
    let mut out = String::from("distance,source\n");
    for s in &c2c.samples {
        let _ = writeln!(out, "{},{}", s.distance, s.tag);
    }
    out
}

fn c2m_distances_csv(c2m: &CloudToMesh) -> String {
    let mut out = String::from("signed_distance,absolute_distance\n");
    for d in c2m.signed_distances() {
        let _ = writeln!(out, "{d},{}", d.abs());
    }
    out
}

/// The `metric,value,unit` table of one measured mesh.
///
/// Every [`MeshMetrics`] field gets a row. The first ten rows keep their
/// order; the signed volume and triangle area rows follow them.
#[must_use]
pub fn measurements_csv(m: &MeshMetrics) -> String {
    let areas = &m.triangle_areas;
    let rows: [(&str, String, &str); 16] = [
        ("surface_area", m.surface_area.to_string(), "square_units"),
        ("volume", m.volume.to_string(), "cubic_units"),
        ("vertex_count", m.vertex_count.to_string(), "count"),
        ("triangle_count", m.triangle_count.to_string(), "count"),
        ("bbox_width", m.bbox_extent.x.to_string(), "units"),
        ("bbox_height", m.bbox_extent.y.to_string(), "units"),
        ("bbox_depth", m.bbox_extent.z.to_string(), "units"),
        ("bbox_volume", m.bbox_volume.to_string(), "cubic_units"),
        ("mesh_density", m.mesh_density.to_string(), "triangles_per_cubic_unit"),
        ("is_watertight", m.is_watertight.to_string(), "boolean"),
        ("signed_volume", m.signed_volume.to_string(), "cubic_units"),
        ("average_triangle_area", m.average_triangle_area.to_string(), "square_units"),
        ("triangle_area_min", areas.min.to_string(), "square_units"),
        ("triangle_area_max", areas.max.to_string(), "square_units"),
        ("triangle_area_mean", areas.mean.to_string(), "square_units"),
        ("triangle_area_std_dev", areas.std_dev.to_string(), "square_units"),
    ];
    let mut out = String::from("metric,value,unit\n");
    for (metric, value, unit) in rows {
        let _ = writeln!(out, "{metric},{value},{unit}");
    }
    out
}

fn transform_text(run: &ComparisonRun) -> String {
    match run.failure(Stage::Align) {
        Some(failure) => format!(
            "# alignment failed: {}; identity written\n{}",
            failure.message,
            run.transform.to_text()
        ),
        None => run.transform.to_text(),
    }
}

/// Write `<name>_measurements.csv` and `<name>_measure.txt`, or
/// `<name>_measure_error.txt` when the mesh could not be measured.
pub(crate) fn write_measurement<E: fmt::Display>(
    out_dir: &Path,
    name: &str,
    mesh_label: &str,
    metrics: Result<&MeshMetrics, &E>,
) -> DiffResult<()> {
    create_dir(out_dir)?;
    match metrics {
        Ok(m) => {
            write_file(out_dir, &format!("{name}_measurements.csv"), &measurements_csv(m))?;
            write_file(
                out_dir,
                &format!("{name}_measure.txt"),
                &report::measure_report(name, mesh_label, m),
            )
        }
        Err(err) => write_file(
            out_dir,
            &format!("{name}_measure_error.txt"),
            &report::measure_error_report(name, mesh_label, err),
        ),
    }
}

fn write_aligned_mesh(ctx: &ArtifactContext<'_>, run: &ComparisonRun) -> DiffResult<()> {
    let path = ctx.path(ALIGNED_MESH);
    let to_artifact_error = |source| DiffError::WriteArtifact {
        path: path.clone(),
        source,
    };
    let file = File::create(&path).map_err(to_artifact_error)?;
    let mut writer = BufWriter::new(file);
    write_obj(&run.aligned, &mut writer).map_err(|e| to_artifact_error(std::io::Error::other(e)))?;
    writer.flush().map_err(to_artifact_error)
}

/// Outcome of one comparison stage in the run record.
#[derive(Debug, Serialize)]
struct ComparisonRecord<'a> {
    stats: &'a DistanceStatistics,
    error: Option<String>,
}

/// Measurement of one mesh in the run record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum MeasurementRecord<'a> {
    Metrics(&'a MeshMetrics),
    Error(String),
}

impl<'a> From<&'a Result<MeshMetrics, MeasureError>> for MeasurementRecord<'a> {
    fn from(result: &'a Result<MeshMetrics, MeasureError>) -> Self {
        match result {
            Ok(m) => Self::Metrics(m),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// Everything in `run.json`.
#[derive(Debug, Serialize)]
struct RunRecord<'a> {
    reference: &'a Path,
    compared: &'a Path,
    state: RunState,
    degraded: bool,
    failures: &'a [StageFailure],
    alignment: Option<AlignmentRecord>,
    transform: [[f64; 4]; 4],
    c2c: ComparisonRecord<'a>,
    c2m: ComparisonRecord<'a>,
    reference_measurement: MeasurementRecord<'a>,
    compared_measurement: MeasurementRecord<'a>,
    interpretation: Vec<String>,
}

impl<'a> RunRecord<'a> {
    fn new(run: &'a ComparisonRun, ctx: &ArtifactContext<'a>) -> Self {
        let matrix = run.transform.to_matrix4();
        let mut transform = [[0.0; 4]; 4];
        for (r, row) in transform.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = matrix[(r, c)];
            }
        }
        Self {
            reference: ctx.reference_path,
            compared: ctx.compared_path,
            state: run.state,
            degraded: run.is_degraded(),
            failures: &run.failures,
            alignment: run.alignment,
            transform,
            c2c: ComparisonRecord {
                stats: &run.c2c.stats,
                error: run.c2c.outcome.error().map(ToString::to_string),
            },
            c2m: ComparisonRecord {
                stats: &run.c2m.stats,
                error: run.c2m.outcome.error().map(ToString::to_string),
            },
            reference_measurement: (&run.reference_metrics).into(),
            compared_measurement: (&run.compared_metrics).into(),
            interpretation: interpretation(run),
        }
    }
}

/// Write the whole artifact set of `run` into `ctx.out_dir`.
///
/// The set is the same for clean and degraded runs; a failed stage
/// contributes its placeholder output instead of being skipped.
pub(crate) fn write_artifacts(run: &ComparisonRun, ctx: &ArtifactContext<'_>) -> DiffResult<()> {
    create_dir(ctx.out_dir)?;

    let reference = ctx.reference_path.display().to_string();
    let compared = ctx.compared_path.display().to_string();
    let aligned = ctx.path(ALIGNED_MESH).display().to_string();

    write_aligned_mesh(ctx, run)?;
    ctx.write(TRANSFORM, &transform_text(run))?;

    ctx.write(C2C_DISTANCES, &c2c_distances_csv(&run.c2c))?;
    ctx.write(C2C_STATISTICS, &stats_csv(&run.c2c.stats))?;
    ctx.write(C2C_REPORT, &report::c2c_report(&run.c2c, &reference, &aligned))?;

    ctx.write(C2M_DISTANCES, &c2m_distances_csv(&run.c2m))?;
    ctx.write(C2M_STATISTICS, &stats_csv(&run.c2m.stats))?;
    ctx.write(C2M_REPORT, &report::c2m_report(&run.c2m, &reference, &aligned))?;

    write_measurement(
        ctx.out_dir,
        &ctx.names.reference,
        &reference,
        run.reference_metrics.as_ref(),
    )?;
    write_measurement(
        ctx.out_dir,
        &ctx.names.compared,
        &aligned,
        run.compared_metrics.as_ref(),
    )?;

    let run_label = ctx
        .out_dir
        .file_name()
        .map_or_else(|| ctx.out_dir.display().to_string(), |n| n.to_string_lossy().into_owned());
    ctx.write(SUMMARY, &report::summary(run, &run_label))?;

    let record = serde_json::to_string_pretty(&RunRecord::new(run, ctx))?;
    ctx.write(RUN_RECORD, &record)?;

    info!(
        out_dir = %ctx.out_dir.display(),
        compared = %compared,
        degraded = run.is_degraded(),
        "Artifacts written"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_compare::CompareError;
    use mesh_measure::measure;
    use mesh_types::unit_cube;

    #[test]
    fn measurement_table_rows() {
        let csv = measurements_csv(&measure(&unit_cube()).unwrap());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], "metric,value,unit");
        assert_eq!(lines[1], "surface_area,6,square_units");
        assert_eq!(lines[3], "vertex_count,8,count");
        assert_eq!(lines[10], "is_watertight,true,boolean");
        assert!(lines[11].starts_with("signed_volume,"));
        assert!(lines[11].ends_with(",cubic_units"));
        assert_eq!(
            &lines[12..],
            [
                "average_triangle_area,0.5,square_units",
                "triangle_area_min,0.5,square_units",
                "triangle_area_max,0.5,square_units",
                "triangle_area_mean,0.5,square_units",
                "triangle_area_std_dev,0,square_units",
            ]
        );
    }

    #[test]
    fn inside_out_mesh_reports_negative_signed_volume() {
        let mut flipped = unit_cube();
        for face in &mut flipped.faces {
            face.swap(1, 2);
        }
        let csv = measurements_csv(&measure(&flipped).unwrap());
        let signed: f64 = csv
            .lines()
            .find_map(|line| line.strip_prefix("signed_volume,"))
            .and_then(|rest| rest.split(',').next())
            .unwrap()
            .parse()
            .unwrap();
        assert!((signed + 1.0).abs() < 1e-9);
    }

    #[test]
    fn sentinel_distance_rows() {
        let c2c = CloudToCloud::sentinel(CompareError::EmptySample);
        assert_eq!(c2c_distances_csv(&c2c), "distance,source\n0,error\n");

        let c2m = CloudToMesh::sentinel(CompareError::EmptySample);
        assert_eq!(c2m_distances_csv(&c2m), "signed_distance,absolute_distance\n0,0\n");
        assert!(stats_csv(&c2m.stats).starts_with(stats_header(true)));
    }
}
