//! Human-readable reports.

use std::fmt::Write as _;

use mesh_compare::{CloudToCloud, CloudToMesh, DistanceStatistics, SampleTag};
use mesh_measure::{MeasureError, MeshMetrics};

use crate::ComparisonRun;

/// Surface-area change above which the summary flags it.
pub const AREA_CHANGE_THRESHOLD: f64 = 0.01;
/// Volume change above which the summary flags it.
pub const VOLUME_CHANGE_THRESHOLD: f64 = 0.01;
/// Maximum C2C distance above which the summary flags a local change.
pub const LOCAL_CHANGE_THRESHOLD: f64 = 0.05;

fn rule(out: &mut String, ch: char, width: usize) {
    out.extend(std::iter::repeat_n(ch, width));
    out.push('\n');
}

/// `1234567` as `1,234,567`.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn write_stats(out: &mut String, stats: &DistanceStatistics) {
    for (key, value) in [
        ("MEAN", stats.mean),
        ("STD", stats.std_dev),
        ("MIN", stats.min),
        ("MAX", stats.max),
        ("MEDIAN", stats.median),
        ("RMS", stats.rms),
    ] {
        let _ = writeln!(out, "  {key}: {value:.6}");
    }
}

/// Report for the cloud-to-cloud stage.
#[must_use]
pub fn c2c_report(c2c: &CloudToCloud, reference: &str, compared: &str) -> String {
    let mut out = String::from("C2C Distance Comparison Report\n");
    rule(&mut out, '=', 40);
    let _ = writeln!(out, "\nMesh 1: {reference}\nMesh 2: {compared}\n");
    if let Some(err) = c2c.outcome.error() {
        let _ = writeln!(out, "C2C comparison failed: {err}\n");
    }
    out.push_str("Distance Statistics:\n");
    write_stats(&mut out, &c2c.stats);
    let _ = writeln!(out, "\nTotal points analyzed: {}", c2c.stats.count);
    let _ = writeln!(
        out,
        "Points from {}: {}",
        SampleTag::AToB.label().replace('_', " "),
        c2c.a_to_b_count
    );
    let _ = writeln!(
        out,
        "Points from {}: {}",
        SampleTag::BToA.label().replace('_', " "),
        c2c.b_to_a_count
    );
    out
}

/// Report for the cloud-to-mesh stage.
#[must_use]
pub fn c2m_report(c2m: &CloudToMesh, reference: &str, compared: &str) -> String {
    let mut out = String::from("C2M Distance Comparison Report\n");
    rule(&mut out, '=', 40);
    let _ = writeln!(out, "\nReference Mesh: {reference}\nCloud Mesh: {compared}\n");
    if let Some(err) = c2m.outcome.error() {
        let _ = writeln!(out, "C2M comparison failed: {err}\n");
    }
    out.push_str("Signed Distance Statistics:\n");
    write_stats(&mut out, &c2m.stats);
    let signs = c2m.stats.signs.unwrap_or_default();
    let _ = writeln!(out, "  POSITIVE_COUNT: {}", signs.positive);
    let _ = writeln!(out, "  NEGATIVE_COUNT: {}", signs.negative);
    let _ = writeln!(out, "  ZERO_COUNT: {}", signs.zero);
    let _ = writeln!(out, "\nTotal points analyzed: {}", c2m.stats.count);
    let _ = writeln!(out, "Positive distances (outside): {}", signs.positive);
    let _ = writeln!(out, "Negative distances (inside): {}", signs.negative);
    let _ = writeln!(out, "Zero distances: {}", signs.zero);
    out.push_str("\nSign is taken from the reference bounding box, not the surface.\n");
    out
}

/// Report for one successful measurement.
#[must_use]
pub fn measure_report(name: &str, mesh_label: &str, m: &MeshMetrics) -> String {
    let mut out = format!("Mesh Measurement Report for {name}\n");
    rule(&mut out, '=', 50);
    let _ = writeln!(out, "\nMesh File: {mesh_label}\n");

    out.push_str("GEOMETRIC PROPERTIES:\n");
    rule(&mut out, '-', 20);
    let _ = writeln!(out, "Surface Area: {:.6} square units", m.surface_area);
    let _ = writeln!(out, "Volume: {:.6} cubic units", m.volume);
    let _ = writeln!(out, "Vertex Count: {}", thousands(m.vertex_count));
    let _ = writeln!(out, "Triangle Count: {}\n", thousands(m.triangle_count));

    out.push_str("BOUNDING BOX:\n");
    rule(&mut out, '-', 20);
    let _ = writeln!(out, "Width (X): {:.6} units", m.bbox_extent.x);
    let _ = writeln!(out, "Height (Y): {:.6} units", m.bbox_extent.y);
    let _ = writeln!(out, "Depth (Z): {:.6} units", m.bbox_extent.z);
    let _ = writeln!(out, "Bounding Box Volume: {:.6} cubic units\n", m.bbox_volume);

    out.push_str("QUALITY METRICS:\n");
    rule(&mut out, '-', 20);
    let _ = writeln!(out, "Mesh Density: {:.2} triangles/cubic unit", m.mesh_density);
    let _ = writeln!(out, "Watertight: {}", if m.is_watertight { "Yes" } else { "No" });
    if !m.is_watertight {
        out.push_str("  (volume is not meaningful for an open mesh)\n");
    }
    let _ = writeln!(out, "Average Triangle Area: {:.6} square units", m.average_triangle_area);
    out.push_str("Triangle Area Statistics:\n");
    let a = &m.triangle_areas;
    let _ = writeln!(out, "  - Min: {:.6}", a.min);
    let _ = writeln!(out, "  - Max: {:.6}", a.max);
    let _ = writeln!(out, "  - Mean: {:.6}", a.mean);
    let _ = writeln!(out, "  - Std Dev: {:.6}", a.std_dev);
    out
}

/// Error record for a failed measurement.
#[must_use]
pub fn measure_error_report(name: &str, mesh_label: &str, error: &impl std::fmt::Display) -> String {
    let mut out = format!("Mesh Measurement Error for {name}\n");
    rule(&mut out, '=', 40);
    let _ = writeln!(out, "\nError: {error}");
    let _ = writeln!(out, "Mesh Path: {mesh_label}");
    out
}

/// Difference `compared - reference` when both sides were measured.
fn delta(
    reference: &Result<MeshMetrics, MeasureError>,
    compared: &Result<MeshMetrics, MeasureError>,
    field: fn(&MeshMetrics) -> f64,
) -> Option<f64> {
    match (reference, compared) {
        (Ok(r), Ok(c)) => Some(field(c) - field(r)),
        _ => None,
    }
}

fn metric_or_na(metrics: &Result<MeshMetrics, MeasureError>, field: fn(&MeshMetrics) -> f64) -> String {
    metrics
        .as_ref()
        .map_or_else(|_| "N/A".to_owned(), |m| format!("{:.6}", field(m)))
}

/// Findings worth a reader's attention, or the all-clear line.
#[must_use]
pub fn interpretation(run: &ComparisonRun) -> Vec<String> {
    let area = delta(&run.reference_metrics, &run.compared_metrics, |m| m.surface_area);
    let volume = delta(&run.reference_metrics, &run.compared_metrics, |m| m.volume);

    let mut lines = Vec::new();
    if let Some(d) = area.filter(|d| d.abs() > AREA_CHANGE_THRESHOLD) {
        lines.push(format!("Surface area changed by {d:+.3} m²."));
    }
    if let Some(d) = volume.filter(|d| d.abs() > VOLUME_CHANGE_THRESHOLD) {
        lines.push(format!("Volume changed by {d:+.3} m³."));
    }
    if !run.c2c.outcome.is_degraded() && run.c2c.stats.max > LOCAL_CHANGE_THRESHOLD {
        lines.push(format!(
            "Largest local change: {:.1} cm.",
            run.c2c.stats.max * 100.0
        ));
    }
    if lines.is_empty() {
        lines.push("No significant anomalies detected.".to_owned());
    }
    lines
}

/// The run summary: headline distances, area and volume of both meshes,
/// an interpretation block and any degraded stages.
#[must_use]
pub fn summary(run: &ComparisonRun, run_label: &str) -> String {
    let na_if = |degraded: bool, value: f64| {
        if degraded {
            "N/A".to_owned()
        } else {
            format!("{value:.6}")
        }
    };
    let c2c_failed = run.c2c.outcome.is_degraded();
    let c2m_failed = run.c2m.outcome.is_degraded();

    let mut out = format!("Comparison Summary ({run_label}):\n\n");
    let _ = writeln!(out, "- Mean C2C distance: {} m", na_if(c2c_failed, run.c2c.stats.mean));
    let _ = writeln!(out, "- Max C2C distance: {} m", na_if(c2c_failed, run.c2c.stats.max));
    let _ = writeln!(
        out,
        "- Mean signed C2M distance: {} m",
        na_if(c2m_failed, run.c2m.stats.mean)
    );
    let _ = writeln!(
        out,
        "- Max signed C2M distance: {} m",
        na_if(c2m_failed, run.c2m.stats.max)
    );

    let area = delta(&run.reference_metrics, &run.compared_metrics, |m| m.surface_area);
    let volume = delta(&run.reference_metrics, &run.compared_metrics, |m| m.volume);
    let _ = writeln!(
        out,
        "- Mesh1 area: {} m², Mesh2 area: {} m²{}",
        metric_or_na(&run.reference_metrics, |m| m.surface_area),
        metric_or_na(&run.compared_metrics, |m| m.surface_area),
        area.map(|d| format!(" (Δ {d:+.3} m²)")).unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "- Mesh1 volume: {} m³, Mesh2 volume: {} m³{}",
        metric_or_na(&run.reference_metrics, |m| m.volume),
        metric_or_na(&run.compared_metrics, |m| m.volume),
        volume.map(|d| format!(" (Δ {d:+.3} m³)")).unwrap_or_default()
    );
    if let Some(a) = &run.alignment {
        let _ = writeln!(
            out,
            "- Alignment fitness: {:.4}, inlier RMSE: {:.6} m, iterations: {}",
            a.fitness, a.inlier_rmse, a.iterations
        );
    }

    out.push_str("\nInterpretation:\n");
    for line in interpretation(run) {
        let _ = writeln!(out, "- {line}");
    }

    if run.is_degraded() {
        out.push_str("\nDegraded stages:\n");
        for failure in &run.failures {
            let _ = writeln!(out, "- {failure}");
        }
    }
    out
}
