//! Best-effort change detection between two scans of the same object.
//!
//! A run aligns the compared mesh onto the reference with ICP, measures
//! symmetric cloud-to-cloud and signed cloud-to-mesh distances, measures
//! both meshes and writes a fixed set of artifacts. Stages never abort the
//! run: a failing stage is recorded as a [`StageFailure`] and replaced by
//! its fallback, so every run ends in [`RunState::Complete`] with the full
//! artifact set on disk.
//!
//! | Stage | Fallback |
//! |-------|----------|
//! | load | empty mesh |
//! | align | identity transform, unaligned mesh |
//! | C2C / C2M | one zero-distance error sample |
//! | measure | `<name>_measure_error.txt` |
//!
//! # Example
//!
//! ```
//! use mesh_diff::{ComparisonInputs, DiffConfig, run_comparison};
//! use mesh_types::unit_cube;
//!
//! let mut config = DiffConfig::default();
//! config.alignment.sample_count = 3_000;
//! config.comparison.sample_count = 3_000;
//!
//! let run = run_comparison(&ComparisonInputs::new(unit_cube(), unit_cube()), &config);
//! assert!(!run.is_degraded());
//! assert!(run.c2c.stats.mean < 0.05);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod artifacts;
mod batch;
mod config;
mod error;
mod orchestrator;
pub mod report;
mod stage;

pub use artifacts::measurements_csv;
pub use batch::{BatchManifest, ComparisonJob, run_batch};
pub use config::{AlignmentConfig, ComparisonConfig, DiffConfig, MeasurementNames};
pub use error::{DiffError, DiffResult};
pub use orchestrator::{
    AlignmentRecord, ComparisonInputs, ComparisonRun, measure_to_directory, run_comparison,
    run_to_directory,
};
pub use stage::{RunState, Stage, StageFailure};
