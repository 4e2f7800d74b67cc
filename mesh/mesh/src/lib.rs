//! Change detection between two scans of the same object.
//!
//! This umbrella crate re-exports the mesh-* crates behind one API: load two
//! meshes, align the second onto the first, measure how far apart their
//! surfaces are and how their geometry changed.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! let config = DiffConfig::default();
//! let run = run_to_directory("before.obj", "after.obj", "out", &config).unwrap();
//!
//! for failure in &run.failures {
//!     eprintln!("{failure}");
//! }
//! println!("mean C2C distance: {:.4}", run.c2c.stats.mean);
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - Core data structures: `IndexedMesh`, `Vertex`, `Triangle`, `Aabb`
//! - [`io`] - File I/O for OBJ and STL
//! - [`sample`] - Surface sampling, nearest-neighbour search, normals
//!
//! ## Analysis
//! - [`registration`] - Point-to-point ICP alignment
//! - [`compare`] - Cloud-to-cloud and signed cloud-to-mesh distances
//! - [`measure`] - Area, volume, bounding box, watertightness
//!
//! ## Runs
//! - [`diff`] - The never-abort comparison run and its artifacts

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `Vertex`, `Triangle`, `Aabb`.
pub use mesh_types as types;

/// File I/O for OBJ and STL.
pub use mesh_io as io;

/// Surface sampling, nearest-neighbour search and normal estimation.
pub use mesh_sample as sample;

/// Point-to-point ICP alignment.
pub use mesh_registration as registration;

/// Cloud-to-cloud and cloud-to-mesh distance comparison.
pub use mesh_compare as compare;

/// Area, volume, bounding box and watertightness.
pub use mesh_measure as measure;

/// Comparison runs, configuration and artifacts.
pub use mesh_diff as diff;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for mesh comparison.
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{Aabb, IndexedMesh, MeshBounds, MeshTopology, Triangle, Vertex};

    // I/O
    pub use mesh_io::{MeshFormat, load_mesh, save_mesh};

    // Stages
    pub use mesh_compare::{CompareParams, cloud_to_cloud, cloud_to_mesh};
    pub use mesh_measure::{MeshMetrics, measure};
    pub use mesh_registration::{AlignmentParams, RigidTransform, align_meshes};

    // Runs
    pub use mesh_diff::{ComparisonInputs, DiffConfig, run_comparison, run_to_directory};
}
