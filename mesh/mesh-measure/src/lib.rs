//! Geometric measurement of triangle meshes.
//!
//! - [`measure`] - area, volume, watertightness, bounding box, density and
//!   triangle-area statistics in one [`MeshMetrics`]
//! - [`EdgeUsage`] - per-edge face counts and winding consistency
//! - [`dimensions`] - axis-aligned bounding box sizes
//! - [`closest_point_on_triangle`] / [`distance_to_mesh`] - exact
//!   point-to-surface queries
//!
//! # Example
//!
//! ```
//! use mesh_measure::measure;
//! use mesh_types::unit_cube;
//!
//! let metrics = measure(&unit_cube()).unwrap();
//! assert_eq!(metrics.triangle_count, 12);
//! assert!(metrics.is_watertight);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod dimensions;
mod distance;
mod edges;
mod error;
mod metrics;

pub use dimensions::{Dimensions, dimensions};
pub use distance::{closest_point_on_mesh, closest_point_on_triangle, distance_to_mesh};
pub use edges::EdgeUsage;
pub use error::{MeasureError, MeasureResult};
pub use metrics::{MeshMetrics, TriangleAreaStats, measure};
