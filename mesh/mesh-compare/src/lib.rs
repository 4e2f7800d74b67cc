//! Distance comparison between two meshes.
//!
//! - [`cloud_to_cloud`] - symmetric nearest-neighbour distances between
//!   surface samples of both meshes (C2C)
//! - [`cloud_to_mesh`] - signed distances from samples of one mesh to the
//!   other (C2M), signed by the reference bounding box
//! - [`DistanceStatistics`] - mean, population std, min, max, median, rms
//!
//! Both comparisons have `*_or_sentinel` variants that never fail: on error
//! they return one zero-distance sample tagged [`SampleTag::Error`] and an
//! [`Outcome::Degraded`] holding the cause.
//!
//! # Example
//!
//! ```
//! use mesh_compare::{CompareParams, cloud_to_mesh_or_sentinel};
//! use mesh_types::{IndexedMesh, unit_cube};
//!
//! let params = CompareParams::new().with_sample_count(1_000);
//! let c2m = cloud_to_mesh_or_sentinel(&unit_cube(), &IndexedMesh::new(), &params);
//!
//! assert!(c2m.outcome.is_degraded());
//! assert_eq!(c2m.stats.count, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod c2c;
mod c2m;
mod error;
mod params;
mod sample;
mod sentinel;
mod statistics;

pub use c2c::{CloudToCloud, cloud_to_cloud};
pub use c2m::{CloudToMesh, bbox_signed_distance, cloud_to_mesh};
pub use error::{CompareError, CompareResult, MeshRole};
pub use params::{CompareParams, NearestTarget};
pub use sample::{DistanceSample, SampleTag};
pub use sentinel::{Outcome, cloud_to_cloud_or_sentinel, cloud_to_mesh_or_sentinel};
pub use statistics::{DistanceStatistics, SignCounts};
