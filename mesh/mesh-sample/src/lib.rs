//! Surface sampling and nearest-neighbour search.
//!
//! Everything that turns a mesh into points, and everything that queries
//! those points:
//!
//! - [`sample_points_uniformly`] - area-weighted uniform samples of a mesh surface
//! - [`estimate_normals`] - PCA normals from a hybrid radius/count neighbourhood
//! - [`NearestNeighborIndex`] - exact nearest-neighbour queries over a k-d tree
//! - [`PointCloud`] - the sampled points themselves
//!
//! Sampling is seeded, so two runs over the same mesh with the same
//! [`SampleParams`] produce identical clouds.
//!
//! # Example
//!
//! ```
//! use mesh_sample::{NearestNeighborIndex, SampleParams, sample_points_uniformly};
//! use mesh_types::unit_cube;
//!
//! let cloud = sample_points_uniformly(&unit_cube(), &SampleParams::new().with_count(1000)).unwrap();
//! let index = NearestNeighborIndex::from_cloud(&cloud).unwrap();
//!
//! let hit = index.nearest(&cloud.points[10].position);
//! assert!(hit.distance < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cloud;
mod error;
mod index;
mod normals;
mod sampler;

pub use cloud::{CloudPoint, PointCloud};
pub use error::{SampleError, SampleResult};
pub use index::{NearestNeighborIndex, Neighbor, nearest_by_scan};
pub use normals::{NormalParams, estimate_normals};
pub use sampler::{DEFAULT_SEED, SampleParams, sample_points_uniformly};
