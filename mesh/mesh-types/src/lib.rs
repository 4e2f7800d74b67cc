//! Core mesh types for reconstruction comparison.
//!
//! This crate provides the value types every other crate in the workspace
//! passes around:
//!
//! - [`Vertex`] - A position with an optional unit normal
//! - [`IndexedMesh`] - Vertices plus triangles referencing them by index
//! - [`Triangle`] - A triangle with resolved vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! Meshes produced by an upstream reconstruction are treated as immutable
//! inputs: operations in downstream crates return new meshes instead of
//! editing the one they were given.
//!
//! # Units
//!
//! Coordinates are unit-agnostic `f64` "scene units". Photogrammetry output
//! is usually metric but only up to scale.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, MeshTopology, Vertex};
//!
//! let mesh = IndexedMesh::from_parts(
//!     vec![
//!         Vertex::from_coords(0.0, 0.0, 0.0),
//!         Vertex::from_coords(1.0, 0.0, 0.0),
//!         Vertex::from_coords(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! assert!(mesh.validate().is_ok());
//! assert_eq!(mesh.face_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod error;
mod mesh;
mod traits;
mod triangle;
mod vertex;

pub use bounds::Aabb;
pub use error::{MeshError, MeshResult};
pub use mesh::{IndexedMesh, unit_cube};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
