//! Mesh file I/O.
//!
//! Loading and saving of triangle meshes:
//!
//! - **OBJ** (Wavefront), the primary exchange format for reconstructions
//! - **STL** (Stereolithography), binary and ASCII
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! // Format detected from the extension
//! let mesh = load_mesh("scan.stl").unwrap();
//! save_mesh(&mesh, "scan.obj").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod obj;
mod stl;

pub use error::{IoError, IoResult};
pub use obj::{load_obj, parse_obj, save_obj, write_obj};
pub use stl::{load_stl, parse_stl, save_stl};

use std::path::Path;

use mesh_types::IndexedMesh;
use tracing::debug;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ.
    Obj,
    /// STL, binary or ASCII.
    Stl,
}

impl MeshFormat {
    /// Detect the format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            _ => None,
        }
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
        }
    }
}

fn detect(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh, detecting the format from the extension.
///
/// The mesh is returned as read; callers validate it before use.
///
/// # Errors
///
/// Returns an error for an unknown extension, an unreadable file or
/// malformed content.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let mesh = match detect(path)? {
        MeshFormat::Obj => load_obj(path)?,
        MeshFormat::Stl => load_stl(path)?,
    };
    debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Loaded mesh"
    );
    Ok(mesh)
}

/// Save a mesh, detecting the format from the extension.
///
/// STL is written in binary.
///
/// # Errors
///
/// Returns an error for an unknown extension or a failed write.
pub fn save_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Obj => save_obj(mesh, path),
        MeshFormat::Stl => save_stl(mesh, path, true),
    }
}
