//! STL (Stereolithography) support, ASCII and binary.
//!
//! STL stores an unindexed triangle soup: every facet carries its own three
//! corners. Loading keeps that layout (three fresh vertices per facet), which
//! is fine for sampling and measurement; watertightness checks on STL input
//! need the corners welded first and will report `false` otherwise.
//!
//! Binary layout:
//!
//! ```text
//! UINT8[80]    header
//! UINT32       triangle count
//! per triangle: REAL32[3] normal, REAL32[3] x 3 corners, UINT16 attribute
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, MeshTopology, Triangle, Vertex};

use crate::error::{IoError, IoResult, open_for_read};

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// Load an STL file, detecting ASCII or binary from the content.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file and
/// [`IoError::InvalidContent`] / [`IoError::InvalidFaceCount`] for malformed
/// data.
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    open_for_read(path)?.read_to_end(&mut bytes)?;
    parse_stl(&bytes)
}

/// Parse STL bytes already in memory.
///
/// # Errors
///
/// See [`load_stl`].
pub fn parse_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }
    if looks_ascii(bytes) {
        parse_ascii(BufReader::new(bytes))
    } else {
        parse_binary(bytes)
    }
}

/// ASCII files start with `solid`; binary files may too, but their header is
/// then followed by a triangle count that matches the byte length exactly.
fn looks_ascii(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_SIZE)]);
    if !head.trim_start().starts_with("solid") {
        return false;
    }
    if bytes.len() >= HEADER_SIZE + 4 {
        let count = u32::from_le_bytes([
            bytes[HEADER_SIZE],
            bytes[HEADER_SIZE + 1],
            bytes[HEADER_SIZE + 2],
            bytes[HEADER_SIZE + 3],
        ]) as usize;
        if bytes.len() == HEADER_SIZE + 4 + count * TRIANGLE_SIZE {
            return false;
        }
    }
    true
}

fn parse_binary(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::InvalidHeader {
            expected: HEADER_SIZE + 4,
            got: bytes.len(),
        });
    }

    let face_count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[HEADER_SIZE + 4..];
    let complete = body.len() / TRIANGLE_SIZE;
    if complete < face_count as usize {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: complete < face_count, which is a u32
        return Err(IoError::InvalidFaceCount {
            expected: face_count,
            got: complete as u32,
        });
    }

    let mut mesh = IndexedMesh::with_capacity(face_count as usize * 3, face_count as usize);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(face_count as usize) {
        // Skip the stored normal; it is recomputed on save.
        push_facet(
            &mut mesh,
            [
                read_vertex(&record[12..24]),
                read_vertex(&record[24..36]),
                read_vertex(&record[36..48]),
            ],
        );
    }

    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> Vertex {
    let coord = |i: usize| {
        f64::from(f32::from_le_bytes([
            buf[i],
            buf[i + 1],
            buf[i + 2],
            buf[i + 3],
        ]))
    };
    Vertex::from_coords(coord(0), coord(4), coord(8))
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32
fn push_facet(mesh: &mut IndexedMesh, corners: [Vertex; 3]) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices.extend(corners);
    mesh.faces.push([base, base + 1, base + 2]);
}

fn parse_ascii<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => corners.clear(),
            "vertex" => {
                let coords: Vec<f64> = parts
                    .take(3)
                    .map(str::parse)
                    .collect::<Result<_, _>>()?;
                let [x, y, z] = coords[..] else {
                    return Err(IoError::invalid_content(format!(
                        "line {}: vertex needs three coordinates",
                        line_no + 1
                    )));
                };
                corners.push(Vertex::from_coords(x, y, z));
            }
            "endfacet" => {
                if let [a, b, c] = corners[..] {
                    push_facet(&mut mesh, [a, b, c]);
                }
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(mesh)
}

/// Save a mesh as STL.
///
/// Faces with out-of-range indices are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    if binary {
        write_binary(mesh, &mut writer)?;
    } else {
        write_ascii(mesh, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn facet_normal(tri: &Triangle) -> [f64; 3] {
    tri.normal().map_or([0.0; 3], |n| [n.x, n.y, n.z])
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: STL stores f32
fn write_binary<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let triangles: Vec<Triangle> = mesh.triangles().collect();
    writer.write_all(&(triangles.len() as u32).to_le_bytes())?;

    for tri in &triangles {
        let normal = facet_normal(tri);
        let corners = [tri.v0, tri.v1, tri.v2];
        let values = normal
            .into_iter()
            .chain(corners.iter().flat_map(|p| [p.x, p.y, p.z]));
        for value in values {
            writer.write_all(&(value as f32).to_le_bytes())?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

fn write_ascii<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    writeln!(writer, "solid mesh")?;
    for tri in mesh.triangles() {
        let [nx, ny, nz] = facet_normal(&tri);
        writeln!(writer, "  facet normal {nx:.6e} {ny:.6e} {nz:.6e}")?;
        writeln!(writer, "    outer loop")?;
        for p in [tri.v0, tri.v1, tri.v2] {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid mesh")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;

    #[test]
    fn binary_roundtrip_keeps_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        let cube = unit_cube();

        save_stl(&cube, &path, true).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.face_count(), 12);
        assert_eq!(loaded.vertex_count(), 36);
        assert_relative_eq!(loaded.surface_area(), 6.0, epsilon = 1e-6);
        assert_relative_eq!(loaded.signed_volume(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ascii_roundtrip_keeps_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube_ascii.stl");

        save_stl(&unit_cube(), &path, false).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.face_count(), 12);
        assert_relative_eq!(loaded.surface_area(), 6.0, epsilon = 1e-5);
    }

    #[test]
    fn binary_header_starting_with_solid_is_still_binary() {
        let mut bytes = vec![b' '; HEADER_SIZE];
        bytes[..5].copy_from_slice(b"solid");
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let mut record = [0u8; TRIANGLE_SIZE];
        record[24..28].copy_from_slice(&1.0f32.to_le_bytes());
        record[40..44].copy_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&record);

        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertices[1].position.x, 1.0);
        assert_eq!(mesh.vertices[2].position.y, 1.0);
    }

    #[test]
    fn truncated_binary_reports_face_count() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; TRIANGLE_SIZE]);

        let err = parse_stl(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidFaceCount {
                expected: 3,
                got: 1
            }
        ));
    }

    #[test]
    fn ascii_parsing() {
        let text = b"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test";

        let mesh = parse_stl(text).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_stl("nonexistent_file_12345.stl").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
