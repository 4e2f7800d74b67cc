//! Wavefront OBJ support.
//!
//! Only geometry is read: `v` positions, `vn` normals and `f` faces. Face
//! corners may use any of the `v`, `v/vt`, `v//vn` and `v/vt/vn` forms, and
//! indices may be negative (relative to the end of the list read so far).
//! Polygons with more than three corners are fan-triangulated. Other
//! statements (`vt`, `o`, `g`, `usemtl`, `s`, ...) are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vector3, Vertex};

use crate::error::{IoError, IoResult, open_for_read};

/// Load a mesh from an OBJ file.
///
/// A vertex takes the normal of the first face corner that references it
/// with a `vn` index.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file, a parse error for a
/// malformed number and [`IoError::InvalidContent`] for a face corner that
/// references a vertex outside the list.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_obj;
///
/// let mesh = load_obj("scan.obj").unwrap();
/// println!("{} triangles", mesh.faces.len());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    parse_obj(BufReader::new(open_for_read(path.as_ref())?))
}

/// Parse OBJ text from any buffered reader.
///
/// # Errors
///
/// See [`load_obj`].
pub fn parse_obj<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut normals: Vec<Vector3<f64>> = Vec::new();
    let mut corners: Vec<(u32, Option<usize>)> = Vec::with_capacity(4);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let [x, y, z] = parse_triple(&mut parts, line_no)?;
                mesh.vertices.push(Vertex::from_coords(x, y, z));
            }
            Some("vn") => {
                let [x, y, z] = parse_triple(&mut parts, line_no)?;
                normals.push(Vector3::new(x, y, z));
            }
            Some("f") => {
                corners.clear();
                for token in parts {
                    corners.push(parse_corner(
                        token,
                        mesh.vertices.len(),
                        normals.len(),
                        line_no,
                    )?);
                }
                if corners.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {line_no}: face needs at least three corners"
                    )));
                }

                for &(v, n) in &corners {
                    let vertex = &mut mesh.vertices[v as usize];
                    if vertex.normal.is_none() {
                        vertex.normal = n.map(|i| normals[i]);
                    }
                }

                let anchor = corners[0].0;
                for pair in corners[1..].windows(2) {
                    mesh.faces.push([anchor, pair[0].0, pair[1].0]);
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

fn parse_triple<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> IoResult<[f64; 3]> {
    let mut out = [0.0; 3];
    for slot in &mut out {
        let token = parts.next().ok_or_else(|| {
            IoError::invalid_content(format!("line {line_no}: expected three coordinates"))
        })?;
        *slot = token.parse()?;
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, relative) OBJ index against `len` items.
fn resolve_index(raw: i64, len: usize, line_no: usize) -> IoResult<usize> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(len_i + r),
    };
    match resolved {
        Some(i) if (0..len_i).contains(&i) => usize::try_from(i)
            .map_err(|_| IoError::invalid_content(format!("line {line_no}: index {raw}"))),
        _ => Err(IoError::invalid_content(format!(
            "line {line_no}: index {raw} is outside the {len} entries defined so far"
        ))),
    }
}

fn parse_corner(
    token: &str,
    vertex_count: usize,
    normal_count: usize,
    line_no: usize,
) -> IoResult<(u32, Option<usize>)> {
    let mut fields = token.split('/');
    let vertex_raw: i64 = fields.next().unwrap_or_default().parse()?;
    let vertex = resolve_index(vertex_raw, vertex_count, line_no)?;
    let vertex = u32::try_from(vertex)
        .map_err(|_| IoError::invalid_content(format!("line {line_no}: too many vertices")))?;

    // Texture coordinates are skipped.
    let _ = fields.next();
    let normal = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s.parse()?, normal_count, line_no)?),
        _ => None,
    };

    Ok((vertex, normal))
}

/// Save a mesh as OBJ.
///
/// Normals are written (`vn`, one per vertex, referenced as `v//vn`) only
/// when every vertex has one.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write OBJ text to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_obj<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    let with_normals = !mesh.vertices.is_empty() && mesh.vertices.iter().all(|v| v.normal.is_some());

    writeln!(writer, "# {} vertices, {} faces", mesh.vertices.len(), mesh.faces.len())?;
    for v in &mesh.vertices {
        let p = v.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    if with_normals {
        for n in mesh.vertices.iter().filter_map(|v| v.normal) {
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }
    for &[a, b, c] in &mesh.faces {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        if with_normals {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }
    Ok(())
}
