//! Wavefront OBJ subset loader.
//!
//! Only triangles written as `i/j/k` groups are accepted. Shared vertices are
//! expanded so that the result can be uploaded and drawn with `draw_arrays`.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::data::{FaceIndexTriple, FlatMesh};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("mesh file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error reading '{0}': {1}")]
    Io(PathBuf, #[source] io::Error),

    #[error("line {line}: malformed '{kind}' record: {reason}")]
    MalformedRecord {
        line: usize,
        kind: &'static str,
        reason: String,
    },

    #[error("line {line}: malformed face: {reason}")]
    MalformedFace { line: usize, reason: String },

    #[error("line {line}: {stream} index {index} is out of range (1..={len})")]
    IndexOutOfRange {
        line: usize,
        stream: &'static str,
        index: u32,
        len: usize,
    },
}

pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<FlatMesh, LoadError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::FileNotFound(path.to_path_buf()),
        _ => LoadError::Io(path.to_path_buf(), e),
    })?;

    let mesh = parse_obj(BufReader::new(file), path)?;

    info!(
        "Loaded mesh {:?}: {} triangles{}",
        path,
        mesh.triangle_count(),
        if mesh.is_textureless() { " (no uvs)" } else { "" }
    );

    Ok(mesh)
}

pub fn parse_obj<R: BufRead>(reader: R, origin: &Path) -> Result<FlatMesh, LoadError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut faces: Vec<[FaceIndexTriple; 3]> = Vec::new();

    // Split on raw bytes: comments and names may be in any encoding.
    for (i, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(|e| LoadError::Io(origin.to_path_buf(), e))?;
        let line = String::from_utf8_lossy(&line);
        let line_no = i + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => positions.push(read_floats(&mut tokens, line_no, "v")?),
            Some("vt") => uvs.push(read_floats(&mut tokens, line_no, "vt")?),
            Some("vn") => normals.push(read_floats(&mut tokens, line_no, "vn")?),
            Some("f") => faces.push(read_face(tokens, line_no)?),
            // o, g, s, usemtl, mtllib, comments ...
            _ => {}
        }
    }

    debug!(
        "{:?}: {} positions, {} uvs, {} normals, {} faces",
        origin,
        positions.len(),
        uvs.len(),
        normals.len(),
        faces.len()
    );

    expand(&positions, &uvs, &normals, &faces)
}

fn read_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    kind: &'static str,
) -> Result<[f32; N], LoadError> {
    let mut values = [0.0f32; N];

    for (found, value) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| LoadError::MalformedRecord {
            line,
            kind,
            reason: format!("expected {} numbers, found {}", N, found),
        })?;

        *value = token.parse().map_err(|_| LoadError::MalformedRecord {
            line,
            kind,
            reason: format!("'{}' is not a number", token),
        })?;
    }

    Ok(values)
}

fn read_face<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[FaceIndexTriple; 3], LoadError> {
    let groups: Vec<&str> = tokens.collect();
    if groups.len() != 3 {
        return Err(LoadError::MalformedFace {
            line,
            reason: format!("expected 3 vertex groups, found {}", groups.len()),
        });
    }

    let mut corners = [FaceIndexTriple::new(0, 0, 0, line); 3];
    for (corner, group) in corners.iter_mut().zip(&groups) {
        let indices = group
            .split('/')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<u32>>>()
            .filter(|indices| indices.len() == 3)
            .ok_or_else(|| LoadError::MalformedFace {
                line,
                reason: format!("'{}' is not of the form i/j/k", group),
            })?;

        *corner = FaceIndexTriple::new(indices[0], indices[1], indices[2], line);
    }

    Ok(corners)
}

fn expand(
    positions: &[[f32; 3]],
    uvs: &[[f32; 2]],
    normals: &[[f32; 3]],
    faces: &[[FaceIndexTriple; 3]],
) -> Result<FlatMesh, LoadError> {
    let vertex_count = faces.len() * 3;
    let mut mesh = FlatMesh {
        positions: Vec::with_capacity(vertex_count),
        uvs: Vec::new(),
        normals: Vec::with_capacity(vertex_count),
    };

    // A corner contributes a uv only if it names one and the file has any.
    let uses_uv = |corner: &FaceIndexTriple| corner.uv != 0 && !uvs.is_empty();
    let mut textured: Option<bool> = None;

    for face in faces {
        let line = face[0].line;
        let face_textured = uses_uv(&face[0]);

        if face.iter().any(|corner| uses_uv(corner) != face_textured) {
            return Err(LoadError::MalformedFace {
                line,
                reason: "uv index given for some corners but not others".to_string(),
            });
        }

        match textured {
            None => textured = Some(face_textured),
            Some(expected) if expected != face_textured => {
                return Err(LoadError::MalformedFace {
                    line,
                    reason: "uv presence differs from earlier faces".to_string(),
                });
            }
            Some(_) => {}
        }

        for corner in face {
            mesh.positions.push(resolve(positions, corner.position, "position", line)?);
            if face_textured {
                mesh.uvs.push(resolve(uvs, corner.uv, "uv", line)?);
            }
            mesh.normals.push(resolve(normals, corner.normal, "normal", line)?);
        }
    }

    Ok(mesh)
}

fn resolve<T: Copy>(
    list: &[T],
    index: u32,
    stream: &'static str,
    line: usize,
) -> Result<T, LoadError> {
    (index as usize)
        .checked_sub(1)
        .and_then(|i| list.get(i))
        .copied()
        .ok_or(LoadError::IndexOutOfRange {
            line,
            stream,
            index,
            len: list.len(),
        })
}
