//! Mesh file loading.
//!
//! Only STL (ASCII and binary) is read. OBJ and FBX are recognized but
//! reported as not yet supported instead of being accepted silently.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};

use super::{MeshModel, MeshParams};
use crate::error::MeshLoadError;
use crate::math::{Point3, Vector3};

/// Mesh file formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Fbx,
}

impl MeshFormat {
    /// Detects the format from the file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            "fbx" => Some(Self::Fbx),
            _ => None,
        }
    }

    /// Lowercase extension of the format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Fbx => "fbx",
        }
    }
}

/// Loads a mesh from `path`, dispatching on its extension.
///
/// # Errors
///
/// - [`MeshLoadError::UnsupportedFormat`] for unknown extensions.
/// - [`MeshLoadError::NotYetSupported`] for `.obj` and `.fbx`.
/// - [`MeshLoadError::NotFound`] / [`MeshLoadError::Io`] if the file cannot be opened.
/// - [`MeshLoadError::Parse`] for malformed STL data.
/// - [`MeshLoadError::Empty`] if the file holds no triangles.
pub fn load_mesh(path: &Path, params: &MeshParams) -> Result<MeshModel, MeshLoadError> {
    let format = MeshFormat::from_path(path).ok_or_else(|| MeshLoadError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!("Loading mesh from {:?} (format: {:?})", path, format);

    let mesh = match format {
        MeshFormat::Stl => {
            let file = File::open(path).map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    MeshLoadError::NotFound(path.to_path_buf())
                } else {
                    MeshLoadError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                }
            })?;
            let mut reader = BufReader::new(file);
            read_stl(&mut reader, path, params)?
        }
        MeshFormat::Obj | MeshFormat::Fbx => {
            return Err(MeshLoadError::NotYetSupported(format.extension().into()));
        }
    };

    let bounds = mesh.bounds();
    let dims = bounds.max - bounds.min;
    info!(
        "Loaded mesh: {} triangles, {} vertices",
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    debug!(
        "Bounding box: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );
    if dims.amax() < 1e-3 {
        warn!("Mesh largest dimension is {:.6} - may need scaling", dims.amax());
    }

    Ok(mesh)
}

/// Reads an STL stream (binary or ASCII) into a mesh.
///
/// `path` is only used for error messages.
///
/// # Errors
///
/// Returns [`MeshLoadError::Parse`] if the stream is not valid STL and
/// [`MeshLoadError::Empty`] if it contains no triangles.
pub fn read_stl<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    params: &MeshParams,
) -> Result<MeshModel, MeshLoadError> {
    let stl = stl_io::read_stl(reader).map_err(|e| MeshLoadError::Parse {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    if stl.faces.is_empty() {
        return Err(MeshLoadError::Empty);
    }

    let position = |index: usize| -> Result<Point3, MeshLoadError> {
        let v = stl.vertices.get(index).ok_or_else(|| MeshLoadError::Parse {
            path: path.to_path_buf(),
            details: format!("face references missing vertex {index}"),
        })?;
        Ok(Point3::new(
            f64::from(v.0[0]),
            f64::from(v.0[1]),
            f64::from(v.0[2]),
        ))
    };

    let mut triangles = Vec::with_capacity(stl.faces.len());
    let mut normals = Vec::with_capacity(stl.faces.len());
    for face in &stl.faces {
        triangles.push([
            position(face.vertices[0])?,
            position(face.vertices[1])?,
            position(face.vertices[2])?,
        ]);
        normals.push(Vector3::new(
            f64::from(face.normal.0[0]),
            f64::from(face.normal.0[1]),
            f64::from(face.normal.0[2]),
        ));
    }

    MeshModel::from_triangles(triangles, normals, params)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    const ASCII_SQUARE: &str = "solid square
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 1 1 0
  endloop
endfacet
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 1 0
    vertex 0 1 0
  endloop
endfacet
endsolid square
";

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roomstudio-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn detects_format_case_insensitively() {
        assert_eq!(MeshFormat::from_path(Path::new("a/room.STL")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path(Path::new("room.obj")), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path(Path::new("room.fbx")), Some(MeshFormat::Fbx));
        assert_eq!(MeshFormat::from_path(Path::new("room.ply")), None);
        assert_eq!(MeshFormat::from_path(Path::new("room")), None);
    }

    #[test]
    fn reads_ascii_stl_from_memory() {
        let mut cursor = Cursor::new(ASCII_SQUARE.as_bytes().to_vec());
        let mesh = read_stl(&mut cursor, Path::new("mem.stl"), &MeshParams::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert!((mesh.normal(0) - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn loads_stl_file_from_disk() {
        let path = scratch_path("square.stl");
        std::fs::write(&path, ASCII_SQUARE).unwrap();
        let mesh = load_mesh(&path, &MeshParams::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_mesh(Path::new("/nonexistent/room.stl"), &MeshParams::default())
            .unwrap_err();
        assert!(matches!(err, MeshLoadError::NotFound(_)));
    }

    #[test]
    fn obj_is_not_yet_supported() {
        let err = load_mesh(Path::new("cottage.obj"), &MeshParams::default()).unwrap_err();
        assert!(matches!(err, MeshLoadError::NotYetSupported(ext) if ext == "obj"));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = load_mesh(Path::new("room.ply"), &MeshParams::default()).unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::UnsupportedFormat { extension: Some(ext) } if ext == "ply"
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let path = scratch_path("garbage.stl");
        std::fs::write(&path, b"not an stl file at all").unwrap();
        let err = load_mesh(&path, &MeshParams::default()).unwrap_err();
        assert!(matches!(err, MeshLoadError::Parse { .. }));
    }
}
