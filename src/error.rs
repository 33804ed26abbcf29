use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the roomstudio geometry core.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    MeshLoad(#[from] MeshLoadError),

    #[error(transparent)]
    Degenerate(#[from] DegenerateMeshError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to serialize room summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading a mesh file or building a mesh from raw data.
#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("mesh file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read mesh from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mesh from {path}: {details}")]
    Parse { path: PathBuf, details: String },

    #[error("unsupported mesh format: {extension:?}")]
    UnsupportedFormat { extension: Option<String> },

    #[error("mesh format `{0}` is not yet supported, convert the model to STL")]
    NotYetSupported(String),

    #[error("malformed triangle data: {0}")]
    Malformed(String),

    #[error("mesh contains no triangles")]
    Empty,
}

/// Volume and centroid computations on a mesh that does not enclose a volume.
#[derive(Debug, Error)]
pub enum DegenerateMeshError {
    #[error(
        "mesh is not closed ({boundary_edges} boundary edges); \
         the room must be watertight to compute its volume"
    )]
    NotClosed { boundary_edges: usize },

    #[error(
        "enclosed volume is {volume:e}, effectively zero; \
         ensure the mesh is closed and valid"
    )]
    ZeroVolume { volume: f64 },
}

/// Errors related to geometric computations and wall export.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("no surfaces to export")]
    NoSurfaces,

    #[error("no valid wall triangles produced ({skipped} degenerate triangles skipped)")]
    NoWalls { skipped: usize },

    #[error("scale factor {0} must be finite and positive")]
    InvalidScale(f64),

    #[error("invalid room scene: {0}")]
    InvalidScene(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised by the surface registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("surface index {index} is out of range (registry has {len} surfaces)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Convenience type alias for results using [`StudioError`].
pub type Result<T> = std::result::Result<T, StudioError>;
