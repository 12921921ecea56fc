/// Error types shared by the mesh builder and the scene registry
use std::path::PathBuf;

/// Every failure in the core is fatal to the running scene; callers propagate
/// these to the top level instead of recovering.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("Dir not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Object file not found: {}", .0.display())]
    ObjectFileNotFound(PathBuf),
    #[error("Object named `{0}` not loaded")]
    ObjectNotLoaded(String),
    #[error("Object named `{0}` has no faces to draw")]
    ObjectHasNoFaces(String),
    #[error("Object named `{0}` is already loaded")]
    DuplicateObject(String),
    #[error("Cannot derive an object name from `{}`", .0.display())]
    InvalidObjectName(PathBuf),
    #[error("Sketch `{}` contains no vertices", .0.display())]
    EmptySketch(PathBuf),
    #[error("Sketch scale factor must be finite and positive, got {0}")]
    InvalidScale(f32),
    #[error("Mesh `{}` contains a non-finite vertex", .0.display())]
    NonFiniteVertex(PathBuf),
    #[error("Error accessing `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in `{}`", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse OBJ `{}`: {message}", .path.display())]
    ObjParse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, SceneError>;

impl SceneError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SceneError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        SceneError::Json {
            path: path.into(),
            source,
        }
    }
}
