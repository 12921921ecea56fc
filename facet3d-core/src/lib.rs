/// Facet3D Core Library - Mesh building and scene object management
///
/// This library provides the renderer-independent core: procedural mesh
/// generation, the mesh file format, OBJ import, transform state and matrices,
/// the scene object registry, and the input/state model driving it.

pub mod builder;
pub mod error;
pub mod geometry;
pub mod input;
pub mod mesh_file;
pub mod obj;
pub mod projection;
pub mod registry;
pub mod renderer;
pub mod trajectory;
pub mod transform;

// Re-export commonly used types
pub use builder::{MeshBuilder, SphereShape};
pub use error::{Result, SceneError};
pub use geometry::{Face, Rgba, Triangle, Vertex};
pub use input::{Action, AppState, CameraMove, InputMap, Key, KeyAction, KeyEvent};
pub use mesh_file::{MeshFile, NamedMesh};
pub use projection::{Camera, ProjectionMode};
pub use registry::{FaceMetadata, SceneObject, SceneRegistry};
pub use renderer::RenderBackend;
pub use trajectory::Trajectory;
pub use transform::{Transform, TransformDelta, TransformState};
