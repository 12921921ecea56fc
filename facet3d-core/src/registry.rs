/// Scene object registry: the shared vertex buffer plus per-object metadata and transform state
use log::info;
use nalgebra::{Matrix4, Vector3};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{Result, SceneError};
use crate::geometry::{Rgba, Vertex};
use crate::mesh_file::MeshFile;
use crate::renderer::RenderBackend;
use crate::trajectory::Trajectory;
use crate::transform::{TransformDelta, TransformState};

/// Draw bookkeeping for one face: a contiguous vertex range and its color
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMetadata {
    pub owner: String,
    pub color: Rgba,
    pub first: usize,
    pub count: usize,
}

impl FaceMetadata {
    pub fn range(&self) -> Range<usize> {
        self.first..self.first + self.count
    }
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    /// Assigned at load time and never changed
    pub vertex_range: Range<usize>,
    pub faces: Vec<FaceMetadata>,
    pub transform: TransformState,
    pub trajectory: Trajectory,
}

/// Owns every loaded object and the flat vertex buffer they index into.
///
/// The buffer only grows while loading; drawing reads it through
/// [`RenderBackend::upload_vertices`].
#[derive(Debug)]
pub struct SceneRegistry {
    root: PathBuf,
    vertices: Vec<Vertex>,
    objects: HashMap<String, SceneObject>,
    load_order: Vec<String>,
}

impl SceneRegistry {
    /// Create an empty registry reading mesh files from `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SceneError::DirectoryNotFound(root));
        }
        Ok(Self {
            root,
            vertices: Vec::new(),
            objects: HashMap::new(),
            load_order: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `<root>/<file_name>` under its base name
    pub fn load(&mut self, file_name: &str, initial_offset: Vector3<f32>) -> Result<&SceneObject> {
        let path = self.root.join(file_name);
        if !path.is_file() {
            return Err(SceneError::ObjectFileNotFound(path));
        }
        let name = object_name(&path)?;
        if self.objects.contains_key(&name) {
            return Err(SceneError::DuplicateObject(name));
        }

        let mesh = MeshFile::read(&path)?;
        self.load_mesh(&name, &mesh, initial_offset)
    }

    /// Append an in-memory mesh under `name`
    pub fn load_mesh(
        &mut self,
        name: &str,
        mesh: &MeshFile,
        initial_offset: Vector3<f32>,
    ) -> Result<&SceneObject> {
        if name.is_empty() {
            return Err(SceneError::InvalidObjectName(PathBuf::from(name)));
        }
        if self.objects.contains_key(name) {
            return Err(SceneError::DuplicateObject(name.to_string()));
        }

        let first_vertex = self.vertices.len();
        let mut faces = Vec::with_capacity(mesh.faces.len());
        for face in mesh.faces() {
            faces.push(FaceMetadata {
                owner: name.to_string(),
                color: face.color,
                first: self.vertices.len(),
                count: face.vertices.len(),
            });
            self.vertices.extend(face.vertices);
        }

        let object = SceneObject {
            name: name.to_string(),
            vertex_range: first_vertex..self.vertices.len(),
            faces,
            transform: TransformState::new(initial_offset),
            trajectory: Trajectory::default(),
        };
        info!(
            "Loaded object `{}` ({} faces, {} vertices)",
            name,
            object.faces.len(),
            object.vertex_range.len()
        );

        self.load_order.push(name.to_string());
        let object = self.objects.entry(name.to_string()).or_insert(object);
        Ok(&*object)
    }

    pub fn object(&self, name: &str) -> Result<&SceneObject> {
        self.objects
            .get(name)
            .ok_or_else(|| SceneError::ObjectNotLoaded(name.to_string()))
    }

    fn object_mut(&mut self, name: &str) -> Result<&mut SceneObject> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| SceneError::ObjectNotLoaded(name.to_string()))
    }

    pub fn set_trajectory(&mut self, name: &str, trajectory: Trajectory) -> Result<()> {
        self.object_mut(name)?.trajectory = trajectory;
        Ok(())
    }

    /// Accumulate the provided deltas; omitted channels stay unchanged.
    ///
    /// Offset deltas go through the object's trajectory, so orbiting objects
    /// ignore the delta value and advance their phase instead.
    pub fn update_transform(&mut self, name: &str, delta: &TransformDelta) -> Result<()> {
        let object = self.object_mut(name)?;
        let state = &mut object.transform;

        if let Some(angle) = &delta.angle {
            state.rotate(angle);
        }
        if let Some(offset) = &delta.offset {
            object.trajectory.advance(state, offset);
        }
        if let Some(scale) = &delta.scale {
            state.rescale(scale);
        }
        Ok(())
    }

    pub fn compute_transform_matrix(&self, name: &str) -> Result<Matrix4<f32>> {
        Ok(self.object(name)?.transform.matrix())
    }

    pub fn select_for_draw(&self, name: &str) -> Result<&[FaceMetadata]> {
        let object = self.object(name)?;
        if object.faces.is_empty() {
            return Err(SceneError::ObjectHasNoFaces(name.to_string()));
        }
        Ok(&object.faces)
    }

    /// Set the object's matrix, then draw each of its faces in its own color
    pub fn apply_and_draw<R: RenderBackend>(&self, renderer: &mut R, name: &str) -> Result<()> {
        let model = self.compute_transform_matrix(name)?;
        let faces = self.select_for_draw(name)?;

        renderer.set_transform(&model);
        for face in faces {
            renderer.set_color(face.color);
            renderer.draw_strip(face.first, face.count);
        }
        Ok(())
    }

    /// Draw every object in load order
    pub fn draw_all<R: RenderBackend>(&self, renderer: &mut R) -> Result<()> {
        for name in &self.load_order {
            self.apply_and_draw(renderer, name)?;
        }
        Ok(())
    }

    pub fn upload<R: RenderBackend>(&self, renderer: &mut R) {
        renderer.upload_vertices(&self.vertices);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Object names in load order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.load_order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.load_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_order.is_empty()
    }
}

/// Object names are mesh file base names without extension
fn object_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty() && !stem.starts_with('.'))
        .map(str::to_string)
        .ok_or_else(|| SceneError::InvalidObjectName(path.to_path_buf()))
}
