/// Persisted mesh format: `{"faces": [{"vertices": [[x, y, z], ...], "color": [r, g, b, a]}]}`
use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Result, SceneError};
use crate::geometry::{Face, Rgba};

pub const MESH_FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub vertices: Vec<[f32; 3]>,
    pub color: Rgba,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshFile {
    pub faces: Vec<FaceRecord>,
}

impl MeshFile {
    pub fn from_faces<I>(faces: I) -> Self
    where
        I: IntoIterator<Item = Face>,
    {
        let faces = faces
            .into_iter()
            .map(|face| FaceRecord {
                vertices: face.vertices.iter().map(|p| [p.x, p.y, p.z]).collect(),
                color: face.color,
            })
            .collect();
        Self { faces }
    }

    pub fn faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.faces.iter().map(|record| {
            Face::new(
                record
                    .vertices
                    .iter()
                    .map(|&[x, y, z]| Point3::new(x, y, z))
                    .collect(),
                record.color,
            )
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.faces.iter().map(|f| f.vertices.len()).sum()
    }

    /// Parse from any reader; `origin` only labels errors
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| SceneError::json(origin, e))
    }

    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SceneError::ObjectFileNotFound(path.to_path_buf()));
        }
        let file = fs::File::open(path).map_err(|e| SceneError::io(path, e))?;
        Self::from_reader(std::io::BufReader::new(file), path)
    }

    /// Non-finite coordinates are refused; JSON has no encoding for them
    pub fn write(&self, path: &Path) -> Result<()> {
        let finite = self
            .faces
            .iter()
            .flat_map(|face| &face.vertices)
            .all(|vertex| vertex.iter().all(|c| c.is_finite()));
        if !finite {
            return Err(SceneError::NonFiniteVertex(path.to_path_buf()));
        }
        let json = serde_json::to_string(self).map_err(|e| SceneError::json(path, e))?;
        fs::write(path, json).map_err(|e| SceneError::io(path, e))
    }
}

/// A mesh paired with the name it will be saved and later loaded under
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMesh {
    pub name: String,
    pub file: MeshFile,
}

impl NamedMesh {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, MESH_FILE_EXTENSION)
    }

    /// Write to `<dir>/<name>.json`, returning the written path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.is_dir() {
            return Err(SceneError::DirectoryNotFound(dir.to_path_buf()));
        }
        let path = dir.join(self.file_name());
        self.file.write(&path)?;
        debug!(
            "Wrote mesh `{}` ({} faces, {} vertices) to {}",
            self.name,
            self.file.faces.len(),
            self.file.vertex_count(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mesh_file() {
        let json = r#"{"faces": [
            {"vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "color": [1, 0, 0, 1]},
            {"vertices": [[0.5, 0.5, 0.5]], "color": [0, 0, 1, 0.5]}
        ]}"#;
        let mesh = MeshFile::from_reader(json.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.vertex_count(), 4);

        let faces: Vec<Face> = mesh.faces().collect();
        assert_eq!(faces[0].vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(faces[1].color, Rgba::new(0.0, 0.0, 1.0, 0.5));
    }

    #[test]
    fn test_malformed_mesh_file() {
        let result = MeshFile::from_reader(r#"{"faces": [{"color": [1, 1, 1, 1]}]}"#.as_bytes(), Path::new("bad.json"));
        assert!(matches!(result, Err(SceneError::Json { .. })));
    }

    #[test]
    fn test_missing_mesh_file() {
        let result = MeshFile::read(Path::new("/nonexistent/facet3d/missing.json"));
        assert!(matches!(result, Err(SceneError::ObjectFileNotFound(_))));
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = std::env::temp_dir().join(format!("facet3d-mesh-file-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let named = NamedMesh {
            name: "triangle".to_string(),
            file: MeshFile::from_faces([Face::new(
                vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
                Rgba::WHITE,
            )]),
        };
        let path = named.save(&dir).unwrap();
        assert_eq!(path, dir.join("triangle.json"));
        assert_eq!(MeshFile::read(&path).unwrap(), named.file);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_into_missing_dir() {
        let named = NamedMesh {
            name: "x".to_string(),
            file: MeshFile::default(),
        };
        let result = named.save(Path::new("/nonexistent/facet3d/objects"));
        assert!(matches!(result, Err(SceneError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_non_finite_vertex_not_written() {
        let dir = std::env::temp_dir().join(format!("facet3d-mesh-nan-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let named = NamedMesh {
            name: "rock0".to_string(),
            file: MeshFile::from_faces([Face::new(
                vec![Point3::new(f32::NAN, 0.0, 0.0), Point3::new(f32::INFINITY, 1.0, 0.0)],
                Rgba::BLACK,
            )]),
        };
        let result = named.save(&dir);
        assert!(matches!(result, Err(SceneError::NonFiniteVertex(_))));
        assert!(!dir.join("rock0.json").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
