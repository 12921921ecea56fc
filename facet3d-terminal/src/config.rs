/// Scene description file: mesh build jobs, objects to load, and key bindings
use anyhow::{bail, Context, Result};
use facet3d_core::builder::{DEFAULT_SECTORS, DEFAULT_STACKS};
use facet3d_core::{
    Action, Camera, InputMap, Key, Rgba, SphereShape, Trajectory, TransformDelta,
};
use log::warn;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    #[serde(default = "default_objects_dir")]
    pub objects_dir: PathBuf,
    #[serde(default = "default_sketches_dir")]
    pub sketches_dir: PathBuf,
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub spheres: Vec<SphereMesh>,
    #[serde(default)]
    pub sketches: Vec<SketchMesh>,
    #[serde(default)]
    pub imports: Vec<ObjImport>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

fn default_objects_dir() -> PathBuf {
    PathBuf::from("objects")
}

fn default_sketches_dir() -> PathBuf {
    PathBuf::from("sketches")
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub sectors: u32,
    pub stacks: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            sectors: DEFAULT_SECTORS,
            stacks: DEFAULT_STACKS,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub orthographic: bool,
    /// Keeps keyboard panning at or above this height
    pub floor: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: camera.position.into(),
            target: camera.target.into(),
            orthographic: false,
            floor: None,
        }
    }
}

impl CameraConfig {
    pub fn camera(&self, width: u32, height: u32) -> Result<Camera> {
        if self.position == self.target {
            bail!("Camera position and target are both {:?}", self.position);
        }
        let mut camera = Camera::new(width, height);
        camera.position = Point3::from(self.position);
        camera.target = Point3::from(self.target);
        camera.floor = self.floor;
        if self.orthographic {
            camera.mode = facet3d_core::ProjectionMode::Orthographic;
        }
        Ok(camera)
    }
}

/// One or more spheres merged into a single-face mesh
#[derive(Debug, Clone, Deserialize)]
pub struct SphereMesh {
    pub name: String,
    pub color: Rgba,
    pub parts: Vec<SpherePart>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpherePart {
    #[serde(default)]
    pub origin: [f32; 2],
    pub radius: f32,
    #[serde(default)]
    pub shape: SphereShape,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SketchMesh {
    pub source: String,
    pub name: Option<String>,
    pub scale: f32,
    #[serde(default)]
    pub color: Rgba,
}

impl SketchMesh {
    pub fn output_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjImport {
    pub source: PathBuf,
    pub name: String,
    #[serde(default = "default_import_color")]
    pub color: Rgba,
}

fn default_import_color() -> Rgba {
    Rgba::WHITE
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntry {
    pub file: String,
    #[serde(default)]
    pub offset: [f32; 3],
    #[serde(default)]
    pub trajectory: Trajectory,
    /// Applied through `update_transform` once per frame
    pub spin: Option<DeltaConfig>,
}

/// Transform deltas as written in the scene file
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DeltaConfig {
    pub angle: Option<[f32; 3]>,
    pub offset: Option<[f32; 3]>,
    pub scale: Option<[f32; 3]>,
}

impl From<DeltaConfig> for TransformDelta {
    fn from(delta: DeltaConfig) -> Self {
        TransformDelta {
            angle: delta.angle.map(Vector3::from),
            offset: delta.offset.map(Vector3::from),
            scale: delta.scale.map(Vector3::from),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Binding {
    pub key: String,
    pub object: String,
    #[serde(flatten)]
    pub delta: DeltaConfig,
}

impl SceneConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.builder.sectors == 0 || config.builder.stacks == 0 {
            bail!(
                "Sphere resolution must be at least 1x1, got {}x{}",
                config.builder.sectors,
                config.builder.stacks
            );
        }
        Ok(config)
    }

    /// Read a scene file; relative directories resolve against its folder
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read scene file {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("Invalid scene file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.objects_dir = base.join(&config.objects_dir);
            config.sketches_dir = base.join(&config.sketches_dir);
            for import in &mut config.imports {
                import.source = base.join(&import.source);
            }
        }
        Ok(config)
    }

    /// Global keys plus every configured object binding
    pub fn input_map(&self) -> InputMap {
        let mut input = InputMap::with_global_keys();
        for binding in &self.bindings {
            let Some(key) = Key::parse(&binding.key) else {
                warn!("Ignoring binding for unknown key `{}`", binding.key);
                continue;
            };
            let delta = TransformDelta::from(binding.delta);
            if delta.is_empty() {
                warn!("Ignoring binding `{}` for `{}` with no deltas", binding.key, binding.object);
                continue;
            }
            input.bind(
                key,
                Action::Update {
                    object: binding.object.clone(),
                    delta,
                },
            );
        }
        input
    }
}
