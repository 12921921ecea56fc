/// Load phase: run mesh build jobs, then load every configured object
use anyhow::{Context, Result};
use facet3d_core::builder::{build_named_mesh, normalize_sketch_file};
use facet3d_core::obj::import_obj;
use facet3d_core::{InputMap, MeshBuilder, SceneRegistry, TransformDelta};
use log::info;
use nalgebra::{Point2, Vector3};
use std::path::PathBuf;

use crate::config::SceneConfig;

/// Everything the frame loop needs once loading is done
pub struct Scene {
    pub registry: SceneRegistry,
    pub input: InputMap,
    /// Per-frame automatic updates, in object load order
    pub animations: Vec<(String, TransformDelta)>,
}

impl Scene {
    /// Apply each object's per-frame update
    pub fn animate(&mut self) -> Result<()> {
        for (name, delta) in &self.animations {
            self.registry.update_transform(name, delta)?;
        }
        Ok(())
    }
}

/// Generate every sphere, sketch and OBJ mesh into the objects directory
pub fn build_meshes(config: &SceneConfig) -> Result<Vec<PathBuf>> {
    let builder = MeshBuilder::new(config.builder.sectors, config.builder.stacks);
    let out_dir = &config.objects_dir;
    let mut written = Vec::new();

    for sphere in &config.spheres {
        let vertices: Vec<_> = sphere
            .parts
            .iter()
            .flat_map(|part| {
                builder.generate_shaped_sphere(Point2::from(part.origin), part.radius, part.shape)
            })
            .collect();
        let mesh = build_named_mesh(&sphere.name, [(vertices, sphere.color)]);
        written.push(
            mesh.save(out_dir)
                .with_context(|| format!("Could not save sphere mesh `{}`", sphere.name))?,
        );
    }

    for sketch in &config.sketches {
        let source = config.sketches_dir.join(format!("{}.json", sketch.source));
        let mesh = normalize_sketch_file(&source, sketch.output_name(), sketch.scale, sketch.color)?;
        written.push(mesh.save(out_dir)?);
    }

    for import in &config.imports {
        let mesh = import_obj(&import.source, &import.name, import.color)?;
        written.push(mesh.save(out_dir)?);
    }

    info!("Built {} meshes into {}", written.len(), out_dir.display());
    Ok(written)
}

/// Load the configured objects into a fresh registry
pub fn load_scene(config: &SceneConfig) -> Result<Scene> {
    let mut registry = SceneRegistry::new(&config.objects_dir)?;
    let mut animations = Vec::new();

    for entry in &config.objects {
        let name = registry
            .load(&entry.file, Vector3::from(entry.offset))?
            .name
            .clone();
        registry.set_trajectory(&name, entry.trajectory)?;
        if let Some(spin) = entry.spin {
            animations.push((name, TransformDelta::from(spin)));
        }
    }
    info!(
        "Scene ready: {} objects, {} vertices",
        registry.len(),
        registry.vertices().len()
    );

    Ok(Scene {
        registry,
        input: config.input_map(),
        animations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet3d_core::{SceneError, Trajectory};
    use std::fs;

    fn scene_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("facet3d-scene-{}-{}", tag, std::process::id()));
        fs::create_dir_all(dir.join("objects")).unwrap();
        fs::create_dir_all(dir.join("sketches")).unwrap();
        dir
    }

    const SCENE: &str = r#"
[builder]
sectors = 8
stacks = 4

[[spheres]]
name = "cloud"
color = [0.254, 0.823, 0.858, 1.0]
parts = [
    { origin = [0.5, 0.1], radius = 0.2 },
    { origin = [0.65, 0.2], radius = 0.1 },
]

[[spheres]]
name = "moon"
color = [1.0, 0.0, 0.0, 1.0]
parts = [{ radius = 0.2, shape = "crescent" }]

[[sketches]]
source = "rock"
scale = 3.0

[[objects]]
file = "cloud.json"

[[objects]]
file = "moon.json"
offset = [1.2, 0.0, 0.8]
trajectory = "orbit"
spin = { offset = [0.0, 0.0, 0.0], angle = [0.0, 0.0, 0.05] }

[[objects]]
file = "rock.json"
offset = [-0.5, -0.5, -0.5]
"#;

    #[test]
    fn test_build_and_load() {
        let dir = scene_dir("full");
        fs::write(dir.join("sketches/rock.json"), "[[0, 0, 0], [3, 1, 0], [1, 3, 0], [2, 2, 0]]").unwrap();
        let scene_file = dir.join("scene.toml");
        fs::write(&scene_file, SCENE).unwrap();

        let config = SceneConfig::load(&scene_file).unwrap();
        let written = build_meshes(&config).unwrap();
        assert_eq!(written.len(), 3);

        let mut scene = load_scene(&config).unwrap();
        let names: Vec<_> = scene.registry.names().collect();
        assert_eq!(names, vec!["cloud", "moon", "rock"]);

        // Two spheres merged into one face
        let cloud = scene.registry.object("cloud").unwrap();
        assert_eq!(cloud.faces.len(), 1);
        assert_eq!(cloud.vertex_range, 0..2 * 8 * 4 * 6);
        assert_eq!(scene.registry.object("moon").unwrap().trajectory, Trajectory::Orbit);

        scene.animate().unwrap();
        scene.animate().unwrap();
        let moon = scene.registry.object("moon").unwrap().transform;
        assert!((moon.angle.z - 0.1).abs() < 1e-6);
        assert!((moon.orbit_phase - 0.02).abs() < 1e-6);
        assert_eq!(moon.offset.z, 0.8);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_object_is_fatal() {
        let dir = scene_dir("missing");
        let scene_file = dir.join("scene.toml");
        fs::write(&scene_file, "[[objects]]\nfile = \"nowhere.json\"\n").unwrap();

        let config = SceneConfig::load(&scene_file).unwrap();
        let err = load_scene(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SceneError>(),
            Some(SceneError::ObjectFileNotFound(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_objects_dir() {
        let config = SceneConfig::from_toml("objects_dir = \"/nonexistent/facet3d\"").unwrap();
        let err = load_scene(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SceneError>(),
            Some(SceneError::DirectoryNotFound(_))
        ));
    }
}
