/// Example: Load and render a Wavefront OBJ file in the terminal
///
/// Usage: cargo run --example view_obj -- path/to/model.obj

use anyhow::Result;
use facet3d_core::builder::build_named_mesh;
use facet3d_core::obj::import_obj;
use facet3d_core::{Camera, InputMap, MeshBuilder, Rgba, SceneRegistry, SphereShape};
use facet3d_terminal::{Scene, TerminalApp};
use nalgebra::{Point2, Vector3};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();

    let mesh = match args.get(1) {
        Some(path) => {
            println!("Loading OBJ file: {}", path);
            import_obj(Path::new(path), "model", Rgba::new(0.9, 0.8, 0.6, 1.0))?
        }
        None => {
            eprintln!("Usage: {} <obj-file>", args[0]);
            eprintln!("\nNo OBJ file provided, using a crescent sphere...");
            let vertices = MeshBuilder::default().generate_shaped_sphere(
                Point2::origin(),
                1.5,
                SphereShape::Crescent,
            );
            build_named_mesh("model", [(vertices, Rgba::new(1.0, 0.2, 0.2, 1.0))])
        }
    };
    println!("Loaded {} faces", mesh.file.faces.len());

    let mut registry = SceneRegistry::new(".")?;
    registry.load_mesh(&mesh.name, &mesh.file, Vector3::zeros())?;

    let scene = Scene {
        registry,
        input: InputMap::with_global_keys(),
        animations: vec![(
            mesh.name.clone(),
            facet3d_core::TransformDelta::rotate(Vector3::new(0.01, 0.015, 0.0)),
        )],
    };

    let mut app = TerminalApp::new(scene, Camera::default())?;
    app.run()?;

    println!("Thank you for using Facet3D!");
    Ok(())
}
