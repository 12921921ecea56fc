/// Facet3D - build procedural meshes and view a scene in the terminal
///
/// Controls:
///   - Scene-defined keys: move, rotate or scale objects
///   - Arrow Keys / +/-: Pan and zoom the camera
///   - P: Toggle wireframe
///   - Q/ESC: Quit

use anyhow::Result;
use facet3d_terminal::{scene, SceneConfig, TerminalApp};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "facet3d")]
struct CliArgs {
    /// Scene description (TOML)
    #[structopt(parse(from_os_str))]
    scene: PathBuf,
    /// Generate the scene's meshes and exit without rendering
    #[structopt(long = "build-only")]
    build_only: bool,
    /// Output debug info
    #[structopt(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    let config = SceneConfig::load(&args.scene)?;
    scene::build_meshes(&config)?;
    if args.build_only {
        return Ok(());
    }

    let scene = scene::load_scene(&config)?;
    let (width, height) = crossterm::terminal::size()?;
    let camera = config.camera.camera(width as u32, height as u32)?;

    info!("Starting terminal renderer (press Q to quit)");
    let mut app = TerminalApp::new(scene, camera)?;
    app.run()
}
