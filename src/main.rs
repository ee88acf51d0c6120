use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use panowipe::{ViewerConfig, ViewerImage, ViewerScene, run_viewer};

/// Drag the mouse to wipe from one image to another.
#[derive(Parser, Debug)]
#[command(name = "panowipe", version)]
struct Cli {
    /// Image navigated away from.
    previous: PathBuf,

    /// Image navigated to.
    current: PathBuf,

    /// Treat the current image as a 360° equirectangular panorama.
    #[arg(long)]
    pano_current: bool,

    /// Treat the previous image as a 360° equirectangular panorama.
    #[arg(long)]
    pano_previous: bool,

    /// Render as if the camera were moving (panoramas get spheres).
    #[arg(long)]
    moving: bool,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ViewerConfig::new()
        .title(format!(
            "panowipe: {} -> {}",
            cli.previous.display(),
            cli.current.display()
        ))
        .size(cli.width, cli.height);
    let scene = ViewerScene {
        previous: ViewerImage::new(cli.previous).full_pano(cli.pano_previous),
        current: ViewerImage::new(cli.current).full_pano(cli.pano_current),
        motionless: !cli.moving,
    };

    match run_viewer(config, scene) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
