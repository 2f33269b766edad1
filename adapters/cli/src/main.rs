#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that opens the herb garden.
//!
//! Without `--script` the garden is shown in a macroquad window. With a script
//! the same simulation is driven headlessly, which is how walks are replayed
//! in CI.

mod garden;
mod headless;
mod logging;
mod simulation;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{ArgAction, Parser};
use garden_rendering::{Color, Presentation, RenderingBackend, Scene, Viewport};
use garden_rendering_macroquad::MacroquadBackend;
use log::info;

use crate::{headless::HeadlessBackend, simulation::Simulation};

/// Walk around a garden of medicinal herbs and learn about them.
#[derive(Debug, Parser)]
#[command(name = "herb-garden", author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding the garden tuning values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// TOML file listing the plants to place instead of the built-in garden.
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Replays a scripted walk without opening a window.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
    /// Simulated frame length used by scripted runs, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 16.67)]
    frame_ms: f64,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    vsync: bool,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the herb garden command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = garden::load_config(args.config.as_deref())?;
    let catalog = garden::load_catalog(args.catalog.as_deref())?;
    info!(
        "planted {} herbs, snapshots publish every {:?}",
        catalog.len(),
        config.ui_update_interval()
    );

    let mut simulation = Simulation::new(&config, catalog);
    let presentation = Presentation::new(
        "Herb Garden",
        Color::from_rgb_u8(0x1d, 0x2b, 0x1a),
        Scene::new(Viewport::default()),
    );

    match args.script {
        Some(path) => {
            ensure!(
                args.frame_ms.is_finite() && args.frame_ms > 0.0,
                "--frame-ms must be a positive number (received {})",
                args.frame_ms
            );
            let script = headless::load_script(&path)?;
            HeadlessBackend::new(script, args.frame_ms)
                .run(presentation, move |dt, input, scene| {
                    simulation.frame(dt, input, scene)
                })
        }
        None => MacroquadBackend::new()
            .with_vsync(args.vsync)
            .with_show_fps(args.show_fps)
            .run(presentation, move |dt, input, scene| {
                simulation.frame(dt, input, scene)
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn scripted_run_flags_parse() {
        let args = Args::parse_from([
            "herb-garden",
            "--script",
            "walk.toml",
            "--frame-ms",
            "10",
            "--vsync",
            "false",
            "-v",
        ]);

        assert_eq!(args.script, Some(PathBuf::from("walk.toml")));
        assert_eq!(args.frame_ms, 10.0);
        assert!(!args.vsync);
        assert!(args.verbose);
        assert!(args.config.is_none());
    }
}
