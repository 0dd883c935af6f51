use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bevy::{
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    log::{Level, LogPlugin},
    prelude::*,
    window::WindowResolution,
};
use clap::Parser;
use led_matrix_life::{
    camera::CamPlugin, config::LifeConfig, life::LifePlugin, prelude::*, state::GameState,
};

/// Conway's Game of Life on an RGB LED matrix, with a desktop preview.
#[derive(Parser)]
#[command(name = "led-matrix-life")]
struct Args {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log a board dump every generation.
    #[arg(long)]
    debug: bool,
    /// Seed for the random fill, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LifeConfig::load(path)?,
        None => LifeConfig::default(),
    };
    config.debug |= args.debug;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;
    let seed = config.seed_source().context("failed to prepare start pattern")?;

    let window_size = Vec2::new(config.width as f32, config.height as f32) * LED_SIZE_PX
        + Vec2::splat(8.0 * BORDER_WIDTH_PX);
    let debug = config.debug;

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(LogPlugin {
                level: if debug { Level::DEBUG } else { Level::INFO },
                filter: "wgpu=error,naga=warn,bevy_render=info,bevy_app=info".to_owned(),
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "LED matrix life".to_owned(),
                    resizable: true,
                    focused: true,
                    mode: bevy::window::WindowMode::Windowed,
                    resolution: WindowResolution::new(window_size.x, window_size.y),
                    ..default()
                }),
                ..default()
            }),
    );
    if debug {
        app.add_plugins((FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin::default()));
    }
    app.init_state::<GameState>()
        .add_plugins((CamPlugin, LifePlugin { config, seed }));

    if let AppExit::Error(code) = app.run() {
        bail!("exited with code {code}");
    }
    Ok(())
}
