//! Plume CLI - run, render and inspect the particle demos

mod app;
mod commands;
mod demo;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, render, run, simulate};
use plume_particles::Preset;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plume")]
#[command(about = "Double-buffered GPU particle demos", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window and run a demo
    Run {
        /// Preset name (fountain, fire, smoke)
        preset: Preset,

        /// TOML file layered over the preset
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Step a demo offscreen and save the last frame as PNG
    Render {
        /// Preset name (fountain, fire, smoke)
        preset: Preset,

        /// Output PNG path
        #[arg(long, short)]
        output: PathBuf,

        /// TOML file layered over the preset
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u32>,

        /// Frames to simulate before capturing
        #[arg(long, default_value = "180")]
        frames: u32,

        /// Image width
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "720")]
        height: u32,

        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: f32,
    },

    /// Run a demo on the CPU reference backend and print statistics
    Simulate {
        /// Preset name (fountain, fire, smoke)
        preset: Preset,

        /// TOML file layered over the preset
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u32>,

        /// Frames to simulate
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Fixed step per frame in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
    },

    /// Print a preset as TOML
    Config {
        /// Preset name (fountain, fire, smoke)
        preset: Preset,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            preset,
            config,
            seed,
        } => run::run(run::RunArgs {
            source: commands::DemoSource {
                preset,
                config,
                seed,
            },
        }),
        Commands::Render {
            preset,
            output,
            config,
            seed,
            frames,
            width,
            height,
            fps,
        } => render::run(render::RenderArgs {
            source: commands::DemoSource {
                preset,
                config,
                seed,
            },
            output,
            frames,
            width,
            height,
            fps,
        }),
        Commands::Simulate {
            preset,
            config,
            seed,
            frames,
            dt,
        } => simulate::run(simulate::SimulateArgs {
            source: commands::DemoSource {
                preset,
                config,
                seed,
            },
            frames,
            dt,
        }),
        Commands::Config { preset } => config::run(preset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_arguments() {
        let cli = Cli::try_parse_from([
            "plume", "render", "fire", "--output", "fire.png", "--frames", "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Render {
                preset,
                output,
                frames,
                width,
                ..
            } => {
                assert_eq!(preset, Preset::Fire);
                assert_eq!(output, PathBuf::from("fire.png"));
                assert_eq!(frames, 30);
                assert_eq!(width, 1280);
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(Cli::try_parse_from(["plume", "run", "waterfall"]).is_err());
    }
}
