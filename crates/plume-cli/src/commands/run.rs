//! Windowed demo command

use crate::app::DemoApp;
use crate::commands::DemoSource;
use anyhow::{Context, Result};
use winit::event_loop::{ControlFlow, EventLoop};

pub struct RunArgs {
    pub source: DemoSource,
}

pub fn run(args: RunArgs) -> Result<()> {
    let loaded = args.source.load()?;

    println!("Running demo: {}", loaded.config.name);
    println!("Particles: {}", loaded.config.simulation.particle_count);
    println!();
    println!("Controls:");
    println!("  A/D          - Orbit camera");
    println!("  W/S          - Zoom");
    println!("  Up/Down      - Particle lifetime");
    println!("  Left/Right   - Vertical acceleration");
    println!("  Space        - Pause");
    println!("  R            - Reseed particles");
    println!("  Escape       - Exit");

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new(loaded);
    event_loop.run_app(&mut app).context("Event loop error")?;

    match app.error.take() {
        Some(e) => Err(e.context("Failed to start demo")),
        None => Ok(()),
    }
}
