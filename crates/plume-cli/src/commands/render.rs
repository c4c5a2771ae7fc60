//! Headless demo-to-PNG render command

use crate::commands::DemoSource;
use crate::demo::GpuDemo;
use anyhow::{bail, Context, Result};
use plume_render::{Camera, HeadlessContext};
use plume_runtime::SimClock;
use std::path::PathBuf;

pub struct RenderArgs {
    pub source: DemoSource,
    pub output: PathBuf,
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
}

pub fn run(args: RenderArgs) -> Result<()> {
    if args.frames == 0 {
        bail!("--frames must be at least 1");
    }
    if !(args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }

    let loaded = args.source.load()?;

    let ctx = pollster::block_on(HeadlessContext::new(args.width, args.height))
        .context("Failed to create headless render context")?;
    let camera = Camera::from_params(&loaded.config.camera, ctx.aspect_ratio());

    let mut demo = GpuDemo::new(
        &ctx.device,
        &ctx.queue,
        ctx.format,
        loaded.config,
        loaded.texture.as_deref(),
    );

    let mut clock = SimClock::new();
    let step = 1.0 / args.fps;
    for _ in 0..args.frames {
        clock.advance(step);
        demo.frame(
            &ctx.device,
            &ctx.queue,
            &ctx.color_view,
            &camera,
            clock.total_time,
            clock.delta_time,
        );
    }

    let stats = demo
        .stats(&ctx.device, &ctx.queue)
        .context("Failed to read particles back")?;

    pollster::block_on(ctx.save_png(&args.output))
        .with_context(|| format!("Failed to save '{}'", args.output.display()))?;

    println!(
        "Rendered {} frames ({:.2}s) to {}",
        args.frames,
        clock.total_time,
        args.output.display()
    );
    println!("  {stats}");
    Ok(())
}
