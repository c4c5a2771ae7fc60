//! Run a demo on the CPU backend and report population statistics

use crate::commands::DemoSource;
use anyhow::{bail, Result};
use plume_particles::{
    initialize, CpuFeedbackStore, FeedbackCoordinator, ParticleRng, ParticleStats, ViewParams,
};
use plume_runtime::SimClock;

pub struct SimulateArgs {
    pub source: DemoSource,
    pub frames: u32,
    pub dt: f32,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if !(args.dt > 0.0) {
        bail!("--dt must be positive, got {}", args.dt);
    }

    let loaded = args.source.load()?;
    let config = loaded.config;

    let (seed, sets) = initialize(&config, &mut ParticleRng::new(config.seed));
    let mut store = CpuFeedbackStore::from_sets(sets, &seed);
    let mut coordinator = FeedbackCoordinator::from_config(&config);
    let view = ViewParams::default();
    let mut clock = SimClock::new();

    println!(
        "Simulating {}: {} particles, {} frames at {:.4}s",
        config.name, config.simulation.particle_count, args.frames, args.dt
    );

    let mut next_report = 1.0;
    for _ in 0..args.frames {
        clock.advance(args.dt);
        coordinator.advance_clock(clock.total_time, clock.delta_time);
        coordinator.run_frame(&mut store, &view);

        if coordinator.time() >= next_report {
            let stats = stats_for(&coordinator, &store);
            println!("  t={:>6.2}s  {}", coordinator.time(), stats);
            next_report += 1.0;
        }
    }

    let stats = stats_for(&coordinator, &store);
    println!();
    println!(
        "Finished at t={:.2}s after {} frames",
        coordinator.time(),
        coordinator.state().frame
    );
    println!("  {}", stats);
    if let Some(draw) = store.last_draw() {
        println!("  last draw: set {} ({} vertices)", draw.set, draw.vertex_count);
    }
    Ok(())
}

/// Statistics for the set the next frame will read
fn stats_for(coordinator: &FeedbackCoordinator, store: &CpuFeedbackStore) -> ParticleStats {
    ParticleStats::from_set(
        store.set(coordinator.roles().read()),
        coordinator.time(),
        coordinator.params().lifetime,
    )
}
