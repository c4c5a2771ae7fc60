//! Particle Initializer: seeds starting positions, cone velocities and
//! staggered spawn times for a fresh simulation.

use crate::config::DemoConfig;
use crate::particle::{ParticleSeed, ParticleSet};
use crate::pingpong::SetPair;
use crate::rand::ParticleRng;

impl ParticleSeed {
    /// Sample a full particle population for `config`.
    ///
    /// Spawn times start at `start_time` and increase by `simulation.rate` per
    /// particle index, so a reseed mid-run emits from the current clock rather
    /// than dumping every particle at once.
    pub fn generate(config: &DemoConfig, rng: &mut ParticleRng, start_time: f32) -> Self {
        let count = config.simulation.particle_count as usize;
        let rate = config.simulation.rate;

        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        let mut spawn_times = Vec::with_capacity(count);

        let mut spawn = start_time;
        for _ in 0..count {
            positions.push(config.emitter.sample(rng));
            velocities.push(config.velocity.sample(rng));
            spawn_times.push(spawn);
            spawn += rate;
        }

        Self {
            initial_velocities: velocities.clone(),
            initial_positions: positions.clone(),
            positions,
            velocities,
            spawn_times,
        }
    }
}

/// Build the seed and both particle sets: A holds the seeded data and B is
/// allocated to the same shape with zeroed streams.
pub fn initialize(config: &DemoConfig, rng: &mut ParticleRng) -> (ParticleSeed, SetPair<ParticleSet>) {
    let seed = ParticleSeed::generate(config, rng, 0.0);
    let sets = SetPair::new(ParticleSet::from_seed(&seed), ParticleSet::zeroed(seed.len()));
    (seed, sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmitterShape, VelocityCone};
    use crate::pingpong::SetIndex;
    use crate::presets;
    use plume_core::Vec3;

    fn smoke_like() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.simulation.particle_count = 1000;
        config.simulation.rate = 0.01;
        config
    }

    #[test]
    fn sets_have_identical_shape() {
        let config = presets::fountain();
        let (seed, sets) = initialize(&config, &mut ParticleRng::new(config.seed));
        assert_eq!(seed.len(), 4000);
        assert_eq!(sets[SetIndex::A].len(), 4000);
        assert_eq!(sets[SetIndex::B].len(), 4000);
        assert_eq!(sets[SetIndex::A].positions, seed.positions);
        assert!(sets[SetIndex::B].spawn_times.iter().all(|&t| t == 0.0));
    }

    #[test]
    fn spawn_times_are_staggered_by_rate() {
        let config = presets::fountain();
        let (seed, _) = initialize(&config, &mut ParticleRng::new(1));
        assert_eq!(seed.spawn_times[0], 0.0);
        for pair in seed.spawn_times.windows(2) {
            assert!(pair[1] >= pair[0]);
            assert!((pair[1] - pair[0] - 0.001).abs() < 1e-4);
        }
        assert!((seed.spawn_times[10] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn reseed_offsets_spawn_times() {
        let config = smoke_like();
        let seed = ParticleSeed::generate(&config, &mut ParticleRng::new(9), 12.5);
        assert_eq!(seed.spawn_times[0], 12.5);
        assert!((seed.spawn_times[1] - 12.51).abs() < 1e-5);
    }

    #[test]
    fn velocities_respect_cone_and_speed() {
        for seed in [1u32, 77, 4096, 0xBEEF] {
            for mut config in [presets::fountain(), presets::fire(), presets::smoke()] {
                config.seed = seed;
                let cone = config.velocity;
                let (particles, _) = initialize(&config, &mut ParticleRng::new(seed));
                for v in &particles.velocities {
                    let speed = v.length();
                    assert!(speed >= cone.speed_min - 1e-4 && speed <= cone.speed_max + 1e-4);
                    if speed > 0.0 {
                        assert!(v.angle_between(&cone.axis) <= cone.half_angle_rad() + 1e-3);
                    }
                }
            }
        }
    }

    #[test]
    fn initial_streams_copy_the_samples() {
        let config = presets::fire();
        let (seed, _) = initialize(&config, &mut ParticleRng::new(config.seed));
        assert_eq!(seed.initial_velocities, seed.velocities);
        assert_eq!(seed.initial_positions, seed.positions);
    }

    #[test]
    fn same_seed_same_particles() {
        let config = smoke_like();
        let (a, _) = initialize(&config, &mut ParticleRng::new(31337));
        let (b, _) = initialize(&config, &mut ParticleRng::new(31337));
        assert_eq!(a, b);

        let (c, _) = initialize(&config, &mut ParticleRng::new(31338));
        assert_ne!(a.velocities, c.velocities);
    }

    #[test]
    fn point_emitter_starts_at_origin() {
        let mut config = DemoConfig::default();
        config.emitter = EmitterShape::Point {
            origin: Vec3::new(1.0, 2.0, 3.0),
        };
        config.velocity = VelocityCone::default();
        let (seed, _) = initialize(&config, &mut ParticleRng::new(2));
        assert!(seed.positions.iter().all(|p| *p == Vec3::new(1.0, 2.0, 3.0)));
    }
}
