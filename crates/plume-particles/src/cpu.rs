//! CPU reference backend
//!
//! Runs the same update program as the GPU on plain vectors. Used to check the
//! feedback protocol without a device and by `plume simulate`.

use crate::coordinator::{integrate_particle, FeedbackTarget, ParticleState, RenderPass, UpdatePass};
use crate::particle::{ParticleSeed, ParticleSet};
use crate::pingpong::{SetIndex, SetPair};
use plume_core::{PlumeError, Result, Vec3};

/// The most recent render draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRecord {
    pub set: SetIndex,
    pub vertex_count: u32,
}

pub struct CpuFeedbackStore {
    sets: SetPair<ParticleSet>,
    initial_positions: Vec<Vec3>,
    initial_velocities: Vec<Vec3>,
    last_draw: Option<DrawRecord>,
    draw_count: u64,
}

impl CpuFeedbackStore {
    /// Set A takes the seed, set B is zeroed to the same length
    pub fn new(seed: &ParticleSeed) -> Self {
        let sets = SetPair::new(ParticleSet::from_seed(seed), ParticleSet::zeroed(seed.len()));
        Self::from_sets(sets, seed)
    }

    /// Wrap sets produced by [`initialize`](crate::initializer::initialize)
    pub fn from_sets(sets: SetPair<ParticleSet>, seed: &ParticleSeed) -> Self {
        Self {
            sets,
            initial_positions: seed.initial_positions.clone(),
            initial_velocities: seed.initial_velocities.clone(),
            last_draw: None,
            draw_count: 0,
        }
    }

    pub fn particle_count(&self) -> u32 {
        self.sets[SetIndex::A].len() as u32
    }

    pub fn set(&self, index: SetIndex) -> &ParticleSet {
        &self.sets[index]
    }

    pub fn last_draw(&self) -> Option<DrawRecord> {
        self.last_draw
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Overwrite set A and the initial streams in place
    pub fn reseed(&mut self, seed: &ParticleSeed) -> Result<()> {
        let expected = self.particle_count();
        if seed.particle_count() != expected {
            return Err(PlumeError::ParticleCountMismatch {
                expected,
                got: seed.particle_count(),
            });
        }
        self.sets[SetIndex::A] = ParticleSet::from_seed(seed);
        self.initial_positions.clone_from(&seed.initial_positions);
        self.initial_velocities.clone_from(&seed.initial_velocities);
        tracing::debug!(count = expected, "cpu particle store reseeded");
        Ok(())
    }
}

impl FeedbackTarget for CpuFeedbackStore {
    fn update(&mut self, pass: &UpdatePass) -> u32 {
        debug_assert_eq!(pass.target, pass.source.other());
        let (source, target) = self.sets.split(pass.source);
        let count = (pass.particle_count as usize).min(source.len());

        for i in 0..count {
            let next = integrate_particle(
                ParticleState {
                    position: source.positions[i],
                    velocity: source.velocities[i],
                    spawn_time: source.spawn_times[i],
                },
                self.initial_positions[i],
                self.initial_velocities[i],
                &pass.uniforms,
            );
            target.positions[i] = next.position;
            target.velocities[i] = next.velocity;
            target.spawn_times[i] = next.spawn_time;
        }
        count as u32
    }

    fn render(&mut self, pass: &RenderPass) {
        self.last_draw = Some(DrawRecord {
            set: pass.set,
            vertex_count: pass.vertex_count,
        });
        self.draw_count += 1;
    }
}

/// Summary of one particle set at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleStats {
    pub total: usize,
    pub alive: usize,
    /// Not yet past their spawn time
    pub pending: usize,
    pub mean_speed: f32,
    /// Bounding box of live particles
    pub bounds: Option<(Vec3, Vec3)>,
}

impl ParticleStats {
    pub fn from_set(set: &ParticleSet, time: f32, lifetime: f32) -> Self {
        let mut alive = 0;
        let mut pending = 0;
        let mut speed_sum = 0.0;
        let mut bounds: Option<(Vec3, Vec3)> = None;

        for i in 0..set.len() {
            let age = time - set.spawn_times[i];
            if age < 0.0 {
                pending += 1;
                continue;
            }
            if age > lifetime {
                continue;
            }
            alive += 1;
            speed_sum += set.velocities[i].length();
            let p = set.positions[i];
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(&p), hi.max(&p)),
                None => (p, p),
            });
        }

        Self {
            total: set.len(),
            alive,
            pending,
            mean_speed: if alive > 0 {
                speed_sum / alive as f32
            } else {
                0.0
            },
            bounds,
        }
    }
}

impl std::fmt::Display for ParticleStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} alive, {} pending, mean speed {:.3}",
            self.alive, self.total, self.pending, self.mean_speed
        )?;
        if let Some((lo, hi)) = self.bounds {
            write!(
                f,
                ", bounds [{:.2}, {:.2}, {:.2}]..[{:.2}, {:.2}, {:.2}]",
                lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
            )?;
        }
        Ok(())
    }
}
