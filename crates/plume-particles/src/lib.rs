//! Plume Particles - double-buffered particle feedback core
//!
//! Backend-independent half of the engine:
//! - Seeded particle initialisation (cone velocities, staggered spawn times)
//! - Read/write role tracking for the two particle sets
//! - The per-frame update → render → flip coordinator and its backend trait
//! - A CPU reference backend that runs the same update program

pub mod config;
pub mod coordinator;
pub mod cpu;
pub mod initializer;
pub mod particle;
pub mod pingpong;
pub mod presets;
pub mod rand;

pub use config::{CameraParams, DemoConfig, EmitterShape, SimulationParams, SpriteParams, VelocityCone};
pub use coordinator::{
    integrate_particle, FeedbackCoordinator, FeedbackTarget, FrameReport, FrameUniforms,
    ParticleState, ProgramMode, RenderPass, SimulationState, UpdatePass, ViewParams,
};
pub use cpu::{CpuFeedbackStore, DrawRecord, ParticleStats};
pub use initializer::initialize;
pub use particle::{pack_vec3s, unpack_vec3s, ParticleSeed, ParticleSet};
pub use pingpong::{BufferRoles, SetIndex, SetPair};
pub use presets::Preset;
pub use rand::ParticleRng;
