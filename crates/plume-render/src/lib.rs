//! Plume Render - wgpu backend for the particle feedback engine
//!
//! The update pass runs as a compute dispatch that reads one particle set and
//! writes the other; the render pass draws the written set as instanced
//! sprites. Both are recorded into one encoder per frame by
//! [`GpuFeedbackFrame`], driven by `plume_particles::FeedbackCoordinator`.

mod camera;
mod context;
mod frame;
mod headless;
mod program;
mod store;
mod texture;

pub use camera::Camera;
pub use context::{RenderContext, RenderError};
pub use frame::GpuFeedbackFrame;
pub use headless::HeadlessContext;
pub use program::{workgroup_count, ParticleProgram, WORKGROUP_SIZE};
pub use store::{GpuParticleStore, ParticleBuffers};
pub use texture::SpriteTexture;
