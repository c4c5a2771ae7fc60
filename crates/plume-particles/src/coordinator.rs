//! Feedback Coordinator: the per-frame update → render → flip cycle
//!
//! The coordinator owns the simulation state and decides which particle set is
//! read and which is written each frame. The actual buffer work is delegated
//! to a [`FeedbackTarget`]: the wgpu backend in `plume-render` or the
//! [`CpuFeedbackStore`](crate::cpu::CpuFeedbackStore) reference backend.

use crate::config::{DemoConfig, SimulationParams, SpriteParams};
use crate::pingpong::{BufferRoles, SetIndex};
use bytemuck::{Pod, Zeroable};
use plume_core::Vec3;

/// The two execution modes of the particle program.
///
/// Each mode is resolved to a pipeline once when the program is built and is
/// selected per pass by value afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramMode {
    /// Integrate or respawn every particle, writing into the capture set
    Update,
    /// Draw the captured set as camera-facing sprites
    Render,
}

impl ProgramMode {
    /// Entry point of the stage that consumes particle data
    pub fn entry_point(self) -> &'static str {
        match self {
            ProgramMode::Update => "update",
            ProgramMode::Render => "vs_render",
        }
    }

    pub fn fragment_entry_point(self) -> Option<&'static str> {
        match self {
            ProgramMode::Update => None,
            ProgramMode::Render => Some("fs_render"),
        }
    }
}

/// Uniform block shared by both program modes (must match `FrameUniforms` in WGSL)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: [f32; 3],
    pub time: f32,
    pub camera_up: [f32; 3],
    pub delta_time: f32,
    pub acceleration: [f32; 3],
    pub lifetime: f32,
    pub size_start: f32,
    pub size_end: f32,
    pub particle_count: u32,
    pub _pad: u32,
    pub tint: [f32; 4],
}

/// Camera inputs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    /// Column-major view-projection matrix
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: Vec3,
    pub camera_up: Vec3,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            view_proj: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            camera_right: Vec3::RIGHT,
            camera_up: Vec3::UP,
        }
    }
}

/// Simulation state for the life of one particle store
#[derive(Debug, Clone)]
pub struct SimulationState {
    particle_count: u32,
    pub roles: BufferRoles,
    /// Simulation time in seconds, never decreases
    pub time: f32,
    pub delta: f32,
    pub params: SimulationParams,
    /// Completed frames since construction
    pub frame: u64,
}

impl SimulationState {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            particle_count: params.particle_count,
            roles: BufferRoles::new(),
            time: 0.0,
            delta: 0.0,
            params,
            frame: 0,
        }
    }

    /// Fixed at construction; later edits to `params.particle_count` are ignored
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }
}

/// Inputs for the update pass: read `source`, capture into `target`
#[derive(Debug, Clone, Copy)]
pub struct UpdatePass {
    pub source: SetIndex,
    pub target: SetIndex,
    pub particle_count: u32,
    pub uniforms: FrameUniforms,
}

/// Inputs for the render pass: draw `vertex_count` particles of `set`
#[derive(Debug, Clone, Copy)]
pub struct RenderPass {
    pub set: SetIndex,
    pub vertex_count: u32,
    pub uniforms: FrameUniforms,
}

/// Backend that owns the two particle sets and executes the passes.
///
/// Implementations must run passes in call order; the coordinator never calls
/// `render` before the `update` of the same frame.
pub trait FeedbackTarget {
    /// Run the update program over `pass.source`, writing into `pass.target`.
    /// Returns the number of particles captured.
    fn update(&mut self, pass: &UpdatePass) -> u32;

    /// Clear the colour target and draw the captured set
    fn render(&mut self, pass: &RenderPass);
}

/// What happened during one [`FeedbackCoordinator::run_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub source: SetIndex,
    pub target: SetIndex,
    pub captured: u32,
    pub rendered: u32,
}

pub struct FeedbackCoordinator {
    state: SimulationState,
    sprite: SpriteParams,
}

impl FeedbackCoordinator {
    pub fn new(params: SimulationParams, sprite: SpriteParams) -> Self {
        tracing::debug!(
            particle_count = params.particle_count,
            lifetime = params.lifetime,
            "feedback coordinator created"
        );
        Self {
            state: SimulationState::new(params),
            sprite,
        }
    }

    pub fn from_config(config: &DemoConfig) -> Self {
        Self::new(config.simulation, config.sprite.clone())
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn particle_count(&self) -> u32 {
        self.state.particle_count
    }

    pub fn roles(&self) -> BufferRoles {
        self.state.roles
    }

    pub fn time(&self) -> f32 {
        self.state.time
    }

    pub fn params(&self) -> &SimulationParams {
        &self.state.params
    }

    /// Live parameter changes, read by the next frame
    pub fn params_mut(&mut self) -> &mut SimulationParams {
        &mut self.state.params
    }

    pub fn sprite(&self) -> &SpriteParams {
        &self.sprite
    }

    /// Set the clock for the next frame. Time never moves backwards.
    pub fn advance_clock(&mut self, time: f32, delta: f32) {
        if time < self.state.time {
            tracing::debug!(
                requested = time,
                current = self.state.time,
                "ignoring backwards clock"
            );
        }
        self.state.time = self.state.time.max(time);
        self.state.delta = delta.max(0.0);
    }

    /// Roles back to read A / write B, after set A has been reseeded
    pub fn restart(&mut self) {
        self.state.roles.reset();
        tracing::debug!(time = self.state.time, "feedback roles reset");
    }

    pub fn uniforms(&self, view: &ViewParams) -> FrameUniforms {
        let params = &self.state.params;
        FrameUniforms {
            view_proj: view.view_proj,
            camera_right: view.camera_right.to_array(),
            time: self.state.time,
            camera_up: view.camera_up.to_array(),
            delta_time: self.state.delta,
            acceleration: params.acceleration.to_array(),
            lifetime: params.lifetime,
            size_start: self.sprite.size_start,
            size_end: self.sprite.size_end,
            particle_count: self.state.particle_count,
            _pad: 0,
            tint: self.sprite.tint.to_array(),
        }
    }

    /// Advance the particles by one frame and draw them.
    ///
    /// Update reads the current read set and captures into the write set;
    /// render then draws the write set; finally the roles flip.
    pub fn run_frame<T: FeedbackTarget + ?Sized>(
        &mut self,
        target: &mut T,
        view: &ViewParams,
    ) -> FrameReport {
        let uniforms = self.uniforms(view);
        let source = self.state.roles.read();
        let capture = self.state.roles.write();
        let particle_count = self.state.particle_count;

        let captured = target.update(&UpdatePass {
            source,
            target: capture,
            particle_count,
            uniforms,
        });
        debug_assert_eq!(
            captured, particle_count,
            "update pass captured a different population"
        );

        target.render(&RenderPass {
            set: capture,
            vertex_count: captured,
            uniforms,
        });

        self.state.roles.flip();
        self.state.frame += 1;

        tracing::trace!(
            frame = self.state.frame,
            %source,
            target = %capture,
            captured,
            time = self.state.time,
            "frame complete"
        );

        FrameReport {
            frame: self.state.frame,
            source,
            target: capture,
            captured,
            rendered: captured,
        }
    }
}

/// One particle's streams
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub spawn_time: f32,
}

/// Per-particle update, identical to the `update` entry point of the WGSL program
pub fn integrate_particle(
    current: ParticleState,
    initial_position: Vec3,
    initial_velocity: Vec3,
    uniforms: &FrameUniforms,
) -> ParticleState {
    let time = uniforms.time;
    if time < current.spawn_time {
        return current;
    }

    if time - current.spawn_time > uniforms.lifetime {
        return ParticleState {
            position: initial_position,
            velocity: initial_velocity,
            spawn_time: time,
        };
    }

    let dt = uniforms.delta_time;
    let velocity = current.velocity + Vec3::from_array(uniforms.acceleration) * dt;
    ParticleState {
        position: current.position + velocity * dt,
        velocity,
        spawn_time: current.spawn_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Update(SetIndex, SetIndex, u32),
        Render(SetIndex, u32),
    }

    #[derive(Default)]
    struct RecordingTarget {
        calls: Vec<Call>,
    }

    impl FeedbackTarget for RecordingTarget {
        fn update(&mut self, pass: &UpdatePass) -> u32 {
            self.calls
                .push(Call::Update(pass.source, pass.target, pass.particle_count));
            pass.particle_count
        }

        fn render(&mut self, pass: &RenderPass) {
            self.calls.push(Call::Render(pass.set, pass.vertex_count));
        }
    }

    fn coordinator(count: u32) -> FeedbackCoordinator {
        let params = SimulationParams {
            particle_count: count,
            ..SimulationParams::default()
        };
        FeedbackCoordinator::new(params, SpriteParams::default())
    }

    #[test]
    fn uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 144);
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
    }

    #[test]
    fn update_precedes_render_of_the_captured_set() {
        let mut coord = coordinator(4000);
        let mut target = RecordingTarget::default();
        coord.run_frame(&mut target, &ViewParams::default());
        coord.run_frame(&mut target, &ViewParams::default());

        assert_eq!(
            target.calls,
            vec![
                Call::Update(SetIndex::A, SetIndex::B, 4000),
                Call::Render(SetIndex::B, 4000),
                Call::Update(SetIndex::B, SetIndex::A, 4000),
                Call::Render(SetIndex::A, 4000),
            ]
        );
    }

    #[test]
    fn roles_alternate_every_frame() {
        let mut coord = coordinator(16);
        let mut target = RecordingTarget::default();
        let mut previous = coord.roles().read();
        for n in 1..=50u64 {
            let report = coord.run_frame(&mut target, &ViewParams::default());
            assert_eq!(report.frame, n);
            assert_ne!(report.source, report.target);
            assert_eq!(report.source, previous);
            assert_eq!(coord.roles().read(), previous.other());
            previous = coord.roles().read();
        }
    }

    #[test]
    fn population_is_constant() {
        let mut coord = coordinator(4000);
        coord.params_mut().particle_count = 10;
        let mut target = RecordingTarget::default();
        for _ in 0..10 {
            let report = coord.run_frame(&mut target, &ViewParams::default());
            assert_eq!(report.captured, 4000);
            assert_eq!(report.rendered, 4000);
        }
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut coord = coordinator(1);
        coord.advance_clock(5.0, 0.1);
        coord.advance_clock(3.0, -1.0);
        assert_eq!(coord.time(), 5.0);
        assert_eq!(coord.state().delta, 0.0);
        coord.advance_clock(5.5, 0.5);
        assert_eq!(coord.time(), 5.5);
    }

    #[test]
    fn restart_reads_set_a() {
        let mut coord = coordinator(8);
        let mut target = RecordingTarget::default();
        coord.run_frame(&mut target, &ViewParams::default());
        assert_eq!(coord.roles().read(), SetIndex::B);
        coord.restart();
        assert_eq!(coord.roles().read(), SetIndex::A);
    }

    #[test]
    fn live_params_reach_uniforms() {
        let mut coord = coordinator(8);
        coord.params_mut().lifetime = 2.0;
        coord.params_mut().acceleration = Vec3::new(0.0, 0.3, 0.0);
        coord.advance_clock(1.5, 0.016);
        let u = coord.uniforms(&ViewParams::default());
        assert_eq!(u.lifetime, 2.0);
        assert_eq!(u.acceleration, [0.0, 0.3, 0.0]);
        assert_eq!(u.time, 1.5);
        assert_eq!(u.delta_time, 0.016);
        assert_eq!(u.particle_count, 8);
    }

    #[test]
    fn program_mode_entry_points() {
        assert_eq!(ProgramMode::Update.entry_point(), "update");
        assert_eq!(ProgramMode::Update.fragment_entry_point(), None);
        assert_eq!(ProgramMode::Render.entry_point(), "vs_render");
        assert_eq!(ProgramMode::Render.fragment_entry_point(), Some("fs_render"));
    }

    fn uniforms_at(time: f32, dt: f32) -> FrameUniforms {
        let mut coord = coordinator(1);
        coord.advance_clock(time, dt);
        coord.uniforms(&ViewParams::default())
    }

    #[test]
    fn unborn_particle_is_unchanged() {
        let p = ParticleState {
            position: Vec3::new(1.0, 1.0, 1.0),
            velocity: Vec3::UP,
            spawn_time: 2.0,
        };
        let next = integrate_particle(p, Vec3::ZERO, Vec3::RIGHT, &uniforms_at(1.0, 0.1));
        assert_eq!(next, p);
    }

    #[test]
    fn live_particle_integrates_velocity_first() {
        let p = ParticleState {
            position: Vec3::ZERO,
            velocity: Vec3::UP,
            spawn_time: 0.0,
        };
        let next = integrate_particle(p, Vec3::ZERO, Vec3::UP, &uniforms_at(1.0, 0.1));
        // default acceleration is (0, -0.6, 0)
        assert!((next.velocity.y - 0.94).abs() < 1e-6);
        assert!((next.position.y - 0.094).abs() < 1e-6);
        assert_eq!(next.spawn_time, 0.0);
    }

    #[test]
    fn expired_particle_respawns() {
        let p = ParticleState {
            position: Vec3::new(3.0, -2.0, 0.0),
            velocity: Vec3::new(0.0, -4.0, 0.0),
            spawn_time: 0.0,
        };
        let origin = Vec3::new(-1.5, 0.0, 0.0);
        let next = integrate_particle(p, origin, Vec3::UP, &uniforms_at(3.6, 0.1));
        assert_eq!(next.position, origin);
        assert_eq!(next.velocity, Vec3::UP);
        assert_eq!(next.spawn_time, 3.6);
    }
}
