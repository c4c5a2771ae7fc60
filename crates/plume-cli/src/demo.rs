//! A demo bound to a wgpu device: coordinator, program and particle store

use plume_core::Color;
use plume_particles::{
    DemoConfig, FeedbackCoordinator, FrameReport, ParticleRng, ParticleSeed, ParticleStats,
};
use plume_render::{
    Camera, GpuFeedbackFrame, GpuParticleStore, ParticleProgram, RenderError, SpriteTexture,
};
use std::path::Path;

pub struct GpuDemo {
    pub config: DemoConfig,
    pub coordinator: FeedbackCoordinator,
    program: ParticleProgram,
    store: GpuParticleStore,
    _sprite: SpriteTexture,
    frame_group: wgpu::BindGroup,
    rng: ParticleRng,
}

impl GpuDemo {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        config: DemoConfig,
        texture: Option<&Path>,
    ) -> Self {
        let mut rng = ParticleRng::new(config.seed);
        let seed = ParticleSeed::generate(&config, &mut rng, 0.0);

        let program = ParticleProgram::new(device, format, config.sprite.additive);
        let sprite = SpriteTexture::load(device, queue, texture);
        let frame_group = program.frame_bind_group(device, &sprite);
        let store = GpuParticleStore::new(device, &program, &seed);
        let coordinator = FeedbackCoordinator::from_config(&config);

        Self {
            config,
            coordinator,
            program,
            store,
            _sprite: sprite,
            frame_group,
            rng,
        }
    }

    pub fn clear_color(&self) -> Color {
        self.config.sprite.clear_color
    }

    /// Record and submit one update + render frame into `view`
    pub fn frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &Camera,
        time: f32,
        delta: f32,
    ) -> FrameReport {
        self.coordinator.advance_clock(time, delta);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Particle Frame Encoder"),
        });
        let clear_color = self.clear_color();
        let report = {
            let mut target = GpuFeedbackFrame {
                queue,
                program: &self.program,
                store: &self.store,
                frame_group: &self.frame_group,
                encoder: &mut encoder,
                color_view: view,
                clear_color,
            };
            self.coordinator.run_frame(&mut target, &camera.view_params())
        };
        queue.submit(std::iter::once(encoder.finish()));
        report
    }

    /// Regenerate the population starting from the current simulation time
    pub fn reseed(&mut self, queue: &wgpu::Queue) -> plume_core::Result<()> {
        let seed = ParticleSeed::generate(&self.config, &mut self.rng, self.coordinator.time());
        self.store.reseed(queue, &seed)?;
        self.coordinator.restart();
        tracing::info!(time = self.coordinator.time(), "particles reseeded");
        Ok(())
    }

    /// Read back the most recently captured set and summarise it
    pub fn stats(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<ParticleStats, RenderError> {
        let set = self.store.read_set(device, queue, self.coordinator.roles().read())?;
        Ok(ParticleStats::from_set(
            &set,
            self.coordinator.time(),
            self.coordinator.params().lifetime,
        ))
    }
}
