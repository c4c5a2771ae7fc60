//! Records one frame's update and render passes into a command encoder

use crate::program::{workgroup_count, ParticleProgram};
use crate::store::GpuParticleStore;
use plume_core::Color;
use plume_particles::{FeedbackTarget, RenderPass, UpdatePass};

/// wgpu backend for the feedback coordinator.
///
/// Both passes go into the same encoder in call order. wgpu tracks the
/// capture buffers' storage-write → vertex-read transition between the
/// compute and render passes, so no explicit barrier is recorded here.
pub struct GpuFeedbackFrame<'a> {
    pub queue: &'a wgpu::Queue,
    pub program: &'a ParticleProgram,
    pub store: &'a GpuParticleStore,
    pub frame_group: &'a wgpu::BindGroup,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub clear_color: Color,
}

impl FeedbackTarget for GpuFeedbackFrame<'_> {
    fn update(&mut self, pass: &UpdatePass) -> u32 {
        self.program.write_uniforms(self.queue, &pass.uniforms);

        let count = pass.particle_count.min(self.store.particle_count());
        let mut compute = self.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Particle Update Pass"),
            timestamp_writes: None,
        });
        compute.set_pipeline(self.program.update_pipeline());
        compute.set_bind_group(0, self.frame_group, &[]);
        compute.set_bind_group(1, self.store.input_group(pass.source), &[]);
        compute.set_bind_group(2, self.store.capture_group(pass.target), &[]);
        compute.dispatch_workgroups(workgroup_count(count), 1, 1);

        count
    }

    fn render(&mut self, pass: &RenderPass) {
        let buffers = self.store.buffers(pass.set);
        let clear = self.clear_color;

        let mut render = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Particle Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: clear.a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render.set_pipeline(self.program.render_pipeline());
        render.set_bind_group(0, self.frame_group, &[]);
        render.set_vertex_buffer(0, buffers.positions.slice(..));
        render.set_vertex_buffer(1, buffers.spawn_times.slice(..));
        // Six vertices per sprite quad, one instance per particle
        render.draw(0..6, 0..pass.vertex_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessContext;
    use crate::texture::SpriteTexture;
    use plume_core::PlumeError;
    use plume_particles::{
        CpuFeedbackStore, DemoConfig, FeedbackCoordinator, ParticleRng, ParticleSeed, ParticleSet,
        SetIndex, ViewParams,
    };

    const EPSILON: f32 = 1e-5;

    fn small_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.simulation.particle_count = 100;
        config.simulation.rate = 0.01;
        config.simulation.lifetime = 0.5;
        config
    }

    fn assert_sets_match(gpu: &ParticleSet, cpu: &ParticleSet) {
        assert_eq!(gpu.len(), cpu.len());
        for i in 0..cpu.len() {
            let dp = (gpu.positions[i] - cpu.positions[i]).length();
            let dv = (gpu.velocities[i] - cpu.velocities[i]).length();
            let ds = (gpu.spawn_times[i] - cpu.spawn_times[i]).abs();
            assert!(
                dp < EPSILON && dv < EPSILON && ds < EPSILON,
                "particle {i} diverged: gpu {:?}/{:?}/{} cpu {:?}/{:?}/{}",
                gpu.positions[i],
                gpu.velocities[i],
                gpu.spawn_times[i],
                cpu.positions[i],
                cpu.velocities[i],
                cpu.spawn_times[i],
            );
        }
    }

    #[test]
    fn gpu_frames_match_cpu_reference() {
        // Machines without any adapter (including software ones) skip
        let Ok(ctx) = pollster::block_on(HeadlessContext::new(64, 64)) else {
            return;
        };

        let config = small_config();
        let seed = ParticleSeed::generate(&config, &mut ParticleRng::new(7), 0.0);

        let program = ParticleProgram::new(&ctx.device, ctx.format, false);
        let sprite = SpriteTexture::white(&ctx.device, &ctx.queue);
        let frame_group = program.frame_bind_group(&ctx.device, &sprite);
        let store = GpuParticleStore::new(&ctx.device, &program, &seed);

        let mut gpu = FeedbackCoordinator::from_config(&config);
        let mut cpu = FeedbackCoordinator::from_config(&config);
        let mut reference = CpuFeedbackStore::new(&seed);
        let view = ViewParams::default();

        // Frame 1 at t=0.605: indices 0..=10 respawn, 11..=60 integrate,
        // the rest are not yet born. Frame 2 reads B back into A.
        for (time, delta, written) in [(0.605, 0.05, SetIndex::B), (0.657, 0.052, SetIndex::A)] {
            gpu.advance_clock(time, delta);
            cpu.advance_clock(time, delta);

            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Test Frame Encoder"),
                });
            let report = {
                let mut target = GpuFeedbackFrame {
                    queue: &ctx.queue,
                    program: &program,
                    store: &store,
                    frame_group: &frame_group,
                    encoder: &mut encoder,
                    color_view: &ctx.color_view,
                    clear_color: Color::BLACK,
                };
                gpu.run_frame(&mut target, &view)
            };
            ctx.queue.submit(std::iter::once(encoder.finish()));
            cpu.run_frame(&mut reference, &view);

            assert_eq!(report.target, written);
            assert_eq!(report.captured, 100);

            let read_back = store
                .read_set(&ctx.device, &ctx.queue, written)
                .expect("particle readback failed");
            assert_sets_match(&read_back, reference.set(written));
        }

        let after = store
            .read_set(&ctx.device, &ctx.queue, SetIndex::A)
            .expect("particle readback failed");
        assert_eq!(after.spawn_times[0], 0.605);
        assert_eq!(after.spawn_times[90], seed.spawn_times[90]);
    }

    #[test]
    fn reseed_rejects_a_different_population() {
        let Ok(ctx) = pollster::block_on(HeadlessContext::new(16, 16)) else {
            return;
        };

        let mut config = small_config();
        let mut rng = ParticleRng::new(3);
        let seed = ParticleSeed::generate(&config, &mut rng, 0.0);
        let program = ParticleProgram::new(&ctx.device, ctx.format, true);
        let store = GpuParticleStore::new(&ctx.device, &program, &seed);

        let again = ParticleSeed::generate(&config, &mut rng, 1.0);
        assert!(store.reseed(&ctx.queue, &again).is_ok());
        let set_a = store
            .read_set(&ctx.device, &ctx.queue, SetIndex::A)
            .expect("particle readback failed");
        assert_eq!(set_a, ParticleSet::from_seed(&again));

        config.simulation.particle_count = 50;
        let smaller = ParticleSeed::generate(&config, &mut rng, 1.0);
        assert!(matches!(
            store.reseed(&ctx.queue, &smaller),
            Err(PlumeError::ParticleCountMismatch {
                expected: 100,
                got: 50
            })
        ));
        assert_eq!(store.particle_count(), 100);
    }
}
