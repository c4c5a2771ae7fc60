//! GPU particle store: both particle sets and the shared initial streams

use crate::context::RenderError;
use crate::headless::read_mapped;
use crate::program::ParticleProgram;
use plume_core::{PlumeError, Result};
use plume_particles::{pack_vec3s, unpack_vec3s, ParticleSeed, ParticleSet, SetIndex, SetPair};
use wgpu::util::DeviceExt;

const STREAM_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::STORAGE
    .union(wgpu::BufferUsages::VERTEX)
    .union(wgpu::BufferUsages::COPY_DST)
    .union(wgpu::BufferUsages::COPY_SRC);

/// The three per-frame streams of one particle set
pub struct ParticleBuffers {
    pub positions: wgpu::Buffer,
    pub velocities: wgpu::Buffer,
    pub spawn_times: wgpu::Buffer,
}

impl ParticleBuffers {
    fn destroy(&self) {
        self.positions.destroy();
        self.velocities.destroy();
        self.spawn_times.destroy();
    }
}

/// Owns every particle buffer for the life of a simulation.
///
/// Buffers are sized once from the seed and never reallocated. Dropping the
/// store releases all of them.
pub struct GpuParticleStore {
    particle_count: u32,
    sets: SetPair<ParticleBuffers>,
    initial_velocities: wgpu::Buffer,
    initial_positions: wgpu::Buffer,
    input_groups: SetPair<wgpu::BindGroup>,
    capture_groups: SetPair<wgpu::BindGroup>,
}

fn stream_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: STREAM_USAGE,
    })
}

/// wgpu zero-initializes buffers, so set B needs no upload
fn zeroed_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: STREAM_USAGE,
        mapped_at_creation: false,
    })
}

impl GpuParticleStore {
    pub fn new(device: &wgpu::Device, program: &ParticleProgram, seed: &ParticleSeed) -> Self {
        let particle_count = seed.particle_count();
        let vec_bytes = particle_count as u64 * 16;
        let scalar_bytes = particle_count as u64 * 4;

        let set_a = ParticleBuffers {
            positions: stream_buffer(
                device,
                "Particle Positions A",
                bytemuck::cast_slice(&pack_vec3s(&seed.positions)),
            ),
            velocities: stream_buffer(
                device,
                "Particle Velocities A",
                bytemuck::cast_slice(&pack_vec3s(&seed.velocities)),
            ),
            spawn_times: stream_buffer(
                device,
                "Particle Spawn Times A",
                bytemuck::cast_slice(&seed.spawn_times),
            ),
        };
        let set_b = ParticleBuffers {
            positions: zeroed_buffer(device, "Particle Positions B", vec_bytes),
            velocities: zeroed_buffer(device, "Particle Velocities B", vec_bytes),
            spawn_times: zeroed_buffer(device, "Particle Spawn Times B", scalar_bytes),
        };
        let sets = SetPair::new(set_a, set_b);

        let initial_velocities = stream_buffer(
            device,
            "Particle Initial Velocities",
            bytemuck::cast_slice(&pack_vec3s(&seed.initial_velocities)),
        );
        let initial_positions = stream_buffer(
            device,
            "Particle Initial Positions",
            bytemuck::cast_slice(&pack_vec3s(&seed.initial_positions)),
        );

        let input_groups = SetPair::from_fn(|index| {
            let set = &sets[index];
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &program.input_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: set.positions.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: set.velocities.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: set.spawn_times.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: initial_velocities.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: initial_positions.as_entire_binding(),
                    },
                ],
                label: Some(&format!("Particle Input Bind Group {index}")),
            })
        });

        let capture_groups = SetPair::from_fn(|index| {
            let set = &sets[index];
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &program.capture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: set.positions.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: set.velocities.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: set.spawn_times.as_entire_binding(),
                    },
                ],
                label: Some(&format!("Particle Capture Bind Group {index}")),
            })
        });

        tracing::info!(
            particle_count,
            bytes = 2 * (2 * vec_bytes + scalar_bytes) + 2 * vec_bytes,
            "particle store allocated"
        );

        Self {
            particle_count,
            sets,
            initial_velocities,
            initial_positions,
            input_groups,
            capture_groups,
        }
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn buffers(&self, index: SetIndex) -> &ParticleBuffers {
        &self.sets[index]
    }

    /// Bind group exposing `index` as update input
    pub fn input_group(&self, index: SetIndex) -> &wgpu::BindGroup {
        &self.input_groups[index]
    }

    /// Bind group exposing `index` as the capture target
    pub fn capture_group(&self, index: SetIndex) -> &wgpu::BindGroup {
        &self.capture_groups[index]
    }

    /// Upload a new seed into set A and the initial streams.
    ///
    /// The existing buffers are reused; the caller must reset the read role
    /// to set A afterwards.
    pub fn reseed(&self, queue: &wgpu::Queue, seed: &ParticleSeed) -> Result<()> {
        if seed.particle_count() != self.particle_count {
            return Err(PlumeError::ParticleCountMismatch {
                expected: self.particle_count,
                got: seed.particle_count(),
            });
        }

        let set = &self.sets[SetIndex::A];
        queue.write_buffer(
            &set.positions,
            0,
            bytemuck::cast_slice(&pack_vec3s(&seed.positions)),
        );
        queue.write_buffer(
            &set.velocities,
            0,
            bytemuck::cast_slice(&pack_vec3s(&seed.velocities)),
        );
        queue.write_buffer(&set.spawn_times, 0, bytemuck::cast_slice(&seed.spawn_times));
        queue.write_buffer(
            &self.initial_velocities,
            0,
            bytemuck::cast_slice(&pack_vec3s(&seed.initial_velocities)),
        );
        queue.write_buffer(
            &self.initial_positions,
            0,
            bytemuck::cast_slice(&pack_vec3s(&seed.initial_positions)),
        );

        tracing::debug!(particle_count = self.particle_count, "particle store reseeded");
        Ok(())
    }

    /// Copy one set back to the host. Blocks until the queue has drained.
    pub fn read_set(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        index: SetIndex,
    ) -> std::result::Result<ParticleSet, RenderError> {
        let set = &self.sets[index];
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Particle Readback Encoder"),
        });
        let staging = [&set.positions, &set.velocities, &set.spawn_times].map(|source| {
            let staging = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Particle Readback Buffer"),
                size: source.size(),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
            encoder.copy_buffer_to_buffer(source, 0, &staging, 0, source.size());
            staging
        });
        queue.submit(std::iter::once(encoder.finish()));

        let [positions, velocities, spawn_times] = staging;
        let positions: Vec<[f32; 4]> = read_mapped(device, &positions)?
            .chunks_exact(16)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        let velocities: Vec<[f32; 4]> = read_mapped(device, &velocities)?
            .chunks_exact(16)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        let spawn_times: Vec<f32> = read_mapped(device, &spawn_times)?
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();

        Ok(ParticleSet {
            positions: unpack_vec3s(&positions),
            velocities: unpack_vec3s(&velocities),
            spawn_times,
        })
    }
}

impl Drop for GpuParticleStore {
    fn drop(&mut self) {
        for (_, set) in self.sets.iter() {
            set.destroy();
        }
        self.initial_velocities.destroy();
        self.initial_positions.destroy();
        tracing::debug!(particle_count = self.particle_count, "particle store released");
    }
}
