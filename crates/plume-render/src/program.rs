//! The particle program: one shader module, two pipelines
//!
//! Group 0 is shared by both modes (uniforms, sprite texture, sampler).
//! The update pipeline additionally binds an input set at group 1 and a
//! capture set at group 2. The render pipeline reads the captured set as
//! per-instance vertex buffers.

use crate::texture::{create_sprite_sampler, SpriteTexture};
use bytemuck::Zeroable;
use plume_particles::{FrameUniforms, ProgramMode};
use wgpu::util::DeviceExt;

/// Threads per workgroup of the `update` entry point
pub const WORKGROUP_SIZE: u32 = 64;

const POSITION_STRIDE: u64 = 16;
const SPAWN_TIME_STRIDE: u64 = 4;

/// Additive blend (src_alpha + One)
const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub struct ParticleProgram {
    update_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
    pub frame_layout: wgpu::BindGroupLayout,
    pub input_layout: wgpu::BindGroupLayout,
    pub capture_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl ParticleProgram {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, additive: bool) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Program"),
            source: wgpu::ShaderSource::Wgsl(include_str!("particle_shader.wgsl").into()),
        });

        // Group 0: frame uniforms + sprite texture + sampler
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE
                        | wgpu::ShaderStages::VERTEX
                        | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Particle Frame Bind Group Layout"),
        });

        // Group 1: input set (positions, velocities, spawn times, initial velocities, initial positions)
        let input_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, true),
                storage_entry(4, true),
            ],
            label: Some("Particle Input Bind Group Layout"),
        });

        // Group 2: capture set (positions, velocities, spawn times)
        let capture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                storage_entry(0, false),
                storage_entry(1, false),
                storage_entry(2, false),
            ],
            label: Some("Particle Capture Bind Group Layout"),
        });

        let update_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Update Layout"),
            bind_group_layouts: &[&frame_layout, &input_layout, &capture_layout],
            push_constant_ranges: &[],
        });

        let update_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Update Pipeline"),
            layout: Some(&update_layout),
            module: &shader,
            entry_point: Some(ProgramMode::Update.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });

        let render_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Render Layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: POSITION_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![0 => Float32x4],
            },
            wgpu::VertexBufferLayout {
                array_stride: SPAWN_TIME_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![1 => Float32],
            },
        ];

        let blend = if additive {
            ADDITIVE_BLEND
        } else {
            wgpu::BlendState::ALPHA_BLENDING
        };

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&render_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(ProgramMode::Render.entry_point()),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: ProgramMode::Render.fragment_entry_point(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Uniform Buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        tracing::info!(?color_format, additive, "particle program built");

        Self {
            update_pipeline,
            render_pipeline,
            frame_layout,
            input_layout,
            capture_layout,
            uniform_buffer,
            sampler: create_sprite_sampler(device),
        }
    }

    pub fn update_pipeline(&self) -> &wgpu::ComputePipeline {
        &self.update_pipeline
    }

    pub fn render_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.render_pipeline
    }

    /// Bind the uniform buffer and a sprite texture as group 0
    pub fn frame_bind_group(&self, device: &wgpu::Device, sprite: &SpriteTexture) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&sprite.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("Particle Frame Bind Group"),
        })
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

/// Workgroups needed to cover `particle_count` invocations
pub fn workgroup_count(particle_count: u32) -> u32 {
    particle_count.div_ceil(WORKGROUP_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_cover_every_particle() {
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(1000), 16);
        assert_eq!(workgroup_count(4000), 63);
    }
}
