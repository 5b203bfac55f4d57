//! GPU volume renderer
//!
//! Draws the scalar field by ray marching inside a unit cube, mirroring
//! compositor::march fragment for fragment. The field arrives as an
//! Rg32Float 3D texture (density in R, phase in G) behind a linear sampler.

use common::{Camera3D, CameraUniform, GraphicsContext};
use wgpu::util::DeviceExt;

use crate::compositor::CompositingParams;
use crate::constants::VOLUME_SCALE;
use crate::field::ScalarField;
use crate::state::ShadingMode;

/// Uniform block mirrored by shaders/orbital_volume.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct VolumeUniform {
    opacity: f32,
    steps: u32,
    threshold: f32,
    mode: u32,
    boost: f32,
    scale: f32,
    _pad: [f32; 2],
}

impl VolumeUniform {
    fn from_params(params: &CompositingParams) -> Self {
        Self {
            opacity: params.opacity,
            steps: params.steps,
            threshold: params.iso_threshold,
            mode: match params.shading {
                ShadingMode::Cloud => 0,
                ShadingMode::Isosurface => 1,
            },
            boost: params.density_boost,
            scale: VOLUME_SCALE,
            _pad: [0.0; 2],
        }
    }
}

/// Cube vertex in unit-cube coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct CubeVertex {
    position: [f32; 3],
}

impl CubeVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const fn v(x: f32, y: f32, z: f32) -> CubeVertex {
    CubeVertex { position: [x, y, z] }
}

// Unit cube, two CCW triangles per face, outward winding
const CUBE_VERTICES: &[CubeVertex] = &[
    // +z
    v(-0.5, -0.5, 0.5), v(0.5, -0.5, 0.5), v(0.5, 0.5, 0.5),
    v(-0.5, -0.5, 0.5), v(0.5, 0.5, 0.5), v(-0.5, 0.5, 0.5),
    // -z
    v(0.5, -0.5, -0.5), v(-0.5, -0.5, -0.5), v(-0.5, 0.5, -0.5),
    v(0.5, -0.5, -0.5), v(-0.5, 0.5, -0.5), v(0.5, 0.5, -0.5),
    // +x
    v(0.5, -0.5, 0.5), v(0.5, -0.5, -0.5), v(0.5, 0.5, -0.5),
    v(0.5, -0.5, 0.5), v(0.5, 0.5, -0.5), v(0.5, 0.5, 0.5),
    // -x
    v(-0.5, -0.5, -0.5), v(-0.5, -0.5, 0.5), v(-0.5, 0.5, 0.5),
    v(-0.5, -0.5, -0.5), v(-0.5, 0.5, 0.5), v(-0.5, 0.5, -0.5),
    // +y
    v(-0.5, 0.5, 0.5), v(0.5, 0.5, 0.5), v(0.5, 0.5, -0.5),
    v(-0.5, 0.5, 0.5), v(0.5, 0.5, -0.5), v(-0.5, 0.5, -0.5),
    // -y
    v(-0.5, -0.5, -0.5), v(0.5, -0.5, -0.5), v(0.5, -0.5, 0.5),
    v(-0.5, -0.5, -0.5), v(0.5, -0.5, 0.5), v(-0.5, -0.5, 0.5),
];

/// Renders the orbital field as a ray-marched volume
pub struct VolumeRenderer {
    pipeline: wgpu::RenderPipeline,
    cube_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    volume_buffer: wgpu::Buffer,
    field_layout: wgpu::BindGroupLayout,
    field_sampler: wgpu::Sampler,
    field_bind_group: Option<wgpu::BindGroup>,
}

impl VolumeRenderer {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Orbital Volume Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/orbital_volume.wgsl").into()),
        });

        // Camera uniform buffer
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Field texture + sampler + march parameters
        let field_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Field Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let field_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Field Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let volume_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Volume Uniform Buffer"),
            size: std::mem::size_of::<VolumeUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Volume Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &field_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Volume Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_volume",
                buffers: &[CubeVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_volume",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent::OVER,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Front faces only; the march starts at the box entry point
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let cube_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Buffer"),
            contents: bytemuck::cast_slice(CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            cube_buffer,
            camera_buffer,
            camera_bind_group,
            volume_buffer,
            field_layout,
            field_sampler,
            field_bind_group: None,
        }
    }

    /// Upload a freshly sampled field as the 3D texture the shader marches.
    pub fn upload_field(&mut self, ctx: &GraphicsContext, field: &ScalarField) {
        let size = field.size() as u32;
        let extent = wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: size,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Field Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::Rg32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            field.as_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(8 * size),
                rows_per_image: Some(size),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.field_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Field Bind Group"),
            layout: &self.field_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.field_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.volume_buffer.as_entire_binding(),
                },
            ],
        }));
        log::info!("uploaded {size}^3 field texture (generation {})", field.generation());
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera3D) {
        let uniform = CameraUniform::from_camera_3d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn update_params(&self, queue: &wgpu::Queue, params: &CompositingParams) {
        let uniform = VolumeUniform::from_params(params);
        queue.write_buffer(&self.volume_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Draw the volume. A no-op until the first field upload.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear: bool,
    ) {
        let load_op = if clear {
            wgpu::LoadOp::Clear(wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.08,
                a: 1.0,
            })
        } else {
            wgpu::LoadOp::Load
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Volume Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: load_op,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some(field_bind_group) = &self.field_bind_group {
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, field_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.cube_buffer.slice(..));
            render_pass.draw(0..CUBE_VERTICES.len() as u32, 0..1);
        }
    }
}
