//! The wgpu implementation of [`RenderDevice`].
//!
//! The trait's GL-flavored contract (bind, set uniforms, draw) is mapped onto
//! wgpu by deferring: `draw` snapshots the bound state plus the staged
//! uniform block into a pending-draw list, and `end_frame` replays the whole
//! list inside one render pass. Per-draw uniform values live in a single
//! per-frame arena buffer, each draw binding its own 256-aligned slot through
//! a dynamic offset — so every draw sees exactly the values staged for it,
//! in order.
//!
//! Pipelines are created lazily, cached per (program, draw mode, depth-test)
//! combination; programs themselves are compiled once, with uniform byte
//! offsets introspected from their declarations at creation time.

use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;

use crate::color::Color;
use crate::geometry::DrawMode;
use crate::gpu::GpuContext;
use crate::render::device::{
    BufferHandle, ProgramHandle, RenderDevice, RenderError, TextureHandle, UniformValue,
};
use crate::shader::{EntityBinding, ShaderProgramSpec, StaticBinding};

/// Dynamic-offset alignment required for uniform buffer slots.
const UNIFORM_SLOT_ALIGN: u64 = 256;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct ProgramData {
    name: String,
    module: wgpu::ShaderModule,
    vertex_stride: u64,
    vertex_attributes: Vec<wgpu::VertexAttribute>,
    /// Uniform name → (byte offset, byte size) within the block.
    uniform_offsets: HashMap<String, (usize, usize)>,
    block_size: u64,
    uses_atlas: bool,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(DrawMode, bool), wgpu::RenderPipeline>,
    /// CPU staging for the uniform block; snapshotted into the arena per draw.
    staged: Vec<u8>,
    /// Bind group over the arena buffer, tagged with the arena generation it
    /// was built against.
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

struct BufferData {
    label: String,
    buffer: wgpu::Buffer,
    capacity: u64,
}

struct TextureData {
    label: String,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

struct PendingDraw {
    program: usize,
    buffer: usize,
    texture: Option<usize>,
    mode: DrawMode,
    first_vertex: u32,
    vertex_count: u32,
    depth: bool,
    uniform_offset: u64,
}

/// [`RenderDevice`] over a real wgpu device and window surface.
pub struct WgpuDevice {
    gpu: GpuContext,
    texture_layout: wgpu::BindGroupLayout,
    programs: Vec<ProgramData>,
    buffers: Vec<Option<BufferData>>,
    textures: Vec<TextureData>,
    bound_program: Option<usize>,
    bound_buffer: Option<usize>,
    bound_texture: Option<usize>,
    depth_test: bool,
    clear_color: wgpu::Color,
    arena: Vec<u8>,
    arena_buffer: Option<wgpu::Buffer>,
    arena_capacity: u64,
    arena_generation: u64,
    pending: Vec<PendingDraw>,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl WgpuDevice {
    pub fn new(gpu: GpuContext) -> Self {
        let texture_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Atlas Bind Group Layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
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
                    ],
                });

        let depth_view = create_depth_view(&gpu);
        let depth_size = (gpu.width(), gpu.height());

        Self {
            gpu,
            texture_layout,
            programs: Vec::new(),
            buffers: Vec::new(),
            textures: Vec::new(),
            bound_program: None,
            bound_buffer: None,
            bound_texture: None,
            depth_test: false,
            clear_color: wgpu::Color::BLACK,
            arena: Vec::new(),
            arena_buffer: None,
            arena_capacity: 0,
            arena_generation: 0,
            pending: Vec::new(),
            depth_view,
            depth_size,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    fn ensure_arena_buffer(&mut self) {
        let needed = self.arena.len() as u64;
        if self.arena_buffer.is_none() || needed > self.arena_capacity {
            let capacity = needed.next_power_of_two().max(4096);
            self.arena_buffer = Some(self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Uniform Arena"),
                size: capacity,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.arena_capacity = capacity;
            self.arena_generation += 1;
        }
    }

    fn ensure_bind_group(&mut self, program: usize) {
        let generation = self.arena_generation;
        let stale = self.programs[program]
            .bind_group
            .as_ref()
            .map(|(g, _)| *g != generation)
            .unwrap_or(true);
        if !stale {
            return;
        }
        let arena = self
            .arena_buffer
            .as_ref()
            .expect("arena buffer exists before bind groups");
        let prog = &mut self.programs[program];
        let bind_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Uniforms", prog.name)),
            layout: &prog.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: arena,
                    offset: 0,
                    size: wgpu::BufferSize::new(prog.block_size),
                }),
            }],
        });
        prog.bind_group = Some((generation, bind_group));
    }

    fn ensure_pipeline(&mut self, program: usize, mode: DrawMode, depth: bool) {
        if self.programs[program].pipelines.contains_key(&(mode, depth)) {
            return;
        }
        let format = self.gpu.config.format;
        let prog = &self.programs[program];
        let pipeline = self
            .gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{} Pipeline", prog.name)),
                layout: Some(&prog.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &prog.module,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: prog.vertex_stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &prog.vertex_attributes,
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &prog.module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: topology(mode),
                    ..Default::default()
                },
                // The pass always carries a depth attachment, so every
                // pipeline declares the depth format; 2D mode just neither
                // tests nor writes.
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth,
                    depth_compare: if depth {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        self.programs[program]
            .pipelines
            .insert((mode, depth), pipeline);
    }

    fn ensure_depth_size(&mut self) {
        let size = (self.gpu.width(), self.gpu.height());
        if self.depth_size != size {
            self.depth_view = create_depth_view(&self.gpu);
            self.depth_size = size;
        }
    }

    fn make_texture(&self, label: &str, width: u32, height: u32, pixels: &[u8]) -> wgpu::TextureView {
        let texture = self.gpu.device.create_texture_with_data(
            &self.gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            pixels,
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn make_texture_bind_group(
        &self,
        label: &str,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}

impl RenderDevice for WgpuDevice {
    fn create_program(&mut self, spec: &ShaderProgramSpec) -> Result<ProgramHandle, RenderError> {
        // Catch WGSL front-end errors eagerly; wgpu reports them through the
        // validation error scope rather than a Result.
        self.gpu
            .device
            .push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&spec.name),
                source: wgpu::ShaderSource::Wgsl(spec.source.as_str().into()),
            });
        if let Some(error) = pollster::block_on(self.gpu.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile {
                name: spec.name.clone(),
                detail: error.to_string(),
            });
        }

        let mut vertex_attributes = Vec::with_capacity(spec.attributes.len());
        let mut offset = 0u64;
        for (location, attribute) in spec.attributes.iter().enumerate() {
            let format = match attribute.components {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                4 => wgpu::VertexFormat::Float32x4,
                n => {
                    return Err(RenderError::BadProgramSpec {
                        name: spec.name.clone(),
                        detail: format!("attribute '{}' has {n} components", attribute.name),
                    });
                }
            };
            vertex_attributes.push(wgpu::VertexAttribute {
                offset,
                shader_location: location as u32,
                format,
            });
            offset += attribute.components as u64 * 4;
        }
        let vertex_stride = offset;

        // Introspect uniform byte offsets in declaration order: statics
        // first, then entity uniforms, matching the WGSL uniform struct.
        let mut uniform_offsets = HashMap::new();
        let mut block = 0usize;
        let mut uses_atlas = false;
        for uniform in &spec.static_uniforms {
            let size = match uniform.binding {
                StaticBinding::ViewMatrix | StaticBinding::ProjectionMatrix => 64,
                StaticBinding::AtlasTexture => {
                    uses_atlas = true;
                    continue;
                }
            };
            uniform_offsets.insert(uniform.name.clone(), (block, size));
            block += size;
        }
        for uniform in &spec.entity_uniforms {
            let size = match uniform.binding {
                EntityBinding::ModelMatrix => 64,
                EntityBinding::FlatColor | EntityBinding::TexRegion => 16,
            };
            uniform_offsets.insert(uniform.name.clone(), (block, size));
            block += size;
        }
        let block_size = (block as u64).max(16);

        let uniform_layout =
            self.gpu
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{} Uniform Layout", spec.name)),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: wgpu::BufferSize::new(block_size),
                        },
                        count: None,
                    }],
                });

        let mut layouts = vec![&uniform_layout];
        if uses_atlas {
            layouts.push(&self.texture_layout);
        }
        let pipeline_layout =
            self.gpu
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(&format!("{} Layout", spec.name)),
                    bind_group_layouts: &layouts,
                    push_constant_ranges: &[],
                });

        self.programs.push(ProgramData {
            name: spec.name.clone(),
            module,
            vertex_stride,
            vertex_attributes,
            uniform_offsets,
            block_size,
            uses_atlas,
            uniform_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            staged: vec![0; block_size as usize],
            bind_group: None,
        });
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    fn create_buffer(&mut self, label: &str) -> Result<BufferHandle, RenderError> {
        // A small initial allocation; the first real upload usually grows it.
        const INITIAL_CAPACITY: u64 = 256;
        let buffer = self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: INITIAL_CAPACITY,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.buffers.push(Some(BufferData {
            label: label.to_owned(),
            buffer,
            capacity: INITIAL_CAPACITY,
        }));
        Ok(BufferHandle(self.buffers.len() - 1))
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(slot) = self.buffers.get_mut(buffer.0) {
            *slot = None;
        }
        if self.bound_buffer == Some(buffer.0) {
            self.bound_buffer = None;
        }
    }

    fn upload_vertices(&mut self, buffer: BufferHandle, data: &[f32]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let Some(Some(slot)) = self.buffers.get_mut(buffer.0) else {
            log::error!("upload to deleted or unknown vertex buffer {}", buffer.0);
            return;
        };
        if (bytes.len() as u64) <= slot.capacity {
            self.gpu.queue.write_buffer(&slot.buffer, 0, bytes);
        } else {
            slot.buffer = self
                .gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&slot.label),
                    contents: bytes,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
            slot.capacity = bytes.len() as u64;
        }
    }

    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, RenderError> {
        if pixels.len() != (width * height * 4) as usize {
            return Err(RenderError::ResourceCreation {
                what: "texture",
                name: label.to_owned(),
                detail: format!(
                    "{} bytes for {}x{} RGBA texels",
                    pixels.len(),
                    width,
                    height
                ),
            });
        }
        let view = self.make_texture(label, width, height, pixels);
        let sampler = self.gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let bind_group = self.make_texture_bind_group(label, &view, &sampler);
        self.textures.push(TextureData {
            label: label.to_owned(),
            sampler,
            bind_group,
        });
        Ok(TextureHandle(self.textures.len() - 1))
    }

    fn write_texture(&mut self, texture: TextureHandle, width: u32, height: u32, pixels: &[u8]) {
        if self.textures.get(texture.0).is_none() {
            log::error!("write to unknown texture {}", texture.0);
            return;
        }
        // The replacement image rarely matches the placeholder's dimensions,
        // so rebuild the texture and its bind group in place; the handle and
        // sampler survive.
        let label = self.textures[texture.0].label.clone();
        let view = self.make_texture(&label, width, height, pixels);
        let bind_group =
            self.make_texture_bind_group(&label, &view, &self.textures[texture.0].sampler);
        self.textures[texture.0].bind_group = bind_group;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.bound_program = Some(program.0);
    }

    fn bind_buffer(&mut self, buffer: BufferHandle) {
        self.bound_buffer = Some(buffer.0);
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.bound_texture = Some(texture.0);
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        let Some(prog) = self.programs.get_mut(program.0) else {
            log::error!("set_uniform on unknown program {}", program.0);
            return;
        };
        let Some(&(offset, size)) = prog.uniform_offsets.get(name) else {
            log::warn!("program '{}' declares no uniform '{name}'", prog.name);
            return;
        };
        debug_assert_eq!(size, value.byte_size());
        match value {
            UniformValue::Mat4(m) => {
                let floats = m.to_cols_array();
                prog.staged[offset..offset + 64].copy_from_slice(bytemuck::cast_slice(&floats));
            }
            UniformValue::Vec4(v) => {
                let floats = v.to_array();
                prog.staged[offset..offset + 16].copy_from_slice(bytemuck::cast_slice(&floats));
            }
        }
    }

    fn draw(&mut self, mode: DrawMode, first_vertex: u32, vertex_count: u32) {
        let Some(program) = self.bound_program else {
            log::error!("draw issued with no program bound");
            return;
        };
        let Some(buffer) = self.bound_buffer else {
            log::error!("draw issued with no vertex buffer bound");
            return;
        };

        // Snapshot this draw's uniform block into its own aligned arena slot.
        let uniform_offset = self.arena.len() as u64;
        let staged = &self.programs[program].staged;
        self.arena.extend_from_slice(staged);
        let padded = (staged.len() as u64).next_multiple_of(UNIFORM_SLOT_ALIGN);
        self.arena
            .resize((uniform_offset + padded) as usize, 0);

        self.pending.push(PendingDraw {
            program,
            buffer,
            texture: self.bound_texture,
            mode,
            first_vertex,
            vertex_count,
            depth: self.depth_test,
            uniform_offset,
        });
    }

    fn begin_frame(&mut self, clear: Color) {
        self.clear_color = wgpu::Color {
            r: clear.r as f64,
            g: clear.g as f64,
            b: clear.b as f64,
            a: clear.a as f64,
        };
        self.arena.clear();
        self.pending.clear();
    }

    fn end_frame(&mut self) {
        if !self.pending.is_empty() {
            self.ensure_arena_buffer();
            self.gpu.queue.write_buffer(
                self.arena_buffer.as_ref().expect("just ensured"),
                0,
                &self.arena,
            );

            let used_programs: HashSet<usize> =
                self.pending.iter().map(|d| d.program).collect();
            for program in used_programs {
                self.ensure_bind_group(program);
            }
            let used_pipelines: HashSet<(usize, DrawMode, bool)> = self
                .pending
                .iter()
                .map(|d| (d.program, d.mode, d.depth))
                .collect();
            for (program, mode, depth) in used_pipelines {
                self.ensure_pipeline(program, mode, depth);
            }
        }

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(error) => {
                // Swapchain loss is transient (resize, minimize); skip this
                // frame and let the next one reconfigure.
                log::error!("surface unavailable, skipping frame: {error}");
                self.arena.clear();
                self.pending.clear();
                return;
            }
        };
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_depth_size();

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut current_pipeline: Option<(usize, DrawMode, bool)> = None;
            let mut current_buffer: Option<usize> = None;
            for draw in &self.pending {
                let prog = &self.programs[draw.program];
                let key = (draw.program, draw.mode, draw.depth);
                if current_pipeline != Some(key) {
                    pass.set_pipeline(&prog.pipelines[&(draw.mode, draw.depth)]);
                    current_pipeline = Some(key);
                }

                let (_, bind_group) = prog.bind_group.as_ref().expect("ensured above");
                pass.set_bind_group(0, bind_group, &[draw.uniform_offset as u32]);

                if prog.uses_atlas {
                    let Some(texture) = draw.texture else {
                        log::error!(
                            "program '{}' samples an atlas but none is bound; draw skipped",
                            prog.name
                        );
                        continue;
                    };
                    pass.set_bind_group(1, &self.textures[texture].bind_group, &[]);
                }

                if current_buffer != Some(draw.buffer) {
                    let Some(Some(slot)) = self.buffers.get(draw.buffer) else {
                        log::error!("draw references deleted vertex buffer; skipped");
                        continue;
                    };
                    pass.set_vertex_buffer(0, slot.buffer.slice(..));
                    current_buffer = Some(draw.buffer);
                }

                pass.draw(
                    draw.first_vertex..draw.first_vertex + draw.vertex_count,
                    0..1,
                );
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.arena.clear();
        self.pending.clear();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.ensure_depth_size();
    }
}

fn topology(mode: DrawMode) -> wgpu::PrimitiveTopology {
    match mode {
        DrawMode::Points => wgpu::PrimitiveTopology::PointList,
        DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
        DrawMode::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
        DrawMode::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: gpu.width(),
            height: gpu.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
