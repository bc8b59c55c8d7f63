use std::collections::HashMap;
use std::num::NonZeroU64;

use vista_common::Color;
use vista_device::{
    EffectId, EffectKey, EffectParameters, GraphicsDevice, LightParameters, MeshData, MeshId,
    PipelineState, ReleaseQueue, RenderTargetId, ResourceId, SamplerState, TextureData,
    TextureId, Vertex, Viewport,
};
use wgpu::util::DeviceExt;

use crate::pipeline::{
    DEPTH_FORMAT, PipelineKey, blend_state, depth_stencil_state, primitive_state,
    sampler_descriptor,
};
use crate::record::{PassRecorder, RecordedDraw, RecordedPass, TextureSource};
use crate::shaders;
use crate::uniforms::{DrawUniforms, uniform_stride};

/// Color format of the backbuffer and every offscreen target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug, thiserror::Error)]
pub enum WgpuDeviceError {
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("backbuffer readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
    #[error("backbuffer readback was cancelled")]
    ReadbackCancelled,
}

/// Color + depth attachment pair.
struct GpuTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            color_view: color.create_view(&Default::default()),
            depth_view: depth.create_view(&Default::default()),
            color,
            width,
            height,
        }
    }
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Last parameters uploaded to an effect.
struct BoundEffect {
    uniforms: DrawUniforms,
    primary: TextureSource,
    secondary: TextureSource,
}

struct Layouts {
    uniforms: wgpu::BindGroupLayout,
    textures: wgpu::BindGroupLayout,
    pipeline: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniforms_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("surface_textures_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("effect_pipeline_layout"),
            bind_group_layouts: &[&uniforms, &textures],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("effect_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::EFFECT_SHADER.into()),
        });

        Self {
            uniforms,
            textures,
            pipeline,
            shader,
        }
    }
}

/// [`GraphicsDevice`] backed by wgpu.
///
/// Draw calls are recorded per target and encoded into real render passes by
/// [`WgpuDevice::submit`]. Each effect permutation and fixed-function state
/// combination maps to one cached `wgpu::RenderPipeline`. The backbuffer is
/// an offscreen texture, so the device runs without a window.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layouts: Layouts,
    line_mode: bool,
    uniform_alignment: u32,
    backbuffer: GpuTarget,
    white: GpuTexture,
    state: PipelineState,
    releaser: ReleaseQueue,
    next_id: u32,
    meshes: HashMap<MeshId, GpuMesh>,
    textures: HashMap<TextureId, GpuTexture>,
    targets: HashMap<RenderTargetId, GpuTarget>,
    effects: HashMap<EffectId, EffectKey>,
    bound: HashMap<EffectId, BoundEffect>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    samplers: HashMap<SamplerState, wgpu::Sampler>,
    recorder: PassRecorder,
}

impl WgpuDevice {
    /// Request an adapter without a surface and build a device around an
    /// offscreen backbuffer of `width` x `height`.
    pub fn new_headless(width: u32, height: u32) -> Result<Self, WgpuDeviceError> {
        pollster::block_on(Self::request(width, height))
    }

    async fn request(width: u32, height: u32) -> Result<Self, WgpuDeviceError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or(WgpuDeviceError::NoAdapter)?;

        let line_mode = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("vista_device"),
                    required_features,
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;
        tracing::info!(adapter = %adapter.get_info().name, line_mode, "wgpu device ready");
        Ok(Self::from_device(device, queue, width, height, line_mode))
    }

    /// Wrap an existing device, e.g. one shared with a windowing layer.
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        width: u32,
        height: u32,
        line_mode: bool,
    ) -> Self {
        let layouts = Layouts::new(&device);
        let backbuffer = GpuTarget::new(&device, width, height, "backbuffer");
        let white = upload_texture(&device, &queue, &TextureData::solid(1, 1, [255; 4]));
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment;
        Self {
            device,
            queue,
            layouts,
            line_mode,
            uniform_alignment,
            backbuffer,
            white,
            state: PipelineState::default(),
            releaser: ReleaseQueue::new(),
            next_id: 1,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            targets: HashMap::new(),
            effects: HashMap::new(),
            bound: HashMap::new(),
            pipelines: HashMap::new(),
            samplers: HashMap::new(),
            recorder: PassRecorder::default(),
        }
    }

    pub fn backbuffer_size(&self) -> (u32, u32) {
        (self.backbuffer.width, self.backbuffer.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backbuffer = GpuTarget::new(&self.device, width, height, "backbuffer");
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Draws recorded since the last submit.
    pub fn pending_draws(&self) -> usize {
        self.recorder.draw_count()
    }

    /// Encode every recorded pass and submit it to the queue. Returns the
    /// number of draws encoded.
    pub fn submit(&mut self) -> usize {
        let passes = self.recorder.take();
        if passes.is_empty() {
            return 0;
        }
        for draw in passes.iter().flat_map(|p| &p.draws) {
            self.ensure_pipeline(draw.pipeline);
            self.ensure_sampler(draw.sampler);
        }

        let stride = uniform_stride(self.uniform_alignment);
        let draw_count: usize = passes.iter().map(|p| p.draws.len()).sum();
        let mut bytes = vec![0u8; draw_count.max(1) * stride];
        for (slot, draw) in bytes
            .chunks_exact_mut(stride)
            .zip(passes.iter().flat_map(|p| &p.draws))
        {
            let data = bytemuck::bytes_of(&draw.uniforms);
            slot[..data.len()].copy_from_slice(data);
        }
        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("draw_uniforms"),
                contents: &bytes,
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let uniform_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_uniforms_group"),
            layout: &self.layouts.uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        let mut slot = 0usize;
        let mut encoded = 0usize;
        for pass in &passes {
            let first_slot = slot;
            slot += pass.draws.len();
            encoded += self.encode_pass(&mut encoder, pass, &uniform_group, first_slot, stride);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        tracing::debug!(passes = passes.len(), draws = encoded, "frame submitted");
        encoded
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: &RecordedPass,
        uniform_group: &wgpu::BindGroup,
        first_slot: usize,
        stride: usize,
    ) -> usize {
        let target = match pass.target {
            Some(id) => match self.targets.get(&id) {
                Some(t) => t,
                None => {
                    tracing::warn!(render_target = id.0, "pass into released render target skipped");
                    return 0;
                }
            },
            None => &self.backbuffer,
        };
        let (color_load, depth_load) = match pass.clear {
            Some(c) => (
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: c.r as f64,
                    g: c.g as f64,
                    b: c.b as f64,
                    a: c.a as f64,
                }),
                wgpu::LoadOp::Clear(1.0),
            ),
            None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };

        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vista_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        let mut encoded = 0;
        for (i, draw) in pass.draws.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&draw.mesh) else {
                tracing::trace!(mesh = draw.mesh.0, "draw of released mesh skipped");
                continue;
            };
            let (Some(pipeline), Some(sampler)) = (
                self.pipelines.get(&draw.pipeline),
                self.samplers.get(&draw.sampler),
            ) else {
                continue;
            };
            if mesh.index_count == 0 {
                continue;
            }
            let textures = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("surface_textures"),
                layout: &self.layouts.textures,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(self.view(draw.primary)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(self.view(draw.secondary)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });
            let offset = ((first_slot + i) * stride) as u32;
            rp.set_pipeline(pipeline);
            rp.set_bind_group(0, uniform_group, &[offset]);
            rp.set_bind_group(1, &textures, &[]);
            rp.set_vertex_buffer(0, mesh.vertices.slice(..));
            rp.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            rp.draw_indexed(0..mesh.index_count, 0, 0..1);
            encoded += 1;
        }
        encoded
    }

    fn view(&self, source: TextureSource) -> &wgpu::TextureView {
        match source {
            TextureSource::Texture(id) => self.textures.get(&id).map(|t| &t.view),
            TextureSource::Target(id) => self.targets.get(&id).map(|t| &t.color_view),
            TextureSource::White => None,
        }
        .unwrap_or(&self.white.view)
    }

    fn ensure_sampler(&mut self, state: SamplerState) {
        if self.samplers.contains_key(&state) {
            return;
        }
        let sampler = self.device.create_sampler(&sampler_descriptor(state));
        self.samplers.insert(state, sampler);
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        tracing::debug!(?key, "creating render pipeline");
        let shader = &self.layouts.shader;
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("effect_pipeline"),
                layout: Some(&self.layouts.pipeline),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some(shaders::VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                            3 => Uint32x4,
                            4 => Float32x4,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some(shaders::FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: key.format,
                        blend: Some(blend_state(key.blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: primitive_state(key.rasterizer, self.line_mode),
                depth_stencil: Some(depth_stencil_state(key.depth_stencil)),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
        self.pipelines.insert(key, pipeline);
    }

    /// Copy the backbuffer to host memory as tightly packed RGBA8 rows.
    pub fn read_backbuffer(&self) -> Result<Vec<[u8; 4]>, WgpuDeviceError> {
        let (width, height) = (self.backbuffer.width.max(1), self.backbuffer.height.max(1));
        let unpadded = width * 4;
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backbuffer_readback"),
            size: (padded * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.backbuffer.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| WgpuDeviceError::ReadbackCancelled)??;

        let mut pixels = Vec::with_capacity((width * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded as usize) {
                pixels.extend(
                    bytemuck::cast_slice::<u8, [u8; 4]>(&row[..unpadded as usize])
                        .iter()
                        .copied(),
                );
            }
        }
        buffer.unmap();
        Ok(pixels)
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> GpuTexture {
    let (width, height) = (data.width.max(1), data.height.max(1));
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface_texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    if data.pixels.len() == (width * height) as usize {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&data.pixels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
    } else {
        tracing::warn!(
            width = data.width,
            height = data.height,
            pixels = data.pixels.len(),
            "texture data does not match its size, left uninitialized"
        );
    }
    GpuTexture {
        view: texture.create_view(&Default::default()),
        _texture: texture,
    }
}

impl GraphicsDevice for WgpuDevice {
    fn viewport(&self) -> Viewport {
        match self
            .recorder
            .target()
            .and_then(|t| self.targets.get(&t))
        {
            Some(t) => Viewport::new(t.width, t.height),
            None => Viewport::new(self.backbuffer.width, self.backbuffer.height),
        }
    }

    fn pipeline_state(&self) -> PipelineState {
        self.state
    }

    fn set_pipeline_state(&mut self, state: PipelineState) {
        self.state = state;
    }

    fn release_queue(&self) -> ReleaseQueue {
        self.releaser.clone()
    }

    fn collect_released(&mut self) -> usize {
        let released = self.releaser.drain();
        for id in &released {
            match id {
                ResourceId::Mesh(m) => {
                    self.meshes.remove(m);
                }
                ResourceId::Texture(t) => {
                    self.textures.remove(t);
                }
                ResourceId::RenderTarget(r) => {
                    self.targets.remove(r);
                }
            }
        }
        if !released.is_empty() {
            tracing::debug!(count = released.len(), "released gpu resources");
        }
        released.len()
    }

    fn create_mesh(&mut self, data: &MeshData) -> MeshId {
        let id = MeshId(self.allocate());
        let vertices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let indices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.meshes.insert(
            id,
            GpuMesh {
                vertices,
                indices,
                index_count: data.indices.len() as u32,
            },
        );
        id
    }

    fn create_texture(&mut self, data: &TextureData) -> TextureId {
        let id = TextureId(self.allocate());
        let texture = upload_texture(&self.device, &self.queue, data);
        self.textures.insert(id, texture);
        id
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> RenderTargetId {
        let id = RenderTargetId(self.allocate());
        let target = GpuTarget::new(&self.device, width, height, "offscreen_target");
        self.targets.insert(id, target);
        id
    }

    fn set_render_target(&mut self, target: Option<RenderTargetId>) {
        self.recorder.set_target(target);
    }

    fn clear(&mut self, color: Color) {
        self.recorder.clear(color);
    }

    fn compile_effect(&mut self, key: EffectKey) -> EffectId {
        let id = EffectId(self.allocate());
        self.effects.insert(id, key);
        id
    }

    fn set_effect_parameters(&mut self, effect: EffectId, params: &EffectParameters<'_>) {
        let key = self
            .effects
            .get(&effect)
            .copied()
            .unwrap_or_else(EffectKey::basic);
        let (primary, secondary) = match params.water {
            Some(w) => (
                TextureSource::Target(w.refraction),
                TextureSource::Target(w.reflection),
            ),
            None => (
                params
                    .texture
                    .map_or(TextureSource::White, TextureSource::Texture),
                TextureSource::White,
            ),
        };
        self.bound.insert(
            effect,
            BoundEffect {
                uniforms: DrawUniforms::new(&key, params),
                primary,
                secondary,
            },
        );
    }

    fn set_light_parameters(&mut self, effect: EffectId, light: &LightParameters) {
        if let Some(bound) = self.bound.get_mut(&effect) {
            bound.uniforms.set_light(light);
        }
    }

    fn draw_indexed_primitives(&mut self, effect: EffectId, mesh: MeshId) {
        let Some(key) = self.effects.get(&effect).copied() else {
            tracing::warn!(effect = effect.0, "draw with unknown effect skipped");
            return;
        };
        let Some(bound) = self.bound.get(&effect) else {
            tracing::warn!(effect = effect.0, "draw without parameters skipped");
            return;
        };
        let draw = RecordedDraw {
            pipeline: PipelineKey {
                effect: key,
                blend: self.state.blend,
                depth_stencil: self.state.depth_stencil,
                rasterizer: self.state.rasterizer,
                format: TARGET_FORMAT,
            },
            sampler: self.state.sampler,
            mesh,
            uniforms: bound.uniforms,
            primary: bound.primary,
            secondary: bound.secondary,
        };
        self.recorder.draw(draw);
    }
}
