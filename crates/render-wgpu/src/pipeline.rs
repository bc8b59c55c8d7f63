use vista_device::{BlendState, DepthStencilState, EffectKey, RasterizerState, SamplerState};

/// Depth attachment format of every target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Everything that selects a distinct `wgpu::RenderPipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub effect: EffectKey,
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub format: wgpu::TextureFormat,
}

pub fn blend_state(blend: BlendState) -> wgpu::BlendState {
    match blend {
        BlendState::Opaque => wgpu::BlendState::REPLACE,
        BlendState::AlphaBlend => wgpu::BlendState::ALPHA_BLENDING,
        BlendState::Additive => {
            let add = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: add,
                alpha: add,
            }
        }
    }
}

pub fn depth_stencil_state(state: DepthStencilState) -> wgpu::DepthStencilState {
    let (depth_write_enabled, depth_compare) = match state {
        DepthStencilState::Default => (true, wgpu::CompareFunction::Less),
        DepthStencilState::DepthRead => (false, wgpu::CompareFunction::LessEqual),
        DepthStencilState::None => (false, wgpu::CompareFunction::Always),
    };
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

/// Rasterizer state names the winding that gets culled. Wireframe falls back
/// to filled polygons when the adapter lacks line mode.
pub fn primitive_state(state: RasterizerState, line_mode: bool) -> wgpu::PrimitiveState {
    let (front_face, cull_mode, polygon_mode) = match state {
        RasterizerState::CullNone => (wgpu::FrontFace::Ccw, None, wgpu::PolygonMode::Fill),
        RasterizerState::CullCounterClockwise => (
            wgpu::FrontFace::Cw,
            Some(wgpu::Face::Back),
            wgpu::PolygonMode::Fill,
        ),
        RasterizerState::CullClockwise => (
            wgpu::FrontFace::Ccw,
            Some(wgpu::Face::Back),
            wgpu::PolygonMode::Fill,
        ),
        RasterizerState::Wireframe if line_mode => {
            (wgpu::FrontFace::Ccw, None, wgpu::PolygonMode::Line)
        }
        RasterizerState::Wireframe => (wgpu::FrontFace::Ccw, None, wgpu::PolygonMode::Fill),
    };
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face,
        cull_mode,
        polygon_mode,
        ..Default::default()
    }
}

pub fn sampler_descriptor(state: SamplerState) -> wgpu::SamplerDescriptor<'static> {
    let (filter, address_mode, anisotropy_clamp) = match state {
        SamplerState::PointClamp => (
            wgpu::FilterMode::Nearest,
            wgpu::AddressMode::ClampToEdge,
            1,
        ),
        SamplerState::PointWrap => (wgpu::FilterMode::Nearest, wgpu::AddressMode::Repeat, 1),
        SamplerState::LinearClamp => (
            wgpu::FilterMode::Linear,
            wgpu::AddressMode::ClampToEdge,
            1,
        ),
        SamplerState::LinearWrap => (wgpu::FilterMode::Linear, wgpu::AddressMode::Repeat, 1),
        SamplerState::AnisotropicWrap => (wgpu::FilterMode::Linear, wgpu::AddressMode::Repeat, 16),
    };
    wgpu::SamplerDescriptor {
        label: Some("vista_sampler"),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: filter,
        anisotropy_clamp,
        ..Default::default()
    }
}
