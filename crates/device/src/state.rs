use serde::{Deserialize, Serialize};

/// How fragment output combines with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendState {
    #[default]
    Opaque,
    AlphaBlend,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthStencilState {
    /// Depth test and write.
    #[default]
    Default,
    /// Depth test without write.
    DepthRead,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RasterizerState {
    CullNone,
    #[default]
    CullCounterClockwise,
    CullClockwise,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SamplerState {
    PointClamp,
    PointWrap,
    LinearClamp,
    #[default]
    LinearWrap,
    AnisotropicWrap,
}

/// Full fixed-function state the renderer snapshots at `Begin` and restores at `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PipelineState {
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub sampler: SamplerState,
}

/// Pixel rectangle of the bound target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 for a degenerate viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_opaque_depth_tested() {
        let s = PipelineState::default();
        assert_eq!(s.blend, BlendState::Opaque);
        assert_eq!(s.depth_stencil, DepthStencilState::Default);
    }

    #[test]
    fn degenerate_viewport_aspect_is_one() {
        assert!(Viewport::new(640, 0).is_degenerate());
        assert_eq!(Viewport::new(640, 0).aspect_ratio(), 1.0);
        assert_eq!(Viewport::new(200, 100).aspect_ratio(), 2.0);
    }
}
