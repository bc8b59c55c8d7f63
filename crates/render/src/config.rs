use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};
use vista_common::Color;
use vista_device::PipelineState;

/// Frame sequencing errors. Each one means the host loop called the renderer
/// out of order.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("begin called while a frame is already active")]
    FrameAlreadyActive,
    #[error("no active frame; call begin first")]
    FrameNotActive,
}

/// Renderer settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Size of the offscreen target holding what lies below the water.
    pub refraction_size: UVec2,
    /// Size of the offscreen target holding the mirrored view above the water.
    pub reflection_size: UVec2,
    /// Offset of each water clip plane from the surface, towards the side it keeps.
    pub clip_epsilon: f32,
    /// State applied at `begin` and restored to after additive light passes.
    pub pipeline_state: PipelineState,
    pub clear_color: Color,
    /// Wave texture scroll in UV units per second.
    pub wave_velocity: Vec2,
    pub water_tint: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            refraction_size: UVec2::new(1280, 720),
            reflection_size: UVec2::new(320, 180),
            clip_epsilon: 0.05,
            pipeline_state: PipelineState::default(),
            clear_color: Color::CORNFLOWER_BLUE,
            wave_velocity: Vec2::new(0.02, 0.01),
            water_tint: Color::rgba(0.2, 0.35, 0.45, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_are_asymmetric() {
        let config = RendererConfig::default();
        assert_eq!(config.refraction_size, UVec2::new(1280, 720));
        assert_eq!(config.reflection_size, UVec2::new(320, 180));
        assert_eq!(config.clip_epsilon, 0.05);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RendererConfig =
            serde_json::from_str(r#"{ "clip_epsilon": 0.1 }"#).unwrap();
        assert_eq!(config.clip_epsilon, 0.1);
        assert_eq!(config.reflection_size, UVec2::new(320, 180));
    }
}
