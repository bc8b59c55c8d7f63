use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use vista_common::Color;

use crate::resources::{RenderTargetId, TextureId};

/// Largest bone palette a skinned permutation accepts.
pub const MAX_BONES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    Basic,
    Skybox,
    Water,
}

/// Shader permutation. Equal keys share one compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectKey {
    pub kind: EffectKind,
    pub clip_plane: bool,
    pub texture: bool,
    pub lit: bool,
    pub bone_count: u16,
}

impl EffectKey {
    pub fn basic() -> Self {
        Self {
            kind: EffectKind::Basic,
            clip_plane: false,
            texture: false,
            lit: false,
            bone_count: 0,
        }
    }

    pub fn with_kind(kind: EffectKind) -> Self {
        Self {
            kind,
            ..Self::basic()
        }
    }

    pub fn is_skinned(&self) -> bool {
        self.bone_count > 0
    }
}

/// Per-light inputs for one draw of a lit permutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightParameters {
    /// Direction the light travels, normalized.
    pub direction: Vec3,
    pub color: Color,
    /// Set for point lights; the shader derives direction per fragment.
    pub position: Option<Vec3>,
    pub range: f32,
}

/// Inputs of the water composite permutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterParameters {
    pub reflection: RenderTargetId,
    pub refraction: RenderTargetId,
    /// View-projection of the mirrored camera, used to project reflection lookups.
    pub reflection_view_projection: Mat4,
    pub wave_offset: Vec2,
    pub tint: Color,
}

/// Per-draw parameters uploaded before one or more draw calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters<'a> {
    pub world: Mat4,
    pub world_view_projection: Mat4,
    pub world_inverse_transpose: Mat4,
    pub diffuse_color: Color,
    pub texture: Option<TextureId>,
    pub bones: &'a [Mat4],
    /// Clip-space plane coefficients; fragments with a negative distance are discarded.
    pub clip_plane: Option<Vec4>,
    pub water: Option<WaterParameters>,
}

impl<'a> EffectParameters<'a> {
    /// Parameters for drawing with `world` under `view_projection`.
    pub fn new(world: Mat4, view_projection: Mat4) -> Self {
        Self {
            world,
            world_view_projection: view_projection * world,
            world_inverse_transpose: world.inverse().transpose(),
            diffuse_color: Color::WHITE,
            texture: None,
            bones: &[],
            clip_plane: None,
            water: None,
        }
    }
}
