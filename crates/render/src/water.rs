use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};
use vista_common::{BoundingVolume, Color, Plane};
use vista_device::{
    EffectKey, EffectKind, EffectParameters, GraphicsDevice, Mesh, MeshData, RenderTarget,
    WaterParameters,
};
use vista_scene::WaterTile;

use crate::config::RendererConfig;
use crate::context::RenderContext;
use crate::effects::EffectCache;

/// World-space plane at `height` along `normal` that removes the half-space
/// `normal` points into. With `clip_side` the coefficients are negated and the
/// other half-space is removed instead.
pub fn water_clip_plane(height: f32, normal: Vec3, clip_side: bool) -> Plane {
    let normal = normal.normalize_or_zero();
    let plane = Plane::new(-normal, height);
    if clip_side { plane.negated() } else { plane }
}

/// Offscreen targets and animation state for planar water.
///
/// Both targets are allocated once, at their configured sizes, independent of
/// the backbuffer.
#[derive(Debug)]
pub struct WaterRenderer {
    refraction: RenderTarget,
    reflection: RenderTarget,
    quad: Mesh,
    epsilon: f32,
    wave_velocity: Vec2,
    wave_offset: Vec2,
    tint: Color,
    reflection_view_projection: Mat4,
}

impl WaterRenderer {
    pub fn new<D: GraphicsDevice + ?Sized>(device: &mut D, config: &RendererConfig) -> Self {
        let refraction = RenderTarget::create(
            device,
            config.refraction_size.x,
            config.refraction_size.y,
        );
        let reflection = RenderTarget::create(
            device,
            config.reflection_size.x,
            config.reflection_size.y,
        );
        Self {
            refraction,
            reflection,
            quad: Mesh::upload(device, &MeshData::quad()),
            epsilon: config.clip_epsilon,
            wave_velocity: config.wave_velocity,
            wave_offset: Vec2::ZERO,
            tint: config.water_tint,
            reflection_view_projection: Mat4::IDENTITY,
        }
    }

    pub fn refraction_target(&self) -> &RenderTarget {
        &self.refraction
    }

    pub fn reflection_target(&self) -> &RenderTarget {
        &self.reflection
    }

    /// Keeps everything at or below `height + ε`.
    pub fn refraction_plane(&self, height: f32) -> Plane {
        water_clip_plane(height + self.epsilon, Vec3::Y, false)
    }

    /// Keeps everything at or above `height - ε`.
    pub fn reflection_plane(&self, height: f32) -> Plane {
        water_clip_plane(height - self.epsilon, Vec3::Y, true)
    }

    /// Scroll the wave texture. The offset wraps into `[0, 1)`.
    pub fn advance(&mut self, elapsed: Duration) {
        let step = self.wave_velocity * elapsed.as_secs_f32();
        self.wave_offset = (self.wave_offset + step).rem_euclid(Vec2::ONE);
    }

    pub fn wave_offset(&self) -> Vec2 {
        self.wave_offset
    }

    /// Remember the mirrored camera used by this frame's reflection pass.
    pub fn set_reflection_view_projection(&mut self, view_projection: Mat4) {
        self.reflection_view_projection = view_projection;
    }

    pub fn parameters(&self) -> WaterParameters {
        WaterParameters {
            reflection: self.reflection.id(),
            refraction: self.refraction.id(),
            reflection_view_projection: self.reflection_view_projection,
            wave_offset: self.wave_offset,
            tint: self.tint,
        }
    }

    /// Draw every water tile into the currently bound target using this
    /// frame's captured targets.
    pub fn composite<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        context: &mut RenderContext,
        effects: &mut EffectCache,
        tiles: &[WaterTile],
    ) {
        let effect = effects.get_or_compile(device, EffectKey::with_kind(EffectKind::Water));
        let water = self.parameters();
        for tile in tiles {
            if context.cull(&BoundingVolume::Box(tile.bounds())) {
                continue;
            }
            let mut params = EffectParameters::new(tile.world(), context.view_projection());
            params.diffuse_color = self.tint;
            params.water = Some(water);
            device.set_effect_parameters(effect, &params);
            device.draw_indexed_primitives(effect, self.quad.id());
            context.statistics.draw_calls += 1;
            context.statistics.meshes_drawn += 1;
        }
    }
}
