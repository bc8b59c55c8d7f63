//! Forward renderer for vista scenes.
//!
//! Drives a [`vista_device::GraphicsDevice`] through `begin`, `draw_scene` and
//! `end`. A frame with water renders three passes: refraction into an
//! offscreen target with a below-water clip plane, reflection from the
//! mirrored camera with an above-water clip plane, and the main pass. The
//! water surface is composited last from the two captured targets.
//!
//! # Invariants
//! - Absolute transforms are recomputed once per `draw_scene`, before any cull
//!   or bone read.
//! - A mesh part is culled against the bounds transformed by the exact world
//!   matrix its draw would use.
//! - Skinned parts draw with an identity node transform; their bone palette
//!   already contains the node hierarchy.
//! - Water clip planes sit `clip_epsilon` above (refraction) and below
//!   (reflection) the surface and have opposite coefficient signs.

mod config;
mod context;
mod effects;
mod renderer;
mod skinning;
mod water;

pub use config::{RenderError, RendererConfig};
pub use context::{RenderContext, RenderStatistics, WorldScope};
pub use effects::EffectCache;
pub use renderer::{ForwardRenderer, Frame, Pass};
pub use skinning::{compute_bone_transforms, compute_bone_transforms_into};
pub use water::{WaterRenderer, water_clip_plane};

pub fn crate_info() -> &'static str {
    "vista-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
