//! Graphics device interface for the vista renderer.
//!
//! The renderer never talks to a GPU API directly. It drives a
//! [`GraphicsDevice`], an immediate-mode surface exposing pipeline state, a
//! viewport, render targets, effect permutations and indexed draws. Two
//! implementations exist: [`HeadlessDevice`] here, which records every command
//! for inspection, and the wgpu device in `vista-render-wgpu`.
//!
//! # Invariants
//! - GPU resources are owned by exactly one [`Mesh`], [`Texture`] or
//!   [`RenderTarget`]; dropping the owner queues the handle for release.
//! - Queued handles are freed by [`GraphicsDevice::collect_released`].
//! - The same [`EffectKey`] always maps to the same compiled effect.

mod device;
mod effect;
mod headless;
mod mesh;
mod resources;
mod state;

pub use device::GraphicsDevice;
pub use effect::{
    EffectKey, EffectKind, EffectParameters, LightParameters, MAX_BONES, WaterParameters,
};
pub use headless::{DeviceCommand, DrawRecord, HeadlessDevice, ParameterRecord};
pub use mesh::{MeshData, TextureData, Vertex};
pub use resources::{
    EffectId, Mesh, MeshId, ReleaseQueue, RenderTarget, RenderTargetId, ResourceId, Texture,
    TextureId,
};
pub use state::{
    BlendState, DepthStencilState, PipelineState, RasterizerState, SamplerState, Viewport,
};

pub fn crate_info() -> &'static str {
    "vista-device v0.1.0"
}
