//! wgpu backend for the vista renderer.
//!
//! [`WgpuDevice`] implements [`vista_device::GraphicsDevice`]: draws are
//! recorded per render target and encoded into wgpu render passes on
//! [`WgpuDevice::submit`]. Effect permutations share one WGSL module and are
//! specialised through per-draw uniform flags.
//!
//! # Invariants
//! - One `wgpu::RenderPipeline` exists per (effect key, blend, depth-stencil,
//!   rasterizer, target format) combination.
//! - Fragments with a negative clip-space distance to the bound clip plane are
//!   discarded.
//! - Draws that reference released meshes or targets are skipped at encode
//!   time.

mod gpu;
mod pipeline;
mod record;
mod shaders;
mod uniforms;

pub use gpu::{TARGET_FORMAT, WgpuDevice, WgpuDeviceError};
pub use pipeline::PipelineKey;
pub use shaders::EFFECT_SHADER;
pub use uniforms::DrawUniforms;

pub fn crate_info() -> &'static str {
    "vista-render-wgpu v0.1.0"
}
