use vista_common::Color;

use crate::effect::{EffectKey, EffectParameters, LightParameters};
use crate::mesh::{MeshData, TextureData};
use crate::resources::{EffectId, MeshId, ReleaseQueue, RenderTargetId, TextureId};
use crate::state::{BlendState, DepthStencilState, PipelineState, Viewport};

/// Immediate-mode graphics device driven by the renderer.
///
/// Passed explicitly to every operation that touches the GPU; there is no
/// process-wide current device.
pub trait GraphicsDevice {
    /// Viewport of the currently bound target.
    fn viewport(&self) -> Viewport;

    fn pipeline_state(&self) -> PipelineState;

    fn set_pipeline_state(&mut self, state: PipelineState);

    fn set_blend_state(&mut self, blend: BlendState) {
        let mut state = self.pipeline_state();
        state.blend = blend;
        self.set_pipeline_state(state);
    }

    fn set_depth_stencil_state(&mut self, depth_stencil: DepthStencilState) {
        let mut state = self.pipeline_state();
        state.depth_stencil = depth_stencil;
        self.set_pipeline_state(state);
    }

    /// Queue shared with every resource owner created on this device.
    fn release_queue(&self) -> ReleaseQueue;

    /// Free every queued handle. Returns how many were freed.
    fn collect_released(&mut self) -> usize;

    fn create_mesh(&mut self, data: &MeshData) -> MeshId;

    fn create_texture(&mut self, data: &TextureData) -> TextureId;

    /// Offscreen color + depth target of fixed size.
    fn create_render_target(&mut self, width: u32, height: u32) -> RenderTargetId;

    /// Bind an offscreen target, or the backbuffer with `None`. The viewport
    /// follows the bound target.
    fn set_render_target(&mut self, target: Option<RenderTargetId>);

    /// Clear color and depth of the bound target.
    fn clear(&mut self, color: Color);

    /// Compile the shader program for a permutation. Callers cache the result.
    fn compile_effect(&mut self, key: EffectKey) -> EffectId;

    fn set_effect_parameters(&mut self, effect: EffectId, params: &EffectParameters<'_>);

    fn set_light_parameters(&mut self, effect: EffectId, light: &LightParameters);

    fn draw_indexed_primitives(&mut self, effect: EffectId, mesh: MeshId);
}
