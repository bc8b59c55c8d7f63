use vista_common::Color;
use vista_device::{MeshId, RenderTargetId, SamplerState, TextureId};

use crate::pipeline::PipelineKey;
use crate::uniforms::DrawUniforms;

/// Where a draw's texture slot reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    White,
    Texture(TextureId),
    Target(RenderTargetId),
}

#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub pipeline: PipelineKey,
    pub sampler: SamplerState,
    pub mesh: MeshId,
    pub uniforms: DrawUniforms,
    pub primary: TextureSource,
    pub secondary: TextureSource,
}

/// Consecutive draws into one target. `None` is the backbuffer.
#[derive(Debug, Clone)]
pub struct RecordedPass {
    pub target: Option<RenderTargetId>,
    pub clear: Option<Color>,
    pub draws: Vec<RecordedDraw>,
}

/// Turns immediate-mode target binds, clears and draws into render passes.
#[derive(Debug, Default)]
pub struct PassRecorder {
    target: Option<RenderTargetId>,
    passes: Vec<RecordedPass>,
}

impl PassRecorder {
    pub fn target(&self) -> Option<RenderTargetId> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<RenderTargetId>) {
        self.target = target;
    }

    /// A clear after draws into the same target starts a new pass.
    pub fn clear(&mut self, color: Color) {
        let target = self.target;
        let pass = self.current();
        if pass.draws.is_empty() {
            pass.clear = Some(color);
        } else {
            self.passes.push(RecordedPass {
                target,
                clear: Some(color),
                draws: Vec::new(),
            });
        }
    }

    pub fn draw(&mut self, draw: RecordedDraw) {
        self.current().draws.push(draw);
    }

    pub fn passes(&self) -> &[RecordedPass] {
        &self.passes
    }

    pub fn draw_count(&self) -> usize {
        self.passes.iter().map(|p| p.draws.len()).sum()
    }

    pub fn take(&mut self) -> Vec<RecordedPass> {
        std::mem::take(&mut self.passes)
    }

    fn current(&mut self) -> &mut RecordedPass {
        let target = self.target;
        if self.passes.last().is_none_or(|p| p.target != target) {
            self.passes.push(RecordedPass {
                target,
                clear: None,
                draws: Vec::new(),
            });
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }
}
