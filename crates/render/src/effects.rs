use std::collections::HashMap;

use vista_device::{EffectId, EffectKey, GraphicsDevice};

/// Compiled effects by permutation. A key is compiled at most once.
#[derive(Debug, Default)]
pub struct EffectCache {
    effects: HashMap<EffectKey, EffectId>,
}

impl EffectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        key: EffectKey,
    ) -> EffectId {
        *self.effects.entry(key).or_insert_with(|| {
            tracing::debug!(?key, "compiling effect permutation");
            device.compile_effect(key)
        })
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
