use std::collections::{BTreeMap, HashMap};

use glam::{Mat4, Vec4};
use vista_common::Color;

use crate::device::GraphicsDevice;
use crate::effect::{EffectKey, EffectParameters, LightParameters, WaterParameters};
use crate::mesh::{MeshData, TextureData};
use crate::resources::{
    EffectId, MeshId, ReleaseQueue, RenderTargetId, ResourceId, TextureId,
};
use crate::state::{PipelineState, Viewport};

/// Owned copy of the parameters last uploaded to an effect.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub world: Mat4,
    pub world_view_projection: Mat4,
    pub diffuse_color: Color,
    pub texture: Option<TextureId>,
    pub bones: Vec<Mat4>,
    pub clip_plane: Option<Vec4>,
    pub water: Option<WaterParameters>,
}

impl From<&EffectParameters<'_>> for ParameterRecord {
    fn from(p: &EffectParameters<'_>) -> Self {
        Self {
            world: p.world,
            world_view_projection: p.world_view_projection,
            diffuse_color: p.diffuse_color,
            texture: p.texture,
            bones: p.bones.to_vec(),
            clip_plane: p.clip_plane,
            water: p.water,
        }
    }
}

/// One draw call with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub effect: EffectId,
    pub key: EffectKey,
    pub mesh: MeshId,
    pub target: Option<RenderTargetId>,
    pub state: PipelineState,
    pub parameters: Option<ParameterRecord>,
    pub light: Option<LightParameters>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    SetPipelineState(PipelineState),
    SetRenderTarget(Option<RenderTargetId>),
    Clear {
        target: Option<RenderTargetId>,
        color: Color,
    },
    CreateMesh {
        id: MeshId,
        vertices: u32,
        primitives: u32,
    },
    CreateTexture {
        id: TextureId,
        width: u32,
        height: u32,
    },
    CreateRenderTarget {
        id: RenderTargetId,
        width: u32,
        height: u32,
    },
    Release(ResourceId),
    CompileEffect {
        id: EffectId,
        key: EffectKey,
    },
    SetParameters {
        effect: EffectId,
        parameters: ParameterRecord,
    },
    SetLight {
        effect: EffectId,
        light: LightParameters,
    },
    Draw(DrawRecord),
}

/// Device without a GPU: tracks state and resources and records every command.
///
/// Used by tests and the command-line frame simulator to observe exactly what
/// the renderer asked for.
#[derive(Debug)]
pub struct HeadlessDevice {
    backbuffer: Viewport,
    target: Option<RenderTargetId>,
    state: PipelineState,
    releaser: ReleaseQueue,
    next_id: u32,
    meshes: BTreeMap<MeshId, (u32, u32)>,
    textures: BTreeMap<TextureId, (u32, u32)>,
    render_targets: BTreeMap<RenderTargetId, (u32, u32)>,
    effects: BTreeMap<EffectId, EffectKey>,
    bound_parameters: HashMap<EffectId, ParameterRecord>,
    bound_light: HashMap<EffectId, LightParameters>,
    commands: Vec<DeviceCommand>,
}

impl HeadlessDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            backbuffer: Viewport::new(width, height),
            target: None,
            state: PipelineState::default(),
            releaser: ReleaseQueue::new(),
            next_id: 1,
            meshes: BTreeMap::new(),
            textures: BTreeMap::new(),
            render_targets: BTreeMap::new(),
            effects: BTreeMap::new(),
            bound_parameters: HashMap::new(),
            bound_light: HashMap::new(),
            commands: Vec::new(),
        }
    }

    /// Resize the backbuffer, e.g. when the host window is minimized.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.backbuffer = Viewport::new(width, height);
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drain the command log.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> {
        self.commands.iter().filter_map(|c| match c {
            DeviceCommand::Draw(d) => Some(d),
            _ => None,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    pub fn compile_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::CompileEffect { .. }))
            .count()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_render_targets(&self) -> usize {
        self.render_targets.len()
    }

    pub fn render_target_size(&self, id: RenderTargetId) -> Option<(u32, u32)> {
        self.render_targets.get(&id).copied()
    }

    pub fn effect_key(&self, id: EffectId) -> Option<EffectKey> {
        self.effects.get(&id).copied()
    }

    /// One-line description of the recorded log.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "HeadlessDevice {}x{}: commands={} draws={} effects={} meshes={} textures={} targets={}",
            self.backbuffer.width,
            self.backbuffer.height,
            self.commands.len(),
            self.draw_count(),
            self.effects.len(),
            self.meshes.len(),
            self.textures.len(),
            self.render_targets.len(),
        ));
        out
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn viewport(&self) -> Viewport {
        match self.target.and_then(|t| self.render_targets.get(&t)) {
            Some(&(width, height)) => Viewport::new(width, height),
            None => self.backbuffer,
        }
    }

    fn pipeline_state(&self) -> PipelineState {
        self.state
    }

    fn set_pipeline_state(&mut self, state: PipelineState) {
        self.state = state;
        self.commands.push(DeviceCommand::SetPipelineState(state));
    }

    fn release_queue(&self) -> ReleaseQueue {
        self.releaser.clone()
    }

    fn collect_released(&mut self) -> usize {
        let released = self.releaser.drain();
        for id in &released {
            match id {
                ResourceId::Mesh(m) => {
                    self.meshes.remove(m);
                }
                ResourceId::Texture(t) => {
                    self.textures.remove(t);
                }
                ResourceId::RenderTarget(r) => {
                    self.render_targets.remove(r);
                }
            }
            self.commands.push(DeviceCommand::Release(*id));
        }
        released.len()
    }

    fn create_mesh(&mut self, data: &MeshData) -> MeshId {
        let id = MeshId(self.allocate());
        let (vertices, primitives) = (data.vertex_count(), data.primitive_count());
        self.meshes.insert(id, (vertices, primitives));
        self.commands.push(DeviceCommand::CreateMesh {
            id,
            vertices,
            primitives,
        });
        id
    }

    fn create_texture(&mut self, data: &TextureData) -> TextureId {
        let id = TextureId(self.allocate());
        self.textures.insert(id, (data.width, data.height));
        self.commands.push(DeviceCommand::CreateTexture {
            id,
            width: data.width,
            height: data.height,
        });
        id
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> RenderTargetId {
        let id = RenderTargetId(self.allocate());
        self.render_targets.insert(id, (width, height));
        self.commands.push(DeviceCommand::CreateRenderTarget { id, width, height });
        id
    }

    fn set_render_target(&mut self, target: Option<RenderTargetId>) {
        self.target = target;
        self.commands.push(DeviceCommand::SetRenderTarget(target));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DeviceCommand::Clear {
            target: self.target,
            color,
        });
    }

    fn compile_effect(&mut self, key: EffectKey) -> EffectId {
        let id = EffectId(self.allocate());
        self.effects.insert(id, key);
        self.commands.push(DeviceCommand::CompileEffect { id, key });
        id
    }

    fn set_effect_parameters(&mut self, effect: EffectId, params: &EffectParameters<'_>) {
        let parameters = ParameterRecord::from(params);
        self.bound_parameters.insert(effect, parameters.clone());
        self.bound_light.remove(&effect);
        self.commands
            .push(DeviceCommand::SetParameters { effect, parameters });
    }

    fn set_light_parameters(&mut self, effect: EffectId, light: &LightParameters) {
        self.bound_light.insert(effect, *light);
        self.commands.push(DeviceCommand::SetLight {
            effect,
            light: *light,
        });
    }

    fn draw_indexed_primitives(&mut self, effect: EffectId, mesh: MeshId) {
        if !self.meshes.contains_key(&mesh) {
            tracing::warn!(mesh = mesh.0, "draw with released mesh");
        }
        let key = self
            .effects
            .get(&effect)
            .copied()
            .unwrap_or_else(EffectKey::basic);
        let record = DrawRecord {
            effect,
            key,
            mesh,
            target: self.target,
            state: self.state,
            parameters: self.bound_parameters.get(&effect).cloned(),
            light: self.bound_light.get(&effect).copied(),
        };
        self.commands.push(DeviceCommand::Draw(record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BlendState;

    #[test]
    fn viewport_follows_bound_target() {
        let mut device = HeadlessDevice::new(800, 600);
        let rt = device.create_render_target(320, 180);
        device.set_render_target(Some(rt));
        assert_eq!(device.viewport(), Viewport::new(320, 180));
        device.set_render_target(None);
        assert_eq!(device.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn draw_records_state_and_light() {
        let mut device = HeadlessDevice::new(4, 4);
        let mesh = device.create_mesh(&MeshData::quad());
        let effect = device.compile_effect(EffectKey::basic());
        device.set_effect_parameters(effect, &EffectParameters::new(Mat4::IDENTITY, Mat4::IDENTITY));
        device.set_blend_state(BlendState::Additive);
        let light = LightParameters {
            direction: glam::Vec3::NEG_Y,
            color: Color::WHITE,
            position: None,
            range: 0.0,
        };
        device.set_light_parameters(effect, &light);
        device.draw_indexed_primitives(effect, mesh);

        let draw = device.draws().next().unwrap();
        assert_eq!(draw.state.blend, BlendState::Additive);
        assert_eq!(draw.light, Some(light));
        assert_eq!(draw.mesh, mesh);
        assert!(draw.parameters.is_some());
    }

    #[test]
    fn new_parameters_unbind_previous_light() {
        let mut device = HeadlessDevice::new(4, 4);
        let mesh = device.create_mesh(&MeshData::quad());
        let effect = device.compile_effect(EffectKey::basic());
        let light = LightParameters {
            direction: glam::Vec3::NEG_Y,
            color: Color::WHITE,
            position: None,
            range: 0.0,
        };
        device.set_light_parameters(effect, &light);
        device.set_effect_parameters(effect, &EffectParameters::new(Mat4::IDENTITY, Mat4::IDENTITY));
        device.draw_indexed_primitives(effect, mesh);
        assert_eq!(device.draws().next().unwrap().light, None);
    }

    #[test]
    fn summary_reports_counts() {
        let mut device = HeadlessDevice::new(16, 9);
        device.create_mesh(&MeshData::cube(1.0));
        let s = device.summary();
        assert!(s.contains("16x9"));
        assert!(s.contains("meshes=1"));
    }
}
