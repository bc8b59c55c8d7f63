use std::time::Duration;

use glam::{Mat3, Mat4, Vec2, Vec3};
use vista_common::{BoundingVolume, Color};
use vista_device::{
    BlendState, DepthStencilState, EffectId, EffectKey, EffectKind, EffectParameters,
    GraphicsDevice, MeshId, PipelineState, TextureId,
};
use vista_scene::{Camera, Light, NodeId, NodeKind, Scene, SceneGraph, Skybox};
use vista_terrain::Terrain;

use crate::config::{RenderError, RendererConfig};
use crate::context::{RenderContext, RenderStatistics};
use crate::effects::EffectCache;
use crate::skinning::compute_bone_transforms_into;
use crate::water::WaterRenderer;

/// The passes of one `draw_scene`, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Below the water, into the refraction target.
    Refraction,
    /// Above the water from the mirrored camera, into the reflection target.
    Reflection,
    /// Real camera into the bound backbuffer.
    Main,
}

/// Everything a single draw needs once culling has passed.
struct DrawItem {
    mesh: MeshId,
    has_normals: bool,
    world: Mat4,
    diffuse: Color,
    texture: Option<TextureId>,
    lighting_enabled: bool,
}

/// Forward renderer with planar water.
///
/// # Invariants
/// - `begin` and `end` alternate; the device pipeline state snapshotted at
///   `begin` is restored at `end`.
/// - Statistics are reset at `begin` and accumulate until the next `begin`.
/// - A lit part issues one draw per active light; lights after the first
///   blend additively and the prior blend state is restored afterwards.
/// - The scene camera is bit-identical before and after `draw_scene`.
#[derive(Debug)]
pub struct ForwardRenderer {
    config: RendererConfig,
    context: RenderContext,
    effects: EffectCache,
    water: WaterRenderer,
    saved_state: Option<PipelineState>,
    bones: Vec<Mat4>,
}

impl ForwardRenderer {
    /// Allocates the water targets on `device`.
    pub fn new<D: GraphicsDevice + ?Sized>(device: &mut D, config: RendererConfig) -> Self {
        Self {
            water: WaterRenderer::new(device, &config),
            config,
            context: RenderContext::new(),
            effects: EffectCache::new(),
            saved_state: None,
            bones: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn statistics(&self) -> RenderStatistics {
        self.context.statistics
    }

    pub fn water(&self) -> &WaterRenderer {
        &self.water
    }

    pub fn effects(&self) -> &EffectCache {
        &self.effects
    }

    pub fn is_frame_active(&self) -> bool {
        self.saved_state.is_some()
    }

    /// Advance time-driven effects (water waves).
    pub fn advance(&mut self, elapsed: Duration) {
        self.water.advance(elapsed);
    }

    /// Snapshot device state, apply the configured state and reset statistics.
    pub fn begin<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<(), RenderError> {
        if self.saved_state.is_some() {
            return Err(RenderError::FrameAlreadyActive);
        }
        let released = device.collect_released();
        self.saved_state = Some(device.pipeline_state());
        device.set_pipeline_state(self.config.pipeline_state);
        self.context.statistics = RenderStatistics::default();
        tracing::debug!(released, "frame begin");
        Ok(())
    }

    /// Restore the device state snapshotted at `begin`.
    pub fn end<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<(), RenderError> {
        let state = self.saved_state.take().ok_or(RenderError::FrameNotActive)?;
        device.set_pipeline_state(state);
        tracing::debug!(stats = %self.context.statistics, "frame end");
        Ok(())
    }

    /// Begin a frame that ends when the returned guard is dropped.
    pub fn frame<'a, D: GraphicsDevice + ?Sized>(
        &'a mut self,
        device: &'a mut D,
    ) -> Result<Frame<'a, D>, RenderError> {
        self.begin(device)?;
        Ok(Frame {
            renderer: self,
            device,
        })
    }

    /// Render `scene`: water passes for the first water tile, then the main
    /// pass, then the water composite.
    pub fn draw_scene<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        scene: &mut Scene,
    ) -> Result<(), RenderError> {
        if self.saved_state.is_none() {
            return Err(RenderError::FrameNotActive);
        }
        let _span = tracing::info_span!("draw_scene").entered();

        let viewport = device.viewport();
        if viewport.height == 0 {
            tracing::debug!(width = viewport.width, "zero-height viewport, frame skipped");
            return Ok(());
        }

        scene.graph.update_absolute_transforms(Mat4::IDENTITY);
        self.context
            .set_lights(scene.lights.iter().map(Light::parameters));

        if let Some(tile) = scene.water.first().copied() {
            let refraction = self.water.refraction_target().id();
            device.set_render_target(Some(refraction));
            device.clear(self.config.clear_color);
            self.install_camera(&scene.camera, device.viewport().aspect_ratio());
            self.context
                .set_clip_plane(Some(self.water.refraction_plane(tile.height)));
            self.render_pass(device, scene, Pass::Refraction);

            let original = scene.camera;
            scene.camera.mirror(tile.height);
            let reflection = self.water.reflection_target().id();
            device.set_render_target(Some(reflection));
            device.clear(self.config.clear_color);
            self.install_camera(&scene.camera, device.viewport().aspect_ratio());
            self.water
                .set_reflection_view_projection(self.context.view_projection());
            self.context
                .set_clip_plane(Some(self.water.reflection_plane(tile.height)));
            self.render_pass(device, scene, Pass::Reflection);
            scene.camera = original;

            device.set_render_target(None);
        }

        self.context.set_clip_plane(None);
        device.clear(self.config.clear_color);
        self.install_camera(&scene.camera, device.viewport().aspect_ratio());
        self.render_pass(device, scene, Pass::Main);

        if scene.has_water() {
            self.water
                .composite(device, &mut self.context, &mut self.effects, &scene.water);
        }
        Ok(())
    }

    fn install_camera(&mut self, camera: &Camera, aspect: f32) {
        self.context
            .set_view_projection(camera.view(), camera.projection(aspect));
    }

    fn render_pass<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        scene: &mut Scene,
        pass: Pass,
    ) {
        let _span = tracing::debug_span!("pass", kind = ?pass).entered();
        self.context.statistics.passes += 1;

        if pass != Pass::Refraction {
            if let Some(skybox) = &scene.skybox {
                self.draw_skybox(device, skybox);
            }
        }
        if let Some(terrain) = scene.terrain.as_mut() {
            self.draw_terrain(device, terrain);
        }
        self.draw_node(device, &mut scene.graph, NodeId::ROOT);
    }

    fn draw_skybox<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, skybox: &Skybox) {
        let state = device.pipeline_state();
        device.set_depth_stencil_state(DepthStencilState::DepthRead);

        let key = EffectKey {
            clip_plane: self.context.clip_plane().is_some(),
            texture: skybox.texture.is_some(),
            ..EffectKey::with_kind(EffectKind::Skybox)
        };
        let effect = self.effects.get_or_compile(device, key);
        let mut params = EffectParameters::new(
            skybox.world(self.context.eye()),
            self.context.view_projection(),
        );
        params.diffuse_color = skybox.color;
        params.texture = skybox.texture.as_ref().map(|t| t.id());
        params.clip_plane = self.context.clip_plane_coefficients();
        device.set_effect_parameters(effect, &params);
        device.draw_indexed_primitives(effect, skybox.mesh.id());
        self.context.statistics.draw_calls += 1;
        self.context.statistics.meshes_drawn += 1;

        device.set_pipeline_state(state);
    }

    fn draw_terrain<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, terrain: &mut Terrain) {
        for tile in terrain.tiles_mut() {
            let texture = tile.splat_texture(device).id();
            let (mesh, has_normals, bounds) = {
                let built = tile.mesh(device);
                (built.mesh.id(), built.mesh.has_normals(), built.bounds)
            };
            if self.context.cull(&BoundingVolume::Box(bounds)) {
                tracing::trace!(tile = ?tile.coord(), "terrain tile culled");
                continue;
            }
            let item = DrawItem {
                mesh,
                has_normals,
                world: Mat4::IDENTITY,
                diffuse: Color::WHITE,
                texture: Some(texture),
                lighting_enabled: true,
            };
            let key = effect_key(&self.context, &item, 0);
            let effect = self.effects.get_or_compile(device, key);
            draw_item(&mut self.context, device, effect, key, &item, &[]);
        }
    }

    fn draw_node<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        graph: &mut SceneGraph,
        id: NodeId,
    ) {
        let Some(node) = graph.get(id) else {
            return;
        };
        let children = node.children().to_vec();
        let billboard_size = match &node.kind {
            NodeKind::Billboard(b) => Some(b.size),
            _ => None,
        };
        let absolute = node.absolute();
        for index in 0..node.kind.parts().len() {
            self.draw_part(device, graph, id, index, absolute, billboard_size);
        }
        for child in children {
            self.draw_node(device, graph, child);
        }
    }

    fn draw_part<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        graph: &mut SceneGraph,
        id: NodeId,
        index: usize,
        absolute: Mat4,
        billboard_size: Option<Vec2>,
    ) {
        let Some(part) = graph.get(id).and_then(|n| n.kind.parts().get(index)) else {
            return;
        };
        let Some(mesh) = part.mesh.as_ref() else {
            tracing::trace!(node = %id, index, "part without mesh skipped");
            return;
        };
        let skinned = part.is_skinned();
        let offset = part.offset;
        let local_bounds = part.bounds;
        let mut item = DrawItem {
            mesh: mesh.id(),
            has_normals: mesh.has_normals(),
            world: Mat4::IDENTITY,
            diffuse: part.material.diffuse_color(),
            texture: part.material.texture().map(|t| t.id()),
            lighting_enabled: part.material.lighting_enabled(),
        };
        compute_bone_transforms_into(graph, part.bones(), &mut self.bones);

        // bone matrices already carry the node hierarchy
        let node_transform = if skinned {
            Mat4::IDENTITY
        } else if let Some(size) = billboard_size {
            billboard_transform(absolute, self.context.view(), size)
        } else {
            absolute
        };
        let mut scope = self.context.push_world(node_transform);
        item.world = scope.world() * offset;
        if scope.cull(&local_bounds.transformed(&item.world)) {
            return;
        }

        let key = effect_key(&scope, &item, self.bones.len());
        let effects = &mut self.effects;
        let effect = match graph
            .get_mut(id)
            .and_then(|n| n.kind.parts_mut().get_mut(index))
        {
            Some(part) => part
                .material
                .bind_effect(key, |k| effects.get_or_compile(device, k)),
            None => effects.get_or_compile(device, key),
        };
        draw_item(&mut scope, device, effect, key, &item, &self.bones);
    }
}

/// Screen-aligned placement for a billboard at `absolute`'s translation.
fn billboard_transform(absolute: Mat4, view: Mat4, size: Vec2) -> Mat4 {
    let facing = Mat3::from_mat4(view).transpose();
    Mat4::from_translation(absolute.w_axis.truncate())
        * Mat4::from_mat3(facing)
        * Mat4::from_scale(Vec3::new(size.x, size.y, 1.0))
}

fn effect_key(context: &RenderContext, item: &DrawItem, bone_count: usize) -> EffectKey {
    EffectKey {
        kind: EffectKind::Basic,
        clip_plane: context.clip_plane().is_some(),
        texture: item.texture.is_some(),
        lit: item.lighting_enabled && item.has_normals && !context.lights().is_empty(),
        bone_count: bone_count as u16,
    }
}

/// Upload parameters and issue the draw, once per light when lit.
fn draw_item<D: GraphicsDevice + ?Sized>(
    context: &mut RenderContext,
    device: &mut D,
    effect: EffectId,
    key: EffectKey,
    item: &DrawItem,
    bones: &[Mat4],
) {
    let mut params = EffectParameters::new(item.world, context.view_projection());
    params.diffuse_color = item.diffuse;
    params.texture = item.texture;
    params.bones = bones;
    params.clip_plane = context.clip_plane_coefficients();
    device.set_effect_parameters(effect, &params);

    let mut draws = 0;
    if key.lit {
        let configured = device.pipeline_state().blend;
        for (i, light) in context.lights().iter().enumerate() {
            if i == 1 {
                device.set_blend_state(BlendState::Additive);
            }
            device.set_light_parameters(effect, light);
            device.draw_indexed_primitives(effect, item.mesh);
            draws += 1;
        }
        if draws > 1 {
            device.set_blend_state(configured);
        }
    } else {
        device.draw_indexed_primitives(effect, item.mesh);
        draws = 1;
    }
    context.statistics.draw_calls += draws;
    context.statistics.meshes_drawn += 1;
}

/// An active frame. Dropping it ends the frame and restores device state,
/// including when unwinding.
pub struct Frame<'a, D: GraphicsDevice + ?Sized> {
    renderer: &'a mut ForwardRenderer,
    device: &'a mut D,
}

impl<D: GraphicsDevice + ?Sized> Frame<'_, D> {
    pub fn draw_scene(&mut self, scene: &mut Scene) -> Result<(), RenderError> {
        self.renderer.draw_scene(self.device, scene)
    }

    pub fn statistics(&self) -> RenderStatistics {
        self.renderer.statistics()
    }

    pub fn device(&mut self) -> &mut D {
        self.device
    }
}

impl<D: GraphicsDevice + ?Sized> Drop for Frame<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.renderer.end(self.device) {
            tracing::warn!(error = %e, "frame guard could not end frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use vista_device::{DeviceCommand, HeadlessDevice, MeshData, RasterizerState};
    use vista_scene::{Bone, DirectLight, Material, MeshPart, Node};

    fn cube_scene(device: &mut HeadlessDevice, lights: usize) -> Scene {
        let mut scene = Scene::new(Camera::looking_at(Vec3::splat(10.0), Vec3::ZERO));
        for _ in 0..lights {
            scene
                .lights
                .push(DirectLight::new(Vec3::new(-1.0, -1.0, 0.0), Color::WHITE).into());
        }
        let part = MeshPart::from_data(device, &MeshData::cube(1.0), Material::default());
        scene
            .graph
            .add_child(NodeId::ROOT, Node::mesh("cube", vec![part]))
            .unwrap();
        scene
    }

    #[test]
    fn nested_begin_is_rejected() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        renderer.begin(&mut device).unwrap();
        assert_eq!(
            renderer.begin(&mut device),
            Err(RenderError::FrameAlreadyActive)
        );
        renderer.end(&mut device).unwrap();
        assert_eq!(renderer.end(&mut device), Err(RenderError::FrameNotActive));
    }

    #[test]
    fn draw_scene_requires_frame() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 1);
        assert_eq!(
            renderer.draw_scene(&mut device, &mut scene),
            Err(RenderError::FrameNotActive)
        );
    }

    #[test]
    fn end_restores_snapshotted_state() {
        let mut device = HeadlessDevice::new(64, 64);
        let host_state = PipelineState {
            rasterizer: RasterizerState::Wireframe,
            blend: BlendState::AlphaBlend,
            ..PipelineState::default()
        };
        device.set_pipeline_state(host_state);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());

        renderer.begin(&mut device).unwrap();
        assert_eq!(device.pipeline_state(), PipelineState::default());
        renderer.end(&mut device).unwrap();
        assert_eq!(device.pipeline_state(), host_state);
    }

    #[test]
    fn frame_guard_ends_on_panic() {
        let mut device = HeadlessDevice::new(64, 64);
        let host_state = PipelineState {
            blend: BlendState::AlphaBlend,
            ..PipelineState::default()
        };
        device.set_pipeline_state(host_state);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _frame = renderer.frame(&mut device).unwrap();
            panic!("host loop failed mid-frame");
        }));
        assert!(result.is_err());
        assert!(!renderer.is_frame_active());
        assert_eq!(device.pipeline_state(), host_state);
    }

    #[test]
    fn zero_height_viewport_draws_nothing() {
        let mut device = HeadlessDevice::new(800, 0);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 1);
        {
            let mut frame = renderer.frame(&mut device).unwrap();
            frame.draw_scene(&mut scene).unwrap();
        }
        assert_eq!(device.draw_count(), 0);
        assert_eq!(renderer.statistics(), RenderStatistics::default());

        device.resize(800, 600);
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        assert_eq!(frame.statistics().meshes_drawn, 1);
    }

    #[test]
    fn statistics_reset_at_begin() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 0);
        for _ in 0..3 {
            let mut frame = renderer.frame(&mut device).unwrap();
            frame.draw_scene(&mut scene).unwrap();
        }
        assert_eq!(renderer.statistics().meshes_drawn, 1);
        assert_eq!(renderer.statistics().passes, 1);
    }

    #[test]
    fn unlit_part_draws_once_without_lights() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 0);
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        drop(frame);
        let draw = device.draws().next().unwrap();
        assert!(!draw.key.lit);
        assert_eq!(draw.light, None);
    }

    #[test]
    fn effects_compile_once_per_permutation() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 2);
        let part = MeshPart::from_data(&mut device, &MeshData::cube(2.0), Material::default());
        scene
            .graph
            .add_child(NodeId::ROOT, Node::mesh("second", vec![part]))
            .unwrap();
        for _ in 0..2 {
            let mut frame = renderer.frame(&mut device).unwrap();
            frame.draw_scene(&mut scene).unwrap();
        }
        assert_eq!(device.compile_count(), 1);
        assert_eq!(renderer.effects().len(), 1);
    }

    #[test]
    fn missing_mesh_is_skipped() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 1);
        let cube = scene.graph.node(NodeId::ROOT).unwrap().children()[0];
        if let NodeKind::Mesh(parts) = &mut scene.graph.node_mut(cube).unwrap().kind {
            parts[0].mesh = None;
        }
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        assert_eq!(frame.statistics().meshes_drawn, 0);
        assert_eq!(frame.statistics().meshes_culled, 0);
    }

    #[test]
    fn culled_parts_do_not_count() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 1);
        let part = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default());
        scene
            .graph
            .add_child(
                NodeId::ROOT,
                Node::mesh("behind", vec![part])
                    .with_local(Mat4::from_translation(Vec3::splat(50.0))),
            )
            .unwrap();
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        let stats = frame.statistics();
        drop(frame);
        assert_eq!(stats.meshes_drawn, 1);
        assert_eq!(stats.meshes_culled, 1);
        assert_eq!(device.draw_count(), 1);
    }

    #[test]
    fn children_of_empty_nodes_are_drawn() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = Scene::new(Camera::looking_at(Vec3::splat(10.0), Vec3::ZERO));
        let group = scene
            .graph
            .add_child(
                NodeId::ROOT,
                Node::empty("group").with_local(Mat4::from_translation(Vec3::X)),
            )
            .unwrap();
        let part = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default());
        scene.graph.add_child(group, Node::mesh("cube", vec![part])).unwrap();

        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        drop(frame);
        let draw = device.draws().next().unwrap();
        let world = draw.parameters.as_ref().unwrap().world;
        assert_eq!(world, Mat4::from_translation(Vec3::X));
    }

    #[test]
    fn skinned_part_uses_bone_palette_not_node_transform() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = Scene::new(Camera::looking_at(Vec3::splat(10.0), Vec3::ZERO));
        let model = scene
            .graph
            .add_child(
                NodeId::ROOT,
                Node::empty("model").with_local(Mat4::from_translation(Vec3::Y)),
            )
            .unwrap();
        let hip = scene
            .graph
            .add_child(
                model,
                Node::empty("hip").with_local(Mat4::from_translation(Vec3::X)),
            )
            .unwrap();
        let part = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default())
            .with_bones(vec![Bone::new(hip, Mat4::IDENTITY)]);
        scene.graph.add_child(model, Node::mesh("skin", vec![part])).unwrap();

        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        drop(frame);
        let draw = device.draws().next().unwrap();
        let params = draw.parameters.as_ref().unwrap();
        assert_eq!(params.world, Mat4::IDENTITY);
        assert_eq!(params.bones, vec![Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0))]);
        assert_eq!(draw.key.bone_count, 1);
    }

    #[test]
    fn skybox_draws_with_depth_read_then_restores() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = cube_scene(&mut device, 0);
        scene.skybox = Some(Skybox::new(&mut device, None));
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        drop(frame);

        let draws: Vec<_> = device.draws().collect();
        assert_eq!(draws[0].key.kind, EffectKind::Skybox);
        assert_eq!(draws[0].state.depth_stencil, DepthStencilState::DepthRead);
        assert_eq!(draws[1].state.depth_stencil, DepthStencilState::Default);
    }

    #[test]
    fn terrain_tiles_draw_with_splat_texture() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = Scene::new(Camera::looking_at(Vec3::new(64.0, 80.0, 160.0), Vec3::new(64.0, 0.0, 32.0)));
        scene.lights.push(DirectLight::new(Vec3::NEG_Y, Color::WHITE).into());
        scene.terrain =
            Some(Terrain::new(vista_terrain::TerrainConfig::default(), 2, 1).unwrap());

        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        assert_eq!(frame.statistics().meshes_drawn, 2);
        drop(frame);
        assert_eq!(device.live_textures(), 2);
        assert!(device.draws().all(|d| d.key.texture && d.key.lit));
        assert!(
            device
                .commands()
                .iter()
                .any(|c| matches!(c, DeviceCommand::CreateMesh { vertices: 6, .. }))
        );
    }

    #[test]
    fn billboard_faces_camera() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
        let mut scene = Scene::new(Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO));
        let board = vista_scene::Billboard::new(&mut device, Vec2::new(2.0, 1.0), Material::default());
        scene
            .graph
            .add_child(NodeId::ROOT, Node::new("sprite", NodeKind::Billboard(board)))
            .unwrap();
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
        drop(frame);
        let world = device.draws().next().unwrap().parameters.as_ref().unwrap().world;
        let normal = world.transform_vector3(Vec3::Y).normalize();
        assert!((normal - Vec3::Z).length() < 1e-4, "{normal:?}");
    }
}
