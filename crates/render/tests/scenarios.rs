use glam::{Mat4, Vec2, Vec3, Vec4};
use vista_common::{Color, Transform};
use vista_device::{
    BlendState, DeviceCommand, EffectKind, GraphicsDevice, HeadlessDevice, MeshData, Viewport,
};
use vista_render::{ForwardRenderer, RendererConfig};
use vista_scene::{Camera, DirectLight, Material, MeshPart, Node, NodeId, Scene, WaterTile};

fn cube_scene(device: &mut HeadlessDevice, lights: usize) -> Scene {
    let mut scene = Scene::new(Camera::looking_at(Vec3::splat(10.0), Vec3::ZERO));
    let directions = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, -1.0, 1.0),
    ];
    for dir in directions.iter().cycle().take(lights) {
        scene.lights.push(DirectLight::new(*dir, Color::WHITE).into());
    }
    let cube = MeshData::cube(1.0);
    assert_eq!(cube.vertex_count(), 8);
    let part = MeshPart::from_data(device, &cube, Material::default());
    scene
        .graph
        .add_child(NodeId::ROOT, Node::mesh("cube", vec![part]))
        .unwrap();
    scene
}

#[test]
fn single_light_cube_draws_once() {
    let mut device = HeadlessDevice::new(1280, 720);
    let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
    let mut scene = cube_scene(&mut device, 1);

    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    let stats = frame.statistics();
    drop(frame);

    assert_eq!(stats.meshes_drawn, 1);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(device.draw_count(), 1);
    let draw = device.draws().next().unwrap();
    assert_eq!(draw.state.blend, BlendState::Opaque);
    assert!(draw.key.lit);
}

#[test]
fn three_lights_fan_out_with_additive_blend() {
    let mut device = HeadlessDevice::new(1280, 720);
    let config = RendererConfig::default();
    let mut renderer = ForwardRenderer::new(&mut device, config);
    let mut scene = cube_scene(&mut device, 3);

    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    let stats = frame.statistics();
    assert_eq!(
        frame.device().pipeline_state().blend,
        config.pipeline_state.blend
    );
    drop(frame);

    assert_eq!(stats.meshes_drawn, 1);
    assert_eq!(stats.draw_calls, 3);
    let draws: Vec<_> = device.draws().cloned().collect();
    assert_eq!(draws.len(), 3);
    assert_eq!(draws[0].state.blend, BlendState::Opaque);
    assert_eq!(draws[1].state.blend, BlendState::Additive);
    assert_eq!(draws[2].state.blend, BlendState::Additive);

    let lights: Vec<_> = draws.iter().map(|d| d.light.unwrap().direction).collect();
    let expected: Vec<_> = scene.lights.iter().map(|l| l.parameters().direction).collect();
    assert_eq!(lights, expected);

    // blend goes back to the configured state right after the last light
    let commands = device.commands();
    let last_draw = commands
        .iter()
        .rposition(|c| matches!(c, DeviceCommand::Draw(_)))
        .unwrap();
    assert!(matches!(
        commands[last_draw + 1],
        DeviceCommand::SetPipelineState(s) if s.blend == BlendState::Opaque
    ));
}

#[test]
fn lights_fan_out_per_part_not_per_light_count() {
    let mut device = HeadlessDevice::new(640, 480);
    let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
    let mut scene = cube_scene(&mut device, 2);
    let extra = MeshPart::from_data(&mut device, &MeshData::cube(0.5), Material::default())
        .with_offset(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    let cube = scene.graph.node(NodeId::ROOT).unwrap().children()[0];
    if let vista_scene::NodeKind::Mesh(parts) = &mut scene.graph.node_mut(cube).unwrap().kind {
        parts.push(extra);
    }

    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    let stats = frame.statistics();
    drop(frame);
    assert_eq!(stats.meshes_drawn, 2);
    assert_eq!(stats.draw_calls, 4);
}

#[test]
fn culling_follows_the_part_offset() {
    let mut device = HeadlessDevice::new(640, 480);
    let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
    let mut scene = Scene::new(Camera::looking_at(Vec3::splat(10.0), Vec3::ZERO));
    scene
        .lights
        .push(DirectLight::new(Vec3::NEG_ONE, Color::WHITE).into());
    let away = Vec3::new(200.0, 0.0, -200.0);

    let pushed_out = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default())
        .with_offset(Mat4::from_translation(away));
    scene
        .graph
        .add_child(NodeId::ROOT, Node::mesh("pushed_out", vec![pushed_out]))
        .unwrap();

    let pulled_in = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default())
        .with_offset(Mat4::from_translation(-away));
    scene
        .graph
        .add_child(
            NodeId::ROOT,
            Node::mesh("pulled_in", vec![pulled_in]).with_transform(Transform::from_position(away)),
        )
        .unwrap();

    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    let stats = frame.statistics();
    drop(frame);

    assert_eq!(stats.meshes_culled, 1);
    assert_eq!(stats.meshes_drawn, 1);
    assert_eq!(device.draw_count(), 1);
    let world = device.draws().next().unwrap().parameters.as_ref().unwrap().world;
    assert!(world.abs_diff_eq(Mat4::IDENTITY, 1e-4));
}

#[test]
fn water_passes_clip_and_mirror_the_camera() {
    let mut device = HeadlessDevice::new(1280, 720);
    let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
    let mut scene = cube_scene(&mut device, 1);
    scene
        .water
        .push(WaterTile::new(Vec2::ZERO, Vec2::splat(20.0), 0.0));
    let original = scene.camera;
    assert_eq!(original.position.y, 10.0);

    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    let stats = frame.statistics();
    drop(frame);

    let refraction = renderer.water().refraction_target().id();
    let reflection = renderer.water().reflection_target().id();
    let targets: Vec<_> = device
        .commands()
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::SetRenderTarget(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec![Some(refraction), Some(reflection), None]);
    assert_eq!(stats.passes, 3);

    // refraction keeps the origin: positive side of the plane
    let refraction_draw = device
        .draws()
        .find(|d| d.target == Some(refraction))
        .unwrap();
    let params = refraction_draw.parameters.as_ref().unwrap();
    let plane = params.clip_plane.unwrap();
    let origin = params.world_view_projection * Vec4::W;
    assert!(plane.dot(origin) > 0.0);
    assert!(refraction_draw.key.clip_plane);

    // reflection renders from the camera mirrored about y = 0
    let reflection_draw = device
        .draws()
        .find(|d| d.target == Some(reflection))
        .unwrap();
    let mirrored = original.mirrored(0.0);
    assert_eq!(mirrored.position.y, -10.0);
    assert_eq!(mirrored.pitch, -original.pitch);
    let aspect = Viewport::new(320, 180).aspect_ratio();
    let params = reflection_draw.parameters.as_ref().unwrap();
    assert!(
        params
            .world_view_projection
            .abs_diff_eq(mirrored.view_projection(aspect), 1e-5)
    );
    let plane = params.clip_plane.unwrap();
    let above = params.world_view_projection * Vec4::new(0.0, 1.0, 0.0, 1.0);
    let below = params.world_view_projection * Vec4::new(0.0, -1.0, 0.0, 1.0);
    assert!(plane.dot(above) > 0.0);
    assert!(plane.dot(below) < 0.0);

    // camera restored bit for bit
    assert_eq!(scene.camera, original);
    assert_eq!(scene.camera.position.y.to_bits(), 10.0_f32.to_bits());
    assert_eq!(scene.camera.pitch.to_bits(), original.pitch.to_bits());

    // main pass is unclipped and the composite samples both targets
    let main: Vec<_> = device.draws().filter(|d| d.target.is_none()).collect();
    assert!(main.iter().all(|d| !d.key.clip_plane));
    let water = main
        .iter()
        .find(|d| d.key.kind == EffectKind::Water)
        .unwrap();
    let water_params = water.parameters.as_ref().unwrap().water.unwrap();
    assert_eq!(water_params.refraction, refraction);
    assert_eq!(water_params.reflection, reflection);
}

#[test]
fn only_first_water_tile_drives_passes() {
    let mut device = HeadlessDevice::new(1280, 720);
    let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
    let mut scene = cube_scene(&mut device, 1);
    scene.water.push(WaterTile::new(Vec2::ZERO, Vec2::splat(4.0), 0.0));
    scene
        .water
        .push(WaterTile::new(Vec2::new(3.0, 0.0), Vec2::splat(4.0), 5.0));

    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    assert_eq!(frame.statistics().passes, 3);
    drop(frame);

    let water_draws = device
        .draws()
        .filter(|d| d.key.kind == EffectKind::Water)
        .count();
    assert_eq!(water_draws, 2);

    // the reflection pass mirrored about the first tile's height
    let reflection = renderer.water().reflection_target().id();
    let mirrored = scene.camera.mirrored(0.0);
    let aspect = Viewport::new(320, 180).aspect_ratio();
    let draw = device.draws().find(|d| d.target == Some(reflection)).unwrap();
    assert!(
        draw.parameters
            .as_ref()
            .unwrap()
            .world_view_projection
            .abs_diff_eq(mirrored.view_projection(aspect), 1e-5)
    );
}

#[test]
fn wave_offset_reaches_the_composite() {
    let mut device = HeadlessDevice::new(1280, 720);
    let config = RendererConfig {
        wave_velocity: Vec2::new(0.25, 0.0),
        ..RendererConfig::default()
    };
    let mut renderer = ForwardRenderer::new(&mut device, config);
    let mut scene = cube_scene(&mut device, 0);
    scene.water.push(WaterTile::new(Vec2::ZERO, Vec2::splat(20.0), 0.0));

    renderer.advance(std::time::Duration::from_secs(1));
    let mut frame = renderer.frame(&mut device).unwrap();
    frame.draw_scene(&mut scene).unwrap();
    drop(frame);

    let water = device
        .draws()
        .find(|d| d.key.kind == EffectKind::Water)
        .and_then(|d| d.parameters.as_ref())
        .and_then(|p| p.water)
        .unwrap();
    assert_eq!(water.wave_offset, Vec2::new(0.25, 0.0));
}

#[test]
fn superseded_terrain_mesh_is_released_next_frame() {
    let mut device = HeadlessDevice::new(1280, 720);
    let mut renderer = ForwardRenderer::new(&mut device, RendererConfig::default());
    let mut scene = Scene::new(Camera::looking_at(
        Vec3::new(32.0, 60.0, 120.0),
        Vec3::new(32.0, 0.0, 32.0),
    ));
    scene.terrain = Some(
        vista_terrain::Terrain::new(vista_terrain::TerrainConfig::default(), 1, 1).unwrap(),
    );

    {
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
    }
    let meshes_before = device.live_meshes();

    if let Some(terrain) = scene.terrain.as_mut() {
        terrain
            .set_height_world(Vec2::new(32.0, 32.0), 10.0)
            .unwrap();
    }
    {
        let mut frame = renderer.frame(&mut device).unwrap();
        frame.draw_scene(&mut scene).unwrap();
    }
    assert_eq!(device.live_meshes(), meshes_before);
    let released = device
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::Release(_)))
        .count();
    assert_eq!(released, 1);
    assert!(device.commands().iter().any(|c| matches!(
        c,
        DeviceCommand::CreateMesh { vertices, .. } if *vertices == 33 * 33
    )));
}
