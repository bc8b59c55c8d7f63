use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use vista_common::{Color, Transform};
use vista_device::{GraphicsDevice, Mesh, MeshData};
use vista_scene::{
    Billboard, Bone, Camera, DirectLight, Material, MeshPart, Node, NodeId, NodeKind, PointLight,
    Scene, Skybox, WaterTile,
};
use vista_terrain::{Terrain, TerrainConfig};

/// What goes into the demo scene.
#[derive(Debug, Clone, Copy)]
pub struct DemoOptions {
    pub cubes: u32,
    pub lights: u32,
    pub water: bool,
    pub skybox: bool,
    /// Terrain tiles per side; 0 for none.
    pub terrain: u32,
}

const PALETTE: [Color; 4] = [
    Color::rgb(0.85, 0.3, 0.25),
    Color::rgb(0.3, 0.7, 0.35),
    Color::rgb(0.25, 0.45, 0.85),
    Color::rgb(0.9, 0.8, 0.3),
];

/// Build a small scene exercising every renderable kind.
pub fn build_scene<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    options: &DemoOptions,
) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(Camera::looking_at(
        Vec3::new(24.0, 18.0, 24.0),
        Vec3::new(0.0, 1.0, 0.0),
    ));

    for i in 0..options.lights {
        if i == 0 {
            scene.lights.push(
                DirectLight::new(Vec3::new(-0.4, -1.0, -0.3), Color::rgb(1.0, 0.95, 0.85)).into(),
            );
        } else {
            let angle = i as f32 * std::f32::consts::TAU / options.lights as f32;
            let position = Vec3::new(angle.cos() * 8.0, 4.0, angle.sin() * 8.0);
            scene
                .lights
                .push(PointLight::new(position, PALETTE[i as usize % PALETTE.len()], 16.0).into());
        }
    }

    if options.skybox {
        scene.skybox = Some(Skybox::new(device, None));
    }

    let cube_data = MeshData::cube(1.0);
    let cube = Rc::new(Mesh::upload(device, &cube_data));
    let props = scene.graph.add_child(NodeId::ROOT, Node::empty("props"))?;
    let side = (options.cubes as f32).sqrt().ceil().max(1.0) as u32;
    for i in 0..options.cubes {
        let (x, z) = ((i % side) as f32, (i / side) as f32);
        let offset = (side as f32 - 1.0) * 1.5;
        let position = Vec3::new(x * 3.0 - offset, 0.5, z * 3.0 - offset);
        let material = Material::new(PALETTE[i as usize % PALETTE.len()]);
        let part = MeshPart::new(cube.clone(), cube_data.bounding_sphere(), material);
        scene.graph.add_child(
            props,
            Node::mesh(format!("cube_{i}"), vec![part])
                .with_transform(Transform::from_position(position)),
        )?;
    }

    let marker = Billboard::new(device, Vec2::splat(2.0), Material::new(Color::WHITE));
    scene.graph.add_child(
        NodeId::ROOT,
        Node::new("marker", NodeKind::Billboard(marker))
            .with_transform(Transform::from_position(Vec3::new(0.0, 6.0, 0.0))),
    )?;

    add_arm(device, &mut scene)?;

    if options.water {
        scene
            .water
            .push(WaterTile::new(Vec2::ZERO, Vec2::splat(48.0), 0.0));
    }

    if options.terrain > 0 {
        scene.terrain = Some(build_terrain(options.terrain)?);
    }
    Ok(scene)
}

/// Two-bone arm: lower vertices follow the shoulder, upper ones the elbow.
fn add_arm<D: GraphicsDevice + ?Sized>(device: &mut D, scene: &mut Scene) -> anyhow::Result<()> {
    let arm = scene.graph.add_child(
        NodeId::ROOT,
        Node::empty("arm").with_transform(Transform::from_position(Vec3::new(-8.0, 1.0, 6.0))),
    )?;
    let shoulder = scene.graph.add_child(arm, Node::empty("shoulder"))?;
    let elbow = scene.graph.add_child(
        shoulder,
        Node::empty("elbow").with_local(
            Mat4::from_translation(Vec3::Y) * Mat4::from_rotation_z(0.4),
        ),
    )?;

    let mut data = MeshData::cube(1.0);
    for vertex in &mut data.vertices {
        let bone = if vertex.position[1] < 0.0 { 0 } else { 1 };
        vertex.bone_indices = [bone, 0, 0, 0];
        vertex.bone_weights = [1.0, 0.0, 0.0, 0.0];
    }
    let bones = vec![
        Bone::new(shoulder, Mat4::IDENTITY),
        Bone::new(elbow, Mat4::from_translation(Vec3::NEG_Y)),
    ];
    let part = MeshPart::from_data(device, &data, Material::new(Color::rgb(0.7, 0.7, 0.75)))
        .with_bones(bones);
    scene
        .graph
        .add_child(arm, Node::mesh("arm_skin", vec![part]))?;
    Ok(())
}

/// Sunken terrain with a hill in the middle of the first tile.
pub fn build_terrain(tiles: u32) -> anyhow::Result<Terrain> {
    let config = TerrainConfig {
        tile_size: Vec2::splat(32.0),
        vertex_count: glam::UVec2::splat(17),
        default_height: -2.0,
        ..TerrainConfig::default()
    };
    let mut terrain = Terrain::new(config, tiles, tiles)?;
    let spacing = terrain.sample_spacing();
    let center = Vec2::splat(16.0);
    for dy in -3..=3 {
        for dx in -3..=3 {
            let offset = Vec2::new(dx as f32, dy as f32) * spacing;
            let falloff = 1.0 - offset.length() / (4.0 * spacing.x);
            if falloff > 0.0 {
                terrain.set_height_world(center + offset, -2.0 + 6.0 * falloff)?;
            }
        }
    }
    terrain.paint_world(center, Color::rgb(0.4, 0.6, 0.3))?;
    Ok(terrain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_device::HeadlessDevice;
    use vista_scene::SceneInspector;

    #[test]
    fn demo_scene_contains_every_kind() {
        let mut device = HeadlessDevice::new(64, 64);
        let options = DemoOptions {
            cubes: 4,
            lights: 2,
            water: true,
            skybox: true,
            terrain: 1,
        };
        let scene = build_scene(&mut device, &options).unwrap();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.lights, 2);
        assert_eq!(summary.water_tiles, 1);
        assert_eq!(summary.terrain_tiles, 1);
        assert!(summary.has_skybox);
        let tree = SceneInspector::render_tree(&scene);
        assert!(tree.contains("marker"));
        assert!(tree.contains("arm_skin"));
    }

    #[test]
    fn terrain_hill_rises_above_the_floor() {
        let terrain = build_terrain(2).unwrap();
        assert!(terrain.height_at(Vec2::splat(16.0)).unwrap() > 3.0);
        assert_eq!(terrain.height_at(Vec2::splat(48.0)).unwrap(), -2.0);
        assert!(!terrain.tiles()[0].is_flat());
        assert!(terrain.tiles()[3].is_flat());
    }
}
