use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use vista_common::{BoundingBox, Color};
use vista_device::{GraphicsDevice, Mesh, MeshData, Texture};
use vista_terrain::Terrain;

use crate::camera::Camera;
use crate::graph::SceneGraph;
use crate::light::Light;

/// Cube drawn around the camera behind everything else.
#[derive(Debug)]
pub struct Skybox {
    pub mesh: Mesh,
    pub texture: Option<Rc<Texture>>,
    pub color: Color,
    /// Edge length of the cube; must stay inside the camera's far plane.
    pub size: f32,
}

impl Skybox {
    pub fn new<D: GraphicsDevice + ?Sized>(device: &mut D, texture: Option<Rc<Texture>>) -> Self {
        Self {
            mesh: Mesh::upload(device, &MeshData::cube(1.0)),
            texture,
            color: Color::WHITE,
            size: 100.0,
        }
    }

    /// World transform of the cube for a camera at `eye`.
    pub fn world(&self, eye: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.size), glam::Quat::IDENTITY, eye)
    }
}

/// Horizontal water rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterTile {
    /// World X/Z of the rectangle's centre.
    pub center: Vec2,
    pub size: Vec2,
    pub height: f32,
}

impl WaterTile {
    pub fn new(center: Vec2, size: Vec2, height: f32) -> Self {
        Self {
            center,
            size,
            height,
        }
    }

    /// World transform mapping the unit XZ quad onto this tile.
    pub fn world(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(self.size.x, 1.0, self.size.y),
            glam::Quat::IDENTITY,
            Vec3::new(self.center.x, self.height, self.center.y),
        )
    }

    pub fn bounds(&self) -> BoundingBox {
        let half = self.size * 0.5;
        BoundingBox::new(
            Vec3::new(self.center.x - half.x, self.height, self.center.y - half.y),
            Vec3::new(self.center.x + half.x, self.height, self.center.y + half.y),
        )
    }
}

/// Everything one frame renders. Built by a loader or by hand and handed to the
/// renderer whole.
#[derive(Debug, Default)]
pub struct Scene {
    pub graph: SceneGraph,
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub terrain: Option<Terrain>,
    pub skybox: Option<Skybox>,
    pub water: Vec<WaterTile>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    pub fn with_light(mut self, light: impl Into<Light>) -> Self {
        self.lights.push(light.into());
        self
    }

    pub fn has_water(&self) -> bool {
        !self.water.is_empty()
    }
}
