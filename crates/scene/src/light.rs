use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use vista_common::{BoundingBox, Color};
use vista_device::LightParameters;

use crate::camera::Camera;

/// Infinitely distant light shining along one direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectLight {
    direction: Vec3,
    pub color: Color,
    pub cast_shadows: bool,
}

impl DirectLight {
    /// A zero `direction` falls back to straight down.
    pub fn new(direction: Vec3, color: Color) -> Self {
        let mut light = Self {
            direction: Vec3::NEG_Y,
            color,
            cast_shadows: false,
        };
        light.set_direction(direction);
        light
    }

    /// Normalized travel direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        let n = direction.normalize_or_zero();
        self.direction = if n == Vec3::ZERO { Vec3::NEG_Y } else { n };
    }

    /// Orthographic light-space view-projection that encloses the camera's
    /// view frustum.
    pub fn shadow_view_projection(&self, camera: &Camera, aspect: f32) -> Mat4 {
        let corners = camera.frustum_corners(aspect);
        let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
        let radius = corners
            .iter()
            .map(|c| c.distance(center))
            .fold(0.0_f32, f32::max);

        let up = if self.direction.abs_diff_eq(Vec3::Y, 1e-3)
            || self.direction.abs_diff_eq(Vec3::NEG_Y, 1e-3)
        {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let eye = center - self.direction * radius;
        let view = Mat4::look_at_rh(eye, center, up);

        let light_space = corners.map(|c| view.transform_point3(c));
        let fallback = BoundingBox::new(Vec3::splat(-radius), Vec3::splat(radius));
        let bounds = BoundingBox::from_points(light_space).unwrap_or(fallback);
        // right-handed view looks down -Z
        let projection = Mat4::orthographic_rh(
            bounds.min.x,
            bounds.max.x,
            bounds.min.y,
            bounds.max.y,
            -bounds.max.z,
            -bounds.min.z,
        );
        projection * view
    }

    pub fn parameters(&self) -> LightParameters {
        LightParameters {
            direction: self.direction,
            color: self.color,
            position: None,
            range: 0.0,
        }
    }
}

/// Light radiating from a point, fading out at `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub range: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color, range: f32) -> Self {
        Self {
            position,
            color,
            range,
        }
    }

    pub fn parameters(&self) -> LightParameters {
        LightParameters {
            direction: Vec3::ZERO,
            color: self.color,
            position: Some(self.position),
            range: self.range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Direct(DirectLight),
    Point(PointLight),
}

impl Light {
    pub fn parameters(&self) -> LightParameters {
        match self {
            Light::Direct(l) => l.parameters(),
            Light::Point(l) => l.parameters(),
        }
    }
}

impl From<DirectLight> for Light {
    fn from(l: DirectLight) -> Self {
        Light::Direct(l)
    }
}

impl From<PointLight> for Light {
    fn from(l: PointLight) -> Self {
        Light::Point(l)
    }
}
