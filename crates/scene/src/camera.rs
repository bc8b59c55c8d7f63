use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera oriented by yaw, pitch and roll.
///
/// View and projection are derived on every read; nothing is memoized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Radians around +Y; zero looks down +X.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    /// Radians around the view direction.
    pub roll: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 15.0),
            yaw: -90.0_f32.to_radians(),
            pitch: -30.0_f32.to_radians(),
            roll: 0.0,
            fov: 60.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Camera at `position` facing `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            ..Self::default()
        };
        camera.look_at(target);
        camera
    }

    /// Turn to face `target`. Roll is kept.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn up(&self) -> Vec3 {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let right = if right == Vec3::ZERO { Vec3::X } else { right };
        let up = right.cross(forward);
        Quat::from_axis_angle(forward, self.roll) * up
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up())
    }

    /// Perspective projection with a `[0, 1]` depth range.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Reflect about the horizontal plane `y = height`: the vertical position
    /// mirrors and the pitch flips.
    pub fn mirror(&mut self, height: f32) {
        self.position.y = 2.0 * height - self.position.y;
        self.pitch = -self.pitch;
    }

    pub fn mirrored(&self, height: f32) -> Self {
        let mut camera = *self;
        camera.mirror(height);
        camera
    }

    /// World-space corners of the view frustum, near plane first.
    pub fn frustum_corners(&self, aspect: f32) -> [Vec3; 8] {
        let inverse = self.view_projection(aspect).inverse();
        let mut corners = [Vec3::ZERO; 8];
        let mut i = 0;
        for z in [0.0, 1.0] {
            for y in [-1.0, 1.0] {
                for x in [-1.0, 1.0] {
                    corners[i] = inverse.project_point3(Vec3::new(x, y, z));
                    i += 1;
                }
            }
        }
        corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_faces_target() {
        let camera = Camera::looking_at(Vec3::splat(10.0), Vec3::ZERO);
        let expected = (-Vec3::splat(10.0)).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
        let p = camera.view().transform_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!(p.z < 0.0);
    }

    #[test]
    fn mirror_reflects_height_and_pitch() {
        let camera = Camera::looking_at(Vec3::new(0.0, 10.0, 5.0), Vec3::ZERO);
        let mirrored = camera.mirrored(0.0);
        assert_eq!(mirrored.position, Vec3::new(0.0, -10.0, 5.0));
        assert_eq!(mirrored.pitch, -camera.pitch);
        assert_eq!(mirrored.yaw, camera.yaw);
        let mirrored = camera.mirrored(2.0);
        assert_eq!(mirrored.position.y, -6.0);
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let camera = Camera::looking_at(Vec3::new(5.0, 3.0, -2.0), Vec3::ZERO);
        let ndc = camera.view_projection(16.0 / 9.0).project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn roll_turns_up_vector() {
        let mut camera = Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!((camera.up() - Vec3::Y).length() < 1e-5);
        camera.roll = std::f32::consts::FRAC_PI_2;
        assert!(camera.up().y.abs() < 1e-5);
    }

    #[test]
    fn frustum_corners_span_near_and_far() {
        let camera = Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let corners = camera.frustum_corners(1.0);
        assert!((corners[0].z + camera.near).abs() < 1e-3);
        assert!((corners[7].z + camera.far).abs() < 1.0);
    }
}
