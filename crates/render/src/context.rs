use std::ops::{Deref, DerefMut};

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use vista_common::{BoundingVolume, Containment, Frustum, Plane};
use vista_device::LightParameters;

/// Counters for one frame, reset at `begin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStatistics {
    /// Mesh parts drawn, once per part per pass regardless of light count.
    pub meshes_drawn: u32,
    /// Mesh parts skipped because their bounds were outside the frustum.
    pub meshes_culled: u32,
    pub draw_calls: u32,
    pub passes: u32,
}

impl std::fmt::Display for RenderStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "meshes_drawn={} meshes_culled={} draw_calls={} passes={}",
            self.meshes_drawn, self.meshes_culled, self.draw_calls, self.passes
        )
    }
}

/// Per-frame scratch state shared by every draw in a pass.
///
/// One instance is reused across frames; `draw_scene` overwrites the view,
/// lights and clip plane each time.
#[derive(Debug, Clone)]
pub struct RenderContext {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    frustum: Frustum,
    eye: Vec3,
    world: Mat4,
    clip_plane: Option<Plane>,
    lights: Vec<LightParameters>,
    pub statistics: RenderStatistics,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            frustum: Frustum::from_view_projection(&Mat4::IDENTITY),
            eye: Vec3::ZERO,
            world: Mat4::IDENTITY,
            clip_plane: None,
            lights: Vec::new(),
            statistics: RenderStatistics::default(),
        }
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a camera. The frustum is rederived from `projection * view`.
    pub fn set_view_projection(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
        self.view_projection = projection * view;
        self.frustum = Frustum::from_view_projection(&self.view_projection);
        self.eye = view.inverse().w_axis.truncate();
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Camera position recovered from the view matrix.
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Current world accumulator.
    pub fn world(&self) -> Mat4 {
        self.world
    }

    /// Compose `transform` into the world accumulator until the returned
    /// scope is dropped.
    pub fn push_world(&mut self, transform: Mat4) -> WorldScope<'_> {
        let saved = self.world;
        self.world = saved * transform;
        WorldScope { context: self, saved }
    }

    /// World-space clip plane, or `None` to draw unclipped.
    pub fn set_clip_plane(&mut self, plane: Option<Plane>) {
        self.clip_plane = plane;
    }

    pub fn clip_plane(&self) -> Option<Plane> {
        self.clip_plane
    }

    /// Active clip plane moved into clip space by the inverse-transpose of
    /// the view-projection.
    pub fn clip_plane_coefficients(&self) -> Option<Vec4> {
        self.clip_plane
            .map(|p| p.transformed(&self.view_projection).coefficients())
    }

    pub fn set_lights(&mut self, lights: impl IntoIterator<Item = LightParameters>) {
        self.lights.clear();
        self.lights.extend(lights);
    }

    pub fn lights(&self) -> &[LightParameters] {
        &self.lights
    }

    /// Classify world-space bounds against the frustum, counting culls.
    pub fn cull(&mut self, bounds: &BoundingVolume) -> bool {
        let culled = self.frustum.classify(bounds) == Containment::Disjoint;
        if culled {
            self.statistics.meshes_culled += 1;
            tracing::trace!(?bounds, "culled");
        }
        culled
    }
}

/// Restores the world accumulator it was created from when dropped, on every
/// exit path including unwinding.
pub struct WorldScope<'a> {
    context: &'a mut RenderContext,
    saved: Mat4,
}

impl Deref for WorldScope<'_> {
    type Target = RenderContext;

    fn deref(&self) -> &RenderContext {
        self.context
    }
}

impl DerefMut for WorldScope<'_> {
    fn deref_mut(&mut self) -> &mut RenderContext {
        self.context
    }
}

impl Drop for WorldScope<'_> {
    fn drop(&mut self) {
        self.context.world = self.saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use vista_common::BoundingSphere;

    fn m1() -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(0.37), Vec3::new(1.5, -2.0, 0.25))
    }

    fn m2() -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(1.7),
            Quat::from_rotation_x(1.1),
            Vec3::new(0.0, 3.0, -9.0),
        )
    }

    #[test]
    fn nested_scopes_restore_bit_identical() {
        let mut ctx = RenderContext::new();
        let before = ctx.world();
        {
            let mut outer = ctx.push_world(m1());
            assert_eq!(outer.world(), before * m1());
            {
                let inner = outer.push_world(m2());
                assert_eq!(inner.world(), before * m1() * m2());
            }
            assert_eq!(outer.world(), before * m1());
        }
        assert_eq!(ctx.world().to_cols_array(), before.to_cols_array());
    }

    #[test]
    fn scope_restores_on_panic() {
        let mut ctx = RenderContext::new();
        let before = ctx.world();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut outer = ctx.push_world(m1());
            let _inner = outer.push_world(m2());
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.world().to_cols_array(), before.to_cols_array());
    }

    #[test]
    fn frustum_follows_view_projection() {
        let mut ctx = RenderContext::new();
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        ctx.set_view_projection(view, projection);
        assert!((ctx.eye() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);

        let visible = BoundingSphere::new(Vec3::ZERO, 1.0).into();
        let behind_far = BoundingSphere::new(Vec3::new(0.0, 0.0, -200.0), 5.0).into();
        let straddling = BoundingSphere::new(Vec3::new(0.0, 0.0, -90.0), 5.0).into();
        assert!(!ctx.cull(&visible));
        assert!(ctx.cull(&behind_far));
        assert!(!ctx.cull(&straddling));
        assert_eq!(ctx.statistics.meshes_culled, 1);
    }

    #[test]
    fn clip_plane_keeps_sign_through_projection() {
        let mut ctx = RenderContext::new();
        let view = Mat4::look_at_rh(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, 1.3, 0.1, 100.0);
        ctx.set_view_projection(view, projection);
        let plane = Plane::new(Vec3::NEG_Y, 1.0);
        ctx.set_clip_plane(Some(plane));

        let coeffs = ctx.clip_plane_coefficients().unwrap();
        for p in [Vec3::ZERO, Vec3::new(2.0, 3.0, -1.0), Vec3::new(-1.0, 0.5, 2.0)] {
            let clip = ctx.view_projection() * p.extend(1.0);
            let world_side = plane.distance(p);
            let clip_side = coeffs.dot(clip);
            assert_eq!(world_side >= 0.0, clip_side >= 0.0, "{p:?}");
            assert!((world_side - clip_side).abs() < 1e-3);
        }
    }
}
