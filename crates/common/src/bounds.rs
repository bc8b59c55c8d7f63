use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Result of testing a bounding volume against a frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Containment {
    /// Entirely outside at least one plane.
    Disjoint,
    /// Straddles one or more planes.
    Intersects,
    /// Entirely inside every plane.
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Smallest sphere around the box enclosing `points`. Empty input yields a
    /// zero-radius sphere at the origin.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        match BoundingBox::from_points(points) {
            Some(aabb) => Self {
                center: aabb.center(),
                radius: aabb.half_extents().length(),
            },
            None => Self::new(Vec3::ZERO, 0.0),
        }
    }

    /// Moves the center by `m` and scales the radius by the largest axis scale.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let scale = m
            .x_axis
            .truncate()
            .length()
            .max(m.y_axis.truncate().length())
            .max(m.z_axis.truncate().length());
        Self {
            center: m.transform_point3(self.center),
            radius: self.radius * scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box around the eight transformed corners.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let corners = self.corners().map(|c| m.transform_point3(c));
        let mut out = Self::new(corners[0], corners[0]);
        for c in &corners[1..] {
            out.min = out.min.min(*c);
            out.max = out.max.max(*c);
        }
        out
    }
}

/// Bounds carried by a mesh part; the variant depends on how the mesh was built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingVolume {
    Sphere(BoundingSphere),
    Box(BoundingBox),
}

impl BoundingVolume {
    pub fn transformed(&self, m: &Mat4) -> Self {
        match self {
            Self::Sphere(s) => Self::Sphere(s.transformed(m)),
            Self::Box(b) => Self::Box(b.transformed(m)),
        }
    }
}

impl From<BoundingSphere> for BoundingVolume {
    fn from(s: BoundingSphere) -> Self {
        Self::Sphere(s)
    }
}

impl From<BoundingBox> for BoundingVolume {
    fn from(b: BoundingBox) -> Self {
        Self::Box(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_transform_scales_radius_by_largest_axis() {
        let s = BoundingSphere::new(Vec3::ZERO, 1.0);
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 3.0, 2.0),
            glam::Quat::IDENTITY,
            Vec3::new(5.0, 0.0, 0.0),
        );
        let t = s.transformed(&m);
        assert_eq!(t.center, Vec3::new(5.0, 0.0, 0.0));
        assert!((t.radius - 3.0).abs() < 1e-6);
    }

    #[test]
    fn box_transform_stays_axis_aligned() {
        let b = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let t = b.transformed(&m);
        let r = 2.0_f32.sqrt();
        assert!((t.max.x - r).abs() < 1e-5);
        assert!((t.min.z + r).abs() < 1e-5);
        assert!((t.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sphere_from_points_encloses_cube() {
        let cube = BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5));
        let s = BoundingSphere::from_points(cube.corners());
        assert_eq!(s.center, Vec3::ZERO);
        assert!((s.radius - 0.75_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn empty_points_give_no_box() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
        assert_eq!(BoundingSphere::from_points(std::iter::empty()).radius, 0.0);
    }
}
