use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::bounds::{BoundingBox, BoundingSphere, BoundingVolume, Containment};

/// Plane `normal · p + d = 0`. Points with a non-negative distance are on the
/// kept side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    pub fn from_coefficients(v: Vec4) -> Self {
        Self {
            normal: v.truncate(),
            d: v.w,
        }
    }

    pub fn coefficients(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Evaluate against a homogeneous point.
    pub fn dot4(&self, point: Vec4) -> f32 {
        self.coefficients().dot(point)
    }

    pub fn normalized(&self) -> Self {
        let len = self.normal.length();
        if len == 0.0 {
            return *self;
        }
        Self {
            normal: self.normal / len,
            d: self.d / len,
        }
    }

    pub fn negated(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Move the plane into the space `m` maps points into.
    ///
    /// Planes transform by the inverse-transpose of the point transform, so a
    /// point `p` and its image `m * p` evaluate to the same signed value.
    pub fn transformed(&self, m: &Mat4) -> Self {
        Self::from_coefficients(m.inverse().transpose() * self.coefficients())
    }
}

/// Six planes bounding the visible volume, normals pointing inward.
/// Order: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract planes from a `projection * view` matrix with `[0, 1]` depth.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);
        let plane = |v: Vec4| Plane::from_coefficients(v).normalized();
        Self {
            planes: [
                plane(r3 + r0),
                plane(r3 - r0),
                plane(r3 + r1),
                plane(r3 - r1),
                plane(r2),
                plane(r3 - r2),
            ],
        }
    }

    pub fn classify_sphere(&self, sphere: &BoundingSphere) -> Containment {
        let mut result = Containment::Contains;
        for plane in &self.planes {
            let dist = plane.distance(sphere.center);
            if dist < -sphere.radius {
                return Containment::Disjoint;
            }
            if dist < sphere.radius {
                result = Containment::Intersects;
            }
        }
        result
    }

    pub fn classify_box(&self, aabb: &BoundingBox) -> Containment {
        let mut result = Containment::Contains;
        for plane in &self.planes {
            let n = plane.normal;
            // corner furthest along the normal, and the one opposite it
            let positive = Vec3::new(
                if n.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if n.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if n.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            let negative = Vec3::new(
                if n.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if n.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if n.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );
            if plane.distance(positive) < 0.0 {
                return Containment::Disjoint;
            }
            if plane.distance(negative) < 0.0 {
                result = Containment::Intersects;
            }
        }
        result
    }

    pub fn classify(&self, volume: &BoundingVolume) -> Containment {
        match volume {
            BoundingVolume::Sphere(s) => self.classify_sphere(s),
            BoundingVolume::Box(b) => self.classify_box(b),
        }
    }
}
