//! Shared value types for the vista renderer.
//!
//! # Invariants
//! - All matrices use glam's column-vector convention: a child's world transform
//!   is `parent_world * local`.
//! - Plane coefficients keep a point when `dot(plane, point) >= 0`.

mod bounds;
mod frustum;
mod types;

pub use bounds::{BoundingBox, BoundingSphere, BoundingVolume, Containment};
pub use frustum::{Frustum, Plane};
pub use types::{Color, Transform};

pub fn crate_info() -> &'static str {
    "vista-common v0.1.0"
}
