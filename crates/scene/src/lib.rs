//! Scene graph and scene aggregate.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and refer to each other by
//! [`NodeId`]. Mesh parts hold their GPU meshes; bones refer back to the nodes
//! that animate them by id only.
//!
//! # Invariants
//! - The node tree is acyclic; construction and reparenting cannot create cycles.
//! - A node's absolute transform is `parent.absolute * local`, valid only
//!   after [`SceneGraph::update_absolute_transforms`] for the current frame.
//! - A bone's world transform is `node.absolute * bone.offset`, resolved at
//!   draw time.
//! - A material's effect binding is dropped whenever a permutation-selecting
//!   field changes (see [`MaterialField::invalidates`]).

mod camera;
mod graph;
mod inspector;
mod light;
mod model;
mod scene;

pub use camera::Camera;
pub use graph::{Node, NodeId, NodeKind, SceneError, SceneGraph};
pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use light::{DirectLight, Light, PointLight};
pub use model::{Billboard, Bone, EffectBinding, Material, MaterialCache, MaterialField, MeshPart};
pub use scene::{Scene, Skybox, WaterTile};

pub fn crate_info() -> &'static str {
    "vista-scene v0.1.0"
}
