//! Terrain: a fixed grid of height-field tiles meshed lazily for the renderer.
//!
//! # Invariants
//! - A tile's mesh and splat texture are rebuilt only after a setter actually
//!   changed the data they derive from (see [`TileField::invalidates`]).
//! - Heights are clamped to `[min_height, max_height]`; writes never fail on value.
//! - A tile whose samples all equal the default height meshes to a two-triangle quad.
//! - Superseded meshes and textures are dropped at invalidation time, which
//!   queues their GPU handles for release.

mod config;
mod mesher;
mod terrain;
mod tile;

pub use config::{TerrainConfig, TerrainError};
pub use mesher::{
    GridLayout, HEIGHT_EPSILON, HeightField, ProceduralHeight, SampleGrid, build_flat_quad,
    build_height_field_mesh, is_flat,
};
pub use terrain::Terrain;
pub use tile::{TerrainTile, TileCache, TileCoord, TileField, TileMesh};

pub fn crate_info() -> &'static str {
    "vista-terrain v0.1.0"
}
