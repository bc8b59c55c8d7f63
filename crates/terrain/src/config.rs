use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Errors from terrain construction and sample access.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TerrainError {
    #[error("tile ({x}, {y}) is outside the terrain grid")]
    TileOutOfRange { x: i64, y: i64 },
    #[error("sample ({x}, {y}) is outside the tile")]
    SampleOutOfRange { x: u32, y: u32 },
    #[error("invalid terrain config: {0}")]
    InvalidConfig(String),
}

/// Per-tile layout and height limits shared by every tile of a terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// World-space footprint of one tile on X and Z.
    pub tile_size: Vec2,
    /// Height samples per tile along X and Z, edges included.
    pub vertex_count: UVec2,
    /// Width and height of each tile's splat texture.
    pub splat_resolution: u32,
    pub min_height: f32,
    pub max_height: f32,
    pub default_height: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size: Vec2::splat(64.0),
            vertex_count: UVec2::splat(33),
            splat_resolution: 64,
            min_height: -64.0,
            max_height: 256.0,
            default_height: 0.0,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.vertex_count.x < 2 || self.vertex_count.y < 2 {
            return Err(TerrainError::InvalidConfig(format!(
                "vertex_count must be at least 2x2, got {}x{}",
                self.vertex_count.x, self.vertex_count.y
            )));
        }
        if self.tile_size.x <= 0.0 || self.tile_size.y <= 0.0 {
            return Err(TerrainError::InvalidConfig(
                "tile_size must be positive".into(),
            ));
        }
        if self.splat_resolution == 0 {
            return Err(TerrainError::InvalidConfig(
                "splat_resolution must be positive".into(),
            ));
        }
        if !(self.min_height <= self.default_height && self.default_height <= self.max_height) {
            return Err(TerrainError::InvalidConfig(format!(
                "default height {} outside [{}, {}]",
                self.default_height, self.min_height, self.max_height
            )));
        }
        Ok(())
    }

    pub fn samples_per_tile(&self) -> usize {
        (self.vertex_count.x * self.vertex_count.y) as usize
    }

    pub fn texels_per_tile(&self) -> usize {
        (self.splat_resolution * self.splat_resolution) as usize
    }
}
