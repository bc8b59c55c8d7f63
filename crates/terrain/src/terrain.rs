use glam::{UVec2, Vec2};
use vista_common::Color;

use crate::config::{TerrainConfig, TerrainError};
use crate::tile::{TerrainTile, TileCoord};

/// Fixed grid of tiles. Neighboring tiles share their edge samples, and the
/// world-space setters keep both copies in step.
#[derive(Debug)]
pub struct Terrain {
    config: TerrainConfig,
    tiles_x: u32,
    tiles_y: u32,
    tiles: Vec<TerrainTile>,
}

impl Terrain {
    pub fn new(config: TerrainConfig, tiles_x: u32, tiles_y: u32) -> Result<Self, TerrainError> {
        config.validate()?;
        if tiles_x == 0 || tiles_y == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "terrain needs at least one tile, got {tiles_x}x{tiles_y}"
            )));
        }
        let tiles = (0..tiles_y)
            .flat_map(|y| (0..tiles_x).map(move |x| TileCoord::new(x, y)))
            .map(|coord| TerrainTile::new(coord, config))
            .collect();
        tracing::info!(tiles_x, tiles_y, "terrain created");
        Ok(Self {
            config,
            tiles_x,
            tiles_y,
            tiles,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn dimensions(&self) -> UVec2 {
        UVec2::new(self.tiles_x, self.tiles_y)
    }

    /// World-space X/Z extent of the whole grid.
    pub fn extent(&self) -> Vec2 {
        self.config.tile_size * self.dimensions().as_vec2()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut TerrainTile> {
        self.index(coord).map(|i| &mut self.tiles[i])
    }

    pub fn tiles(&self) -> &[TerrainTile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [TerrainTile] {
        &mut self.tiles
    }

    /// Distance between neighboring samples on X and Z.
    pub fn sample_spacing(&self) -> Vec2 {
        self.config.tile_size / (self.config.vertex_count - UVec2::ONE).as_vec2()
    }

    /// Set the sample nearest to `world` (X/Z) in every tile that holds it.
    /// Returns how many tiles changed.
    pub fn set_height_world(&mut self, world: Vec2, height: f32) -> Result<usize, TerrainError> {
        let (gx, gy) = self.global_sample(world)?;
        let step = self.config.vertex_count - UVec2::ONE;
        let mut changed = 0;
        for tx in owners(gx, step.x, self.tiles_x) {
            for ty in owners(gy, step.y, self.tiles_y) {
                let (lx, ly) = (gx - tx * step.x, gy - ty * step.y);
                let i = (ty * self.tiles_x + tx) as usize;
                if self.tiles[i].set_height(lx, ly, height)? {
                    changed += 1;
                }
            }
        }
        tracing::trace!(x = world.x, z = world.y, height, changed, "set height");
        Ok(changed)
    }

    /// Paint the splat texel under `world` (X/Z). Returns whether it changed.
    pub fn paint_world(&mut self, world: Vec2, color: Color) -> Result<bool, TerrainError> {
        let (coord, local) = self.locate(world)?;
        let res = self.config.splat_resolution;
        let texel = (local / self.config.tile_size * res as f32).as_uvec2();
        let (tx, ty) = (texel.x.min(res - 1), texel.y.min(res - 1));
        let i = self.index_unchecked(coord);
        self.tiles[i].set_paint(tx, ty, color)
    }

    /// Bilinearly interpolated height at `world` (X/Z).
    pub fn height_at(&self, world: Vec2) -> Result<f32, TerrainError> {
        let (coord, local) = self.locate(world)?;
        let tile = &self.tiles[self.index_unchecked(coord)];
        let f = local / self.sample_spacing();
        let max = self.config.vertex_count - UVec2::ONE;
        let x0 = (f.x.floor() as u32).min(max.x - 1);
        let y0 = (f.y.floor() as u32).min(max.y - 1);
        let (tx, ty) = (f.x - x0 as f32, f.y - y0 as f32);

        let h00 = tile.height(x0, y0)?;
        let h10 = tile.height(x0 + 1, y0)?;
        let h01 = tile.height(x0, y0 + 1)?;
        let h11 = tile.height(x0 + 1, y0 + 1)?;
        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        Ok(top + (bottom - top) * ty)
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        (coord.x < self.tiles_x && coord.y < self.tiles_y).then(|| self.index_unchecked(coord))
    }

    fn index_unchecked(&self, coord: TileCoord) -> usize {
        (coord.y * self.tiles_x + coord.x) as usize
    }

    /// Tile containing `world` and the offset into it. Points on the far edge
    /// of the grid belong to the last tile.
    fn locate(&self, world: Vec2) -> Result<(TileCoord, Vec2), TerrainError> {
        let cell = (world / self.config.tile_size).floor();
        let out_of_range = || TerrainError::TileOutOfRange {
            x: cell.x as i64,
            y: cell.y as i64,
        };
        let extent = self.extent();
        if !world.is_finite()
            || world.x < 0.0
            || world.y < 0.0
            || world.x > extent.x
            || world.y > extent.y
        {
            return Err(out_of_range());
        }
        let coord = TileCoord::new(
            (cell.x as u32).min(self.tiles_x - 1),
            (cell.y as u32).min(self.tiles_y - 1),
        );
        let origin = Vec2::new(coord.x as f32, coord.y as f32) * self.config.tile_size;
        Ok((coord, world - origin))
    }

    fn global_sample(&self, world: Vec2) -> Result<(u32, u32), TerrainError> {
        self.locate(world)?;
        let g = (world / self.sample_spacing()).round().as_uvec2();
        let step = self.config.vertex_count - UVec2::ONE;
        Ok((
            g.x.min(step.x * self.tiles_x),
            g.y.min(step.y * self.tiles_y),
        ))
    }
}

/// Tiles along one axis whose samples include global sample `g`.
fn owners(g: u32, step: u32, tiles: u32) -> impl Iterator<Item = u32> {
    let last = (g / step).min(tiles - 1);
    let first = if g % step == 0 && g > 0 { g / step - 1 } else { last };
    first..=last
}
