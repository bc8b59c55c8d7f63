use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use vista_common::{BoundingBox, Color};
use vista_device::{GraphicsDevice, Mesh, MeshData, Texture, TextureData};

use crate::config::{TerrainConfig, TerrainError};
use crate::mesher::{
    GridLayout, HEIGHT_EPSILON, SampleGrid, build_flat_quad, build_height_field_mesh, is_flat,
};

/// Position of a tile in the terrain grid (X along world X, Y along world Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Mutable inputs of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileField {
    Height,
    Paint,
}

/// Artifacts a tile derives lazily from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileCache {
    Mesh,
    SplatTexture,
}

impl TileCache {
    fn index(self) -> usize {
        match self {
            TileCache::Mesh => 0,
            TileCache::SplatTexture => 1,
        }
    }
}

impl TileField {
    /// Which caches a change to this field makes stale.
    pub const fn invalidates(self) -> &'static [TileCache] {
        match self {
            TileField::Height => &[TileCache::Mesh],
            TileField::Paint => &[TileCache::SplatTexture],
        }
    }
}

/// Uploaded tile geometry plus what the renderer needs to cull it.
#[derive(Debug)]
pub struct TileMesh {
    pub mesh: Mesh,
    pub bounds: BoundingBox,
    /// Built as the degenerate two-triangle quad.
    pub flat: bool,
}

/// One cell of the terrain grid: heights, paint and their lazily built GPU forms.
#[derive(Debug)]
pub struct TerrainTile {
    coord: TileCoord,
    config: TerrainConfig,
    heights: Vec<f32>,
    paint: Vec<Color>,
    mesh: Option<TileMesh>,
    splat: Option<Texture>,
    invalidations: [u64; 2],
}

impl TerrainTile {
    pub fn new(coord: TileCoord, config: TerrainConfig) -> Self {
        Self {
            coord,
            config,
            heights: vec![config.default_height; config.samples_per_tile()],
            paint: vec![Color::TRANSPARENT; config.texels_per_tile()],
            mesh: None,
            splat: None,
            invalidations: [0; 2],
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout {
            origin: Vec2::new(
                self.coord.x as f32 * self.config.tile_size.x,
                self.coord.y as f32 * self.config.tile_size.y,
            ),
            size: self.config.tile_size,
            vertex_count: self.config.vertex_count,
        }
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn height(&self, x: u32, y: u32) -> Result<f32, TerrainError> {
        let i = self.sample_index(x, y)?;
        Ok(self.heights[i])
    }

    /// Store a clamped height. Returns whether the stored value changed; only
    /// a change invalidates the mesh. Non-finite values are ignored.
    pub fn set_height(&mut self, x: u32, y: u32, value: f32) -> Result<bool, TerrainError> {
        let i = self.sample_index(x, y)?;
        if !value.is_finite() {
            tracing::warn!(x, y, value, "non-finite height ignored");
            return Ok(false);
        }
        let clamped = value.clamp(self.config.min_height, self.config.max_height);
        if (self.heights[i] - clamped).abs() <= HEIGHT_EPSILON {
            return Ok(false);
        }
        self.heights[i] = clamped;
        self.invalidate(TileField::Height);
        Ok(true)
    }

    pub fn paint(&self, x: u32, y: u32) -> Result<Color, TerrainError> {
        let i = self.texel_index(x, y)?;
        Ok(self.paint[i])
    }

    /// Store a splat color. Returns whether it differed from the stored one.
    pub fn set_paint(&mut self, x: u32, y: u32, color: Color) -> Result<bool, TerrainError> {
        let i = self.texel_index(x, y)?;
        if self.paint[i] == color {
            return Ok(false);
        }
        self.paint[i] = color;
        self.invalidate(TileField::Paint);
        Ok(true)
    }

    /// Drop every cache `field` feeds. Dropping queues the GPU handles for release.
    pub fn invalidate(&mut self, field: TileField) {
        for cache in field.invalidates() {
            let released = match cache {
                TileCache::Mesh => self.mesh.take().is_some(),
                TileCache::SplatTexture => self.splat.take().is_some(),
            };
            self.invalidations[cache.index()] += 1;
            tracing::trace!(tile = ?self.coord, ?cache, released, "tile cache invalidated");
        }
    }

    /// How many times `cache` has been invalidated.
    pub fn invalidation_count(&self, cache: TileCache) -> u64 {
        self.invalidations[cache.index()]
    }

    pub fn is_cached(&self, cache: TileCache) -> bool {
        match cache {
            TileCache::Mesh => self.mesh.is_some(),
            TileCache::SplatTexture => self.splat.is_some(),
        }
    }

    pub fn is_flat(&self) -> bool {
        is_flat(&self.heights, self.config.default_height)
    }

    /// Geometry for the current heights, without touching the GPU.
    pub fn build_mesh_data(&self) -> MeshData {
        let layout = self.layout();
        if self.is_flat() {
            build_flat_quad(&layout, self.config.default_height)
        } else {
            build_height_field_mesh(
                &layout,
                &SampleGrid {
                    heights: &self.heights,
                    width: self.config.vertex_count.x,
                },
            )
        }
    }

    /// The tile mesh, built and uploaded on first access after invalidation.
    pub fn mesh<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> &TileMesh {
        let mesh = match self.mesh.take() {
            Some(mesh) => mesh,
            None => self.upload_mesh(device),
        };
        self.mesh.insert(mesh)
    }

    fn upload_mesh<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> TileMesh {
        let flat = self.is_flat();
        let data = self.build_mesh_data();
        let bounds = data.bounding_box().unwrap_or_else(|| {
            let o = self.layout().origin;
            let corner = Vec3::new(o.x, self.config.default_height, o.y);
            BoundingBox::new(corner, corner)
        });
        tracing::debug!(
            tile = ?self.coord,
            flat,
            vertices = data.vertex_count(),
            "building terrain tile mesh"
        );
        TileMesh {
            mesh: Mesh::upload(device, &data),
            bounds,
            flat,
        }
    }

    pub fn splat_texture_data(&self) -> TextureData {
        TextureData {
            width: self.config.splat_resolution,
            height: self.config.splat_resolution,
            pixels: self.paint.iter().map(|c| c.to_rgba8()).collect(),
        }
    }

    /// The splat texture, synthesized from the paint colors on first access
    /// after invalidation.
    pub fn splat_texture<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> &Texture {
        let texture = match self.splat.take() {
            Some(texture) => texture,
            None => {
                tracing::debug!(tile = ?self.coord, "synthesizing splat texture");
                Texture::upload(device, &self.splat_texture_data())
            }
        };
        self.splat.insert(texture)
    }

    fn sample_index(&self, x: u32, y: u32) -> Result<usize, TerrainError> {
        let vc = self.config.vertex_count;
        if x >= vc.x || y >= vc.y {
            return Err(TerrainError::SampleOutOfRange { x, y });
        }
        Ok((y * vc.x + x) as usize)
    }

    fn texel_index(&self, x: u32, y: u32) -> Result<usize, TerrainError> {
        let res = self.config.splat_resolution;
        if x >= res || y >= res {
            return Err(TerrainError::SampleOutOfRange { x, y });
        }
        Ok((y * res + x) as usize)
    }
}
