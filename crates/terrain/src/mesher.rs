use glam::{UVec2, Vec2, Vec3};
use vista_device::{MeshData, Vertex};

/// Two heights closer than this are considered equal.
pub const HEIGHT_EPSILON: f32 = 1e-4;

/// Where the samples of a height-field grid sit in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// World X/Z of sample (0, 0).
    pub origin: Vec2,
    pub size: Vec2,
    pub vertex_count: UVec2,
}

impl GridLayout {
    /// Normalized position of sample `(x, y)` across the grid.
    pub fn uv(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            x as f32 / (self.vertex_count.x - 1) as f32,
            y as f32 / (self.vertex_count.y - 1) as f32,
        )
    }

    /// World X/Z of sample `(x, y)`.
    pub fn position(&self, x: u32, y: u32) -> Vec2 {
        self.origin + self.uv(x, y) * self.size
    }
}

/// Source of height samples on a grid.
pub trait HeightField {
    fn sample(&self, x: u32, y: u32) -> f32;
}

/// Row-major stored samples.
#[derive(Debug, Clone, Copy)]
pub struct SampleGrid<'a> {
    pub heights: &'a [f32],
    pub width: u32,
}

impl HeightField for SampleGrid<'_> {
    fn sample(&self, x: u32, y: u32) -> f32 {
        self.heights[(y * self.width + x) as usize]
    }
}

/// Heights computed by a caller-supplied function of world X/Z.
pub struct ProceduralHeight<F> {
    layout: GridLayout,
    height: F,
}

impl<F: Fn(Vec2) -> f32> ProceduralHeight<F> {
    pub fn new(layout: GridLayout, height: F) -> Self {
        Self { layout, height }
    }
}

impl<F: Fn(Vec2) -> f32> HeightField for ProceduralHeight<F> {
    fn sample(&self, x: u32, y: u32) -> f32 {
        (self.height)(self.layout.position(x, y))
    }
}

/// True when every sample equals `height` within [`HEIGHT_EPSILON`].
pub fn is_flat(heights: &[f32], height: f32) -> bool {
    heights.iter().all(|h| (h - height).abs() <= HEIGHT_EPSILON)
}

/// Two triangles spanning the layout's footprint at a constant height.
pub fn build_flat_quad(layout: &GridLayout, height: f32) -> MeshData {
    let corner = |u: f32, v: f32| {
        let xz = layout.origin + Vec2::new(u, v) * layout.size;
        Vertex::new(Vec3::new(xz.x, height, xz.y), Vec3::Y, [u, v])
    };
    let top_left = corner(0.0, 0.0);
    let top_right = corner(1.0, 0.0);
    let bottom_left = corner(0.0, 1.0);
    let bottom_right = corner(1.0, 1.0);
    MeshData {
        vertices: vec![
            top_left,
            bottom_left,
            top_right,
            top_right,
            bottom_left,
            bottom_right,
        ],
        indices: (0..6).collect(),
        has_normals: true,
    }
}

/// Full `vertex_count.x * vertex_count.y` grid with central-difference normals.
pub fn build_height_field_mesh(layout: &GridLayout, field: &impl HeightField) -> MeshData {
    let (w, h) = (layout.vertex_count.x, layout.vertex_count.y);
    let mut vertices = Vec::with_capacity((w * h) as usize);

    for y in 0..h {
        for x in 0..w {
            let xz = layout.position(x, y);
            let height = field.sample(x, y);

            let west = field.sample(x.saturating_sub(1), y);
            let east = field.sample((x + 1).min(w - 1), y);
            let north = field.sample(x, y.saturating_sub(1));
            let south = field.sample(x, (y + 1).min(h - 1));
            // the 2 assumes one unit of height per unit of sample spacing
            let normal = Vec3::new(west - east, 2.0, north - south).normalize();

            let uv = layout.uv(x, y);
            vertices.push(Vertex::new(
                Vec3::new(xz.x, height, xz.y),
                normal,
                uv.to_array(),
            ));
        }
    }

    let mut indices = Vec::with_capacity(((w - 1) * (h - 1) * 6) as usize);
    for y in 0..h - 1 {
        for x in 0..w - 1 {
            let top_left = y * w + x;
            let top_right = top_left + 1;
            let bottom_left = (y + 1) * w + x;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    MeshData {
        vertices,
        indices,
        has_normals: true,
    }
}
