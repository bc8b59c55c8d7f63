use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use vista_common::{BoundingBox, BoundingSphere};

/// Vertex layout shared by every mesh. Unskinned vertices leave the bone
/// weights at zero.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub bone_indices: [u32; 4],
    pub bone_weights: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// CPU-side geometry handed to [`crate::GraphicsDevice::create_mesh`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    /// Triangle list.
    pub indices: Vec<u32>,
    pub has_normals: bool,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn primitive_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_points(self.vertices.iter().map(Vertex::position))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(Vertex::position))
    }

    /// Eight-corner cube of edge `size` centred on the origin. Normals point
    /// away from the centre.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let corners = [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let vertices = corners
            .iter()
            .map(|&p| {
                let uv = [(p.x / size) + 0.5, (p.y / size) + 0.5];
                Vertex::new(p, p.normalize_or_zero(), uv)
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 6, 7, 4, // +Z
            1, 0, 3, 3, 2, 1, // -Z
            5, 1, 2, 2, 6, 5, // +X
            0, 4, 7, 7, 3, 0, // -X
            7, 6, 2, 2, 3, 7, // +Y
            0, 1, 5, 5, 4, 0, // -Y
        ];
        Self {
            vertices,
            indices,
            has_normals: true,
        }
    }

    /// Unit quad in the XZ plane centred on the origin, facing +Y.
    pub fn quad() -> Self {
        let vertices = vec![
            Vertex::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::Y, [0.0, 0.0]),
            Vertex::new(Vec3::new(0.5, 0.0, -0.5), Vec3::Y, [1.0, 0.0]),
            Vertex::new(Vec3::new(-0.5, 0.0, 0.5), Vec3::Y, [0.0, 1.0]),
            Vertex::new(Vec3::new(0.5, 0.0, 0.5), Vec3::Y, [1.0, 1.0]),
        ];
        Self {
            vertices,
            indices: vec![0, 2, 1, 1, 2, 3],
            has_normals: true,
        }
    }
}

/// RGBA8 pixels, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl TextureData {
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }
}
