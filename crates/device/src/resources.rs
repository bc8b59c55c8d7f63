use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::device::GraphicsDevice;
use crate::mesh::{MeshData, TextureData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderTargetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// Any handle that can be queued for release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceId {
    Mesh(MeshId),
    Texture(TextureId),
    RenderTarget(RenderTargetId),
}

/// Handles whose owners were dropped and that the device has not freed yet.
///
/// Rendering is single-threaded, so the queue is shared through `Rc`.
#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue(Rc<RefCell<Vec<ResourceId>>>);

impl ReleaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, id: ResourceId) {
        self.0.borrow_mut().push(id);
    }

    pub fn drain(&self) -> Vec<ResourceId> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Uploaded geometry. Dropping it queues the GPU buffers for release.
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    vertex_count: u32,
    primitive_count: u32,
    has_normals: bool,
    releaser: ReleaseQueue,
}

impl Mesh {
    pub fn upload<D: GraphicsDevice + ?Sized>(device: &mut D, data: &MeshData) -> Self {
        Self {
            id: device.create_mesh(data),
            vertex_count: data.vertex_count(),
            primitive_count: data.primitive_count(),
            has_normals: data.has_normals,
            releaser: device.release_queue(),
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn primitive_count(&self) -> u32 {
        self.primitive_count
    }

    pub fn has_normals(&self) -> bool {
        self.has_normals
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        tracing::trace!(mesh = self.id.0, "queueing mesh release");
        self.releaser.push(ResourceId::Mesh(self.id));
    }
}

/// Uploaded RGBA8 texture. Dropping it queues the texture for release.
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    releaser: ReleaseQueue,
}

impl Texture {
    pub fn upload<D: GraphicsDevice + ?Sized>(device: &mut D, data: &TextureData) -> Self {
        Self {
            id: device.create_texture(data),
            width: data.width,
            height: data.height,
            releaser: device.release_queue(),
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        tracing::trace!(texture = self.id.0, "queueing texture release");
        self.releaser.push(ResourceId::Texture(self.id));
    }
}

/// Offscreen color + depth target.
#[derive(Debug)]
pub struct RenderTarget {
    id: RenderTargetId,
    width: u32,
    height: u32,
    releaser: ReleaseQueue,
}

impl RenderTarget {
    pub fn create<D: GraphicsDevice + ?Sized>(device: &mut D, width: u32, height: u32) -> Self {
        Self {
            id: device.create_render_target(width, height),
            width,
            height,
            releaser: device.release_queue(),
        }
    }

    pub fn id(&self) -> RenderTargetId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        self.releaser.push(ResourceId::RenderTarget(self.id));
    }
}
