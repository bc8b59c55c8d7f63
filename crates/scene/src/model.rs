use std::rc::Rc;

use glam::{Mat4, Vec2};
use vista_common::{BoundingVolume, Color};
use vista_device::{EffectId, EffectKey, GraphicsDevice, MAX_BONES, Mesh, MeshData, Texture};

use crate::graph::NodeId;

/// Binds a mesh part to the node that animates it. The node is looked up at
/// draw time; bones never own nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Bind-pose offset from mesh space into the bone's space.
    pub offset: Mat4,
    pub node: NodeId,
}

impl Bone {
    pub fn new(node: NodeId, offset: Mat4) -> Self {
        Self { offset, node }
    }
}

/// Material inputs that can change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialField {
    DiffuseColor,
    Texture,
    Lighting,
    Skinning,
}

/// Artifacts a material derives from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialCache {
    EffectBinding,
}

impl MaterialField {
    /// Which caches a change to this field makes stale. Only fields that pick
    /// the shader permutation touch the effect binding.
    pub const fn invalidates(self) -> &'static [MaterialCache] {
        match self {
            MaterialField::DiffuseColor => &[],
            MaterialField::Texture | MaterialField::Lighting | MaterialField::Skinning => {
                &[MaterialCache::EffectBinding]
            }
        }
    }
}

/// Effect a material last resolved, with the permutation it was resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectBinding {
    pub key: EffectKey,
    pub effect: EffectId,
}

/// Surface parameters of a mesh part.
#[derive(Debug, Clone)]
pub struct Material {
    diffuse_color: Color,
    texture: Option<Rc<Texture>>,
    lighting_enabled: bool,
    skinned: bool,
    binding: Option<EffectBinding>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: Color::WHITE,
            texture: None,
            lighting_enabled: true,
            skinned: false,
            binding: None,
        }
    }
}

impl Material {
    pub fn new(diffuse_color: Color) -> Self {
        Self {
            diffuse_color,
            ..Self::default()
        }
    }

    pub fn diffuse_color(&self) -> Color {
        self.diffuse_color
    }

    pub fn texture(&self) -> Option<&Rc<Texture>> {
        self.texture.as_ref()
    }

    pub fn lighting_enabled(&self) -> bool {
        self.lighting_enabled
    }

    pub fn skinned(&self) -> bool {
        self.skinned
    }

    pub fn binding(&self) -> Option<EffectBinding> {
        self.binding
    }

    pub fn set_diffuse_color(&mut self, color: Color) {
        if self.diffuse_color != color {
            self.diffuse_color = color;
            self.invalidate(MaterialField::DiffuseColor);
        }
    }

    pub fn set_texture(&mut self, texture: Option<Rc<Texture>>) {
        let had = self.texture.is_some();
        self.texture = texture;
        if had != self.texture.is_some() {
            self.invalidate(MaterialField::Texture);
        }
    }

    pub fn set_lighting_enabled(&mut self, enabled: bool) {
        if self.lighting_enabled != enabled {
            self.lighting_enabled = enabled;
            self.invalidate(MaterialField::Lighting);
        }
    }

    pub fn set_skinned(&mut self, skinned: bool) {
        if self.skinned != skinned {
            self.skinned = skinned;
            self.invalidate(MaterialField::Skinning);
        }
    }

    pub fn invalidate(&mut self, field: MaterialField) {
        for cache in field.invalidates() {
            match cache {
                MaterialCache::EffectBinding => {
                    if self.binding.take().is_some() {
                        tracing::trace!(?field, "material effect binding invalidated");
                    }
                }
            }
        }
    }

    /// Effect for `key`, resolving through `resolve` when the cached binding
    /// is missing or was made for another permutation.
    pub fn bind_effect(
        &mut self,
        key: EffectKey,
        resolve: impl FnOnce(EffectKey) -> EffectId,
    ) -> EffectId {
        match self.binding {
            Some(binding) if binding.key == key => binding.effect,
            _ => {
                let effect = resolve(key);
                self.binding = Some(EffectBinding { key, effect });
                effect
            }
        }
    }
}

/// A mesh with its material, attached to a node.
#[derive(Debug, Clone)]
pub struct MeshPart {
    /// `None` while the geometry is not available; such parts are skipped.
    pub mesh: Option<Rc<Mesh>>,
    /// Transform from part space into node space.
    pub offset: Mat4,
    /// Bounds in part space.
    pub bounds: BoundingVolume,
    pub material: Material,
    bones: Vec<Bone>,
}

impl MeshPart {
    pub fn new(mesh: Rc<Mesh>, bounds: impl Into<BoundingVolume>, material: Material) -> Self {
        Self {
            mesh: Some(mesh),
            offset: Mat4::IDENTITY,
            bounds: bounds.into(),
            material,
            bones: Vec::new(),
        }
    }

    /// Upload `data` and bound it with a sphere around its vertices.
    pub fn from_data<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        data: &MeshData,
        material: Material,
    ) -> Self {
        Self::new(
            Rc::new(Mesh::upload(device, data)),
            data.bounding_sphere(),
            material,
        )
    }

    pub fn with_offset(mut self, offset: Mat4) -> Self {
        self.offset = offset;
        self
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Replace the bone list. Palettes longer than [`MAX_BONES`] are truncated.
    pub fn set_bones(&mut self, mut bones: Vec<Bone>) {
        if bones.len() > MAX_BONES {
            tracing::warn!(
                bones = bones.len(),
                max = MAX_BONES,
                "bone palette truncated"
            );
            bones.truncate(MAX_BONES);
        }
        self.material.set_skinned(!bones.is_empty());
        self.bones = bones;
    }

    pub fn with_bones(mut self, bones: Vec<Bone>) -> Self {
        self.set_bones(bones);
        self
    }

    pub fn is_skinned(&self) -> bool {
        !self.bones.is_empty()
    }

    pub(crate) fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }
}

/// Camera-facing quad centred on its node.
#[derive(Debug, Clone)]
pub struct Billboard {
    pub part: MeshPart,
    pub size: Vec2,
}

impl Billboard {
    pub fn new<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        size: Vec2,
        material: Material,
    ) -> Self {
        // quad() lies in XZ facing +Y; stand it up to face +Z
        let part = MeshPart::from_data(device, &MeshData::quad(), material)
            .with_offset(Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2));
        Self { part, size }
    }
}
