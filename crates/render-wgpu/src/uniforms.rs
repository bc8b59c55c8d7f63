use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use vista_device::{EffectKey, EffectKind, EffectParameters, LightParameters, MAX_BONES};

type Mat = [[f32; 4]; 4];

/// Per-draw uniform block. Field order and sizes mirror `DrawUniforms` in
/// the WGSL source; every member is 16-byte aligned so the layout needs no
/// padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DrawUniforms {
    pub world: Mat,
    pub world_view_projection: Mat,
    pub world_inverse_transpose: Mat,
    pub reflection_view_projection: Mat,
    pub diffuse: [f32; 4],
    pub clip_plane: [f32; 4],
    pub light_direction: [f32; 4],
    /// xyz position, w range. Only read for point lights.
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
    /// xy wave offset.
    pub water: [f32; 4],
    /// clip plane, texture, lit, bone count.
    pub flags: [u32; 4],
    /// effect kind, point light.
    pub mode: [u32; 4],
    pub bones: [Mat; MAX_BONES],
}

impl DrawUniforms {
    pub fn new(key: &EffectKey, params: &EffectParameters<'_>) -> Self {
        let mut u = Self::zeroed();
        u.world = params.world.to_cols_array_2d();
        u.world_view_projection = params.world_view_projection.to_cols_array_2d();
        u.world_inverse_transpose = params.world_inverse_transpose.to_cols_array_2d();
        u.reflection_view_projection = params
            .water
            .map_or(Mat4::IDENTITY, |w| w.reflection_view_projection)
            .to_cols_array_2d();
        u.diffuse = params.diffuse_color.to_array();
        if let Some(plane) = params.clip_plane {
            u.clip_plane = plane.to_array();
        }
        if let Some(water) = params.water {
            u.water = [water.wave_offset.x, water.wave_offset.y, 0.0, 0.0];
        }

        let bone_count = params.bones.len().min(MAX_BONES);
        if params.bones.len() > MAX_BONES {
            tracing::warn!(
                bones = params.bones.len(),
                max = MAX_BONES,
                "bone palette truncated"
            );
        }
        for (slot, bone) in u.bones.iter_mut().zip(params.bones) {
            *slot = bone.to_cols_array_2d();
        }

        u.flags = [
            (key.clip_plane && params.clip_plane.is_some()) as u32,
            (key.texture || params.water.is_some()) as u32,
            key.lit as u32,
            if key.is_skinned() { bone_count as u32 } else { 0 },
        ];
        u.mode = [kind_index(key.kind), 0, 0, 0];
        u
    }

    /// Bind one light for the next lit draw.
    pub fn set_light(&mut self, light: &LightParameters) {
        self.light_direction = light.direction.extend(0.0).to_array();
        self.light_color = light.color.to_array();
        match light.position {
            Some(position) => {
                self.light_position = position.extend(light.range).to_array();
                self.mode[1] = 1;
            }
            None => {
                self.light_position = [0.0; 4];
                self.mode[1] = 0;
            }
        }
    }
}

pub fn kind_index(kind: EffectKind) -> u32 {
    match kind {
        EffectKind::Basic => 0,
        EffectKind::Skybox => 1,
        EffectKind::Water => 2,
    }
}

/// Size of one draw's slot in the shared uniform buffer.
pub fn uniform_stride(alignment: u32) -> usize {
    let size = std::mem::size_of::<DrawUniforms>();
    let alignment = alignment.max(1) as usize;
    size.div_ceil(alignment) * alignment
}
