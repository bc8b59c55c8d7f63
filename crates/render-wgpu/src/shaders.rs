/// WGSL source for every effect permutation.
///
/// One module serves all permutations; `flags` and `mode` in the per-draw
/// uniform block select clip discard, texturing, lighting, skinning and the
/// effect kind. Texture slots always hold a valid view (a white texel when
/// unused) so sampling stays in uniform control flow.
pub const EFFECT_SHADER: &str = r#"
struct DrawUniforms {
    world: mat4x4<f32>,
    world_view_projection: mat4x4<f32>,
    world_inverse_transpose: mat4x4<f32>,
    reflection_view_projection: mat4x4<f32>,
    diffuse: vec4<f32>,
    clip_plane: vec4<f32>,
    light_direction: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    water: vec4<f32>,
    flags: vec4<u32>,
    mode: vec4<u32>,
    bones: array<mat4x4<f32>, 64>,
};

@group(0) @binding(0)
var<uniform> u: DrawUniforms;

@group(1) @binding(0)
var primary_texture: texture_2d<f32>;
@group(1) @binding(1)
var secondary_texture: texture_2d<f32>;
@group(1) @binding(2)
var surface_sampler: sampler;

const KIND_WATER: u32 = 2u;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) bone_indices: vec4<u32>,
    @location(4) bone_weights: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) clip_distance: f32,
    @location(4) screen: vec4<f32>,
};

fn skin_matrix(vertex: VertexInput) -> mat4x4<f32> {
    var m = mat4x4<f32>();
    for (var i = 0u; i < 4u; i++) {
        let bone = min(vertex.bone_indices[i], u.flags.w - 1u);
        m += u.bones[bone] * vertex.bone_weights[i];
    }
    return m;
}

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var local = vec4<f32>(vertex.position, 1.0);
    var normal = vec4<f32>(vertex.normal, 0.0);
    if (u.flags.w > 0u) {
        let skin = skin_matrix(vertex);
        local = skin * local;
        normal = skin * normal;
    }

    var out: VertexOutput;
    out.clip_position = u.world_view_projection * local;
    out.world_position = (u.world * local).xyz;
    out.world_normal = (u.world_inverse_transpose * normal).xyz;
    out.uv = vertex.uv;
    out.clip_distance = dot(u.clip_plane, out.clip_position);
    out.screen = out.clip_position;
    return out;
}

fn to_texture_space(clip: vec4<f32>) -> vec2<f32> {
    let ndc = clip.xy / clip.w;
    return vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
}

fn light_term(normal: vec3<f32>, position: vec3<f32>) -> vec3<f32> {
    if (u.flags.z == 0u) {
        return vec3<f32>(1.0);
    }
    var to_light = -u.light_direction.xyz;
    var attenuation = 1.0;
    if (u.mode.y == 1u) {
        let offset = u.light_position.xyz - position;
        let dist = length(offset);
        to_light = offset / max(dist, 0.0001);
        attenuation = clamp(1.0 - dist / max(u.light_position.w, 0.0001), 0.0, 1.0);
    }
    let n_dot_l = max(dot(normalize(normal), normalize(to_light)), 0.0);
    return u.light_color.rgb * n_dot_l * attenuation;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let is_water = u.mode.x == KIND_WATER;
    let ripple = vec2<f32>(
        sin((in.uv.x + u.water.x) * 40.0),
        cos((in.uv.y + u.water.y) * 40.0),
    ) * 0.005;
    let refraction_uv = to_texture_space(in.screen) + ripple;
    let reflection_uv = to_texture_space(
        u.reflection_view_projection * vec4<f32>(in.world_position, 1.0),
    ) + ripple;

    let primary = textureSample(primary_texture, surface_sampler, select(in.uv, refraction_uv, is_water));
    let secondary = textureSample(secondary_texture, surface_sampler, reflection_uv);

    if (u.flags.x == 1u && in.clip_distance < 0.0) {
        discard;
    }

    if (is_water) {
        let surface = mix(primary.rgb, secondary.rgb, 0.5) * u.diffuse.rgb;
        return vec4<f32>(surface, 1.0);
    }

    var color = u.diffuse;
    if (u.flags.y == 1u) {
        color = color * primary;
    }
    return vec4<f32>(color.rgb * light_term(in.world_normal, in.world_position), color.a);
}
"#;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
