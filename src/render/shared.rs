use bytemuck::{Pod, Zeroable};

use super::MAX_POINT_LIGHTS;

/// `w` of position/direction carries the active flag (1.0 or 0.0).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuDirectionalLight {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuPointLight {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// `direction.w` is the inner cutoff cosine, `ambient.w` the outer one.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuSpotLight {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// Per-frame state; `view_position.w` is the lighting toggle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub directional: GpuDirectionalLight,
    pub point_lights: [GpuPointLight; MAX_POINT_LIGHTS],
    pub spot: GpuSpotLight,
}

/// Per-draw state captured when a mesh is drawn.
///
/// `material_diffuse.w` holds shininess, `surface.xy` the UV scale and
/// `surface.z` the texture toggle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub material_diffuse: [f32; 4],
    pub material_specular: [f32; 4],
    pub surface: [f32; 4],
}

const POINT_LIGHT_COUNT: &str = "{POINT_LIGHT_COUNT}";

/// WGSL source with the point light count filled in.
pub(crate) fn shader_source() -> String {
    SHADER_TEMPLATE.replace(POINT_LIGHT_COUNT, &MAX_POINT_LIGHTS.to_string())
}

const SHADER_TEMPLATE: &str = r#"
struct DirectionalLight {
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct PointLight {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct SpotLight {
    position: vec4<f32>,
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct GlobalUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_position: vec4<f32>,
    directional: DirectionalLight,
    point_lights: array<PointLight, {POINT_LIGHT_COUNT}>,
    spot: SpotLight,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
    color: vec4<f32>,
    material_diffuse: vec4<f32>,
    material_specular: vec4<f32>,
    surface: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@group(2) @binding(0)
var object_texture: texture_2d<f32>;
@group(2) @binding(1)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct Surface {
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    base: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.projection * globals.view * world_position;
    out.world_pos = world_position.xyz;
    out.normal = normalize((object.normal * vec4<f32>(input.normal, 0.0)).xyz);
    out.uv = input.uv * object.surface.xy;
    return out;
}

fn phong(
    s: Surface,
    light_dir: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
) -> vec3<f32> {
    let diff = max(dot(s.normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, s.normal);
    let shininess = max(object.material_diffuse.w, 1.0);
    let spec = pow(max(dot(s.view_dir, reflect_dir), 0.0), shininess);
    return ambient * s.base
        + diffuse * diff * object.material_diffuse.rgb * s.base
        + specular * spec * object.material_specular.rgb;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(object_texture, object_sampler, input.uv);
    let base = select(object.color, sampled, object.surface.z > 0.5);
    if (globals.view_position.w < 0.5) {
        return base;
    }

    var s: Surface;
    s.normal = normalize(input.normal);
    s.view_dir = normalize(globals.view_position.xyz - input.world_pos);
    s.base = base.rgb;

    var lit = vec3<f32>(0.0);
    let sun = globals.directional;
    if (sun.direction.w > 0.5) {
        lit += phong(s, normalize(-sun.direction.xyz), sun.ambient.rgb, sun.diffuse.rgb, sun.specular.rgb);
    }
    for (var i = 0u; i < {POINT_LIGHT_COUNT}u; i++) {
        let point = globals.point_lights[i];
        if (point.position.w > 0.5) {
            let dir = normalize(point.position.xyz - input.world_pos);
            lit += phong(s, dir, point.ambient.rgb, point.diffuse.rgb, point.specular.rgb);
        }
    }
    let spot = globals.spot;
    if (spot.position.w > 0.5) {
        let dir = normalize(spot.position.xyz - input.world_pos);
        let theta = dot(dir, normalize(-spot.direction.xyz));
        let epsilon = max(spot.direction.w - spot.ambient.w, 0.0001);
        let intensity = clamp((theta - spot.ambient.w) / epsilon, 0.0, 1.0);
        let contribution = phong(s, dir, vec3<f32>(0.0), spot.diffuse.rgb, spot.specular.rgb);
        lit += spot.ambient.rgb * s.base + contribution * intensity;
    }
    return vec4<f32>(lit, base.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_structs_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<GpuPointLight>() % 16, 0);
        assert_eq!(std::mem::size_of::<GpuSpotLight>() % 16, 0);
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectConstants>() % 16, 0);
    }

    #[test]
    fn shader_sizes_point_lights_from_the_shared_count() {
        let source = shader_source();
        assert!(!source.contains(POINT_LIGHT_COUNT));
        assert!(source.contains(&format!("array<PointLight, {MAX_POINT_LIGHTS}>")));
        assert!(source.contains(&format!("i < {MAX_POINT_LIGHTS}u;")));
        assert_eq!(
            std::mem::size_of::<GlobalUniform>(),
            std::mem::size_of::<[[f32; 4]; 4]>() * 2
                + 16
                + std::mem::size_of::<GpuDirectionalLight>()
                + std::mem::size_of::<GpuPointLight>() * MAX_POINT_LIGHTS
                + std::mem::size_of::<GpuSpotLight>()
        );
    }
}
