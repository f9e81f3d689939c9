/// WGSL shader for the Blinn-Phong scene pass.
///
/// Mirrors the software renderer: Lambert diffuse over pi, Schlick fresnel,
/// and a normalized Blinn-Phong lobe with a constant visibility term.
pub const SCENE_SHADER: &str = r#"
const MAX_POINT_LIGHTS: u32 = 4u;
const RECIPROCAL_PI: f32 = 0.3183098861837907;

struct PointLight {
    position: vec3<f32>,
    intensity: f32,
    color: vec3<f32>,
    distance: f32,
    decay: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

struct FrameUniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec3<f32>,
    light_count: u32,
    ambient: vec3<f32>,
    _pad: f32,
    lights: array<PointLight, MAX_POINT_LIGHTS>,
};

struct MeshUniforms {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    specular: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(1) @binding(0) var<uniform> mesh: MeshUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = mesh.model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = (mesh.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

fn attenuation(light: PointLight, d: f32) -> f32 {
    var falloff = 1.0 / max(pow(d, light.decay), 0.01);
    if light.distance > 0.0 {
        let ratio = pow(d / light.distance, 4.0);
        let window = clamp(1.0 - ratio, 0.0, 1.0);
        falloff = falloff * window * window;
    }
    return falloff;
}

fn blinn_phong(l: vec3<f32>, v: vec3<f32>, n: vec3<f32>, f0: vec3<f32>, shininess: f32) -> vec3<f32> {
    let h = normalize(l + v);
    let dot_nh = clamp(dot(n, h), 0.0, 1.0);
    let dot_vh = clamp(dot(v, h), 0.0, 1.0);
    let fresnel = f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - dot_vh, 5.0);
    let distribution = RECIPROCAL_PI * (0.5 * shininess + 1.0) * pow(dot_nh, shininess);
    return fresnel * (0.25 * distribution);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(frame.camera_position - in.world_position);
    let lambert = mesh.color.rgb * RECIPROCAL_PI;

    var diffuse = frame.ambient * lambert;
    var specular = vec3<f32>(0.0);
    for (var i = 0u; i < frame.light_count; i = i + 1u) {
        let light = frame.lights[i];
        let to_light = light.position - in.world_position;
        let d = length(to_light);
        if d <= 0.0 {
            continue;
        }
        let l = to_light / d;
        let radiance = light.color * light.intensity * attenuation(light, d);
        let irradiance = radiance * clamp(dot(n, l), 0.0, 1.0);
        diffuse += irradiance * lambert;
        specular += irradiance * blinn_phong(l, v, n, mesh.specular.rgb, mesh.color.a);
    }
    return vec4<f32>(diffuse + specular, 1.0);
}
"#;
