//! WGSL sources for the post passes.
//!
//! Bind group 0 is shared by every pass: binding 0 is the input texture,
//! binding 1 the packed non-texture uniforms. Fragment stages read the
//! input with `textureLoad` and convert to bottom-left pixel coordinates
//! so they match the CPU programs texel for texel.

/// Full-screen triangle. `uv` has its origin at the bottom-left.
pub const FULLSCREEN_VERTEX: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: VertexOutput;
    out.position = vec4<f32>(x * 2.0 - 1.0, y * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

@group(0) @binding(0) var t_diffuse: texture_2d<f32>;

fn load_gl(cell: vec2<i32>) -> vec4<f32> {
    let dims = vec2<i32>(textureDimensions(t_diffuse));
    let c = clamp(cell, vec2<i32>(0), dims - vec2<i32>(1));
    return textureLoad(t_diffuse, vec2<i32>(c.x, dims.y - 1 - c.y), 0);
}

fn sample_nearest(uv: vec2<f32>) -> vec4<f32> {
    let dims = vec2<f32>(textureDimensions(t_diffuse));
    return load_gl(vec2<i32>(floor(uv * dims)));
}
"#;

pub const DOT_SCREEN_FRAGMENT: &str = r#"
struct DotUniforms {
    spacing: f32,
    size: f32,
    resolution: vec2<f32>,
    aspect_ratio: f32,
};

@group(0) @binding(1) var<uniform> params: DotUniforms;

fn gl_mod(x: vec2<f32>, y: f32) -> vec2<f32> {
    return x - y * floor(x / y);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let count = params.resolution / params.spacing;
    let cell = floor(in.uv * count) / count;
    let color = sample_nearest(cell);

    let frag = vec2<f32>(in.position.x, params.resolution.y - in.position.y);
    let pos = gl_mod(frag, params.spacing) - vec2<f32>(params.spacing / 2.0);
    if dot(pos, pos) > params.size {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }
    return color;
}
"#;

/// The lowest band discards, so the attachment must be loaded, not cleared.
pub const POSTERIZE_FRAGMENT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let g = sample_nearest(in.uv).g;
    if g >= 0.75 {
        return vec4<f32>(0.1, 0.9, 0.86, 1.0);
    }
    if g >= 0.4 {
        return vec4<f32>(0.1, 0.5, 0.1, 1.0);
    }
    if g > 0.064 {
        return vec4<f32>(0.28, 0.08, 0.08, 0.1);
    }
    discard;
    return vec4<f32>(0.0);
}
"#;

pub const GAMMA_FRAGMENT: &str = r#"
fn linear_to_srgb(c: vec3<f32>) -> vec3<f32> {
    let low = c * 12.92;
    let high = 1.055 * pow(c, vec3<f32>(1.0 / 2.4)) - vec3<f32>(0.055);
    return select(high, low, c <= vec3<f32>(0.0031308));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let c = sample_nearest(in.uv);
    return vec4<f32>(linear_to_srgb(c.rgb), c.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fragment_has_entry_point() {
        for src in [DOT_SCREEN_FRAGMENT, POSTERIZE_FRAGMENT, GAMMA_FRAGMENT] {
            assert!(src.contains("fn fs_main"));
        }
        assert!(FULLSCREEN_VERTEX.contains("fn vs_main"));
    }

    #[test]
    fn posterize_low_band_discards() {
        assert!(POSTERIZE_FRAGMENT.contains("discard"));
    }
}
