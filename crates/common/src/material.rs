use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear-space RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub Vec3);

impl Color {
    pub const WHITE: Color = Color(Vec3::ONE);
    pub const BLACK: Color = Color(Vec3::ZERO);

    /// Decode a `0xRRGGBB` sRGB value into linear space.
    pub fn from_srgb_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self(Vec3::new(channel(16), channel(8), channel(0)))
    }

    pub fn rgb(&self) -> Vec3 {
        self.0
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        ((c * 0.947_867_3) + 0.052_132_7).powf(2.4)
    }
}

/// Blinn-Phong surface description shared by reference between meshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhongMaterial {
    pub color: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            specular: Color::from_srgb_hex(0x111111),
            shininess: 30.0,
        }
    }
}

impl PhongMaterial {
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_white_and_black() {
        assert!(Color::from_srgb_hex(0xffffff).rgb().abs_diff_eq(Vec3::ONE, 1e-6));
        assert_eq!(Color::from_srgb_hex(0x000000).rgb(), Vec3::ZERO);
    }

    #[test]
    fn hex_decodes_to_linear() {
        let c = Color::from_srgb_hex(0x808080).rgb();
        // sRGB 0.5 is roughly 0.2159 linear.
        assert!((c.x - 0.2159).abs() < 1e-3);
        assert_eq!(c.x, c.y);
    }

    #[test]
    fn default_material_is_white_phong() {
        let m = PhongMaterial::default();
        assert_eq!(m.color, Color::WHITE);
        assert_eq!(m.shininess, 30.0);
        assert!(m.specular.rgb().x < 0.01);
    }
}
