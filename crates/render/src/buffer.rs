use glam::{Vec2, Vec4};
use murex_common::Viewport;

/// Linear RGBA image in GL row order (row 0 is the bottom row).
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBuffer {
    viewport: Viewport,
    pixels: Vec<Vec4>,
}

impl ColorBuffer {
    /// A transparent-black buffer covering `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pixels: vec![Vec4::ZERO; viewport.pixel_count()],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> u32 {
        self.viewport.width()
    }

    pub fn height(&self) -> u32 {
        self.viewport.height()
    }

    /// `(width, height)` as floats, the value bound to `resolution` uniforms.
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    /// Reallocate for a new size. Contents are reset to transparent black.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.pixels.clear();
        self.pixels.resize(viewport.pixel_count(), Vec4::ZERO);
    }

    pub fn copy_from(&mut self, other: &ColorBuffer) {
        if self.viewport != other.viewport {
            self.viewport = other.viewport;
        }
        self.pixels.clone_from(&other.pixels);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }

    /// Panics if `(x, y)` is outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Vec4) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Nearest-texel lookup at normalized `uv`, clamped to the edges.
    pub fn sample_nearest(&self, uv: Vec2) -> Vec4 {
        let texel = |coord: f32, extent: u32| -> u32 {
            let t = (coord * extent as f32).floor();
            if t <= 0.0 {
                0
            } else {
                (t as u32).min(extent - 1)
            }
        };
        self.get(texel(uv.x, self.width()), texel(uv.y, self.height()))
    }

    /// 8-bit RGBA in top-down row order, ready for image encoders.
    ///
    /// Presented frames are opaque: alpha is written as 255 whatever the
    /// chain left in the buffer.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let width = self.width() as usize;
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.pixels.chunks_exact(width).rev() {
            for px in row {
                let c = px.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
                out.extend_from_slice(&[
                    c.x.round() as u8,
                    c.y.round() as u8,
                    c.z.round() as u8,
                    u8::MAX,
                ]);
            }
        }
        out
    }
}
