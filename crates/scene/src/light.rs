use murex_common::Color;
use serde::{Deserialize, Serialize};

/// Uniform light applied to every surface regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Omnidirectional light emitted from the owning node's world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Cutoff distance; `0.0` means unlimited range.
    pub distance: f32,
    /// Falloff exponent applied to the light distance.
    pub decay: f32,
}

impl PointLight {
    /// Distance falloff factor at `light_distance` from the light.
    pub fn attenuation(&self, light_distance: f32) -> f32 {
        let mut falloff = 1.0 / light_distance.powf(self.decay).max(0.01);
        if self.distance > 0.0 {
            let ratio = (light_distance / self.distance).powi(4);
            falloff *= (1.0 - ratio).clamp(0.0, 1.0).powi(2);
        }
        falloff
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient(AmbientLight),
    Point(PointLight),
}
