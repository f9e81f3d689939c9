use glam::Vec2;
use thiserror::Error;

/// Name of the texture uniform every shader pass samples its input from.
pub const INPUT_UNIFORM: &str = "tDiffuse";

/// One of the composer's two ping-pong buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    /// Texture binding; `None` until the composer binds an input.
    Texture(Option<TargetId>),
}

impl UniformValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "f32",
            Self::Vec2(_) => "vec2",
            Self::Texture(_) => "texture",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PassError {
    #[error("pass `{pass}`: input texture is not bound to the read buffer")]
    UnboundInput { pass: String },
    #[error("pass `{pass}`: input is {input:?} but output is {output:?}")]
    SizeMismatch {
        pass: String,
        input: (u32, u32),
        output: (u32, u32),
    },
    #[error("unknown uniform `{0}`")]
    UnknownUniform(String),
    #[error("uniform `{name}` is {actual}, expected {expected}")]
    UniformType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Uniform values in declaration order.
///
/// The order is the GPU buffer packing order; names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms {
    entries: Vec<(String, UniformValue)>,
}

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a uniform. Re-declaring a name replaces its value in place.
    pub fn with(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Overwrite a declared uniform. The value kind must match the declaration.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), PassError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| PassError::UnknownUniform(name.to_string()))?;
        if std::mem::discriminant(&slot.1) != std::mem::discriminant(&value) {
            return Err(PassError::UniformType {
                name: name.to_string(),
                expected: slot.1.kind(),
                actual: value.kind(),
            });
        }
        slot.1 = value;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&UniformValue, PassError> {
        self.get(name)
            .ok_or_else(|| PassError::UnknownUniform(name.to_string()))
    }

    fn mismatch(name: &str, expected: &'static str, actual: &UniformValue) -> PassError {
        PassError::UniformType {
            name: name.to_string(),
            expected,
            actual: actual.kind(),
        }
    }

    pub fn float(&self, name: &str) -> Result<f32, PassError> {
        match self.lookup(name)? {
            UniformValue::Float(v) => Ok(*v),
            other => Err(Self::mismatch(name, "f32", other)),
        }
    }

    pub fn vec2(&self, name: &str) -> Result<Vec2, PassError> {
        match self.lookup(name)? {
            UniformValue::Vec2(v) => Ok(*v),
            other => Err(Self::mismatch(name, "vec2", other)),
        }
    }

    pub fn texture(&self, name: &str) -> Result<Option<TargetId>, PassError> {
        match self.lookup(name)? {
            UniformValue::Texture(t) => Ok(*t),
            other => Err(Self::mismatch(name, "texture", other)),
        }
    }
}

/// Everything needed to build a pass on any backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PassDescriptor {
    pub name: String,
    pub uniforms: Uniforms,
    pub vertex_shader: &'static str,
    pub fragment_shader: &'static str,
}

impl PassDescriptor {
    /// The WGSL module built from both stages.
    pub fn shader_module_source(&self) -> String {
        format!("{}\n{}", self.vertex_shader, self.fragment_shader)
    }

    /// Non-texture uniforms, packed as consecutive f32s in declaration order.
    ///
    /// A `vec2` starting at an odd offset gets one float of padding to keep
    /// its 8-byte alignment. The result is padded to a multiple of four.
    pub fn packed_uniforms(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for (_, value) in self.uniforms.iter() {
            match value {
                UniformValue::Float(v) => out.push(*v),
                UniformValue::Vec2(v) => {
                    if out.len() % 2 == 1 {
                        out.push(0.0);
                    }
                    out.extend_from_slice(&[v.x, v.y]);
                }
                UniformValue::Texture(_) => {}
            }
        }
        while out.len() % 4 != 0 {
            out.push(0.0);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Uniforms {
        Uniforms::new()
            .with(INPUT_UNIFORM, UniformValue::Texture(None))
            .with("spacing", UniformValue::Float(8.5))
            .with("resolution", UniformValue::Vec2(Vec2::new(640.0, 480.0)))
    }

    #[test]
    fn declaration_order_is_kept() {
        let u = sample();
        let names: Vec<_> = u.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![INPUT_UNIFORM, "spacing", "resolution"]);
    }

    #[test]
    fn typed_access() {
        let u = sample();
        assert_eq!(u.float("spacing").unwrap(), 8.5);
        assert_eq!(u.texture(INPUT_UNIFORM).unwrap(), None);
        assert!(matches!(
            u.float("resolution"),
            Err(PassError::UniformType { expected: "f32", actual: "vec2", .. })
        ));
        assert_eq!(
            u.float("missing"),
            Err(PassError::UnknownUniform("missing".into()))
        );
    }

    #[test]
    fn set_rejects_kind_change_and_unknown() {
        let mut u = sample();
        u.set("spacing", UniformValue::Float(4.0)).unwrap();
        assert_eq!(u.float("spacing").unwrap(), 4.0);
        assert!(u.set("spacing", UniformValue::Vec2(Vec2::ONE)).is_err());
        assert!(u.set("nope", UniformValue::Float(1.0)).is_err());
    }

    #[test]
    fn packing_aligns_vec2() {
        let desc = PassDescriptor {
            name: "t".into(),
            uniforms: sample().with("size", UniformValue::Float(10.0)),
            vertex_shader: "",
            fragment_shader: "",
        };
        // spacing, pad, resolution.x, resolution.y, size, pad x3
        assert_eq!(
            desc.packed_uniforms(),
            vec![8.5, 0.0, 640.0, 480.0, 10.0, 0.0, 0.0, 0.0]
        );
    }
}
