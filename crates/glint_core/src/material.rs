//! Phong material definition.

use glint_math::Color;

use crate::texture::Texture;

/// A Phong material with reflection and refraction weights.
///
/// Materials are read-only during tracing. The transport kernel reads only
/// `density`, `reflection`, `refraction` and `diffuse`; the rest feeds the
/// local illumination model and texture lookup.
#[derive(Clone, Debug)]
pub struct Material {
    /// Ambient color term
    pub ambient: Color,

    /// Diffuse color term
    pub diffuse: Color,

    /// Specular color term
    pub specular: Color,

    /// Specular highlight exponent
    pub specular_power: f32,

    /// Refractive density of the medium (1.0 = air)
    pub density: f32,

    /// Weight of the mirrored contribution (0 = matte)
    pub reflection: f32,

    /// Weight of the transmitted contribution (0 = opaque)
    pub refraction: f32,

    /// Weight of the local illumination contribution
    pub illumination: f32,

    /// Optional diffuse texture; modulates the diffuse color
    pub diffuse_texture: Option<Texture>,

    /// Texture coordinate scale along U
    pub tex_scale_u: f32,

    /// Texture coordinate scale along V
    pub tex_scale_v: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::ZERO,
            diffuse: Color::new(0.5, 0.5, 0.5),
            specular: Color::ZERO,
            specular_power: 1.0,
            density: 1.0,
            reflection: 0.0,
            refraction: 0.0,
            illumination: 1.0,
            diffuse_texture: None,
            tex_scale_u: 1.0,
            tex_scale_v: 1.0,
        }
    }
}

impl Material {
    /// Refractive density of air; every primary ray starts in this medium.
    pub const AIR_DENSITY: f32 = 1.0;

    /// The surrounding medium: no reflection, density of air.
    pub fn air() -> Self {
        Self {
            refraction: 1.0,
            reflection: 0.0,
            density: Self::AIR_DENSITY,
            ..Default::default()
        }
    }

    /// Check if this material contributes a mirrored component.
    pub fn is_reflective(&self) -> bool {
        self.reflection > 0.0
    }

    /// Check if this material transmits light.
    pub fn is_refractive(&self) -> bool {
        self.refraction > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_inert() {
        let m = Material::default();
        assert!(!m.is_reflective());
        assert!(!m.is_refractive());
        assert!(m.diffuse_texture.is_none());
    }

    #[test]
    fn test_air_density() {
        let air = Material::air();
        assert_eq!(air.density, 1.0);
        assert_eq!(air.reflection, 0.0);
    }
}
