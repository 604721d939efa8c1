use crate::color::Color;
use crate::geometry::Fp;

/// Surface parameters owned by value by every primitive.
///
/// `reflectivity + transparency` may exceed one; the shader blends with the
/// raw weights and does not renormalise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    /// Fraction of the diffuse color re-emitted, in `[0, 1]`.
    pub albedo: Fp,
    /// Strength of the light-colored highlight.
    pub specular_albedo: Fp,
    /// Highlight tightness; larger is sharper.
    pub specular_coefficient: Fp,
    pub reflectivity: Fp,
    pub transparency: Fp,
    pub refraction_index: Fp,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            diffuse: Color::white(),
            albedo: 1.0,
            specular_albedo: 0.0,
            specular_coefficient: 1.0,
            reflectivity: 0.0,
            transparency: 0.0,
            refraction_index: 1.0,
        }
    }
}

impl Material {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("albedo", self.albedo),
            ("specular albedo", self.specular_albedo),
            ("specular coefficient", self.specular_coefficient),
            ("reflectivity", self.reflectivity),
            ("transparency", self.transparency),
            ("refraction index", self.refraction_index),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(format!("{field} must be finite, got {value}"));
            }
        }
        for (field, value) in [
            ("albedo", self.albedo),
            ("reflectivity", self.reflectivity),
            ("transparency", self.transparency),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{field} must be within [0, 1], got {value}"));
            }
        }
        if self.specular_albedo < 0.0 {
            return Err(format!(
                "specular albedo must be >= 0, got {}",
                self.specular_albedo
            ));
        }
        if self.specular_coefficient <= 0.0 {
            return Err(format!(
                "specular coefficient must be > 0, got {}",
                self.specular_coefficient
            ));
        }
        if self.refraction_index < 1.0 {
            return Err(format!(
                "refraction index must be >= 1, got {}",
                self.refraction_index
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Material::default().validate().is_ok());
    }

    #[test]
    fn overlapping_blend_weights_are_accepted() {
        let glass = Material {
            reflectivity: 0.2,
            transparency: 1.0,
            refraction_index: 1.1,
            ..Default::default()
        };
        assert!(glass.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let too_bright = Material {
            albedo: 1.5,
            ..Default::default()
        };
        assert!(too_bright.validate().is_err());

        let flat = Material {
            specular_coefficient: 0.0,
            ..Default::default()
        };
        assert!(flat.validate().is_err());

        let thin = Material {
            refraction_index: 0.5,
            ..Default::default()
        };
        assert!(thin.validate().is_err());

        let broken = Material {
            reflectivity: Fp::NAN,
            ..Default::default()
        };
        assert!(broken.validate().is_err());
    }
}
