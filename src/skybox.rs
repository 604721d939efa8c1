use crate::color::Color;
use crate::geometry::{Fp, Vec3f};
use crate::texture::TextureSampler;

/// Environment color for rays that leave the scene.
pub trait Skybox {
    fn color_for(&self, origin: &Vec3f, direction: &Vec3f) -> Color;
}

#[derive(Clone, Debug)]
pub struct GradientSkybox {
    pub horizon: Color,
    pub zenith: Color,
}

impl Default for GradientSkybox {
    fn default() -> Self {
        GradientSkybox {
            horizon: Color::new(0.9, 0.95, 1.0),
            zenith: Color::from_rgb8(173, 216, 230),
        }
    }
}

impl Skybox for GradientSkybox {
    fn color_for(&self, _: &Vec3f, direction: &Vec3f) -> Color {
        let up = direction.try_normalize(1e-12).map_or(0.0, |d| d.y);
        self.horizon.lerp(&self.zenith, up)
    }
}

/// Texture names of a cube map. Sides are ordered +x, -x, +z, -z.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyboxFaces {
    pub sides: [String; 4],
    pub sky: String,
    pub ground: String,
}

/// Cube map sampled by the dominant axis of the ray direction.
pub struct TexturedSkybox<'a> {
    pub faces: SkyboxFaces,
    pub textures: &'a dyn TextureSampler,
    pub fallback: GradientSkybox,
}

impl Skybox for TexturedSkybox<'_> {
    fn color_for(&self, origin: &Vec3f, direction: &Vec3f) -> Color {
        let d = direction;
        let a = d.abs();
        // project onto the unit cube face, then map [-1, 1] to [0, 1]
        let (name, u, v) = if a.y >= a.x && a.y >= a.z {
            let name = if d.y > 0.0 {
                &self.faces.sky
            } else {
                &self.faces.ground
            };
            (name, d.x / a.y, d.z / a.y)
        } else if a.x >= a.z {
            let name = if d.x > 0.0 {
                &self.faces.sides[0]
            } else {
                &self.faces.sides[1]
            };
            (name, -d.z / d.x, d.y / a.x)
        } else {
            let name = if d.z > 0.0 {
                &self.faces.sides[2]
            } else {
                &self.faces.sides[3]
            };
            (name, d.x / d.z, d.y / a.z)
        };
        if !u.is_finite() || !v.is_finite() {
            return self.fallback.color_for(origin, direction);
        }
        let to_unit = |t: Fp| (t * 0.5 + 0.5).clamp(0.0, 0.999_999);
        self.textures
            .sample(name, to_unit(u), to_unit(v))
            .unwrap_or_else(|| self.fallback.color_for(origin, direction))
    }
}
