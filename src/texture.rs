use std::collections::HashMap;
use std::path::Path;

use image::RgbImage;

use crate::color::Color;
use crate::geometry::Fp;

/// Looks up a texel of a named texture. `u` and `v` are in texture units, one
/// unit spanning the whole image; values outside `[0, 1)` wrap.
pub trait TextureSampler {
    fn sample(&self, name: &str, u: Fp, v: Fp) -> Option<Color>;
}

/// Sampler that knows no textures, so every surface shows its material color.
pub struct NoTextures;

impl TextureSampler for NoTextures {
    fn sample(&self, _: &str, _: Fp, _: Fp) -> Option<Color> {
        None
    }
}

#[derive(Default)]
pub struct TextureAtlas {
    images: HashMap<String, RgbImage>,
}

impl TextureAtlas {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn load(&mut self, name: &str, path: &Path) -> Result<(), image::ImageError> {
        let image = image::open(path)?.to_rgb8();
        log::debug!(
            "loaded texture '{}' ({}x{}) from {}",
            name,
            image.width(),
            image.height(),
            path.display()
        );
        self.insert(name, image);
        Ok(())
    }

    pub fn insert(&mut self, name: &str, image: RgbImage) {
        self.images.insert(name.to_string(), image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl TextureSampler for TextureAtlas {
    fn sample(&self, name: &str, u: Fp, v: Fp) -> Option<Color> {
        let image = self.images.get(name)?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || !u.is_finite() || !v.is_finite() {
            return None;
        }
        let x = ((u.rem_euclid(1.0) * width as Fp) as u32).min(width - 1);
        // v grows upwards, image rows grow downwards
        let y = (((1.0 - v.rem_euclid(1.0)) * height as Fp) as u32).min(height - 1);
        let [r, g, b] = image.get_pixel(x, y).0;
        Some(Color::from_rgb8(r, g, b))
    }
}
