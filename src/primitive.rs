use std::fmt;
use std::str::FromStr;

use crate::aabb::{Aabb, Face};
use crate::geometry::{Intersection, Ray};
use crate::material::Material;
use crate::texture::TextureSampler;

/// Texture name bound to each face, indexed by `Face::index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceTextures([Option<&'static str>; 6]);

impl FaceTextures {
    pub const NONE: FaceTextures = FaceTextures([None; 6]);

    pub fn uniform(name: &'static str) -> Self {
        FaceTextures([Some(name); 6])
    }

    /// `top` and `bottom` on the horizontal faces, `side` everywhere else.
    pub fn capped(top: &'static str, side: &'static str, bottom: Option<&'static str>) -> Self {
        let mut faces = [Some(side); 6];
        faces[Face::Top.index()] = Some(top);
        faces[Face::Bottom.index()] = bottom;
        FaceTextures(faces)
    }

    pub fn with(mut self, face: Face, name: Option<&'static str>) -> Self {
        self.0[face.index()] = name;
        self
    }

    pub fn get(&self, face: Face) -> Option<&'static str> {
        self.0[face.index()]
    }
}

/// Box variants. They share geometry and differ only in their face textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Plain,
    Grass,
    Dirt,
    Stone,
    Cobblestone,
    Obsidian,
    Coal,
    Gold,
    Glass,
    Rail,
    Chest,
    Pumpkin,
}

impl BlockKind {
    pub fn face_textures(self) -> FaceTextures {
        match self {
            BlockKind::Plain => FaceTextures::NONE,
            BlockKind::Grass => FaceTextures::capped("grass", "grass_side", Some("dirt")),
            BlockKind::Dirt => FaceTextures::uniform("dirt"),
            BlockKind::Stone => FaceTextures::uniform("stone"),
            BlockKind::Cobblestone => FaceTextures::uniform("cobblestone"),
            BlockKind::Obsidian => FaceTextures::uniform("obsidian"),
            BlockKind::Coal => FaceTextures::uniform("coal"),
            BlockKind::Gold => FaceTextures::uniform("gold"),
            BlockKind::Glass => FaceTextures::uniform("glass"),
            BlockKind::Rail => FaceTextures::NONE.with(Face::Top, Some("rail")),
            BlockKind::Chest => {
                FaceTextures::capped("chest_top", "chest_side", Some("chest_top"))
                    .with(Face::Front, Some("chest_front"))
            }
            BlockKind::Pumpkin => {
                FaceTextures::capped("pumpkin_top", "pumpkin_side", Some("pumpkin_top"))
                    .with(Face::Front, Some("pumpkin_front"))
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Plain => "plain",
            BlockKind::Grass => "grass",
            BlockKind::Dirt => "dirt",
            BlockKind::Stone => "stone",
            BlockKind::Cobblestone => "cobblestone",
            BlockKind::Obsidian => "obsidian",
            BlockKind::Coal => "coal",
            BlockKind::Gold => "gold",
            BlockKind::Glass => "glass",
            BlockKind::Rail => "rail",
            BlockKind::Chest => "chest",
            BlockKind::Pumpkin => "pumpkin",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "plain" => BlockKind::Plain,
            "grass" => BlockKind::Grass,
            "dirt" => BlockKind::Dirt,
            "stone" => BlockKind::Stone,
            "cobblestone" => BlockKind::Cobblestone,
            "obsidian" => BlockKind::Obsidian,
            "coal" => BlockKind::Coal,
            "gold" => BlockKind::Gold,
            "glass" => BlockKind::Glass,
            "rail" => BlockKind::Rail,
            "chest" => BlockKind::Chest,
            "pumpkin" => BlockKind::Pumpkin,
            _ => return Err(format!("unknown block kind '{s}'")),
        };
        Ok(kind)
    }
}

#[derive(Clone, Debug)]
pub struct Primitive {
    pub kind: BlockKind,
    pub bounds: Aabb,
    pub material: Material,
}

impl Primitive {
    pub fn new(kind: BlockKind, bounds: Aabb, material: Material) -> Self {
        Primitive {
            kind,
            bounds,
            material,
        }
    }

    /// Geometric hit only, without texture lookup.
    pub fn intersect_bounds(&self, ray: &Ray) -> Option<Intersection> {
        self.bounds.intersect(ray)
    }

    /// Replaces the hit color with the texel of the face the hit lies on. Leaves
    /// the color unset when the face has no texture or the sampler lacks it.
    pub fn resolve_texture(&self, intersection: &mut Intersection, textures: &dyn TextureSampler) {
        let Some(face) = self.bounds.face_at(&intersection.point) else {
            return;
        };
        let Some(name) = self.kind.face_textures().get(face) else {
            return;
        };
        let (u, v) = self.bounds.face_offsets(face, &intersection.point);
        if let Some(color) = textures.sample(name, u, v) {
            intersection.color = Some(color);
        }
    }

    pub fn ray_intersect(
        &self,
        ray: &Ray,
        textures: &dyn TextureSampler,
    ) -> Option<Intersection> {
        let mut intersection = self.intersect_bounds(ray)?;
        self.resolve_texture(&mut intersection, textures);
        Some(intersection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::{Fp, Vec3f};

    /// Encodes the texture name and offsets into the returned color.
    struct Probe;

    impl TextureSampler for Probe {
        fn sample(&self, name: &str, u: Fp, v: Fp) -> Option<Color> {
            let tag = match name {
                "grass" => 0.1,
                "grass_side" => 0.2,
                "dirt" => 0.3,
                "rail" => 0.4,
                _ => return None,
            };
            Some(Color::new(tag, u, v))
        }
    }

    fn grass_block() -> Primitive {
        Primitive::new(
            BlockKind::Grass,
            Aabb::from_corners(Vec3f::new(0.0, 0.0, 0.0), Vec3f::new(1.0, 1.0, 1.0)),
            Material::default(),
        )
    }

    #[test]
    fn top_and_side_use_different_textures() {
        let block = grass_block();
        let down = Ray::new(Vec3f::new(0.25, 5.0, 0.75), -Vec3f::y());
        let top = block.ray_intersect(&down, &Probe).unwrap();
        assert_eq!(top.color, Some(Color::new(0.1, 0.25, 0.75)));

        let west = Ray::new(Vec3f::new(-5.0, 0.5, 0.25), Vec3f::x());
        let side = block.ray_intersect(&west, &Probe).unwrap();
        assert_eq!(side.color, Some(Color::new(0.2, 0.25, 0.5)));

        let up = Ray::new(Vec3f::new(0.5, -5.0, 0.5), Vec3f::y());
        let bottom = block.ray_intersect(&up, &Probe).unwrap();
        assert_eq!(bottom.color, Some(Color::new(0.3, 0.5, 0.5)));
    }

    #[test]
    fn untextured_face_keeps_material_color() {
        let rail = Primitive::new(BlockKind::Rail, grass_block().bounds, Material::default());
        let side = Ray::new(Vec3f::new(0.5, 0.5, 5.0), -Vec3f::z());
        assert!(rail.ray_intersect(&side, &Probe).unwrap().color.is_none());
        let down = Ray::new(Vec3f::new(0.5, 5.0, 0.5), -Vec3f::y());
        assert!(rail.ray_intersect(&down, &Probe).unwrap().color.is_some());
    }

    #[test]
    fn unknown_texture_is_not_an_error() {
        let stone = Primitive::new(BlockKind::Stone, grass_block().bounds, Material::default());
        let ray = Ray::new(Vec3f::new(0.5, 0.5, 5.0), -Vec3f::z());
        let hit = stone.ray_intersect(&ray, &Probe).unwrap();
        assert!(hit.color.is_none());
    }

    #[test]
    fn kinds_parse_from_names() {
        assert_eq!("Cobblestone".parse::<BlockKind>(), Ok(BlockKind::Cobblestone));
        assert!("bedrock".parse::<BlockKind>().is_err());
        assert_eq!(BlockKind::Pumpkin.to_string(), "pumpkin");
        assert_eq!(
            BlockKind::Chest.face_textures().get(Face::Front),
            Some("chest_front")
        );
    }
}
