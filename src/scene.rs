use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aabb::Aabb;
use crate::camera::Camera;
use crate::color::Color;
use crate::error::SceneError;
use crate::geometry::{Fp, Vec3f};
use crate::material::Material;
use crate::primitive::{BlockKind, Primitive};
use crate::rendering::ReflectionMode;
use crate::skybox::{GradientSkybox, SkyboxFaces};

/// Index of a primitive in its scene. Stable for the lifetime of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3f,
    pub intensity: Fp,
    pub color: Color,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            position: Vec3f::new(-10.0, 10.0, 20.0),
            intensity: 1.0,
            color: Color::white(),
        }
    }
}

/// Primitives in insertion order. Order decides exact-distance ties and which
/// occluder a shadow ray reports.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, primitive: Primitive) -> PrimitiveId {
        self.primitives.push(primitive);
        PrimitiveId(self.primitives.len() - 1)
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.primitives
            .iter()
            .enumerate()
            .map(|(index, primitive)| (PrimitiveId(index), primitive))
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Everything a scene file describes.
#[derive(Debug)]
pub struct SceneDescription {
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
    pub light: Light,
    pub scene: Scene,
    pub reflection: ReflectionMode,
    pub sky: GradientSkybox,
    pub skybox_faces: Option<SkyboxFaces>,
    /// Texture names and resolved file paths, in declaration order.
    pub textures: Vec<(String, PathBuf)>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        SceneDescription {
            width: 800,
            height: 600,
            camera: Default::default(),
            light: Default::default(),
            scene: Default::default(),
            reflection: Default::default(),
            sky: Default::default(),
            skybox_faces: None,
            textures: vec![],
        }
    }
}

pub fn load_scene_file(path: &Path) -> Result<SceneDescription, SceneError> {
    let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_file_content(&content, base_dir)
}

struct Line<'a> {
    number: usize,
    tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn command(&self) -> &'a str {
        self.tokens[0]
    }

    fn expect(&self, count: usize) -> Result<(), SceneError> {
        if self.tokens.len() <= count {
            return Err(SceneError::MissingArgument {
                line: self.number,
                command: self.command().to_string(),
                expected: count,
            });
        }
        Ok(())
    }

    fn word(&self) -> Result<&'a str, SceneError> {
        self.expect(1)?;
        Ok(self.tokens[1])
    }

    fn number_at(&self, index: usize) -> Result<Fp, SceneError> {
        let token = self.tokens[index];
        token
            .parse::<Fp>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| SceneError::InvalidNumber {
                line: self.number,
                value: token.to_string(),
            })
    }

    fn number(&self) -> Result<Fp, SceneError> {
        self.expect(1)?;
        self.number_at(1)
    }

    fn vector(&self) -> Result<Vec3f, SceneError> {
        self.expect(3)?;
        Ok(Vec3f::new(
            self.number_at(1)?,
            self.number_at(2)?,
            self.number_at(3)?,
        ))
    }

    /// Color given as three 0..255 channels.
    fn color(&self) -> Result<Color, SceneError> {
        let v = self.vector()? / 255.0;
        Ok(Color::new(v.x, v.y, v.z))
    }

    fn dimension(&self, index: usize) -> Result<u32, SceneError> {
        let token = self.tokens[index];
        token.parse().map_err(|_| SceneError::InvalidNumber {
            line: self.number,
            value: token.to_string(),
        })
    }

    fn outside(&self, block: &'static str) -> SceneError {
        SceneError::OutsideBlock {
            line: self.number,
            command: self.command().to_string(),
            block,
        }
    }
}

struct BoxBuilder {
    line: usize,
    kind: BlockKind,
    min: Option<Vec3f>,
    max: Option<Vec3f>,
    material: Material,
}

enum Block {
    None,
    Material { name: String, material: Material },
    Box(BoxBuilder),
}

fn close_block(
    block: Block,
    materials: &mut HashMap<String, Material>,
    scene: &mut Scene,
) -> Result<(), SceneError> {
    match block {
        Block::None => {}
        Block::Material { name, material } => {
            material
                .validate()
                .map_err(|message| SceneError::InvalidMaterial {
                    name: name.clone(),
                    message,
                })?;
            if materials.insert(name.clone(), material).is_some() {
                log::warn!("material '{}' redefined", name);
            }
        }
        Block::Box(builder) => {
            let (Some(min), Some(max)) = (builder.min, builder.max) else {
                return Err(SceneError::Invalid {
                    line: builder.line,
                    message: "NEW_BOX needs both MIN and MAX".to_string(),
                });
            };
            scene.push(Primitive::new(
                builder.kind,
                Aabb::from_corners(min, max),
                builder.material,
            ));
        }
    }
    Ok(())
}

/// Parses a line-oriented scene description. Relative texture paths are
/// resolved against `base_dir`.
pub fn parse_file_content(content: &str, base_dir: &Path) -> Result<SceneDescription, SceneError> {
    let mut result = SceneDescription::default();
    let mut materials = HashMap::<String, Material>::new();
    let mut block = Block::None;

    for (index, raw) in content.lines().enumerate() {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.is_empty() || tokens[0].starts_with('#') {
            continue;
        }
        let line = Line {
            number: index + 1,
            tokens,
        };

        match line.command() {
            "DIMENSIONS" => {
                line.expect(2)?;
                result.width = line.dimension(1)?;
                result.height = line.dimension(2)?;
            }
            "CAMERA_POSITION" => result.camera.position = line.vector()?,
            "CAMERA_TARGET" => result.camera.target = line.vector()?,
            "CAMERA_UP" => result.camera.up = line.vector()?,
            "CAMERA_SPEED" => result.camera.speed = line.number()?,
            "LIGHT_POSITION" => result.light.position = line.vector()?,
            "LIGHT_INTENSITY" => result.light.intensity = line.number()?,
            "LIGHT_COLOR" => result.light.color = line.color()?,
            "REFLECTION_MODE" => {
                result.reflection = line
                    .word()?
                    .parse::<ReflectionMode>()
                    .map_err(|message| SceneError::Invalid {
                        line: line.number,
                        message,
                    })?;
            }
            "BG_COLOR" => result.sky.zenith = line.color()?,
            "HORIZON_COLOR" => result.sky.horizon = line.color()?,
            "TEXTURE" => {
                line.expect(2)?;
                result
                    .textures
                    .push((line.tokens[1].to_string(), base_dir.join(line.tokens[2])));
            }
            "SKYBOX" => {
                line.expect(6)?;
                let name = |i: usize| line.tokens[i].to_string();
                result.skybox_faces = Some(SkyboxFaces {
                    sides: [name(1), name(2), name(3), name(4)],
                    sky: name(5),
                    ground: name(6),
                });
            }
            "NEW_MATERIAL" => {
                let name = line.word()?.to_string();
                close_block(block, &mut materials, &mut result.scene)?;
                block = Block::Material {
                    name,
                    material: Material::default(),
                };
            }
            "NEW_BOX" => {
                let kind = line
                    .word()?
                    .parse::<BlockKind>()
                    .map_err(|message| SceneError::Invalid {
                        line: line.number,
                        message,
                    })?;
                close_block(block, &mut materials, &mut result.scene)?;
                block = Block::Box(BoxBuilder {
                    line: line.number,
                    kind,
                    min: None,
                    max: None,
                    material: Material::default(),
                });
            }
            "DIFFUSE" | "ALBEDO" | "SPECULAR_ALBEDO" | "SPECULAR_COEFFICIENT" | "REFLECTIVITY"
            | "TRANSPARENCY" | "IOR" => {
                let Block::Material { material, .. } = &mut block else {
                    return Err(line.outside("NEW_MATERIAL"));
                };
                match line.command() {
                    "DIFFUSE" => material.diffuse = line.color()?,
                    "ALBEDO" => material.albedo = line.number()?,
                    "SPECULAR_ALBEDO" => material.specular_albedo = line.number()?,
                    "SPECULAR_COEFFICIENT" => material.specular_coefficient = line.number()?,
                    "REFLECTIVITY" => material.reflectivity = line.number()?,
                    "TRANSPARENCY" => material.transparency = line.number()?,
                    _ => material.refraction_index = line.number()?,
                }
            }
            "MIN" | "MAX" | "MATERIAL" => {
                let Block::Box(builder) = &mut block else {
                    return Err(line.outside("NEW_BOX"));
                };
                match line.command() {
                    "MIN" => builder.min = Some(line.vector()?),
                    "MAX" => builder.max = Some(line.vector()?),
                    _ => {
                        let name = line.word()?;
                        builder.material = *materials.get(name).ok_or_else(|| {
                            SceneError::UndefinedMaterial {
                                line: line.number,
                                name: name.to_string(),
                            }
                        })?;
                    }
                }
            }
            command => {
                log::warn!("line {}: ignoring unknown command {}", line.number, command);
            }
        }
    }
    close_block(block, &mut materials, &mut result.scene)?;

    if result.width == 0 || result.height == 0 {
        return Err(SceneError::EmptyImage {
            width: result.width,
            height: result.height,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
# two blocks under a white light
DIMENSIONS 320 240
CAMERA_POSITION -3 2 10
CAMERA_TARGET 0 0 0
CAMERA_UP 0 1 0
LIGHT_POSITION -10 10 20
LIGHT_INTENSITY 1.5
LIGHT_COLOR 255 255 255
REFLECTION_MODE incident
TEXTURE stone assets/stone.png

NEW_MATERIAL gold
DIFFUSE 228 190 39
ALBEDO 1
SPECULAR_ALBEDO 10
SPECULAR_COEFFICIENT 0.2
REFLECTIVITY 0.4

NEW_BOX stone
MIN -2.5 -0.5 0.5
MAX -1.5 -5.5 1.5

NEW_BOX gold
MIN 0 0 0
MAX 1 1 1
MATERIAL gold
";

    #[test]
    fn parses_full_description() {
        let description = parse_file_content(SAMPLE, Path::new("scenes")).unwrap();
        assert_eq!((description.width, description.height), (320, 240));
        assert_eq!(description.camera.position, Vec3f::new(-3.0, 2.0, 10.0));
        assert_eq!(description.light.intensity, 1.5);
        assert_eq!(description.reflection, ReflectionMode::MirrorIncident);
        assert_eq!(
            description.textures,
            vec![("stone".to_string(), PathBuf::from("scenes/assets/stone.png"))]
        );
        assert_eq!(description.scene.len(), 2);

        let stone = description.scene.get(PrimitiveId(0)).unwrap();
        assert_eq!(stone.kind, BlockKind::Stone);
        assert_eq!(stone.bounds.min, Vec3f::new(-2.5, -5.5, 0.5));
        assert_eq!(stone.material, Material::default());

        let gold = description.scene.get(PrimitiveId(1)).unwrap();
        assert_eq!(gold.material.reflectivity, 0.4);
        assert_eq!(gold.material.diffuse, Color::from_rgb8(228, 190, 39));
    }

    #[test]
    fn material_is_copied_at_definition() {
        let text = "
NEW_MATERIAL m
ALBEDO 0.5
NEW_BOX plain
MIN 0 0 0
MAX 1 1 1
MATERIAL m
NEW_MATERIAL m
ALBEDO 0.25
";
        let description = parse_file_content(text, Path::new(".")).unwrap();
        let block = description.scene.get(PrimitiveId(0)).unwrap();
        assert_eq!(block.material.albedo, 0.5);
    }

    #[test]
    fn reports_undefined_material() {
        let text = "NEW_BOX plain\nMIN 0 0 0\nMAX 1 1 1\nMATERIAL glass\n";
        let error = parse_file_content(text, Path::new(".")).unwrap_err();
        assert!(matches!(
            error,
            SceneError::UndefinedMaterial { line: 4, .. }
        ));
    }

    #[test]
    fn reports_malformed_lines() {
        let bad_number = parse_file_content("LIGHT_INTENSITY bright", Path::new("."));
        assert!(matches!(
            bad_number,
            Err(SceneError::InvalidNumber { line: 1, .. })
        ));

        let short = parse_file_content("CAMERA_POSITION 1 2", Path::new("."));
        assert!(matches!(short, Err(SceneError::MissingArgument { .. })));

        let stray = parse_file_content("ALBEDO 0.5", Path::new("."));
        assert!(matches!(stray, Err(SceneError::OutsideBlock { .. })));

        let open_box = parse_file_content("NEW_BOX stone\nMIN 0 0 0", Path::new("."));
        assert!(matches!(open_box, Err(SceneError::Invalid { line: 1, .. })));

        let kind = parse_file_content("NEW_BOX bedrock", Path::new("."));
        assert!(matches!(kind, Err(SceneError::Invalid { .. })));
    }

    #[test]
    fn rejects_invalid_material_and_dimensions() {
        let text = "NEW_MATERIAL lens\nIOR 0.5\n";
        assert!(matches!(
            parse_file_content(text, Path::new(".")),
            Err(SceneError::InvalidMaterial { .. })
        ));
        assert!(matches!(
            parse_file_content("DIMENSIONS 0 10", Path::new(".")),
            Err(SceneError::EmptyImage { .. })
        ));
    }

    #[test]
    fn unknown_commands_are_skipped() {
        let text = "FOG 0.3\nSKYBOX a b c d sky ground";
        let description = parse_file_content(text, Path::new(".")).unwrap();
        assert!(description.scene.is_empty());
        assert_eq!(description.skybox_faces.unwrap().ground, "ground");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = load_scene_file(Path::new("/nonexistent/scene.txt")).unwrap_err();
        assert!(matches!(error, SceneError::Io { .. }));
    }
}
