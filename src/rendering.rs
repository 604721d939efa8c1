use std::cell::Cell;
use std::str::FromStr;

use crate::camera::Camera;
use crate::color::Color;
use crate::geometry::{reflect, refract, Fp, Intersection, Ray, Vec3f, FP_INF};
use crate::material::Material;
use crate::scene::{Light, PrimitiveId, Scene};
use crate::skybox::Skybox;
use crate::texture::TextureSampler;
use crate::utils::normalize_or_zero;

/// Depth at which a ray stops bouncing and takes the environment color.
pub const MAX_RECURSION: u32 = 3;
/// Offset along the normal for rays leaving a surface.
pub const BIAS: Fp = 0.0001;

/// How the mirror direction of a hit is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReflectionMode {
    /// Mirrors the negated, normalized ray origin about the normal. This is the
    /// behavior of the reference renders; it depends on where the ray started
    /// rather than on where it was going.
    #[default]
    MirrorOrigin,
    /// Mirrors the incoming ray direction about the normal.
    MirrorIncident,
}

impl FromStr for ReflectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "origin" => Ok(ReflectionMode::MirrorOrigin),
            "incident" => Ok(ReflectionMode::MirrorIncident),
            _ => Err(format!(
                "unknown reflection mode '{s}', expected 'origin' or 'incident'"
            )),
        }
    }
}

/// Read-only state shared by every ray of a frame.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub light: &'a Light,
    pub textures: &'a dyn TextureSampler,
    pub skybox: &'a dyn Skybox,
    pub reflection: ReflectionMode,
    pub stats: RenderStats,
}

/// Scene scans issued while rendering, split by purpose.
#[derive(Debug, Default)]
pub struct RenderStats {
    pub scene_scans: Cell<u64>,
    pub shadow_scans: Cell<u64>,
}

impl RenderStats {
    fn bump(counter: &Cell<u64>) {
        counter.set(counter.get() + 1);
    }
}

/// Receives the final color of every pixel of a frame exactly once.
pub trait PixelSink {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color);
}

/// Local lighting terms at a hit point.
#[derive(Clone, Debug)]
pub struct Illumination {
    pub light_dir: Vec3f,
    pub view_dir: Vec3f,
    pub reflect_dir: Vec3f,
    pub diffuse: Fp,
    pub specular: Fp,
    pub shadow: Fp,
}

/// Closest primitive hit by `ray` at a positive distance, skipping `excluded`.
/// On exactly equal distances the primitive inserted first wins.
pub fn nearest_hit(
    scene: &Scene,
    ray: &Ray,
    excluded: Option<PrimitiveId>,
) -> Option<(PrimitiveId, Intersection)> {
    let mut z_buffer = FP_INF;
    let mut nearest = None;
    for (id, primitive) in scene.iter() {
        if Some(id) == excluded {
            continue;
        }
        if let Some(intersection) = primitive.intersect_bounds(ray) {
            if intersection.distance > 0.0 && intersection.distance < z_buffer {
                z_buffer = intersection.distance;
                nearest = Some((id, intersection));
            }
        }
    }
    nearest
}

/// Light visibility in `[0, 1]` from `point` towards the light.
///
/// The first primitive in scene order that blocks the ray decides the result,
/// even when another blocker is closer to `point`. A blocker further away lets
/// less light through.
pub fn cast_shadow(
    ctx: &RenderContext,
    point: &Vec3f,
    light_dir: &Vec3f,
    hit_object: PrimitiveId,
) -> Fp {
    RenderStats::bump(&ctx.stats.shadow_scans);
    let shadow_ray = Ray::new(*point, *light_dir);
    let light_distance = (ctx.light.position - point).norm();
    for (id, primitive) in ctx.scene.iter() {
        if id == hit_object {
            continue;
        }
        if let Some(intersection) = primitive.intersect_bounds(&shadow_ray) {
            if intersection.distance > 0.0 {
                let ratio = if light_distance > 0.0 {
                    Fp::min(1.0, intersection.distance / light_distance)
                } else {
                    1.0
                };
                return 1.0 - ratio;
            }
        }
    }
    1.0
}

/// Diffuse, specular and shadow terms for a hit of `ray` on `hit_object`.
pub fn illuminate(
    ctx: &RenderContext,
    ray: &Ray,
    intersection: &Intersection,
    hit_object: PrimitiveId,
    material: &Material,
) -> Illumination {
    let point = &intersection.point;
    let normal = &intersection.normal;
    let light_dir = normalize_or_zero(&(ctx.light.position - point));
    let view_dir = normalize_or_zero(&(ray.origin - point));
    let reflect_dir = match ctx.reflection {
        ReflectionMode::MirrorOrigin => reflect(&-normalize_or_zero(&ray.origin), normal),
        ReflectionMode::MirrorIncident => reflect(&ray.direction, normal),
    };

    let diffuse = Fp::max(0.0, normal.dot(&light_dir));
    let specular = Fp::max(0.0, view_dir.dot(&reflect_dir)).powf(material.specular_coefficient);
    let shadow_origin = point + normal * BIAS;
    let shadow = cast_shadow(ctx, &shadow_origin, &light_dir, hit_object);

    Illumination {
        light_dir,
        view_dir,
        reflect_dir,
        diffuse,
        specular,
        shadow,
    }
}

/// Color seen along a ray. `depth` counts the bounces so far and `excluded` is
/// the surface the ray leaves, if any.
pub fn cast_ray(
    ctx: &RenderContext,
    origin: &Vec3f,
    direction: &Vec3f,
    depth: u32,
    excluded: Option<PrimitiveId>,
) -> Color {
    if depth >= MAX_RECURSION {
        return ctx.skybox.color_for(origin, direction);
    }
    let ray = Ray::new(*origin, *direction);
    RenderStats::bump(&ctx.stats.scene_scans);
    let Some((hit_object, mut intersection)) = nearest_hit(ctx.scene, &ray, excluded) else {
        return ctx.skybox.color_for(origin, direction);
    };
    let Some(primitive) = ctx.scene.get(hit_object) else {
        return ctx.skybox.color_for(origin, direction);
    };
    primitive.resolve_texture(&mut intersection, ctx.textures);
    let material = &primitive.material;
    let normal = intersection.normal;

    let light = illuminate(ctx, &ray, &intersection, hit_object, material);

    let mut reflected = Color::black();
    if material.reflectivity > 0.0 {
        let origin = intersection.point + normal * BIAS;
        reflected = cast_ray(ctx, &origin, &light.reflect_dir, depth + 1, Some(hit_object));
    }

    let mut refracted = Color::black();
    if material.transparency > 0.0 {
        let origin = intersection.point - normal * BIAS;
        let refract_dir = refract(direction, &normal, material.refraction_index)
            .unwrap_or_else(|| {
                log::trace!("total internal reflection at {:?}", intersection.point);
                reflect(direction, &normal)
            });
        refracted = cast_ray(ctx, &origin, &refract_dir, depth + 1, Some(hit_object));
    }

    let surface = intersection.color.unwrap_or(material.diffuse);
    let intensity = ctx.light.intensity;
    let diffuse = surface * intensity * light.diffuse * material.albedo * light.shadow;
    let specular =
        ctx.light.color * intensity * light.specular * material.specular_albedo * light.shadow;

    (diffuse + specular) * (1.0 - material.reflectivity - material.transparency)
        + reflected * material.reflectivity
        + refracted * material.transparency
}

/// Traces every pixel of a `width` x `height` frame in scanline order.
pub fn render_frame(ctx: &RenderContext, width: u32, height: u32, sink: &mut impl PixelSink) {
    let basis = ctx.camera.basis();
    for y in 0..height {
        for x in 0..width {
            let ray = ctx.camera.primary_ray(&basis, x, y, width, height);
            let color = cast_ray(ctx, &ray.origin, &ray.direction, 0, None);
            sink.write_pixel(x, y, color);
        }
    }
}

/// RGB8 frame buffer, rows top to bottom.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Frame {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

impl PixelSink for Frame {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&color.to_rgb8());
    }
}
