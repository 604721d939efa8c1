use nalgebra::Vector3;

use crate::color::Color;
use crate::utils::safe_sqrt;

pub type Fp = f64;
pub type Vec3f = Vector3<Fp>;

pub const FP_INF: Fp = Fp::INFINITY;
pub const FP_NEG_INF: Fp = Fp::NEG_INFINITY;

/// Direction components smaller than this are treated as parallel to a slab.
pub static EPS: Fp = 0.00001;

#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: Vec3f,
    pub direction: Vec3f,
}

impl Ray {
    pub fn new(origin: Vec3f, direction: Vec3f) -> Self {
        Ray { origin, direction }
    }

    pub fn at(&self, t: Fp) -> Vec3f {
        self.origin + self.direction * t
    }
}

/// A forward hit of a ray against a surface. `color` is set when the surface
/// supplies its own texel for the hit point.
#[derive(Clone, Debug)]
pub struct Intersection {
    pub distance: Fp,
    pub point: Vec3f,
    pub normal: Vec3f,
    pub color: Option<Color>,
}

/// Mirrors `incident` about `normal`.
pub fn reflect(incident: &Vec3f, normal: &Vec3f) -> Vec3f {
    let projection = -incident.dot(normal);
    incident + normal * projection * 2.0
}

/// Bends `incident` through a surface with outward `normal` using Snell's law.
///
/// The ray enters the medium when it travels against the normal and leaves it
/// otherwise. `ior` is the index of the medium behind the normal, so entering
/// uses the ratio `1 / ior` and a glass with `ior > 1` bends rays towards the
/// normal. Renders that fed `ior` in as the ratio directly bend them away.
/// Returns `None` on total internal reflection.
pub fn refract(incident: &Vec3f, normal: &Vec3f, ior: Fp) -> Option<Vec3f> {
    let cos_i = incident.dot(normal).clamp(-1.0, 1.0);
    let (n, eta, cos_i) = if cos_i < 0.0 {
        (*normal, 1.0 / ior, -cos_i)
    } else {
        (-normal, ior, cos_i)
    };
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        None
    } else {
        Some(incident * eta + n * (eta * cos_i - safe_sqrt(k)))
    }
}
