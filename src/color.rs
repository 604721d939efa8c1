use std::ops::{Add, Mul};

use crate::geometry::{Fp, Vec3f};

/// Linear RGB with every channel kept in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color(Vec3f);

impl Color {
    pub fn new(r: Fp, g: Fp, b: Fp) -> Self {
        Color(clamp01(Vec3f::new(r, g, b)))
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color::new(r as Fp / 255.0, g as Fp / 255.0, b as Fp / 255.0)
    }

    pub fn black() -> Self {
        Color(Vec3f::zeros())
    }

    pub fn white() -> Self {
        Color(Vec3f::new(1.0, 1.0, 1.0))
    }

    pub fn r(&self) -> Fp {
        self.0.x
    }

    pub fn g(&self) -> Fp {
        self.0.y
    }

    pub fn b(&self) -> Fp {
        self.0.z
    }

    pub fn lerp(&self, other: &Color, t: Fp) -> Color {
        Color(clamp01(self.0.lerp(&other.0, t.clamp(0.0, 1.0))))
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.0.x * 255.0).round() as u8,
            (self.0.y * 255.0).round() as u8,
            (self.0.z * 255.0).round() as u8,
        ]
    }
}

fn clamp01(v: Vec3f) -> Vec3f {
    // NaN channels collapse to black
    v.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color(clamp01(self.0 + rhs.0))
    }
}

impl Mul<Fp> for Color {
    type Output = Color;

    fn mul(self, rhs: Fp) -> Color {
        Color(clamp01(self.0 * rhs))
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color(clamp01(self.0.component_mul(&rhs.0)))
    }
}
