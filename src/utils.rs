use crate::geometry::{Fp, Vec3f};

pub fn safe_sqrt(x: Fp) -> Fp {
    Fp::max(0.0, x).sqrt()
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
pub fn normalize_or_zero(v: &Vec3f) -> Vec3f {
    v.try_normalize(1e-12).unwrap_or_else(Vec3f::zeros)
}
