use std::f64::consts::PI;
use std::str::FromStr;

use nalgebra::{Rotation3, Unit};

use crate::geometry::{Fp, Ray, Vec3f};
use crate::utils::normalize_or_zero;

pub const FIELD_OF_VIEW: Fp = PI / 3.0;
pub const ZOOM_STEP: Fp = 0.5;
pub const PAN_STEP: Fp = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3f,
    pub target: Vec3f,
    pub up: Vec3f,
    /// Orbit step in degrees per rotate command.
    pub speed: Fp,
}

/// Orthonormal view frame derived from a camera.
#[derive(Clone, Debug)]
pub struct CameraBasis {
    pub forward: Vec3f,
    pub right: Vec3f,
    pub up: Vec3f,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraCommand {
    Rotate(Fp),
    Zoom(Fp),
    MoveX(Fp),
    MoveY(Fp),
}

impl FromStr for CameraCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, sign) = if let Some(name) = s.strip_suffix('+') {
            (name, 1.0)
        } else if let Some(name) = s.strip_suffix('-') {
            (name, -1.0)
        } else {
            return Err(format!("camera command '{s}' must end with '+' or '-'"));
        };
        match name.to_ascii_lowercase().as_str() {
            "rotate" => Ok(CameraCommand::Rotate(sign)),
            "zoom" => Ok(CameraCommand::Zoom(sign)),
            "move-x" | "movex" => Ok(CameraCommand::MoveX(sign)),
            "move-y" | "movey" => Ok(CameraCommand::MoveY(sign)),
            _ => Err(format!("unknown camera command '{s}'")),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: Vec3f::new(0.0, 0.0, 5.0),
            target: Vec3f::zeros(),
            up: Vec3f::y(),
            speed: 10.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3f, target: Vec3f, up: Vec3f, speed: Fp) -> Self {
        Camera {
            position,
            target,
            up,
            speed,
        }
    }

    /// Recomputed from position, target and up on every call.
    pub fn basis(&self) -> CameraBasis {
        let forward = normalize_or_zero(&(self.target - self.position));
        let right = normalize_or_zero(&forward.cross(&self.up));
        let up = normalize_or_zero(&right.cross(&forward));
        CameraBasis { forward, right, up }
    }

    /// Ray through the center of raster pixel `(x, y)`; `y` grows downwards.
    pub fn primary_ray(&self, basis: &CameraBasis, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let w = width.max(1) as Fp;
        let h = height.max(1) as Fp;
        let aspect_ratio = w / h;
        let scale = (FIELD_OF_VIEW / 2.0).tan();
        let screen_x = ((2.0 * (x as Fp + 0.5)) / w - 1.0) * aspect_ratio * scale;
        let screen_y = (-(2.0 * (y as Fp + 0.5)) / h + 1.0) * scale;
        let direction = normalize_or_zero(
            &(basis.forward + basis.right * screen_x + basis.up * screen_y),
        );
        Ray::new(self.position, direction)
    }

    pub fn apply(&mut self, command: CameraCommand) {
        let basis = self.basis();
        match command {
            CameraCommand::Rotate(sign) => {
                let Some(axis) = Unit::try_new(self.up, 1e-12) else {
                    return;
                };
                let rotation = Rotation3::from_axis_angle(&axis, (sign * self.speed).to_radians());
                self.position = self.target + rotation * (self.position - self.target);
            }
            CameraCommand::Zoom(sign) => {
                let distance = (self.target - self.position).norm();
                let step = (sign * ZOOM_STEP).min(distance - ZOOM_STEP);
                if step > 0.0 || sign < 0.0 {
                    self.position += basis.forward * step;
                }
            }
            CameraCommand::MoveX(sign) => {
                let offset = basis.right * (sign * PAN_STEP);
                self.position += offset;
                self.target += offset;
            }
            CameraCommand::MoveY(sign) => {
                let offset = basis.up * (sign * PAN_STEP);
                self.position += offset;
                self.target += offset;
            }
        }
    }
}
