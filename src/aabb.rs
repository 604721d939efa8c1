use crate::geometry::{Fp, Intersection, Ray, Vec3f, EPS, FP_INF, FP_NEG_INF};

/// Tolerance for deciding which face a hit point lies on.
pub const FACE_EPS: Fp = 0.0001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

impl Face {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3f,
    pub max: Vec3f,
}

impl Aabb {
    /// Builds the box spanned by two opposite corners given in any order.
    pub fn from_corners(a: Vec3f, b: Vec3f) -> Aabb {
        Aabb {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Slab test. Reports the entry face, or the exit face when the ray starts
    /// inside the box, so the distance is always positive.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let mut t_near = FP_NEG_INF;
        let mut t_far = FP_INF;
        let mut near_axis = None;
        let mut far_axis = None;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction.abs() < EPS {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let mut t = [
                (self.min[axis] - origin) / direction,
                (self.max[axis] - origin) / direction,
            ];
            t.sort_by(|a, b| a.total_cmp(b));
            // strict comparisons keep the earlier axis on ties
            if t[0] > t_near {
                t_near = t[0];
                near_axis = Some(axis);
            }
            if t[1] < t_far {
                t_far = t[1];
                far_axis = Some(axis);
            }
        }
        if t_near > t_far || t_far <= 0.0 {
            return None;
        }

        let (distance, axis, outward) = if t_near > 0.0 {
            (t_near, near_axis?, -1.0)
        } else {
            (t_far, far_axis?, 1.0)
        };
        let mut normal = Vec3f::zeros();
        normal[axis] = outward * ray.direction[axis].signum();
        Some(Intersection {
            distance,
            point: ray.at(distance),
            normal,
            color: None,
        })
    }

    /// The face `point` lies on, if any.
    pub fn face_at(&self, point: &Vec3f) -> Option<Face> {
        let on = |value: Fp, bound: Fp| (value - bound).abs() < FACE_EPS;
        if on(point.y, self.max.y) {
            Some(Face::Top)
        } else if on(point.z, self.max.z) {
            Some(Face::Front)
        } else if on(point.z, self.min.z) {
            Some(Face::Back)
        } else if on(point.x, self.min.x) {
            Some(Face::Left)
        } else if on(point.x, self.max.x) {
            Some(Face::Right)
        } else if on(point.y, self.min.y) {
            Some(Face::Bottom)
        } else {
            None
        }
    }

    /// In-face texture offsets of `point`, measured from `min`.
    pub fn face_offsets(&self, face: Face, point: &Vec3f) -> (Fp, Fp) {
        let d = point - self.min;
        match face {
            Face::Top | Face::Bottom => (d.x.abs(), d.z.abs()),
            Face::Front | Face::Back => (d.x.abs(), d.y.abs()),
            Face::Left | Face::Right => (d.z.abs(), d.y.abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_corners(Vec3f::zeros(), Vec3f::new(1.0, 1.0, 1.0))
    }

    fn close(a: &Vec3f, b: &Vec3f) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn corners_in_any_order() {
        let aabb = Aabb::from_corners(Vec3f::new(-1.5, -0.5, 0.5), Vec3f::new(-2.5, -5.5, 1.5));
        assert_eq!(aabb.min, Vec3f::new(-2.5, -5.5, 0.5));
        assert_eq!(aabb.max, Vec3f::new(-1.5, -0.5, 1.5));
    }

    #[test]
    fn hit_on_positive_z_face() {
        let ray = Ray::new(Vec3f::new(0.5, 0.5, 5.0), -Vec3f::z());
        let hit = unit_box().intersect(&ray).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-9);
        assert!(close(&hit.point, &Vec3f::new(0.5, 0.5, 1.0)));
        assert_eq!(hit.normal, Vec3f::z());
        assert!(hit.color.is_none());
    }

    #[test]
    fn hit_on_negative_x_face_at_an_angle() {
        let ray = Ray::new(
            Vec3f::new(-2.0, 0.5, 0.5),
            Vec3f::new(1.0, 0.1, 0.0).normalize(),
        );
        let hit = unit_box().intersect(&ray).unwrap();
        assert_eq!(hit.normal, -Vec3f::x());
        assert!(hit.point.x.abs() < 1e-9);
    }

    #[test]
    fn miss_when_parallel_outside_slab() {
        let ray = Ray::new(Vec3f::new(2.0, 0.5, 5.0), -Vec3f::z());
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn miss_when_box_is_behind() {
        let ray = Ray::new(Vec3f::new(0.5, 0.5, 5.0), Vec3f::z());
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn miss_when_slabs_do_not_overlap() {
        let ray = Ray::new(
            Vec3f::new(-1.0, 3.0, 0.5),
            Vec3f::new(1.0, -0.2, 0.0).normalize(),
        );
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn origin_inside_reports_exit_face() {
        let ray = Ray::new(Vec3f::new(0.5, 0.5, 0.5), Vec3f::y());
        let hit = unit_box().intersect(&ray).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-9);
        assert_eq!(hit.normal, Vec3f::y());
    }

    #[test]
    fn zero_direction_never_hits() {
        let ray = Ray::new(Vec3f::new(0.5, 0.5, 0.5), Vec3f::zeros());
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn faces_and_offsets() {
        let aabb = Aabb::from_corners(Vec3f::new(1.0, 2.0, 3.0), Vec3f::new(2.0, 4.0, 5.0));
        let top = Vec3f::new(1.25, 4.0, 3.5);
        assert_eq!(aabb.face_at(&top), Some(Face::Top));
        let (u, v) = aabb.face_offsets(Face::Top, &top);
        assert!((u - 0.25).abs() < 1e-9 && (v - 0.5).abs() < 1e-9);

        let left = Vec3f::new(1.0, 3.0, 4.0);
        assert_eq!(aabb.face_at(&left), Some(Face::Left));
        let (u, v) = aabb.face_offsets(Face::Left, &left);
        assert!((u - 1.0).abs() < 1e-9 && (v - 1.0).abs() < 1e-9);

        assert_eq!(aabb.face_at(&Vec3f::new(1.5, 2.0, 4.0)), Some(Face::Bottom));
        assert_eq!(aabb.face_at(&Vec3f::new(1.5, 3.0, 4.0)), None);
    }
}
