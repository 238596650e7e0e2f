//! Rays and their intersection tests.

use glam::{Mat4, Vec3};

use crate::constants::picking::EPSILON;
use crate::scene::BoundingBox;

/// Half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray; the direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Maps the ray through an affine transform. The direction is renormalized,
    /// so distances are only preserved for rigid transforms.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let origin = matrix.transform_point3(self.origin);
        let through = matrix.transform_point3(self.origin + self.direction);
        Self::new(origin, through - origin)
    }

    /// Intersection with the horizontal plane `y = height`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the plane lies
    /// behind the origin. A parallel ray lying in the plane hits at its origin.
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<Vec3> {
        let denom = self.direction.y;
        let offset = self.origin.y - height;
        if denom.abs() < EPSILON {
            return (offset.abs() < EPSILON).then_some(self.origin);
        }

        let t = -offset / denom;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Slab test. Returns the entry distance, or the exit distance when the
    /// origin is inside the box.
    pub fn intersect_aabb(&self, bounds: &BoundingBox) -> Option<f32> {
        if bounds.is_empty() {
            return None;
        }

        let inv_dir = self.direction.recip();
        let t1 = (bounds.min - self.origin) * inv_dir;
        let t2 = (bounds.max - self.origin) * inv_dir;

        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        if tmax < 0.0 || tmin > tmax {
            return None;
        }

        Some(if tmin < 0.0 { tmax } else { tmin })
    }

    /// Möller–Trumbore intersection. With `cull_back_faces`, triangles seen
    /// from behind (clockwise from the ray origin) are skipped.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3, cull_back_faces: bool) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < EPSILON || (cull_back_faces && a < 0.0) {
            return None; // Parallel or back-facing
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);

        if t >= 0.0 { Some(t) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_plane_hit() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let hit = ray.intersect_horizontal_plane(1.0).unwrap();
        assert_relative_eq!(hit.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(hit.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_horizontal_plane_misses() {
        // Parallel
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X);
        assert_eq!(ray.intersect_horizontal_plane(0.0), None);
        // Behind
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert_eq!(ray.intersect_horizontal_plane(0.0), None);
        // In plane
        let ray = Ray::new(Vec3::new(1.0, 0.0, 2.0), Vec3::X);
        assert_eq!(ray.intersect_horizontal_plane(0.0), Some(Vec3::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn test_aabb() {
        let bounds = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_relative_eq!(ray.intersect_aabb(&bounds).unwrap(), 4.0);

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_relative_eq!(inside.intersect_aabb(&bounds).unwrap(), 1.0);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(away.intersect_aabb(&bounds), None);
        assert_eq!(ray.intersect_aabb(&BoundingBox::empty()), None);
    }

    #[test]
    fn test_triangle_culling() {
        let (a, b, c) = (Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let front = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        assert_relative_eq!(front.intersect_triangle(a, b, c, true).unwrap(), 3.0);
        assert_eq!(back.intersect_triangle(a, b, c, true), None);
        assert_relative_eq!(back.intersect_triangle(a, b, c, false).unwrap(), 3.0);
    }

    #[test]
    fn test_transform_ray() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let moved = ray.transform(&Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(moved.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(moved.direction.z, 1.0);
    }
}
