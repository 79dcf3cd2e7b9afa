use glam::{Vec2, Vec3};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// Half-line starting at `origin` heading along `direction` (unit length).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Slab test. Returns the distance to the first point of the box along
    /// the ray, `0.0` when the origin is already inside.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
            if direction.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }

    /// Distance to the surface of a sphere, `0.0` from inside.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let offset = self.origin - center;
        let c = offset.length_squared() - radius * radius;
        if c <= 0.0 {
            return Some(0.0);
        }
        let b = offset.dot(self.direction);
        if b >= 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        Some(-b - discriminant.sqrt())
    }

    /// Distance to a capped cylinder standing along Y, `0.0` from inside.
    pub fn intersect_cylinder(&self, center: Vec3, radius: f32, half_height: f32) -> Option<f32> {
        let o = self.origin - center;
        let d = self.direction;
        let radius_sq = radius * radius;
        if o.x * o.x + o.z * o.z <= radius_sq && o.y.abs() <= half_height {
            return Some(0.0);
        }

        let mut nearest = None;
        let a = d.x * d.x + d.z * d.z;
        if a > f32::EPSILON {
            let b = o.x * d.x + o.z * d.z;
            let c = o.x * o.x + o.z * o.z - radius_sq;
            let discriminant = b * b - a * c;
            if discriminant >= 0.0 {
                let root = discriminant.sqrt();
                for t in [(-b - root) / a, (-b + root) / a] {
                    if (o.y + t * d.y).abs() <= half_height {
                        nearest = closer(nearest, t);
                    }
                }
            }
        }
        if d.y.abs() > f32::EPSILON {
            for cap in [-half_height, half_height] {
                let t = (cap - o.y) / d.y;
                let point = o + d * t;
                if point.x * point.x + point.z * point.z <= radius_sq {
                    nearest = closer(nearest, t);
                }
            }
        }
        nearest
    }

    /// Distance to a zero-thickness rectangle in the XY plane through
    /// `center`. Rays running parallel to it never hit.
    pub fn intersect_rect(&self, center: Vec3, half_extents: Vec2) -> Option<f32> {
        if self.direction.z.abs() < f32::EPSILON {
            return None;
        }
        let o = self.origin - center;
        let t = -o.z / self.direction.z;
        if t < 0.0 {
            return None;
        }
        let point = o + self.direction * t;
        (point.x.abs() <= half_extents.x && point.y.abs() <= half_extents.y).then_some(t)
    }
}

fn closer(nearest: Option<f32>, t: f32) -> Option<f32> {
    if t < 0.0 {
        return nearest;
    }
    match nearest {
        Some(current) if current <= t => Some(current),
        _ => Some(t),
    }
}
