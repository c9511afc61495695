//! Collision in this game is radius-sum distance tests on the ground plane plus
//! a few ray primitives for aiming.
//!
//! Player movement uses **axis-separable rejection**: the X displacement is
//! applied first and kept only if the resulting position is walkable, then Z is
//! tried from the (possibly updated) X. A blocked axis is dropped whole; this
//! gives the familiar slide along walls and tree trunks without any
//! penetration resolution.

use glam::{Vec2, Vec3};

use crate::environment::Arena;

/// Horizontal (XZ) projection of a world position.
pub fn flat(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

pub fn distance_xz(a: Vec3, b: Vec3) -> f32 {
    flat(a).distance(flat(b))
}

/// Strict overlap: touching circles are not overlapping.
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance_squared(b) < (radius_a + radius_b) * (radius_a + radius_b)
}

/// Returns where a body of `radius` at `position` ends up after trying the
/// X then Z displacement.
pub fn move_and_collide(arena: &Arena, position: Vec3, radius: f32, dx: f32, dz: f32) -> Vec3 {
    let mut moved = position;

    if dx != 0.0 {
        let candidate = Vec3::new(moved.x + dx, moved.y, moved.z);
        if arena.is_walkable(candidate, radius) {
            moved = candidate;
        }
    }

    if dz != 0.0 {
        let candidate = Vec3::new(moved.x, moved.y, moved.z + dz);
        if arena.is_walkable(candidate, radius) {
            moved = candidate;
        }
    }

    moved
}

/// Distance along a normalized ray to the first intersection with a sphere.
/// Origins inside the sphere report a hit at distance 0.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_origin = origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = to_origin.dot(dir);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Ray against an upright cylinder standing on the ground at `base`.
pub fn ray_upright_cylinder(
    origin: Vec3,
    dir: Vec3,
    base: Vec3,
    radius: f32,
    height: f32,
) -> Option<f32> {
    let o = flat(origin - base);
    let d = flat(dir);
    let a = d.length_squared();
    let top = base.y + height;

    if a < f32::EPSILON {
        // Vertical ray: hit only if it starts above the cap looking down (or inside).
        if o.length_squared() > radius * radius {
            return None;
        }
        if origin.y >= base.y && origin.y <= top {
            return Some(0.0);
        }
        if origin.y > top && dir.y < 0.0 {
            return Some((origin.y - top) / -dir.y);
        }
        return None;
    }

    let b = o.dot(d);
    let c = o.length_squared() - radius * radius;
    if c <= 0.0 && origin.y >= base.y && origin.y <= top {
        return Some(0.0);
    }
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    if t >= 0.0 {
        let y = origin.y + dir.y * t;
        if y >= base.y && y <= top {
            return Some(t);
        }
    }
    // Side missed; check the top cap for rays descending onto it.
    if dir.y < 0.0 && origin.y > top {
        let t_cap = (origin.y - top) / -dir.y;
        let at = flat(origin + dir * t_cap - base);
        if at.length_squared() <= radius * radius {
            return Some(t_cap);
        }
    }
    None
}

/// Ray against the ground plane y = 0.
pub fn ray_ground(origin: Vec3, dir: Vec3) -> Option<f32> {
    if dir.y >= 0.0 || origin.y < 0.0 {
        return None;
    }
    Some(origin.y / -dir.y)
}

/// Distance at which a ray starting inside the arena circle crosses its edge.
pub fn ray_circle_exit(origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
    let o = flat(origin);
    let d = flat(dir);
    let a = d.length_squared();
    if a < f32::EPSILON {
        return None;
    }
    let b = o.dot(d);
    let c = o.length_squared() - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b + discriminant.sqrt()) / a;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Obstacle, ObstacleKind};

    fn arena_with_rock_at(x: f32, z: f32, radius: f32) -> Arena {
        Arena::with_obstacles(
            50.0,
            3.0,
            vec![Obstacle {
                kind: ObstacleKind::Rock,
                position: Vec3::new(x, 0.0, z),
                radius,
                height: 1.0,
                yaw: 0.0,
            }],
        )
    }

    #[test]
    fn free_move_is_applied_on_both_axes() {
        let arena = Arena::open(50.0);
        let moved = move_and_collide(&arena, Vec3::new(0.0, 1.7, 0.0), 0.5, 1.0, -2.0);
        assert_eq!(moved, Vec3::new(1.0, 1.7, -2.0));
    }

    #[test]
    fn move_past_arena_edge_is_rejected_per_axis() {
        let arena = Arena::open(10.0);
        let start = Vec3::new(9.0, 1.7, 0.0);
        let moved = move_and_collide(&arena, start, 0.5, 1.0, 1.0);
        assert_eq!(moved.x, 9.0);
        assert_eq!(moved.z, 1.0);
        assert!(arena.is_walkable(moved, 0.5));
    }

    #[test]
    fn obstacle_blocks_only_the_axis_that_hits_it() {
        let arena = arena_with_rock_at(2.0, 0.0, 1.0);
        // Player radius 0.5 + rock radius 1.0 = 1.5 minimum distance.
        let start = Vec3::new(0.4, 1.7, 0.0);
        let moved = move_and_collide(&arena, start, 0.5, 0.3, 0.2);
        assert_eq!(moved.x, start.x);
        assert!((moved.z - 0.2).abs() < 1e-6);
        assert!(distance_xz(moved, Vec3::new(2.0, 0.0, 0.0)) >= 1.5);
    }

    #[test]
    fn touching_circles_do_not_overlap() {
        assert!(!circles_overlap(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0));
        assert!(circles_overlap(Vec2::ZERO, 1.0, Vec2::new(1.9, 0.0), 1.0));
    }

    #[test]
    fn ray_sphere_hits_front_surface() {
        let t = ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -10.0), 1.0)
            .expect("should hit");
        assert!((t - 9.0).abs() < 1e-4);
        assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -10.0), 1.0).is_none());
    }

    #[test]
    fn ray_cylinder_hits_side_and_misses_above() {
        let base = Vec3::new(0.0, 0.0, -10.0);
        let hit = ray_upright_cylinder(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, base, 1.0, 3.0)
            .expect("side hit");
        assert!((hit - 9.0).abs() < 1e-4);
        assert!(
            ray_upright_cylinder(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z, base, 1.0, 3.0).is_none()
        );
    }

    #[test]
    fn ray_ground_only_for_descending_rays() {
        let down = Vec3::new(0.0, -1.0, -1.0).normalize();
        let t = ray_ground(Vec3::new(0.0, 2.0, 0.0), down).expect("hits ground");
        assert!((t - 2.0 * std::f32::consts::SQRT_2).abs() < 1e-4);
        assert!(ray_ground(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Z).is_none());
    }

    #[test]
    fn ray_circle_exit_from_center() {
        let t = ray_circle_exit(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 50.0).expect("exits");
        assert!((t - 50.0).abs() < 1e-3);
    }
}
