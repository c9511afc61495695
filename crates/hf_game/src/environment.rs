//! Static world: a circular arena with a boundary wall, trees and rocks.
//!
//! Built once at startup from `EnvironmentConfig`. Placement is seeded, so the
//! same config always yields the same layout. Obstacles are upright cylinders
//! for every gameplay query; their visual shape is the renderer's business.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::collision::{self, flat};
use crate::config::EnvironmentConfig;

const PLACEMENT_ATTEMPTS_PER_OBSTACLE: u32 = 30;
const OBSTACLE_GAP: f32 = 1.0;
const PUSH_OUT_PASSES: u32 = 4;
const PUSH_OUT_MARGIN: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Tree,
    Rock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Base center, always on the ground (y = 0).
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub center: Vec3,
    pub half_length: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone)]
pub struct Arena {
    pub radius: f32,
    pub wall_height: f32,
    pub obstacles: Vec<Obstacle>,
    pub walls: Vec<WallSegment>,
}

impl Arena {
    pub fn build(config: &EnvironmentConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut obstacles: Vec<Obstacle> =
            Vec::with_capacity((config.tree_count + config.rock_count) as usize);

        let placement_radius = config.arena_radius - config.edge_margin;
        place_obstacles(
            &mut obstacles,
            &mut rng,
            ObstacleKind::Tree,
            config.tree_count,
            placement_radius,
            config.clear_radius,
        );
        place_obstacles(
            &mut obstacles,
            &mut rng,
            ObstacleKind::Rock,
            config.rock_count,
            placement_radius,
            config.clear_radius,
        );

        let walls = build_walls(config.arena_radius, config.wall_segments);
        log::info!(
            "Arena built: radius {:.1}, {} obstacles, {} wall segments (seed {:#x})",
            config.arena_radius,
            obstacles.len(),
            walls.len(),
            config.seed
        );

        Self {
            radius: config.arena_radius,
            wall_height: config.wall_height,
            obstacles,
            walls,
        }
    }

    /// Empty arena with no obstacles.
    pub fn open(radius: f32) -> Self {
        Self::with_obstacles(radius, 3.0, Vec::new())
    }

    pub fn with_obstacles(radius: f32, wall_height: f32, obstacles: Vec<Obstacle>) -> Self {
        Self {
            radius,
            wall_height,
            obstacles,
            walls: build_walls(radius, 48),
        }
    }

    /// A circle of `radius` at `position` fits inside the arena and clears
    /// every obstacle by at least the radius sum.
    pub fn is_walkable(&self, position: Vec3, radius: f32) -> bool {
        if flat(position).length() + radius > self.radius {
            return false;
        }
        self.obstacles.iter().all(|o| {
            !collision::circles_overlap(flat(position), radius, flat(o.position), o.radius)
        })
    }

    /// Moves a circle out of any obstacle it overlaps, along the line from the
    /// obstacle's center, then back inside the boundary.
    pub fn push_out(&self, position: Vec3, radius: f32) -> Vec3 {
        let mut resolved = position;
        for _ in 0..PUSH_OUT_PASSES {
            let mut moved = false;
            for o in &self.obstacles {
                let offset = flat(resolved) - flat(o.position);
                let clearance = o.radius + radius + PUSH_OUT_MARGIN;
                if offset.length_squared() >= clearance * clearance {
                    continue;
                }
                let dir = offset.try_normalize().unwrap_or(Vec2::X);
                let target = flat(o.position) + dir * clearance;
                resolved.x = target.x;
                resolved.z = target.y;
                moved = true;
            }

            let limit = (self.radius - radius - PUSH_OUT_MARGIN).max(0.0);
            let from_center = flat(resolved).length();
            if from_center > limit {
                let scale = if from_center > 0.0 { limit / from_center } else { 0.0 };
                resolved.x *= scale;
                resolved.z *= scale;
                moved = true;
            }
            if !moved {
                break;
            }
        }
        resolved
    }

    /// True when `point` is inside solid world geometry: below ground, outside
    /// the wall, or within an obstacle's volume.
    pub fn is_solid(&self, point: Vec3) -> bool {
        if point.y <= 0.0 || flat(point).length() >= self.radius {
            return true;
        }
        self.obstacles.iter().any(|o| {
            point.y <= o.position.y + o.height
                && flat(point).distance_squared(flat(o.position)) < o.radius * o.radius
        })
    }

    /// Nearest distance along `dir` (normalized) at which the ray meets the
    /// ground, the wall or an obstacle.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let mut nearest: Option<f32> = None;
        let mut consider = |t: Option<f32>| {
            if let Some(t) = t {
                if t <= max_distance && nearest.map_or(true, |n| t < n) {
                    nearest = Some(t);
                }
            }
        };

        consider(collision::ray_ground(origin, dir));
        consider(collision::ray_circle_exit(origin, dir, self.radius));
        for obstacle in &self.obstacles {
            consider(collision::ray_upright_cylinder(
                origin,
                dir,
                obstacle.position,
                obstacle.radius,
                obstacle.height,
            ));
        }
        nearest
    }
}

fn place_obstacles(
    obstacles: &mut Vec<Obstacle>,
    rng: &mut ChaCha8Rng,
    kind: ObstacleKind,
    count: u32,
    placement_radius: f32,
    clear_radius: f32,
) {
    let mut placed = 0;
    let mut attempts = 0;
    let max_attempts = count.saturating_mul(PLACEMENT_ATTEMPTS_PER_OBSTACLE);

    while placed < count && attempts < max_attempts {
        attempts += 1;
        let (radius, height) = match kind {
            ObstacleKind::Tree => (rng.gen_range(0.4..0.7), rng.gen_range(5.0..8.0)),
            ObstacleKind::Rock => (rng.gen_range(0.8..1.6), rng.gen_range(0.6..1.4)),
        };
        let distance = placement_radius * rng.gen::<f32>().sqrt();
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let position = Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

        if distance - radius < clear_radius || distance + radius > placement_radius {
            continue;
        }
        let overlaps = obstacles.iter().any(|o| {
            collision::circles_overlap(
                flat(position),
                radius + OBSTACLE_GAP,
                flat(o.position),
                o.radius,
            )
        });
        if overlaps {
            continue;
        }

        obstacles.push(Obstacle {
            kind,
            position,
            radius,
            height,
            yaw: rng.gen_range(0.0..std::f32::consts::TAU),
        });
        placed += 1;
    }

    if placed < count {
        log::warn!(
            "Placed only {placed}/{count} {:?} obstacles after {attempts} attempts",
            kind
        );
    }
}

fn build_walls(radius: f32, segments: u32) -> Vec<WallSegment> {
    let segments = segments.max(3);
    let step = std::f32::consts::TAU / segments as f32;
    // Chord half-length plus a little overlap so corners do not gap.
    let half_length = radius * (step * 0.5).sin() * 1.04;
    (0..segments)
        .map(|i| {
            let angle = (i as f32 + 0.5) * step;
            WallSegment {
                center: Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius),
                half_length,
                yaw: angle + std::f32::consts::FRAC_PI_2,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic_for_a_seed() {
        let config = EnvironmentConfig::default();
        let a = Arena::build(&config);
        let b = Arena::build(&config);
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.walls, b.walls);
    }

    #[test]
    fn different_seeds_give_different_layouts() {
        let config = EnvironmentConfig::default();
        let other = EnvironmentConfig {
            seed: config.seed + 1,
            ..config.clone()
        };
        assert_ne!(Arena::build(&config).obstacles, Arena::build(&other).obstacles);
    }

    #[test]
    fn obstacles_respect_clear_zone_and_edge() {
        let config = EnvironmentConfig::default();
        let arena = Arena::build(&config);
        assert!(!arena.obstacles.is_empty());
        for o in &arena.obstacles {
            let d = flat(o.position).length();
            assert!(d - o.radius >= config.clear_radius - 1e-4);
            assert!(d + o.radius <= config.arena_radius - config.edge_margin + 1e-4);
        }
        // Player spawn must be walkable.
        assert!(arena.is_walkable(Vec3::new(0.0, 1.7, 0.0), 0.5));
    }

    #[test]
    fn obstacles_do_not_overlap_each_other() {
        let arena = Arena::build(&EnvironmentConfig::default());
        for (i, a) in arena.obstacles.iter().enumerate() {
            for b in &arena.obstacles[i + 1..] {
                assert!(!collision::circles_overlap(
                    flat(a.position),
                    a.radius,
                    flat(b.position),
                    b.radius
                ));
            }
        }
    }

    #[test]
    fn wall_count_matches_config() {
        let config = EnvironmentConfig {
            wall_segments: 12,
            ..EnvironmentConfig::default()
        };
        let arena = Arena::build(&config);
        assert_eq!(arena.walls.len(), 12);
        for wall in &arena.walls {
            assert!((flat(wall.center).length() - config.arena_radius).abs() < 1e-3);
        }
    }

    #[test]
    fn raycast_prefers_nearest_surface() {
        let arena = Arena::with_obstacles(
            50.0,
            3.0,
            vec![Obstacle {
                kind: ObstacleKind::Tree,
                position: Vec3::new(0.0, 0.0, -10.0),
                radius: 0.5,
                height: 6.0,
                yaw: 0.0,
            }],
        );
        let t = arena
            .raycast(Vec3::new(0.0, 1.7, 0.0), Vec3::NEG_Z, 200.0)
            .expect("tree in the way");
        assert!((t - 9.5).abs() < 1e-3);

        // Looking the other way only the wall remains.
        let t = arena
            .raycast(Vec3::new(0.0, 1.7, 0.0), Vec3::Z, 200.0)
            .expect("wall");
        assert!((t - 50.0).abs() < 1e-2);
    }

    #[test]
    fn is_solid_covers_ground_wall_and_obstacles() {
        let arena = Arena::with_obstacles(
            20.0,
            3.0,
            vec![Obstacle {
                kind: ObstacleKind::Rock,
                position: Vec3::new(5.0, 0.0, 0.0),
                radius: 1.0,
                height: 1.0,
                yaw: 0.0,
            }],
        );
        assert!(arena.is_solid(Vec3::new(0.0, -0.1, 0.0)));
        assert!(arena.is_solid(Vec3::new(21.0, 1.0, 0.0)));
        assert!(arena.is_solid(Vec3::new(5.2, 0.5, 0.0)));
        assert!(!arena.is_solid(Vec3::new(5.2, 1.5, 0.0)));
        assert!(!arena.is_solid(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn push_out_clears_overlapped_obstacle_along_center_line() {
        let arena = Arena::with_obstacles(
            30.0,
            3.0,
            vec![Obstacle {
                kind: ObstacleKind::Rock,
                position: Vec3::new(5.0, 0.0, 0.0),
                radius: 2.0,
                height: 1.0,
                yaw: 0.0,
            }],
        );
        let inside = Vec3::new(6.0, 0.0, 0.0);
        assert!(!arena.is_walkable(inside, 0.5));
        let resolved = arena.push_out(inside, 0.5);
        assert!(arena.is_walkable(resolved, 0.5));
        assert!(resolved.x > 7.5 && resolved.z.abs() < 1e-5);

        // Already clear: untouched.
        let clear = Vec3::new(-5.0, 0.0, 2.0);
        assert_eq!(arena.push_out(clear, 0.5), clear);
    }

    #[test]
    fn push_out_from_exact_center_stays_inside_boundary() {
        let arena = Arena::with_obstacles(
            10.0,
            3.0,
            vec![Obstacle {
                kind: ObstacleKind::Rock,
                position: Vec3::ZERO,
                radius: 3.0,
                height: 1.0,
                yaw: 0.0,
            }],
        );
        let resolved = arena.push_out(Vec3::ZERO, 0.5);
        assert!(arena.is_walkable(resolved, 0.5));
    }
}
