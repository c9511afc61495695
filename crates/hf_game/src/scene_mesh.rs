//! Turns the world into a flat-shaded box mesh, rebuilt every frame.

use glam::Vec3;
use hf_render::MeshBuilder;

use crate::environment::{Arena, ObstacleKind};
use crate::powerup::PowerupKind;
use crate::world::World;

const GROUND_SEGMENTS: u32 = 64;
const SKY_HALF_EXTENT: f32 = 180.0;
const WALL_THICKNESS: f32 = 0.6;
const PROJECTILE_HALF: f32 = 0.08;
const POWERUP_HALF: f32 = 0.3;

const GROUND: [f32; 4] = [0.22, 0.30, 0.16, 1.0];
const SKY: [f32; 4] = [0.32, 0.36, 0.40, 1.0];
const WALL: [f32; 4] = [0.36, 0.32, 0.28, 1.0];
const TRUNK: [f32; 4] = [0.35, 0.24, 0.14, 1.0];
const FOLIAGE: [f32; 4] = [0.12, 0.32, 0.14, 1.0];
const ROCK: [f32; 4] = [0.45, 0.45, 0.47, 1.0];
const ZOMBIE_BODY: [f32; 4] = [0.30, 0.45, 0.28, 1.0];
const ZOMBIE_HEAD: [f32; 4] = [0.50, 0.62, 0.44, 1.0];
const ZOMBIE_FLASH: [f32; 4] = [1.0, 0.25, 0.2, 1.0];
const PROJECTILE: [f32; 4] = [1.0, 0.9, 0.4, 1.0];
const HEART: [f32; 4] = [0.9, 0.15, 0.25, 1.0];
const SODA: [f32; 4] = [0.2, 0.55, 0.95, 1.0];

/// Clears `mesh` and fills it with everything visible in `world`.
pub fn build_scene(mesh: &mut MeshBuilder, world: &World) {
    mesh.clear();
    push_arena(mesh, world.arena());

    let enemy = &world.config().enemy;
    for zombie in world.enemies.iter() {
        let (body, head) = if zombie.is_hit {
            (ZOMBIE_FLASH, ZOMBIE_FLASH)
        } else {
            (ZOMBIE_BODY, ZOMBIE_HEAD)
        };
        let body_height = enemy.height * 0.75;
        let head_half = enemy.height * 0.125;
        mesh.push_box(
            zombie.position + Vec3::Y * (body_height * 0.5),
            Vec3::new(enemy.radius * 0.7, body_height * 0.5, enemy.radius * 0.45),
            zombie.yaw,
            body,
        );
        mesh.push_box(
            zombie.position + Vec3::Y * (body_height + head_half),
            Vec3::splat(head_half),
            zombie.yaw,
            head,
        );
    }

    for projectile in world.projectiles.iter() {
        mesh.push_unlit_box(projectile.position, Vec3::splat(PROJECTILE_HALF), PROJECTILE);
    }

    let powerups = &world.config().powerups;
    for powerup in world.powerups.iter() {
        let (center, spin) = powerup.pose(world.clock(), powerups);
        match powerup.kind {
            PowerupKind::Heart => {
                // Two tilted lobes over a point read as a heart from any side.
                mesh.push_box(center, Vec3::splat(POWERUP_HALF * 0.8), spin, HEART);
                mesh.push_box(
                    center + Vec3::Y * POWERUP_HALF,
                    Vec3::new(POWERUP_HALF * 1.1, POWERUP_HALF * 0.45, POWERUP_HALF * 0.5),
                    spin,
                    HEART,
                );
            }
            PowerupKind::Soda => {
                mesh.push_box(
                    center,
                    Vec3::new(POWERUP_HALF * 0.55, POWERUP_HALF * 1.2, POWERUP_HALF * 0.55),
                    spin,
                    SODA,
                );
            }
        }
    }
}

fn push_arena(mesh: &mut MeshBuilder, arena: &Arena) {
    mesh.push_unlit_box(Vec3::ZERO, Vec3::splat(SKY_HALF_EXTENT), SKY);
    mesh.push_disc(Vec3::ZERO, arena.radius + WALL_THICKNESS, GROUND_SEGMENTS, GROUND);

    for wall in &arena.walls {
        mesh.push_box(
            wall.center + Vec3::Y * (arena.wall_height * 0.5),
            Vec3::new(wall.half_length, arena.wall_height * 0.5, WALL_THICKNESS * 0.5),
            wall.yaw,
            WALL,
        );
    }

    for obstacle in &arena.obstacles {
        let base = obstacle.position;
        match obstacle.kind {
            ObstacleKind::Tree => {
                let trunk_height = obstacle.height * 0.45;
                mesh.push_box(
                    base + Vec3::Y * (trunk_height * 0.5),
                    Vec3::new(obstacle.radius * 0.5, trunk_height * 0.5, obstacle.radius * 0.5),
                    obstacle.yaw,
                    TRUNK,
                );
                let crown_height = obstacle.height - trunk_height;
                mesh.push_box(
                    base + Vec3::Y * (trunk_height + crown_height * 0.5),
                    Vec3::new(obstacle.radius * 2.2, crown_height * 0.5, obstacle.radius * 2.2),
                    obstacle.yaw,
                    FOLIAGE,
                );
            }
            ObstacleKind::Rock => {
                mesh.push_box(
                    base + Vec3::Y * (obstacle.height * 0.5),
                    Vec3::new(obstacle.radius, obstacle.height * 0.5, obstacle.radius * 0.8),
                    obstacle.yaw,
                    ROCK,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::player::PlayerIntent;

    fn open_world() -> World {
        let mut config = GameConfig::default();
        config.environment.tree_count = 0;
        config.environment.rock_count = 0;
        World::new(config)
    }

    #[test]
    fn empty_arena_still_has_sky_ground_and_walls() {
        let world = open_world();
        let mut mesh = MeshBuilder::new();
        build_scene(&mut mesh, &world);
        assert!(!mesh.is_empty());
        let boxes = 1 + world.arena().walls.len();
        let disc_vertices = GROUND_SEGMENTS as usize + 2;
        assert_eq!(mesh.vertices().len(), boxes * 24 + disc_vertices);
    }

    #[test]
    fn mesh_grows_with_obstacles() {
        let world = open_world();
        let mut bare = MeshBuilder::new();
        build_scene(&mut bare, &world);

        let forested = World::new(GameConfig::default());
        let mut mesh = MeshBuilder::new();
        build_scene(&mut mesh, &forested);
        assert!(mesh.vertices().len() > bare.vertices().len());
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let world = open_world();
        let mut mesh = MeshBuilder::new();
        build_scene(&mut mesh, &world);
        let first = mesh.vertices().len();
        build_scene(&mut mesh, &world);
        assert_eq!(mesh.vertices().len(), first);
    }

    #[test]
    fn spawned_enemies_add_two_boxes_each() {
        let mut world = open_world();
        let mut mesh = MeshBuilder::new();
        build_scene(&mut mesh, &world);
        let before = mesh.vertices().len();

        world.start_game();
        let intent = PlayerIntent::default();
        while world.enemies.is_empty() {
            world.tick(&intent);
        }
        build_scene(&mut mesh, &world);
        let enemies = world.enemies.len();
        let extra = mesh.vertices().len() - before;
        assert!(extra >= enemies * 2 * 24);
    }
}
