//! Zombies: spawn on a ring, walk straight at the player, bite on a cooldown.
//!
//! Movement reuses the player's axis-separable collision so enemies slide
//! around trunks and rocks instead of walking through them. There is no
//! pathfinding and no separation between enemies.

use std::time::Duration;

use glam::Vec3;
use rand::Rng;

use crate::collision::{flat, move_and_collide};
use crate::config::EnemyConfig;
use crate::entity::EntityId;
use crate::environment::Arena;
use crate::projectile::HitSphere;

const SPAWN_ANGLE_ATTEMPTS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    /// Feet position on the ground.
    pub position: Vec3,
    pub yaw: f32,
    pub health: u32,
    pub last_hit: Option<Duration>,
    pub last_attack: Option<Duration>,
    pub is_hit: bool,
}

impl Enemy {
    pub fn hit_center(&self, config: &EnemyConfig) -> Vec3 {
        self.position + Vec3::Y * (config.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Landed inside the debounce window of the previous hit; not recorded.
    Ignored,
    Damaged { remaining: u32 },
    Killed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyAttack {
    pub enemy: EntityId,
    pub damage: f32,
    pub from: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
}

impl EnemyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new enemy on the spawn ring at a random angle. A few angles are
    /// tried so the enemy does not start inside an obstacle. When every angle is
    /// blocked, the last candidate is pushed clear of whatever it overlaps.
    pub fn spawn<R: Rng>(
        &mut self,
        id: EntityId,
        wave: u32,
        config: &EnemyConfig,
        arena: &Arena,
        rng: &mut R,
    ) -> Vec3 {
        let mut position = Vec3::ZERO;
        for _ in 0..SPAWN_ANGLE_ATTEMPTS {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            position = Vec3::new(
                angle.cos() * config.spawn_radius,
                0.0,
                angle.sin() * config.spawn_radius,
            );
            if arena.is_walkable(position, config.radius) {
                break;
            }
        }
        if !arena.is_walkable(position, config.radius) {
            position = arena.push_out(position, config.radius);
        }

        log::debug!("Enemy {:?} spawned for wave {wave} at {:?}", id, position);
        self.enemies.push(Enemy {
            id,
            position,
            yaw: 0.0,
            health: config.health,
            last_hit: None,
            last_attack: None,
            is_hit: false,
        });
        position
    }

    /// Moves every enemy toward `target` and resolves attacks. Enemies already
    /// within attack range hold position and bite when their cooldown allows.
    pub fn step(
        &mut self,
        now: Duration,
        dt: f32,
        target: Vec3,
        config: &EnemyConfig,
        arena: &Arena,
    ) -> Vec<EnemyAttack> {
        let mut attacks = Vec::new();
        let flash = config.hit_flash();
        let cooldown = config.attack_cooldown();

        for enemy in &mut self.enemies {
            if enemy.is_hit
                && enemy
                    .last_hit
                    .map_or(true, |t| now.saturating_sub(t) >= flash)
            {
                enemy.is_hit = false;
            }

            let to_target = flat(target) - flat(enemy.position);
            let distance = to_target.length();
            if distance > f32::EPSILON {
                enemy.yaw = to_target.x.atan2(-to_target.y);
            }

            if distance > config.attack_range {
                let step = (config.speed * dt).min(distance - config.attack_range);
                let delta = to_target / distance * step;
                enemy.position =
                    move_and_collide(arena, enemy.position, config.radius, delta.x, delta.y);
                continue;
            }

            let ready = enemy
                .last_attack
                .map_or(true, |t| now.saturating_sub(t) >= cooldown);
            if ready {
                enemy.last_attack = Some(now);
                attacks.push(EnemyAttack {
                    enemy: enemy.id,
                    damage: config.attack_damage,
                    from: enemy.position,
                });
            }
        }

        attacks
    }

    /// Records a hit on `id`. A hit within the debounce window of the previous
    /// recorded hit is ignored. A killed enemy is removed immediately.
    pub fn hit(&mut self, id: EntityId, now: Duration, config: &EnemyConfig) -> Option<HitOutcome> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        let enemy = &mut self.enemies[index];

        let debounced = enemy
            .last_hit
            .is_some_and(|t| now.saturating_sub(t) < config.hit_debounce());
        if debounced {
            return Some(HitOutcome::Ignored);
        }

        enemy.last_hit = Some(now);
        enemy.is_hit = true;
        enemy.health = enemy.health.saturating_sub(1);
        if enemy.health == 0 {
            self.enemies.remove(index);
            return Some(HitOutcome::Killed);
        }
        Some(HitOutcome::Damaged {
            remaining: enemy.health,
        })
    }

    pub fn hit_spheres(&self, config: &EnemyConfig) -> Vec<HitSphere> {
        self.enemies
            .iter()
            .map(|e| HitSphere {
                id: e.id,
                center: e.hit_center(config),
                radius: config.hit_radius,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }
}
