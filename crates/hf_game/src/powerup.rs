//! Collectible pickups that restore health or stamina.

use std::time::Duration;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::collision::{distance_xz, flat};
use crate::config::PowerupConfig;
use crate::entity::EntityId;
use crate::environment::Arena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    Heart,
    Soda,
}

impl PowerupKind {
    pub fn label(self) -> &'static str {
        match self {
            PowerupKind::Heart => "Heart",
            PowerupKind::Soda => "Soda",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Powerup {
    pub id: EntityId,
    pub kind: PowerupKind,
    /// Ground position; the hover height is applied on top.
    pub position: Vec3,
    pub spawned_at: Duration,
    pub phase: f32,
}

impl Powerup {
    /// Animated world transform: hover height and spin angle at `now`.
    pub fn pose(&self, now: Duration, config: &PowerupConfig) -> (Vec3, f32) {
        let t = now.as_secs_f32();
        let y = config.hover_height + (t * config.hover_speed + self.phase).sin() * config.hover_amplitude;
        let spin = (now.saturating_sub(self.spawned_at).as_secs_f32() * config.spin_speed)
            .rem_euclid(std::f32::consts::TAU);
        (Vec3::new(self.position.x, y, self.position.z), spin)
    }
}

/// Why a spawn check did not produce a power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSkip {
    AtCapacity,
    TooSoon,
    RollFailed,
    NoValidPosition,
}

/// What the player needs right now; pickups only apply when below max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupNeeds {
    pub health_full: bool,
    pub stamina_full: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PowerupManager {
    powerups: Vec<Powerup>,
    last_spawn: Option<Duration>,
}

impl PowerupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// One periodic spawn check. Gates are evaluated in order: capacity,
    /// minimum interval, then the wave-scaled roll.
    #[allow(clippy::too_many_arguments)]
    pub fn try_spawn<R: Rng>(
        &mut self,
        id: EntityId,
        now: Duration,
        wave: u32,
        config: &PowerupConfig,
        arena: &Arena,
        enemies: &[Vec3],
        rng: &mut R,
    ) -> Result<&Powerup, SpawnSkip> {
        if self.powerups.len() >= config.max_active {
            return Err(SpawnSkip::AtCapacity);
        }
        if self
            .last_spawn
            .is_some_and(|t| now.saturating_sub(t) < config.min_interval())
        {
            return Err(SpawnSkip::TooSoon);
        }
        if rng.gen::<f32>() >= config.spawn_chance(wave) {
            return Err(SpawnSkip::RollFailed);
        }

        let Some(position) = self.find_position(config, arena, enemies, rng) else {
            log::warn!(
                "No valid power-up position after {} attempts",
                config.spawn_attempts
            );
            return Err(SpawnSkip::NoValidPosition);
        };

        let kind = if rng.gen_bool(0.5) {
            PowerupKind::Heart
        } else {
            PowerupKind::Soda
        };
        let phase = rng.gen_range(0.0..std::f32::consts::TAU);
        self.last_spawn = Some(now);
        self.powerups.push(Powerup {
            id,
            kind,
            position,
            spawned_at: now,
            phase,
        });
        log::info!("{} power-up spawned at ({:.1}, {:.1})", kind.label(), position.x, position.z);
        Ok(&self.powerups[self.powerups.len() - 1])
    }

    fn find_position<R: Rng>(
        &self,
        config: &PowerupConfig,
        arena: &Arena,
        enemies: &[Vec3],
        rng: &mut R,
    ) -> Option<Vec3> {
        let max_radius = arena.radius - config.edge_margin;
        (0..config.spawn_attempts).find_map(|_| {
            let distance = max_radius * rng.gen::<f32>().sqrt();
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let candidate = Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);
            self.is_valid_position(candidate, config, arena, enemies)
                .then_some(candidate)
        })
    }

    fn is_valid_position(
        &self,
        candidate: Vec3,
        config: &PowerupConfig,
        arena: &Arena,
        enemies: &[Vec3],
    ) -> bool {
        let c = flat(candidate);
        if c.length() > arena.radius - config.edge_margin {
            return false;
        }
        let clear_of = |other: Vec2, min: f32| c.distance_squared(other) >= min * min;
        arena
            .obstacles
            .iter()
            .all(|o| clear_of(flat(o.position), config.min_obstacle_distance + o.radius))
            && enemies
                .iter()
                .all(|e| clear_of(flat(*e), config.min_enemy_distance))
            && self
                .powerups
                .iter()
                .all(|p| clear_of(flat(p.position), config.min_powerup_distance))
    }

    /// Removes and returns every power-up within pickup range whose effect the
    /// player can use. Power-ups for a full resource stay where they are.
    pub fn collect(
        &mut self,
        player: Vec3,
        needs: PickupNeeds,
        config: &PowerupConfig,
    ) -> Vec<Powerup> {
        let mut collected = Vec::new();
        let mut needs = needs;
        self.powerups.retain(|p| {
            if distance_xz(p.position, player) > config.pickup_radius {
                return true;
            }
            let usable = match p.kind {
                PowerupKind::Heart => !needs.health_full,
                PowerupKind::Soda => !needs.stamina_full,
            };
            if !usable {
                return true;
            }
            // Heart restores to full, so a second heart in range stays put.
            if p.kind == PowerupKind::Heart {
                needs.health_full = true;
            }
            collected.push(p.clone());
            false
        });
        collected
    }

    pub fn clear(&mut self) {
        self.powerups.clear();
        self.last_spawn = None;
    }

    pub fn len(&self) -> usize {
        self.powerups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powerups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Powerup> {
        self.powerups.iter()
    }

    #[cfg(test)]
    fn insert(&mut self, powerup: Powerup) {
        self.powerups.push(powerup);
    }
}
