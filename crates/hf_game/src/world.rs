//! The simulation: every piece of gameplay state, advanced one fixed step at a
//! time by `tick`.
//!
//! Tick order is fixed: player, projectiles, enemies, power-ups, due scheduler
//! tasks, then the wave check. The world only reports what happened through
//! the returned `GameEvent`s; sound, UI and rendering read from it afterwards.

use std::time::Duration;

use glam::Vec3;
use hf_core::time::FIXED_STEP;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::collision;
use crate::config::{EnvironmentConfig, GameConfig};
use crate::enemy::{EnemyManager, HitOutcome};
use crate::entity::{EntityId, EntityIds};
use crate::environment::Arena;
use crate::events::GameEvent;
use crate::player::{Player, PlayerIntent};
use crate::powerup::{PickupNeeds, PowerupKind, PowerupManager};
use crate::projectile::{Impact, ProjectileSet};
use crate::scheduler::{Scheduler, Task};
use crate::wave::WaveState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Title,
    Playing,
    Paused,
    GameOver,
}

pub struct World {
    config: GameConfig,
    arena: Arena,
    arena_config: EnvironmentConfig,
    rng: ChaCha8Rng,
    ids: EntityIds,
    clock: Duration,
    phase: GamePhase,
    pub player: Player,
    pub enemies: EnemyManager,
    pub projectiles: ProjectileSet,
    pub powerups: PowerupManager,
    pub waves: WaveState,
    scheduler: Scheduler<Task>,
    score: u32,
}

impl World {
    pub fn new(config: GameConfig) -> Self {
        let arena = Arena::build(&config.environment);
        // Gameplay randomness is decoupled from the layout so tuning spawns
        // does not move trees.
        let rng = ChaCha8Rng::seed_from_u64(config.environment.seed.rotate_left(17) ^ 0x9e37_79b9);
        Self {
            player: Player::new(&config.player, &config.stamina),
            projectiles: ProjectileSet::new(config.weapon.max_projectiles),
            arena_config: config.environment.clone(),
            arena,
            rng,
            ids: EntityIds::default(),
            clock: Duration::ZERO,
            phase: GamePhase::Title,
            enemies: EnemyManager::new(),
            powerups: PowerupManager::new(),
            waves: WaveState::default(),
            scheduler: Scheduler::new(),
            score: 0,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn scheduled_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Resets every transient collection and begins a new session. Wave 1
    /// starts after the grace period.
    pub fn start_game(&mut self) {
        if self.arena_config != self.config.environment {
            self.arena = Arena::build(&self.config.environment);
            self.arena_config = self.config.environment.clone();
        }

        self.player = Player::new(&self.config.player, &self.config.stamina);
        self.enemies.clear();
        self.projectiles.clear();
        self.projectiles.set_max(self.config.weapon.max_projectiles);
        self.powerups.clear();
        self.waves.reset();
        self.scheduler.clear();
        self.score = 0;

        let now = self.clock;
        self.scheduler
            .schedule_at(now + self.config.waves.first_wave_delay(), Task::StartWave(1));
        self.scheduler
            .schedule_at(now + self.config.powerups.check_interval(), Task::PowerupCheck);
        self.phase = GamePhase::Playing;
        log::info!("Game started");
    }

    /// Stops the session: pending spawns and checks are cancelled.
    pub fn end_game(&mut self) -> GameEvent {
        self.phase = GamePhase::GameOver;
        self.scheduler.clear();
        log::info!(
            "Game over: score {}, reached wave {}",
            self.score,
            self.waves.number
        );
        GameEvent::GameOver {
            score: self.score,
            wave: self.waves.number,
        }
    }

    pub fn quit_to_title(&mut self) {
        self.scheduler.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.powerups.clear();
        self.phase = GamePhase::Title;
    }

    pub fn toggle_pause(&mut self) -> GamePhase {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
        self.phase
    }

    /// Applies new tuning. Layout changes wait for the next `start_game`.
    pub fn reload_config(&mut self, config: GameConfig) {
        if config.environment != self.arena_config {
            log::info!("Arena settings changed; the new layout applies on the next game");
        }
        self.projectiles.set_max(config.weapon.max_projectiles);
        self.config = config;
    }

    /// Advances the simulation by one fixed step. Does nothing unless playing.
    pub fn tick(&mut self, intent: &PlayerIntent) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }
        self.clock += FIXED_STEP;
        let dt = FIXED_STEP.as_secs_f32();

        self.update_player(intent, dt, &mut events);
        self.update_projectiles(dt, &mut events);
        self.update_enemies(dt, &mut events);
        if self.phase != GamePhase::Playing {
            return events;
        }
        self.update_powerups(&mut events);
        self.run_due_tasks(&mut events);
        self.check_wave(&mut events);
        events
    }

    fn update_player(&mut self, intent: &PlayerIntent, dt: f32, events: &mut Vec<GameEvent>) {
        let step = self.player.step(
            intent,
            &self.config.player,
            &self.config.stamina,
            &self.arena,
            dt,
        );
        if step.jumped {
            events.push(GameEvent::Jumped);
        }

        let weapon = &self.config.weapon;
        if intent.fire && self.player.can_fire(self.clock, weapon.cooldown()) {
            let target = self.aim_point();
            let id = self.ids.allocate();
            let muzzle = self.player.muzzle();
            if let Some(evicted) =
                self.projectiles
                    .spawn(id, muzzle, target, weapon.projectile_speed, self.clock)
            {
                log::trace!("Projectile {:?} evicted", evicted);
            }
            self.player.last_shot = Some(self.clock);
            events.push(GameEvent::Shot { projectile: id });
        }
    }

    /// Where a ray from the eye along the view direction first hits something,
    /// or the point at maximum range.
    pub fn aim_point(&self) -> Vec3 {
        let eye = self.player.eye();
        let dir = self.player.view_dir();
        let range = self.config.weapon.ray_range;
        let enemy_config = &self.config.enemy;

        let world_hit = self.arena.raycast(eye, dir, range);
        let enemy_hit = self
            .enemies
            .iter()
            .filter_map(|e| {
                collision::ray_sphere(eye, dir, e.hit_center(enemy_config), enemy_config.hit_radius)
            })
            .filter(|t| *t <= range)
            .min_by(f32::total_cmp);

        let t = match (world_hit, enemy_hit) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => a.or(b).unwrap_or(range),
        };
        eye + dir * t
    }

    fn update_projectiles(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        let targets = self.enemies.hit_spheres(&self.config.enemy);
        let impacts = self.projectiles.step(
            self.clock,
            dt,
            self.config.weapon.lifetime(),
            self.config.weapon.projectile_radius,
            &self.arena,
            &targets,
        );
        for (_, impact) in impacts {
            if let Impact::Enemy(enemy) = impact {
                self.damage_enemy(enemy, events);
            }
        }
    }

    fn damage_enemy(&mut self, enemy: EntityId, events: &mut Vec<GameEvent>) {
        match self.enemies.hit(enemy, self.clock, &self.config.enemy) {
            Some(HitOutcome::Damaged { .. }) => events.push(GameEvent::EnemyHit { enemy }),
            Some(HitOutcome::Killed) => {
                let score = self.config.waves.kill_score;
                self.score += score;
                self.waves.record_kill();
                events.push(GameEvent::EnemyKilled { enemy, score });
                self.check_wave(events);
            }
            Some(HitOutcome::Ignored) | None => {}
        }
    }

    fn update_enemies(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        let attacks = self.enemies.step(
            self.clock,
            dt,
            self.player.position,
            &self.config.enemy,
            &self.arena,
        );
        for attack in attacks {
            let dead = self.player.take_damage(attack.damage);
            events.push(GameEvent::PlayerHurt {
                damage: attack.damage,
                from: attack.from,
            });
            if dead {
                events.push(self.end_game());
                return;
            }
        }
    }

    fn update_powerups(&mut self, events: &mut Vec<GameEvent>) {
        let needs = PickupNeeds {
            health_full: self.player.health_is_full(),
            stamina_full: self.player.stamina.is_full(),
        };
        let collected = self
            .powerups
            .collect(self.player.position, needs, &self.config.powerups);
        for powerup in collected {
            match powerup.kind {
                PowerupKind::Heart => self.player.heal_full(),
                PowerupKind::Soda => self.player.stamina.restore(self.config.powerups.soda_stamina),
            }
            events.push(GameEvent::PowerupCollected {
                powerup: powerup.id,
                kind: powerup.kind,
            });
        }
    }

    fn run_due_tasks(&mut self, events: &mut Vec<GameEvent>) {
        while let Some(task) = self.scheduler.pop_due(self.clock) {
            match task {
                Task::StartWave(number) => self.start_wave(number, events),
                Task::SpawnEnemy { wave } => self.spawn_enemy(wave, events),
                Task::PowerupCheck => self.powerup_check(events),
            }
        }
    }

    fn start_wave(&mut self, number: u32, events: &mut Vec<GameEvent>) {
        if self.waves.in_progress || number != self.waves.number + 1 {
            log::warn!(
                "Ignoring start of wave {number}; current wave {} in progress: {}",
                self.waves.number,
                self.waves.in_progress
            );
            return;
        }
        let wave = self.waves.begin_next(&self.config.waves);
        let stagger = self.config.enemy.spawn_stagger();
        for i in 0..self.waves.total {
            self.scheduler
                .schedule_at(self.clock + stagger * i, Task::SpawnEnemy { wave });
        }
        log::info!("Wave {wave} started with {} enemies", self.waves.total);
        events.push(GameEvent::WaveStarted {
            wave,
            enemies: self.waves.total,
        });
    }

    fn spawn_enemy(&mut self, wave: u32, events: &mut Vec<GameEvent>) {
        if wave != self.waves.number || !self.waves.in_progress || self.waves.pending_spawns() == 0 {
            return;
        }
        let id = self.ids.allocate();
        self.enemies
            .spawn(id, wave, &self.config.enemy, &self.arena, &mut self.rng);
        self.waves.record_spawn();
        events.push(GameEvent::EnemySpawned { enemy: id, wave });
    }

    fn powerup_check(&mut self, events: &mut Vec<GameEvent>) {
        let config = &self.config.powerups;
        self.scheduler
            .schedule_at(self.clock + config.check_interval(), Task::PowerupCheck);

        let enemies: Vec<Vec3> = self.enemies.iter().map(|e| e.position).collect();
        let id = self.ids.allocate();
        match self.powerups.try_spawn(
            id,
            self.clock,
            self.waves.number,
            config,
            &self.arena,
            &enemies,
            &mut self.rng,
        ) {
            Ok(powerup) => events.push(GameEvent::PowerupSpawned {
                powerup: powerup.id,
                kind: powerup.kind,
            }),
            Err(reason) => log::trace!("Power-up check skipped: {:?}", reason),
        }
    }

    fn check_wave(&mut self, events: &mut Vec<GameEvent>) {
        if !self.waves.is_cleared(self.enemies.len()) {
            return;
        }
        self.waves.finish();
        let wave = self.waves.number;
        let bonus = self.config.waves.wave_clear_bonus;
        self.score += bonus;
        self.scheduler.schedule_at(
            self.clock + self.config.waves.break_duration(),
            Task::StartWave(wave + 1),
        );
        log::info!("Wave {wave} cleared (+{bonus})");
        events.push(GameEvent::WaveCleared { wave, bonus });
    }
}
