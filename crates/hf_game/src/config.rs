//! Gameplay tuning loaded from JSON.
//!
//! Every field has a default, so an absent file or a partial file both work.
//! Validation is strict: a bad value fails the whole load rather than being
//! clamped, and hot reload keeps the previous config on failure.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub environment: EnvironmentConfig,
    pub player: PlayerConfig,
    pub stamina: StaminaConfig,
    pub weapon: WeaponConfig,
    pub enemy: EnemyConfig,
    pub waves: WaveConfig,
    pub powerups: PowerupConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub seed: u64,
    pub arena_radius: f32,
    pub wall_height: f32,
    pub wall_segments: u32,
    pub tree_count: u32,
    pub rock_count: u32,
    /// Obstacles keep this much space free around the player spawn.
    pub clear_radius: f32,
    pub edge_margin: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_f1e1d,
            arena_radius: 50.0,
            wall_height: 3.0,
            wall_segments: 48,
            tree_count: 40,
            rock_count: 25,
            clear_radius: 8.0,
            edge_margin: 3.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    pub eye_height: f32,
    pub radius: f32,
    pub walk_speed: f32,
    pub run_multiplier: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub max_health: f32,
    pub mouse_sensitivity: f32,
    pub max_pitch: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            eye_height: 1.7,
            radius: 0.5,
            walk_speed: 6.0,
            run_multiplier: 1.75,
            jump_speed: 7.0,
            gravity: 20.0,
            max_health: 100.0,
            mouse_sensitivity: 0.0025,
            max_pitch: 1.45,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StaminaConfig {
    pub max: f32,
    pub drain_per_sec: f32,
    pub regen_per_sec: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            drain_per_sec: 25.0,
            regen_per_sec: 12.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WeaponConfig {
    pub cooldown_ms: u64,
    pub projectile_speed: f32,
    pub lifetime_ms: u64,
    pub max_projectiles: usize,
    pub ray_range: f32,
    pub projectile_radius: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 400,
            projectile_speed: 60.0,
            lifetime_ms: 1500,
            max_projectiles: 20,
            ray_range: 200.0,
            projectile_radius: 0.1,
        }
    }
}

impl WeaponConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyConfig {
    pub health: u32,
    pub speed: f32,
    pub radius: f32,
    pub height: f32,
    /// Radius of the sphere projectiles and aim rays are tested against.
    pub hit_radius: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
    pub attack_cooldown_ms: u64,
    pub spawn_radius: f32,
    pub spawn_stagger_ms: u64,
    pub hit_flash_ms: u64,
    pub hit_debounce_ms: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 3,
            speed: 3.0,
            radius: 0.6,
            height: 1.8,
            hit_radius: 0.9,
            attack_range: 1.8,
            attack_damage: 10.0,
            attack_cooldown_ms: 1500,
            spawn_radius: 40.0,
            spawn_stagger_ms: 1000,
            hit_flash_ms: 150,
            hit_debounce_ms: 50,
        }
    }
}

impl EnemyConfig {
    pub fn attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.attack_cooldown_ms)
    }

    pub fn spawn_stagger(&self) -> Duration {
        Duration::from_millis(self.spawn_stagger_ms)
    }

    pub fn hit_flash(&self) -> Duration {
        Duration::from_millis(self.hit_flash_ms)
    }

    pub fn hit_debounce(&self) -> Duration {
        Duration::from_millis(self.hit_debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    pub base_enemies: u32,
    pub first_wave_delay_ms: u64,
    pub break_ms: u64,
    pub kill_score: u32,
    pub wave_clear_bonus: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_enemies: 3,
            first_wave_delay_ms: 2000,
            break_ms: 3000,
            kill_score: 10,
            wave_clear_bonus: 50,
        }
    }
}

impl WaveConfig {
    pub fn first_wave_delay(&self) -> Duration {
        Duration::from_millis(self.first_wave_delay_ms)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_millis(self.break_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PowerupConfig {
    pub max_active: usize,
    pub min_interval_ms: u64,
    pub check_interval_ms: u64,
    pub base_chance: f32,
    pub chance_per_wave: f32,
    pub max_chance: f32,
    pub spawn_attempts: u32,
    pub edge_margin: f32,
    pub min_obstacle_distance: f32,
    pub min_enemy_distance: f32,
    pub min_powerup_distance: f32,
    pub pickup_radius: f32,
    pub soda_stamina: f32,
    pub hover_height: f32,
    pub hover_amplitude: f32,
    pub hover_speed: f32,
    pub spin_speed: f32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            max_active: 3,
            min_interval_ms: 15_000,
            check_interval_ms: 5_000,
            base_chance: 0.10,
            chance_per_wave: 0.05,
            max_chance: 0.75,
            spawn_attempts: 20,
            edge_margin: 5.0,
            min_obstacle_distance: 3.0,
            min_enemy_distance: 6.0,
            min_powerup_distance: 8.0,
            pickup_radius: 1.5,
            soda_stamina: 40.0,
            hover_height: 1.0,
            hover_amplitude: 0.25,
            hover_speed: 2.0,
            spin_speed: 1.5,
        }
    }
}

impl PowerupConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Spawn probability for a check during `wave`; linear in the wave number.
    pub fn spawn_chance(&self, wave: u32) -> f32 {
        (self.base_chance + self.chance_per_wave * wave as f32).min(self.max_chance)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Missing file means stock tuning; a present but broken file is an error.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!(
            "No tuning file at '{}', using built-in defaults",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

const MAX_OBSTACLES: u32 = 1000;

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let env = &config.environment;
    require_positive("environment.arena_radius", env.arena_radius)?;
    require_positive("environment.wall_height", env.wall_height)?;
    if env.wall_segments < 3 {
        return Err("Config validation failed: environment.wall_segments must be >= 3".to_string());
    }
    if env.tree_count.saturating_add(env.rock_count) > MAX_OBSTACLES {
        return Err(format!(
            "Config validation failed: environment tree_count + rock_count must be <= {MAX_OBSTACLES}"
        ));
    }
    if env.clear_radius < 0.0 || env.edge_margin < 0.0 {
        return Err(
            "Config validation failed: environment clear_radius and edge_margin must be >= 0"
                .to_string(),
        );
    }
    if env.clear_radius + env.edge_margin >= env.arena_radius {
        return Err(
            "Config validation failed: environment clear_radius + edge_margin must be < arena_radius"
                .to_string(),
        );
    }

    let player = &config.player;
    require_positive("player.eye_height", player.eye_height)?;
    require_positive("player.radius", player.radius)?;
    require_positive("player.walk_speed", player.walk_speed)?;
    require_positive("player.run_multiplier", player.run_multiplier)?;
    require_positive("player.jump_speed", player.jump_speed)?;
    require_positive("player.gravity", player.gravity)?;
    require_positive("player.max_health", player.max_health)?;
    require_positive("player.mouse_sensitivity", player.mouse_sensitivity)?;
    require_positive("player.max_pitch", player.max_pitch)?;

    let stamina = &config.stamina;
    require_positive("stamina.max", stamina.max)?;
    require_positive("stamina.drain_per_sec", stamina.drain_per_sec)?;
    require_positive("stamina.regen_per_sec", stamina.regen_per_sec)?;

    let weapon = &config.weapon;
    if weapon.cooldown_ms == 0 || weapon.lifetime_ms == 0 {
        return Err(
            "Config validation failed: weapon cooldown_ms and lifetime_ms must be > 0".to_string(),
        );
    }
    if weapon.max_projectiles == 0 {
        return Err("Config validation failed: weapon.max_projectiles must be > 0".to_string());
    }
    require_positive("weapon.projectile_speed", weapon.projectile_speed)?;
    require_positive("weapon.ray_range", weapon.ray_range)?;
    require_positive("weapon.projectile_radius", weapon.projectile_radius)?;

    let enemy = &config.enemy;
    if enemy.health == 0 {
        return Err("Config validation failed: enemy.health must be > 0".to_string());
    }
    require_positive("enemy.speed", enemy.speed)?;
    require_positive("enemy.radius", enemy.radius)?;
    require_positive("enemy.height", enemy.height)?;
    require_positive("enemy.hit_radius", enemy.hit_radius)?;
    require_positive("enemy.attack_range", enemy.attack_range)?;
    require_positive("enemy.attack_damage", enemy.attack_damage)?;
    require_positive("enemy.spawn_radius", enemy.spawn_radius)?;
    if enemy.attack_cooldown_ms == 0 || enemy.spawn_stagger_ms == 0 {
        return Err(
            "Config validation failed: enemy attack_cooldown_ms and spawn_stagger_ms must be > 0"
                .to_string(),
        );
    }
    if enemy.spawn_radius >= env.arena_radius {
        return Err(format!(
            "Config validation failed: enemy.spawn_radius ({}) must be inside arena_radius ({})",
            enemy.spawn_radius, env.arena_radius
        ));
    }

    let powerups = &config.powerups;
    if powerups.max_active == 0 || powerups.spawn_attempts == 0 {
        return Err(
            "Config validation failed: powerups max_active and spawn_attempts must be > 0"
                .to_string(),
        );
    }
    if powerups.check_interval_ms == 0 {
        return Err("Config validation failed: powerups.check_interval_ms must be > 0".to_string());
    }
    for (name, value) in [
        ("powerups.base_chance", powerups.base_chance),
        ("powerups.chance_per_wave", powerups.chance_per_wave),
        ("powerups.max_chance", powerups.max_chance),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!(
                "Config validation failed: {name} must be within [0, 1], got {value}"
            ));
        }
    }
    require_positive("powerups.pickup_radius", powerups.pickup_radius)?;
    require_positive("powerups.soda_stamina", powerups.soda_stamina)?;
    if powerups.edge_margin >= env.arena_radius {
        return Err(
            "Config validation failed: powerups.edge_margin must be < arena_radius".to_string(),
        );
    }

    Ok(())
}

fn require_positive(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!(
            "Config validation failed: {name} must be > 0, got {value}"
        ))
    }
}

/// Polls a file's modification time so edits can be picked up between frames.
pub struct FileWatcher {
    path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl FileWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&path);
        Self {
            path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}
