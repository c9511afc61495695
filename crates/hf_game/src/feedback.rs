//! Short-lived HUD overlays driven by game events, and the per-frame
//! `HudSnapshot` handed to the UI.
//!
//! Timers run on the simulation clock, so overlays freeze with the game
//! while paused.

use std::time::Duration;

use glam::Vec3;
use hf_ui::{Banner, DamageFlash, HudSnapshot, ScreenState};

use crate::events::GameEvent;
use crate::powerup::PowerupKind;
use crate::world::{GamePhase, World};

const DAMAGE_FLASH: Duration = Duration::from_millis(400);
const WAVE_BANNER: Duration = Duration::from_millis(2500);
const NOTICE: Duration = Duration::from_millis(2000);
/// Overlays fade out over this share of their lifetime.
const FADE_PORTION: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
struct Transient {
    text: String,
    started: Duration,
    duration: Duration,
}

impl Transient {
    fn new(text: String, started: Duration, duration: Duration) -> Self {
        Self {
            text,
            started,
            duration,
        }
    }

    fn alpha(&self, now: Duration) -> Option<f32> {
        let t = now.saturating_sub(self.started).as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            return None;
        }
        let fade_start = 1.0 - FADE_PORTION;
        Some(if t <= fade_start {
            1.0
        } else {
            1.0 - (t - fade_start) / FADE_PORTION
        })
    }

    fn banner(&self, now: Duration) -> Option<Banner> {
        self.alpha(now).map(|alpha| Banner {
            text: self.text.clone(),
            alpha,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DamageHit {
    started: Duration,
    from: Vec3,
}

#[derive(Debug, Default)]
pub struct Feedback {
    damage: Option<DamageHit>,
    wave_banner: Option<Transient>,
    notice: Option<Transient>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(&mut self, event: &GameEvent, now: Duration) {
        match event {
            GameEvent::PlayerHurt { from, .. } => {
                self.damage = Some(DamageHit {
                    started: now,
                    from: *from,
                });
            }
            GameEvent::WaveStarted { wave, .. } => {
                self.wave_banner = Some(Transient::new(format!("Wave {wave}"), now, WAVE_BANNER));
            }
            GameEvent::WaveCleared { wave, bonus } => {
                self.wave_banner = Some(Transient::new(
                    format!("Wave {wave} cleared! +{bonus}"),
                    now,
                    WAVE_BANNER,
                ));
            }
            GameEvent::PowerupSpawned { kind, .. } => {
                self.notice = Some(Transient::new(
                    format!("A {} appeared", kind.label()),
                    now,
                    NOTICE,
                ));
            }
            GameEvent::PowerupCollected { kind, .. } => {
                let text = match kind {
                    PowerupKind::Heart => "Heart: health restored",
                    PowerupKind::Soda => "Soda: stamina boost",
                };
                self.notice = Some(Transient::new(text.to_string(), now, NOTICE));
            }
            GameEvent::GameOver { .. } => self.clear(),
            _ => {}
        }
    }

    /// Tears down every transient overlay.
    pub fn clear(&mut self) {
        self.damage = None;
        self.wave_banner = None;
        self.notice = None;
    }

    pub fn snapshot(&self, world: &World, sound_enabled: bool, music_enabled: bool) -> HudSnapshot {
        let now = world.clock();
        let player = &world.player;

        let damage = self.damage.and_then(|hit| {
            let elapsed = now.saturating_sub(hit.started);
            if elapsed >= DAMAGE_FLASH {
                return None;
            }
            Some(DamageFlash {
                intensity: 1.0 - elapsed.as_secs_f32() / DAMAGE_FLASH.as_secs_f32(),
                bearing: bearing_to(player.position, player.yaw, hit.from),
            })
        });

        HudSnapshot {
            screen: screen_for(world.phase()),
            health: player.health,
            max_health: player.max_health,
            stamina: player.stamina.current(),
            max_stamina: player.stamina.max(),
            score: world.score(),
            wave: world.waves.number,
            enemies_remaining: world.waves.remaining(),
            sound_enabled,
            music_enabled,
            damage,
            wave_banner: self.wave_banner.as_ref().and_then(|b| b.banner(now)),
            notice: self.notice.as_ref().and_then(|b| b.banner(now)),
        }
    }
}

pub fn screen_for(phase: GamePhase) -> ScreenState {
    match phase {
        GamePhase::Title => ScreenState::Title,
        GamePhase::Playing => ScreenState::Playing,
        GamePhase::Paused => ScreenState::Paused,
        GamePhase::GameOver => ScreenState::GameOver,
    }
}

/// Angle from the view direction to `target`, radians, positive to the right.
fn bearing_to(position: Vec3, yaw: f32, target: Vec3) -> f32 {
    use std::f32::consts::{PI, TAU};
    let d = target - position;
    let world_angle = d.x.atan2(-d.z);
    (world_angle - yaw + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn transient_fades_then_expires() {
        let t = Transient::new("x".into(), ms(1000), ms(2000));
        assert_eq!(t.alpha(ms(1000)), Some(1.0));
        assert_eq!(t.alpha(ms(2300)), Some(1.0));
        let fading = t.alpha(ms(2700)).expect("still visible");
        assert!(fading > 0.0 && fading < 1.0);
        assert_eq!(t.alpha(ms(3000)), None);
    }

    #[test]
    fn bearing_is_relative_to_view() {
        let origin = Vec3::ZERO;
        assert!(bearing_to(origin, 0.0, Vec3::new(0.0, 0.0, -5.0)).abs() < 1e-5);
        let right = bearing_to(origin, 0.0, Vec3::new(5.0, 0.0, 0.0));
        assert!((right - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        // Turned to face +x, the same attacker is dead ahead.
        assert!(bearing_to(origin, std::f32::consts::FRAC_PI_2, Vec3::new(5.0, 0.0, 0.0)).abs() < 1e-5);
    }

    #[test]
    fn only_one_damage_indicator_at_a_time() {
        let mut feedback = Feedback::new();
        feedback.on_event(
            &GameEvent::PlayerHurt {
                damage: 10.0,
                from: Vec3::X,
            },
            ms(0),
        );
        feedback.on_event(
            &GameEvent::PlayerHurt {
                damage: 10.0,
                from: Vec3::NEG_X,
            },
            ms(100),
        );
        assert_eq!(feedback.damage.map(|d| d.from), Some(Vec3::NEG_X));
    }

    #[test]
    fn game_over_tears_down_overlays() {
        let mut feedback = Feedback::new();
        feedback.on_event(&GameEvent::WaveStarted { wave: 3, enemies: 4 }, ms(0));
        feedback.on_event(
            &GameEvent::PowerupCollected {
                powerup: crate::entity::EntityId(1),
                kind: PowerupKind::Soda,
            },
            ms(0),
        );
        feedback.on_event(&GameEvent::GameOver { score: 10, wave: 3 }, ms(10));
        assert!(feedback.wave_banner.is_none());
        assert!(feedback.notice.is_none());
        assert!(feedback.damage.is_none());
    }

    #[test]
    fn snapshot_reflects_world() {
        let mut config = GameConfig::default();
        config.environment.tree_count = 0;
        config.environment.rock_count = 0;
        let mut world = World::new(config);
        world.start_game();
        world.player.health = 25.0;

        let mut feedback = Feedback::new();
        feedback.on_event(&GameEvent::WaveStarted { wave: 1, enemies: 3 }, world.clock());
        let hud = feedback.snapshot(&world, true, false);
        assert_eq!(hud.screen, ScreenState::Playing);
        assert_eq!(hud.health, 25.0);
        assert!(!hud.music_enabled);
        assert_eq!(hud.wave_banner.map(|b| b.text), Some("Wave 1".to_string()));
    }
}
