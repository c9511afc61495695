use crate::player::PlayerIntent;
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default)]
    pub seed: Option<u64>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ReplayFrame {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub jump: bool,
    pub fire: bool,
    /// Look delta in radians, applied on the first step of the frame only.
    pub look: [f32; 2],
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_intents(&self) -> Vec<PlayerIntent> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(PlayerIntent {
                    forward: frame.forward,
                    back: frame.back,
                    left: frame.left,
                    right: frame.right,
                    run: frame.run,
                    jump: frame.jump && i == 0,
                    fire: frame.fire,
                    look: if i == 0 {
                        Vec2::from(frame.look)
                    } else {
                        Vec2::ZERO
                    },
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    if replay
        .frames
        .iter()
        .any(|f| f.look.iter().any(|v| !v.is_finite()))
    {
        return Err("Replay validation failed: look deltas must be finite".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::events::GameEvent;
    use crate::world::World;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    /// Everything observable about a run, in a comparable form.
    #[derive(Debug, PartialEq)]
    struct RunSummary {
        events: Vec<GameEvent>,
        score: u32,
        wave: u32,
        player: (glam::Vec3, f32, f32, f32),
        enemies: Vec<(u64, glam::Vec3, u32)>,
        projectiles: Vec<(u64, glam::Vec3)>,
        powerups: Vec<(u64, glam::Vec3)>,
    }

    fn run(replay: &ReplaySequence) -> RunSummary {
        let mut config = GameConfig::default();
        if let Some(seed) = replay.seed {
            config.environment.seed = seed;
        }
        let mut world = World::new(config);
        world.start_game();

        let mut events = Vec::new();
        for intent in replay.expanded_intents() {
            events.extend(world.tick(&intent));
        }

        RunSummary {
            events,
            score: world.score(),
            wave: world.waves.number,
            player: (
                world.player.position,
                world.player.yaw,
                world.player.health,
                world.player.stamina.current(),
            ),
            enemies: world
                .enemies
                .iter()
                .map(|e| (e.id.0, e.position, e.health))
                .collect(),
            projectiles: world.projectiles.iter().map(|p| (p.id.0, p.position)).collect(),
            powerups: world.powerups.iter().map(|p| (p.id.0, p.position)).collect(),
        }
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "forward": true, "repeat": 3 },
                { "jump": true, "look": [0.1, 0.0], "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_intents();
        assert_eq!(expanded.len(), 5);
        assert!(expanded[3].jump);
        assert!(!expanded[4].jump, "jump is a single press");
        assert_eq!(expanded[4].look, Vec2::ZERO);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "seed": 1234,
              "frames": [
                { "forward": true, "run": true, "repeat": 120 },
                { "forward": true, "jump": true, "look": [0.8, 0.1], "repeat": 60 },
                { "fire": true, "look": [-0.3, -0.05], "repeat": 600 },
                { "left": true, "fire": true, "repeat": 300 },
                { "back": true, "right": true, "fire": true, "look": [1.2, 0.0], "repeat": 600 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let a = run(&replay);
        let b = run(&replay);
        assert!(a.wave >= 1, "replay should reach the first wave");
        assert!(a.events.iter().any(|e| matches!(e, GameEvent::Shot { .. })));
        assert_eq!(a, b);

        let _ = fs::remove_file(path);
    }
}
