//! Sound effects and music keyed by game event.
//!
//! Clips load from `assets/audio/<name>.wav`; anything missing or unreadable
//! falls back to a synthesized tone. The mixer runs on the game thread and
//! pushes stereo frames to the device through `AudioOutput`. Without a device
//! the manager stays usable and simply produces nothing.

mod clips;
mod mixer;
mod output;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;

use crate::events::GameEvent;
use clips::{load_wav, synthesize, synthesize_music, Clip};
use mixer::Mixer;
use output::AudioOutput;

const MAX_VOICES: usize = 16;
const FALLBACK_SAMPLE_RATE: u32 = 44_100;
/// Audio kept queued ahead of the device.
const TARGET_LATENCY_SECS: f32 = 0.06;
const MUSIC_FILE: &str = "music";
const MUSIC_VOLUME: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    Shoot,
    EnemyHit,
    EnemyDeath,
    PlayerHurt,
    Jump,
    PowerupSpawn,
    PowerupPickup,
    WaveStart,
    WaveCleared,
    GameOver,
}

impl SoundEvent {
    pub const ALL: [SoundEvent; 10] = [
        SoundEvent::Shoot,
        SoundEvent::EnemyHit,
        SoundEvent::EnemyDeath,
        SoundEvent::PlayerHurt,
        SoundEvent::Jump,
        SoundEvent::PowerupSpawn,
        SoundEvent::PowerupPickup,
        SoundEvent::WaveStart,
        SoundEvent::WaveCleared,
        SoundEvent::GameOver,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            SoundEvent::Shoot => "shoot",
            SoundEvent::EnemyHit => "enemy_hit",
            SoundEvent::EnemyDeath => "enemy_death",
            SoundEvent::PlayerHurt => "player_hurt",
            SoundEvent::Jump => "jump",
            SoundEvent::PowerupSpawn => "powerup_spawn",
            SoundEvent::PowerupPickup => "powerup_pickup",
            SoundEvent::WaveStart => "wave_start",
            SoundEvent::WaveCleared => "wave_cleared",
            SoundEvent::GameOver => "game_over",
        }
    }

    fn volume(self) -> f32 {
        match self {
            SoundEvent::Shoot => 0.5,
            SoundEvent::EnemyHit => 0.6,
            SoundEvent::Jump => 0.4,
            _ => 0.8,
        }
    }

    pub fn for_game_event(event: &GameEvent) -> Option<SoundEvent> {
        match event {
            GameEvent::Shot { .. } => Some(SoundEvent::Shoot),
            GameEvent::Jumped => Some(SoundEvent::Jump),
            GameEvent::EnemyHit { .. } => Some(SoundEvent::EnemyHit),
            GameEvent::EnemyKilled { .. } => Some(SoundEvent::EnemyDeath),
            GameEvent::PlayerHurt { .. } => Some(SoundEvent::PlayerHurt),
            GameEvent::PowerupSpawned { .. } => Some(SoundEvent::PowerupSpawn),
            GameEvent::PowerupCollected { .. } => Some(SoundEvent::PowerupPickup),
            GameEvent::WaveStarted { .. } => Some(SoundEvent::WaveStart),
            GameEvent::WaveCleared { .. } => Some(SoundEvent::WaveCleared),
            GameEvent::GameOver { .. } => Some(SoundEvent::GameOver),
            GameEvent::EnemySpawned { .. } => None,
        }
    }
}

/// Listener pose used to pan positional sounds.
#[derive(Debug, Clone, Copy)]
pub struct Listener {
    pub position: Vec3,
    pub yaw: f32,
}

impl Listener {
    /// Stereo pan for a source at `source`: -1 left, 1 right.
    pub fn pan_for(&self, source: Vec3) -> f32 {
        let d = source - self.position;
        let right = Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin());
        let flat = Vec3::new(d.x, 0.0, d.z);
        flat.try_normalize().map_or(0.0, |dir| dir.dot(right))
    }
}

pub struct AudioManager {
    output: Option<AudioOutput>,
    mixer: Mixer,
    clips: HashMap<SoundEvent, Arc<Clip>>,
    music: Arc<Clip>,
    sound_enabled: bool,
    music_enabled: bool,
    scratch: Vec<f32>,
}

impl AudioManager {
    /// Opens the default device and loads clips from `audio_dir`. Never fails:
    /// a missing device means silence, a missing clip means a synthesized one.
    pub fn new(audio_dir: &Path) -> Self {
        let output = match AudioOutput::new() {
            Ok(output) => Some(output),
            Err(err) => {
                log::warn!("Audio disabled: {err}");
                None
            }
        };
        let sample_rate = output
            .as_ref()
            .map_or(FALLBACK_SAMPLE_RATE, AudioOutput::sample_rate);

        let clips = SoundEvent::ALL
            .into_iter()
            .map(|sound| {
                let clip = load_or_synthesize(audio_dir, sound.file_stem(), sample_rate, || {
                    synthesize(sound, sample_rate)
                });
                (sound, Arc::new(clip))
            })
            .collect();
        let music = Arc::new(load_or_synthesize(audio_dir, MUSIC_FILE, sample_rate, || {
            synthesize_music(sample_rate)
        }));

        Self {
            output,
            mixer: Mixer::new(MAX_VOICES),
            clips,
            music,
            sound_enabled: true,
            music_enabled: true,
            scratch: Vec::new(),
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    pub fn status_label(&self) -> String {
        match &self.output {
            Some(output) => format!(
                "Audio: {} Hz, {} voices, music {}",
                output.sample_rate(),
                self.mixer.active_voices(),
                if self.mixer.music_playing() { "on" } else { "off" }
            ),
            None => "Audio: unavailable".to_string(),
        }
    }

    pub fn play(&mut self, sound: SoundEvent, pan: f32) {
        if !self.sound_enabled || self.output.is_none() {
            return;
        }
        if let Some(clip) = self.clips.get(&sound) {
            self.mixer.play(Arc::clone(clip), sound.volume(), pan);
        }
    }

    /// Plays the sound for each event. Damage is panned toward the attacker.
    pub fn handle_events(&mut self, events: &[GameEvent], listener: Listener) {
        for event in events {
            let Some(sound) = SoundEvent::for_game_event(event) else {
                continue;
            };
            let pan = match event {
                GameEvent::PlayerHurt { from, .. } => listener.pan_for(*from) * 0.7,
                _ => 0.0,
            };
            self.play(sound, pan);
            if sound == SoundEvent::GameOver {
                self.stop_music();
            }
        }
    }

    pub fn start_music(&mut self) {
        if self.music_enabled && self.output.is_some() && !self.mixer.music_playing() {
            self.mixer.start_music(Arc::clone(&self.music), MUSIC_VOLUME);
        }
    }

    pub fn stop_music(&mut self) {
        self.mixer.stop_music();
    }

    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
        log::info!("Sound effects {}", if self.sound_enabled { "on" } else { "off" });
    }

    /// Flips the music setting. Turning it back on resumes the loop only when a
    /// game is in progress.
    pub fn toggle_music(&mut self, game_in_progress: bool) {
        self.music_enabled = !self.music_enabled;
        log::info!("Music {}", if self.music_enabled { "on" } else { "off" });
        if !self.music_enabled {
            self.stop_music();
        } else if game_in_progress {
            self.start_music();
        }
    }

    /// Tops the device queue up to the target latency. Call once per frame.
    pub fn pump(&mut self) {
        let Some(output) = &mut self.output else {
            return;
        };
        let channels = output.channels();
        let target = (output.sample_rate() as f32 * TARGET_LATENCY_SECS) as usize * channels;
        let target = target.min(output.capacity());
        let queued = output.queued_samples();
        if queued >= target {
            return;
        }
        let frames = (target - queued) / channels;
        self.scratch.resize(frames * 2, 0.0);
        self.mixer.mix(&mut self.scratch);
        output.push_stereo(&self.scratch);
    }
}

fn load_or_synthesize(
    dir: &Path,
    stem: &str,
    sample_rate: u32,
    fallback: impl FnOnce() -> Clip,
) -> Clip {
    let path = dir.join(format!("{stem}.wav"));
    if !path.exists() {
        log::debug!("No clip at '{}', using synthesized sound", path.display());
        return fallback();
    }
    match load_wav(&path) {
        Ok(clip) => clip.resampled(sample_rate),
        Err(err) => {
            log::warn!("{err}; using synthesized sound");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;

    #[test]
    fn every_game_event_maps_to_its_sound() {
        let cases = [
            (GameEvent::Shot { projectile: EntityId(1) }, Some(SoundEvent::Shoot)),
            (GameEvent::EnemyKilled { enemy: EntityId(2), score: 10 }, Some(SoundEvent::EnemyDeath)),
            (GameEvent::GameOver { score: 0, wave: 1 }, Some(SoundEvent::GameOver)),
            (GameEvent::EnemySpawned { enemy: EntityId(3), wave: 1 }, None),
        ];
        for (event, expected) in cases {
            assert_eq!(SoundEvent::for_game_event(&event), expected);
        }
    }

    #[test]
    fn file_stems_are_unique() {
        let mut stems: Vec<&str> = SoundEvent::ALL.iter().map(|s| s.file_stem()).collect();
        stems.sort_unstable();
        stems.dedup();
        assert_eq!(stems.len(), SoundEvent::ALL.len());
    }

    #[test]
    fn attacker_on_the_right_pans_right() {
        let listener = Listener {
            position: Vec3::ZERO,
            yaw: 0.0,
        };
        assert!((listener.pan_for(Vec3::new(5.0, 0.0, 0.0)) - 1.0).abs() < 1e-5);
        assert!((listener.pan_for(Vec3::new(-5.0, 0.0, 0.0)) + 1.0).abs() < 1e-5);
        assert!(listener.pan_for(Vec3::new(0.0, 0.0, -5.0)).abs() < 1e-5);
    }

    #[test]
    fn missing_clip_falls_back_to_synthesized() {
        let dir = std::env::temp_dir().join("hf_audio_test_no_such_dir");
        let clip = load_or_synthesize(&dir, "shoot", 44_100, || synthesize(SoundEvent::Shoot, 44_100));
        assert!(!clip.samples.is_empty());
    }
}
