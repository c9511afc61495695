//! Sound clip loading and the synthesized fallbacks used when a file is
//! missing.

use std::f32::consts::TAU;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::SoundEvent;

/// Mono PCM clip in [-1, 1] at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Clip {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Linear resample to `target_rate`. Returns the clip unchanged when the
    /// rates already match.
    pub fn resampled(self, target_rate: u32) -> Clip {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            return Clip {
                sample_rate: target_rate,
                ..self
            };
        }
        let ratio = self.sample_rate as f64 / target_rate as f64;
        let output_len = (self.samples.len() as f64 / ratio) as usize;
        let last = self.samples.len() - 1;
        let samples = (0..output_len)
            .map(|i| {
                let src_pos = i as f64 * ratio;
                let idx = (src_pos as usize).min(last);
                let frac = (src_pos - idx as f64) as f32;
                let a = self.samples[idx];
                let b = self.samples[(idx + 1).min(last)];
                a + (b - a) * frac
            })
            .collect();
        Clip {
            samples,
            sample_rate: target_rate,
        }
    }
}

pub fn load_wav(path: &Path) -> Result<Clip, String> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| format!("Failed to open WAV {}: {e}", path.display()))?;
    let spec = reader.spec();
    let read_err = |e: hound::Error| format!("Failed to decode WAV {}: {e}", path.display());

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (hound::SampleFormat::Int, bits @ (24 | 32)) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(read_err)?
        }
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (format, bits) => {
            return Err(format!(
                "Unsupported WAV format in {}: {:?} {bits}-bit",
                path.display(),
                format
            ))
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    if samples.is_empty() {
        return Err(format!("WAV {} contains no samples", path.display()));
    }
    Ok(Clip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// A short procedural stand-in for `sound`, so every event stays audible
/// without asset files.
pub fn synthesize(sound: SoundEvent, sample_rate: u32) -> Clip {
    match sound {
        SoundEvent::Shoot => noise_burst(sample_rate, 0.12, 0.6, 1),
        SoundEvent::EnemyHit => sweep(sample_rate, 0.08, 520.0, 300.0, 0.45),
        SoundEvent::EnemyDeath => sweep(sample_rate, 0.35, 240.0, 70.0, 0.55),
        SoundEvent::PlayerHurt => sweep(sample_rate, 0.25, 180.0, 90.0, 0.6),
        SoundEvent::Jump => sweep(sample_rate, 0.15, 300.0, 620.0, 0.35),
        SoundEvent::PowerupSpawn => arpeggio(sample_rate, &[660.0, 880.0], 0.09, 0.3),
        SoundEvent::PowerupPickup => arpeggio(sample_rate, &[523.0, 659.0, 784.0, 1047.0], 0.07, 0.4),
        SoundEvent::WaveStart => arpeggio(sample_rate, &[220.0, 220.0, 330.0], 0.18, 0.45),
        SoundEvent::WaveCleared => arpeggio(sample_rate, &[392.0, 523.0, 659.0, 784.0], 0.12, 0.45),
        SoundEvent::GameOver => arpeggio(sample_rate, &[392.0, 330.0, 262.0, 196.0], 0.3, 0.5),
    }
}

/// Slow minor loop that plays under the action.
pub fn synthesize_music(sample_rate: u32) -> Clip {
    const NOTES: [f32; 8] = [110.0, 130.8, 164.8, 130.8, 98.0, 116.5, 146.8, 116.5];
    arpeggio(sample_rate, &NOTES, 0.5, 0.18)
}

fn envelope(t: f32, duration: f32) -> f32 {
    let attack = (t / 0.005).min(1.0);
    let release = (1.0 - t / duration).max(0.0);
    attack * release * release
}

fn sweep(sample_rate: u32, duration: f32, from_hz: f32, to_hz: f32, volume: f32) -> Clip {
    let count = (duration * sample_rate as f32) as usize;
    let mut phase = 0.0f32;
    let samples = (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = from_hz + (to_hz - from_hz) * (t / duration);
            phase = (phase + freq / sample_rate as f32).fract();
            // Square-ish tone for a retro edge.
            let tone = (phase * TAU).sin().signum() * 0.5 + (phase * TAU).sin() * 0.5;
            tone * envelope(t, duration) * volume
        })
        .collect();
    Clip {
        samples,
        sample_rate,
    }
}

fn noise_burst(sample_rate: u32, duration: f32, volume: f32, seed: u64) -> Clip {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let count = (duration * sample_rate as f32) as usize;
    let mut low = 0.0f32;
    let samples = (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let white: f32 = rng.gen_range(-1.0..1.0);
            low += (white - low) * 0.35;
            low * envelope(t, duration) * volume
        })
        .collect();
    Clip {
        samples,
        sample_rate,
    }
}

fn arpeggio(sample_rate: u32, notes: &[f32], note_secs: f32, volume: f32) -> Clip {
    let per_note = (note_secs * sample_rate as f32) as usize;
    let mut samples = Vec::with_capacity(per_note * notes.len());
    for &freq in notes {
        for i in 0..per_note {
            let t = i as f32 / sample_rate as f32;
            let tone = (t * freq * TAU).sin();
            samples.push(tone * envelope(t, note_secs) * volume);
        }
    }
    Clip {
        samples,
        sample_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_clip_test_{}_{}_{}.wav",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn loads_stereo_wav_as_mono() {
        let path = temp_file_path("stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for _ in 0..100 {
            writer.write_sample(16384i16).expect("write left");
            writer.write_sample(0i16).expect("write right");
        }
        writer.finalize().expect("finalize wav");

        let clip = load_wav(&path).expect("wav should load");
        assert_eq!(clip.sample_rate, 22_050);
        assert_eq!(clip.samples.len(), 100);
        assert!((clip.samples[0] - 0.25).abs() < 1e-4);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_wav(&temp_file_path("missing")).expect_err("no file");
        assert!(err.contains("Failed to open WAV"));
    }

    #[test]
    fn resample_doubles_length_when_upsampling() {
        let clip = Clip {
            samples: vec![0.0, 1.0, 0.0, -1.0],
            sample_rate: 22_050,
        };
        let up = clip.resampled(44_100);
        assert_eq!(up.sample_rate, 44_100);
        assert_eq!(up.samples.len(), 8);
        assert!((up.samples[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn every_sound_has_a_bounded_fallback() {
        for sound in SoundEvent::ALL {
            let clip = synthesize(sound, 44_100);
            assert!(!clip.samples.is_empty(), "{sound:?} is silent");
            assert!(clip.samples.iter().all(|s| s.abs() <= 1.0));
        }
        let music = synthesize_music(44_100);
        assert!(music.duration_secs() > 3.0);
    }
}
