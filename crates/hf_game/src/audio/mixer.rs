//! Software mixer: a bounded pool of one-shot voices plus one looping music
//! track, mixed to interleaved stereo.

use std::sync::Arc;

use super::clips::Clip;

struct Voice {
    clip: Arc<Clip>,
    position: usize,
    volume: f32,
    pan: f32,
}

struct Music {
    clip: Arc<Clip>,
    position: usize,
    volume: f32,
}

pub struct Mixer {
    voices: Vec<Voice>,
    max_voices: usize,
    music: Option<Music>,
}

/// Equal-power gains for `pan` in [-1, 1]: -1 full left, 0 center, 1 full right.
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
    (angle.cos(), angle.sin())
}

impl Mixer {
    pub fn new(max_voices: usize) -> Self {
        Self {
            voices: Vec::with_capacity(max_voices),
            max_voices: max_voices.max(1),
            music: None,
        }
    }

    /// Starts a one-shot. When every voice is busy the oldest one is dropped.
    pub fn play(&mut self, clip: Arc<Clip>, volume: f32, pan: f32) {
        if self.voices.len() >= self.max_voices {
            self.voices.remove(0);
        }
        self.voices.push(Voice {
            clip,
            position: 0,
            volume,
            pan,
        });
    }

    pub fn start_music(&mut self, clip: Arc<Clip>, volume: f32) {
        self.music = Some(Music {
            clip,
            position: 0,
            volume,
        });
    }

    pub fn stop_music(&mut self) {
        self.music = None;
    }

    pub fn music_playing(&self) -> bool {
        self.music.is_some()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Mixes into `out` as interleaved stereo frames, overwriting its contents.
    pub fn mix(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let frames = out.len() / 2;

        for voice in &mut self.voices {
            let (left, right) = pan_gains(voice.pan);
            let remaining = voice.clip.samples.len().saturating_sub(voice.position);
            let count = remaining.min(frames);
            let source = &voice.clip.samples[voice.position..voice.position + count];
            for (frame, sample) in out.chunks_exact_mut(2).zip(source) {
                let s = sample * voice.volume;
                frame[0] += s * left;
                frame[1] += s * right;
            }
            voice.position += count;
        }
        self.voices
            .retain(|voice| voice.position < voice.clip.samples.len());

        if let Some(music) = &mut self.music {
            let len = music.clip.samples.len();
            if len > 0 {
                let (left, right) = pan_gains(0.0);
                for frame in out.chunks_exact_mut(2) {
                    let s = music.clip.samples[music.position] * music.volume;
                    frame[0] += s * left;
                    frame[1] += s * right;
                    music.position = (music.position + 1) % len;
                }
            }
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(value: f32, len: usize) -> Arc<Clip> {
        Arc::new(Clip {
            samples: vec![value; len],
            sample_rate: 44_100,
        })
    }

    #[test]
    fn center_pan_is_equal_power() {
        let (l, r) = pan_gains(0.0);
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-5);
        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);
    }

    #[test]
    fn one_shot_finishes_and_frees_its_voice() {
        let mut mixer = Mixer::new(4);
        mixer.play(clip(0.5, 3), 1.0, -1.0);
        let mut out = vec![0.0; 8];
        mixer.mix(&mut out);
        assert_eq!(&out[..6], &[0.5, 0.0, 0.5, 0.0, 0.5, 0.0]);
        assert_eq!(&out[6..], &[0.0, 0.0]);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn oldest_voice_is_stolen_when_full() {
        let mut mixer = Mixer::new(2);
        mixer.play(clip(0.1, 100), 1.0, -1.0);
        mixer.play(clip(0.2, 100), 1.0, -1.0);
        mixer.play(clip(0.4, 100), 1.0, -1.0);
        assert_eq!(mixer.active_voices(), 2);
        let mut out = vec![0.0; 2];
        mixer.mix(&mut out);
        assert!((out[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn output_is_clamped() {
        let mut mixer = Mixer::new(8);
        for _ in 0..5 {
            mixer.play(clip(0.9, 10), 1.0, 1.0);
        }
        let mut out = vec![0.0; 20];
        mixer.mix(&mut out);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn music_loops_until_stopped() {
        let mut mixer = Mixer::new(2);
        mixer.start_music(clip(0.3, 2), 1.0);
        let mut out = vec![0.0; 20];
        mixer.mix(&mut out);
        assert!(out.iter().all(|s| *s > 0.0));
        mixer.stop_music();
        mixer.mix(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }
}
