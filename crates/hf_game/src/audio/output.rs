//! cpal output stream fed from a lock-free ring buffer. The game thread is the
//! only producer; the device callback is the only consumer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapRb,
};

/// ~100ms of stereo at 48 kHz.
const RING_BUFFER_SIZE: usize = 9600;

pub struct AudioOutput {
    producer: ringbuf::HeapProd<f32>,
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: usize,
}

impl AudioOutput {
    pub fn new() -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "No audio output device available".to_string())?;
        let config = device
            .default_output_config()
            .map_err(|e| format!("Failed to get default output config: {e}"))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        if channels == 0 {
            return Err("Audio device reports zero channels".to_string());
        }

        let ring = HeapRb::<f32>::new(RING_BUFFER_SIZE);
        let (producer, mut consumer) = ring.split();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                let config = config.into();
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                            let popped = consumer.pop_slice(data);
                            data[popped..].fill(0.0);
                        },
                        |err| log::error!("Audio stream error: {err}"),
                        None,
                    )
                    .map_err(|e| format!("Failed to build audio stream: {e}"))?
            }
            cpal::SampleFormat::I16 => {
                let config = config.into();
                let mut scratch: Vec<f32> = vec![0.0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                            if scratch.len() < data.len() {
                                scratch.resize(data.len(), 0.0);
                            }
                            let popped = consumer.pop_slice(&mut scratch[..data.len()]);
                            for (out, &f) in data.iter_mut().zip(&scratch[..popped]) {
                                *out = (f * 32767.0).clamp(-32768.0, 32767.0) as i16;
                            }
                            data[popped..].fill(0);
                        },
                        |err| log::error!("Audio stream error: {err}"),
                        None,
                    )
                    .map_err(|e| format!("Failed to build audio stream: {e}"))?
            }
            cpal::SampleFormat::U16 => {
                let config = config.into();
                let mut scratch: Vec<f32> = vec![0.0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                            if scratch.len() < data.len() {
                                scratch.resize(data.len(), 0.0);
                            }
                            let popped = consumer.pop_slice(&mut scratch[..data.len()]);
                            for (out, &f) in data.iter_mut().zip(&scratch[..popped]) {
                                *out = (f * 32767.0 + 32768.0).clamp(0.0, 65535.0) as u16;
                            }
                            // 0x8000 is silence for unsigned samples.
                            data[popped..].fill(32768);
                        },
                        |err| log::error!("Audio stream error: {err}"),
                        None,
                    )
                    .map_err(|e| format!("Failed to build audio stream: {e}"))?
            }
            other => return Err(format!("Unsupported sample format: {other:?}")),
        };

        stream
            .play()
            .map_err(|e| format!("Failed to play audio stream: {e}"))?;
        log::info!("Audio stream started: {sample_rate} Hz, {channels} channel(s)");

        Ok(Self {
            producer,
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples queued but not yet played, in device channel layout.
    pub fn queued_samples(&self) -> usize {
        self.producer.occupied_len()
    }

    pub fn capacity(&self) -> usize {
        RING_BUFFER_SIZE
    }

    /// Queues interleaved stereo frames, adapting them to the device's channel
    /// count. Samples that do not fit are dropped.
    pub fn push_stereo(&mut self, stereo: &[f32]) {
        let pushed = if self.channels == 2 {
            self.producer.push_slice(stereo)
        } else {
            let adapted: Vec<f32> = stereo
                .chunks_exact(2)
                .flat_map(|frame| adapt_frame(frame[0], frame[1], self.channels))
                .collect();
            self.producer.push_slice(&adapted)
        };
        if pushed == 0 && !stereo.is_empty() {
            log::debug!("Audio buffer full, dropped {} samples", stereo.len());
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// One stereo frame laid out for `channels` outputs: mono downmix, or left and
/// right on the first two channels with silence elsewhere.
fn adapt_frame(left: f32, right: f32, channels: usize) -> impl Iterator<Item = f32> {
    (0..channels).map(move |c| match (channels, c) {
        (1, _) => (left + right) * 0.5,
        (_, 0) => left,
        (_, 1) => right,
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frames_adapt_to_device_layout() {
        assert_eq!(adapt_frame(0.2, 0.6, 1).collect::<Vec<_>>(), vec![0.4]);
        assert_eq!(
            adapt_frame(0.2, 0.6, 4).collect::<Vec<_>>(),
            vec![0.2, 0.6, 0.0, 0.0]
        );
    }
}
