use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

/// Fixed simulation step: 1/60 s expressed in whole microseconds.
pub const FIXED_STEP: Duration = Duration::from_micros(16_667);

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
    pub interpolation_alpha: f64,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt: FIXED_STEP.as_secs_f64(),
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            interpolation_alpha: 0.0,
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feeds `real_dt` seconds into the accumulator. Split out of
    /// `begin_frame` so the stepping logic runs without a wall clock.
    pub fn advance(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Drops banked time. Called when leaving a menu or pause so the
    /// simulation does not burst-step to catch up.
    pub fn discard_accumulated(&mut self) {
        self.accumulator = 0.0;
        self.interpolation_alpha = 0.0;
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_steps(time: &mut TimeState) -> u32 {
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn one_frame_of_fixed_dt_yields_one_step() {
        let mut time = TimeState::new();
        time.advance(time.fixed_dt);
        assert_eq!(drain_steps(&mut time), 1);
        assert_eq!(time.steps_this_frame, 1);
        assert_eq!(time.fixed_step_count, 1);
    }

    #[test]
    fn long_frame_is_capped() {
        let mut time = TimeState::new();
        time.advance(2.0);
        assert!((time.real_dt - 0.25).abs() < f64::EPSILON);
        // 0.25s / (1/60s) = 15 steps at most
        let steps = drain_steps(&mut time);
        assert!(steps <= 15, "expected at most 15 steps, got {steps}");
        assert!(steps >= 14);
    }

    #[test]
    fn short_frames_accumulate_until_a_step_is_due() {
        let mut time = TimeState::new();
        time.advance(time.fixed_dt * 0.5);
        assert_eq!(drain_steps(&mut time), 0);
        time.advance(time.fixed_dt * 0.6);
        assert_eq!(drain_steps(&mut time), 1);
    }

    #[test]
    fn discard_accumulated_prevents_catch_up_burst() {
        let mut time = TimeState::new();
        time.advance(0.2);
        time.discard_accumulated();
        assert_eq!(drain_steps(&mut time), 0);
    }

    #[test]
    fn fixed_step_constant_matches_fixed_dt() {
        let time = TimeState::new();
        assert!((FIXED_STEP.as_secs_f64() - time.fixed_dt).abs() < 1e-12);
    }
}
