use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// 1/60 s, rounded to whole microseconds.
pub const FIXED_DT_US: u64 = 16_667;
/// Spiral-of-death cap on the accumulator.
pub const MAX_ACCUMULATOR_US: u64 = 250_000;

/// Fixed-timestep frame clock. All bookkeeping is in integer microseconds so
/// timeline ticks advance identically regardless of frame pacing.
pub struct FrameClock {
    pub fixed_dt_us: u64,
    accumulator_us: u64,
    pub total_us: u64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    last_instant: Instant,

    frame_samples_us: [u64; FPS_SAMPLE_COUNT],
    sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            fixed_dt_us: FIXED_DT_US,
            accumulator_us: 0,
            total_us: 0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            last_instant: Instant::now(),
            frame_samples_us: [FIXED_DT_US; FPS_SAMPLE_COUNT],
            sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: FIXED_DT_US as f64 / 1000.0,
        }
    }

    /// Measure wall-clock time since the previous frame and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_micros() as u64;
        self.last_instant = now;
        self.feed(elapsed);
    }

    /// Feed an explicit frame delta. `begin_frame` is the wall-clock wrapper.
    pub fn feed(&mut self, mut frame_us: u64) {
        if frame_us > MAX_ACCUMULATOR_US {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                frame_us as f64 / 1000.0,
                MAX_ACCUMULATOR_US / 1000
            );
            frame_us = MAX_ACCUMULATOR_US;
        }
        self.accumulator_us += frame_us;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.frame_samples_us[self.sample_index] = frame_us;
        self.sample_index = (self.sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_us =
            self.frame_samples_us.iter().sum::<u64>() as f64 / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_us / 1000.0;
        self.smoothed_fps = if avg_us > 0.0 { 1_000_000.0 / avg_us } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator_us >= self.fixed_dt_us {
            self.accumulator_us -= self.fixed_dt_us;
            self.total_us += self.fixed_dt_us;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
