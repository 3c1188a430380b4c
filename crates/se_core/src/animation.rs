//! Rotate timelines for spinning a globe about an axis.
//!
//! A `RotateTransition` interpolates an angle linearly from `from_deg` to
//! `to_deg` over `duration_us`, repeating for a fixed number of cycles or
//! forever. As with the rest of the frame loop, time is integer microseconds
//! so every tick sequence of the same total length lands on the same angle.

use glam::Vec3;

const US_PER_SEC: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycles {
    Count(u32),
    Indefinite,
}

#[derive(Debug, Clone)]
pub struct RotateTransition {
    pub axis: Vec3,
    pub from_deg: f32,
    pub to_deg: f32,
    pub duration_us: u64,
    pub cycles: Cycles,
    elapsed_us: u64,
    finished: bool,
}

impl RotateTransition {
    pub fn new(axis: Vec3, from_deg: f32, to_deg: f32, duration_us: u64, cycles: Cycles) -> Self {
        Self {
            axis,
            from_deg,
            to_deg,
            duration_us: duration_us.max(1),
            cycles,
            elapsed_us: 0,
            finished: matches!(cycles, Cycles::Count(0)),
        }
    }

    /// One full turn about the vertical axis, 360° down to 0°, looping forever.
    pub fn y_axis_spin(period_secs: f64) -> Self {
        let duration_us = (period_secs * US_PER_SEC).round() as u64;
        Self::new(Vec3::Y, 360.0, 0.0, duration_us, Cycles::Indefinite)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn period_secs(&self) -> f64 {
        self.duration_us as f64 / US_PER_SEC
    }

    /// Change the cycle length, keeping completed cycles and the phase
    /// within the current one, so the angle does not jump.
    pub fn retime(&mut self, period_secs: f64) {
        let duration_us = ((period_secs * US_PER_SEC).round() as u64).max(1);
        if duration_us == self.duration_us {
            return;
        }
        let cycles_done = self.elapsed_us / self.duration_us;
        let phase = (self.elapsed_us % self.duration_us) as f64 / self.duration_us as f64;
        self.elapsed_us = cycles_done * duration_us + (phase * duration_us as f64).round() as u64;
        self.duration_us = duration_us;
    }

    /// Angle at `elapsed_us` from the start, ignoring the running state.
    pub fn angle_at(&self, elapsed_us: u64) -> f32 {
        if let Cycles::Count(n) = self.cycles {
            if elapsed_us >= self.duration_us.saturating_mul(n as u64) {
                return self.to_deg;
            }
        }
        let within = elapsed_us % self.duration_us;
        let t = within as f64 / self.duration_us as f64;
        self.from_deg + (self.to_deg - self.from_deg) * t as f32
    }

    /// Advance by `dt_us` and return the current angle.
    pub fn tick(&mut self, dt_us: u64) -> f32 {
        if self.finished {
            return self.to_deg;
        }
        self.elapsed_us = self.elapsed_us.saturating_add(dt_us);
        match self.cycles {
            Cycles::Indefinite => {
                // Only the phase matters; keep the counter small.
                self.elapsed_us %= self.duration_us;
            }
            Cycles::Count(n) => {
                if self.elapsed_us >= self.duration_us.saturating_mul(n as u64) {
                    self.finished = true;
                    return self.to_deg;
                }
            }
        }
        self.angle_at(self.elapsed_us)
    }
}
