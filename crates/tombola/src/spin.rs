use rand::Rng;
use std::time::Duration;

/// One planned spin: the wheel takes off instantly and eases out over
/// `duration`, settling with the winner's mid-angle under the 12-o'clock
/// pointer. Rotation is monotonically increasing for the whole spin.
#[derive(Debug, Clone)]
pub struct SpinAnimation {
    start_rotation: f64,
    total_rotation: f64,
    duration: Duration,
    winner: usize,
    started_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinSample {
    pub rotation: f64,
    pub finished: bool,
}

pub fn pick_winner(segment_count: usize) -> Option<usize> {
    (segment_count > 0).then(|| rand::rng().random_range(0..segment_count))
}

impl SpinAnimation {
    pub fn new(
        current_rotation: f64,
        segment_count: usize,
        winner: usize,
        turns: u32,
        duration: Duration,
    ) -> Self {
        let slice = 360.0 / segment_count.max(1) as f64;
        // rotation that parks the winner's mid-angle at 12 o'clock
        let settle = (360.0 - (winner as f64 + 0.5) * slice).rem_euclid(360.0);
        let delta = (settle - current_rotation.rem_euclid(360.0)).rem_euclid(360.0);
        Self {
            start_rotation: current_rotation,
            total_rotation: f64::from(turns) * 360.0 + delta,
            duration,
            winner,
            started_at: None,
        }
    }

    pub fn winner(&self) -> usize {
        self.winner
    }

    pub fn target_rotation(&self) -> f64 {
        self.start_rotation + self.total_rotation
    }

    /// Sample at a frame-clock timestamp (microseconds); the first call
    /// starts the clock.
    pub fn sample(&mut self, frame_time_us: i64) -> SpinSample {
        let start = *self.started_at.get_or_insert(frame_time_us);
        let elapsed_us = frame_time_us.saturating_sub(start).max(0) as u64;
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (Duration::from_micros(elapsed_us).as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        SpinSample {
            rotation: self.start_rotation + self.total_rotation * ease_out_cubic(t),
            finished: t >= 1.0,
        }
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}
