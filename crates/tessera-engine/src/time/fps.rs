use std::time::Duration;

/// Counts frames and yields the rate once per reporting interval.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    pub fn new(interval: Duration) -> Self {
        Self { interval, elapsed: Duration::ZERO, frames: 0 }
    }

    /// Records one frame of length `dt` seconds. Returns frames per second when
    /// the interval has elapsed, then starts a new interval.
    pub fn frame(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += Duration::from_secs_f32(dt.max(0.0));
        if self.elapsed < self.interval {
            return None;
        }

        let fps = self.frames as f32 / self.elapsed.as_secs_f32();
        self.reset();
        Some(fps)
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.frames = 0;
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_interval() {
        let mut fps = FpsCounter::default();
        let reports: Vec<f32> = (0..120).filter_map(|_| fps.frame(1.0 / 60.0)).collect();
        assert_eq!(reports.len(), 2);
        assert!((reports[0] - 60.0).abs() < 1.0);
    }

    #[test]
    fn reset_discards_partial_interval() {
        let mut fps = FpsCounter::default();
        fps.frame(0.9);
        fps.reset();
        assert_eq!(fps.frame(0.5), None);
    }
}
