/// Animation-frame clock.
/// Derives per-frame delta from host timestamps (milliseconds) and clamps it so a
/// backgrounded tab or a slow frame cannot destabilize the spring integration.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp of the previous frame, `None` while the loop is stopped.
    last_ms: Option<f64>,
    /// Smallest delta handed out, in seconds.
    min_dt: f32,
    /// Largest delta handed out, in seconds.
    max_dt: f32,
}

impl FrameClock {
    /// Delta used for the first frame after the loop (re)starts.
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    pub fn new(min_dt: f32, max_dt: f32) -> Self {
        Self {
            last_ms: None,
            min_dt,
            max_dt: max_dt.max(min_dt),
        }
    }

    /// Record a frame timestamp and return the clamped delta in seconds.
    pub fn advance(&mut self, timestamp_ms: f64) -> f32 {
        let raw = match self.last_ms {
            Some(last) => ((timestamp_ms - last) / 1000.0) as f32,
            None => Self::DEFAULT_DT,
        };
        self.last_ms = Some(timestamp_ms);
        raw.clamp(self.min_dt, self.max_dt)
    }

    /// Forget the previous timestamp. Called when the loop stops scheduling itself.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.last_ms.is_some()
    }
}
