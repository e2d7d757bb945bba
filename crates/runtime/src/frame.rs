use foundation::time::Time;

/// Per-tick frame metadata.
///
/// Display refresh drives the engine, so `dt_s` varies from frame to frame.
/// `time` accumulates the deltas and is the only clock the engine reads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Engine time at the end of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// The frame before the first tick.
    pub fn origin() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time::ZERO,
        }
    }

    /// Advance by `dt_s` seconds. Negative or non-finite deltas count as zero.
    pub fn next(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.after(dt_s),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::origin()
    }
}
