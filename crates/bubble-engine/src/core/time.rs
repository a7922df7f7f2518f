/// Virtual millisecond clock.
/// The host advances it from frame deltas; every timer in the stage is
/// expressed against it, so tests can drive time exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    /// Whole milliseconds elapsed since the stage was created.
    now_ms: u64,
    /// Fractional milliseconds carried over from frame deltas.
    carry: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Add a frame delta (in milliseconds). Returns the target time the stage
    /// should advance to; the clock itself only moves through `set`.
    pub fn accumulate(&mut self, frame_dt_ms: f64) -> u64 {
        // Hidden tabs can report garbage deltas; ignore anything non-positive.
        if !frame_dt_ms.is_finite() || frame_dt_ms <= 0.0 {
            return self.now_ms;
        }
        self.carry += frame_dt_ms;
        let whole = self.carry.floor();
        self.carry -= whole;
        self.now_ms.saturating_add(whole as u64)
    }

    /// Move the clock forward. Never goes backwards.
    pub fn set(&mut self, t: u64) {
        self.now_ms = self.now_ms.max(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_keeps_fractions() {
        let mut clock = Clock::new();
        let t = clock.accumulate(16.6);
        assert_eq!(t, 16);
        clock.set(t);
        let t = clock.accumulate(16.6);
        assert_eq!(t, 33);
    }

    #[test]
    fn ignores_negative_and_nan_deltas() {
        let mut clock = Clock::new();
        clock.set(100);
        assert_eq!(clock.accumulate(-5.0), 100);
        assert_eq!(clock.accumulate(f64::NAN), 100);
    }

    #[test]
    fn never_moves_backwards() {
        let mut clock = Clock::new();
        clock.set(500);
        clock.set(200);
        assert_eq!(clock.now(), 500);
    }
}
