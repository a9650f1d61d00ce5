//! Exponential speed smoothing.
//!
//! Each tick: `speed += (target − speed) × factor`.  With the default factor
//! of 0.08 the time constant is about 12 ticks.  The filter converges
//! monotonically; a spring model would overshoot the state thresholds and
//! trigger false transitions.

/// First-order low-pass filter over the target speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedSmoother {
    speed:  f32,
    factor: f32,
}

impl SpeedSmoother {
    pub fn new(initial: f32, factor: f32) -> Self {
        SpeedSmoother { speed: initial, factor: factor.clamp(0.0, 1.0) }
    }

    /// Advance one tick toward `target` and return the new speed.
    /// A non-finite target leaves the speed unchanged.
    pub fn tick(&mut self, target: f32) -> f32 {
        if target.is_finite() {
            self.speed += (target - self.speed) * self.factor;
        }
        self.speed
    }

    pub fn speed(&self)  -> f32 { self.speed }
    pub fn factor(&self) -> f32 { self.factor }
}

impl Default for SpeedSmoother {
    fn default() -> Self { SpeedSmoother::new(0.0, 0.08) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_closed_form() {
        let (s0, t) = (0.5_f32, -0.8_f32);
        let mut s = SpeedSmoother::new(s0, 0.08);
        for n in 1..=200 {
            let v = s.tick(t);
            let expected = t - (t - s0) * 0.92_f32.powi(n);
            assert!((v - expected).abs() < 1e-4, "tick {}: {} vs {}", n, v, expected);
        }
    }

    #[test]
    fn never_overshoots() {
        for &(s0, t) in &[(0.0_f32, 0.8_f32), (0.8, -0.8), (-0.3, 0.5), (0.5, 0.5)] {
            let mut s = SpeedSmoother::new(s0, 0.08);
            let (lo, hi) = (s0.min(t), s0.max(t));
            for _ in 0..500 {
                let v = s.tick(t);
                assert!(v >= lo - 1e-6 && v <= hi + 1e-6);
            }
        }
    }

    #[test]
    fn sixty_ticks_toward_rewind() {
        let mut s = SpeedSmoother::default();
        for _ in 0..60 { s.tick(-0.8); }
        let expected = -0.8 * (1.0 - 0.92_f32.powi(60));
        assert!((s.speed() - expected).abs() < 1e-4);
        assert!(s.speed() < -0.79);
    }

    #[test]
    fn nan_target_ignored() {
        let mut s = SpeedSmoother::new(0.3, 0.08);
        assert_eq!(s.tick(f32::NAN), 0.3);
    }
}
