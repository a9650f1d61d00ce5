//! Hand height → target fall speed.

use serde::{Deserialize, Serialize};

use crate::tracker::HandSample;

/// Maps a hand sample (or no hand) to the speed the smoother converges on.
///
/// Hand at the top of the frame rewinds the rain at full speed, hand at the
/// bottom drops it at full speed, centred holds it still.  No hand at all is
/// *not* centred: it gives the gentle idle fall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentMapper {
    /// Target used while no hand is present.
    pub idle_target: f32,
    /// Largest gesture-derived magnitude, reached at the frame edges.
    pub max_speed:   f32,
}

impl Default for IntentMapper {
    fn default() -> Self {
        IntentMapper { idle_target: 0.5, max_speed: 0.8 }
    }
}

impl IntentMapper {
    pub fn target_speed(&self, sample: Option<&HandSample>) -> f32 {
        match sample {
            Some(s) => (s.y.clamp(0.0, 1.0) - 0.5) * 2.0 * self.max_speed,
            None    => self.idle_target,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: f32) -> HandSample {
        HandSample { x: 0.5, y, force: 0.0 }
    }

    #[test]
    fn top_rewinds() {
        let t = IntentMapper::default().target_speed(Some(&at(0.0)));
        assert!((t + 0.8).abs() < 1e-6);
    }

    #[test]
    fn bottom_falls() {
        let t = IntentMapper::default().target_speed(Some(&at(1.0)));
        assert!((t - 0.8).abs() < 1e-6);
    }

    #[test]
    fn centre_holds() {
        let t = IntentMapper::default().target_speed(Some(&at(0.5)));
        assert!(t.abs() < 1e-6);
    }

    #[test]
    fn absent_is_idle_fall_not_neutral() {
        let m = IntentMapper::default();
        assert_eq!(m.target_speed(None), 0.5);
        assert_ne!(m.target_speed(None), m.target_speed(Some(&at(0.5))));
    }
}
