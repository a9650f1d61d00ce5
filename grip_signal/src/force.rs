//! Grip force from hand openness.
//!
//! # Algorithm
//!
//! * `scale` = wrist → middle-finger base distance (palm size proxy).
//! * `avg_tip` = mean wrist → fingertip distance over the five fingertips.
//! * `ratio = avg_tip / scale`.
//! * `ratio ≥ open_ratio` → 0.0, `ratio ≤ fist_ratio` → 1.0, linear between.
//!
//! Dividing by the palm size makes the result independent of how large the
//! hand appears in the frame.

use serde::{Deserialize, Serialize};

use crate::landmarks::{HandLandmarks, FINGERTIPS, MIDDLE_MCP, WRIST};

/// Palm scales below this are treated as degenerate geometry.
const MIN_PALM_SCALE: f32 = 1e-6;

/// Ratio bounds for the open-hand → fist mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GripProfile {
    /// Tip/palm ratio at or above which the hand counts as fully open.
    pub open_ratio: f32,
    /// Tip/palm ratio at or below which the hand counts as a closed fist.
    pub fist_ratio: f32,
}

impl Default for GripProfile {
    fn default() -> Self {
        GripProfile { open_ratio: 1.5, fist_ratio: 0.9 }
    }
}

impl GripProfile {
    /// Map a tip/palm ratio to a force in `[0, 1]`.  Non-finite ratios map to
    /// 0.0 so a NaN can never leave this function.
    pub fn force_for_ratio(&self, ratio: f32) -> f32 {
        if !ratio.is_finite() {
            return 0.0;
        }
        let span = self.open_ratio - self.fist_ratio;
        if span <= 0.0 {
            return if ratio <= self.fist_ratio { 1.0 } else { 0.0 };
        }
        ((self.open_ratio - ratio) / span).clamp(0.0, 1.0)
    }

    /// Grip force for a full hand.
    pub fn estimate(&self, hand: &HandLandmarks) -> f32 {
        let wrist = hand.get(WRIST);
        let scale = wrist.distance_2d(hand.get(MIDDLE_MCP));
        if scale < MIN_PALM_SCALE {
            log::debug!("degenerate palm scale {:.2e}; reporting open hand", scale);
            return 0.0;
        }
        let avg_tip = FINGERTIPS.iter()
            .map(|&i| wrist.distance_2d(hand.get(i)))
            .sum::<f32>() / FINGERTIPS.len() as f32;
        self.force_for_ratio(avg_tip / scale)
    }
}

/// Grip force with the default 1.5 / 0.9 ratio bounds.
pub fn estimate_grip_force(hand: &HandLandmarks) -> f32 {
    GripProfile::default().estimate(hand)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LANDMARK_COUNT};

    /// Hand with palm size `scale` whose five fingertips all sit at
    /// `ratio × scale` from the wrist, fanned upward.
    fn hand_with_ratio(scale: f32, ratio: f32) -> HandLandmarks {
        let wrist = Landmark::new(0.5, 0.8, 0.0);
        let mut pts = [wrist; LANDMARK_COUNT];
        pts[MIDDLE_MCP] = Landmark::new(0.5, 0.8 - scale, 0.0);
        for (k, &tip) in FINGERTIPS.iter().enumerate() {
            let angle = -std::f32::consts::FRAC_PI_2 + (k as f32 - 2.0) * 0.25;
            let r = ratio * scale;
            pts[tip] = Landmark::new(wrist.x + r * angle.cos(), wrist.y + r * angle.sin(), 0.0);
        }
        HandLandmarks::from_landmarks(pts).unwrap()
    }

    #[test]
    fn open_hand_is_zero() {
        assert_eq!(estimate_grip_force(&hand_with_ratio(0.1, 1.5001)), 0.0);
        assert_eq!(estimate_grip_force(&hand_with_ratio(0.1, 2.2)), 0.0);
    }

    #[test]
    fn fist_is_one() {
        assert_eq!(estimate_grip_force(&hand_with_ratio(0.1, 0.8999)), 1.0);
        assert_eq!(estimate_grip_force(&hand_with_ratio(0.1, 0.4)), 1.0);
    }

    #[test]
    fn ratio_bounds_are_exact() {
        let p = GripProfile::default();
        assert_eq!(p.force_for_ratio(1.5), 0.0);
        assert_eq!(p.force_for_ratio(0.9), 1.0);
    }

    #[test]
    fn midpoint_is_half() {
        let f = estimate_grip_force(&hand_with_ratio(0.1, 1.2));
        assert!((f - 0.5).abs() < 1e-3, "force {}", f);
    }

    #[test]
    fn monotone_as_hand_closes() {
        let mut last = -1.0_f32;
        for step in 0..=60 {
            let ratio = 1.5 - 0.6 * step as f32 / 60.0;
            let f = estimate_grip_force(&hand_with_ratio(0.12, ratio));
            assert!((0.0..=1.0).contains(&f));
            assert!(f >= last - 1e-6, "force dropped at ratio {}", ratio);
            last = f;
        }
    }

    #[test]
    fn independent_of_hand_size() {
        let small = estimate_grip_force(&hand_with_ratio(0.05, 1.1));
        let large = estimate_grip_force(&hand_with_ratio(0.25, 1.1));
        assert!((small - large).abs() < 1e-3);
    }

    #[test]
    fn synthetic_pose_spans_full_range() {
        assert_eq!(estimate_grip_force(&HandLandmarks::synthetic(0.5, 0.5, 0.1, 0.0)), 0.0);
        assert_eq!(estimate_grip_force(&HandLandmarks::synthetic(0.5, 0.5, 0.1, 1.0)), 1.0);
        let half = estimate_grip_force(&HandLandmarks::synthetic(0.5, 0.5, 0.1, 0.5));
        assert!((half - 0.25 / 0.6).abs() < 1e-3, "force {}", half);
    }

    #[test]
    fn degenerate_palm_is_finite() {
        let pts = [[0.3_f32, 0.3, 0.0]; LANDMARK_COUNT];
        let hand = HandLandmarks::from_points(&pts).unwrap();
        let f = estimate_grip_force(&hand);
        assert!(f.is_finite());
        assert_eq!(f, 0.0);
    }

    #[test]
    fn nan_ratio_maps_to_zero() {
        assert_eq!(GripProfile::default().force_for_ratio(f32::NAN), 0.0);
        assert_eq!(GripProfile::default().force_for_ratio(f32::INFINITY), 0.0);
    }
}
