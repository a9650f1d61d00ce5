//! The 21-point hand skeleton as delivered by the landmark detector.
//!
//! Coordinates are normalised image space: `x, y ∈ [0, 1]` with `y = 0` at
//! the top.  `z` is carried through but unused by the geometry here.

use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// The five fingertips, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Reasons a detector result is rejected at the boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, found {found}")]
    Count { expected: usize, found: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark / HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Euclidean distance in the image plane.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A validated set of exactly 21 landmarks with finite coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Build from raw `(x, y, z)` triples in detector order.
    pub fn from_points(points: &[[f32; 3]]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::Count { expected: LANDMARK_COUNT, found: points.len() });
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        for (i, p) in points.iter().enumerate() {
            if !p.iter().all(|c| c.is_finite()) {
                return Err(LandmarkError::NonFinite { index: i });
            }
            out[i] = Landmark::new(p[0], p[1], p[2]);
        }
        Ok(HandLandmarks { points: out })
    }

    pub fn from_landmarks(points: [Landmark; LANDMARK_COUNT]) -> Result<Self, LandmarkError> {
        for (i, p) in points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(LandmarkError::NonFinite { index: i });
            }
        }
        Ok(HandLandmarks { points })
    }

    pub fn get(&self, index: usize) -> &Landmark { &self.points[index] }
    pub fn wrist(&self)      -> &Landmark { &self.points[WRIST] }
    pub fn palm_centre(&self) -> &Landmark { &self.points[MIDDLE_MCP] }
    pub fn points(&self)     -> &[Landmark; LANDMARK_COUNT] { &self.points }
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic poses
// ════════════════════════════════════════════════════════════════════════════

/// Fan angles (radians from straight up) for thumb … pinky.
const FINGER_FAN: [f32; 5] = [-0.9, -0.35, 0.0, 0.3, 0.6];

impl HandLandmarks {
    /// An upright hand posed procedurally, for simulation without a camera.
    ///
    /// `(cx, cy)` is the palm centre (landmark 9), `palm` the wrist → palm
    /// centre distance, and `grip` the closure from 0 (fingers spread to
    /// 1.8 palms from the wrist) to 1 (curled in to 0.7 palms).
    pub fn synthetic(cx: f32, cy: f32, palm: f32, grip: f32) -> Self {
        let grip  = grip.clamp(0.0, 1.0);
        let reach = palm * (1.8 + (0.7 - 1.8) * grip);
        let wrist = Landmark::new(cx, cy + palm, 0.0);

        let mut pts = [wrist; LANDMARK_COUNT];
        for (finger, &fan) in FINGER_FAN.iter().enumerate() {
            let (dx, dy) = (fan.sin(), -fan.cos());
            let base = 1 + finger * 4;
            let knuckle = Landmark::new(wrist.x + dx * palm, wrist.y + dy * palm, 0.0);
            let tip     = Landmark::new(wrist.x + dx * reach, wrist.y + dy * reach, 0.0);
            for joint in 0..4 {
                let t = joint as f32 / 3.0;
                pts[base + joint] = Landmark::new(
                    knuckle.x + (tip.x - knuckle.x) * t,
                    knuckle.y + (tip.y - knuckle.y) * t,
                    0.0,
                );
            }
        }
        // The middle knuckle is the palm centre by definition.
        pts[MIDDLE_MCP] = Landmark::new(cx, cy, 0.0);
        HandLandmarks { points: pts }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_count() {
        let pts = [[0.0_f32; 3]; 20];
        assert_eq!(
            HandLandmarks::from_points(&pts),
            Err(LandmarkError::Count { expected: 21, found: 20 })
        );
    }

    #[test]
    fn rejects_nan_coordinate() {
        let mut pts = [[0.5_f32; 3]; 21];
        pts[7][1] = f32::NAN;
        assert_eq!(
            HandLandmarks::from_points(&pts),
            Err(LandmarkError::NonFinite { index: 7 })
        );
    }

    #[test]
    fn accepts_valid_hand() {
        let pts = [[0.25_f32, 0.75, -0.1]; 21];
        let hand = HandLandmarks::from_points(&pts).unwrap();
        assert_eq!(hand.palm_centre().x, 0.25);
        assert_eq!(hand.wrist().y, 0.75);
    }

    #[test]
    fn synthetic_hand_shape() {
        let hand = HandLandmarks::synthetic(0.5, 0.5, 0.1, 0.0);
        assert_eq!(*hand.palm_centre(), Landmark::new(0.5, 0.5, 0.0));
        assert!((hand.wrist().distance_2d(hand.palm_centre()) - 0.1).abs() < 1e-6);
        for &tip in &FINGERTIPS {
            assert!((hand.wrist().distance_2d(hand.get(tip)) - 0.18).abs() < 1e-5);
        }
    }

    #[test]
    fn distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 5.0);
        let b = Landmark::new(3.0, 4.0, -5.0);
        assert!((a.distance_2d(&b) - 5.0).abs() < 1e-6);
    }
}
