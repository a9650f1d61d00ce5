//! Per-frame hand samples and freshness tracking.
//!
//! Landmark detection runs asynchronously relative to rendering, so the
//! renderer usually sees a sample that is a frame or two old.  That is fine.
//! A sample that has not been refreshed for `lost_after` means the detector
//! stalled, and the hand is treated as gone.

use std::time::Duration;

use crate::force::GripProfile;
use crate::landmarks::HandLandmarks;

// ════════════════════════════════════════════════════════════════════════════
// HandFrame — one detector result
// ════════════════════════════════════════════════════════════════════════════

/// One result from the landmark detector.
#[derive(Clone, Debug)]
pub struct HandFrame {
    /// Monotonic capture time.
    pub timestamp: Duration,
    /// `None` when the detector saw no hand.
    pub landmarks: Option<HandLandmarks>,
}

impl HandFrame {
    pub fn empty(timestamp: Duration) -> Self {
        HandFrame { timestamp, landmarks: None }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandSample
// ════════════════════════════════════════════════════════════════════════════

/// Screen position and grip force of the tracked hand for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSample {
    /// 0 = left edge, 1 = right edge.
    pub x:     f32,
    /// 0 = top, 1 = bottom.
    pub y:     f32,
    /// 0 = open palm, 1 = closed fist.
    pub force: f32,
}

impl HandSample {
    /// Sample at the palm centre with the default grip profile.
    /// `mirror_x` flips the horizontal axis for selfie-view cameras.
    pub fn from_landmarks(hand: &HandLandmarks, mirror_x: bool) -> Self {
        Self::with_profile(hand, mirror_x, &GripProfile::default())
    }

    pub fn with_profile(hand: &HandLandmarks, mirror_x: bool, profile: &GripProfile) -> Self {
        let palm = hand.palm_centre();
        let x = if mirror_x { 1.0 - palm.x } else { palm.x };
        HandSample {
            x:     x.clamp(0.0, 1.0),
            y:     palm.y.clamp(0.0, 1.0),
            force: profile.estimate(hand),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

/// Holds the latest hand sample and decides when it has gone stale.
#[derive(Debug)]
pub struct HandTracker {
    profile:    GripProfile,
    mirror_x:   bool,
    lost_after: Duration,
    latest:     Option<(Duration, HandSample)>,
}

impl HandTracker {
    pub fn new(profile: GripProfile, mirror_x: bool, lost_after: Duration) -> Self {
        HandTracker { profile, mirror_x, lost_after, latest: None }
    }

    /// Feed one detector result.  Frames older than the held sample are
    /// ignored; a "no hand" frame clears the sample.
    pub fn observe(&mut self, frame: HandFrame) {
        if let Some((ts, _)) = self.latest {
            if frame.timestamp < ts {
                log::warn!("dropping out-of-order hand frame ({:?} < {:?})", frame.timestamp, ts);
                return;
            }
        }
        self.latest = frame.landmarks.as_ref().map(|hand| {
            (frame.timestamp, HandSample::with_profile(hand, self.mirror_x, &self.profile))
        });
    }

    /// The current sample, or `None` when no hand is tracked or the last
    /// sample is older than `lost_after`.
    pub fn current(&self, now: Duration) -> Option<HandSample> {
        match self.latest {
            Some((ts, sample)) if now.saturating_sub(ts) <= self.lost_after => Some(sample),
            _ => None,
        }
    }

    pub fn clear(&mut self) { self.latest = None; }
}

impl Default for HandTracker {
    fn default() -> Self {
        HandTracker::new(GripProfile::default(), true, Duration::from_millis(500))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LANDMARK_COUNT, MIDDLE_MCP};

    fn hand_at(x: f32, y: f32) -> HandLandmarks {
        let mut pts = [[x, y + 0.1, 0.0]; LANDMARK_COUNT];
        pts[MIDDLE_MCP] = [x, y, 0.0];
        HandLandmarks::from_points(&pts).unwrap()
    }

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn sample_uses_palm_centre() {
        let s = HandSample::from_landmarks(&hand_at(0.2, 0.4), false);
        assert!((s.x - 0.2).abs() < 1e-6);
        assert!((s.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn mirror_flips_x() {
        let s = HandSample::from_landmarks(&hand_at(0.2, 0.4), true);
        assert!((s.x - 0.8).abs() < 1e-6);
    }

    #[test]
    fn stale_sample_still_used() {
        let mut t = HandTracker::default();
        t.observe(HandFrame { timestamp: ms(100), landmarks: Some(hand_at(0.5, 0.5)) });
        assert!(t.current(ms(250)).is_some());
    }

    #[test]
    fn lost_after_timeout() {
        let mut t = HandTracker::default();
        t.observe(HandFrame { timestamp: ms(100), landmarks: Some(hand_at(0.5, 0.5)) });
        assert!(t.current(ms(700)).is_none());
    }

    #[test]
    fn empty_frame_clears() {
        let mut t = HandTracker::default();
        t.observe(HandFrame { timestamp: ms(100), landmarks: Some(hand_at(0.5, 0.5)) });
        t.observe(HandFrame::empty(ms(120)));
        assert!(t.current(ms(120)).is_none());
    }

    #[test]
    fn out_of_order_frame_ignored() {
        let mut t = HandTracker::default();
        t.observe(HandFrame { timestamp: ms(200), landmarks: Some(hand_at(0.5, 0.5)) });
        t.observe(HandFrame::empty(ms(150)));
        assert!(t.current(ms(200)).is_some());
    }

    #[test]
    fn never_seen_is_absent() {
        assert!(HandTracker::default().current(ms(0)).is_none());
    }
}
