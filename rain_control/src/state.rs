//! Discrete rain state with debounced commentary notifications.
//!
//! The *state* follows the smoothed speed immediately.  The *commentary*
//! notification is debounced: it is scheduled only when the entered state
//! differs from the last state that was actually announced, and fires after
//! `debounce` of quiet.  Any further state change cancels the pending
//! notification and reschedules it for the newer state.
//!
//! Once a notification fires, the commentary collaborator gets a two-phase
//! handoff: [`CommentaryEvent::Hide`] right away, then
//! [`CommentaryEvent::Request`] `crossfade` later, after which it reveals the
//! new text.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// RainState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RainState {
    Falling,
    Paused,
    Rising,
}

impl RainState {
    /// `speed > threshold` → Falling, `speed < −threshold` → Rising,
    /// otherwise Paused.
    pub fn classify(speed: f32, threshold: f32) -> Self {
        if speed > threshold {
            RainState::Falling
        } else if speed < -threshold {
            RainState::Rising
        } else {
            RainState::Paused
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RainState::Falling => "FALLING",
            RainState::Paused  => "PAUSED",
            RainState::Rising  => "RISING",
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            RainState::Falling => 0,
            RainState::Paused  => 1,
            RainState::Rising  => 2,
        }
    }

    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => RainState::Falling,
            2 => RainState::Rising,
            _ => RainState::Paused,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CommentaryEvent
// ════════════════════════════════════════════════════════════════════════════

/// Handoff signals for the commentary collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentaryEvent {
    /// Fade out the current text; new text for this state is coming.
    Hide(RainState),
    /// Fetch and reveal text for this state.
    Request(RainState),
}

// ════════════════════════════════════════════════════════════════════════════
// RainStateMachine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    state: RainState,
    due:   Duration,
}

/// Classifies smoothed speed and debounces commentary notifications.
///
/// Time is passed in explicitly as a monotonic offset so the machine is
/// deterministic under test.
#[derive(Debug)]
pub struct RainStateMachine {
    threshold:     f32,
    debounce:      Duration,
    crossfade:     Duration,
    state:         RainState,
    last_notified: RainState,
    pending:       Option<Scheduled>,
    request:       Option<Scheduled>,
}

impl RainStateMachine {
    /// Start in the state implied by `initial_speed`; that state counts as
    /// already announced.
    pub fn new(initial_speed: f32, threshold: f32, debounce: Duration, crossfade: Duration) -> Self {
        let state = RainState::classify(initial_speed, threshold);
        RainStateMachine {
            threshold,
            debounce,
            crossfade,
            state,
            last_notified: state,
            pending: None,
            request: None,
        }
    }

    pub fn state(&self)         -> RainState { self.state }
    pub fn last_notified(&self) -> RainState { self.last_notified }
    pub fn has_pending(&self)   -> bool      { self.pending.is_some() }

    /// Re-evaluate the state for `speed` at time `now`.
    /// Returns true when the state changed.
    pub fn update(&mut self, speed: f32, now: Duration) -> bool {
        let next = RainState::classify(speed, self.threshold);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.pending = if next != self.last_notified {
            Some(Scheduled { state: next, due: now + self.debounce })
        } else {
            None
        };
        true
    }

    /// Emit the next commentary event that is due at `now`, if any.
    /// Call repeatedly until it returns `None`.
    pub fn poll(&mut self, now: Duration) -> Option<CommentaryEvent> {
        if let Some(req) = self.request {
            if now >= req.due {
                self.request = None;
                return Some(CommentaryEvent::Request(req.state));
            }
        }
        if let Some(p) = self.pending {
            if now >= p.due {
                self.pending = None;
                self.last_notified = p.state;
                self.request = Some(Scheduled { state: p.state, due: now + self.crossfade });
                return Some(CommentaryEvent::Hide(p.state));
            }
        }
        None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    fn machine(initial: f32) -> RainStateMachine {
        RainStateMachine::new(initial, 0.02, ms(1500), ms(300))
    }

    fn drain(m: &mut RainStateMachine, now: Duration) -> Vec<CommentaryEvent> {
        let mut out = Vec::new();
        while let Some(e) = m.poll(now) { out.push(e); }
        out
    }

    #[test]
    fn classify_thresholds() {
        assert_eq!(RainState::classify(0.021, 0.02), RainState::Falling);
        assert_eq!(RainState::classify(0.02, 0.02), RainState::Paused);
        assert_eq!(RainState::classify(-0.02, 0.02), RainState::Paused);
        assert_eq!(RainState::classify(-0.021, 0.02), RainState::Rising);
    }

    #[test]
    fn u8_encoding_round_trips() {
        for s in [RainState::Falling, RainState::Paused, RainState::Rising] {
            assert_eq!(RainState::from_u8(s.to_u8()), s);
        }
    }

    #[test]
    fn state_updates_immediately() {
        let mut m = machine(0.5);
        assert_eq!(m.state(), RainState::Falling);
        assert!(m.update(-0.03, ms(10)));
        assert_eq!(m.state(), RainState::Rising);
        assert!(!m.update(-0.5, ms(20)));
    }

    #[test]
    fn notification_fires_after_debounce() {
        let mut m = machine(0.5);
        m.update(0.0, ms(1000));
        assert!(drain(&mut m, ms(2499)).is_empty());
        assert_eq!(drain(&mut m, ms(2500)), vec![CommentaryEvent::Hide(RainState::Paused)]);
        assert_eq!(m.last_notified(), RainState::Paused);
    }

    #[test]
    fn request_follows_hide_after_crossfade() {
        let mut m = machine(0.5);
        m.update(0.0, ms(0));
        assert_eq!(drain(&mut m, ms(1500)), vec![CommentaryEvent::Hide(RainState::Paused)]);
        assert!(drain(&mut m, ms(1799)).is_empty());
        assert_eq!(drain(&mut m, ms(1800)), vec![CommentaryEvent::Request(RainState::Paused)]);
    }

    #[test]
    fn second_crossing_supersedes_first() {
        let mut m = machine(0.5);
        m.update(-0.1, ms(0));      // → Rising, due 1500
        m.update(0.0, ms(1000));    // → Paused, due 2500
        assert!(drain(&mut m, ms(1600)).is_empty());
        assert!(drain(&mut m, ms(2400)).is_empty());
        assert_eq!(drain(&mut m, ms(2500)), vec![CommentaryEvent::Hide(RainState::Paused)]);
        assert!(drain(&mut m, ms(10_000)).iter().all(|e| *e == CommentaryEvent::Request(RainState::Paused)));
    }

    #[test]
    fn flicker_back_to_announced_state_cancels() {
        let mut m = machine(0.5);
        m.update(0.0, ms(0));       // Falling → Paused
        m.update(0.5, ms(200));     // back to Falling, already announced
        assert!(!m.has_pending());
        assert!(drain(&mut m, ms(5000)).is_empty());
        assert_eq!(m.state(), RainState::Falling);
    }

    #[test]
    fn sustained_rewind_reports_rising() {
        use crate::smoother::SpeedSmoother;
        let mut s = SpeedSmoother::new(0.0, 0.08);
        let mut m = machine(0.0);
        let mut events = Vec::new();
        for tick in 0..200u64 {
            let now = ms(tick * 16);
            let speed = s.tick(-0.8);
            m.update(speed, now);
            if speed < -0.02 {
                assert_eq!(m.state(), RainState::Rising);
            }
            events.extend(drain(&mut m, now));
        }
        assert_eq!(events.first(), Some(&CommentaryEvent::Hide(RainState::Rising)));
    }
}
