//! On-screen commentary that reacts to the rain state.
//!
//! The control worker sends a [`CommentaryEvent::Hide`] when a state change
//! has been stable long enough, then a [`CommentaryEvent::Request`] one
//! crossfade later.  The panel fades its old line out on `Hide`, asks the
//! [`Commentator`] for new text on `Request`, and fades that in.

use rain_control::{CommentaryEvent, RainState};

// ════════════════════════════════════════════════════════════════════════════
// Commentator — text generation seam
// ════════════════════════════════════════════════════════════════════════════

/// Produces a line of commentary for a rain state.
///
/// Returning `None` (or an empty string) means generation failed; the panel
/// then shows the canned line instead.
pub trait Commentator: Send {
    fn comment(&mut self, state: RainState) -> Option<String>;
}

const FALLING_LINES: [&str; 3] = [
    "The rain keeps its own time.",
    "Everything falls, eventually.",
    "Let it come down.",
];
const PAUSED_LINES: [&str; 3] = [
    "Held between one moment and the next.",
    "The drops wait for you.",
    "Time stands still.",
];
const RISING_LINES: [&str; 3] = [
    "The sky takes its rain back.",
    "Unfalling.",
    "Time runs the other way now.",
];

/// Fixed line used when nothing better is available.
pub fn canned_line(state: RainState) -> &'static str {
    match state {
        RainState::Falling => FALLING_LINES[0],
        RainState::Paused  => PAUSED_LINES[2],
        RainState::Rising  => RISING_LINES[2],
    }
}

/// Cycles through a small built-in set of lines per state.
#[derive(Debug, Default)]
pub struct CannedCommentator {
    next: usize,
}

impl Commentator for CannedCommentator {
    fn comment(&mut self, state: RainState) -> Option<String> {
        let lines = match state {
            RainState::Falling => &FALLING_LINES,
            RainState::Paused  => &PAUSED_LINES,
            RainState::Rising  => &RISING_LINES,
        };
        let line = lines[self.next % lines.len()];
        self.next = self.next.wrapping_add(1);
        Some(line.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PanelPhase — fade animation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanelPhase {
    /// Text fully shown.
    Shown,
    /// Old text fading out; `progress` runs 0 → 1.
    FadingOut { progress: f32 },
    /// Faded out, waiting for the new text.
    Hidden,
    /// New text fading in; `progress` runs 0 → 1.
    FadingIn { progress: f32 },
}

impl PanelPhase {
    pub fn opacity(&self) -> f32 {
        match *self {
            PanelPhase::Shown                   => 1.0,
            PanelPhase::FadingOut { progress }  => 1.0 - progress,
            PanelPhase::Hidden                  => 0.0,
            PanelPhase::FadingIn { progress }   => progress,
        }
    }

    /// Advance by `step` of a full fade.  Returns true when a fade completes.
    pub fn tick(&mut self, step: f32) -> bool {
        match self {
            PanelPhase::FadingOut { progress } => {
                *progress += step;
                if *progress >= 1.0 {
                    *self = PanelPhase::Hidden;
                    return true;
                }
            }
            PanelPhase::FadingIn { progress } => {
                *progress += step;
                if *progress >= 1.0 {
                    *self = PanelPhase::Shown;
                    return true;
                }
            }
            _ => {}
        }
        false
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CommentaryPanel
// ════════════════════════════════════════════════════════════════════════════

pub struct CommentaryPanel {
    commentator: Box<dyn Commentator>,
    text:        String,
    state:       RainState,
    phase:       PanelPhase,
    /// Duration of one fade in seconds.
    fade_secs:   f32,
}

impl CommentaryPanel {
    /// Starts showing the canned line for `initial`.
    pub fn new(commentator: Box<dyn Commentator>, initial: RainState, fade_secs: f32) -> Self {
        CommentaryPanel {
            commentator,
            text:      canned_line(initial).to_string(),
            state:     initial,
            phase:     PanelPhase::Shown,
            fade_secs: fade_secs.max(1e-3),
        }
    }

    pub fn handle(&mut self, event: CommentaryEvent) {
        match event {
            CommentaryEvent::Hide(_) => {
                // Fade out from wherever the text currently is.
                let from = self.phase.opacity();
                self.phase = PanelPhase::FadingOut { progress: 1.0 - from };
            }
            CommentaryEvent::Request(state) => {
                let text = self.commentator.comment(state)
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| {
                        log::warn!("no commentary for {}; using canned line", state.as_str());
                        canned_line(state).to_string()
                    });
                log::info!("commentary [{}]: {}", state.as_str(), text);
                self.text  = text;
                self.state = state;
                self.phase = PanelPhase::FadingIn { progress: 0.0 };
            }
        }
    }

    /// Advance the fade by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.phase.tick(dt / self.fade_secs);
    }

    pub fn text(&self)    -> &str       { &self.text }
    pub fn state(&self)   -> RainState  { self.state }
    pub fn phase(&self)   -> PanelPhase { self.phase }
    pub fn opacity(&self) -> f32        { self.phase.opacity() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;
    impl Commentator for Broken {
        fn comment(&mut self, _: RainState) -> Option<String> { None }
    }

    struct Blank;
    impl Commentator for Blank {
        fn comment(&mut self, _: RainState) -> Option<String> { Some("   ".into()) }
    }

    fn panel(c: Box<dyn Commentator>) -> CommentaryPanel {
        CommentaryPanel::new(c, RainState::Paused, 0.3)
    }

    #[test]
    fn hide_then_request_crossfades() {
        let mut p = panel(Box::new(CannedCommentator::default()));
        assert_eq!(p.opacity(), 1.0);

        p.handle(CommentaryEvent::Hide(RainState::Rising));
        for _ in 0..20 { p.tick(1.0 / 60.0); }
        assert_eq!(p.phase(), PanelPhase::Hidden);
        assert_eq!(p.opacity(), 0.0);

        p.handle(CommentaryEvent::Request(RainState::Rising));
        assert_eq!(p.state(), RainState::Rising);
        assert!(RISING_LINES.contains(&p.text()));
        for _ in 0..20 { p.tick(1.0 / 60.0); }
        assert_eq!(p.phase(), PanelPhase::Shown);
    }

    #[test]
    fn failed_generation_uses_canned_line() {
        let mut p = panel(Box::new(Broken));
        p.handle(CommentaryEvent::Request(RainState::Falling));
        assert_eq!(p.text(), canned_line(RainState::Falling));

        let mut p = panel(Box::new(Blank));
        p.handle(CommentaryEvent::Request(RainState::Rising));
        assert_eq!(p.text(), canned_line(RainState::Rising));
    }

    #[test]
    fn hide_mid_fade_in_starts_from_current_opacity() {
        let mut p = panel(Box::new(CannedCommentator::default()));
        p.handle(CommentaryEvent::Request(RainState::Falling));
        p.tick(0.15);
        let before = p.opacity();
        p.handle(CommentaryEvent::Hide(RainState::Paused));
        assert!((p.opacity() - before).abs() < 1e-6);
    }

    #[test]
    fn canned_commentator_cycles() {
        let mut c = CannedCommentator::default();
        let a = c.comment(RainState::Paused).unwrap();
        let b = c.comment(RainState::Paused).unwrap();
        assert_ne!(a, b);
    }
}
