//! Top-level application state.
//!
//! `AppState` owns the hand tracker, the handle to the control worker, the
//! particle field, and the commentary panel.  Each frame it folds in the
//! latest detector results, hands the target speed to the control worker,
//! steps the field with the published speed, and collects the draw list.

use std::fs;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use grip_signal::{GripProfile, HandFrame, HandSample, HandTracker, IntentMapper};
use rain_control::{ControlConfig, ControlHandle, ControlLoop};
use rain_field::{DrawSegment, FieldConfig, ParticleField, StepStats, VortexParams};

use crate::commentary::{CannedCommentator, Commentator, CommentaryPanel};
use crate::error::AppError;
use crate::gesture::{spawn_gesture_source, JsonLinesSource, SimGestureSource, SimInput};
use crate::visualizer::{Attractor, Overlay, Visualizer, DEFAULT_H, DEFAULT_W};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.  Every field has a default, so a
/// config file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial window size.
    pub width:        usize,
    pub height:       usize,
    /// Fixed RNG seed for a reproducible field.
    pub seed:         Option<u64>,
    /// Flip the detector's x axis (selfie-view camera).
    pub mirror_x:     bool,
    /// A hand sample older than this counts as lost.
    pub hand_lost_ms: u64,
    /// Frame rate of the simulated detector.
    pub detector_hz:  u32,
    pub grip:         GripProfile,
    pub intent:       IntentMapper,
    pub control:      ControlConfig,
    pub field:        FieldConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:        DEFAULT_W,
            height:       DEFAULT_H,
            seed:         None,
            mirror_x:     true,
            hand_lost_ms: 500,
            detector_hz:  30,
            grip:         GripProfile::default(),
            intent:       IntentMapper::default(),
            control:      ControlConfig::default(),
            field:        FieldConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn tracker(&self) -> HandTracker {
        HandTracker::new(self.grip, self.mirror_x, Duration::from_millis(self.hand_lost_ms))
    }

    pub fn detector_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.detector_hz.max(1) as f64)
    }
}

/// Where hand frames come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkFeed {
    /// Synthetic hand driven by the mouse.
    Simulated,
    /// JSON lines on stdin from an external detector.
    Stdin,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── input ────────────────────────────────────────────────────────────
    tracker:  HandTracker,
    intent:   IntentMapper,
    hand:     Option<HandSample>,

    // ── control ──────────────────────────────────────────────────────────
    control:  ControlHandle,
    panel:    CommentaryPanel,

    // ── simulation ───────────────────────────────────────────────────────
    field:    ParticleField,
    segments: Vec<DrawSegment>,
    stats:    StepStats,

    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, commentator: Box<dyn Commentator>) -> Self {
        let control = ControlLoop::spawn(cfg.control.clone());
        let panel   = CommentaryPanel::new(
            commentator,
            control.state(),
            cfg.control.crossfade_ms as f32 / 1000.0,
        );
        let field = ParticleField::with_size(
            cfg.field.clone(), cfg.width as f32, cfg.height as f32, cfg.seed,
        );
        log::info!("{}×{} surface, {} particles", cfg.width, cfg.height, field.len());

        AppState {
            tracker:  cfg.tracker(),
            intent:   cfg.intent,
            hand:     None,
            control,
            panel,
            segments: Vec::with_capacity(field.len()),
            field,
            stats:    StepStats::default(),
            status:   "Ready".to_string(),
        }
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: HandFrame) {
        self.tracker.observe(frame);
    }

    /// Follow the drawing surface size.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.field.size() != (width, height) {
            self.field.resize(width, height);
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// `now` is the monotonic time shared with the gesture source, `dt` the
    /// wall time since the previous tick in seconds.
    pub fn tick(&mut self, now: Duration, dt: f32) {
        self.hand = self.tracker.current(now);
        self.control.set_target(self.intent.target_speed(self.hand.as_ref()));

        for event in self.control.drain_events() {
            self.panel.handle(event);
        }
        self.panel.tick(dt);

        let speed = self.control.speed();
        self.segments.clear();
        self.stats = self.field.step(dt, speed, self.hand, &mut self.segments);

        let hand = match self.hand {
            Some(h) if self.stats.gathering => format!("FIST {:3.0}%", h.force * 100.0),
            Some(h)                         => format!("HAND {:3.0}%", h.force * 100.0),
            None                            => "NO HAND".to_string(),
        };
        self.status = format!(
            "{:<8} SPEED {:+.2}  {}  {} DROPS",
            self.control.state().as_str(), speed, hand, self.field.len(),
        );
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn segments(&self) -> &[DrawSegment]    { &self.segments }
    pub fn stats(&self)    -> StepStats         { self.stats }
    pub fn hand(&self)     -> Option<HandSample> { self.hand }
    pub fn panel(&self)    -> &CommentaryPanel  { &self.panel }
    pub fn field(&self)    -> &ParticleField    { &self.field }
    pub fn speed(&self)    -> f32               { self.control.speed() }

    /// The fist attractor in surface pixels, while gathering.
    pub fn attractor(&self) -> Option<Attractor> {
        let hand = self.hand.filter(|_| self.stats.gathering)?;
        let (w, h) = self.field.size();
        Some(Attractor {
            x:           hand.x * w,
            y:           hand.y * h,
            kill_radius: VortexParams::for_force(hand.force, h / 1000.0).kill_radius,
            force:       hand.force,
        })
    }

    pub fn overlay(&self) -> Overlay<'_> {
        Overlay {
            attractor:          self.attractor(),
            commentary:         self.panel.text(),
            commentary_opacity: self.panel.opacity(),
            status:             &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, starts the gesture source and the control worker, and
/// drives the frame loop until the window closes.
pub fn run(cfg: AppConfig, feed: LandmarkFeed) -> Result<(), AppError> {
    let epoch = Instant::now();

    // ── Gesture source ────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let gesture_rx = match feed {
        LandmarkFeed::Simulated => spawn_gesture_source(SimGestureSource {
            rx:       sim_rx,
            epoch,
            interval: cfg.detector_interval(),
        }),
        LandmarkFeed::Stdin => spawn_gesture_source(JsonLinesSource {
            reader: BufReader::new(io::stdin()),
            epoch,
        }),
    };

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(cfg.width, cfg.height, sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg, Box::new(CannedCommentator::default()));

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut feed_open = true;
    let mut last = Instant::now();
    while vis.is_open() {
        // 1. Poll window input → SimInput
        if !vis.poll_input() { break; }

        // 2. Drain detector frames
        while feed_open {
            match gesture_rx.try_recv() {
                Ok(frame)                       => app.handle_frame(frame),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("gesture source stopped; continuing without a hand");
                    feed_open = false;
                }
            }
        }

        // 3. Follow the window size
        let (w, h) = vis.sync_size();
        app.resize(w as f32, h as f32);

        // 4. Per-frame logic
        let now = Instant::now();
        let dt  = now.duration_since(last).as_secs_f32();
        last = now;
        app.tick(epoch.elapsed(), dt);

        // 5. Render
        let overlay = app.overlay();
        vis.render(app.segments(), &overlay)?;
    }

    log::info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
