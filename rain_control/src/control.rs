//! The periodic control worker.
//!
//! Runs the speed smoother and the state machine on their own thread at the
//! display refresh cadence, independent of the render loop.  The target
//! speed comes in over a command channel; the smoothed speed and the rain
//! state go out through published atomics, and commentary events through a
//! second channel.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::shared::{SharedRainState, SharedScalar};
use crate::smoother::SpeedSmoother;
use crate::state::{CommentaryEvent, RainState, RainStateMachine};

// ════════════════════════════════════════════════════════════════════════════
// ControlConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tunables for the control layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Speed the smoother starts from.
    pub initial_speed:     f32,
    /// Fraction of the remaining gap closed per tick.
    pub smoothing:         f32,
    /// |speed| at or below this counts as Paused.
    pub state_threshold:   f32,
    /// Quiet period before a commentary notification fires.
    pub debounce_ms:       u64,
    /// Delay between hiding old text and requesting new text.
    pub crossfade_ms:      u64,
    /// Worker tick rate.
    pub tick_hz:           u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            initial_speed:   0.0,
            smoothing:       0.08,
            state_threshold: 0.02,
            debounce_ms:     1500,
            crossfade_ms:    300,
            tick_hz:         60,
        }
    }
}

impl ControlConfig {
    pub fn smoother(&self) -> SpeedSmoother {
        SpeedSmoother::new(self.initial_speed, self.smoothing)
    }

    pub fn state_machine(&self) -> RainStateMachine {
        RainStateMachine::new(
            self.initial_speed,
            self.state_threshold,
            Duration::from_millis(self.debounce_ms),
            Duration::from_millis(self.crossfade_ms),
        )
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlCommand
// ════════════════════════════════════════════════════════════════════════════

pub enum ControlCommand {
    /// New target speed from the intent mapper.
    SetTarget(f32),
    /// Terminate the worker.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlLoop / ControlHandle
// ════════════════════════════════════════════════════════════════════════════

/// Spawner for the control worker.
pub struct ControlLoop;

impl ControlLoop {
    /// Spawn the worker thread and return its handle.
    pub fn spawn(cfg: ControlConfig) -> ControlHandle {
        let (cmd_tx, cmd_rx)     = mpsc::channel::<ControlCommand>();
        let (event_tx, event_rx) = mpsc::channel::<CommentaryEvent>();

        let smoother = cfg.smoother();
        let machine  = cfg.state_machine();
        let speed    = SharedScalar::new(smoother.speed());
        let state    = SharedRainState::new(machine.state());

        let worker = ControlWorker {
            smoother,
            machine,
            target:   cfg.initial_speed,
            speed:    speed.clone(),
            state:    state.clone(),
            interval: cfg.tick_interval(),
        };
        let join = thread::spawn(move || worker.run(cmd_rx, event_tx));

        log::info!("control loop started at {} Hz", cfg.tick_hz);
        ControlHandle { cmd_tx, event_rx, speed, state, join: Some(join) }
    }
}

/// Handle to the control worker.  Dropping it stops and joins the thread.
pub struct ControlHandle {
    cmd_tx:   Sender<ControlCommand>,
    event_rx: Receiver<CommentaryEvent>,
    speed:    SharedScalar,
    state:    SharedRainState,
    join:     Option<JoinHandle<()>>,
}

impl ControlHandle {
    pub fn set_target(&self, target: f32) {
        let _ = self.cmd_tx.send(ControlCommand::SetTarget(target));
    }

    /// Latest published `speed_multiplier`.
    pub fn speed(&self) -> f32 { self.speed.load() }

    /// Latest published rain state.
    pub fn state(&self) -> RainState { self.state.load() }

    /// A reader for the published speed, for consumers on other threads.
    pub fn speed_reader(&self) -> SharedScalar { self.speed.clone() }

    /// Drain any pending commentary events (non-blocking).
    pub fn drain_events(&self) -> Vec<CommentaryEvent> {
        let mut out = Vec::new();
        while let Ok(e) = self.event_rx.try_recv() { out.push(e); }
        out
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.cmd_tx.send(ControlCommand::Quit);
            if join.join().is_err() {
                log::warn!("control worker panicked");
            }
            log::info!("control loop stopped");
        }
    }
}

impl Drop for ControlHandle {
    fn drop(&mut self) { self.shutdown(); }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlWorker — the actual loop
// ════════════════════════════════════════════════════════════════════════════

struct ControlWorker {
    smoother: SpeedSmoother,
    machine:  RainStateMachine,
    target:   f32,
    speed:    SharedScalar,
    state:    SharedRainState,
    interval: Duration,
}

impl ControlWorker {
    fn run(mut self, cmd_rx: Receiver<ControlCommand>, event_tx: Sender<CommentaryEvent>) {
        let start = Instant::now();
        loop {
            // ── drain commands ────────────────────────────────────────────
            loop {
                match cmd_rx.try_recv() {
                    Ok(ControlCommand::SetTarget(t)) => self.target = t,
                    Ok(ControlCommand::Quit)         => return,
                    Err(TryRecvError::Empty)         => break,
                    Err(TryRecvError::Disconnected)  => return,
                }
            }

            // ── smooth + classify ─────────────────────────────────────────
            let now   = start.elapsed();
            let speed = self.smoother.tick(self.target);
            self.speed.store(speed);

            if self.machine.update(speed, now) {
                log::debug!("rain state → {} (speed {:.3})", self.machine.state().as_str(), speed);
            }
            self.state.store(self.machine.state());

            while let Some(event) = self.machine.poll(now) {
                log::info!("commentary {:?}", event);
                if event_tx.send(event).is_err() { return; }
            }

            thread::sleep(self.interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
