//! rain_headless — runs a scripted gesture scenario through the full
//! pipeline without a window and logs what the field does.
//!
//! ```text
//! rain_headless [--seconds N] [--seed N] [--width W] [--height H]
//! ```
//!
//! Scenario (repeats every 16 s):
//!
//! | t (s) | hand |
//! |---|---|
//! | 0–3   | none (idle fall) |
//! | 3–6   | open, top of frame (rewind) |
//! | 6–9   | open, centre (hold) |
//! | 9–13  | fist, centre (gather) |
//! | 13–16 | lost |

use std::time::Duration;

use grip_signal::{HandFrame, HandLandmarks, HandTracker, IntentMapper};
use rain_control::ControlConfig;
use rain_field::{CountingSink, FieldConfig, ParticleField, StepStats};

const FPS: u32 = 60;

struct Options {
    seconds: u32,
    seed:    u64,
    width:   f32,
    height:  f32,
}

fn parse_args() -> Options {
    let mut opts = Options { seconds: 16, seed: 1, width: 1000.0, height: 1000.0 };
    let args: Vec<String> = std::env::args().skip(1).collect();
    for pair in args.chunks(2) {
        let value = pair.get(1).map(String::as_str).unwrap_or("");
        match pair[0].as_str() {
            "--seconds" => opts.seconds = value.parse().unwrap_or(opts.seconds),
            "--seed"    => opts.seed    = value.parse().unwrap_or(opts.seed),
            "--width"   => opts.width   = value.parse().unwrap_or(opts.width),
            "--height"  => opts.height  = value.parse().unwrap_or(opts.height),
            other       => log::warn!("ignoring unknown argument {}", other),
        }
    }
    opts
}

/// Detector output for scenario time `t`.
fn scripted_hand(t: f32) -> Option<HandLandmarks> {
    match t % 16.0 {
        t if t < 3.0  => None,
        t if t < 6.0  => Some(HandLandmarks::synthetic(0.5, 0.05, 0.08, 0.0)),
        t if t < 9.0  => Some(HandLandmarks::synthetic(0.5, 0.5, 0.08, 0.0)),
        t if t < 13.0 => Some(HandLandmarks::synthetic(0.5, 0.5, 0.08, 1.0)),
        _             => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = parse_args();

    let control      = ControlConfig::default();
    let mut smoother = control.smoother();
    let mut machine  = control.state_machine();
    let intent       = IntentMapper::default();
    let mut tracker  = HandTracker::default();
    let mut field    = ParticleField::with_size(
        FieldConfig::default(), opts.width, opts.height, Some(opts.seed),
    );

    log::info!(
        "headless run: {}×{} px, {} particles, {} s",
        opts.width, opts.height, field.len(), opts.seconds
    );

    let dt = 1.0 / FPS as f32;
    let mut window = StepStats::default();
    for frame in 0..opts.seconds * FPS {
        let now = Duration::from_secs_f64(frame as f64 / FPS as f64);
        let t   = now.as_secs_f32();

        // Detector runs at half the render rate.
        if frame % 2 == 0 {
            tracker.observe(HandFrame { timestamp: now, landmarks: scripted_hand(t) });
        }
        let hand = tracker.current(now);

        // Both ticks share one thread here; the window app runs the
        // smoother on its own worker.
        let speed = smoother.tick(intent.target_speed(hand.as_ref()));
        if machine.update(speed, now) {
            log::info!("{:6.2}s  state → {}", t, machine.state().as_str());
        }
        while let Some(event) = machine.poll(now) {
            log::info!("{:6.2}s  commentary {:?}", t, event);
        }

        let stats = field.step(dt, speed, hand, &mut CountingSink::default());
        window.drawn    += stats.drawn;
        window.consumed += stats.consumed;
        window.recycled += stats.recycled;

        if (frame + 1) % FPS == 0 {
            log::info!(
                "{:6.2}s  speed {:+.3}  force {:.2}  drawn {:6}  consumed {:5}  recycled {:5}",
                t,
                speed,
                hand.map_or(0.0, |h| h.force),
                window.drawn,
                window.consumed,
                window.recycled,
            );
            window = StepStats::default();
        }
    }

    field.clear();
    log::info!("done");
}
