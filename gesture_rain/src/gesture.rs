//! Hand-frame sources: the pointer simulator and a JSON-lines landmark feed.
//!
//! The public interface is a stream of [`HandFrame`]s delivered over an
//! `mpsc` channel from a source running on its own thread.  This mimics a
//! landmark detector whose inference runs out of step with rendering.
//! Consumers don't need to know where the frames came from.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use grip_signal::{HandFrame, HandLandmarks};

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — unified interface for simulated and external input
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a gesture source on its own thread and return the receiving end.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — pointer-driven synthetic hand
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer moved; normalised screen coordinates.
    Pointer { x: f32, y: f32 },
    /// Pointer left the window.
    PointerLost,
    /// Mouse button pressed (close fist) or released (open hand).
    Grip(bool),
    /// Show / hide the simulated hand.
    ToggleHand,
    Quit,
}

/// Palm size of the simulated hand, in normalised image units.
const SIM_PALM: f32 = 0.08;
/// Fraction of the remaining grip change applied per detector frame.
const SIM_GRIP_EASE: f32 = 0.25;

/// Turns window pointer input into 21-point hands, as a camera-facing
/// detector would report them (mirrored, since the front-end un-mirrors).
pub struct SimGestureSource {
    pub rx:       Receiver<SimInput>,
    /// Clock shared with the render loop; frame timestamps are offsets from it.
    pub epoch:    Instant,
    pub interval: Duration,
}

/// State of the simulated hand between detector frames.
#[derive(Clone, Copy, Debug)]
struct SimHand {
    pointer: Option<(f32, f32)>,
    visible: bool,
    closing: bool,
    grip:    f32,
}

impl SimHand {
    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pointer { x, y } => self.pointer = Some((x, y)),
            SimInput::PointerLost      => self.pointer = None,
            SimInput::Grip(closed)     => self.closing = closed,
            SimInput::ToggleHand       => self.visible = !self.visible,
            SimInput::Quit             => {}
        }
    }

    /// Ease the grip and pose the hand for one detector frame.
    fn pose(&mut self) -> Option<HandLandmarks> {
        let target = if self.closing { 1.0 } else { 0.0 };
        self.grip += (target - self.grip) * SIM_GRIP_EASE;
        match (self.visible, self.pointer) {
            (true, Some((x, y))) => Some(HandLandmarks::synthetic(1.0 - x, y, SIM_PALM, self.grip)),
            _ => None,
        }
    }
}

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let mut hand = SimHand { pointer: None, visible: true, closing: false, grip: 0.0 };
        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::Quit)              => return,
                    Ok(input)                       => hand.apply(input),
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            let frame = HandFrame { timestamp: self.epoch.elapsed(), landmarks: hand.pose() };
            if tx.send(frame).is_err() { return; }
            thread::sleep(self.interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — landmarks from an external detector process
// ════════════════════════════════════════════════════════════════════════════

/// One line of the landmark feed.
///
/// ```text
/// {"t_ms": 1234, "landmarks": [[x, y, z], … 21 points …]}
/// {"t_ms": 1268, "landmarks": null}
/// ```
#[derive(Debug, Deserialize)]
pub struct WireFrame {
    pub t_ms:      u64,
    pub landmarks: Option<Vec<[f32; 3]>>,
}

/// Reads newline-delimited JSON frames, e.g. piped from a camera/model
/// process.  Malformed lines are logged and skipped; frames whose detector
/// timestamp goes backwards are dropped.  Accepted frames are restamped
/// with arrival time on the shared `epoch` clock.
pub struct JsonLinesSource<R: BufRead + Send + 'static> {
    pub reader: R,
    pub epoch:  Instant,
}

/// Parse one feed line into a frame stamped `timestamp`.
pub fn parse_wire_line(line: &str, timestamp: Duration) -> Result<(u64, HandFrame), String> {
    let wire: WireFrame = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let landmarks = match wire.landmarks {
        Some(points) => Some(HandLandmarks::from_points(&points).map_err(|e| e.to_string())?),
        None => None,
    };
    Ok((wire.t_ms, HandFrame { timestamp, landmarks }))
}

impl<R: BufRead + Send + 'static> GestureSource for JsonLinesSource<R> {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let JsonLinesSource { reader, epoch } = *self;
        let mut last_t: Option<u64> = None;
        for (n, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    log::warn!("landmark feed closed: {}", e);
                    return;
                }
            };
            if line.trim().is_empty() { continue; }
            match parse_wire_line(&line, epoch.elapsed()) {
                Ok((t, _)) if last_t.is_some_and(|prev| t < prev) => {
                    log::warn!("line {}: timestamp {} ms went backwards; dropped", n + 1, t);
                }
                Ok((t, frame)) => {
                    last_t = Some(t);
                    if tx.send(frame).is_err() { return; }
                }
                Err(e) => log::warn!("line {}: rejected landmark frame: {}", n + 1, e),
            }
        }
        log::info!("landmark feed ended");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use grip_signal::{estimate_grip_force, HandSample};
    use std::io::Cursor;

    fn wire_hand(t_ms: u64) -> String {
        let pts: Vec<[f32; 3]> = HandLandmarks::synthetic(0.4, 0.6, 0.1, 0.0)
            .points()
            .iter()
            .map(|p| [p.x, p.y, p.z])
            .collect();
        format!(r#"{{"t_ms": {}, "landmarks": {}}}"#, t_ms, serde_json::to_string(&pts).unwrap())
    }

    #[test]
    fn sim_hand_follows_pointer_mirrored() {
        let mut h = SimHand { pointer: None, visible: true, closing: false, grip: 0.0 };
        h.apply(SimInput::Pointer { x: 0.2, y: 0.7 });
        let hand = h.pose().unwrap();
        let s = HandSample::from_landmarks(&hand, true);
        assert!((s.x - 0.2).abs() < 1e-5);
        assert!((s.y - 0.7).abs() < 1e-5);
    }

    #[test]
    fn sim_grip_eases_closed() {
        let mut h = SimHand { pointer: Some((0.5, 0.5)), visible: true, closing: false, grip: 0.0 };
        h.apply(SimInput::Grip(true));
        let mut last = 0.0;
        for _ in 0..30 {
            let f = estimate_grip_force(&h.pose().unwrap());
            assert!(f >= last);
            last = f;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn hidden_sim_hand_reports_nothing() {
        let mut h = SimHand { pointer: Some((0.5, 0.5)), visible: true, closing: false, grip: 0.0 };
        h.apply(SimInput::ToggleHand);
        assert!(h.pose().is_none());
        h.apply(SimInput::PointerLost);
        h.apply(SimInput::ToggleHand);
        assert!(h.pose().is_none());
    }

    #[test]
    fn sim_source_emits_frames_and_quits() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_gesture_source(SimGestureSource {
            rx: sim_rx,
            epoch: Instant::now(),
            interval: Duration::from_millis(1),
        });
        sim_tx.send(SimInput::Pointer { x: 0.5, y: 0.5 }).unwrap();
        let frame = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(frame.timestamp <= Duration::from_secs(2));
        sim_tx.send(SimInput::Quit).unwrap();
        // Source thread exits; the channel eventually disconnects.
        while rx.recv_timeout(Duration::from_secs(2)).is_ok() {}
    }

    #[test]
    fn parses_hand_and_empty_lines() {
        let (t, frame) = parse_wire_line(&wire_hand(40), Duration::ZERO).unwrap();
        assert_eq!(t, 40);
        assert!(frame.landmarks.is_some());

        let (_, empty) = parse_wire_line(r#"{"t_ms": 41, "landmarks": null}"#, Duration::ZERO).unwrap();
        assert!(empty.landmarks.is_none());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_wire_line("not json", Duration::ZERO).is_err());
        assert!(parse_wire_line(r#"{"t_ms": 1, "landmarks": [[0,0,0]]}"#, Duration::ZERO).is_err());
    }

    #[test]
    fn json_feed_skips_bad_and_backward_lines() {
        let feed = format!(
            "{}\ngarbage\n{}\n\n{}\n",
            wire_hand(100),
            wire_hand(50),
            r#"{"t_ms": 120, "landmarks": null}"#,
        );
        let rx = spawn_gesture_source(JsonLinesSource {
            reader: Cursor::new(feed.into_bytes()),
            epoch:  Instant::now(),
        });
        let frames: Vec<HandFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].landmarks.is_some());
        assert!(frames[1].landmarks.is_none());
    }
}
