//! # grip_signal
//!
//! Turns raw 21-point hand-landmark geometry into the two signals the rain
//! field is driven by:
//!
//! * a scalar **grip force** in `[0, 1]` (0 = open palm, 1 = closed fist),
//! * a normalised **palm position** on screen.
//!
//! It also maps a hand sample (or its absence) to the **target fall speed**
//! the control layer smooths toward, and keeps track of how fresh the last
//! detector result is.
//!
//! ## Quick start
//!
//! ```rust
//! use grip_signal::{HandLandmarks, HandSample, IntentMapper, estimate_grip_force};
//!
//! let points = [[0.5_f32, 0.5, 0.0]; 21];
//! let hand = HandLandmarks::from_points(&points).unwrap();
//!
//! // Every point coincides: degenerate palm, reported as an open hand.
//! assert_eq!(estimate_grip_force(&hand), 0.0);
//!
//! let sample = HandSample::from_landmarks(&hand, false);
//! let target = IntentMapper::default().target_speed(Some(&sample));
//! assert!(target.abs() < 1e-6);
//! ```

pub mod landmarks;
pub mod force;
pub mod intent;
pub mod tracker;

pub use landmarks::{Landmark, HandLandmarks, LandmarkError, LANDMARK_COUNT};
pub use force::{estimate_grip_force, GripProfile};
pub use intent::IntentMapper;
pub use tracker::{HandFrame, HandSample, HandTracker};
