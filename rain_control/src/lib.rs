//! # rain_control
//!
//! The control layer between the noisy gesture signal and the rain field.
//!
//! * [`SpeedSmoother`] low-pass filters the target speed into the live
//!   `speed_multiplier` (exponential, never overshoots).
//! * [`RainStateMachine`] classifies the smoothed speed into
//!   Falling / Paused / Rising immediately, and emits debounced
//!   [`CommentaryEvent`]s so commentary text does not flicker on every
//!   threshold wobble.
//! * [`ControlLoop`] runs both on their own periodic worker thread and
//!   publishes the results through lock-free [`SharedScalar`] /
//!   [`SharedRainState`] cells.

pub mod smoother;
pub mod state;
pub mod shared;
pub mod control;

pub use smoother::SpeedSmoother;
pub use state::{RainState, RainStateMachine, CommentaryEvent};
pub use shared::{SharedScalar, SharedRainState};
pub use control::{ControlConfig, ControlLoop, ControlHandle};
