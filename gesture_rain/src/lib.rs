//! # gesture_rain
//!
//! Interactive front-end for the rain field: a window full of falling drops
//! that answers to one hand.
//!
//! ## Gesture → Effect mapping
//!
//! | Gesture | Effect |
//! |---|---|
//! | No hand | Gentle idle fall |
//! | Open hand near the bottom | Rain falls faster |
//! | Open hand at mid height | Rain slows to a standstill |
//! | Open hand near the top | Rain runs backwards (rises) |
//! | Closing fist | Drops spiral into the fist and are swallowed |
//!
//! Speed changes are eased by a control worker on its own thread.  When the
//! rain settles into a new state (falling / paused / rising), the commentary
//! line crossfades to a new one.
//!
//! ## Landmark feeds
//!
//! * (default) **Simulation**: the mouse pointer is the palm centre, and
//!   holding the button (or Space) closes the fist.
//! * `--stdin-landmarks` **External detector**: newline-delimited JSON frames
//!   of 21 landmarks on stdin (see [`gesture::WireFrame`]).
//!
//! ### Simulation controls
//!
//! | Input | Gesture |
//! |---|---|
//! | Move mouse | Move hand |
//! | Left button / `Space` (hold) | Close fist |
//! | `H` | Hide / show hand |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod gesture;
pub mod commentary;
pub mod visualizer;
pub mod app;

pub use error::AppError;
pub use app::{run, AppConfig, AppState, LandmarkFeed};
