//! # rain_field
//!
//! Per-frame physics for a field of rain particles.  Each drop falls or
//! rises under a global `speed_multiplier`.  When the tracked hand closes
//! into a fist, the drops spiral into it and are swallowed.
//!
//! The field owns its particles and emits one [`DrawSegment`] per particle per
//! frame; rasterising them is left to whatever implements [`DrawSink`].
//!
//! ## Quick start
//!
//! ```rust
//! use rain_field::{FieldConfig, ParticleField};
//! use grip_signal::HandSample;
//!
//! let mut field = ParticleField::with_size(FieldConfig::default(), 1280.0, 720.0, Some(7));
//! assert_eq!(field.len(), 1280 * 720 / 800);
//!
//! let fist = HandSample { x: 0.5, y: 0.5, force: 0.9 };
//! let mut segments = Vec::new();
//! let stats = field.step(1.0 / 60.0, 0.5, Some(fist), &mut segments);
//! assert!(stats.gathering);
//! assert_eq!(stats.drawn + stats.consumed, field.len());
//! ```

pub mod config;
pub mod particle;
pub mod draw;
pub mod field;

pub use config::{FieldConfig, VortexParams};
pub use particle::Particle;
pub use draw::{DrawSegment, DrawSink, CountingSink};
pub use field::{ParticleField, StepStats};
