//! Single-writer / multi-reader published values.
//!
//! The control worker writes, the render loop reads whatever was last
//! published.  Readers may lag a tick behind; nothing needs a lock.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use crate::state::RainState;

/// An `f32` published through the bit pattern of an `AtomicU32`.
#[derive(Clone, Debug)]
pub struct SharedScalar(Arc<AtomicU32>);

impl SharedScalar {
    pub fn new(v: f32) -> Self {
        SharedScalar(Arc::new(AtomicU32::new(v.to_bits())))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, v: f32) {
        self.0.store(v.to_bits(), Ordering::Release);
    }
}

/// The process-wide [`RainState`], published as a `u8`.
#[derive(Clone, Debug)]
pub struct SharedRainState(Arc<AtomicU8>);

impl SharedRainState {
    pub fn new(s: RainState) -> Self {
        SharedRainState(Arc::new(AtomicU8::new(s.to_u8())))
    }

    pub fn load(&self) -> RainState {
        RainState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, s: RainState) {
        self.0.store(s.to_u8(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn scalar_visible_across_clones() {
        let a = SharedScalar::new(0.5);
        let b = a.clone();
        a.store(-0.25);
        assert_eq!(b.load(), -0.25);
    }

    #[test]
    fn scalar_published_from_other_thread() {
        let s = SharedScalar::new(0.0);
        let writer = s.clone();
        thread::spawn(move || writer.store(0.75)).join().unwrap();
        assert_eq!(s.load(), 0.75);
    }

    #[test]
    fn state_round_trip() {
        let s = SharedRainState::new(RainState::Paused);
        s.store(RainState::Rising);
        assert_eq!(s.load(), RainState::Rising);
    }
}
