//! Draw commands emitted by the simulation.
//!
//! The field does not rasterise anything itself.  Every particle produces one
//! [`DrawSegment`] per frame, handed to a [`DrawSink`]; how it reaches the
//! screen is up to the sink.

use glam::Vec2;

/// One stroked line in surface pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawSegment {
    /// Head of the drop (its current position).
    pub start:     Vec2,
    /// End of the trail, behind the head.
    pub end:       Vec2,
    pub width:     f32,
    /// In `[0, 1]`.
    pub opacity:   f32,
    /// Colour intensity in `[0, 1]`; brighter near the viewer and the attractor.
    pub intensity: f32,
}

impl DrawSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Receiver of per-frame draw commands.
pub trait DrawSink {
    fn line(&mut self, segment: DrawSegment);
}

impl DrawSink for Vec<DrawSegment> {
    fn line(&mut self, segment: DrawSegment) {
        self.push(segment);
    }
}

/// Sink that only counts; used when nothing is rendered.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub lines: usize,
}

impl DrawSink for CountingSink {
    fn line(&mut self, _segment: DrawSegment) {
        self.lines += 1;
    }
}
