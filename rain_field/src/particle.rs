//! A single raindrop.

use glam::Vec2;
use rand::Rng;

use crate::config::{sample_range, FieldConfig};

/// One particle.  Positions are surface pixels, velocities pixels per
/// 1/60 s reference frame.
///
/// `depth` and `base_speed_ratio` are fixed for the particle's lifetime;
/// `opacity` and `size` are re-rolled on every recycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos:              Vec2,
    pub vel:              Vec2,
    /// 0 = far, 1 = near.
    pub depth:            f32,
    /// In `[1.0, 1.8]`.
    pub base_speed_ratio: f32,
    pub opacity:          f32,
    pub size:             f32,
}

impl Particle {
    /// A fresh particle at a random position on a `width × height` surface.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, cfg: &FieldConfig, width: f32, height: f32) -> Self {
        let mut p = Particle {
            pos:              Vec2::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height),
            vel:              Vec2::ZERO,
            depth:            rng.gen::<f32>(),
            base_speed_ratio: rng.gen_range(1.0..=1.8),
            opacity:          0.0,
            size:             0.0,
        };
        p.reroll_visuals(rng, cfg);
        p
    }

    /// Parallax multiplier: near particles fall faster and look brighter.
    pub fn depth_factor(&self) -> f32 {
        self.depth * 0.5 + 0.5
    }

    /// Vertical speed the particle relaxes toward.
    pub fn gravity_target(&self, cfg: &FieldConfig, height: f32, speed_multiplier: f32) -> f32 {
        height * cfg.gravity * self.base_speed_ratio * self.depth_factor() * speed_multiplier
    }

    pub fn reroll_visuals<R: Rng + ?Sized>(&mut self, rng: &mut R, cfg: &FieldConfig) {
        self.opacity = sample_range(rng, cfg.opacity_range);
        self.size    = sample_range(rng, cfg.size_range);
    }
}
