//! Simulation constants.
//!
//! Pixel-space values are expressed for a 1000 px tall surface and scaled by
//! `height / 1000` at run time.  Rate constants are per 1/60 s reference
//! frame and rescaled by the actual frame delta.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    // ── population ───────────────────────────────────────────────────────
    /// Surface area (px²) per particle.
    pub density_area:        f32,

    // ── timing ───────────────────────────────────────────────────────────
    /// Frame deltas above this (seconds) are clamped.
    pub max_delta:           f32,

    // ── gravity ──────────────────────────────────────────────────────────
    /// Fall speed as a fraction of surface height per reference frame.
    pub gravity:             f32,
    /// Per-reference-frame retention used for the vertical relaxation.
    pub gravity_relax:       f32,
    /// Relaxation multiplier while gathering.
    pub gathering_relax:     f32,
    /// Horizontal drag retention when not gathering.
    pub rain_drag:           f32,
    /// Off-screen particles slower than this (scaled px/frame) re-enter
    /// once the vortex lets go.
    pub stranded_speed:      f32,

    // ── vortex ───────────────────────────────────────────────────────────
    /// Grip force above which the vortex engages.
    pub gathering_threshold: f32,
    /// Radius (scaled px) inside which the spiral tightens.
    pub influence_radius:    f32,
    /// How far the bias is pulled toward pure suction at the centre.
    pub tighten:             f32,
    /// Velocity retention while gathering.
    pub vortex_drag:         f32,

    // ── respawn ──────────────────────────────────────────────────────────
    /// Outward offset range (px) beyond the edge for consumed particles.
    pub respawn_margin:      (f32, f32),
    /// ± angular jitter (rad) on the seeded inward heading.
    pub respawn_jitter:      f32,
    /// Initial speed range (scaled px per frame) for consumed particles.
    pub respawn_speed:       (f32, f32),

    // ── visuals ──────────────────────────────────────────────────────────
    pub opacity_range:       (f32, f32),
    pub size_range:          (f32, f32),
    /// Longest trail (scaled px).
    pub max_trail:           f32,
    /// Radius (scaled px) inside which trails are shortened.
    pub trail_shrink_radius: f32,
    /// Trail length (px) emitted for near-stationary particles.
    pub stub_length:         f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            density_area:        800.0,
            max_delta:           0.1,
            gravity:             0.015,
            gravity_relax:       0.9,
            gathering_relax:     0.02,
            rain_drag:           0.98,
            stranded_speed:      0.05,
            gathering_threshold: 0.05,
            influence_radius:    150.0,
            tighten:             0.7,
            vortex_drag:         0.92,
            respawn_margin:      (10.0, 60.0),
            respawn_jitter:      0.4,
            respawn_speed:       (2.0, 7.0),
            opacity_range:       (0.15, 0.6),
            size_range:          (0.8, 1.8),
            max_trail:           60.0,
            trail_shrink_radius: 60.0,
            stub_length:         2.0,
        }
    }
}

impl FieldConfig {
    /// Particle count for a surface: `floor(w × h / density_area)`.
    /// The area is taken in f64; f32 loses integer precision above 2^24 px².
    pub fn population_for(&self, width: f32, height: f32) -> usize {
        if width <= 0.0 || height <= 0.0 || self.density_area <= 0.0 {
            return 0;
        }
        (width as f64 * height as f64 / self.density_area as f64).floor() as usize
    }
}

/// Uniform sample from an `(a, b)` range given in either order.  A
/// non-finite bound collapses the range onto the other one (or 0).
pub(crate) fn sample_range<R: Rng + ?Sized>(rng: &mut R, (a, b): (f32, f32)) -> f32 {
    match (a.is_finite(), b.is_finite()) {
        (true, true)  => {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            rng.gen_range(lo..=hi)
        }
        (true, false) => a,
        (false, true) => b,
        _             => 0.0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Force-derived per-frame scalars
// ════════════════════════════════════════════════════════════════════════════

/// Steering parameters derived from grip force and screen scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VortexParams {
    pub base_inward_bias: f32,
    pub max_speed:        f32,
    pub kill_radius:      f32,
    pub steer_strength:   f32,
}

impl VortexParams {
    /// `steer_strength` is per reference frame; multiply by the time scale
    /// before applying.
    pub fn for_force(force: f32, screen_scale: f32) -> Self {
        VortexParams {
            base_inward_bias: 0.25 + force * 0.55,
            max_speed:        (3.0 + force * 70.0) * screen_scale,
            kill_radius:      (70.0 - force * 55.0) * screen_scale,
            steer_strength:   (0.5 + force * 2.0) * screen_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_floor() {
        let c = FieldConfig::default();
        assert_eq!(c.population_for(1000.0, 1000.0), 1250);
        assert_eq!(c.population_for(801.0, 1.0), 1);
        assert_eq!(c.population_for(799.0, 1.0), 0);
        assert_eq!(c.population_for(0.0, 500.0), 0);
    }

    #[test]
    fn population_exact_on_large_surfaces() {
        let c = FieldConfig::default();
        // 17_367_999 px², past the f32 integer range.
        assert_eq!(c.population_for(4103.0, 4233.0), 21709);
        assert_eq!(c.population_for(8000.0, 8000.0), 80_000);
    }

    #[test]
    fn sample_range_accepts_reversed_and_degenerate_ranges() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let v = sample_range(&mut rng, (0.6, 0.15));
            assert!((0.15..=0.6).contains(&v));
        }
        assert_eq!(sample_range(&mut rng, (1.0, 1.0)), 1.0);
        assert_eq!(sample_range(&mut rng, (f32::NAN, 2.0)), 2.0);
        assert_eq!(sample_range(&mut rng, (f32::NAN, f32::INFINITY)), 0.0);
    }

    #[test]
    fn fist_tightens_kill_zone() {
        let open = VortexParams::for_force(0.1, 1.0);
        let fist = VortexParams::for_force(1.0, 1.0);
        assert!(fist.kill_radius < open.kill_radius);
        assert!((fist.kill_radius - 15.0).abs() < 1e-4);
        assert!((fist.max_speed - 73.0).abs() < 1e-4);
        assert!((fist.base_inward_bias - 0.8).abs() < 1e-6);
    }
}
