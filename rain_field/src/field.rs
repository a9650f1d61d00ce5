//! The particle field: population management and the per-frame step.
//!
//! # Per-frame step
//!
//! For every particle, in order:
//!
//! 1. Relax vertical velocity toward the gravity target
//!    (`height × gravity × base_speed_ratio × depth_factor × speed_multiplier`).
//!    While gathering the relaxation runs at 2 % so the vortex wins.
//! 2. Gathering only: consume the particle if it is inside the kill radius
//!    (respawn past a random edge, aimed back at the hand, skip the rest),
//!    otherwise steer with a radial/tangential blend, apply drag and clamp
//!    the speed.
//! 3. Not gathering: horizontal drag.
//! 4. Integrate position.
//! 5. Not gathering: wrap horizontally, recycle drops that leave through the
//!    top or bottom in their direction of travel.
//! 6. Emit one trail segment.
//!
//! The radial share of the steering blend grows as the particle closes in on
//! the hand.  A constant blend would settle particles into a stable orbit
//! ("donut") at a force-dependent radius; tightening the spiral guarantees
//! they reach the kill radius.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grip_signal::HandSample;

use crate::config::{sample_range, FieldConfig, VortexParams};
use crate::draw::{DrawSegment, DrawSink};
use crate::particle::Particle;

/// Reference frame duration all rate constants are expressed against.
const REFERENCE_FRAME: f32 = 1.0 / 60.0;

// ════════════════════════════════════════════════════════════════════════════
// StepStats
// ════════════════════════════════════════════════════════════════════════════

/// What happened during one [`ParticleField::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Segments emitted.
    pub drawn:     usize,
    /// Particles swallowed by the attractor and respawned at an edge.
    pub consumed:  usize,
    /// Particles that left through the top/bottom and re-entered opposite.
    pub recycled:  usize,
    /// The vortex was active this step.
    pub gathering: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Frame — scalars shared by every particle this step
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
struct Frame {
    width:        f32,
    height:       f32,
    time_scale:   f32,
    screen_scale: f32,
    speed:        f32,
    /// Vertical relaxation factor for this step.
    relax:        f32,
    /// Hand position in pixels, when a hand is present.
    attractor:    Option<Vec2>,
    force:        f32,
    gathering:    bool,
    vortex:       VortexParams,
}

impl Frame {
    fn new(cfg: &FieldConfig, width: f32, height: f32, dt: f32, speed: f32, hand: Option<HandSample>) -> Self {
        let dt = if dt.is_finite() { dt.clamp(0.0, cfg.max_delta) } else { 0.0 };
        let time_scale   = dt / REFERENCE_FRAME;
        let screen_scale = height / 1000.0;

        let force = hand
            .map(|h| if h.force.is_finite() { h.force.clamp(0.0, 1.0) } else { 0.0 })
            .unwrap_or(0.0);
        let attractor = hand.map(|h| {
            let x = if h.x.is_finite() { h.x } else { 0.5 };
            let y = if h.y.is_finite() { h.y } else { 0.5 };
            Vec2::new(x * width, y * height)
        });
        let gathering = attractor.is_some() && force > cfg.gathering_threshold;

        let mut relax = 1.0 - cfg.gravity_relax.powf(time_scale);
        if gathering {
            relax *= cfg.gathering_relax;
        }

        Frame {
            width,
            height,
            time_scale,
            screen_scale,
            speed: if speed.is_finite() { speed } else { 0.0 },
            relax,
            attractor,
            force,
            gathering,
            vortex: VortexParams::for_force(force, screen_scale),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// Owns the particle population for one drawing surface.
///
/// Particles are never freed during normal running: they are recycled in
/// place.  The population only grows or shrinks when the surface is resized.
pub struct ParticleField {
    cfg:       FieldConfig,
    rng:       StdRng,
    particles: Vec<Particle>,
    width:     f32,
    height:    f32,
}

impl ParticleField {
    /// An empty field; call [`resize`](Self::resize) to populate it.
    /// A `seed` makes the run reproducible.
    pub fn new(cfg: FieldConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None    => StdRng::from_entropy(),
        };
        ParticleField { cfg, rng, particles: Vec::new(), width: 0.0, height: 0.0 }
    }

    pub fn with_size(cfg: FieldConfig, width: f32, height: f32, seed: Option<u64>) -> Self {
        let mut field = ParticleField::new(cfg, seed);
        field.resize(width, height);
        field
    }

    pub fn config(&self)    -> &FieldConfig   { &self.cfg }
    pub fn particles(&self) -> &[Particle]    { &self.particles }
    pub fn particles_mut(&mut self) -> &mut [Particle] { &mut self.particles }
    pub fn len(&self)       -> usize          { self.particles.len() }
    pub fn is_empty(&self)  -> bool           { self.particles.is_empty() }
    pub fn size(&self)      -> (f32, f32)     { (self.width, self.height) }

    /// Match the population to a new surface size.  Existing particles keep
    /// their state; new ones are appended, surplus ones dropped from the tail.
    pub fn resize(&mut self, width: f32, height: f32) {
        let width  = if width.is_finite()  { width.max(0.0)  } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.width  = width;
        self.height = height;

        let target = self.cfg.population_for(width, height);
        let before = self.particles.len();
        if target > before {
            self.particles.reserve(target - before);
            for _ in before..target {
                let p = Particle::spawn(&mut self.rng, &self.cfg, width, height);
                self.particles.push(p);
            }
        } else {
            self.particles.truncate(target);
        }
        log::debug!("field resized to {}×{}: {} → {} particles", width, height, before, target);
    }

    /// Release the whole population (surface torn down).
    pub fn clear(&mut self) {
        self.particles.clear();
        self.particles.shrink_to_fit();
    }

    /// Advance every particle by `dt` seconds and emit its trail into `sink`.
    pub fn step<S: DrawSink + ?Sized>(
        &mut self,
        dt:               f32,
        speed_multiplier: f32,
        hand:             Option<HandSample>,
        sink:             &mut S,
    ) -> StepStats {
        let frame = Frame::new(&self.cfg, self.width, self.height, dt, speed_multiplier, hand);
        let mut stats = StepStats { gathering: frame.gathering, ..StepStats::default() };

        let ParticleField { cfg, rng, particles, .. } = self;
        for p in particles.iter_mut() {
            // 1. gravity
            let target_vy = p.gravity_target(cfg, frame.height, frame.speed);
            p.vel.y += (target_vy - p.vel.y) * frame.relax;

            match frame.attractor {
                // 2. vortex
                Some(centre) if frame.gathering => {
                    if steer(p, cfg, &frame, centre) == Steer::Consumed {
                        respawn_at_edge(p, rng, cfg, &frame, centre);
                        stats.consumed += 1;
                        continue;
                    }
                }
                // 3. rain drag
                _ => p.vel.x *= cfg.rain_drag.powf(frame.time_scale),
            }

            // 4. integrate
            p.pos += p.vel * frame.time_scale;

            // 5. edges
            if !frame.gathering && apply_edge_policy(p, rng, cfg, &frame) {
                stats.recycled += 1;
            }

            // 6. draw
            sink.line(trail_segment(p, cfg, &frame));
            stats.drawn += 1;
        }
        stats
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-particle stages
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Steer {
    Consumed,
    Steered,
}

/// Vortex steering toward `centre`.
fn steer(p: &mut Particle, cfg: &FieldConfig, frame: &Frame, centre: Vec2) -> Steer {
    let to_centre = centre - p.pos;
    let dist = to_centre.length();
    if dist < frame.vortex.kill_radius {
        return Steer::Consumed;
    }

    let radial     = to_centre / dist;
    let tangential = radial.perp();

    let influence = cfg.influence_radius * frame.screen_scale;
    let base = frame.vortex.base_inward_bias;
    let bias = if dist < influence {
        let proximity = 1.0 - dist / influence;
        base + (1.0 - base) * proximity * cfg.tighten
    } else {
        base
    };

    let pull = radial * bias + tangential * (1.0 - bias);
    p.vel += pull * frame.vortex.steer_strength * frame.time_scale;
    p.vel *= cfg.vortex_drag.powf(frame.time_scale);
    p.vel = p.vel.clamp_length_max(frame.vortex.max_speed);
    Steer::Steered
}

/// Put a consumed particle just past a random screen edge, heading back
/// toward the hand.
fn respawn_at_edge(p: &mut Particle, rng: &mut StdRng, cfg: &FieldConfig, frame: &Frame, centre: Vec2) {
    let (w, h) = (frame.width, frame.height);
    let margin = sample_range(rng, cfg.respawn_margin).max(f32::EPSILON);
    p.pos = match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen::<f32>() * w, -margin),
        1 => Vec2::new(w + margin, rng.gen::<f32>() * h),
        2 => Vec2::new(rng.gen::<f32>() * w, h + margin),
        _ => Vec2::new(-margin, rng.gen::<f32>() * h),
    };

    let heading = (centre - p.pos).try_normalize().unwrap_or(Vec2::Y);
    let jitter  = sample_range(rng, (-cfg.respawn_jitter, cfg.respawn_jitter));
    let speed   = sample_range(rng, cfg.respawn_speed) * frame.screen_scale;
    p.vel = Vec2::from_angle(jitter).rotate(heading) * speed;
    p.reroll_visuals(rng, cfg);
}

/// Horizontal wrap and top/bottom recycling.  Returns true when the particle
/// was recycled to the opposite edge, or brought back after stalling
/// off-screen.
fn apply_edge_policy(p: &mut Particle, rng: &mut StdRng, cfg: &FieldConfig, frame: &Frame) -> bool {
    let (w, h) = (frame.width, frame.height);
    if p.pos.x < 0.0 {
        p.pos.x = w;
    } else if p.pos.x > w {
        p.pos.x = 0.0;
    }

    let above = p.pos.y < 0.0;
    let below = p.pos.y > h;
    let target = p.gravity_target(cfg, h, frame.speed);

    let entry_y = if p.vel.y > 0.0 && below {
        0.0
    } else if p.vel.y < 0.0 && above {
        h
    } else if (above || below) && p.vel.y.abs() < cfg.stranded_speed * frame.screen_scale {
        // Left behind by the vortex with almost no fall speed: enter from
        // the edge the rain is currently coming from.
        if target > 0.0 {
            0.0
        } else if target < 0.0 {
            h
        } else {
            rng.gen::<f32>() * h
        }
    } else {
        return false;
    };

    p.pos = Vec2::new(rng.gen::<f32>() * w, entry_y);
    p.vel = Vec2::new(0.0, target);
    p.reroll_visuals(rng, cfg);
    true
}

/// The trail drawn behind a particle this frame.
fn trail_segment(p: &Particle, cfg: &FieldConfig, frame: &Frame) -> DrawSegment {
    let ss    = frame.screen_scale;
    let speed = p.vel.length();
    let dist  = frame.attractor.map_or(f32::INFINITY, |c| p.pos.distance(c));

    // Stretch near the hand, but keep trails short right at the centre so
    // the swarm does not turn into a hedgehog of equal spikes.
    let distortion = 1.0 + frame.force * 3.0 * (50.0 / dist.max(50.0));
    let mut max_trail = cfg.max_trail * ss;
    let shrink = cfg.trail_shrink_radius * ss;
    if frame.gathering && dist < shrink {
        max_trail *= dist / shrink;
    }

    let mut length = (speed * 1.5 * distortion).min(max_trail);
    if length.is_nan() || length < 2.0 {
        length = cfg.stub_length;
    }
    let heading = if speed > 1e-6 { p.vel / speed } else { Vec2::Y };

    let df = p.depth_factor();
    let glow = if frame.gathering {
        let influence = cfg.influence_radius * ss;
        (1.0 - dist / influence.max(f32::EPSILON)).max(0.0) * 0.4
    } else {
        0.0
    };
    let thinning = (speed / (40.0 * ss).max(f32::EPSILON)).min(1.0) * 0.3;

    DrawSegment {
        start:     p.pos,
        end:       p.pos - heading * length,
        width:     (p.size * (1.0 - thinning)).max(0.5),
        opacity:   (p.opacity * df).min(1.0),
        intensity: (0.55 + 0.45 * p.depth + glow).min(1.0),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
