//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            commentary line (fades on state change)       │
//! │   ╎  ╎    ╎      ╎   ╎     ╎    ╎   ╎      ╎   ╎         │
//! │     ╎   ╎    ╎  ╲ │ ╱  ╎      ╎        ╎     ╎           │
//! │  ╎      ╎      ─  ◎  ─    ╎       ╎  ╎          ╎        │
//! │    ╎  ╎     ╎   ╱ │ ╲     ╎   ╎         ╎    ╎           │
//! │ status bar                                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The window is resizable; the frame buffer follows the window size and the
//! particle field is resized to match.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use rain_field::DrawSegment;

use crate::error::AppError;
use crate::gesture::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Palette / layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const DEFAULT_W:  usize = 1280;
pub const DEFAULT_H:  usize = 720;
const STATUS_H:       usize = 18;
const BG_COLOR:       u32   = 0xFF04060C;
const STATUS_BG:      u32   = 0xFF0B1020;
const STATUS_FG:      Rgb   = (0.80, 0.82, 0.88);
const LEGEND_FG:      Rgb   = (0.45, 0.47, 0.52);
const RAIN_DIM:       Rgb   = (0.35, 0.45, 0.60);
const RAIN_BRIGHT:    Rgb   = (0.80, 0.90, 1.00);
const RING_COLOR:     Rgb   = (1.00, 0.84, 0.45);
const TEXT_COLOR:     Rgb   = (0.92, 0.94, 1.00);
/// Brightness left at the tail end of a trail.
const TAIL_FADE:      f32   = 0.25;

/// Linear RGB in `[0, 1]`.
type Rgb = (f32, f32, f32);

// ════════════════════════════════════════════════════════════════════════════
// Overlay — everything drawn on top of the rain
// ════════════════════════════════════════════════════════════════════════════

/// The fist attractor, in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attractor {
    pub x:           f32,
    pub y:           f32,
    /// Consumption radius at the current force.
    pub kill_radius: f32,
    /// Grip force, used for ring brightness.
    pub force:       f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    pub attractor:          Option<Attractor>,
    pub commentary:         &'a str,
    pub commentary_opacity: f32,
    pub status:             &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    width:      usize,
    height:     usize,
    sim_tx:     Sender<SimInput>,
    grip_held:  bool,
    pointer_in: bool,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Gesture Rain",
            width, height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;

        window.set_target_fps(60);

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            sim_tx,
            grip_held:  false,
            pointer_in: false,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Follow the window size; returns the current surface size.
    pub fn sync_size(&mut self) -> (usize, usize) {
        let (w, h) = self.window.get_size();
        if (w, h) != (self.width, self.height) {
            log::debug!("window resized to {}×{}", w, h);
            self.width  = w;
            self.height = h;
            self.buf.resize(w * h, BG_COLOR);
        }
        (w, h)
    }

    /// Poll pointer and keyboard and translate them into `SimInput` events.
    /// Returns false when the app should quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_pressed(Key::Q, KeyRepeat::No)
        {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }

        match self.window.get_mouse_pos(MouseMode::Discard) {
            Some((x, y)) => {
                let w = self.width.max(1) as f32;
                let h = self.height.max(1) as f32;
                let _ = self.sim_tx.send(SimInput::Pointer { x: x / w, y: y / h });
                self.pointer_in = true;
            }
            None if self.pointer_in => {
                let _ = self.sim_tx.send(SimInput::PointerLost);
                self.pointer_in = false;
            }
            None => {}
        }

        // Mouse button or Space closes the fist.
        let held = self.window.get_mouse_down(MouseButton::Left)
                || self.window.is_key_down(Key::Space);
        if held != self.grip_held {
            let _ = self.sim_tx.send(SimInput::Grip(held));
            self.grip_held = held;
        }

        if self.window.is_key_pressed(Key::H, KeyRepeat::No) {
            let _ = self.sim_tx.send(SimInput::ToggleHand);
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, segments: &[DrawSegment], overlay: &Overlay) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            // Minimised; keep the event pump alive.
            self.window.update();
            return Ok(());
        }

        self.buf.fill(BG_COLOR);

        // ── Rain ──────────────────────────────────────────────────────────
        for seg in segments {
            self.draw_segment(seg);
        }

        // ── Attractor ─────────────────────────────────────────────────────
        if let Some(a) = overlay.attractor {
            self.draw_ring(a.x, a.y, a.kill_radius, RING_COLOR, 0.25 + 0.5 * a.force);
            self.draw_ring(a.x, a.y, a.kill_radius * 2.0, RING_COLOR, 0.1 * a.force);
        }

        // ── Commentary ────────────────────────────────────────────────────
        if overlay.commentary_opacity > 0.0 {
            let scale = if self.width >= 900 { 3 } else { 2 };
            let y = self.height / 8;
            self.draw_label_centred(overlay.commentary, y, scale, TEXT_COLOR, overlay.commentary_opacity);
        }

        // ── Status bar ────────────────────────────────────────────────────
        let bar_y = self.height.saturating_sub(STATUS_H);
        self.fill_rect(0, bar_y, self.width, STATUS_H, STATUS_BG);
        self.draw_label(overlay.status, 8, bar_y + 4, 2, STATUS_FG, 1.0);
        let legend = "MOVE=HAND  CLICK/SPACE=FIST  H=HIDE HAND  Q=QUIT";
        let lx = self.width.saturating_sub(text_width(legend, 1) + 8);
        self.draw_label(legend, lx, bar_y + 6, 1, LEGEND_FG, 1.0);

        self.window.update_with_buffer(&self.buf, self.width, self.height)?;
        Ok(())
    }

    // ── Rain segments ─────────────────────────────────────────────────────

    /// DDA line from head to tail with additive blending, fading toward the
    /// tail.  Wide segments are thickened across the minor axis.
    fn draw_segment(&mut self, seg: &DrawSegment) {
        let (x0, y0) = (seg.start.x, seg.start.y);
        let (dx, dy) = (seg.end.x - x0, seg.end.y - y0);
        let steps    = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let rgb      = lerp_rgb(RAIN_DIM, RAIN_BRIGHT, seg.intensity);
        let half     = ((seg.width - 1.0) * 0.5).round().max(0.0) as isize;
        let steep    = dy.abs() > dx.abs();

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let a = seg.opacity * (1.0 - (1.0 - TAIL_FADE) * t);
            let px = (x0 + dx * t).round() as isize;
            let py = (y0 + dy * t).round() as isize;
            for off in -half..=half {
                let (ox, oy) = if steep { (off, 0) } else { (0, off) };
                self.add_pixel(px + ox, py + oy, rgb, a);
            }
        }
    }

    fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, rgb: Rgb, alpha: f32) {
        if r.is_nan() || r <= 0.5 { return; }
        let n = (std::f32::consts::TAU * r).ceil() as usize;
        for i in 0..n {
            let th = i as f32 / n as f32 * std::f32::consts::TAU;
            let x = (cx + r * th.cos()).round() as isize;
            let y = (cy + r * th.sin()).round() as isize;
            self.add_pixel(x, y, rgb, alpha);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn add_pixel(&mut self, x: isize, y: isize, rgb: Rgb, alpha: f32) {
        if x < 0 || y < 0 { return; }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            let i = y * self.width + x;
            self.buf[i] = add_rgb(self.buf[i], rgb, alpha);
        }
    }

    fn draw_label_centred(&mut self, text: &str, y: usize, scale: usize, rgb: Rgb, alpha: f32) {
        let x = self.width.saturating_sub(text_width(text, scale)) / 2;
        self.draw_label(text, x, y, scale, rgb, alpha);
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, rgb: Rgb, alpha: f32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 3 * scale > self.width { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.add_pixel(
                                (cx + col * scale + sx) as isize,
                                (y + row * scale + sy) as isize,
                                rgb, alpha,
                            );
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn text_width(text: &str, scale: usize) -> usize {
    (text.chars().count() * 4).saturating_sub(1) * scale
}

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Colour helpers
// ────────────────────────────────────────────────────────────────────────────

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, a.2 + (b.2 - a.2) * t)
}

/// Additive blend of `rgb × alpha` onto an ARGB pixel, saturating per channel.
fn add_rgb(dst: u32, rgb: Rgb, alpha: f32) -> u32 {
    let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    let add = |shift: u32, c: f32| {
        let cur = (dst >> shift) & 0xFF;
        (cur + (c * a * 255.0) as u32).min(0xFF) << shift
    };
    0xFF000000 | add(16, rgb.0) | add(8, rgb.1) | add(0, rgb.2)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_blend_saturates() {
        let px = add_rgb(0xFF_F0_10_00, (1.0, 1.0, 1.0), 0.5);
        assert_eq!(px, 0xFF_FF_8F_7F);
    }

    #[test]
    fn additive_blend_ignores_bad_alpha() {
        assert_eq!(add_rgb(BG_COLOR, (1.0, 1.0, 1.0), f32::NAN), BG_COLOR);
        assert_eq!(add_rgb(BG_COLOR, (1.0, 1.0, 1.0), 0.0), BG_COLOR);
    }

    #[test]
    fn text_width_counts_gaps() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), 3);
        assert_eq!(text_width("AB", 2), 14);
    }

    #[test]
    fn commentary_characters_have_glyphs() {
        let fallback = char_glyph('\u{1}');
        for line in ["Unfalling.", "Let it come down!", "Where's the rain?"] {
            for ch in line.chars().filter(|c| *c != ' ') {
                assert_ne!(char_glyph(ch), fallback, "missing glyph for {:?}", ch);
            }
        }
    }
}
