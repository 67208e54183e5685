use crate::color::{background_at, Rgb};
use crate::particle::Particle;
use crate::settings::{Glow, SimulationSettings};
use crate::simulation::HeartSimulation;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Brightness of glow dots relative to the particle itself
const GLOW_DIM: f32 = 0.35;
/// Brightness of the newest trail dot relative to the particle
const TRAIL_DIM: f32 = 0.5;

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Dots per world unit along each axis for a canvas of the given cell size
pub fn world_scale(settings: &SimulationSettings, canvas_width: u16, canvas_height: u16) -> (f32, f32) {
    let dots_x = canvas_width as f32 * 2.0;
    let dots_y = canvas_height as f32 * 4.0;
    (dots_x / settings.width.max(1.0), dots_y / settings.height.max(1.0))
}

/// World coordinates under the center of a canvas cell
pub fn cell_to_world(
    settings: &SimulationSettings,
    canvas_width: u16,
    canvas_height: u16,
    col: u16,
    row: u16,
) -> (f32, f32) {
    let (sx, sy) = world_scale(settings, canvas_width.max(1), canvas_height.max(1));
    let dot_x = col as f32 * 2.0 + 1.0;
    let dot_y = row as f32 * 4.0 + 2.0;
    (dot_x / sx, dot_y / sy)
}

/// Background color for each canvas row
pub fn background_rows(settings: &SimulationSettings, canvas_height: u16) -> Vec<Color> {
    let rows = canvas_height.max(1) as f32;
    (0..canvas_height)
        .map(|row| background_at(settings.background, (row as f32 + 0.5) / rows).to_color())
        .collect()
}

/// Dot-resolution raster, brightest color wins per dot
struct DotBuffer {
    width: usize,
    height: usize,
    dots: Vec<Option<Rgb>>,
}

impl DotBuffer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![None; width * height],
        }
    }

    fn plot(&mut self, x: f32, y: f32, color: Rgb) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (ix, iy) = (x as usize, y as usize);
        if ix >= self.width || iy >= self.height {
            return;
        }
        let dot = &mut self.dots[iy * self.width + ix];
        *dot = match *dot {
            Some(existing) if brightness(existing) >= brightness(color) => Some(existing),
            _ => Some(color),
        };
    }

    /// Filled ellipse; anything under one dot becomes a single dot
    fn disc(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgb) {
        if rx < 0.5 && ry < 0.5 {
            self.plot(cx, cy, color);
            return;
        }
        let (rx, ry) = (rx.max(0.5), ry.max(0.5));
        let x0 = (cx - rx).floor() as i32;
        let x1 = (cx + rx).ceil() as i32;
        let y0 = (cy - ry).floor() as i32;
        let y1 = (cy + ry).ceil() as i32;
        for iy in y0..=y1 {
            for ix in x0..=x1 {
                let dx = (ix as f32 + 0.5 - cx) / rx;
                let dy = (iy as f32 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.plot(ix as f32, iy as f32, color);
                }
            }
        }
    }

    /// Ellipse outline, sampled densely enough to close at dot resolution
    fn ring(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgb) {
        if rx < 1.0 && ry < 1.0 {
            return;
        }
        let steps = ((rx.max(ry) * std::f32::consts::TAU).ceil() as usize).max(8);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            self.plot(cx + a.cos() * rx, cy + a.sin() * ry, color);
        }
    }
}

fn brightness(c: Rgb) -> u16 {
    c.r as u16 + c.g as u16 + c.b as u16
}

/// Render the simulation's particles to Braille characters
pub fn render_to_braille(
    simulation: &HeartSimulation,
    canvas_width: u16,
    canvas_height: u16,
    show_glow: bool,
) -> Vec<BrailleCell> {
    render_particles(
        simulation.particles(),
        &simulation.settings,
        canvas_width,
        canvas_height,
        show_glow,
    )
}

/// Rasterise particles (in draw order) onto a Braille canvas
pub fn render_particles<'a>(
    particles: impl Iterator<Item = &'a Particle>,
    settings: &SimulationSettings,
    canvas_width: u16,
    canvas_height: u16,
    show_glow: bool,
) -> Vec<BrailleCell> {
    // Braille effective resolution
    let braille_width = canvas_width as usize * 2;
    let braille_height = canvas_height as usize * 4;
    let (sx, sy) = world_scale(settings, canvas_width, canvas_height);

    let mut buffer = DotBuffer::new(braille_width, braille_height);

    for p in particles {
        let opacity = p.opacity();
        let (cx, cy) = (p.x * sx, p.y * sy);

        let trail = p.trail();
        let n = trail.len();
        for (i, &(tx, ty)) in trail.iter().enumerate() {
            let fade = (i + 1) as f32 / (n + 1) as f32;
            buffer.plot(tx * sx, ty * sy, p.color.scale(opacity * fade * TRAIL_DIM));
        }

        if show_glow {
            let glow_color = p.color.scale(opacity * GLOW_DIM);
            let r = p.glow_radius(settings.glow);
            match settings.glow {
                Glow::Halo { .. } => buffer.disc(cx, cy, r * sx, r * sy, glow_color),
                Glow::Rings => buffer.ring(cx, cy, r * sx, r * sy, glow_color),
            }
            if let Some(outer) = p.outer_glow_radius(settings.glow) {
                buffer.ring(cx, cy, outer * sx, outer * sy, glow_color.scale(0.6));
            }
        }

        buffer.disc(cx, cy, p.size * sx, p.size * sy, p.color.scale(opacity));
    }

    let mut cells = Vec::with_capacity((canvas_width as usize) * (canvas_height as usize));

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            let mut dot_count: u32 = 0;

            // Sample the 2x4 dots for this Braille character
            let base_bx = cx as usize * 2;
            let base_by = cy as usize * 4;

            for dx in 0..2 {
                for dy in 0..4 {
                    let idx = (base_by + dy) * braille_width + base_bx + dx;
                    if let Some(c) = buffer.dots[idx] {
                        pattern |= BRAILLE_DOTS[dx][dy];
                        r += c.r as u32;
                        g += c.g as u32;
                        b += c.b as u32;
                        dot_count += 1;
                    }
                }
            }

            // Only emit cells that have at least one dot
            if pattern != 0 {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                let color = Color::Rgb(
                    (r / dot_count) as u8,
                    (g / dot_count) as u8,
                    (b / dot_count) as u8,
                );

                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color,
                });
            }
        }
    }

    cells
}
