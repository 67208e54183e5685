//! Headless rendering of the particle field to PNG snapshots and GIF recordings.

use crate::color::{background_at, Rgb};
use crate::error::Result;
use crate::settings::Glow;
use crate::simulation::HeartSimulation;
use image::{ImageBuffer, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, Blend};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Default export resolution (matches the logical world)
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// GIF frame delay in hundredths of a second (~30 fps)
const GIF_DELAY: u16 = 3;
/// NeuQuant speed for GIF palette quantisation (1 best, 30 fastest)
const GIF_SPEED: i32 = 10;

/// Trails are drawn at this fraction of the particle's opacity
const TRAIL_ALPHA: f32 = 0.5;
/// Ring glow opacity relative to the particle
const RING_ALPHA: f32 = 0.5;

/// Circle centre and radius in whole pixels
fn circle(cx: f32, cy: f32, r: f32) -> ((i32, i32), i32) {
    ((cx.round() as i32, cy.round() as i32), r.round().max(0.0) as i32)
}

/// Render the current frame at the given pixel size
pub fn render_frame(simulation: &HeartSimulation, width: u32, height: u32) -> RgbaImage {
    let settings = &simulation.settings;
    let sx = width as f32 / settings.width.max(1.0);
    let sy = height as f32 / settings.height.max(1.0);
    let radius_scale = (sx + sy) / 2.0;

    let background = ImageBuffer::from_fn(width, height, |_, y| {
        background_at(settings.background, (y as f32 + 0.5) / height.max(1) as f32).to_rgba(1.0)
    });
    // Translucent glow and trails blend onto what is already drawn
    let mut canvas = Blend(background);

    for p in simulation.particles() {
        let opacity = p.opacity();
        let (cx, cy) = (p.x * sx, p.y * sy);

        let trail = p.trail();
        let n = trail.len();
        for (i, &(tx, ty)) in trail.iter().enumerate() {
            let fade = (i + 1) as f32 / (n + 1) as f32;
            let (center, r) = circle(tx * sx, ty * sy, p.size * radius_scale * fade * 0.5);
            let color = p.color.to_rgba(opacity * fade * TRAIL_ALPHA);
            draw_filled_circle_mut(&mut canvas, center, r, color);
        }

        let (center, glow) = circle(cx, cy, p.glow_radius(settings.glow) * radius_scale);
        match settings.glow {
            Glow::Halo { alpha, .. } => {
                draw_filled_circle_mut(&mut canvas, center, glow, p.color.to_rgba(alpha * opacity))
            }
            Glow::Rings => {
                draw_hollow_circle_mut(&mut canvas, center, glow, p.color.to_rgba(opacity * RING_ALPHA))
            }
        }
        if let Some(outer) = p.outer_glow_radius(settings.glow) {
            let (center, r) = circle(cx, cy, outer * radius_scale);
            let dim = p.color.scale(0.5).to_rgba(opacity * RING_ALPHA);
            draw_hollow_circle_mut(&mut canvas, center, r, dim);
        }

        let (center, r) = circle(cx, cy, p.size * radius_scale);
        draw_filled_circle_mut(&mut canvas, center, r, p.color.to_rgba(opacity));
    }

    canvas.0
}

/// Save the current frame as a PNG
pub fn save_snapshot(simulation: &HeartSimulation, path: &Path, width: u32, height: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let img = render_frame(simulation, width, height);
    img.save(path)?;
    info!(path = %path.display(), width, height, "snapshot saved");
    Ok(())
}

/// Run the simulation and record `frames` frames into an animated GIF.
/// The simulation advances `steps_per_frame` ticks between frames.
pub fn record_gif(
    simulation: &mut HeartSimulation,
    path: &Path,
    frames: usize,
    steps_per_frame: usize,
    width: u16,
    height: u16,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = gif::Encoder::new(file, width, height, &[])?;
    encoder.set_repeat(gif::Repeat::Infinite)?;

    for _ in 0..frames {
        for _ in 0..steps_per_frame.max(1) {
            simulation.tick();
        }
        let mut pixels = render_frame(simulation, width as u32, height as u32).into_raw();
        let mut frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, GIF_SPEED);
        frame.delay = GIF_DELAY;
        encoder.write_frame(&frame)?;
    }

    info!(path = %path.display(), frames, "recording saved");
    Ok(())
}
