//! Synthesized stand-in frames used when no imagery template is configured.
//!
//! A frame is a soft blue field whose hue drifts with the hour, some faint
//! blobs for texture, and an `HH:00` stamp in the bottom-right corner. The
//! blob layout is seeded by the hour, so a given hour always looks the same.

use std::io::Cursor;

use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::imagery::ImageryError;

pub const WIDTH: u32 = 512;
pub const HEIGHT: u32 = 256;
pub const MAX_BLOBS: usize = 24;
const BLOB_ALPHA: f32 = 0.12;

/// Hue for `hour`, rotated through a full turn and then squeezed into the
/// 190°–250° blue band.
pub fn background_hue(hour: u32) -> f64 {
    let rotated = (hour % 24) as f64 / 24.0 * 360.0;
    190.0 + rotated / 360.0 * 60.0
}

pub fn render(hour: u32) -> RgbaImage {
    let hour = hour % 24;
    let [r, g, b] = hsl_to_rgb(background_hue(hour), 0.55, 0.42);
    let mut img = RgbaImage::from_pixel(WIDTH, HEIGHT, Rgba([r, g, b, 255]));

    let mut rng = StdRng::seed_from_u64(u64::from(hour));
    let blobs = rng.gen_range(MAX_BLOBS / 2..=MAX_BLOBS);
    for _ in 0..blobs {
        let cx = rng.gen_range(0.0..WIDTH as f32);
        let cy = rng.gen_range(0.0..HEIGHT as f32);
        let radius = rng.gen_range(12.0..56.0_f32);
        let light = rng.gen_bool(0.5);
        draw_blob(&mut img, cx, cy, radius, light);
    }

    draw_time_label(&mut img, hour);
    img
}

pub fn placeholder_png(hour: u32) -> Result<Vec<u8>, ImageryError> {
    let mut bytes = Vec::new();
    render(hour)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ImageryError::Placeholder(e.to_string()))?;
    Ok(bytes)
}

pub fn placeholder_data_uri(hour: u32) -> Result<String, ImageryError> {
    let png = placeholder_png(hour)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

fn draw_blob(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, light: bool) {
    let tint = if light { 255.0 } else { 0.0 };
    let x0 = (cx - radius).max(0.0) as u32;
    let y0 = (cy - radius).max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(WIDTH);
    let y1 = ((cy + radius).ceil() as u32).min(HEIGHT);

    for y in y0..y1 {
        for x in x0..x1 {
            let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt() / radius;
            if d >= 1.0 {
                continue;
            }
            // Smooth radial falloff.
            let a = BLOB_ALPHA * (1.0 - d * d).powi(2);
            let px = img.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = (px.0[c] as f32 * (1.0 - a) + tint * a).round() as u8;
            }
        }
    }
}

// 3x5 digit glyphs, one row per entry, high bit on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const COLON: [u8; 5] = [0b000, 0b010, 0b000, 0b010, 0b000];
const GLYPH_SCALE: u32 = 4;
const MARGIN: u32 = 12;

fn draw_time_label(img: &mut RgbaImage, hour: u32) {
    let glyphs = [
        DIGITS[(hour / 10) as usize],
        DIGITS[(hour % 10) as usize],
        COLON,
        DIGITS[0],
        DIGITS[0],
    ];
    let advance = 4 * GLYPH_SCALE;
    let width = glyphs.len() as u32 * advance - GLYPH_SCALE;
    let left = WIDTH - MARGIN - width;
    let top = HEIGHT - MARGIN - 5 * GLYPH_SCALE;

    for (i, glyph) in glyphs.iter().enumerate() {
        let gx = left + i as u32 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        img.put_pixel(
                            gx + col * GLYPH_SCALE + dx,
                            top + row as u32 * GLYPH_SCALE + dy,
                            Rgba([255, 255, 255, 230]),
                        );
                    }
                }
            }
        }
    }
}

fn hsl_to_rgb(h_deg: f64, s: f64, l: f64) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h_deg.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}
