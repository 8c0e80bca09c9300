use serde::Serialize;

/// Linear RGBA color, components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.647, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 0.502, 0.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_css_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |v: u8| v as f32 / 255.0;
        match hex.len() {
            6 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::rgb(
                    channel((v >> 16) as u8),
                    channel((v >> 8) as u8),
                    channel(v as u8),
                ))
            }
            3 => {
                let v = u16::from_str_radix(hex, 16).ok()?;
                let expand = |n: u16| channel(((n & 0xF) * 17) as u8);
                Some(Self::rgb(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            _ => None,
        }
    }
}
