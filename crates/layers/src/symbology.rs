use formats::Severity;
use scene::components::Color;

/// Marker color for an alert severity.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::RED,
        Severity::Moderate => Color::ORANGE,
        Severity::Low | Severity::Info => Color::GREEN,
    }
}

/// Flowing stripe style for rivers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RiverStyle {
    pub width_px: f64,
    pub default_color: Color,
    /// Alpha of the gaps between stripes.
    pub gap_alpha: f32,
    pub repeat: f64,
    /// Stripe offset gained per millisecond.
    pub flow_per_ms: f64,
}

impl Default for RiverStyle {
    fn default() -> Self {
        Self {
            width_px: 5.0,
            default_color: Color::rgb(0.055, 0.647, 0.914),
            gap_alpha: 0.2,
            repeat: 20.0,
            flow_per_ms: 0.0002,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BorderStyle {
    pub width_px: f64,
    pub color: Color,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            width_px: 2.0,
            color: Color::rgb(1.0, 0.843, 0.0).with_alpha(0.9),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ExtentStyle {
    pub fill: Color,
    pub outline: Color,
}

impl Default for ExtentStyle {
    fn default() -> Self {
        Self {
            fill: Color::rgb(0.004, 0.341, 0.608).with_alpha(0.45),
            outline: Color::rgb(0.008, 0.533, 0.820),
        }
    }
}
