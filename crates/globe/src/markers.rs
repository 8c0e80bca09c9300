//! Time functions behind alert markers and ripple rings.
//!
//! Everything here is a pure function of wall-clock milliseconds, so markers
//! stay in sync however irregularly the host ticks.

use std::f64::consts::TAU;

pub const MARKER_BASE_PX: f64 = 20.0;
pub const MARKER_MIN_PX: f64 = 6.0;
pub const MARKER_MAX_PX: f64 = 32.0;
pub const MARKER_OUTLINE_PX: f64 = 2.0;
pub const PULSE_PERIOD_MS: f64 = 2_000.0;

/// Camera distance at which markers draw at their base size.
pub const MARKER_REFERENCE_DISTANCE_M: f64 = 7_000_000.0;
pub const DISTANCE_SCALE_MIN: f64 = 0.5;
pub const DISTANCE_SCALE_MAX: f64 = 1.5;

pub const LABEL_MAX_DISTANCE_M: f64 = 5_000_000.0;
pub const LABEL_OFFSET_PX: (f64, f64) = (0.0, -25.0);

pub const RIPPLE_COUNT: u8 = 3;
pub const RIPPLE_PERIOD_MS: f64 = 3_000.0;
pub const RIPPLE_BASE_AXIS_M: f64 = 80_000.0;
/// Ring radius as a multiple of the base axis at phase 0 and phase 1.
pub const RIPPLE_MIN_SCALE: f64 = 0.25;
pub const RIPPLE_MAX_SCALE: f64 = 1.5;
/// Semi-minor / semi-major; at most 1.
pub const RIPPLE_AXIS_RATIO: f64 = 1.0;
pub const RIPPLE_MAX_ALPHA: f64 = 0.3;

/// Brightness pulse in `[0.6, 1.0]`.
pub fn pulse(t_ms: f64) -> f64 {
    0.8 + 0.2 * (TAU * t_ms / PULSE_PERIOD_MS).sin()
}

/// Grows markers as the camera closes in, shrinks them far out.
pub fn distance_scale(distance_m: f64) -> f64 {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return 1.0;
    }
    (MARKER_REFERENCE_DISTANCE_M / distance_m)
        .sqrt()
        .clamp(DISTANCE_SCALE_MIN, DISTANCE_SCALE_MAX)
}

pub fn marker_size_px(t_ms: f64, distance_m: f64) -> f64 {
    let size = MARKER_BASE_PX * pulse(t_ms) * distance_scale(distance_m);
    if size.is_finite() {
        size.clamp(MARKER_MIN_PX, MARKER_MAX_PX)
    } else {
        MARKER_BASE_PX
    }
}

/// Phase of ring `ring` in `[0, 1)`; rings are a third of a period apart.
pub fn ripple_phase(t_ms: f64, ring: u8) -> f64 {
    let offset = f64::from(ring) / f64::from(RIPPLE_COUNT);
    let phase = (t_ms / RIPPLE_PERIOD_MS + offset).rem_euclid(1.0);
    if phase.is_finite() { phase } else { 0.0 }
}

pub fn ripple_semi_major_m(phase: f64) -> f64 {
    let phase = phase.clamp(0.0, 1.0);
    RIPPLE_BASE_AXIS_M * (RIPPLE_MIN_SCALE + (RIPPLE_MAX_SCALE - RIPPLE_MIN_SCALE) * phase)
}

pub fn ripple_semi_minor_m(phase: f64) -> f64 {
    ripple_semi_major_m(phase) * RIPPLE_AXIS_RATIO
}

/// Sawtooth: full at phase 0, fading to nothing as the phase wraps.
pub fn ripple_alpha(phase: f64) -> f64 {
    RIPPLE_MAX_ALPHA * (1.0 - phase.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_stays_between_sixty_and_hundred_percent() {
        for i in 0..400 {
            let p = pulse(i as f64 * 13.7);
            assert!((0.6 - 1e-12..=1.0 + 1e-12).contains(&p), "{p}");
        }
        assert!((pulse(500.0) - 1.0).abs() < 1e-12);
        assert!((pulse(1_500.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn marker_size_is_clamped() {
        assert!((marker_size_px(0.0, MARKER_REFERENCE_DISTANCE_M) - 16.0).abs() < 1e-9);
        for d in [1.0, 1e3, 1e5, 1e7, 1e9, 0.0, f64::NAN] {
            for t in [0.0, 500.0, 1_500.0] {
                let s = marker_size_px(t, d);
                assert!((MARKER_MIN_PX..=MARKER_MAX_PX).contains(&s), "{s} at {d}");
            }
        }
        assert!(marker_size_px(500.0, 1e5) > marker_size_px(500.0, 1e9));
    }

    #[test]
    fn ripple_alpha_is_non_increasing_within_a_period() {
        for ring in 0..RIPPLE_COUNT {
            let mut prev_phase = ripple_phase(0.0, ring);
            let mut prev_alpha = ripple_alpha(prev_phase);
            let mut wrapped = false;
            for step in 1..=300 {
                let t = step as f64 * 10.0;
                let phase = ripple_phase(t, ring);
                let alpha = ripple_alpha(phase);
                if phase < prev_phase {
                    assert!(!wrapped, "wrapped twice within one period");
                    wrapped = true;
                    assert!(alpha > prev_alpha);
                    assert!((ripple_alpha(0.0) - RIPPLE_MAX_ALPHA).abs() < 1e-12);
                } else {
                    assert!(alpha <= prev_alpha + 1e-12);
                }
                prev_phase = phase;
                prev_alpha = alpha;
            }
        }
    }

    #[test]
    fn rings_are_a_third_of_a_period_apart() {
        let t = 1_234.0;
        let p0 = ripple_phase(t, 0);
        let p1 = ripple_phase(t, 1);
        let p2 = ripple_phase(t, 2);
        let third = 1.0 / 3.0;
        assert!(((p1 - p0).rem_euclid(1.0) - third).abs() < 1e-9);
        assert!(((p2 - p1).rem_euclid(1.0) - third).abs() < 1e-9);
        assert!(ripple_phase(-250.0, 0) >= 0.0);
    }

    #[test]
    fn ellipse_axes_never_invert_or_go_negative() {
        for i in 0..=1000 {
            let phase = i as f64 / 1000.0;
            let major = ripple_semi_major_m(phase);
            let minor = ripple_semi_minor_m(phase);
            assert!(minor >= 0.0);
            assert!(major >= minor);
            assert!(ripple_alpha(phase) >= 0.0);
        }
        assert!(ripple_semi_major_m(0.9) > ripple_semi_major_m(0.1));
    }
}
