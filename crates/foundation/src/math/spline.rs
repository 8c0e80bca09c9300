//! Centripetal Catmull-Rom smoothing for lon/lat polylines.

/// Default number of output samples per input control point.
pub const DEFAULT_SAMPLES_PER_POINT: usize = 20;

// Knot spacing floor; keeps coincident control points from producing a
// zero-length interval.
const MIN_KNOT_INTERVAL: f64 = 1e-9;

/// Returns a denser path through `points` (ordered `(lon, lat)` pairs).
///
/// The curve is a centripetal Catmull-Rom spline parameterized by normalized
/// index and resampled at `samples_per_point * points.len()` intervals. The
/// first and last output points are exactly the input's. Inputs with fewer
/// than two points are returned unchanged.
pub fn smooth_path(points: &[(f64, f64)], samples_per_point: usize) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 2 || samples_per_point == 0 {
        return points.to_vec();
    }

    let samples = n * samples_per_point;
    let mut out = Vec::with_capacity(samples + 1);
    out.push(points[0]);
    for step in 1..samples {
        let u = step as f64 / samples as f64;
        out.push(evaluate(points, u));
    }
    out.push(points[n - 1]);
    out
}

/// Evaluates the spline at normalized parameter `u` in `[0, 1]`.
fn evaluate(points: &[(f64, f64)], u: f64) -> (f64, f64) {
    let n = points.len();
    let segments = (n - 1) as f64;
    let scaled = (u.clamp(0.0, 1.0) * segments).min(segments);
    let seg = (scaled.floor() as usize).min(n - 2);
    let local = scaled - seg as f64;

    let p1 = points[seg];
    let p2 = points[seg + 1];
    let p0 = if seg == 0 {
        reflect(points[0], points[1])
    } else {
        points[seg - 1]
    };
    let p3 = if seg + 2 < n {
        points[seg + 2]
    } else {
        reflect(points[n - 1], points[n - 2])
    };

    segment(p0, p1, p2, p3, local)
}

/// Phantom control point mirroring `neighbor` through `end`.
fn reflect(end: (f64, f64), neighbor: (f64, f64)) -> (f64, f64) {
    (2.0 * end.0 - neighbor.0, 2.0 * end.1 - neighbor.1)
}

fn knot(a: (f64, f64), b: (f64, f64)) -> f64 {
    let d = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    d.sqrt().max(MIN_KNOT_INTERVAL)
}

fn lerp(a: (f64, f64), b: (f64, f64), ta: f64, tb: f64, t: f64) -> (f64, f64) {
    let w = (t - ta) / (tb - ta);
    (a.0 + (b.0 - a.0) * w, a.1 + (b.1 - a.1) * w)
}

/// Barry-Goldman pyramid for one segment; `local` runs 0..1 from `p1` to `p2`.
fn segment(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), local: f64) -> (f64, f64) {
    let t0 = 0.0;
    let t1 = t0 + knot(p0, p1);
    let t2 = t1 + knot(p1, p2);
    let t3 = t2 + knot(p2, p3);
    let t = t1 + (t2 - t1) * local;

    let a1 = lerp(p0, p1, t0, t1, t);
    let a2 = lerp(p1, p2, t1, t2, t);
    let a3 = lerp(p2, p3, t2, t3, t);
    let b1 = lerp(a1, a2, t0, t2, t);
    let b2 = lerp(a2, a3, t1, t3, t);
    lerp(b1, b2, t1, t2, t)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_SAMPLES_PER_POINT, smooth_path};

    #[test]
    fn densifies_and_keeps_endpoints() {
        let input = [(88.0, 22.0), (88.5, 22.4), (89.0, 22.1), (89.4, 22.9)];
        let out = smooth_path(&input, DEFAULT_SAMPLES_PER_POINT);
        assert_eq!(out.len(), input.len() * DEFAULT_SAMPLES_PER_POINT + 1);
        assert_eq!(out.first(), input.first());
        assert_eq!(out.last(), input.last());
        assert!(out.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn passes_through_interior_control_points() {
        let input = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
        let out = smooth_path(&input, 10);
        // u = 0.5 lands exactly on the middle control point.
        let mid = out[15];
        assert!((mid.0 - 1.0).abs() < 1e-9 && (mid.1 - 1.0).abs() < 1e-9, "{mid:?}");
    }

    #[test]
    fn short_inputs_are_unchanged() {
        assert!(smooth_path(&[], 20).is_empty());
        assert_eq!(smooth_path(&[(1.0, 2.0)], 20), vec![(1.0, 2.0)]);
    }

    #[test]
    fn duplicate_points_stay_finite() {
        let input = [(5.0, 5.0), (5.0, 5.0), (6.0, 5.0)];
        let out = smooth_path(&input, 20);
        assert!(out.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn straight_line_stays_on_line() {
        let input = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)];
        for (x, y) in smooth_path(&input, 20) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn is_deterministic() {
        let input = [(88.0, 22.0), (88.7, 23.0), (89.1, 22.2)];
        assert_eq!(smooth_path(&input, 20), smooth_path(&input, 20));
    }
}
