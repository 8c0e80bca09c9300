use super::{Ecef, Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up frame anchored at a geodetic origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EnuFrame {
    pub origin: Ecef,
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl EnuFrame {
    pub fn at(origin: Geodetic) -> Self {
        let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();

        Self {
            origin: geodetic_to_ecef(origin),
            east: Vec3::new(-sin_lon, cos_lon, 0.0),
            north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    /// Rotates a local direction into ECEF (no translation).
    pub fn direction_to_ecef(&self, east: f64, north: f64, up: f64) -> Vec3 {
        self.east.scale(east) + self.north.scale(north) + self.up.scale(up)
    }
}

#[cfg(test)]
mod tests {
    use super::EnuFrame;
    use crate::math::{Geodetic, Vec3, geodetic_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn basis_is_orthonormal() {
        let frame = EnuFrame::at(Geodetic::from_degrees(22.5, 88.3, 0.0));
        assert_close(frame.east.dot(frame.north), 0.0, 1e-12);
        assert_close(frame.north.dot(frame.up), 0.0, 1e-12);
        assert_close(frame.up.length(), 1.0, 1e-12);
        assert_eq!(frame.east.cross(frame.north).normalize().map(|v| (v - frame.up).length() < 1e-9), Some(true));
    }

    #[test]
    fn up_points_away_from_the_center() {
        let origin = Geodetic::from_degrees(10.0, 20.0, 0.0);
        let frame = EnuFrame::at(origin);
        let above = geodetic_to_ecef(Geodetic::from_degrees(10.0, 20.0, 500.0));
        let rise = above.as_vec3() - frame.origin.as_vec3();
        assert_close(rise.dot(frame.up), 500.0, 1e-6);
        assert_close(rise.dot(frame.east), 0.0, 1e-6);
        assert_eq!(frame.direction_to_ecef(0.0, 0.0, 1.0), frame.up + Vec3::ZERO);
    }
}
