use super::Ecef;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();

    // Prime vertical radius of curvature.
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Ecef::new(
        (n + geo.alt_m) * cos_lat * cos_lon,
        (n + geo.alt_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat,
    )
}

#[cfg(test)]
mod tests {
    use super::{Geodetic, WGS84_A, WGS84_B, geodetic_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn north_pole_sits_on_minor_axis() {
        let ecef = geodetic_to_ecef(Geodetic::from_degrees(90.0, 0.0, 0.0));
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.z, WGS84_B, 1e-6);
    }

    #[test]
    fn east_of_greenwich_is_positive_y() {
        let kolkata = geodetic_to_ecef(Geodetic::from_degrees(22.5726, 88.3639, 0.0));
        assert!(kolkata.y > 0.0);
        assert!(kolkata.x.abs() < kolkata.y);
        assert_close(kolkata.as_vec3().length(), 6_375_500.0, 2_000.0);
    }

    #[test]
    fn altitude_moves_point_outward() {
        let ground = geodetic_to_ecef(Geodetic::from_degrees(0.0, 0.0, 0.0));
        let high = geodetic_to_ecef(Geodetic::from_degrees(0.0, 0.0, 1_000.0));
        assert_close(ground.x, WGS84_A, 1e-6);
        assert_close(high.x - ground.x, 1_000.0, 1e-6);
    }
}
