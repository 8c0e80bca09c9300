use serde::{Deserialize, Serialize};

use super::{Ecef, Geodetic, geodetic_to_ecef};

/// A position on the ellipsoid in degrees, with height in meters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cartographic {
    pub lon_deg: f64,
    pub lat_deg: f64,
    #[serde(default)]
    pub height_m: f64,
}

impl Cartographic {
    pub fn new(lon_deg: f64, lat_deg: f64, height_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            height_m,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite() && self.height_m.is_finite()
    }

    pub fn to_geodetic(self) -> Geodetic {
        Geodetic::from_degrees(self.lat_deg, self.lon_deg, self.height_m)
    }

    pub fn to_ecef(self) -> Ecef {
        geodetic_to_ecef(self.to_geodetic())
    }
}

/// Wraps a longitude into `[-180, 180)`.
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Geographic bounding rectangle in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rectangle {
    /// The whole globe.
    pub const WORLD: Rectangle = Rectangle {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    pub fn from_degrees(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn contains(&self, lon_deg: f64, lat_deg: f64) -> bool {
        lon_deg >= self.west && lon_deg <= self.east && lat_deg >= self.south && lat_deg <= self.north
    }

    /// Finite, non-empty and inside the lon/lat domain.
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north].iter().all(|v| v.is_finite())
            && -180.0 <= self.west
            && self.west < self.east
            && self.east <= 180.0
            && -90.0 <= self.south
            && self.south < self.north
            && self.north <= 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Rectangle, wrap_longitude};

    #[test]
    fn wraps_longitudes() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(88.0), 88.0);
    }

    #[test]
    fn rectangle_validity() {
        let r = Rectangle::from_degrees(85.5, 21.5, 89.9, 27.3);
        assert!(r.is_valid());
        assert!(r.contains(88.3, 22.5));
        assert!(!r.contains(100.0, 22.5));
        assert!(Rectangle::WORLD.is_valid());
        assert!(!Rectangle::from_degrees(89.9, 21.5, 85.5, 27.3).is_valid());
        assert!(!Rectangle::from_degrees(85.5, f64::NAN, 89.9, 27.3).is_valid());
    }
}
