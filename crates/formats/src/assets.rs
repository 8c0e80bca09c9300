//! Static vector overlays bundled with the crate.

use crate::error::FormatError;
use crate::geojson::FeatureCollection;

pub const WEST_BENGAL_RIVERS: &str = include_str!("../assets/west_bengal_rivers.geojson");
pub const WEST_BENGAL_BOUNDARY: &str = include_str!("../assets/west_bengal_boundary.geojson");

pub fn rivers() -> Result<FeatureCollection, FormatError> {
    FeatureCollection::from_geojson_str(WEST_BENGAL_RIVERS)
}

pub fn state_boundary() -> Result<FeatureCollection, FormatError> {
    FeatureCollection::from_geojson_str(WEST_BENGAL_BOUNDARY)
}

#[cfg(test)]
mod tests {
    use super::{rivers, state_boundary};

    #[test]
    fn bundled_rivers_are_named_lines() {
        let fc = rivers().unwrap();
        assert_eq!(fc.len(), 8);
        for feature in &fc.features {
            assert!(feature.name().is_some());
            assert!(feature.geometry.lines().iter().all(|l| l.len() >= 2));
        }
    }

    #[test]
    fn bundled_boundary_is_closed_polygon() {
        let fc = state_boundary().unwrap();
        assert_eq!(fc.features[0].name(), Some("West Bengal"));
        let polys = fc.features[0].geometry.polygons();
        let outer = &polys[0][0];
        assert_eq!(outer.first(), outer.last());
    }
}
