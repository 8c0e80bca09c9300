use foundation::math::Rectangle;
use scene::TerrainState;
use serde::Deserialize;
use thiserror::Error;

/// Terrain tileset descriptor served at `{base}/terrain/tileset.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TerrainTileset {
    #[serde(rename = "version")]
    _version: u32,
    pub tile_size: u32,
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub tile_path_template: String,
    #[serde(default)]
    pub vertical_datum: Option<String>,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_height: f64,
    pub max_height: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("terrain zoom range {min}..={max} is empty")]
    EmptyZoomRange { min: u32, max: u32 },
    #[error("terrain coverage is not a valid rectangle")]
    BadCoverage,
    #[error("terrain tile template lacks {{z}}/{{x}}/{{y}}")]
    BadTemplate,
}

impl TerrainTileset {
    pub fn coverage(&self) -> Rectangle {
        Rectangle::from_degrees(self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.zoom_min > self.zoom_max {
            return Err(TerrainError::EmptyZoomRange {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        if !self.coverage().is_valid() {
            return Err(TerrainError::BadCoverage);
        }
        if !["{z}", "{x}", "{y}"].iter().all(|t| self.tile_path_template.contains(t)) {
            return Err(TerrainError::BadTemplate);
        }
        Ok(())
    }

    /// Scene terrain state once this tileset (fetched from `url`) is in use.
    pub fn ready_state(&self, url: &str) -> TerrainState {
        TerrainState::Ready {
            url: url.to_string(),
            max_level: self.zoom_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TerrainError, TerrainTileset};
    use scene::TerrainState;

    fn tileset(template: &str, zoom_min: u32, zoom_max: u32) -> TerrainTileset {
        TerrainTileset {
            _version: 1,
            tile_size: 256,
            zoom_min,
            zoom_max,
            tile_path_template: template.to_string(),
            vertical_datum: None,
            min_lon: 85.0,
            max_lon: 90.0,
            min_lat: 21.0,
            max_lat: 28.0,
            min_height: -10.0,
            max_height: 3_000.0,
        }
    }

    #[test]
    fn validates_descriptor() {
        assert_eq!(tileset("t/{z}/{x}/{y}.bin", 0, 12).validate(), Ok(()));
        assert_eq!(tileset("t/{z}/{x}.bin", 0, 12).validate(), Err(TerrainError::BadTemplate));
        assert!(matches!(
            tileset("t/{z}/{x}/{y}.bin", 5, 2).validate(),
            Err(TerrainError::EmptyZoomRange { .. })
        ));
    }

    #[test]
    fn ready_state_reports_max_level() {
        let t = tileset("t/{z}/{x}/{y}.bin", 0, 12);
        assert_eq!(
            t.ready_state("http://api/terrain/tileset.json"),
            TerrainState::Ready {
                url: "http://api/terrain/tileset.json".to_string(),
                max_level: 12
            }
        );
        assert!(t.coverage().contains(88.0, 22.0));
    }
}
