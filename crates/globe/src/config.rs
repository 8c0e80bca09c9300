use std::env;

use foundation::math::Rectangle;
use serde::{Deserialize, Serialize};

use crate::error::GlobeError;

/// Where `reset_view` returns to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeView {
    pub lat: f64,
    pub lng: f64,
    pub altitude_m: f64,
}

impl Default for HomeView {
    fn default() -> Self {
        Self {
            lat: 22.5937,
            lng: 78.9629,
            altitude_m: 7_000_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub home: HomeView,
    /// Steady opacity of the hourly overlay.
    pub overlay_alpha_cap: f64,
    pub crossfade_ms: f64,
    /// Area the hourly overlay is draped over.
    pub overlay_rectangle: Rectangle,
    pub flight_duration_ms: f64,
    pub min_zoom_distance_m: f64,
    pub max_zoom_distance_m: f64,
    /// Simulation/terrain API; the offline mock is used when unset.
    pub api_base_url: Option<String>,
    pub request_timeout_ms: u64,
    pub terrain_enabled: bool,
    pub imagery_template: Option<String>,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            home: HomeView::default(),
            overlay_alpha_cap: 0.55,
            crossfade_ms: 800.0,
            overlay_rectangle: Rectangle::WORLD,
            flight_duration_ms: 1500.0,
            min_zoom_distance_m: 1_000.0,
            max_zoom_distance_m: 20_000_000.0,
            api_base_url: None,
            request_timeout_ms: 10_000,
            terrain_enabled: true,
            imagery_template: None,
        }
    }
}

impl GlobeConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, GlobeError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| GlobeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `GLOBE_*` and `FLOOD_IMAGERY_TEMPLATE`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Applies environment-style overrides read through `lookup`.
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var_f64 = |key: &str, default: f64| -> f64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .filter(|v: &f64| v.is_finite())
                .unwrap_or(default)
        };
        let var_u64 = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let var_bool = |key: &str, default: bool| -> bool {
            match lookup(key).as_deref().map(str::trim) {
                Some("1" | "true" | "yes" | "on") => true,
                Some("0" | "false" | "no" | "off") => false,
                _ => default,
            }
        };
        let var_string = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            home: HomeView {
                lat: var_f64("GLOBE_HOME_LAT", self.home.lat),
                lng: var_f64("GLOBE_HOME_LNG", self.home.lng),
                altitude_m: var_f64("GLOBE_HOME_ALTITUDE_M", self.home.altitude_m),
            },
            overlay_alpha_cap: var_f64("GLOBE_OVERLAY_ALPHA", self.overlay_alpha_cap).clamp(0.0, 1.0),
            crossfade_ms: var_f64("GLOBE_CROSSFADE_MS", self.crossfade_ms).max(0.0),
            overlay_rectangle: self.overlay_rectangle,
            flight_duration_ms: var_f64("GLOBE_FLIGHT_MS", self.flight_duration_ms).max(0.0),
            min_zoom_distance_m: var_f64("GLOBE_MIN_ZOOM_M", self.min_zoom_distance_m),
            max_zoom_distance_m: var_f64("GLOBE_MAX_ZOOM_M", self.max_zoom_distance_m),
            api_base_url: var_string("GLOBE_API_BASE_URL").or(self.api_base_url),
            request_timeout_ms: var_u64("GLOBE_REQUEST_TIMEOUT_MS", self.request_timeout_ms),
            terrain_enabled: var_bool("GLOBE_TERRAIN", self.terrain_enabled),
            imagery_template: var_string("FLOOD_IMAGERY_TEMPLATE").or(self.imagery_template),
        }
    }

    pub fn validate(&self) -> Result<(), GlobeError> {
        if !(self.home.lat.is_finite() && self.home.lng.is_finite() && self.home.altitude_m.is_finite()) {
            return Err(GlobeError::Config("home view must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.overlay_alpha_cap) {
            return Err(GlobeError::Config(format!(
                "overlay_alpha_cap {} outside 0..=1",
                self.overlay_alpha_cap
            )));
        }
        if !self.overlay_rectangle.is_valid() {
            return Err(GlobeError::Config(format!(
                "overlay_rectangle {:?} is not a valid extent",
                self.overlay_rectangle
            )));
        }
        if self.min_zoom_distance_m <= 0.0 || self.min_zoom_distance_m > self.max_zoom_distance_m {
            return Err(GlobeError::Config(format!(
                "zoom limits {}..{} are not increasing",
                self.min_zoom_distance_m, self.max_zoom_distance_m
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::GlobeConfig;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let config = GlobeConfig::default();
        assert_eq!(config.home.altitude_m, 7_000_000.0);
        assert_eq!(config.overlay_alpha_cap, 0.55);
        assert_eq!(config.crossfade_ms, 800.0);
        assert_eq!(config.min_zoom_distance_m, 1_000.0);
        assert_eq!(config.max_zoom_distance_m, 20_000_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let config = GlobeConfig::default().with_overrides(lookup(&[
            ("GLOBE_OVERLAY_ALPHA", "0.8"),
            ("GLOBE_CROSSFADE_MS", "not-a-number"),
            ("GLOBE_TERRAIN", "off"),
            ("GLOBE_API_BASE_URL", "  "),
            ("FLOOD_IMAGERY_TEMPLATE", "https://tiles/{hour}.png"),
        ]));
        assert_eq!(config.overlay_alpha_cap, 0.8);
        assert_eq!(config.crossfade_ms, 800.0);
        assert!(!config.terrain_enabled);
        assert_eq!(config.api_base_url, None);
        assert_eq!(config.imagery_template.as_deref(), Some("https://tiles/{hour}.png"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GlobeConfig::from_json_str(r#"{"crossfade_ms": 400, "home": {"lat": 1, "lng": 2, "altitude_m": 3}}"#)
            .unwrap();
        assert_eq!(config.crossfade_ms, 400.0);
        assert_eq!(config.home.lng, 2.0);
        assert_eq!(config.overlay_alpha_cap, 0.55);
    }

    #[test]
    fn rejects_inverted_zoom_limits() {
        let err = GlobeConfig::from_json_str(r#"{"min_zoom_distance_m": 10, "max_zoom_distance_m": 5}"#);
        assert!(err.is_err());
    }
}
