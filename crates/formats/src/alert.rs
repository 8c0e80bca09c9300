use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Alert severity. Anything unrecognized is treated as [`Severity::Info`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Moderate,
    Low,
    Info,
}

impl Severity {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" | "severe" => Severity::High,
            "moderate" | "medium" => Severity::Moderate,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Severity::parse).unwrap_or(Severity::Info))
    }
}

/// One entry of the alert feed.
///
/// Fields the globe does not use are preserved in `extra` so the click
/// callback receives the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_severity() -> Severity {
    Severity::Info
}

impl Alert {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64, name: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            name: name.into(),
            severity,
            extra: Map::new(),
        }
    }

    pub fn has_finite_position(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// A camera focus request from the host; accepts either key spelling.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusLocation {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

impl FocusLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}
