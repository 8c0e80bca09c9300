use formats::{Alert, FocusLocation, SimulationControl};
use serde::Deserialize;

/// Everything the host feeds the globe. Compared field by field on update.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobeProps {
    pub alerts: Vec<Alert>,
    pub hour_index: i64,
    /// Falls back to the configured template when absent.
    pub imagery_template: Option<String>,
    pub focus_location: Option<FocusLocation>,
    pub simulation: SimulationControl,
}

#[cfg(test)]
mod tests {
    use super::GlobeProps;

    #[test]
    fn parses_host_payload() {
        let props: GlobeProps = serde_json::from_str(
            r#"{
                "alerts": [{"id": 1, "lat": 22.5, "lng": 88.3, "name": "X", "severity": "high"}],
                "hourIndex": 27,
                "focusLocation": {"latitude": 22.57, "longitude": 88.36},
                "simulation": {"isActive": true, "frameIndex": 3, "sessionId": "s1"}
            }"#,
        )
        .unwrap();
        assert_eq!(props.alerts[0].id, "1");
        assert_eq!(props.hour_index, 27);
        assert_eq!(props.focus_location.map(|f| f.lat), Some(22.57));
        assert_eq!(props.simulation.active_session(), Some("s1"));
        assert_eq!(props.imagery_template, None);
    }
}
