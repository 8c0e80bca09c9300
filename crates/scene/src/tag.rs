use serde::Serialize;

/// Ownership discriminant attached to every controller-managed entity.
///
/// Each controller adds and removes only entities whose tag falls in its own
/// [`TagNamespace`], so two controllers never touch each other's entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityTag {
    AlertMarker { alert_id: String },
    RippleRing { alert_id: String, ring: u8 },
    River { name: String },
    Border,
    FloodExtent { session_id: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagNamespace {
    AlertMarkers,
    RippleRings,
    Rivers,
    Borders,
    FloodExtent,
}

impl EntityTag {
    pub fn namespace(&self) -> TagNamespace {
        match self {
            EntityTag::AlertMarker { .. } => TagNamespace::AlertMarkers,
            EntityTag::RippleRing { .. } => TagNamespace::RippleRings,
            EntityTag::River { .. } => TagNamespace::Rivers,
            EntityTag::Border => TagNamespace::Borders,
            EntityTag::FloodExtent { .. } => TagNamespace::FloodExtent,
        }
    }

    /// The alert this entity represents, for markers and their ripples.
    pub fn alert_id(&self) -> Option<&str> {
        match self {
            EntityTag::AlertMarker { alert_id } | EntityTag::RippleRing { alert_id, .. } => {
                Some(alert_id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityTag, TagNamespace};

    #[test]
    fn ripples_and_markers_live_in_separate_namespaces() {
        let marker = EntityTag::AlertMarker {
            alert_id: "1".into(),
        };
        let ring = EntityTag::RippleRing {
            alert_id: "1".into(),
            ring: 0,
        };
        assert_eq!(marker.namespace(), TagNamespace::AlertMarkers);
        assert_eq!(ring.namespace(), TagNamespace::RippleRings);
        assert_eq!(marker.alert_id(), ring.alert_id());
        assert_eq!(EntityTag::Border.alert_id(), None);
    }
}
