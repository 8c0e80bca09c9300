//! Scenario replay: drives a [`GlobeView`] through timed prop updates on a
//! simulated clock and summarises the scene after every tick.

use std::collections::VecDeque;
use std::rc::Rc;

use foundation::time::{Clock, ManualClock};
use formats::FocusLocation;
use globe::{GeolocationError, GlobeProps, GlobeView};
use recents::RecentSearch;
use scene::input::{ScreenEvent, ScreenSpaceEventType};
use scene::snapshot::SceneSnapshot;
use scene::tag::TagNamespace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_tick_ms() -> f64 {
    100.0
}

/// A replay script. Step times are relative to `start_ms`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub start_ms: f64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: f64,
    pub duration_ms: f64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub at_ms: f64,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Props { props: GlobeProps },
    FlyTo { lat: f64, lng: f64, altitude_m: f64 },
    ResetView,
    Spin,
    Search { place: RecentSearch },
    Locate { lat: f64, lng: f64 },
    LocationDenied,
    Click { x: f64, y: f64 },
    Unmount,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tick_ms must be finite and positive, got {0}")]
    BadTick(f64),
    #[error("duration_ms must be finite and non-negative, got {0}")]
    BadDuration(f64),
    #[error("step {index} has non-finite time")]
    BadStepTime { index: usize },
}

impl Scenario {
    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.tick_ms.is_finite() && self.tick_ms > 0.0) {
            return Err(ScenarioError::BadTick(self.tick_ms));
        }
        if !(self.duration_ms.is_finite() && self.duration_ms >= 0.0) {
            return Err(ScenarioError::BadDuration(self.duration_ms));
        }
        if let Some(index) = self.steps.iter().position(|s| !s.at_ms.is_finite()) {
            return Err(ScenarioError::BadStepTime { index });
        }
        Ok(())
    }
}

/// Condensed view of one snapshot, one line of replay output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub time_ms: f64,
    pub camera_lat: f64,
    pub camera_lon: f64,
    pub camera_height_m: f64,
    pub heading_deg: f64,
    pub flying: bool,
    pub overlay_alphas: Vec<f64>,
    pub markers: usize,
    pub ripples: usize,
    pub extent_polygons: usize,
    pub terrain: String,
}

impl FrameSummary {
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        let count = |ns: TagNamespace| {
            snapshot
                .entities
                .iter()
                .filter(|e| e.tag.as_ref().map(|t| t.namespace()) == Some(ns))
                .count()
        };
        let camera = &snapshot.camera;
        Self {
            time_ms: snapshot.time_ms,
            camera_lat: camera.position.lat_deg,
            camera_lon: camera.position.lon_deg,
            camera_height_m: camera.position.height_m,
            heading_deg: camera.orientation.heading_deg,
            flying: camera.flying,
            overlay_alphas: snapshot.imagery.iter().map(|l| l.alpha).collect(),
            markers: count(TagNamespace::AlertMarkers),
            ripples: count(TagNamespace::RippleRings),
            extent_polygons: count(TagNamespace::FloodExtent),
            terrain: format!("{:?}", snapshot.terrain),
        }
    }
}

/// Outcome of one replay tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub frame_index: Option<u64>,
    pub time_ms: f64,
    pub applied: Vec<String>,
    pub events: Vec<String>,
    pub summary: Option<FrameSummary>,
}

pub struct Replayer {
    view: GlobeView,
    clock: Rc<ManualClock>,
    steps: VecDeque<Step>,
    tick_ms: f64,
    start_ms: f64,
    end_ms: f64,
    done: bool,
}

impl Replayer {
    /// `view` must run on `clock`; the clock is reset to the scenario start.
    pub fn new(scenario: Scenario, view: GlobeView, clock: Rc<ManualClock>) -> Self {
        let mut steps = scenario.steps;
        steps.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        clock.set(scenario.start_ms);
        Self {
            view,
            clock,
            steps: steps.into(),
            tick_ms: scenario.tick_ms,
            start_ms: scenario.start_ms,
            end_ms: scenario.start_ms + scenario.duration_ms,
            done: false,
        }
    }

    pub fn view(&self) -> &GlobeView {
        &self.view
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Applies the steps now due, ticks the view and moves the clock on.
    /// Returns `None` once the scenario is over.
    pub fn advance(&mut self) -> Option<TickReport> {
        if self.done {
            return None;
        }
        let now = self.clock.now();
        let mut applied = Vec::new();
        while self
            .steps
            .front()
            .is_some_and(|s| self.start_ms + s.at_ms <= now.as_millis())
        {
            if let Some(step) = self.steps.pop_front() {
                applied.push(self.apply(step.action));
            }
        }

        let frame = self.view.tick(now);
        let summary = self.view.snapshot().map(|s| FrameSummary::from_snapshot(&s));
        let events = self
            .view
            .drain_events()
            .into_iter()
            .map(|e| format!("{}: {}", e.kind, e.message))
            .collect();

        if frame.is_none() || now.as_millis() >= self.end_ms {
            self.done = true;
        } else {
            self.clock.advance(self.tick_ms);
        }
        Some(TickReport {
            frame_index: frame.map(|f| f.index),
            time_ms: now.as_millis(),
            applied,
            events,
            summary,
        })
    }

    fn apply(&mut self, action: Action) -> String {
        tracing::debug!(?action, "applying step");
        match action {
            Action::Props { props } => {
                let label = format!("props hour={} alerts={}", props.hour_index, props.alerts.len());
                self.view.update(props);
                label
            }
            Action::FlyTo { lat, lng, altitude_m } => {
                self.view.fly_to(lat, lng, altitude_m);
                format!("fly_to {lat},{lng}")
            }
            Action::ResetView => {
                self.view.reset_view();
                "reset_view".to_string()
            }
            Action::Spin => {
                self.view.spin();
                "spin".to_string()
            }
            Action::Search { place } => {
                let label = format!("search {}", place.name);
                self.view.select_search_result(place);
                label
            }
            Action::Locate { lat, lng } => {
                self.view.use_my_location(Ok(FocusLocation::new(lat, lng)));
                "locate".to_string()
            }
            Action::LocationDenied => {
                self.view.use_my_location(Err(GeolocationError::PermissionDenied));
                "location denied".to_string()
            }
            Action::Click { x, y } => {
                let hit = self
                    .view
                    .dispatch(ScreenEvent::at(ScreenSpaceEventType::LeftClick, x, y));
                format!("click {x},{y} handled={hit}")
            }
            Action::Unmount => {
                self.view.unmount();
                "unmount".to_string()
            }
        }
    }
}
