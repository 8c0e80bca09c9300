//! One-time scene construction: viewer chrome, camera limits, atmosphere,
//! input handlers, static vector layers and the best-effort terrain load.

use std::cell::RefCell;
use std::rc::Rc;

use foundation::math::Cartographic;
use foundation::time::Clock;
use formats::{Alert, assets};
use futures::task::LocalSpawn;
use layers::symbology::{BorderStyle, RiverStyle};
use layers::vector::{add_border, add_rivers};
use runtime::channel::Sender;
use runtime::spawn_detached;
use scene::camera::HeadingPitchRoll;
use scene::input::{CursorStyle, ScreenEvent, ScreenSpaceEventType};
use scene::picking::pick;
use scene::{SceneHandle, TerrainState, Viewer, ViewerOptions, WeakSceneHandle, with_live};
use streaming::TerrainSource;

use crate::alerts::AlertIndex;
use crate::config::GlobeConfig;
use crate::director::{ALERT_ALTITUDE_M, CameraIntent};

/// Host callback invoked with the full record of a clicked alert.
pub type AlertClickCallback = Rc<RefCell<Option<Box<dyn FnMut(&Alert)>>>>;

pub const FOG_DENSITY: f64 = 1.0e-4;
/// Wheel delta units per e-fold of camera height.
pub const WHEEL_ZOOM_SCALE: f64 = 500.0;
const WHEEL_MAX_EXPONENT: f64 = 20.0;

/// Height multiplier for a wheel delta; positive deltas zoom out.
pub fn wheel_zoom_factor(delta: f64) -> f64 {
    (delta / WHEEL_ZOOM_SCALE)
        .clamp(-WHEEL_MAX_EXPONENT, WHEEL_MAX_EXPONENT)
        .exp()
}

/// Viewer chrome: everything off except the home button.
pub fn viewer_options() -> ViewerOptions {
    ViewerOptions {
        geocoder: false,
        timeline: false,
        animation: false,
        base_layer_picker: false,
        scene_mode_picker: false,
        selection_indicator: false,
        info_box: false,
        navigation_help_button: false,
        fullscreen_button: false,
        home_button: true,
    }
}

pub struct SceneBootstrap {
    config: GlobeConfig,
    clock: Rc<dyn Clock>,
    intents: Sender<CameraIntent>,
    alerts: AlertIndex,
    on_alert_click: AlertClickCallback,
}

impl SceneBootstrap {
    /// Marker clicks are queued on `intents` like any other flight request.
    pub fn new(config: &GlobeConfig, clock: Rc<dyn Clock>, intents: Sender<CameraIntent>) -> Self {
        Self {
            config: config.clone(),
            clock,
            intents,
            alerts: AlertIndex::default(),
            on_alert_click: AlertClickCallback::default(),
        }
    }

    /// Alerts the click handler resolves picked markers against.
    pub fn with_alerts(mut self, alerts: AlertIndex) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_click_callback(mut self, callback: AlertClickCallback) -> Self {
        self.on_alert_click = callback;
        self
    }

    /// Creates the viewer. Call once per mount.
    pub fn build(&self) -> SceneHandle {
        let config = &self.config;
        let mut viewer = Viewer::new(viewer_options());

        viewer.controller.min_zoom_distance_m = config.min_zoom_distance_m;
        viewer.controller.max_zoom_distance_m = config.max_zoom_distance_m;
        viewer.controller.enable_collision_detection = true;

        viewer.atmosphere.globe_lighting = true;
        viewer.atmosphere.fog_enabled = true;
        viewer.atmosphere.fog_density = FOG_DENSITY;
        viewer.atmosphere.sky_atmosphere = true;

        let home = Cartographic::new(config.home.lng, config.home.lat, config.home.altitude_m);
        viewer.camera.set_view(home, HeadingPitchRoll::TOP_DOWN);
        viewer.cursor = CursorStyle::Grab;

        add_static_layers(&mut viewer, self.clock.now());

        let scene = viewer.into_handle();
        self.install_input(&scene);
        tracing::info!("scene bootstrapped");
        scene
    }

    fn install_input(&self, scene: &SceneHandle) {
        let mut viewer = scene.borrow_mut();

        let weak = Rc::downgrade(scene);
        viewer
            .handler
            .set_input_action(ScreenSpaceEventType::LeftDown, move |_| {
                with_live(&weak, |v| v.cursor = CursorStyle::Grabbing);
            });

        let weak = Rc::downgrade(scene);
        viewer
            .handler
            .set_input_action(ScreenSpaceEventType::LeftUp, move |_| {
                with_live(&weak, |v| v.cursor = CursorStyle::Grab);
            });

        let weak = Rc::downgrade(scene);
        viewer
            .handler
            .set_input_action(ScreenSpaceEventType::Wheel, move |event| {
                with_live(&weak, |v| {
                    let factor = wheel_zoom_factor(event.delta);
                    v.camera.zoom(factor, &v.controller);
                });
            });

        let weak = Rc::downgrade(scene);
        let clock = Rc::clone(&self.clock);
        let intents = self.intents.clone();
        let alerts = Rc::clone(&self.alerts);
        let callback = Rc::clone(&self.on_alert_click);
        viewer
            .handler
            .set_input_action(ScreenSpaceEventType::LeftClick, move |event| {
                on_left_click(&weak, clock.as_ref(), &intents, &alerts, &callback, event);
            });
    }
}

fn add_static_layers(viewer: &mut Viewer, epoch: foundation::time::Timestamp) {
    match assets::rivers() {
        Ok(rivers) => {
            let added = add_rivers(&mut viewer.world, &rivers, RiverStyle::default(), epoch);
            tracing::debug!(count = added.len(), "river polylines added");
        }
        Err(err) => tracing::warn!(%err, "river layer unavailable"),
    }
    match assets::state_boundary() {
        Ok(boundary) => {
            add_border(&mut viewer.world, &boundary, BorderStyle::default());
        }
        Err(err) => tracing::warn!(%err, "state border unavailable"),
    }
}

fn on_left_click(
    scene: &WeakSceneHandle,
    clock: &dyn Clock,
    intents: &Sender<CameraIntent>,
    alerts: &AlertIndex,
    callback: &AlertClickCallback,
    event: &ScreenEvent,
) {
    let now = clock.now();
    let picked = with_live(scene, |viewer| {
        let hit = pick(&viewer.world, &viewer.camera, viewer.viewport, event.x, event.y, now)?;
        viewer.world.tag(hit.entity)?.alert_id().map(str::to_string)
    })
    .flatten();
    let Some(alert_id) = picked else {
        return;
    };
    let Some(alert) = alerts.borrow().get(&alert_id).cloned() else {
        tracing::debug!(%alert_id, "picked marker has no alert record");
        return;
    };

    // The scene is not borrowed here, so the host may call back into the view.
    match callback.try_borrow_mut() {
        Ok(mut cb) => {
            if let Some(cb) = cb.as_mut() {
                cb(&alert);
            }
        }
        Err(_) => tracing::debug!("alert click callback re-entered; skipping"),
    }

    let seq = intents.publish(CameraIntent {
        lat: alert.lat,
        lng: alert.lng,
        altitude_m: ALERT_ALTITUDE_M,
        timestamp: now,
    });
    tracing::debug!(%alert_id, seq, "alert clicked");
}

/// Starts loading terrain in the background.
///
/// Failure leaves the globe on the ellipsoid; completion after teardown does nothing.
pub fn spawn_terrain_load(scene: WeakSceneHandle, source: Rc<dyn TerrainSource>, spawner: &dyn LocalSpawn) -> bool {
    let url = source.tileset_url();
    let started = with_live(&scene, |viewer| {
        viewer.terrain = TerrainState::Loading { url: url.clone() };
    });
    if started.is_none() {
        return false;
    }
    spawn_detached(spawner, "terrain", async move {
        let result = source.load_terrain().await;
        let outcome = with_live(&scene, |viewer| match result {
            Ok(loaded) => {
                tracing::info!(url = %loaded.url, max_level = loaded.tileset.zoom_max, "terrain ready");
                viewer.terrain = loaded.tileset.ready_state(&loaded.url);
            }
            Err(err) => {
                tracing::warn!(%url, %err, "terrain unavailable; staying on ellipsoid");
                viewer.terrain = TerrainState::Failed { reason: err.to_string() };
            }
        });
        if outcome.is_none() {
            tracing::debug!("terrain load finished after teardown");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertController;
    use crate::director::CameraDirector;
    use foundation::time::ManualClock;
    use formats::Severity;
    use futures::executor::LocalPool;
    use futures::future::{LocalBoxFuture, ready};
    use layers::terrain::TerrainTileset;
    use scene::dispatch_input;
    use scene::tag::TagNamespace;
    use streaming::{LoadedTerrain, SourceError};

    struct StaticTerrain(Option<&'static str>);

    impl TerrainSource for StaticTerrain {
        fn tileset_url(&self) -> String {
            "http://terrain/tileset.json".to_string()
        }

        fn load_terrain(&self) -> LocalBoxFuture<'_, Result<LoadedTerrain, SourceError>> {
            let result = match self.0 {
                Some(raw) => serde_json::from_str::<TerrainTileset>(raw)
                    .map(|tileset| LoadedTerrain {
                        url: self.tileset_url(),
                        tileset,
                    })
                    .map_err(|e| SourceError::Decode {
                        what: "terrain tileset",
                        reason: e.to_string(),
                    }),
                None => Err(SourceError::NotFound("tileset".to_string())),
            };
            Box::pin(ready(result))
        }
    }

    const TILESET: &str = r#"{"version": 1, "tile_size": 256, "zoom_min": 0, "zoom_max": 9,
        "tile_path_template": "tiles/{z}/{x}/{y}.bin", "min_lon": -180, "max_lon": 180,
        "min_lat": -90, "max_lat": 90, "min_height": -500, "max_height": 9000}"#;

    fn clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(0.0))
    }

    fn bootstrap(director: &CameraDirector) -> SceneBootstrap {
        SceneBootstrap::new(&GlobeConfig::default(), clock(), director.intents())
    }

    fn wheel(delta: f64) -> ScreenEvent {
        ScreenEvent {
            delta,
            ..ScreenEvent::at(ScreenSpaceEventType::Wheel, 400.0, 300.0)
        }
    }

    fn director() -> CameraDirector {
        CameraDirector::new(&GlobeConfig::default())
    }

    #[test]
    fn builds_configured_viewer() {
        let scene = bootstrap(&director()).build();
        let viewer = scene.borrow();
        assert!(!viewer.options.geocoder && !viewer.options.fullscreen_button);
        assert!(viewer.options.home_button);
        assert_eq!(viewer.controller.min_zoom_distance_m, 1_000.0);
        assert_eq!(viewer.controller.max_zoom_distance_m, 20_000_000.0);
        assert!(viewer.controller.enable_collision_detection);
        assert_eq!(viewer.atmosphere.fog_density, 1.0e-4);
        assert!(viewer.atmosphere.globe_lighting && viewer.atmosphere.sky_atmosphere);
        assert_eq!(viewer.camera.orientation(), HeadingPitchRoll::TOP_DOWN);
        assert!((viewer.camera.position().height_m - 7_000_000.0).abs() < 1e-6);
        assert_eq!(viewer.handler.len(), 4);
        assert!(!viewer.world.tagged(TagNamespace::Rivers).is_empty());
        assert_eq!(viewer.world.tagged(TagNamespace::Borders).len(), 1);
    }

    #[test]
    fn drag_updates_the_cursor() {
        let scene = bootstrap(&director()).build();
        dispatch_input(&scene, ScreenEvent::at(ScreenSpaceEventType::LeftDown, 10.0, 10.0));
        assert_eq!(scene.borrow().cursor, CursorStyle::Grabbing);
        dispatch_input(&scene, ScreenEvent::at(ScreenSpaceEventType::LeftUp, 10.0, 10.0));
        assert_eq!(scene.borrow().cursor, CursorStyle::Grab);
    }

    #[test]
    fn wheel_zoom_stops_at_the_configured_limits() {
        let scene = bootstrap(&director()).build();
        let height = || scene.borrow().camera.position().height_m;

        assert!(dispatch_input(&scene, wheel(1.0e6)));
        assert_eq!(height(), 20_000_000.0);

        dispatch_input(&scene, wheel(-1.0e6));
        assert_eq!(height(), 1_000.0);

        dispatch_input(&scene, wheel(WHEEL_ZOOM_SCALE));
        assert!((height() - 1_000.0 * std::f64::consts::E).abs() < 1e-6);

        dispatch_input(&scene, wheel(f64::NAN));
        assert!(height().is_finite());
    }

    #[test]
    fn clicking_a_marker_reports_the_alert_and_flies_to_it() {
        let index = AlertIndex::default();
        let clicked: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&clicked);
        let callback: AlertClickCallback = Rc::new(RefCell::new(Some(Box::new(move |alert: &Alert| {
            sink.borrow_mut().push(alert.id.clone());
        }))));
        let mut director = director();
        let scene = bootstrap(&director)
            .with_alerts(Rc::clone(&index))
            .with_click_callback(callback)
            .build();

        let mut controller = AlertController::new(index);
        let alert = Alert::new("7", 22.5937, 78.9629, "Centre", Severity::Moderate);
        controller.sync(&mut scene.borrow_mut().world, &[alert]);

        let (cx, cy) = {
            let v = scene.borrow();
            (v.viewport.width_px * 0.5, v.viewport.height_px * 0.5)
        };
        assert!(dispatch_input(&scene, ScreenEvent::at(ScreenSpaceEventType::LeftClick, cx, cy)));
        assert_eq!(*clicked.borrow(), vec!["7".to_string()]);
        assert_eq!(director.pending(), 1);
        assert!(scene.borrow().camera.flight_destination().is_none());

        let mut animations = runtime::Animations::new();
        director.tick(&mut scene.borrow_mut(), &mut animations, foundation::time::Timestamp::from_millis(0.0));
        let dest = scene.borrow().camera.flight_destination().unwrap();
        assert!((dest.height_m - ALERT_ALTITUDE_M).abs() < 1e-6);

        dispatch_input(&scene, ScreenEvent::at(ScreenSpaceEventType::LeftClick, 1.0, 1.0));
        assert_eq!(clicked.borrow().len(), 1);
        assert_eq!(director.pending(), 0);
    }

    #[test]
    fn terrain_load_success_and_failure() {
        let mut pool = LocalPool::new();
        let scene = bootstrap(&director()).build();
        assert!(spawn_terrain_load(Rc::downgrade(&scene), Rc::new(StaticTerrain(Some(TILESET))), &pool.spawner()));
        assert!(matches!(scene.borrow().terrain, TerrainState::Loading { .. }));
        pool.run_until_stalled();
        assert!(matches!(scene.borrow().terrain, TerrainState::Ready { max_level: 9, .. }));

        let scene = bootstrap(&director()).build();
        spawn_terrain_load(Rc::downgrade(&scene), Rc::new(StaticTerrain(None)), &pool.spawner());
        pool.run_until_stalled();
        assert!(matches!(scene.borrow().terrain, TerrainState::Failed { .. }));
    }

    #[test]
    fn terrain_completion_after_teardown_is_ignored() {
        let mut pool = LocalPool::new();
        let scene = bootstrap(&director()).build();
        spawn_terrain_load(Rc::downgrade(&scene), Rc::new(StaticTerrain(Some(TILESET))), &pool.spawner());
        scene.borrow_mut().destroy();
        pool.run_until_stalled();
        assert_eq!(scene.borrow().terrain, TerrainState::Ellipsoid);
    }
}
