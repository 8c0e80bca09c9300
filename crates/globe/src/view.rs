//! The host-facing component: mount once, patch on every props change.

use std::rc::Rc;
use std::time::Duration;

use foundation::time::{Clock, Timestamp};
use formats::{Alert, FocusLocation};
use futures::task::LocalSpawn;
use recents::{InMemoryRecentsStore, RecentSearch, RecentSearches, RecentsStore};
use runtime::{Animations, Event, EventBus, Frame};
use scene::input::ScreenEvent;
use scene::snapshot::SceneSnapshot;
use scene::{SceneHandle, Viewer, WeakSceneHandle, dispatch_input, with_live};
use streaming::{HttpSource, MockSimulationSource, SimulationSource, TerrainSource};

use crate::alerts::{AlertController, AlertIndex};
use crate::bootstrap::{AlertClickCallback, SceneBootstrap, spawn_terrain_load};
use crate::config::GlobeConfig;
use crate::director::{CameraDirector, LOCAL_ALTITUDE_M, REGIONAL_ALTITUDE_M};
use crate::error::{GeolocationError, GlobeError};
use crate::overlay::{FadeStatus, TemporalOverlay};
use crate::props::GlobeProps;
use crate::simulation::SimulationBridge;

pub const LOCATION_DENIED_NOTICE: &str = "Could not access your location. Please check permissions.";

/// Collaborators the view needs from its host.
pub struct GlobeServices {
    pub clock: Rc<dyn Clock>,
    pub spawner: Rc<dyn LocalSpawn>,
    pub simulation: Rc<dyn SimulationSource>,
    pub terrain: Option<Rc<dyn TerrainSource>>,
    pub recents: Box<dyn RecentsStore>,
}

impl GlobeServices {
    /// Mock simulation data, no terrain, recents kept in memory.
    pub fn offline(clock: Rc<dyn Clock>, spawner: Rc<dyn LocalSpawn>) -> Self {
        Self {
            clock,
            spawner,
            simulation: Rc::new(MockSimulationSource::new()),
            terrain: None,
            recents: Box::new(InMemoryRecentsStore::new()),
        }
    }

    /// HTTP sources when `api_base_url` is set, otherwise [`Self::offline`].
    pub fn from_config(
        config: &GlobeConfig,
        clock: Rc<dyn Clock>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Result<Self, GlobeError> {
        let Some(base) = config.api_base_url.as_deref() else {
            return Ok(Self::offline(clock, spawner));
        };
        let http = Rc::new(HttpSource::new(base, Duration::from_millis(config.request_timeout_ms))?);
        Ok(Self {
            clock,
            spawner,
            simulation: http.clone(),
            terrain: config.terrain_enabled.then(|| http as Rc<dyn TerrainSource>),
            recents: Box::new(InMemoryRecentsStore::new()),
        })
    }

    pub fn with_recents(mut self, store: Box<dyn RecentsStore>) -> Self {
        self.recents = store;
        self
    }
}

pub struct GlobeView {
    config: GlobeConfig,
    clock: Rc<dyn Clock>,
    spawner: Rc<dyn LocalSpawn>,
    scene: Option<SceneHandle>,
    animations: Animations,
    overlay: TemporalOverlay,
    alerts: AlertController,
    director: CameraDirector,
    simulation: SimulationBridge,
    recents: RecentSearches<Box<dyn RecentsStore>>,
    on_alert_click: AlertClickCallback,
    props: Option<GlobeProps>,
    notice: Option<String>,
    frame: Option<Frame>,
    events: EventBus,
}

impl GlobeView {
    /// Builds the scene and starts the terrain load.
    pub fn mount(config: GlobeConfig, services: GlobeServices) -> Self {
        let index = AlertIndex::default();
        let on_alert_click = AlertClickCallback::default();
        let director = CameraDirector::new(&config);
        let scene = SceneBootstrap::new(&config, Rc::clone(&services.clock), director.intents())
            .with_alerts(Rc::clone(&index))
            .with_click_callback(Rc::clone(&on_alert_click))
            .build();

        if let Some(terrain) = services.terrain {
            spawn_terrain_load(Rc::downgrade(&scene), terrain, services.spawner.as_ref());
        }

        Self {
            overlay: TemporalOverlay::new(&config),
            director,
            alerts: AlertController::new(index),
            simulation: SimulationBridge::new(services.simulation),
            recents: RecentSearches::open(services.recents),
            clock: services.clock,
            spawner: services.spawner,
            scene: Some(scene),
            animations: Animations::new(),
            on_alert_click,
            props: None,
            notice: None,
            frame: None,
            events: EventBus::new(),
            config,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.is_some()
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    /// A weak handle for observers; never keeps the scene alive.
    pub fn scene_handle(&self) -> Option<WeakSceneHandle> {
        self.scene.as_ref().map(Rc::downgrade)
    }

    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    pub fn overlay(&self) -> &TemporalOverlay {
        &self.overlay
    }

    pub fn simulation(&self) -> &SimulationBridge {
        &self.simulation
    }

    pub fn set_on_alert_click(&mut self, callback: impl FnMut(&Alert) + 'static) {
        match self.on_alert_click.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(callback)),
            Err(_) => tracing::warn!("cannot replace the alert click callback while it runs"),
        }
    }

    /// Reconciles every controller with `props`.
    pub fn update(&mut self, props: GlobeProps) {
        let Some(scene) = self.scene_handle() else {
            tracing::debug!("update after unmount ignored");
            return;
        };
        let now = self.clock.now();
        let template = props
            .imagery_template
            .clone()
            .or_else(|| self.config.imagery_template.clone());
        let frame = self.frame.unwrap_or_else(|| Frame::first(now));

        let applied = with_live(&scene, |viewer| {
            if self.alerts.sync(&mut viewer.world, &props.alerts) {
                self.events.emit(frame, "alerts", format!("{} alerts", props.alerts.len()));
            }
            match self
                .overlay
                .show_hour(viewer, &mut self.animations, props.hour_index, template.as_deref(), now)
            {
                Ok(true) => self.events.emit(frame, "crossfade.start", format!("hour {}", props.hour_index)),
                Ok(false) => {}
                Err(err) => tracing::warn!(%err, hour = props.hour_index, "keeping current imagery"),
            }
            self.simulation
                .sync(viewer, scene.clone(), &props.simulation, self.spawner.as_ref());
        });
        if applied.is_none() {
            return;
        }
        if self.director.focus(props.focus_location, now).is_some() {
            self.events.emit(frame, "intent", "focus location");
        }
        self.props = Some(props);
    }

    /// Advances animations to `now` and applies queued camera intents.
    pub fn tick(&mut self, now: Timestamp) -> Option<Frame> {
        let scene = self.scene_handle()?;
        let frame = match self.frame {
            Some(prev) => prev.next(now),
            None => Frame::first(now),
        };
        let fade = with_live(&scene, |viewer| {
            let fade = self.overlay.tick(viewer, &mut self.animations, now);
            self.director.tick(viewer, &mut self.animations, now);
            fade
        })?;
        if fade == FadeStatus::Settled {
            self.events.emit(frame, "crossfade.settled", "overlay steady");
        }
        self.frame = Some(frame);
        Some(frame)
    }

    /// Evaluates the scene at the current clock time.
    pub fn snapshot(&self) -> Option<SceneSnapshot> {
        self.snapshot_at(self.clock.now())
    }

    pub fn snapshot_at(&self, time: Timestamp) -> Option<SceneSnapshot> {
        let scene = self.scene.as_ref()?;
        let viewer = scene.try_borrow().ok()?;
        (!viewer.is_destroyed()).then(|| viewer.snapshot(time))
    }

    /// Forwards a canvas event to the scene's input handlers.
    pub fn dispatch(&self, event: ScreenEvent) -> bool {
        self.scene.as_ref().is_some_and(|scene| dispatch_input(scene, event))
    }

    pub fn reset_view(&mut self) {
        let now = self.clock.now();
        self.with_scene(|view, viewer| view.director.reset_view(viewer, &mut view.animations, now));
    }

    pub fn spin(&mut self) {
        let now = self.clock.now();
        let started = self.with_scene(|view, viewer| view.director.spin(viewer, &mut view.animations, now));
        if started.is_some() {
            self.emit("spin", "started");
        }
    }

    /// Queues a flight. Returns its sequence number, or `None` after unmount.
    pub fn fly_to(&mut self, lat: f64, lng: f64, altitude_m: f64) -> Option<u64> {
        if !self.is_mounted() {
            return None;
        }
        let seq = self.director.fly_to(lat, lng, altitude_m, self.clock.now());
        self.emit("intent", format!("fly to {lat:.4},{lng:.4} @ {altitude_m:.0} m"));
        Some(seq)
    }

    /// Remembers `place` and flies to it.
    pub fn select_search_result(&mut self, place: RecentSearch) {
        if !self.is_mounted() {
            return;
        }
        let (lat, lng) = (place.lat, place.lng);
        if let Err(err) = self.recents.record(place) {
            tracing::debug!(%err, "search result flown to without saving");
        }
        self.fly_to(lat, lng, REGIONAL_ALTITUDE_M);
    }

    /// Flies to the device position, or raises a notice if it was refused.
    pub fn use_my_location(&mut self, position: Result<FocusLocation, GeolocationError>) {
        if !self.is_mounted() {
            return;
        }
        match position {
            Ok(here) if here.is_finite() => {
                self.fly_to(here.lat, here.lng, LOCAL_ALTITUDE_M);
            }
            Ok(here) => tracing::warn!(?here, "ignoring non-finite device position"),
            Err(err) => {
                tracing::warn!(%err, "geolocation failed");
                self.notice = Some(LOCATION_DENIED_NOTICE.to_string());
            }
        }
    }

    /// A blocking message the host should show, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn recents(&self) -> &[RecentSearch] {
        self.recents.entries()
    }

    pub fn props(&self) -> Option<&GlobeProps> {
        self.props.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Cancels every animation and destroys the scene. Idempotent.
    pub fn unmount(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        self.overlay.cancel(&mut self.animations);
        self.director.cancel_spin(&mut self.animations);
        let cancelled = self.animations.cancel_all();
        self.simulation.abandon();
        match scene.try_borrow_mut() {
            Ok(mut viewer) => viewer.destroy(),
            Err(_) => tracing::warn!("scene borrowed during unmount; dropping the handle"),
        }
        tracing::info!(cancelled, "globe unmounted");
    }

    fn with_scene<R>(&mut self, f: impl FnOnce(&mut Self, &mut Viewer) -> R) -> Option<R> {
        let scene = self.scene.clone()?;
        let mut viewer = scene.try_borrow_mut().ok()?;
        if viewer.is_destroyed() {
            return None;
        }
        Some(f(self, &mut viewer))
    }

    fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        let frame = self.frame.unwrap_or_else(|| Frame::first(self.clock.now()));
        self.events.emit(frame, kind, message);
    }
}

impl Drop for GlobeView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::time::ManualClock;
    use futures::executor::LocalPool;
    use recents::RecentsError;

    fn mount(pool: &LocalPool) -> (GlobeView, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(0.0));
        let services = GlobeServices::offline(clock.clone(), Rc::new(pool.spawner()));
        (GlobeView::mount(GlobeConfig::default(), services), clock)
    }

    struct BrokenStore;

    impl RecentsStore for BrokenStore {
        fn load(&self) -> Result<Vec<RecentSearch>, RecentsError> {
            Err(RecentsError::StorageUnavailable)
        }

        fn save(&mut self, _entries: &[RecentSearch]) -> Result<(), RecentsError> {
            Err(RecentsError::StorageUnavailable)
        }
    }

    #[test]
    fn search_selection_records_and_flies() {
        let pool = LocalPool::new();
        let (mut view, clock) = mount(&pool);
        view.select_search_result(RecentSearch::new("1", "Kolkata", 22.57, 88.36));
        view.select_search_result(RecentSearch::new("2", "Howrah", 22.59, 88.31));
        assert_eq!(view.recents()[0].name, "Howrah");

        view.tick(clock.advance(16.0));
        let handle = view.scene_handle().unwrap().upgrade().unwrap();
        let dest = handle.borrow().camera.flight_destination().unwrap();
        assert!((dest.height_m - REGIONAL_ALTITUDE_M).abs() < 1e-6);
        assert!((dest.lat_deg - 22.59).abs() < 1e-9);
    }

    #[test]
    fn broken_recents_store_does_not_block_the_flight() {
        let pool = LocalPool::new();
        let clock = Rc::new(ManualClock::new(0.0));
        let services =
            GlobeServices::offline(clock.clone(), Rc::new(pool.spawner())).with_recents(Box::new(BrokenStore));
        let mut view = GlobeView::mount(GlobeConfig::default(), services);
        view.select_search_result(RecentSearch::new("1", "Kolkata", 22.57, 88.36));
        assert_eq!(view.recents().len(), 1);
        view.tick(clock.advance(16.0));
        let handle = view.scene_handle().unwrap().upgrade().unwrap();
        assert!(handle.borrow().camera.is_flying());
    }

    #[test]
    fn location_denial_raises_a_notice_without_moving() {
        let pool = LocalPool::new();
        let (mut view, clock) = mount(&pool);
        view.use_my_location(Err(GeolocationError::PermissionDenied));
        assert_eq!(view.notice(), Some(LOCATION_DENIED_NOTICE));
        view.tick(clock.advance(16.0));
        let handle = view.scene_handle().unwrap().upgrade().unwrap();
        assert!(!handle.borrow().camera.is_flying());

        view.dismiss_notice();
        view.use_my_location(Ok(FocusLocation::new(22.57, 88.36)));
        view.tick(clock.advance(16.0));
        let dest = handle.borrow().camera.flight_destination().unwrap();
        assert!((dest.height_m - LOCAL_ALTITUDE_M).abs() < 1e-6);
        assert_eq!(view.notice(), None);
    }

    #[test]
    fn unmount_is_idempotent_and_silences_the_view() {
        let pool = LocalPool::new();
        let (mut view, clock) = mount(&pool);
        let weak = view.scene_handle().unwrap();
        view.unmount();
        view.unmount();
        assert!(!view.is_mounted());
        assert!(weak.upgrade().is_none());
        assert_eq!(view.tick(clock.advance(16.0)), None);
        assert_eq!(view.fly_to(0.0, 0.0, 1.0), None);
        assert!(view.snapshot().is_none());
        view.update(GlobeProps::default());
        view.spin();
        view.reset_view();
    }

    #[test]
    fn events_record_lifecycle() {
        let pool = LocalPool::new();
        let (mut view, clock) = mount(&pool);
        view.update(GlobeProps {
            hour_index: 4,
            imagery_template: Some("https://frames/{hour}.png".into()),
            ..Default::default()
        });
        view.tick(clock.advance(900.0));
        let kinds: Vec<&str> = view.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec!["crossfade.start", "crossfade.settled"]);
    }
}
