//! Browser host: exposes the globe to JavaScript as `FloodGlobe`.
//!
//! The page owns the render loop and calls [`FloodGlobe::tick`] from
//! `requestAnimationFrame`; every tick returns the evaluated scene as JSON.

use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use foundation::time::{Clock, ManualClock};
use formats::{Alert, FocusLocation, SimulationControl};
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use globe::{GeolocationError, GlobeConfig, GlobeProps, GlobeServices, GlobeView};
use recents::RecentSearch;
use scene::camera::Viewport;
use scene::input::{ScreenEvent, ScreenSpaceEventType};
use scene::with_live;
use serde::de::DeserializeOwned;
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    console_error_panic_hook::set_once();
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .try_init();
    Ok(())
}

/// Sends each formatted log line to `console.log`.
struct ConsoleMakeWriter;

struct ConsoleWriter(Vec<u8>);

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.0);
        web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter(Vec::new())
    }
}

/// Runs detached tasks on the browser microtask queue.
struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        spawn_local(future);
        Ok(())
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T, JsValue> {
    serde_json::from_str(raw).map_err(|e| JsValue::from_str(&format!("invalid {what}: {e}")))
}

#[wasm_bindgen]
pub struct FloodGlobe {
    view: GlobeView,
    clock: Rc<ManualClock>,
    props: GlobeProps,
}

/// Persists recent searches in `localStorage`, falling back to memory.
#[cfg(target_arch = "wasm32")]
fn with_browser_recents(services: GlobeServices) -> GlobeServices {
    use recents::{DEFAULT_STORAGE_KEY, LocalStorageRecentsStore};

    match LocalStorageRecentsStore::new(DEFAULT_STORAGE_KEY) {
        Ok(store) => services.with_recents(Box::new(store)),
        Err(err) => {
            tracing::warn!(%err, "recent searches will not persist");
            services
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn with_browser_recents(services: GlobeServices) -> GlobeServices {
    services
}

#[wasm_bindgen]
impl FloodGlobe {
    /// Mounts the globe. `now_ms` is on the same timeline later passed to
    /// [`FloodGlobe::tick`]; `config_json` is an optional `GlobeConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(now_ms: f64, config_json: Option<String>) -> Result<FloodGlobe, JsValue> {
        let config = match config_json.as_deref() {
            Some(raw) => GlobeConfig::from_json_str(raw).map_err(to_js)?,
            None => GlobeConfig::default(),
        };
        let clock = Rc::new(ManualClock::new(now_ms));
        let services = GlobeServices::from_config(&config, clock.clone(), Rc::new(BrowserSpawner)).map_err(to_js)?;
        let services = with_browser_recents(services);
        tracing::info!("flood globe mounted");
        Ok(FloodGlobe {
            view: GlobeView::mount(config, services),
            clock,
            props: GlobeProps::default(),
        })
    }

    /// Replaces every prop at once from a camelCase JSON object.
    pub fn set_props(&mut self, json: &str) -> Result<(), JsValue> {
        self.props = parse("props", json)?;
        self.apply();
        Ok(())
    }

    pub fn set_alerts(&mut self, json: &str) -> Result<(), JsValue> {
        self.props.alerts = parse::<Vec<Alert>>("alerts", json)?;
        self.apply();
        Ok(())
    }

    pub fn set_hour_index(&mut self, hour_index: i32) {
        self.props.hour_index = i64::from(hour_index);
        self.apply();
    }

    pub fn set_imagery_template(&mut self, template: Option<String>) {
        self.props.imagery_template = template;
        self.apply();
    }

    pub fn set_focus_location(&mut self, json: Option<String>) -> Result<(), JsValue> {
        self.props.focus_location = match json.as_deref() {
            Some(raw) => Some(parse::<FocusLocation>("focus location", raw)?),
            None => None,
        };
        self.apply();
        Ok(())
    }

    pub fn set_simulation(&mut self, json: &str) -> Result<(), JsValue> {
        self.props.simulation = parse::<SimulationControl>("simulation control", json)?;
        self.apply();
        Ok(())
    }

    /// `callback` receives the clicked alert as a plain object. It runs on a
    /// later microtask so it may call back into this globe.
    pub fn set_on_alert_click(&mut self, callback: js_sys::Function) {
        self.view.set_on_alert_click(move |alert: &Alert| {
            let payload = match serde_json::to_string(alert) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(%err, "cannot encode clicked alert");
                    return;
                }
            };
            let callback = callback.clone();
            spawn_local(async move {
                let arg = js_sys::JSON::parse(&payload).unwrap_or(JsValue::NULL);
                if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
                    tracing::warn!(?err, "alert click callback threw");
                }
            });
        });
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64) -> Result<(), JsValue> {
        if !(width_px.is_finite() && height_px.is_finite() && width_px > 0.0 && height_px > 0.0) {
            return Err(JsValue::from_str("resize args must be finite and positive"));
        }
        if let Some(scene) = self.view.scene_handle() {
            with_live(&scene, |viewer| {
                viewer.viewport = Viewport {
                    width_px,
                    height_px,
                };
            });
        }
        Ok(())
    }

    pub fn pointer_down(&self, x_px: f64, y_px: f64) -> bool {
        self.pointer(ScreenSpaceEventType::LeftDown, x_px, y_px, 0.0)
    }

    pub fn pointer_up(&self, x_px: f64, y_px: f64) -> bool {
        self.pointer(ScreenSpaceEventType::LeftUp, x_px, y_px, 0.0)
    }

    pub fn click(&self, x_px: f64, y_px: f64) -> bool {
        self.pointer(ScreenSpaceEventType::LeftClick, x_px, y_px, 0.0)
    }

    pub fn wheel(&self, x_px: f64, y_px: f64, delta_y: f64) -> bool {
        self.pointer(ScreenSpaceEventType::Wheel, x_px, y_px, delta_y)
    }

    /// Advances to `now_ms` and returns the scene snapshot as JSON, or
    /// `undefined` once destroyed.
    pub fn tick(&mut self, now_ms: f64) -> Result<Option<String>, JsValue> {
        if !now_ms.is_finite() {
            return Err(JsValue::from_str("now_ms must be finite"));
        }
        self.clock.set(now_ms);
        if self.view.tick(self.clock.now()).is_none() {
            return Ok(None);
        }
        match self.view.snapshot() {
            Some(snapshot) => serde_json::to_string(&snapshot).map(Some).map_err(to_js),
            None => Ok(None),
        }
    }

    pub fn reset_view(&mut self) {
        self.view.reset_view();
    }

    pub fn spin(&mut self) {
        self.view.spin();
    }

    pub fn fly_to(&mut self, lat: f64, lng: f64, altitude_m: f64) -> bool {
        self.view.fly_to(lat, lng, altitude_m).is_some()
    }

    /// `json` is `{id, name, lat, lng}` from the geocoder.
    pub fn select_search_result(&mut self, json: &str) -> Result<(), JsValue> {
        let place = parse::<RecentSearch>("search result", json)?;
        self.view.select_search_result(place);
        Ok(())
    }

    pub fn use_my_location(&mut self, lat: f64, lng: f64) {
        self.view.use_my_location(Ok(FocusLocation::new(lat, lng)));
    }

    /// Reports a `GeolocationPositionError` code.
    pub fn location_failed(&mut self, code: u16) {
        let err = match code {
            1 => GeolocationError::PermissionDenied,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unavailable,
        };
        self.view.use_my_location(Err(err));
    }

    pub fn notice(&self) -> Option<String> {
        self.view.notice().map(str::to_string)
    }

    pub fn dismiss_notice(&mut self) {
        self.view.dismiss_notice();
    }

    /// Recent searches, newest first, as a JSON array.
    pub fn recents(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.view.recents()).map_err(to_js)
    }

    pub fn drain_events(&mut self) -> Vec<String> {
        self.view
            .drain_events()
            .into_iter()
            .map(|e| format!("[{}] {}: {}", e.frame_index, e.kind, e.message))
            .collect()
    }

    /// Tears the scene down. Later calls are no-ops.
    pub fn destroy(&mut self) {
        self.view.unmount();
    }
}

impl FloodGlobe {
    fn apply(&mut self) {
        self.view.update(self.props.clone());
    }

    fn pointer(&self, kind: ScreenSpaceEventType, x_px: f64, y_px: f64, delta: f64) -> bool {
        if !(x_px.is_finite() && y_px.is_finite() && delta.is_finite()) {
            return false;
        }
        self.view.dispatch(ScreenEvent {
            kind,
            x: x_px,
            y: y_px,
            delta,
        })
    }
}
