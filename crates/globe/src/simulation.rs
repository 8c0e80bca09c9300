//! Flood-simulation overlay: extent polygons plus one raster layer per frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use formats::{FeatureCollection, SimulationControl, SimulationResponse};
use futures::future;
use futures::task::LocalSpawn;
use layers::symbology::ExtentStyle;
use layers::vector::add_flood_extent;
use runtime::spawn_detached;
use scene::imagery::{ImageryLayerId, ImageryProvider, LayerState};
use scene::tag::TagNamespace;
use scene::{Viewer, WeakSceneHandle, with_live};
use streaming::{Request, RequestTracker, SimulationSource};

use crate::error::GlobeError;

/// Opacity of simulation frame layers.
pub const FRAME_ALPHA: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
struct Session {
    id: String,
    request: Request,
    frame_index: usize,
    frames: Vec<ImageryLayerId>,
    loaded: bool,
}

#[derive(Debug, Default)]
struct BridgeState {
    requests: RequestTracker,
    session: Option<Session>,
}

/// Keeps the simulation overlay in step with [`SimulationControl`].
pub struct SimulationBridge {
    source: Rc<dyn SimulationSource>,
    style: ExtentStyle,
    state: Rc<RefCell<BridgeState>>,
}

impl std::fmt::Debug for SimulationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationBridge")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SimulationBridge {
    pub fn new(source: Rc<dyn SimulationSource>) -> Self {
        Self {
            source,
            style: ExtentStyle::default(),
            state: Rc::default(),
        }
    }

    pub fn active_session(&self) -> Option<String> {
        self.state.borrow().session.as_ref().map(|s| s.id.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().session.as_ref().is_some_and(|s| s.loaded)
    }

    pub fn frame_layers(&self) -> Vec<ImageryLayerId> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.frames.clone())
            .unwrap_or_default()
    }

    /// Reconciles the overlay with `control`.
    ///
    /// A new session tears the old one down and starts a fetch on `spawner`;
    /// the same session only switches the visible frame.
    pub fn sync(
        &mut self,
        viewer: &mut Viewer,
        scene: WeakSceneHandle,
        control: &SimulationControl,
        spawner: &dyn LocalSpawn,
    ) {
        let desired = control.active_session();
        let mut state = self.state.borrow_mut();

        if let Some(session) = state.session.as_mut()
            && Some(session.id.as_str()) == desired
        {
            if session.frame_index != control.frame_index {
                session.frame_index = control.frame_index;
                if session.loaded {
                    show_frame(viewer, &session.frames, control.frame_index);
                }
            }
            return;
        }

        teardown(viewer, &mut state);
        let Some(session_id) = desired else {
            return;
        };

        let request = state.requests.issue();
        state.session = Some(Session {
            id: session_id.to_string(),
            request,
            frame_index: control.frame_index,
            frames: Vec::new(),
            loaded: false,
        });
        drop(state);

        tracing::info!(session = session_id, "loading simulation overlay");
        let task = load_session(
            Rc::clone(&self.source),
            Rc::downgrade(&self.state),
            scene,
            session_id.to_string(),
            request,
            self.style,
        );
        spawn_detached(spawner, "simulation", task);
    }

    /// Removes the overlay and ignores any fetch still in flight.
    pub fn clear(&mut self, viewer: &mut Viewer) {
        teardown(viewer, &mut self.state.borrow_mut());
    }

    /// Forgets the session without touching the scene (unmount).
    pub fn abandon(&mut self) {
        let mut state = self.state.borrow_mut();
        state.requests.invalidate();
        state.session = None;
    }
}

fn teardown(viewer: &mut Viewer, state: &mut BridgeState) {
    state.requests.invalidate();
    let Some(session) = state.session.take() else {
        return;
    };
    for layer in &session.frames {
        viewer.imagery.remove(*layer);
    }
    let removed = viewer.world.remove_namespace(TagNamespace::FloodExtent);
    tracing::debug!(session = %session.id, frames = session.frames.len(), removed, "simulation overlay removed");
}

fn show_frame(viewer: &mut Viewer, frames: &[ImageryLayerId], index: usize) {
    if index >= frames.len() {
        tracing::debug!(index, frames = frames.len(), "simulation frame index out of range");
    }
    for (i, layer) in frames.iter().enumerate() {
        viewer.imagery.set_show(*layer, i == index);
    }
}

async fn fetch(
    source: &dyn SimulationSource,
    session_id: &str,
) -> Result<(FeatureCollection, SimulationResponse), GlobeError> {
    let (extent, frames) = future::join(source.flood_extent(session_id), source.frames(session_id)).await;
    Ok((extent?, frames?))
}

async fn load_session(
    source: Rc<dyn SimulationSource>,
    state: Weak<RefCell<BridgeState>>,
    scene: WeakSceneHandle,
    session_id: String,
    request: Request,
    style: ExtentStyle,
) {
    let fetched = fetch(source.as_ref(), &session_id).await;

    let Some(state) = state.upgrade() else {
        tracing::debug!(session = %session_id, "simulation bridge dropped; ignoring fetch");
        return;
    };
    let Ok(mut state) = state.try_borrow_mut() else {
        tracing::debug!(session = %session_id, "simulation state busy; ignoring fetch");
        return;
    };
    if !state.requests.is_current(request) {
        tracing::debug!(session = %session_id, "stale simulation fetch ignored");
        return;
    }
    let (extent, response) = match fetched {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(session = %session_id, %err, "simulation overlay unavailable");
            state.requests.invalidate();
            return;
        }
    };
    let Some(session) = state.session.as_mut() else {
        return;
    };

    let applied = with_live(&scene, |viewer| {
        add_flood_extent(&mut viewer.world, &extent, &session_id, style);
        let rectangle = response.bounds.to_rectangle();
        session.frames = response
            .frames
            .iter()
            .map(|frame| {
                let layer = viewer.imagery.add(
                    ImageryProvider::SingleTile {
                        url: frame.image_url.clone(),
                        rectangle,
                    },
                    FRAME_ALPHA,
                );
                viewer.imagery.set_state(layer, LayerState::Steady);
                layer
            })
            .collect();
        show_frame(viewer, &session.frames, session.frame_index);
        session.loaded = true;
    });
    match applied {
        Some(()) => tracing::info!(
            session = %session_id,
            frames = session.frames.len(),
            polygons = extent.len(),
            "simulation overlay ready"
        ),
        None => tracing::debug!(session = %session_id, "scene gone before simulation overlay landed"),
    }
}

#[cfg(test)]
mod tests {
    use super::SimulationBridge;
    use formats::SimulationControl;
    use futures::executor::LocalPool;
    use scene::tag::TagNamespace;
    use scene::{Viewer, ViewerOptions};
    use std::rc::Rc;
    use streaming::MockSimulationSource;

    fn control(active: bool, session: &str, frame: usize) -> SimulationControl {
        SimulationControl {
            is_active: active,
            frame_index: frame,
            session_id: Some(session.to_string()),
        }
    }

    fn visible_frames(viewer: &Viewer) -> usize {
        viewer.imagery.iter().filter(|l| l.show).count()
    }

    #[test]
    fn activation_loads_extent_and_frames() {
        let mut pool = LocalPool::new();
        let scene = Viewer::new(ViewerOptions::default()).into_handle();
        let mut bridge = SimulationBridge::new(Rc::new(MockSimulationSource::new()));

        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 2), &pool.spawner());
        assert!(!bridge.is_loaded());
        pool.run_until_stalled();

        assert!(bridge.is_loaded());
        let viewer = scene.borrow();
        assert_eq!(viewer.imagery.len(), 7);
        assert_eq!(visible_frames(&viewer), 1);
        assert!(viewer.imagery.get(bridge.frame_layers()[2]).unwrap().show);
        assert_eq!(viewer.world.tagged(TagNamespace::FloodExtent).len(), 2);
    }

    #[test]
    fn frame_change_switches_visibility_only() {
        let mut pool = LocalPool::new();
        let scene = Viewer::new(ViewerOptions::default()).into_handle();
        let mut bridge = SimulationBridge::new(Rc::new(MockSimulationSource::new()));
        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 0), &pool.spawner());
        pool.run_until_stalled();
        let layers = bridge.frame_layers();

        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 5), &pool.spawner());
        pool.run_until_stalled();
        let viewer = scene.borrow();
        assert_eq!(bridge.frame_layers(), layers);
        assert_eq!(visible_frames(&viewer), 1);
        assert!(viewer.imagery.get(layers[5]).unwrap().show);
    }

    #[test]
    fn deactivation_removes_everything() {
        let mut pool = LocalPool::new();
        let scene = Viewer::new(ViewerOptions::default()).into_handle();
        let mut bridge = SimulationBridge::new(Rc::new(MockSimulationSource::new()));
        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 0), &pool.spawner());
        pool.run_until_stalled();

        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(false, "s1", 0), &pool.spawner());
        let viewer = scene.borrow();
        assert!(viewer.imagery.is_empty());
        assert!(viewer.world.tagged(TagNamespace::FloodExtent).is_empty());
        assert_eq!(bridge.active_session(), None);
    }

    #[test]
    fn superseded_fetch_is_ignored() {
        let mut pool = LocalPool::new();
        let scene = Viewer::new(ViewerOptions::default()).into_handle();
        let mut bridge = SimulationBridge::new(Rc::new(MockSimulationSource::new()));
        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 0), &pool.spawner());
        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s2", 0), &pool.spawner());
        pool.run_until_stalled();

        let viewer = scene.borrow();
        assert_eq!(bridge.active_session().as_deref(), Some("s2"));
        assert_eq!(viewer.imagery.len(), 7);
        let sessions: Vec<_> = viewer
            .world
            .tagged(TagNamespace::FloodExtent)
            .into_iter()
            .filter_map(|e| viewer.world.tag(e).cloned())
            .collect();
        assert!(sessions.iter().all(|t| matches!(t, scene::tag::EntityTag::FloodExtent { session_id } if session_id == "s2")));
    }

    #[test]
    fn failed_fetch_suppresses_the_overlay() {
        let mut pool = LocalPool::new();
        let scene = Viewer::new(ViewerOptions::default()).into_handle();
        let mut bridge = SimulationBridge::new(Rc::new(MockSimulationSource::failing()));
        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 0), &pool.spawner());
        pool.run_until_stalled();
        assert!(!bridge.is_loaded());
        assert!(scene.borrow().imagery.is_empty());
    }

    #[test]
    fn destroyed_scene_ignores_late_completion() {
        let mut pool = LocalPool::new();
        let scene = Viewer::new(ViewerOptions::default()).into_handle();
        let mut bridge = SimulationBridge::new(Rc::new(MockSimulationSource::new()));
        bridge.sync(&mut scene.borrow_mut(), Rc::downgrade(&scene), &control(true, "s1", 0), &pool.spawner());
        scene.borrow_mut().destroy();
        pool.run_until_stalled();
        assert!(scene.borrow().imagery.is_empty());
        assert!(!bridge.is_loaded());
    }
}
