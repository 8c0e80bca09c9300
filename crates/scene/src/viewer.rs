use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foundation::math::Cartographic;
use serde::Serialize;

use crate::World;
use crate::camera::{Camera, HeadingPitchRoll, ScreenSpaceCameraController, Viewport};
use crate::imagery::ImageryLayerCollection;
use crate::input::{CursorStyle, ScreenEvent, ScreenSpaceEventHandler};

/// Which chrome widgets the host should build around the canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerOptions {
    pub geocoder: bool,
    pub timeline: bool,
    pub animation: bool,
    pub base_layer_picker: bool,
    pub scene_mode_picker: bool,
    pub selection_indicator: bool,
    pub info_box: bool,
    pub navigation_help_button: bool,
    pub fullscreen_button: bool,
    pub home_button: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            geocoder: true,
            timeline: true,
            animation: true,
            base_layer_picker: true,
            scene_mode_picker: true,
            selection_indicator: true,
            info_box: true,
            navigation_help_button: true,
            fullscreen_button: true,
            home_button: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Atmosphere {
    pub globe_lighting: bool,
    pub fog_enabled: bool,
    pub fog_density: f64,
    pub sky_atmosphere: bool,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            globe_lighting: false,
            fog_enabled: false,
            fog_density: 2.0e-4,
            sky_atmosphere: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TerrainState {
    /// Smooth WGS84 ellipsoid.
    Ellipsoid,
    Loading { url: String },
    Ready { url: String, max_level: u32 },
    /// Load failed; drawn as the ellipsoid.
    Failed { reason: String },
}

/// The live scene: entities, imagery, camera, input and terrain.
#[derive(Debug)]
pub struct Viewer {
    pub options: ViewerOptions,
    pub atmosphere: Atmosphere,
    pub world: World,
    pub imagery: ImageryLayerCollection,
    pub camera: Camera,
    pub controller: ScreenSpaceCameraController,
    pub handler: ScreenSpaceEventHandler,
    pub viewport: Viewport,
    pub cursor: CursorStyle,
    pub terrain: TerrainState,
    destroyed: bool,
}

/// Shared owner of the scene. Deferred work keeps a [`WeakSceneHandle`].
pub type SceneHandle = Rc<RefCell<Viewer>>;
pub type WeakSceneHandle = Weak<RefCell<Viewer>>;

impl Viewer {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            options,
            atmosphere: Atmosphere::default(),
            world: World::new(),
            imagery: ImageryLayerCollection::new(),
            camera: Camera::new(Cartographic::new(0.0, 0.0, 20_000_000.0), HeadingPitchRoll::TOP_DOWN),
            controller: ScreenSpaceCameraController::default(),
            handler: ScreenSpaceEventHandler::new(),
            viewport: Viewport::default(),
            cursor: CursorStyle::Default,
            terrain: TerrainState::Ellipsoid,
            destroyed: false,
        }
    }

    pub fn into_handle(self) -> SceneHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Releases everything the scene owns. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.handler.clear();
        self.world.clear();
        self.imagery.clear();
        self.camera.cancel_flight();
        self.terrain = TerrainState::Ellipsoid;
        self.destroyed = true;
        tracing::debug!("viewer destroyed");
    }
}

/// Runs `f` against the scene if it is still alive.
///
/// Returns `None` when the handle is dropped, the viewer is destroyed, or the
/// viewer is already borrowed (re-entrant call).
pub fn with_live<R>(handle: &WeakSceneHandle, f: impl FnOnce(&mut Viewer) -> R) -> Option<R> {
    let Some(strong) = handle.upgrade() else {
        tracing::debug!("scene handle dropped; skipping");
        return None;
    };
    let Ok(mut viewer) = strong.try_borrow_mut() else {
        tracing::debug!("scene busy; skipping");
        return None;
    };
    if viewer.is_destroyed() {
        tracing::debug!("scene destroyed; skipping");
        return None;
    }
    Some(f(&mut viewer))
}

/// Delivers a canvas event to the installed input action.
///
/// The action is cloned out first so it may borrow the scene itself.
pub fn dispatch_input(handle: &SceneHandle, event: ScreenEvent) -> bool {
    let action = {
        let Ok(viewer) = handle.try_borrow() else {
            return false;
        };
        if viewer.is_destroyed() {
            return false;
        }
        viewer.handler.action(event.kind)
    };
    match action {
        Some(action) => {
            action(&event);
            true
        }
        None => false,
    }
}
