use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenSpaceEventType {
    LeftDown,
    LeftUp,
    LeftClick,
    Wheel,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenEvent {
    pub kind: ScreenSpaceEventType,
    pub x: f64,
    pub y: f64,
    /// Wheel delta; positive zooms out.
    #[serde(default)]
    pub delta: f64,
}

impl ScreenEvent {
    pub fn at(kind: ScreenSpaceEventType, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            delta: 0.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorStyle {
    #[default]
    Default,
    Grab,
    Grabbing,
}

pub type InputAction = Rc<dyn Fn(&ScreenEvent)>;

/// One action per event type, like a canvas event handler.
#[derive(Default)]
pub struct ScreenSpaceEventHandler {
    actions: BTreeMap<ScreenSpaceEventType, InputAction>,
}

impl ScreenSpaceEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `action` for `kind`, replacing any previous one.
    pub fn set_input_action(&mut self, kind: ScreenSpaceEventType, action: impl Fn(&ScreenEvent) + 'static) {
        self.actions.insert(kind, Rc::new(action));
    }

    pub fn remove_input_action(&mut self, kind: ScreenSpaceEventType) -> bool {
        self.actions.remove(&kind).is_some()
    }

    /// The action for `kind`, cloned out so it can run without borrowing the handler.
    pub fn action(&self, kind: ScreenSpaceEventType) -> Option<InputAction> {
        self.actions.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl fmt::Debug for ScreenSpaceEventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenSpaceEventHandler")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
