use foundation::handles::{Handle, HandleAllocator};
use foundation::math::Rectangle;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ImageryLayerId(pub Handle);

impl std::fmt::Display for ImageryLayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}v{}", self.0.index(), self.0.generation())
    }
}

/// Where a layer's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageryProvider {
    /// One image stretched over `rectangle`; `url` may be a data URI.
    SingleTile { url: String, rectangle: Rectangle },
    /// Web-mercator tiles addressed by `{x}`/`{y}`/`{z}` style tokens.
    UrlTemplate { template: String, rectangle: Rectangle },
}

impl ImageryProvider {
    pub fn url(&self) -> &str {
        match self {
            ImageryProvider::SingleTile { url, .. } => url,
            ImageryProvider::UrlTemplate { template, .. } => template,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerState {
    Pending,
    FadingIn,
    Steady,
    FadingOut,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageryLayer {
    id: ImageryLayerId,
    pub provider: ImageryProvider,
    pub alpha: f64,
    pub show: bool,
    pub state: LayerState,
}

impl ImageryLayer {
    pub fn id(&self) -> ImageryLayerId {
        self.id
    }
}

/// Ordered layer stack; later layers draw on top.
#[derive(Debug, Default)]
pub struct ImageryLayerCollection {
    alloc: HandleAllocator,
    layers: Vec<ImageryLayer>,
}

impl ImageryLayerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a layer on top of the stack.
    pub fn add(&mut self, provider: ImageryProvider, alpha: f64) -> ImageryLayerId {
        let id = ImageryLayerId(self.alloc.allocate());
        self.layers.push(ImageryLayer {
            id,
            provider,
            alpha: alpha.clamp(0.0, 1.0),
            show: true,
            state: LayerState::Pending,
        });
        id
    }

    pub fn remove(&mut self, id: ImageryLayerId) -> bool {
        let Some(pos) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        self.layers.remove(pos);
        self.alloc.free(id.0)
    }

    pub fn contains(&self, id: ImageryLayerId) -> bool {
        self.alloc.is_live(id.0)
    }

    pub fn get(&self, id: ImageryLayerId) -> Option<&ImageryLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: ImageryLayerId) -> Option<&mut ImageryLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Sets opacity, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_alpha(&mut self, id: ImageryLayerId, alpha: f64) -> bool {
        if !alpha.is_finite() {
            return false;
        }
        match self.get_mut(id) {
            Some(layer) => {
                layer.alpha = alpha.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    pub fn set_show(&mut self, id: ImageryLayerId, show: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.show = show;
                true
            }
            None => false,
        }
    }

    pub fn set_state(&mut self, id: ImageryLayerId, state: LayerState) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.state = state;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageryLayer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        for layer in std::mem::take(&mut self.layers) {
            self.alloc.free(layer.id.0);
        }
    }
}
