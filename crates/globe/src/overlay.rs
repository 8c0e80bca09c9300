//! Hourly imagery overlay with crossfades between frames.

use foundation::math::Rectangle;
use foundation::time::Timestamp;
use layers::imagery::{frame_for, hour_of_day};
use runtime::{AnimationClass, AnimationHandle, Animations, progress};
use scene::Viewer;
use scene::imagery::{ImageryLayerId, LayerState};

use crate::config::GlobeConfig;
use crate::error::GlobeError;

pub const CROSSFADE: AnimationClass = "crossfade";

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameKey {
    hour: u32,
    template: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Outgoing {
    layer: ImageryLayerId,
    start_alpha: f64,
}

/// Result of advancing the overlay by one tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeStatus {
    Idle,
    Fading,
    Settled,
}

#[derive(Debug)]
pub struct TemporalOverlay {
    cap: f64,
    duration_ms: f64,
    rectangle: Rectangle,
    key: Option<FrameKey>,
    incoming: Option<ImageryLayerId>,
    outgoing: Option<Outgoing>,
    fade: Option<AnimationHandle>,
}

impl TemporalOverlay {
    pub fn new(config: &GlobeConfig) -> Self {
        Self {
            cap: config.overlay_alpha_cap,
            duration_ms: config.crossfade_ms,
            rectangle: config.overlay_rectangle,
            key: None,
            incoming: None,
            outgoing: None,
            fade: None,
        }
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn incoming(&self) -> Option<ImageryLayerId> {
        self.incoming
    }

    pub fn outgoing(&self) -> Option<ImageryLayerId> {
        self.outgoing.map(|o| o.layer)
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Starts a crossfade to `hour_index` unless that frame is already shown.
    ///
    /// A bad template leaves every layer and any running fade as they were.
    /// Returns whether a crossfade started.
    pub fn show_hour(
        &mut self,
        viewer: &mut Viewer,
        animations: &mut Animations,
        hour_index: i64,
        template: Option<&str>,
        now: Timestamp,
    ) -> Result<bool, GlobeError> {
        let template = template.map(str::trim).filter(|t| !t.is_empty());
        let key = FrameKey {
            hour: hour_of_day(hour_index),
            template: template.map(str::to_string),
        };
        if self.key.as_ref() == Some(&key) {
            return Ok(false);
        }
        let source = frame_for(hour_index, template)?;

        if let Some(fade) = self.fade.take() {
            animations.cancel(fade);
        }
        if let Some(stale) = self.outgoing.take() {
            viewer.imagery.remove(stale.layer);
        }
        if let Some(current) = self.incoming.take() {
            let start_alpha = viewer.imagery.get(current).map_or(0.0, |l| l.alpha);
            viewer.imagery.set_state(current, LayerState::FadingOut);
            self.outgoing = Some(Outgoing {
                layer: current,
                start_alpha,
            });
        }

        let layer = viewer.imagery.add(source.to_provider(self.rectangle), 0.0);
        viewer.imagery.set_state(layer, LayerState::FadingIn);
        self.incoming = Some(layer);
        self.fade = Some(animations.start(CROSSFADE, now));
        tracing::debug!(hour = key.hour, tiled = source.is_tiled(), %layer, "crossfade started");
        self.key = Some(key);
        Ok(true)
    }

    /// Applies the opacities for `now`; settles the fade once it has run its course.
    pub fn tick(&mut self, viewer: &mut Viewer, animations: &mut Animations, now: Timestamp) -> FadeStatus {
        let Some(fade) = self.fade else {
            return FadeStatus::Idle;
        };
        let Some(started) = animations.started_at(fade) else {
            tracing::debug!("crossfade handle released elsewhere");
            self.fade = None;
            return FadeStatus::Idle;
        };

        let t = progress(started, self.duration_ms, now);
        if let Some(layer) = self.incoming {
            viewer.imagery.set_alpha(layer, self.cap * t);
        }
        if let Some(out) = self.outgoing {
            viewer.imagery.set_alpha(out.layer, out.start_alpha * (1.0 - t));
        }
        if t < 1.0 {
            return FadeStatus::Fading;
        }

        if let Some(out) = self.outgoing.take() {
            viewer.imagery.remove(out.layer);
        }
        if let Some(layer) = self.incoming {
            viewer.imagery.set_alpha(layer, self.cap);
            viewer.imagery.set_state(layer, LayerState::Steady);
        }
        animations.cancel(fade);
        self.fade = None;
        FadeStatus::Settled
    }

    /// Releases the fade handle without touching the scene (unmount).
    pub fn cancel(&mut self, animations: &mut Animations) {
        if let Some(fade) = self.fade.take() {
            animations.cancel(fade);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CROSSFADE, FadeStatus, TemporalOverlay};
    use crate::config::GlobeConfig;
    use foundation::time::Timestamp;
    use runtime::Animations;
    use scene::imagery::LayerState;
    use scene::{Viewer, ViewerOptions};

    const TEMPLATE: Option<&str> = Some("https://frames.example/{hour}.png");

    fn ms(v: f64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn setup() -> (Viewer, Animations, TemporalOverlay) {
        (
            Viewer::new(ViewerOptions::default()),
            Animations::new(),
            TemporalOverlay::new(&GlobeConfig::default()),
        )
    }

    fn alphas(viewer: &Viewer) -> Vec<f64> {
        viewer.imagery.iter().map(|l| l.alpha).collect()
    }

    #[test]
    fn fades_in_over_the_configured_duration() {
        let (mut viewer, mut anims, mut overlay) = setup();
        assert!(overlay.show_hour(&mut viewer, &mut anims, 5, TEMPLATE, ms(0.0)).unwrap());
        assert_eq!(overlay.tick(&mut viewer, &mut anims, ms(400.0)), FadeStatus::Fading);
        assert!((alphas(&viewer)[0] - 0.275).abs() < 1e-9);
        assert_eq!(overlay.tick(&mut viewer, &mut anims, ms(800.0)), FadeStatus::Settled);

        let layer = viewer.imagery.get(overlay.incoming().unwrap()).unwrap();
        assert_eq!(layer.alpha, 0.55);
        assert_eq!(layer.state, LayerState::Steady);
        assert_eq!(layer.provider.url(), "https://frames.example/05.png");
        assert!(anims.is_empty());
        assert_eq!(overlay.tick(&mut viewer, &mut anims, ms(900.0)), FadeStatus::Idle);
    }

    #[test]
    fn same_hour_twice_is_a_no_op() {
        let (mut viewer, mut anims, mut overlay) = setup();
        assert!(overlay.show_hour(&mut viewer, &mut anims, 3, TEMPLATE, ms(0.0)).unwrap());
        assert!(!overlay.show_hour(&mut viewer, &mut anims, 3, TEMPLATE, ms(1.0)).unwrap());
        assert!(!overlay.show_hour(&mut viewer, &mut anims, 27, TEMPLATE, ms(2.0)).unwrap());
        overlay.tick(&mut viewer, &mut anims, ms(1_000.0));
        assert_eq!(alphas(&viewer), vec![0.55]);
    }

    #[test]
    fn retrigger_mid_fade_starts_from_current_opacity() {
        let (mut viewer, mut anims, mut overlay) = setup();
        overlay.show_hour(&mut viewer, &mut anims, 3, TEMPLATE, ms(0.0)).unwrap();
        overlay.tick(&mut viewer, &mut anims, ms(400.0));
        let first = overlay.incoming().unwrap();

        overlay.show_hour(&mut viewer, &mut anims, 4, TEMPLATE, ms(400.0)).unwrap();
        assert_eq!(overlay.outgoing(), Some(first));
        assert_eq!(anims.len(), 1);
        assert!(anims.active(CROSSFADE).is_some());

        overlay.tick(&mut viewer, &mut anims, ms(800.0));
        let out = viewer.imagery.get(first).unwrap();
        assert!((out.alpha - 0.1375).abs() < 1e-9, "{}", out.alpha);

        overlay.tick(&mut viewer, &mut anims, ms(1_200.0));
        assert!(!viewer.imagery.contains(first));
        assert_eq!(alphas(&viewer), vec![0.55]);
    }

    #[test]
    fn third_trigger_drops_the_stale_outgoing_layer() {
        let (mut viewer, mut anims, mut overlay) = setup();
        overlay.show_hour(&mut viewer, &mut anims, 1, TEMPLATE, ms(0.0)).unwrap();
        overlay.show_hour(&mut viewer, &mut anims, 2, TEMPLATE, ms(100.0)).unwrap();
        overlay.show_hour(&mut viewer, &mut anims, 3, TEMPLATE, ms(200.0)).unwrap();
        assert_eq!(viewer.imagery.len(), 2);
    }

    #[test]
    fn malformed_template_keeps_the_current_fade() {
        let (mut viewer, mut anims, mut overlay) = setup();
        overlay.show_hour(&mut viewer, &mut anims, 3, TEMPLATE, ms(0.0)).unwrap();
        let incoming = overlay.incoming();

        let err = overlay.show_hour(&mut viewer, &mut anims, 4, Some("https://x/{hour.png"), ms(100.0));
        assert!(err.is_err());
        assert_eq!(overlay.incoming(), incoming);
        assert!(overlay.is_fading());
        assert_eq!(viewer.imagery.len(), 1);
        assert_eq!(overlay.tick(&mut viewer, &mut anims, ms(800.0)), FadeStatus::Settled);
    }

    #[test]
    fn missing_template_synthesizes_a_placeholder() {
        let (mut viewer, mut anims, mut overlay) = setup();
        overlay.show_hour(&mut viewer, &mut anims, 7, Some("   "), ms(0.0)).unwrap();
        let layer = viewer.imagery.get(overlay.incoming().unwrap()).unwrap();
        assert!(layer.provider.url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn cancel_releases_the_handle() {
        let (mut viewer, mut anims, mut overlay) = setup();
        overlay.show_hour(&mut viewer, &mut anims, 3, TEMPLATE, ms(0.0)).unwrap();
        overlay.cancel(&mut anims);
        assert!(anims.is_empty());
        assert_eq!(overlay.tick(&mut viewer, &mut anims, ms(900.0)), FadeStatus::Idle);
    }
}
