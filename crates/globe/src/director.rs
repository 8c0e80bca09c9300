//! Camera flights: home view, fly-to intents and the date-change spin.

use foundation::math::Cartographic;
use foundation::time::Timestamp;
use formats::FocusLocation;
use runtime::channel::{Receiver, Sender, channel};
use runtime::{AnimationClass, AnimationHandle, Animations};
use scene::Viewer;
use scene::camera::{FlightStatus, HeadingPitchRoll};

use crate::config::{GlobeConfig, HomeView};

pub const SPIN: AnimationClass = "spin";

/// Altitude for focus-location and search-result flights.
pub const REGIONAL_ALTITUDE_M: f64 = 50_000.0;
/// Altitude for "use my location".
pub const LOCAL_ALTITUDE_M: f64 = 20_000.0;
/// Altitude after clicking an alert marker.
pub const ALERT_ALTITUDE_M: f64 = 100_000.0;

pub const SPIN_TOTAL_DEG: f64 = 720.0;
/// Proportional term of the spin speed, per second.
pub const SPIN_DECAY_PER_S: f64 = 2.0;
/// Speed floor so the spin reaches its end in finite time, degrees per second.
pub const SPIN_FLOOR_DEG_PER_S: f64 = 20.0;

/// A request to fly somewhere, stamped with when it was made.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraIntent {
    pub lat: f64,
    pub lng: f64,
    pub altitude_m: f64,
    pub timestamp: Timestamp,
}

impl CameraIntent {
    pub fn destination(&self) -> Cartographic {
        Cartographic::new(self.lng, self.lat, self.altitude_m)
    }
}

/// Degrees turned `elapsed_s` into a spin.
///
/// Speed is `k * remaining + floor`; integrating gives
/// `remaining(t) = (R + f/k) e^(-k t) - f/k`.
pub fn spin_angle(elapsed_s: f64) -> f64 {
    if elapsed_s <= 0.0 || !elapsed_s.is_finite() {
        return 0.0;
    }
    let bias = SPIN_FLOOR_DEG_PER_S / SPIN_DECAY_PER_S;
    let remaining = (SPIN_TOTAL_DEG + bias) * (-SPIN_DECAY_PER_S * elapsed_s).exp() - bias;
    (SPIN_TOTAL_DEG - remaining.max(0.0)).clamp(0.0, SPIN_TOTAL_DEG)
}

/// Time the spin takes to complete, in seconds.
pub fn spin_duration_s() -> f64 {
    (1.0 + SPIN_DECAY_PER_S * SPIN_TOTAL_DEG / SPIN_FLOOR_DEG_PER_S).ln() / SPIN_DECAY_PER_S
}

#[derive(Debug, Copy, Clone)]
struct Spin {
    handle: AnimationHandle,
    start_heading: f64,
}

#[derive(Debug)]
pub struct CameraDirector {
    home: HomeView,
    flight_ms: f64,
    tx: Sender<CameraIntent>,
    rx: Receiver<CameraIntent>,
    spin: Option<Spin>,
    focus: Option<FocusLocation>,
}

impl CameraDirector {
    pub fn new(config: &GlobeConfig) -> Self {
        let (tx, rx) = channel();
        Self {
            home: config.home,
            flight_ms: config.flight_duration_ms,
            tx,
            rx,
            spin: None,
            focus: None,
        }
    }

    /// A sender for code that requests flights outside the tick.
    pub fn intents(&self) -> Sender<CameraIntent> {
        self.tx.clone()
    }

    pub fn pending(&self) -> usize {
        self.rx.pending()
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    /// Queues a flight; returns its sequence number.
    pub fn fly_to(&self, lat: f64, lng: f64, altitude_m: f64, now: Timestamp) -> u64 {
        self.tx.publish(CameraIntent {
            lat,
            lng,
            altitude_m,
            timestamp: now,
        })
    }

    /// Queues a regional flight when the focus location changes.
    pub fn focus(&mut self, focus: Option<FocusLocation>, now: Timestamp) -> Option<u64> {
        if self.focus == focus {
            return None;
        }
        self.focus = focus;
        let target = focus?;
        if !target.is_finite() {
            tracing::warn!(?target, "ignoring non-finite focus location");
            return None;
        }
        Some(self.fly_to(target.lat, target.lng, REGIONAL_ALTITUDE_M, now))
    }

    /// Flies home, top-down. Stops any spin.
    pub fn reset_view(&mut self, viewer: &mut Viewer, animations: &mut Animations, now: Timestamp) {
        self.cancel_spin(animations);
        let home = Cartographic::new(self.home.lng, self.home.lat, self.home.altitude_m);
        viewer.camera.fly_to(home, HeadingPitchRoll::TOP_DOWN, self.flight_ms, now);
    }

    /// Starts a two-turn decelerating spin that ends in [`Self::reset_view`].
    pub fn spin(&mut self, viewer: &mut Viewer, animations: &mut Animations, now: Timestamp) {
        viewer.camera.cancel_flight();
        let handle = animations.start(SPIN, now);
        self.spin = Some(Spin {
            handle,
            start_heading: viewer.camera.orientation().heading_deg,
        });
    }

    pub fn cancel_spin(&mut self, animations: &mut Animations) -> bool {
        match self.spin.take() {
            Some(spin) => animations.cancel(spin.handle),
            None => false,
        }
    }

    /// Advances the spin, starts queued flights and steps the camera.
    pub fn tick(&mut self, viewer: &mut Viewer, animations: &mut Animations, now: Timestamp) -> FlightStatus {
        if let Some(spin) = self.spin {
            match animations.started_at(spin.handle) {
                Some(started) => {
                    let elapsed_s = now.millis_since(started) / 1000.0;
                    viewer.camera.set_heading(spin.start_heading + spin_angle(elapsed_s));
                    if elapsed_s >= spin_duration_s() {
                        tracing::debug!("spin finished");
                        self.reset_view(viewer, animations, now);
                    }
                }
                None => self.spin = None,
            }
        }

        for intent in self.rx.drain() {
            self.cancel_spin(animations);
            let started = viewer.camera.fly_to(
                intent.value.destination(),
                HeadingPitchRoll::TOP_DOWN,
                self.flight_ms,
                now,
            );
            tracing::debug!(seq = intent.seq, started, "camera intent");
        }

        viewer.camera.update(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::ViewerOptions;

    fn ms(v: f64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn setup() -> (Viewer, Animations, CameraDirector) {
        (
            Viewer::new(ViewerOptions::default()),
            Animations::new(),
            CameraDirector::new(&GlobeConfig::default()),
        )
    }

    #[test]
    fn spin_curve_decelerates_and_ends_at_two_turns() {
        let total = spin_duration_s();
        assert!(total > 1.0 && total < 5.0, "{total}");
        assert!((spin_angle(total) - SPIN_TOTAL_DEG).abs() < 1e-6);
        assert_eq!(spin_angle(total + 10.0), SPIN_TOTAL_DEG);
        let early = spin_angle(0.2) - spin_angle(0.1);
        let late = spin_angle(total - 0.1) - spin_angle(total - 0.2);
        assert!(early > late);
        assert!(late > 0.0);
    }

    #[test]
    fn identical_intents_each_start_a_flight() {
        let (mut viewer, mut anims, mut director) = setup();
        let a = director.fly_to(22.5, 88.3, 50_000.0, ms(0.0));
        let b = director.fly_to(22.5, 88.3, 50_000.0, ms(0.0));
        assert!(b > a);

        let before = viewer.camera.mutations();
        director.tick(&mut viewer, &mut anims, ms(0.0));
        // two flight starts plus one camera step
        assert_eq!(viewer.camera.mutations() - before, 3);
        assert_eq!(director.pending(), 0);
    }

    #[test]
    fn flights_land_on_the_target() {
        let (mut viewer, mut anims, mut director) = setup();
        director.fly_to(22.5, 88.3, 100_000.0, ms(0.0));
        assert_eq!(director.tick(&mut viewer, &mut anims, ms(0.0)), FlightStatus::InFlight);
        assert_eq!(director.tick(&mut viewer, &mut anims, ms(1_500.0)), FlightStatus::Completed);
        let pos = viewer.camera.position();
        assert!((pos.lat_deg - 22.5).abs() < 1e-9);
        assert!((pos.height_m - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn focus_only_flies_on_change() {
        let (_, _, mut director) = setup();
        let focus = Some(FocusLocation::new(22.57, 88.36));
        assert!(director.focus(focus, ms(0.0)).is_some());
        assert!(director.focus(focus, ms(1.0)).is_none());
        assert!(director.focus(None, ms(2.0)).is_none());
        assert!(director.focus(Some(FocusLocation::new(f64::NAN, 0.0)), ms(3.0)).is_none());
        assert_eq!(director.pending(), 1);
    }

    #[test]
    fn spin_resolves_into_reset_view() {
        let (mut viewer, mut anims, mut director) = setup();
        director.spin(&mut viewer, &mut anims, ms(0.0));
        assert!(director.is_spinning());
        director.tick(&mut viewer, &mut anims, ms(500.0));
        assert!(viewer.camera.orientation().heading_deg > 0.0);

        let end = spin_duration_s() * 1000.0 + 1.0;
        director.tick(&mut viewer, &mut anims, ms(end));
        assert!(!director.is_spinning());
        assert!(anims.is_empty());
        let dest = viewer.camera.flight_destination().unwrap();
        assert!((dest.height_m - 7_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn intents_interrupt_a_spin() {
        let (mut viewer, mut anims, mut director) = setup();
        director.spin(&mut viewer, &mut anims, ms(0.0));
        director.fly_to(10.0, 10.0, 20_000.0, ms(100.0));
        director.tick(&mut viewer, &mut anims, ms(100.0));
        assert!(!director.is_spinning());
        assert!(anims.is_empty());
    }
}
