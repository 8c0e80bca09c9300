use foundation::math::{Cartographic, EnuFrame, Vec3, wrap_longitude};
use foundation::time::Timestamp;
use runtime::animation::{ease_in_out_cubic, progress};
use serde::Serialize;

/// Camera orientation in degrees. Pitch −90 looks straight down.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct HeadingPitchRoll {
    pub heading_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

impl HeadingPitchRoll {
    pub const TOP_DOWN: HeadingPitchRoll = HeadingPitchRoll {
        heading_deg: 0.0,
        pitch_deg: -90.0,
        roll_deg: 0.0,
    };
}

/// Limits applied to user-driven camera motion.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ScreenSpaceCameraController {
    pub min_zoom_distance_m: f64,
    pub max_zoom_distance_m: f64,
    pub enable_collision_detection: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub enable_tilt: bool,
    pub enable_translate: bool,
}

impl Default for ScreenSpaceCameraController {
    fn default() -> Self {
        Self {
            min_zoom_distance_m: 1.0,
            max_zoom_distance_m: f64::INFINITY,
            enable_collision_detection: true,
            enable_zoom: true,
            enable_rotate: true,
            enable_tilt: true,
            enable_translate: true,
        }
    }
}

impl ScreenSpaceCameraController {
    pub fn clamp_height(&self, height_m: f64) -> f64 {
        let floor = if self.enable_collision_detection {
            self.min_zoom_distance_m.max(0.0)
        } else {
            self.min_zoom_distance_m
        };
        height_m.clamp(floor, self.max_zoom_distance_m.max(floor))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 720.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    /// Distance along the view direction, meters.
    pub depth_m: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Flight {
    from: Cartographic,
    from_orientation: HeadingPitchRoll,
    to: Cartographic,
    to_orientation: HeadingPitchRoll,
    started: Timestamp,
    duration_ms: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlightStatus {
    Idle,
    InFlight,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Cartographic,
    orientation: HeadingPitchRoll,
    flight: Option<Flight>,
    fov_y_deg: f64,
    mutations: u64,
}

impl Camera {
    pub fn new(position: Cartographic, orientation: HeadingPitchRoll) -> Self {
        Self {
            position,
            orientation,
            flight: None,
            fov_y_deg: 60.0,
            mutations: 0,
        }
    }

    pub fn position(&self) -> Cartographic {
        self.position
    }

    pub fn orientation(&self) -> HeadingPitchRoll {
        self.orientation
    }

    /// Count of state changes since construction.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn flight_destination(&self) -> Option<Cartographic> {
        self.flight.map(|f| f.to)
    }

    /// Jumps to `destination`, cancelling any flight.
    pub fn set_view(&mut self, destination: Cartographic, orientation: HeadingPitchRoll) {
        if !destination.is_finite() {
            tracing::warn!(?destination, "ignoring non-finite camera destination");
            return;
        }
        self.flight = None;
        self.position = destination;
        self.orientation = orientation;
        self.mutations += 1;
    }

    /// Starts an eased flight from the current pose, replacing any flight.
    pub fn fly_to(
        &mut self,
        destination: Cartographic,
        orientation: HeadingPitchRoll,
        duration_ms: f64,
        now: Timestamp,
    ) -> bool {
        if !destination.is_finite() {
            tracing::warn!(?destination, "ignoring non-finite camera destination");
            return false;
        }
        self.flight = Some(Flight {
            from: self.position,
            from_orientation: self.orientation,
            to: destination,
            to_orientation: orientation,
            started: now,
            duration_ms,
        });
        self.mutations += 1;
        true
    }

    pub fn cancel_flight(&mut self) -> bool {
        self.flight.take().is_some()
    }

    /// Advances the active flight to `now`.
    pub fn update(&mut self, now: Timestamp) -> FlightStatus {
        let Some(flight) = self.flight else {
            return FlightStatus::Idle;
        };
        let t = progress(flight.started, flight.duration_ms, now);
        let e = ease_in_out_cubic(t);

        let dlon = wrap_longitude(flight.to.lon_deg - flight.from.lon_deg);
        self.position = Cartographic::new(
            wrap_longitude(flight.from.lon_deg + dlon * e),
            lerp(flight.from.lat_deg, flight.to.lat_deg, e),
            lerp(flight.from.height_m, flight.to.height_m, e),
        );
        let dh = wrap_degrees(flight.to_orientation.heading_deg - flight.from_orientation.heading_deg);
        self.orientation = HeadingPitchRoll {
            heading_deg: flight.from_orientation.heading_deg + dh * e,
            pitch_deg: lerp(flight.from_orientation.pitch_deg, flight.to_orientation.pitch_deg, e),
            roll_deg: lerp(flight.from_orientation.roll_deg, flight.to_orientation.roll_deg, e),
        };
        self.mutations += 1;

        if t >= 1.0 {
            self.position = flight.to;
            self.orientation = flight.to_orientation;
            self.flight = None;
            FlightStatus::Completed
        } else {
            FlightStatus::InFlight
        }
    }

    pub fn set_heading(&mut self, heading_deg: f64) {
        if !heading_deg.is_finite() {
            return;
        }
        self.orientation.heading_deg = heading_deg.rem_euclid(360.0);
        self.mutations += 1;
    }

    /// Scales the height above the ellipsoid, respecting `controller` limits.
    pub fn zoom(&mut self, factor: f64, controller: &ScreenSpaceCameraController) {
        if !controller.enable_zoom || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.flight = None;
        self.position.height_m = controller.clamp_height(self.position.height_m * factor);
        self.mutations += 1;
    }

    pub fn distance_to(&self, target: Cartographic) -> f64 {
        self.position.to_ecef().distance(target.to_ecef())
    }

    /// Focal length in pixels for `viewport`.
    pub fn focal_px(&self, viewport: Viewport) -> f64 {
        (viewport.height_px * 0.5) / (self.fov_y_deg.to_radians() * 0.5).tan()
    }

    /// Projects `target` to screen space. `None` if it is behind the camera
    /// or on the far side of the globe.
    pub fn project(&self, target: Cartographic, viewport: Viewport) -> Option<ScreenPoint> {
        let (right, up, dir) = self.basis();
        let eye = self.position.to_ecef().as_vec3();
        let point = target.to_ecef().as_vec3();
        let v = point - eye;

        let depth = v.dot(dir);
        if depth <= 0.0 {
            return None;
        }
        // Back-facing surface points are occluded by the globe.
        let normal = point.normalize()?;
        if normal.dot(eye - point) < 0.0 {
            return None;
        }

        let f = self.focal_px(viewport);
        Some(ScreenPoint {
            x: viewport.width_px * 0.5 + f * v.dot(right) / depth,
            y: viewport.height_px * 0.5 - f * v.dot(up) / depth,
            depth_m: depth,
        })
    }

    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let frame = EnuFrame::at(self.position.to_geodetic());
        let (sh, ch) = self.orientation.heading_deg.to_radians().sin_cos();
        let (sp, cp) = self.orientation.pitch_deg.to_radians().sin_cos();
        let dir = frame.direction_to_ecef(sh * cp, ch * cp, sp);
        let right = frame.direction_to_ecef(ch, -sh, 0.0);
        let up = right.cross(dir);
        (right, up, dir)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Wraps an angle difference into `[-180, 180)`.
fn wrap_degrees(d: f64) -> f64 {
    (d + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::{Camera, FlightStatus, HeadingPitchRoll, ScreenSpaceCameraController, Viewport};
    use foundation::math::Cartographic;
    use foundation::time::Timestamp;

    fn ts(ms: f64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn home() -> Camera {
        Camera::new(Cartographic::new(78.9629, 22.5937, 7_000_000.0), HeadingPitchRoll::TOP_DOWN)
    }

    #[test]
    fn flight_eases_to_destination() {
        let mut cam = home();
        let dest = Cartographic::new(88.3, 22.5, 100_000.0);
        assert!(cam.fly_to(dest, HeadingPitchRoll::TOP_DOWN, 1_500.0, ts(0.0)));
        assert_eq!(cam.update(ts(750.0)), FlightStatus::InFlight);
        let mid = cam.position();
        assert!(mid.height_m < 7_000_000.0 && mid.height_m > 100_000.0);
        assert_eq!(cam.update(ts(1_500.0)), FlightStatus::Completed);
        assert_eq!(cam.position(), dest);
        assert_eq!(cam.update(ts(2_000.0)), FlightStatus::Idle);
    }

    #[test]
    fn non_finite_destination_is_ignored() {
        let mut cam = home();
        let before = cam.mutations();
        assert!(!cam.fly_to(Cartographic::new(f64::NAN, 0.0, 1.0), HeadingPitchRoll::TOP_DOWN, 1.0, ts(0.0)));
        assert_eq!(cam.mutations(), before);
        assert!(!cam.is_flying());
    }

    #[test]
    fn top_down_camera_projects_nadir_to_center() {
        let cam = home();
        let vp = Viewport::default();
        let p = cam.project(Cartographic::new(78.9629, 22.5937, 0.0), vp).unwrap();
        assert!((p.x - vp.width_px / 2.0).abs() < 1e-6);
        assert!((p.y - vp.height_px / 2.0).abs() < 1e-6);
        assert!((p.depth_m - 7_000_000.0).abs() < 1.0);
    }

    #[test]
    fn north_is_up_when_looking_down() {
        let cam = home();
        let vp = Viewport::default();
        let north = cam.project(Cartographic::new(78.9629, 25.0, 0.0), vp).unwrap();
        let east = cam.project(Cartographic::new(81.0, 22.5937, 0.0), vp).unwrap();
        assert!(north.y < vp.height_px / 2.0);
        assert!(east.x > vp.width_px / 2.0);
    }

    #[test]
    fn far_side_of_globe_is_occluded() {
        let cam = home();
        assert!(cam.project(Cartographic::new(-101.0, -22.0, 0.0), Viewport::default()).is_none());
    }

    #[test]
    fn zoom_respects_controller_limits() {
        let mut cam = home();
        let controller = ScreenSpaceCameraController {
            min_zoom_distance_m: 1_000.0,
            max_zoom_distance_m: 20_000_000.0,
            ..Default::default()
        };
        cam.zoom(100.0, &controller);
        assert_eq!(cam.position().height_m, 20_000_000.0);
        cam.zoom(1.0e-9, &controller);
        assert_eq!(cam.position().height_m, 1_000.0);
    }
}
