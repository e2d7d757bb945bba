//! Camera orientation and zoom with input sensitivity.
//!
//! The camera is described by two angles:
//! - `tilt`: rotation towards the poles, clamped to `[-π/2, π/2]` (the poles
//!   are endpoints, there is no wraparound)
//! - `azimuth`: rotation about the vertical axis, stored in `(-π, π]`
//!
//! Zoomed-in views rotate and zoom in finer steps than zoomed-out ones.

use core::f64::consts::FRAC_PI_2;

use foundation::math::{GeoPoint, normalize_angle, wrap_lon_deg};

use crate::config::ViewConfig;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 8.0;

pub const MIN_TILT: f64 = -FRAC_PI_2;
pub const MAX_TILT: f64 = FRAC_PI_2;

/// Camera distance is `CAMERA_DISTANCE_SCALE / zoom`, never closer than
/// `MIN_CAMERA_DISTANCE` (globe radius is 2).
const CAMERA_DISTANCE_SCALE: f64 = 5.0;
const MIN_CAMERA_DISTANCE: f64 = 2.1;

/// Wheel sensitivity is divided by `zoom * WHEEL_ZOOM_SLOPE + WHEEL_ZOOM_BASE`.
const WHEEL_ZOOM_SLOPE: f64 = 0.3;
const WHEEL_ZOOM_BASE: f64 = 0.7;

/// Meridian the camera faces at azimuth 0, in degrees.
const AZIMUTH_ORIGIN_LON_DEG: f64 = -90.0;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Orientation {
    pub tilt: f64,
    pub azimuth: f64,
}

impl Orientation {
    /// Build a sanitized orientation: tilt clamped, azimuth normalized.
    pub fn new(tilt: f64, azimuth: f64) -> Self {
        Self {
            tilt: clamp_tilt(tilt),
            azimuth: normalize_angle(azimuth),
        }
    }

    /// Orientation that centres `point` on screen.
    pub fn from_geo(point: GeoPoint) -> Self {
        let tilt = point.lat_deg.to_radians();
        let azimuth = -(point.lon_deg - AZIMUTH_ORIGIN_LON_DEG).to_radians();
        Self::new(tilt, azimuth)
    }

    /// Geographic coordinate under the centre of the view.
    pub fn to_geo(self) -> GeoPoint {
        let lat_deg = self.tilt.to_degrees();
        let lon_deg = wrap_lon_deg(-self.azimuth.to_degrees() + AZIMUTH_ORIGIN_LON_DEG);
        GeoPoint { lat_deg, lon_deg }
    }
}

pub fn clamp_tilt(tilt: f64) -> f64 {
    tilt.clamp(MIN_TILT, MAX_TILT)
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Distance of the 3D camera from the globe centre for a zoom level.
pub fn camera_distance(zoom: f64) -> f64 {
    (CAMERA_DISTANCE_SCALE / clamp_zoom(zoom)).max(MIN_CAMERA_DISTANCE)
}

/// Owned camera state mutated by pointer input and transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationState {
    orientation: Orientation,
    zoom: f64,
    drag_sensitivity: f64,
    drag_zoom_exponent: f64,
    wheel_sensitivity: f64,
}

impl OrientationState {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            orientation: Orientation::default(),
            zoom: clamp_zoom(config.initial_zoom),
            drag_sensitivity: config.drag_sensitivity,
            drag_zoom_exponent: config.drag_zoom_exponent,
            wheel_sensitivity: config.wheel_sensitivity,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Radians of rotation per pixel of drag at the current zoom.
    pub fn drag_sensitivity(&self) -> f64 {
        self.drag_sensitivity / self.zoom.powf(self.drag_zoom_exponent)
    }

    /// Rotate by a pointer drag of `(dx_px, dy_px)` pixels.
    ///
    /// Horizontal motion turns the azimuth, vertical motion the tilt.
    /// Non-finite deltas are ignored.
    pub fn apply_drag(&mut self, dx_px: f64, dy_px: f64) {
        if !dx_px.is_finite() || !dy_px.is_finite() {
            return;
        }
        let k = self.drag_sensitivity();
        self.orientation = Orientation::new(
            self.orientation.tilt + dy_px * k,
            self.orientation.azimuth + dx_px * k,
        );
    }

    /// Zoom change produced by a wheel delta at the current zoom.
    ///
    /// Positive wheel deltas (scrolling down) zoom out.
    pub fn wheel_step(&self, wheel_delta: f64) -> f64 {
        let sensitivity =
            self.wheel_sensitivity / (self.zoom * WHEEL_ZOOM_SLOPE + WHEEL_ZOOM_BASE);
        -wheel_delta * sensitivity
    }

    /// Apply a wheel delta and return the new zoom level.
    pub fn apply_zoom_delta(&mut self, wheel_delta: f64) -> f64 {
        if wheel_delta.is_finite() {
            self.zoom = clamp_zoom(self.zoom + self.wheel_step(wheel_delta));
        }
        self.zoom
    }

    /// Overwrite orientation and zoom, sanitizing both.
    pub fn set(&mut self, orientation: Orientation, zoom: f64) {
        if orientation.tilt.is_finite() && orientation.azimuth.is_finite() {
            self.orientation = Orientation::new(orientation.tilt, orientation.azimuth);
        }
        if zoom.is_finite() {
            self.zoom = clamp_zoom(zoom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn state() -> OrientationState {
        OrientationState::new(&ViewConfig::default())
    }

    #[test]
    fn drag_rotates_with_base_sensitivity_at_zoom_one() {
        let mut s = state();
        s.set(Orientation::default(), 1.0);
        s.apply_drag(10.0, -4.0);
        assert_close(s.orientation().azimuth, 0.05, 1e-12);
        assert_close(s.orientation().tilt, -0.02, 1e-12);
    }

    #[test]
    fn drag_is_finer_when_zoomed_in() {
        let mut s = state();
        s.set(Orientation::default(), 1.0);
        let coarse = s.drag_sensitivity();
        s.set(Orientation::default(), 4.0);
        let fine = s.drag_sensitivity();
        assert!(fine < coarse);
        assert_close(fine, 0.005 / 4f64.powf(0.6), 1e-15);
    }

    #[test]
    fn tilt_stays_clamped_over_many_drags() {
        let mut s = state();
        for i in 0..500 {
            let dy = if i % 3 == 0 { -700.0 } else { 450.0 };
            s.apply_drag(123.0, dy);
            let o = s.orientation();
            assert!((MIN_TILT..=MAX_TILT).contains(&o.tilt));
            assert!(o.azimuth > -PI && o.azimuth <= PI);
        }
    }

    #[test]
    fn non_finite_drag_is_ignored() {
        let mut s = state();
        s.apply_drag(f64::NAN, 1.0);
        assert_eq!(s.orientation(), Orientation::default());
    }

    #[test]
    fn zoom_stays_clamped_over_many_deltas() {
        let mut s = state();
        for i in 0..2000 {
            let delta = if i < 1000 { -900.0 } else { 1300.0 };
            let z = s.apply_zoom_delta(delta);
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&z));
        }
        assert_eq!(s.zoom(), MIN_ZOOM);
    }

    #[test]
    fn wheel_steps_shrink_as_zoom_grows() {
        let mut s = state();
        s.set(Orientation::default(), 1.0);
        let near_min = s.wheel_step(-100.0);
        s.set(Orientation::default(), 7.0);
        let near_max = s.wheel_step(-100.0);
        assert!(near_min > near_max && near_max > 0.0);
        assert_close(near_min, 0.1, 1e-12);
    }

    #[test]
    fn geo_mapping_matches_camera_convention() {
        // Azimuth 0 faces lon -90.
        let p = Orientation::default().to_geo();
        assert_close(p.lat_deg, 0.0, 1e-12);
        assert_close(p.lon_deg, -90.0, 1e-12);

        let london = GeoPoint::new(51.5, -0.12).expect("valid");
        let o = Orientation::from_geo(london);
        assert_close(o.tilt, 51.5f64.to_radians(), 1e-12);
        let back = o.to_geo();
        assert_close(back.lat_deg, 51.5, 1e-9);
        assert_close(back.lon_deg, -0.12, 1e-9);
    }

    #[test]
    fn camera_distance_has_floor() {
        assert_close(camera_distance(1.0), 5.0, 1e-12);
        assert_eq!(camera_distance(8.0), 2.1);
        assert_close(camera_distance(0.5), 10.0, 1e-12);
    }
}
