use serde::Deserialize;

/// Tunables for camera interaction.
///
/// Missing fields in a config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Zoom at or above which the fetched 2D image replaces the globe.
    pub zoom_threshold: f64,
    pub initial_zoom: f64,
    /// Radians per pixel of drag at zoom 1.
    pub drag_sensitivity: f64,
    /// Drag sensitivity falls off as `zoom^-drag_zoom_exponent`.
    pub drag_zoom_exponent: f64,
    /// Zoom units per wheel unit at zoom 1.
    pub wheel_sensitivity: f64,
    pub transition_duration_s: f64,
    /// Zoom a "go to coordinates" transition lands on when no hint is given.
    pub navigate_zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_threshold: 2.3,
            initial_zoom: 1.5,
            drag_sensitivity: 0.005,
            drag_zoom_exponent: 0.6,
            wheel_sensitivity: 0.001,
            transition_duration_s: 1.5,
            navigate_zoom: 4.0,
        }
    }
}
