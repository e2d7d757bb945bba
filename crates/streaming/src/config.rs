use serde::Deserialize;

/// Tunables for when and how remote imagery is requested.
///
/// The movement thresholds and debounce delay are empirical; they are not
/// derived from anything and can be tuned freely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchPolicyConfig {
    /// Zoom change since the last fetch that warrants a new one.
    pub zoom_change_threshold: f64,
    /// Tilt change (radians) since the last fetch that warrants a new one.
    pub tilt_change_threshold: f64,
    /// Azimuth change (radians) since the last fetch that warrants a new one.
    pub azimuth_change_threshold: f64,
    /// Quiet period after the last qualifying movement before a fetch fires.
    pub debounce_s: f64,
    /// Zoom below which the coarse service tier is requested.
    pub zoom_tier_cutoff: f64,
    pub coarse_zoom_tier: u8,
    pub fine_zoom_tier: u8,
}

impl Default for FetchPolicyConfig {
    fn default() -> Self {
        Self {
            zoom_change_threshold: 0.3,
            tilt_change_threshold: 0.05,
            azimuth_change_threshold: 0.05,
            debounce_s: 0.3,
            zoom_tier_cutoff: 4.0,
            coarse_zoom_tier: 4,
            fine_zoom_tier: 6,
        }
    }
}
