//! Request contract of the remote imagery service.
//!
//! The service takes a JSON body
//! `{ "lat": "51.5000", "lon": "-0.1200", "time": "2024-01-01", "type": "250m", "zoom": 6 }`
//! and answers with an encoded image. Coordinates are sent as fixed-precision
//! decimal strings whose precision follows the requested zoom tier, so the
//! service is not asked for precision it cannot resolve.

use std::fmt;
use std::str::FromStr;

use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::config::FetchPolicyConfig;

/// Identifies a dispatched fetch so its outcome can be matched to the guard.
///
/// Small and copyable so it can cross task boundaries without allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

/// Base texture product; finer products support deeper remote zoom tiers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureMode {
    #[default]
    #[serde(rename = "250m")]
    Fine250m,
    #[serde(rename = "1km")]
    Medium1km,
    #[serde(rename = "2km")]
    Coarse2km,
}

impl TextureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TextureMode::Fine250m => "250m",
            TextureMode::Medium1km => "1km",
            TextureMode::Coarse2km => "2km",
        }
    }

    /// Deepest zoom tier the service offers for this product.
    pub fn max_tier(self) -> ResolutionTier {
        match self {
            TextureMode::Fine250m => ResolutionTier(8),
            TextureMode::Medium1km => ResolutionTier(6),
            TextureMode::Coarse2km => ResolutionTier(5),
        }
    }
}

impl fmt::Display for TextureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTextureMode(pub String);

impl fmt::Display for UnknownTextureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown texture mode {:?} (expected 250m, 1km or 2km)", self.0)
    }
}

impl std::error::Error for UnknownTextureMode {}

impl FromStr for TextureMode {
    type Err = UnknownTextureMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "250m" => Ok(TextureMode::Fine250m),
            "1km" => Ok(TextureMode::Medium1km),
            "2km" => Ok(TextureMode::Coarse2km),
            _ => Err(UnknownTextureMode(s.to_string())),
        }
    }
}

/// Calendar epoch of the imagery. The service is asked for January 1st.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimeEpoch {
    pub year: i32,
}

impl TimeEpoch {
    pub fn new(year: i32) -> Self {
        Self { year }
    }
}

impl Default for TimeEpoch {
    fn default() -> Self {
        Self::new(2024)
    }
}

impl fmt::Display for TimeEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-01-01", self.year)
    }
}

/// Zoom tier sent to the service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolutionTier(pub u8);

impl ResolutionTier {
    /// Pick the tier for a viewer zoom: coarse below the cutoff, fine at or
    /// above it, never deeper than the texture product allows.
    pub fn for_zoom(zoom: f64, texture: TextureMode, config: &FetchPolicyConfig) -> Self {
        let wanted = if zoom < config.zoom_tier_cutoff {
            config.coarse_zoom_tier
        } else {
            config.fine_zoom_tier
        };
        ResolutionTier(wanted).min(texture.max_tier())
    }

    /// Decimal places worth sending for coordinates at this tier, in `[2, 6]`.
    pub fn decimal_places(self) -> usize {
        (usize::from(self.0) / 2 + 2).clamp(2, 6)
    }
}

/// Exact payload posted to the imagery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequestDescriptor {
    pub lat: String,
    pub lon: String,
    pub time: String,
    #[serde(rename = "type")]
    pub texture: TextureMode,
    pub zoom: u8,
}

impl FetchRequestDescriptor {
    pub fn new(
        point: GeoPoint,
        tier: ResolutionTier,
        texture: TextureMode,
        epoch: TimeEpoch,
    ) -> Self {
        let places = tier.decimal_places();
        Self {
            lat: format_fixed(point.lat_deg, places),
            lon: format_fixed(point.lon_deg, places),
            time: epoch.to_string(),
            texture,
            zoom: tier.0,
        }
    }
}

/// Decimal text with `places` digits after the point.
///
/// Values exactly halfway between two candidates round away from zero, like
/// `Number.prototype.toFixed`; everything else rounds to nearest.
pub fn format_fixed(value: f64, places: usize) -> String {
    let Some(units) = exact_tie_units(value, places) else {
        return format!("{value:.places$}");
    };
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if places == 0 {
        return format!("{sign}{units}");
    }
    let scale = 10u128.pow(places as u32);
    format!("{sign}{}.{:0places$}", units / scale, units % scale)
}

/// If `|value|` lies exactly halfway between two multiples of `10^-places`,
/// the larger one counted in units of `10^-places`.
fn exact_tie_units(value: f64, places: usize) -> Option<u128> {
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    let scale = 10u128.checked_pow(u32::try_from(places).ok()?)?;

    let bits = value.abs().to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = u128::from(bits & ((1u64 << 52) - 1));
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u128 << 52), biased - 1075)
    };

    // |value| * 2 * 10^places == mantissa * scale * 2^(exponent + 1), which is
    // an odd integer exactly when the value is a tie.
    let shift = -(exponent + 1);
    if !(0..128).contains(&shift) {
        return None;
    }
    let scaled = mantissa.checked_mul(scale)?;
    if scaled.trailing_zeros() != shift as u32 {
        return None;
    }
    let doubled = scaled >> shift;
    Some(doubled / 2 + 1)
}
