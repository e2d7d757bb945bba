use core::fmt;
use core::str::FromStr;

pub const MIN_LATITUDE_DEG: f64 = -90.0;
pub const MAX_LATITUDE_DEG: f64 = 90.0;
pub const MIN_LONGITUDE_DEG: f64 = -180.0;
pub const MAX_LONGITUDE_DEG: f64 = 180.0;

/// A validated geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    Malformed(String),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::NotFinite => write!(f, "coordinates must be finite numbers"),
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "latitude {lat} outside -90 to 90")
            }
            CoordinateError::LongitudeOutOfRange(lon) => {
                write!(f, "longitude {lon} outside -180 to 180")
            }
            CoordinateError::Malformed(text) => {
                write!(f, "expected \"lat, lon\", got {text:?}")
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

impl GeoPoint {
    /// Validate a latitude/longitude pair.
    ///
    /// Both ranges are inclusive. Nothing is wrapped or clamped: out-of-range
    /// input is rejected.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Result<Self, CoordinateError> {
        if !lat_deg.is_finite() || !lon_deg.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(MIN_LATITUDE_DEG..=MAX_LATITUDE_DEG).contains(&lat_deg) {
            return Err(CoordinateError::LatitudeOutOfRange(lat_deg));
        }
        if !(MIN_LONGITUDE_DEG..=MAX_LONGITUDE_DEG).contains(&lon_deg) {
            return Err(CoordinateError::LongitudeOutOfRange(lon_deg));
        }
        Ok(Self { lat_deg, lon_deg })
    }
}

/// Parses pasted `"lat, lon"` text, e.g. `"51.5, -0.12"`.
impl FromStr for GeoPoint {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordinateError::Malformed(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(malformed)?;
        if lon.contains(',') {
            return Err(malformed());
        }
        let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
        let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
        GeoPoint::new(lat, lon)
    }
}

/// Wrap a longitude into `[-180, 180)`.
pub fn wrap_lon_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
