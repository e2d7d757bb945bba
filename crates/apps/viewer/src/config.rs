use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use streaming::{DEFAULT_IMAGERY_URL, FetchPolicyConfig, TextureMode, TimeEpoch};
use view::ViewConfig;

/// Environment variable overriding [`ViewerConfig::imagery_url`].
pub const IMAGERY_URL_ENV: &str = "GLOBE_IMAGERY_URL";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Everything the engine and its host can be tuned with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub view: ViewConfig,
    pub fetch: FetchPolicyConfig,
    pub imagery_url: String,
    pub request_timeout_s: f64,
    pub texture: TextureMode,
    pub year: i32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            fetch: FetchPolicyConfig::default(),
            imagery_url: DEFAULT_IMAGERY_URL.to_string(),
            request_timeout_s: 30.0,
            texture: TextureMode::default(),
            year: TimeEpoch::default().year,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_imagery_url_override(std::env::var(IMAGERY_URL_ENV).ok())
    }

    fn with_imagery_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.imagery_url = url;
        }
        self
    }

    /// Request timeout; non-positive or non-finite values fall back to 30 s.
    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_s.is_finite() && self.request_timeout_s > 0.0 {
            Duration::from_secs_f64(self.request_timeout_s)
        } else {
            Duration::from_secs(30)
        }
    }

    pub fn epoch(&self) -> TimeEpoch {
        TimeEpoch::new(self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn nested_sections_merge_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{ "texture": "2km", "year": 2019, "fetch": {{ "debounce_s": 0.5 }} }}"#
        )
        .expect("write");

        let cfg = ViewerConfig::load(file.path()).expect("load");
        assert_eq!(cfg.texture, TextureMode::Coarse2km);
        assert_eq!(cfg.epoch(), TimeEpoch::new(2019));
        assert_eq!(cfg.fetch.debounce_s, 0.5);
        assert_eq!(cfg.fetch.zoom_change_threshold, 0.3);
        assert_eq!(cfg.view, ViewConfig::default());
        assert_eq!(cfg.imagery_url, DEFAULT_IMAGERY_URL);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ViewerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "{{ \"texture\": \"5km\" }}").expect("write");
        let err = ViewerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn blank_url_override_is_ignored() {
        let cfg = ViewerConfig::default().with_imagery_url_override(Some("  ".into()));
        assert_eq!(cfg.imagery_url, DEFAULT_IMAGERY_URL);

        let cfg = cfg.with_imagery_url_override(Some("http://localhost:9000/at".into()));
        assert_eq!(cfg.imagery_url, "http://localhost:9000/at");
    }

    #[test]
    fn timeout_falls_back_when_invalid() {
        let cfg = ViewerConfig {
            request_timeout_s: -1.0,
            ..ViewerConfig::default()
        };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }
}
