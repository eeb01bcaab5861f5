use std::path::PathBuf;

use layers::labels::LabelLod;
use scene::camera::{ENTITY_ALTITUDE_M, FLIGHT_DURATION_S, HOME_ALTITUDE_M};
use search::DEFAULT_DEBOUNCE_MS;

pub const ENV_ACCESS_TOKEN: &str = "CESIUM_ACCESS_TOKEN";
pub const ENV_DATA_DIR: &str = "CAMPUS_DATA_DIR";
pub const ENV_DATA_URL: &str = "CAMPUS_DATA_URL";
pub const ENV_CACHE_DIR: &str = "CAMPUS_CACHE_DIR";
pub const ENV_TERRAIN_URL: &str = "CAMPUS_TERRAIN_URL";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "CAMPUS_SEARCH_DEBOUNCE_MS";
pub const ENV_SAFETY_TIMEOUT_MS: &str = "CAMPUS_SAFETY_TIMEOUT_MS";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_SAFETY_TIMEOUT_MS: u64 = 35_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidUrl { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key}: expected a non-negative integer, got {value:?}")
            }
            ConfigError::InvalidUrl { key, value } => {
                write!(f, "{key}: expected an http(s) URL, got {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-level settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Token for the hosted terrain/asset service. Absence is not fatal.
    pub access_token: Option<String>,
    pub data_dir: PathBuf,
    /// When set, datasets are fetched from `<data_url>/<file>` instead of `data_dir`.
    pub data_url: Option<String>,
    pub cache_dir: PathBuf,
    pub terrain_url: Option<String>,
    pub search_debounce_ms: u64,
    pub safety_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            access_token: None,
            cache_dir: data_dir.join(".cache"),
            data_dir,
            data_url: None,
            terrain_url: None,
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            safety_timeout_ms: DEFAULT_SAFETY_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_token = get(ENV_ACCESS_TOKEN);
        if access_token.is_none() {
            tracing::warn!("{ENV_ACCESS_TOKEN} not set; hosted terrain will be unavailable");
        }
        let data_dir = get(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let cache_dir = get(ENV_CACHE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(".cache"));

        Ok(Self {
            access_token,
            data_url: env_var_url(get(ENV_DATA_URL), ENV_DATA_URL)?,
            terrain_url: env_var_url(get(ENV_TERRAIN_URL), ENV_TERRAIN_URL)?,
            search_debounce_ms: env_var_u64(
                get(ENV_SEARCH_DEBOUNCE_MS),
                ENV_SEARCH_DEBOUNCE_MS,
                DEFAULT_DEBOUNCE_MS,
            )?,
            safety_timeout_ms: env_var_u64(
                get(ENV_SAFETY_TIMEOUT_MS),
                ENV_SAFETY_TIMEOUT_MS,
                DEFAULT_SAFETY_TIMEOUT_MS,
            )?,
            data_dir,
            cache_dir,
        })
    }
}

fn env_var_u64(raw: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value: v }),
    }
}

fn env_var_url(raw: Option<String>, key: &'static str) -> Result<Option<String>, ConfigError> {
    let Some(v) = raw else {
        return Ok(None);
    };
    let trimmed = v.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(Some(trimmed.trim_end_matches('/').to_string()))
    } else {
        Err(ConfigError::InvalidUrl { key, value: v })
    }
}

/// Fixed viewer construction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub base_layer_picker: bool,
    pub geocoder: bool,
    pub home_altitude_m: f64,
    pub entity_altitude_m: f64,
    pub flight_duration_s: f64,
    pub label_lod: LabelLod,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_layer_picker: false,
            geocoder: false,
            home_altitude_m: HOME_ALTITUDE_M,
            entity_altitude_m: ENTITY_ALTITUDE_M,
            flight_duration_s: FLIGHT_DURATION_S,
            label_lod: LabelLod::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::{
        AppConfig, ConfigError, ENV_CACHE_DIR, ENV_DATA_DIR, ENV_DATA_URL, ENV_SAFETY_TIMEOUT_MS,
        ENV_SEARCH_DEBOUNCE_MS,
    };
    use pretty_assertions::assert_eq;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn cache_dir_follows_data_dir() {
        let cfg = config(&[(ENV_DATA_DIR, "/srv/campus")]).unwrap();
        assert_eq!(cfg.cache_dir, PathBuf::from("/srv/campus/.cache"));

        let cfg = config(&[(ENV_DATA_DIR, "/srv/campus"), (ENV_CACHE_DIR, "/tmp/c")]).unwrap();
        assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/c"));
    }

    #[test]
    fn numbers_and_urls_are_validated() {
        let cfg = config(&[
            (ENV_SEARCH_DEBOUNCE_MS, "150"),
            (ENV_SAFETY_TIMEOUT_MS, " 5000 "),
            (ENV_DATA_URL, "https://maps.example.edu/data/"),
        ])
        .unwrap();
        assert_eq!(cfg.search_debounce_ms, 150);
        assert_eq!(cfg.safety_timeout_ms, 5000);
        assert_eq!(cfg.data_url.as_deref(), Some("https://maps.example.edu/data"));

        assert!(matches!(
            config(&[(ENV_SEARCH_DEBOUNCE_MS, "soon")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[(ENV_DATA_URL, "ftp://x")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[(ENV_DATA_URL, "  "), (ENV_SEARCH_DEBOUNCE_MS, "")]).unwrap();
        assert_eq!(cfg.data_url, None);
        assert_eq!(cfg.search_debounce_ms, 300);
    }
}
