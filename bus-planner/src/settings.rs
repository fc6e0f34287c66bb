//! Process settings read from the environment.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `BUS_PLANNER_BIND` | Listen address, default `127.0.0.1:3000` |
//! | `BUS_PLANNER_DATA_DIR` | Directory holding `lines.json` and `stops.json` |
//! | `BUS_PLANNER_REPOSITORY_URL` | Base URL of a remote document store |
//! | `BUS_PLANNER_API_KEY` | API key for the remote store |
//! | `BUS_PLANNER_CONFIG` | JSON file with `planner` and `repository` sections |
//! | `BUS_PLANNER_CACHE_TTL_SECS` | Repository cache TTL |
//!
//! A data directory takes precedence over a repository URL.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::planner::PlannerConfig;
use crate::repository::{CacheConfig, RepositoryConfig};

pub const BIND_VAR: &str = "BUS_PLANNER_BIND";
pub const DATA_DIR_VAR: &str = "BUS_PLANNER_DATA_DIR";
pub const REPOSITORY_URL_VAR: &str = "BUS_PLANNER_REPOSITORY_URL";
pub const API_KEY_VAR: &str = "BUS_PLANNER_API_KEY";
pub const CONFIG_VAR: &str = "BUS_PLANNER_CONFIG";
pub const CACHE_TTL_VAR: &str = "BUS_PLANNER_CACHE_TTL_SECS";

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Errors reading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{var} is not a valid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("neither BUS_PLANNER_DATA_DIR nor BUS_PLANNER_REPOSITORY_URL is set")]
    NoDataSource,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where lines and stops come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A local JSON snapshot directory.
    Snapshot(PathBuf),
    /// A remote document store.
    Remote {
        base_url: String,
        api_key: Option<String>,
    },
}

/// Contents of the optional config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    planner: PlannerConfig,
    repository: RepositoryConfig,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub source: DataSource,
    pub planner: PlannerConfig,
    pub repository: RepositoryConfig,
    pub cache: CacheConfig,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_text = get(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .trim()
            .parse()
            .map_err(|_| SettingsError::Invalid {
                var: BIND_VAR,
                value: bind_text.clone(),
            })?;

        let source = match (get(DATA_DIR_VAR), get(REPOSITORY_URL_VAR)) {
            (Some(dir), _) => DataSource::Snapshot(PathBuf::from(dir)),
            (None, Some(url)) => DataSource::Remote {
                base_url: url,
                api_key: get(API_KEY_VAR),
            },
            (None, None) => return Err(SettingsError::NoDataSource),
        };

        let file = match get(CONFIG_VAR) {
            Some(path) => ConfigFile::load(Path::new(&path))?,
            None => ConfigFile::default(),
        };

        let mut cache = CacheConfig::default();
        if let Some(ttl) = get(CACHE_TTL_VAR) {
            let secs: u64 = ttl.trim().parse().map_err(|_| SettingsError::Invalid {
                var: CACHE_TTL_VAR,
                value: ttl.clone(),
            })?;
            cache.ttl = Duration::from_secs(secs);
        }

        Ok(Self {
            bind,
            source,
            planner: file.planner,
            repository: file.repository,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, SettingsError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn defaults_with_data_dir() {
        let s = settings(&[(DATA_DIR_VAR, "/srv/data")]).unwrap();
        assert_eq!(s.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(s.source, DataSource::Snapshot(PathBuf::from("/srv/data")));
        assert_eq!(s.planner, PlannerConfig::default());
        assert_eq!(s.cache.ttl, CacheConfig::default().ttl);
    }

    #[test]
    fn remote_source_with_key() {
        let s = settings(&[
            (REPOSITORY_URL_VAR, "https://store.example/api"),
            (API_KEY_VAR, "secret"),
        ])
        .unwrap();
        assert_eq!(
            s.source,
            DataSource::Remote {
                base_url: "https://store.example/api".to_string(),
                api_key: Some("secret".to_string()),
            }
        );
    }

    #[test]
    fn data_dir_wins_over_url() {
        let s = settings(&[
            (DATA_DIR_VAR, "data"),
            (REPOSITORY_URL_VAR, "https://store.example"),
        ])
        .unwrap();
        assert_eq!(s.source, DataSource::Snapshot(PathBuf::from("data")));
    }

    #[test]
    fn missing_source_is_error() {
        let err = settings(&[(DATA_DIR_VAR, "  ")]).unwrap_err();
        assert!(matches!(err, SettingsError::NoDataSource));
    }

    #[test]
    fn invalid_bind_and_ttl() {
        let err = settings(&[(DATA_DIR_VAR, "d"), (BIND_VAR, "nowhere")]).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { var: BIND_VAR, .. }));

        let err = settings(&[(DATA_DIR_VAR, "d"), (CACHE_TTL_VAR, "-5")]).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { var: CACHE_TTL_VAR, .. }));
    }

    #[test]
    fn cache_ttl_override() {
        let s = settings(&[(DATA_DIR_VAR, "d"), (CACHE_TTL_VAR, "60")]).unwrap();
        assert_eq!(s.cache.ttl, Duration::from_secs(60));
    }

    #[test]
    fn config_file_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "planner": {{ "k_board": 5, "near_destination_m": 150.0 }},
                "repository": {{ "circular_codes": ["C1"] }}
            }}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let s = settings(&[(DATA_DIR_VAR, "d"), (CONFIG_VAR, &path)]).unwrap();
        assert_eq!(s.planner.k_board, 5);
        assert_eq!(s.planner.near_destination_m, 150.0);
        assert_eq!(s.planner.k_dest, PlannerConfig::default().k_dest);
        assert_eq!(s.repository.circular_codes, vec!["C1".to_string()]);
        assert_eq!(
            s.repository.circular_markers,
            RepositoryConfig::default().circular_markers
        );
    }

    #[test]
    fn bad_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let err = settings(&[(DATA_DIR_VAR, "d"), (CONFIG_VAR, &path)]).unwrap_err();
        assert!(matches!(err, SettingsError::Json { .. }));

        let err = settings(&[(DATA_DIR_VAR, "d"), (CONFIG_VAR, "/no/such/file.json")])
            .unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
