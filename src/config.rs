//! Engine configuration

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

/// Default number of events returned by a history query
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Default number of events returned by a venue scan
pub const DEFAULT_VENUE_LIMIT: usize = 100;

/// Entity count above which the venue scan reads logs in parallel
pub const DEFAULT_PARALLEL_SCAN_THRESHOLD: usize = 64;

pub const ENV_DATA_DIR: &str = "GUEST_METRICS_DATA_DIR";
pub const ENV_HISTORY_LIMIT: &str = "GUEST_METRICS_HISTORY_LIMIT";
pub const ENV_VENUE_LIMIT: &str = "GUEST_METRICS_VENUE_LIMIT";
pub const ENV_PARALLEL_SCAN_THRESHOLD: &str = "GUEST_METRICS_PARALLEL_SCAN_THRESHOLD";
pub const ENV_SERIALIZE_PER_ENTITY: &str = "GUEST_METRICS_SERIALIZE_PER_ENTITY";

/// Configuration for the MetricsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Root directory for the file-backed store
    pub data_dir: PathBuf,
    /// History query limit when the caller gives none
    pub history_default_limit: usize,
    /// Venue scan limit when the caller gives none
    pub venue_default_limit: usize,
    pub parallel_scan_threshold: usize,
    /// Hold a per-entity lock across append + recompute
    pub serialize_per_entity: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            history_default_limit: DEFAULT_HISTORY_LIMIT,
            venue_default_limit: DEFAULT_VENUE_LIMIT,
            parallel_scan_threshold: DEFAULT_PARALLEL_SCAN_THRESHOLD,
            serialize_per_entity: false,
        }
    }
}

impl EngineConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Build config from `GUEST_METRICS_*` environment variables.
    ///
    /// Unset or unparseable values fall back to defaults. A relative data
    /// directory is resolved against the current directory.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let data_dir = match env::var(ENV_DATA_DIR) {
            Ok(path) if Path::new(&path).is_absolute() => PathBuf::from(path),
            Ok(path) => current_dir.join(path),
            Err(_) => current_dir.join(&defaults.data_dir),
        };

        Self {
            data_dir,
            history_default_limit: env_or(ENV_HISTORY_LIMIT, defaults.history_default_limit),
            venue_default_limit: env_or(ENV_VENUE_LIMIT, defaults.venue_default_limit),
            parallel_scan_threshold: env_or(
                ENV_PARALLEL_SCAN_THRESHOLD,
                defaults.parallel_scan_threshold,
            ),
            serialize_per_entity: env_or(ENV_SERIALIZE_PER_ENTITY, defaults.serialize_per_entity),
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_default_limit = limit;
        self
    }

    pub fn with_venue_limit(mut self, limit: usize) -> Self {
        self.venue_default_limit = limit;
        self
    }

    pub fn with_parallel_scan_threshold(mut self, threshold: usize) -> Self {
        self.parallel_scan_threshold = threshold;
        self
    }

    pub fn with_serialize_per_entity(mut self, serialize: bool) -> Self {
        self.serialize_per_entity = serialize;
        self
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(name: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(var = name, value = raw, "ignoring unparseable setting");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.history_default_limit, 10);
        assert_eq!(config.venue_default_limit, 100);
        assert!(!config.serialize_per_entity);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new("/tmp/guests")
            .with_history_limit(5)
            .with_venue_limit(7)
            .with_parallel_scan_threshold(0)
            .with_serialize_per_entity(true);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/guests"));
        assert_eq!(config.history_default_limit, 5);
        assert_eq!(config.venue_default_limit, 7);
        assert_eq!(config.parallel_scan_threshold, 0);
        assert!(config.serialize_per_entity);
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or("X", " 25 ", 10usize), 25);
        assert_eq!(parse_or("X", "many", 10usize), 10);
        assert!(parse_or("X", "true", false));
    }
}
