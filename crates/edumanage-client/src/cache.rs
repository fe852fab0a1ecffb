//! Persistent tenant-config cache.
//!
//! The cached copy is a rendering fallback only: it lets the UI paint
//! instantly before the first fetch completes, and keeps the last-known
//! state visible when a fetch fails. A corrupt or unreadable cache is
//! treated as absent, never as an error.

use std::path::PathBuf;

use edumanage_core::{AppError, TenantConfig};

/// Storage for the tenant-config fallback copy.
pub trait ConfigCache: Send + Sync {
    /// Last cached config, or `None` when nothing usable is stored.
    fn load(&self) -> Option<TenantConfig>;

    /// Replace the cached copy.
    fn store(&self, config: &TenantConfig) -> Result<(), AppError>;
}

/// JSON-file cache, one file per installation.
pub struct FileConfigCache {
    path: PathBuf,
}

impl FileConfigCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ConfigCache for FileConfigCache {
    fn load(&self) -> Option<TenantConfig> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "Failed to read config cache");
                }
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding corrupt config cache");
                None
            }
        }
    }

    fn store(&self, config: &TenantConfig) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// No-op cache for tests and ephemeral use.
pub struct NoCache;

impl ConfigCache for NoCache {
    fn load(&self) -> Option<TenantConfig> {
        None
    }

    fn store(&self, _config: &TenantConfig) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileConfigCache::new(dir.path().join("tenant_config.json"));

        assert!(cache.load().is_none());

        let mut config = TenantConfig::fallback();
        config.school_name = "Hilltop Academy".into();
        cache.store(&config).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileConfigCache::new(dir.path().join("nested").join("deeper").join("c.json"));
        cache.store(&TenantConfig::fallback()).unwrap();
        assert!(cache.load().is_some());
    }

    #[test]
    fn corrupt_cache_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenant_config.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = FileConfigCache::new(path);
        assert!(cache.load().is_none());
    }

    #[test]
    fn no_cache_is_always_empty() {
        let cache = NoCache;
        cache.store(&TenantConfig::fallback()).unwrap();
        assert!(cache.load().is_none());
    }
}
