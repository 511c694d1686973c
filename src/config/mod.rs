use crate::common::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::PathBuf;

/// Default number of frames a `BufferPoolManager` is sized to when no
/// override is supplied.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Resolved, process-wide configuration for the storage core.
///
/// Production call sites are free to construct their own `Settings`
/// (or bypass it entirely and pass arguments directly); [`SETTINGS`] and
/// [`DATA_DIR`] exist so test fixtures and default-construction paths
/// share one place to look up defaults instead of hardcoding paths.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_data_dir() -> PathBuf {
    std::env::temp_dir().join("clockstore")
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pool_size: default_pool_size(),
            data_dir: default_data_dir(),
        }
    }
}

impl Settings {
    /// Loads settings from (in ascending priority) built-in defaults, an
    /// optional `clockstore.toml` in the working directory, and
    /// `CLOCKSTORE_*` environment variables.
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .set_default("pool_size", DEFAULT_POOL_SIZE as i64)?
            .set_default("data_dir", default_data_dir().to_string_lossy().to_string())?
            .add_source(config::File::with_name("clockstore").required(false))
            .add_source(config::Environment::with_prefix("CLOCKSTORE"));
        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Process-wide resolved settings, lazily loaded on first access.
pub static SETTINGS: Lazy<Settings> = Lazy::new(|| Settings::load().unwrap_or_default());

/// Default data directory for on-disk artifacts (e.g. `DiskManager` test
/// fixtures created via `tempfile::NamedTempFile::new_in`).
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::fs::create_dir_all(&SETTINGS.data_dir).ok();
    SETTINGS.data_dir.clone()
});
