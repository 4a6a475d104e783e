use crate::export::DEFAULT_EXPORT_DIR;
use crate::storage::schema::DEFAULT_MIGRATIONS_DIR;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of `dragevents.toml`; every key is optional
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DrageventsConfig {
    pub database: Option<String>,
    pub migrations: Option<String>,
    pub export_dir: Option<String>,
}

/// Paths after applying flags, config file and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub migrations: PathBuf,
    pub export_dir: PathBuf,
}

pub const DEFAULT_DATABASE_PATH: &str = "db/db.sqlite";

pub fn default_config_path() -> PathBuf {
    PathBuf::from("dragevents.toml")
}

pub fn load_config(path: Option<&Path>) -> Result<Option<DrageventsConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DrageventsConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

impl Settings {
    /// Resolve each path: explicit override, then config file, then default
    pub fn resolve(
        config: Option<&DrageventsConfig>,
        database: Option<PathBuf>,
        migrations: Option<PathBuf>,
        export_dir: Option<PathBuf>,
    ) -> Self {
        let configured = |value: Option<&String>| value.map(PathBuf::from);

        Self {
            database: database
                .or_else(|| configured(config.and_then(|c| c.database.as_ref())))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            migrations: migrations
                .or_else(|| configured(config.and_then(|c| c.migrations.as_ref())))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR)),
            export_dir: export_dir
                .or_else(|| configured(config.and_then(|c| c.export_dir.as_ref())))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
        }
    }
}
