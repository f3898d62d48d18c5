use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "admin.toml";
const ENV_PREFIX: &str = "ADMIN_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub regions: RegionSettings,
    pub http: HttpSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSettings {
    /// SQL dump holding the `('<code>','<name>')` tuples.
    pub dump_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogSettings {
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseSettings {
                url: "sqlite://marketplace_admin.db".to_string(),
                max_connections: 4,
                busy_timeout_secs: 5,
            },
            regions: RegionSettings {
                dump_path: PathBuf::from("resources/wilayah.sql"),
            },
            http: HttpSettings {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            log: LogSettings {
                filter: "info".to_string(),
            },
        }
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Defaults, then `admin.toml`, then `ADMIN_*` environment variables
    /// (`ADMIN_DATABASE__URL`, `ADMIN_HTTP__PORT`, ...).
    pub fn load() -> Result<AppConfig> {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_file: &Path) -> Result<AppConfig> {
        Self::figment(config_file)
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
