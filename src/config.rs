use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::handler::registry::{Registry, Resource};
use crate::http::HttpMethod;

/// Server configuration. Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub buffer_size: usize,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    pub resource_root: PathBuf,
    pub default_index: String,
    pub server_name: String,

    /// Answer a known path requested with the wrong method with 405 rather
    /// than 404.
    pub method_not_allowed: bool,

    pub debug: bool,

    pub routes: Vec<RouteConfig>,
}

/// One `[[routes]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub file: Option<PathBuf>,
    pub body: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1337,
            buffer_size: 4096,

            read_timeout: Duration::from_millis(500),

            resource_root: PathBuf::from("./static"),
            default_index: "index.html".to_string(),
            server_name: "Custom/Server".to_string(),

            method_not_allowed: false,
            debug: false,

            routes: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str::<ServerConfig>(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every connection fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }

    /// `host:port` as configured. The port may be `0`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the path registry from the `[[routes]]` tables.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        self.validate()?;
        let mut registry = Registry::new();

        for route in &self.routes {
            let method = HttpMethod::from_token(&route.method.to_ascii_uppercase()).ok_or_else(
                || ConfigError::UnsupportedMethod {
                    path: route.path.clone(),
                    method: route.method.clone(),
                },
            )?;

            let resource = match (&route.file, &route.body) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::ConflictingResource(route.path.clone()));
                }
                (Some(file), None) => Resource::File(file.clone()),
                (None, Some(body)) => Resource::Inline(body.clone()),
                (None, None) => Resource::default_for(&route.path, &self.default_index),
            };

            registry.register(&route.path, method, resource)?;
        }

        Ok(registry)
    }
}

fn default_method() -> String {
    HttpMethod::Get.as_str().to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
