use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Runtime configuration.
///
/// Layering (lowest to highest priority):
/// - built-in defaults
/// - `config.toml` in the working directory (optional)
/// - `DASHBOARD_*` environment variables, nested with `__`
///   (e.g. `DASHBOARD_BASIC__LISTEN_ADDR=127.0.0.1:9000`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Base64 encoded key material (>= 64 bytes) for the private session cookie.
    /// A random key is generated per process when unset.
    pub cookie_key: Option<String>,
    pub insecure_cookie: bool,
    pub upload_limit_bytes: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:dashboard.db".to_string(),
            loglevel: "info".to_string(),
            cookie_key: None,
            insecure_cookie: false,
            upload_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Bootstrap identity written on first start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub default_password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            default_password: "admin".to_string(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("DASHBOARD_").split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
