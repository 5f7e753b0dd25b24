use core::fmt::{Debug, Display};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
pub use shift_schedule_optimizer::SolverSettings;

pub const CONFIG_FILE: &str = "shift-schedule.toml";
pub const ENV_PREFIX: &str = "SHIFT_SCHEDULE_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Requests with a larger body are refused with 413.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins that get an `Access-Control-Allow-Origin` echo.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: [
                "http://localhost:5173",
                "http://127.0.0.1:5173",
                "http://localhost:3000",
                "http://127.0.0.1:3000",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

impl CorsConfig {
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub solver: SolverSettings,
    pub cors: CorsConfig,
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Load(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Defaults, then `shift-schedule.toml`, then `SHIFT_SCHEDULE_*` variables
/// where `__` separates sections, e.g. `SHIFT_SCHEDULE_SERVER__PORT=8080`.
#[must_use]
pub fn figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = get_config().map_err(|error| error.to_string())?;
            assert_eq!(config, Config::default());
            assert_eq!(config.server.socket_addr().to_string(), "0.0.0.0:5000");
            assert!(config.cors.allows("http://localhost:5173"));
            assert!(!config.cors.allows("http://evil.example"));
            Ok(())
        });
    }

    #[test]
    fn file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [server]
                port = 8080

                [solver]
                time_limit_seconds = 5.5

                [cors]
                allowed_origins = ["https://rota.example"]
                "#,
            )?;
            jail.set_env("SHIFT_SCHEDULE_SERVER__PORT", "9090");
            jail.set_env("SHIFT_SCHEDULE_SOLVER__MAX_DECISION_VARIABLES", "1000");

            let config = get_config().map_err(|error| error.to_string())?;
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.max_body_bytes, 16 * 1024 * 1024);
            assert!((config.solver.time_limit_seconds - 5.5).abs() < f64::EPSILON);
            assert_eq!(config.solver.max_decision_variables, 1000);
            assert_eq!(config.cors.allowed_origins, ["https://rota.example"]);
            Ok(())
        });
    }

    #[test]
    fn reports_bad_values() {
        Jail::expect_with(|jail| {
            jail.set_env("SHIFT_SCHEDULE_SERVER__PORT", "not-a-port");
            let error = get_config().unwrap_err();
            assert!(format!("{error:?}").starts_with("config error:"));
            Ok(())
        });
    }
}
