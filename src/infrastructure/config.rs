use crate::application::telemetry_session::SessionSettings;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub session: SessionConfig,
    pub connection: ConnectionConfig,
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub update_interval_ms: u64,
    pub max_history_size: usize,
    pub debounce_ms: u64,
    pub initial_machine_id: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    pub disconnect_probability: f64,
    pub reconnect_after_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl AppConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            update_interval: Duration::from_millis(self.session.update_interval_ms),
            max_history_size: self.session.max_history_size,
            disconnect_probability: self.connection.disconnect_probability,
            reconnect_after_attempts: self.connection.reconnect_after_attempts,
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.session.debounce_ms)
    }

    fn validate(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.session.update_interval_ms > 0,
            "session.update_interval_ms must be positive"
        );
        anyhow::ensure!(
            self.session.max_history_size >= 1,
            "session.max_history_size must be at least 1"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.connection.disconnect_probability),
            "connection.disconnect_probability must be within [0, 1], got {}",
            self.connection.disconnect_probability
        );
        Ok(self)
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("session.update_interval_ms", 3000)?
        .set_default("session.max_history_size", 30)?
        .set_default("session.debounce_ms", 100)?
        .set_default("session.initial_machine_id", "mix-001")?
        .set_default("connection.disconnect_probability", 0.02)?
        .set_default("connection.reconnect_after_attempts", 3)?
        .set_default("persistence.enabled", true)?
        .set_default("persistence.path", "data/telemetry-cache.json")?)
}

/// Defaults, then `config/telemetry.*` if present, then `TELEMETRY__*` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/telemetry").required(false))
        .add_source(config::Environment::with_prefix("TELEMETRY").separator("__"))
        .build()?;

    settings.try_deserialize::<AppConfig>()?.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(overrides: &str) -> anyhow::Result<AppConfig> {
        let settings = builder_with_defaults()?
            .add_source(config::File::from_str(overrides, config::FileFormat::Toml))
            .build()?;
        settings.try_deserialize::<AppConfig>()?.validate()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.session.initial_machine_id, "mix-001");
        assert_eq!(config.session.seed, None);

        let settings = config.session_settings();
        assert_eq!(settings.update_interval, Duration::from_millis(3000));
        assert_eq!(settings.max_history_size, 30);
        assert_eq!(settings.reconnect_after_attempts, 3);
        assert_eq!(config.debounce_window(), Duration::from_millis(100));
        assert!(config.persistence.enabled);
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            "[session]\nupdate_interval_ms = 1000\nseed = 7\n[persistence]\nenabled = false\n",
        )
        .unwrap();
        assert_eq!(config.session.update_interval_ms, 1000);
        assert_eq!(config.session.seed, Some(7));
        assert_eq!(config.session.max_history_size, 30);
        assert!(!config.persistence.enabled);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(from_toml("[session]\nmax_history_size = 0\n").is_err());
        assert!(from_toml("[session]\nupdate_interval_ms = 0\n").is_err());
        assert!(from_toml("[connection]\ndisconnect_probability = 1.5\n").is_err());
    }
}
