//! Application configuration.
//!
//! Layered the usual way: built-in defaults, then `config/default.toml`,
//! then an environment-specific file selected by `ROSPHERE_ENV`, then
//! `ROSPHERE_*` environment variables.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub replay: ReplaySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// Directory scanned for per-patient `<id>.csv` files.
    pub patient_dir: String,
    /// Directory where uploaded datasets are parked.
    pub upload_dir: String,
    /// Seconds an uploaded file is kept before best-effort deletion.
    pub retention_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaySettings {
    /// Real-time milliseconds between simulation ticks.
    pub tick_interval_ms: u64,
}

/// Load configuration, never failing on absent files.
pub fn load() -> Result<Settings, config::ConfigError> {
    let env = std::env::var("ROSPHERE_ENV").unwrap_or_else(|_| "development".into());

    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("data.patient_dir", "data/hemodynamics")?
        .set_default("data.upload_dir", "data/uploads")?
        .set_default("data.retention_seconds", 600)?
        .set_default("replay.tick_interval_ms", 100)?
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{env}")).required(false))
        .add_source(config::Environment::with_prefix("ROSPHERE").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_any_files() {
        let settings = load().expect("defaults should always deserialize");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.data.retention_seconds, 600);
        assert_eq!(settings.replay.tick_interval_ms, 100);
    }
}
