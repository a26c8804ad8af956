use std::{fs, fs::File, io::Write, path::Path, time::Duration};

use anyhow::{Context, Result};
use config::{Config, Environment};
use log::info;
use serde::Deserialize;

/// Resolved application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root of the ERP REST API; service namespaces are appended per client.
    pub api_base_url: String,
    /// Per-request deadline in milliseconds.
    pub timeout_ms: u64,
    /// Default page size for list commands.
    pub page_size: u32,
    /// JSON credentials file holding the bearer token.
    pub credentials_file: String,
    /// Freshness window for cached list responses, in seconds.
    pub cache_ttl_secs: u64,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

pub fn get_default_config() -> &'static str {
    include_str!("../../config/config.toml")
}

/// Loads settings from `path`, creating it with defaults on first run, then
/// applying `CAMPUS_*` environment overrides.
pub fn load_configuration(path: &Path) -> Result<Settings> {
    if !path.exists() {
        write_config_to(path, get_default_config()).context("Could not create default config")?;
        info!(path:% = path.display(); "Created new configuration file");
    }

    let filename = path.to_str().context("Invalid config file path")?;

    let cfg = Config::builder()
        .add_source(config::File::with_name(filename))
        .add_source(Environment::with_prefix("CAMPUS").prefix_separator("_").separator("__"))
        .build()
        .context("Could not build config")?;

    cfg.try_deserialize().context("Invalid configuration values")
}

pub fn write_config_to(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create parent directories")?;
    };

    let mut file = File::create(path).context("Failed to create config file")?;
    file.write_all(source.as_bytes())
        .context("Failed to write config content")?;
    file.write_all(b"\n").context("Failed to write newline")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn first_run_writes_defaults_and_loads_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = load_configuration(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.api_base_url, "http://127.0.0.1:8000/api");
        assert_eq!(settings.timeout_ms, 10_000);
        assert_eq!(settings.page_size, 25);
    }

    #[test]
    #[serial]
    fn env_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        unsafe { std::env::set_var("CAMPUS_API_BASE_URL", "http://erp.test:9000/api") };
        let settings = load_configuration(&path).unwrap();
        unsafe { std::env::remove_var("CAMPUS_API_BASE_URL") };

        assert_eq!(settings.api_base_url, "http://erp.test:9000/api");
    }
}
