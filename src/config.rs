// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};
use tracing::info;

/// Process-wide settings, fixed at startup.
///
/// Resolution order: built-in defaults, then the optional YAML file named by
/// `DASHBOARD_CONFIG`, then the `BEES_CSV` / `HOST` / `PORT` env vars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub service_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("intro_bees.csv"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8050,
            service_name: "bee-colony-dashboard".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var("DASHBOARD_CONFIG") {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: AppConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Apply env-style overrides. `lookup` is `env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BEES_CSV") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(host) = lookup("HOST") {
            self.host = host
                .parse()
                .with_context(|| format!("HOST `{}` is not an IP address", host))?;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("PORT `{}` is not a port number", port))?;
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
