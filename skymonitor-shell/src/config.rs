use crate::metrics::DisplayIds;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShellConfig {
    pub backend: BackendConf,
    pub mqtt: MqttConf,
    pub navigation: NavigationConf,
    pub metrics: MetricsConf,
    pub notifications: NotificationsConf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConf {
    pub base_url: String, // ex: "http://localhost:5000"
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConf {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String, // dernier segment = nom d'événement
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConf {
    pub initial_path: String,
    /// Fragment sans marqueur de contenu : panneau d'erreur au lieu de
    /// restaurer le contenu précédent.
    pub strict_fragments: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConf {
    /// Fenêtre d'inactivité (et seuil de péremption) avant simulation
    pub inactivity_ms: u64,
    pub tick_ms: u64,
    /// Amplitude totale du pas aléatoire (delta dans ±step/2)
    pub step: f64,
    pub seed: SeedRanges,
    pub display: DisplayIds,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedRanges {
    pub cpu: [f64; 2],
    pub memory: [f64; 2],
    pub disk: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConf {
    pub duration_ms: u64,
}

impl Default for BackendConf {
    fn default() -> Self {
        Self { base_url: "http://localhost:5000".into(), timeout_ms: 10_000 }
    }
}

impl Default for MqttConf {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            client_id: "skymonitor-shell".into(),
            topic: "skymonitor/events/+".into(),
        }
    }
}

impl Default for NavigationConf {
    fn default() -> Self {
        Self { initial_path: "/".into(), strict_fragments: false }
    }
}

impl Default for MetricsConf {
    fn default() -> Self {
        Self {
            inactivity_ms: 7000,
            tick_ms: 2000,
            step: 6.0,
            seed: SeedRanges::default(),
            display: DisplayIds::default(),
        }
    }
}

impl Default for SeedRanges {
    fn default() -> Self {
        Self { cpu: [5.0, 15.0], memory: [20.0, 40.0], disk: [30.0, 50.0] }
    }
}

impl Default for NotificationsConf {
    fn default() -> Self {
        Self { duration_ms: 3000 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SeedRanges {
    /// Chaque plage doit être finie, ordonnée et dans [0, 100].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("metrics.seed.cpu", self.cpu),
            ("metrics.seed.memory", self.memory),
            ("metrics.seed.disk", self.disk),
        ];
        for (field, [low, high]) in ranges {
            let ok = low.is_finite() && high.is_finite() && low <= high && low >= 0.0 && high <= 100.0;
            if !ok {
                return Err(ConfigError::Invalid { field, reason: format!("[{low}, {high}]") });
            }
        }
        Ok(())
    }
}

impl MetricsConf {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid { field: "metrics.tick_ms", reason: "0".into() });
        }
        if !self.step.is_finite() || self.step < 0.0 {
            return Err(ConfigError::Invalid { field: "metrics.step", reason: self.step.to_string() });
        }
        self.seed.validate()
    }
}

/// Parse un YAML de configuration ; un document vide donne les valeurs par défaut
pub fn parse_config(txt: &str) -> Result<ShellConfig, ConfigError> {
    if txt.trim().is_empty() {
        return Ok(ShellConfig::default());
    }
    let cfg: ShellConfig = serde_yaml::from_str(txt)?;
    cfg.metrics.validate()?;
    Ok(cfg)
}

pub async fn load_config_from<P: AsRef<Path>>(path: P) -> Result<ShellConfig, ConfigError> {
    let txt = fs::read_to_string(path).await?;
    parse_config(&txt)
}

/// Charge `SKYMONITOR_SHELL_CONFIG` (défaut `shell.yaml`).
/// Fichier absent ou invalide => configuration par défaut.
pub async fn load_config() -> ShellConfig {
    let path = std::env::var("SKYMONITOR_SHELL_CONFIG").unwrap_or_else(|_| "shell.yaml".into());
    let mut cfg = if Path::new(&path).exists() {
        load_config_from(&path).await.unwrap_or_else(|e| {
            warn!("config invalide ({path}): {e}");
            ShellConfig::default()
        })
    } else {
        warn!("pas de {path}, usage config par défaut");
        ShellConfig::default()
    };

    if let Ok(url) = std::env::var("SKYMONITOR_BACKEND_URL") {
        cfg.backend.base_url = url;
    }
    cfg
}
