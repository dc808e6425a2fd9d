//! Load runtime configuration, falling back to built-in defaults.

use serde::Deserialize;
use std::{fs, path::Path};

use anyhow::Context;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceCfg {
    pub endpoint: String,
    pub timeout_sec: u64, // whole-request deadline, connect included
}

impl Default for ServiceCfg {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/predict/".to_string(),
            timeout_sec: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogCfg {
    pub path: String,
}

impl Default for LogCfg {
    fn default() -> Self {
        Self {
            path: "stockcast.log".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceCfg,
    pub companies: Vec<String>,
    pub log: LogCfg,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceCfg::default(),
            companies: default_companies(),
            log: LogCfg::default(),
        }
    }
}

fn default_companies() -> Vec<String> {
    ["AAPL", "MSFT", "AMZN", "TSLA", "GOOG", "NVDA", "INFY"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl AppConfig {
    /// Read `path` if present; a missing file means the defaults apply.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self = serde_yaml::from_str(&s)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AppConfig::load("definitely-not-here.yaml").expect("defaults");
        assert_eq!(cfg.service.endpoint, "http://localhost:8000/predict/");
        assert_eq!(cfg.service.timeout_sec, 30);
        assert_eq!(cfg.companies.len(), 7);
        assert_eq!(cfg.companies[0], "AAPL");
        assert_eq!(cfg.log.path, "stockcast.log");
    }

    #[test]
    fn partial_yaml_fills_missing_sections_with_defaults() {
        let yaml = "service:\n  endpoint: http://127.0.0.1:9000/predict/\n";
        let cfg: AppConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(cfg.service.endpoint, "http://127.0.0.1:9000/predict/");
        // Untouched knobs keep their defaults.
        assert_eq!(cfg.service.timeout_sec, 30);
        assert_eq!(cfg.companies[0], "AAPL");
    }

    #[test]
    fn full_yaml_overrides_everything() {
        let yaml = r#"
service:
  endpoint: http://10.0.0.5:8000/predict/
  timeout_sec: 5
companies:
  - ZZZZ
log:
  path: /tmp/other.log
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(cfg.service.timeout_sec, 5);
        assert_eq!(cfg.companies, vec!["ZZZZ".to_string()]);
        assert_eq!(cfg.log.path, "/tmp/other.log");
    }
}
