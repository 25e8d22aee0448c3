use anyhow::{Context, Result, anyhow, bail};
use colored::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_FILE: &str = "tc.toml";
pub const DEFAULT_PORT: u16 = 9000;

/// Variables read from `.env` and then from the process environment.
const OVERRIDE_KEYS: [&str; 6] = [
    "TC_HOST",
    "TC_PORT",
    "TC_BIND",
    "TC_TIMEOUT_MS",
    "TC_COOLDOWN_MS",
    "TC_AUDIT",
];

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TcConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_frame_bytes: crate::net::protocol::DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            timeout_ms: 2200,
            cooldown_ms: 5000,
        }
    }
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogStrategy {
    Always,
    ErrorOnly,
    #[default]
    None,
}

impl FromStr for LogStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(LogStrategy::Always),
            "error-only" => Ok(LogStrategy::ErrorOnly),
            "none" => Ok(LogStrategy::None),
            other => bail!("Unknown audit strategy '{}' (expected always, error-only or none)", other),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuditConfig {
    pub strategy: LogStrategy,
    pub dir: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            strategy: LogStrategy::None,
            dir: PathBuf::from(".tc").join("logs"),
        }
    }
}

/// Loads `tc.toml` from `dir` (defaults when it is missing), then layers the
/// `.env` file and finally the process environment on top.
pub fn load_config(dir: &Path) -> Result<TcConfig> {
    let config_path = dir.join(CONFIG_FILE);

    // 1. tc.toml (Base Layer)
    let mut config: TcConfig = if config_path.exists() {
        let content = fs::read_to_string(&config_path).context("Failed to read tc.toml")?;
        toml::from_str(&content).context("Failed to parse tc.toml")?
    } else {
        log::debug!("No {} in {}, using defaults", CONFIG_FILE, dir.display());
        TcConfig::default()
    };

    if config.audit.dir.is_relative() {
        config.audit.dir = dir.join(&config.audit.dir);
    }

    // 2. .env or .env.<TC_ENV> (Override Layer)
    let env_filename = env::var("TC_ENV")
        .map(|v| format!(".env.{}", v))
        .unwrap_or_else(|_| ".env".to_string());
    let env_path = dir.join(&env_filename);

    let mut overrides = HashMap::new();
    if env_path.exists() {
        eprintln!("{} Loading environment from: {}", "🌿".green(), env_filename.bold());
        for item in dotenvy::from_path_iter(&env_path)? {
            let (key, val) = item?;
            overrides.insert(key, val);
        }
    }

    // 3. Process environment wins over .env
    for key in OVERRIDE_KEYS {
        if let Ok(val) = env::var(key) {
            overrides.insert(key.to_string(), val);
        }
    }

    apply_overrides(&mut config, &overrides)?;
    Ok(config)
}

pub fn apply_overrides(config: &mut TcConfig, vars: &HashMap<String, String>) -> Result<()> {
    for (key, value) in vars {
        match key.as_str() {
            "TC_HOST" => config.client.host = value.trim().to_string(),
            "TC_BIND" => config.server.bind = value.trim().to_string(),
            "TC_PORT" => {
                let port = parse_number(key, value)?;
                config.client.port = port;
                config.server.port = port;
            }
            "TC_TIMEOUT_MS" => config.client.timeout_ms = parse_number(key, value)?,
            "TC_COOLDOWN_MS" => config.client.cooldown_ms = parse_number(key, value)?,
            "TC_AUDIT" => {
                config.audit.strategy = value
                    .parse()
                    .with_context(|| format!("Invalid value for {}", key))?
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config: TcConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.client.timeout(), Duration::from_millis(2200));
        assert_eq!(config.client.cooldown(), Duration::from_millis(5000));
        assert_eq!(config.audit.strategy, LogStrategy::None);

        // A missing tc.toml is not an error.
        assert!(load_config(tmp.path()).is_ok());
    }

    #[test]
    fn test_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[client]\nhost = \"files.lan\"\n\n[audit]\nstrategy = \"error-only\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.client.host, "files.lan");
        assert_eq!(config.client.port, 9000);
        assert_eq!(config.audit.strategy, LogStrategy::ErrorOnly);
        assert_eq!(config.audit.dir, tmp.path().join(".tc").join("logs"));
    }

    #[test]
    fn test_bad_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[client]\nport = \"ninety\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = TcConfig::default();
        let vars: HashMap<String, String> = [
            ("TC_HOST", "10.0.0.2"),
            ("TC_PORT", "9100"),
            ("TC_COOLDOWN_MS", "250"),
            ("TC_AUDIT", "always"),
            ("UNRELATED", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        apply_overrides(&mut config, &vars).unwrap();
        assert_eq!(config.client.addr(), "10.0.0.2:9100");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.client.cooldown_ms, 250);
        assert_eq!(config.audit.strategy, LogStrategy::Always);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = TcConfig::default();
        let vars = HashMap::from([("TC_TIMEOUT_MS".to_string(), "soon".to_string())]);
        let err = apply_overrides(&mut config, &vars).unwrap_err();
        assert!(err.to_string().contains("TC_TIMEOUT_MS"));

        let vars = HashMap::from([("TC_AUDIT".to_string(), "sometimes".to_string())]);
        assert!(apply_overrides(&mut config, &vars).is_err());
    }
}
