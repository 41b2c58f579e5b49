//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `khrushchevka.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use khrushchevka_app::flows::{LiveOptions, ReplayOptions, ValidateOptions};

/// Flows the daemon registers, selectable at startup.
pub const FLOWS: [&str; 4] = ["live", "manual", "replay", "validate"];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Expander boards on the I²C bus.
    pub hardware: HardwareConfig,
    /// Building layout.
    pub building: BuildingConfig,
    /// Flow selected at startup.
    pub flows: FlowsConfig,
    /// Live flow tuning.
    pub live: LiveConfig,
    /// Replay flow tuning.
    pub replay: ReplayConfig,
    /// Snapshot destination.
    pub snapshot: SnapshotConfig,
    /// Wiring walk tuning.
    pub validate: ValidateConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Board addresses, e.g. `[32, 33]` for `0x20` and `0x21`.
    pub boards: Vec<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    /// TOML building map; the built-in layout is used when unset.
    pub map_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FlowsConfig {
    pub initial: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub max_delay_ms: u64,
    pub flat_ttl_secs: u64,
    pub service_ttl_secs: u64,
    pub max_changes: u32,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub showtime_ms: u64,
    pub replay_file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// How long each pin stays lit.
    pub delay_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl Config {
    /// Load configuration from `khrushchevka.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("khrushchevka.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("KHRUSHCHEVKA_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("KHRUSHCHEVKA_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("KHRUSHCHEVKA_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(boards) = var("KHRUSHCHEVKA_BOARDS").and_then(|val| parse_boards(&val)) {
            self.hardware.boards = boards;
        }
        if let Some(val) = var("KHRUSHCHEVKA_FLOW") {
            self.flows.initial = val;
        }
        if let Some(val) = var("KHRUSHCHEVKA_REPLAY_FILE") {
            self.replay.replay_file = PathBuf::from(val);
        }
        if let Some(val) = var("KHRUSHCHEVKA_SNAPSHOT") {
            self.snapshot.path = PathBuf::from(val);
        }
        if let Some(delay) = var("KHRUSHCHEVKA_VALIDATE_DELAY_MS").and_then(|val| val.parse().ok()) {
            self.validate.delay_ms = delay;
        }
        if let Some(val) = var("KHRUSHCHEVKA_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.hardware.boards.is_empty() {
            return Err(ConfigError::Validation(
                "at least one board must be configured".to_string(),
            ));
        }
        if self.live.max_changes == 0 {
            return Err(ConfigError::Validation(
                "live.max_changes must be positive".to_string(),
            ));
        }
        if self.validate.delay_ms == 0 {
            return Err(ConfigError::Validation(
                "validate.delay_ms must be positive".to_string(),
            ));
        }
        if !FLOWS.contains(&self.flows.initial.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown initial flow {:?}, expected one of {FLOWS:?}",
                self.flows.initial
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn live_options(&self) -> LiveOptions {
        LiveOptions {
            max_delay: Duration::from_millis(self.live.max_delay_ms),
            flat_ttl: Duration::from_secs(self.live.flat_ttl_secs),
            service_ttl: Duration::from_secs(self.live.service_ttl_secs),
            max_changes: self.live.max_changes,
            seed: self.live.seed,
        }
    }

    #[must_use]
    pub fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            showtime: Duration::from_millis(self.replay.showtime_ms),
            replay_file: self.replay.replay_file.clone(),
        }
    }

    #[must_use]
    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            delay: Duration::from_millis(self.validate.delay_ms),
        }
    }
}

/// Comma-separated board list; each entry decimal (`32`) or hex (`0x20`).
fn parse_boards(raw: &str) -> Option<Vec<u8>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.strip_prefix("0x") {
            Some(hex) => u8::from_str_radix(hex, 16).ok(),
            None => entry.parse().ok(),
        })
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "khrushchevkad=info,khrushchevka=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            boards: (0x20..=0x25).collect(),
        }
    }
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            initial: "live".to_string(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        let defaults = LiveOptions::default();
        Self {
            max_delay_ms: 5_000,
            flat_ttl_secs: defaults.flat_ttl.as_secs(),
            service_ttl_secs: defaults.service_ttl.as_secs(),
            max_changes: defaults.max_changes,
            seed: None,
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            showtime_ms: 1_000,
            replay_file: PathBuf::from("snapshot.jsonl"),
        }
    }
}

impl Default for ValidateConfig {
    fn default() -> Self {
        let delay = ValidateOptions::default().delay;
        Self {
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("snapshot.jsonl"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
