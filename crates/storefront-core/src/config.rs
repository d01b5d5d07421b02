// Configuration loading and parsing (storefront.toml, host.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::resolve_base_url;
use crate::executor::TransportKind;
use crate::host::ThemeParams;
use crate::listing::ListingLimits;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub transport: TransportKind,
    pub context_source: ContextSource,
    pub timing: TimingConfig,
    pub listing: ListingLimits,
    pub logging: LoggingConfig,
    pub host: HostConfig,
}

// ---------------------------------------------------------------------------
// storefront.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire storefront.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StorefrontFile {
    api: ApiConfig,
    transport: TransportSection,
    #[serde(default)]
    context: ContextSection,
    #[serde(default)]
    timing: TimingConfig,
    #[serde(default)]
    listing: ListingLimits,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct TransportSection {
    kind: TransportKind,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ContextSection {
    #[serde(default)]
    source: ContextSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Absolute (`https://host/api`) or relative to `page_origin` (`/api`).
    pub base_url: String,
    #[serde(default = "default_page_origin")]
    pub page_origin: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_page_origin() -> String {
    "http://localhost:8000".into()
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Where the buy page gets its item details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Everything comes from the launch link's query string.
    #[default]
    Query,
    /// `itemId` comes from the query, the rest from `GET /items/{id}`.
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub bridge_success_delay_ms: u64,
    pub close_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            bridge_success_delay_ms: 500,
            close_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// host.toml structs
// ---------------------------------------------------------------------------

/// Values a real Telegram client would supply. Only the terminal host reads
/// these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub init_data: String,
    #[serde(default)]
    pub theme: ThemeParams,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/storefront.toml` and
/// (optionally) `config/host.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- storefront.toml (required) ---
    let storefront_path = config_dir.join("storefront.toml");
    let storefront_text = read_file(&storefront_path)?;
    let file: StorefrontFile =
        toml::from_str(&storefront_text).map_err(|e| ConfigError::ParseError {
            path: storefront_path.clone(),
            source: e,
        })?;

    // --- host.toml (optional) ---
    let host_path = config_dir.join("host.toml");
    let host = if host_path.exists() {
        let host_text = read_file(&host_path)?;
        toml::from_str(&host_text).map_err(|e| ConfigError::ParseError {
            path: host_path.clone(),
            source: e,
        })?
    } else {
        HostConfig::default()
    };

    let config = Config {
        api: file.api,
        transport: file.transport.kind,
        context_source: file.context.source,
        timing: file.timing,
        listing: file.listing,
        logging: file.logging,
        host,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` into `config/`. `host.toml` ships only as
/// `host.toml.example`.
const SEEDED_FILES: [&str; 2] = ["storefront.toml", "host.toml"];

/// Seed `config/` under `--config-dir` from `defaults/`, never overwriting a
/// file that is already there. Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        // Nothing to seed from; an existing config/ is all we need.
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "--config-dir {} has neither defaults/ nor config/",
                    base_dir.display()
                ),
            })
        };
    }

    let mut seeded = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if !source.is_file() || target.exists() {
            continue;
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| copy_error(&config_dir, e))?;
        std::fs::copy(&source, &target).map_err(|e| copy_error(&target, e))?;
        seeded.push(target);
    }
    Ok(seeded)
}

fn copy_error(path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("cannot write {}: {e}", path.display()),
    }
}

/// Load config relative to `base_dir`, copying defaults first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: "must not be empty".into(),
        });
    }
    if let Err(e) = resolve_base_url(&config.api.base_url, &config.api.page_origin) {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: e.to_string(),
        });
    }

    if config.api.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.request_timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    let limit_fields: &[(&str, usize)] = &[
        ("listing.max_name_len", config.listing.max_name_len),
        ("listing.max_description_len", config.listing.max_description_len),
    ];
    for (name, val) in limit_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".into(),
            message: format!(
                "must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.logging.level
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
