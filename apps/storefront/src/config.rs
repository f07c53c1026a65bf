//! # Storefront Configuration
//!
//! Loads `storefront.toml`, applies environment overrides and validates the
//! result.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults            StorefrontConfig::default()                     │
//! │  2. Config file         --config <path>, else the platform config dir   │
//! │                         (e.g. ~/.config/loom/storefront.toml)           │
//! │  3. Environment         LOOM_DB_PATH, LOOM_CURRENCY,                    │
//! │                         LOOM_FACTORY_DISCOUNT_BPS, LOOM_EXPORT_LANG,    │
//! │                         LOOM_STORE_NAME                                 │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use loom_core::export::Lang;
use loom_core::validation::{validate_currency, validate_discount_bps};
use loom_core::{DiscountRate, ValidationError, DEFAULT_CURRENCY};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Shown in logs and report headers.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency stamped on new orders.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_store_name() -> String {
    "Loom Wholesale".to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Discount on factory-backordered units, in basis points (300 = 3%).
    #[serde(default = "default_factory_discount_bps")]
    pub factory_discount_bps: u32,
}

fn default_factory_discount_bps() -> u32 {
    DiscountRate::FACTORY_DEFAULT.bps()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            factory_discount_bps: default_factory_discount_bps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `loom.db` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Pending writes before commands start waiting on the worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Retries after the first failed attempt. 0 = try once.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_backoff() -> u64 {
    200
}

fn default_max_backoff() -> u64 {
    30
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            queue_capacity: default_queue_capacity(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl PersistenceSettings {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Report language when the caller does not pick one.
    #[serde(default)]
    pub default_lang: Lang,

    /// Directory for exported files. Reports go to stdout when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
///
/// ## Example Config File
/// ```toml
/// [store]
/// name = "Loom Bishkek"
/// currency = "USD"
///
/// [pricing]
/// factory_discount_bps = 300
///
/// [database]
/// path = "/var/lib/loom/loom.db"
///
/// [persistence]
/// queue_capacity = 256
/// max_retries = 5
/// initial_backoff_ms = 200
/// max_backoff_secs = 30
///
/// [export]
/// default_lang = "en"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, creating the parent directory.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        validate_currency(&self.store.currency)?;
        validate_discount_bps(self.pricing.factory_discount_bps)?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.persistence.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "persistence.queue_capacity must be greater than 0".into(),
            ));
        }

        if self.persistence.initial_backoff_ms == 0 {
            return Err(ConfigError::Invalid(
                "persistence.initial_backoff_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `LOOM_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("LOOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(currency) = var("LOOM_CURRENCY") {
            self.store.currency = currency.trim().to_uppercase();
        }

        if let Some(bps) = var("LOOM_FACTORY_DISCOUNT_BPS") {
            match bps.trim().parse::<u32>() {
                Ok(parsed) => {
                    debug!(bps = parsed, "Overriding factory discount from environment");
                    self.pricing.factory_discount_bps = parsed;
                }
                Err(_) => warn!(value = %bps, "Ignoring non-numeric LOOM_FACTORY_DISCOUNT_BPS"),
            }
        }

        if let Some(lang) = var("LOOM_EXPORT_LANG") {
            match lang.parse::<Lang>() {
                Ok(parsed) => self.export.default_lang = parsed,
                Err(_) => warn!(lang = %lang, "Unknown export language in environment"),
            }
        }

        if let Some(name) = var("LOOM_STORE_NAME") {
            self.store.name = name;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "loom", "storefront")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Factory discount as a rate.
    pub fn discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.pricing.factory_discount_bps)
    }

    /// Database file: configured path, else `loom.db` in the platform data
    /// directory, else `loom.db` in the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "loom", "storefront")
            .map(|dirs| dirs.data_dir().join("loom.db"))
            .unwrap_or_else(|| PathBuf::from("loom.db"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.store.currency, "USD");
        assert_eq!(config.discount(), DiscountRate::FACTORY_DEFAULT);
        assert_eq!(config.export.default_lang, Lang::Ru);
        assert_eq!(config.persistence.max_retries, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StorefrontConfig = toml::from_str(
            r#"
            [pricing]
            factory_discount_bps = 500

            [export]
            default_lang = "en"
            "#,
        )
        .unwrap();

        assert_eq!(config.discount().bps(), 500);
        assert_eq!(config.export.default_lang, Lang::En);
        assert_eq!(config.store.name, "Loom Wholesale");
        assert_eq!(config.persistence.queue_capacity, 256);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LOOM_DB_PATH", "/tmp/loom-test.db"),
            ("LOOM_CURRENCY", "kgs"),
            ("LOOM_FACTORY_DISCOUNT_BPS", "250"),
            ("LOOM_EXPORT_LANG", "ky"),
            ("LOOM_STORE_NAME", "Osh Branch"),
        ]);

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/loom-test.db"));
        assert_eq!(config.store.currency, "KGS");
        assert_eq!(config.pricing.factory_discount_bps, 250);
        assert_eq!(config.export.default_lang, Lang::Ky);
        assert_eq!(config.store.name, "Osh Branch");
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = StorefrontConfig::default();
        config.apply_overrides(|k| match k {
            "LOOM_FACTORY_DISCOUNT_BPS" => Some("three".to_string()),
            "LOOM_EXPORT_LANG" => Some("fr".to_string()),
            _ => None,
        });

        assert_eq!(config.pricing.factory_discount_bps, 300);
        assert_eq!(config.export.default_lang, Lang::Ru);
    }

    #[test]
    fn test_validation() {
        let mut config = StorefrontConfig::default();
        config.store.currency = "usd".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = StorefrontConfig::default();
        config.persistence.queue_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = StorefrontConfig::default();
        config.store.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = StorefrontConfig::default();
        config.database.path = Some(PathBuf::from("/data/loom.db"));

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: StorefrontConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.database.path, config.database.path);
        assert_eq!(parsed.pricing.factory_discount_bps, 300);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("loom-storefront-does-not-exist.toml");
        let config = StorefrontConfig::load_or_default(Some(path));
        assert!(!config.store.name.is_empty());
    }
}
