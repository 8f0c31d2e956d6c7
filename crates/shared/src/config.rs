//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Calculator defaults.
    #[serde(default)]
    pub calculator: CalculatorConfig,
    /// Persistence configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Calculator defaults applied to new sites and forms.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorConfig {
    /// Multiplier preselected on a fresh form (`"1"`, `"1.1"`, `"1.2"` or `"1.3"`).
    #[serde(default = "default_multiplier")]
    pub default_multiplier: String,
    /// Name of the non-deletable first site.
    #[serde(default = "default_site_name")]
    pub default_site_name: String,
    /// Prefix used when naming added sites (`"New Site 2"`).
    #[serde(default = "default_new_site_prefix")]
    pub new_site_prefix: String,
}

fn default_multiplier() -> String {
    "1.1".to_string()
}

fn default_site_name() -> String {
    "Default Site".to_string()
}

fn default_new_site_prefix() -> String {
    "New Site".to_string()
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_multiplier: default_multiplier(),
            default_site_name: default_site_name(),
            new_site_prefix: default_new_site_prefix(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory used by the file-backed store.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Prefix of every persisted key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_namespace() -> String {
    "calculator".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            namespace: default_namespace(),
        }
    }
}

impl StorageConfig {
    /// Builds the persisted key for `suffix` inside this namespace.
    #[must_use]
    pub fn key(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.namespace)
    }
}

impl AppConfig {
    /// Loads configuration from `.env`, config files and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CAISSE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
