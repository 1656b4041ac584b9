//! Handles settings for the application.
//!
//! Values come from `settings.toml` (or the file named by `SPENDR_CONFIG`),
//! then from `SPENDR__<SECTION>__<KEY>` environment variables.

use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState,
};
use ledger_client::PlaidConfig;
use secrecy::SecretString;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";
const CONFIG_PATH_ENV: &str = "SPENDR_CONFIG";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

fn default_environment() -> String {
    "sandbox".to_string()
}

fn default_client_name() -> String {
    "Spendr".to_string()
}

fn default_country_codes() -> Vec<String> {
    vec!["US".to_string()]
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Plaid {
    pub client_id: String,
    pub secret: SecretString,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_country_codes")]
    pub country_codes: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Plaid {
    /// Client configuration; an unknown environment name is a configuration
    /// error.
    pub fn client_config(&self) -> Result<PlaidConfig, ConfigError> {
        let environment = ledger_client::Environment::try_from(self.environment.as_str())
            .map_err(ConfigError::Message)?;
        let mut config = PlaidConfig::new(&self.client_id, self.secret.clone(), environment);
        config.client_name = self.client_name.clone();
        config.country_codes = self.country_codes.clone();
        config.language = self.language.clone();
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    pub database: Database,
    pub plaid: Plaid,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("SPENDR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("plaid.country_codes")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.plaid.client_config()?;
        Ok(settings)
    }
}
