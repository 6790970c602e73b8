#![deny(unsafe_code)]

//! Configuration loading and validation for uiforge.
//!
//! Loads TOML configuration files and validates them against expected schemas.
//! Provides the [`AppConfig`] type as the central configuration structure.
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration once the model credential is supplied through the
//! environment.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Component documentation catalog.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Model provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop limits and output handling.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Token pricing used for cost estimates.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Caller identity gating on the HTTP surface.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port the server binds to.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Deployment environment: "production" or "development".
    ///
    /// In development, error responses carry the full error chain.
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServerConfig {
    /// Whether error responses may include internal detail.
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            environment: default_environment(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "production".to_string()
}

/// Location and format of the component documentation catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding one documentation file per component.
    #[serde(default = "default_catalog_dir")]
    pub dir: String,

    /// Documentation file extension, without the leading dot.
    #[serde(default = "default_catalog_extension")]
    pub extension: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: default_catalog_dir(),
            extension: default_catalog_extension(),
        }
    }
}

fn default_catalog_dir() -> String {
    "src/components".to_string()
}

fn default_catalog_extension() -> String {
    "md".to_string()
}

/// Model provider configuration.
///
/// ## TOML Example
///
/// ```toml
/// [llm]
/// api_key_env = "ANTHROPIC_API_KEY"
/// model = "claude-3-7-sonnet-20250219"
/// max_tokens = 8192
/// betas = ["token-efficient-tools-2025-02-19"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key. Normally left empty and filled from `api_key_env`.
    #[serde(default)]
    pub api_key: String,

    /// Environment variable consulted when `api_key` is empty.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens the model may generate per request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature. Omitted from requests when unset.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Provider beta features enabled on every request.
    #[serde(default = "default_betas")]
    pub betas: Vec<String>,

    /// Override for the Messages API endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Whether a credential is available.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            betas: default_betas(),
            base_url: None,
        }
    }
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_model() -> String {
    "claude-3-7-sonnet-20250219".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_betas() -> Vec<String> {
    vec!["token-efficient-tools-2025-02-19".to_string()]
}

/// Agent loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model requests per conversation (0 = unbounded).
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Wall-clock budget per conversation in seconds (0 = no deadline).
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Language tag of the fenced block extracted from the final answer.
    #[serde(default = "default_code_language")]
    pub code_language: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            deadline_secs: default_deadline_secs(),
            code_language: default_code_language(),
        }
    }
}

fn default_max_turns() -> u32 {
    32
}

fn default_deadline_secs() -> u64 {
    300
}

fn default_code_language() -> String {
    "jsx".to_string()
}

/// Token pricing in currency units per 1K tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_input_cost")]
    pub input_cost_per_1k: f64,

    #[serde(default = "default_output_cost")]
    pub output_cost_per_1k: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_cost_per_1k: default_input_cost(),
            output_cost_per_1k: default_output_cost(),
        }
    }
}

fn default_input_cost() -> f64 {
    0.003
}

fn default_output_cost() -> f64 {
    0.015
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Caller identity gating.
///
/// The identity itself comes from an upstream session layer (a reverse
/// proxy or auth gateway) that forwards it in a request header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reject generation requests that carry no identity.
    #[serde(default)]
    pub require_identity: bool,

    /// Header carrying the authenticated identity.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            require_identity: false,
            identity_header: default_identity_header(),
        }
    }
}

fn default_identity_header() -> String {
    "x-user-email".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Fill environment-sourced values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Fill environment-sourced values using the given lookup.
    ///
    /// A key set in the file always wins over the environment.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.llm.has_api_key() {
            return;
        }
        if let Some(key) = lookup(&self.llm.api_key_env).filter(|k| !k.trim().is_empty()) {
            debug!(var = %self.llm.api_key_env, "API key loaded from environment");
            self.llm.api_key = key;
        }
    }

    /// A copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.has_api_key() {
            copy.llm.api_key = "[REDACTED]".to_string();
        }
        copy
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_port == 0 {
            return Err(ConfigError::Validation(
                "server.listen_port must be non-zero".to_string(),
            ));
        }
        if self.server.listen_addr.is_empty() {
            return Err(ConfigError::Validation(
                "server.listen_addr must not be empty".to_string(),
            ));
        }
        let valid_environments = ["production", "development"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(ConfigError::Validation(format!(
                "server.environment must be one of {:?}, got {:?}",
                valid_environments, self.server.environment
            )));
        }

        if self.catalog.dir.is_empty() {
            return Err(ConfigError::Validation(
                "catalog.dir must not be empty".to_string(),
            ));
        }
        if self.catalog.extension.is_empty() || self.catalog.extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "catalog.extension must be non-empty and given without a leading dot, got {:?}",
                self.catalog.extension
            )));
        }

        if self.llm.model.is_empty() {
            return Err(ConfigError::Validation(
                "llm.model must not be empty".to_string(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "llm.max_tokens must be non-zero".to_string(),
            ));
        }
        if let Some(t) = self.llm.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::Validation(format!(
                    "llm.temperature must be in [0.0, 1.0], got {t}"
                )));
            }
        }

        for (name, price) in [
            ("pricing.input_cost_per_1k", self.pricing.input_cost_per_1k),
            ("pricing.output_cost_per_1k", self.pricing.output_cost_per_1k),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {price}"
                )));
            }
        }

        if self.agent.code_language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "agent.code_language must not be empty".to_string(),
            ));
        }

        if self.session.identity_header.is_empty() {
            return Err(ConfigError::Validation(
                "session.identity_header must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
