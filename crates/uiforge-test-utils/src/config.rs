//! Configuration builders for tests.

use std::path::Path;

use uiforge_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .catalog_dir(fixture.path())
///     .api_key("sk-test")
///     .max_turns(4)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn development(mut self) -> Self {
        self.config.server.environment = "development".to_string();
        self
    }

    pub fn catalog_dir(mut self, dir: &Path) -> Self {
        self.config.catalog.dir = dir.display().to_string();
        self
    }

    pub fn catalog_extension(mut self, extension: &str) -> Self {
        self.config.catalog.extension = extension.to_string();
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.config.llm.api_key = key.to_string();
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.llm.model = model.to_string();
        self
    }

    pub fn max_turns(mut self, turns: u32) -> Self {
        self.config.agent.max_turns = turns;
        self
    }

    pub fn code_language(mut self, language: &str) -> Self {
        self.config.agent.code_language = language.to_string();
        self
    }

    pub fn pricing(mut self, input_per_1k: f64, output_per_1k: f64) -> Self {
        self.config.pricing.input_cost_per_1k = input_per_1k;
        self.config.pricing.output_cost_per_1k = output_per_1k;
        self
    }

    pub fn require_identity(mut self, required: bool) -> Self {
        self.config.session.require_identity = required;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
