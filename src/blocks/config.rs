//! Engine configuration
//!
//! `defaults/blocks.default.toml` is embedded so the documented defaults and the runtime
//! behavior stay in sync. Callers layer their own TOML files and single-key overrides on top
//! of it with [Loader] before deserializing into [EngineConfig].

use crate::blocks::parsing::{ChartParser, DescentParser, ParseStrategy, Strategy};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/blocks.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub grammar: GrammarConfig,
    pub parser: ParserConfig,
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    /// Locales whose surface forms are compiled into the grammar, in order
    pub locales: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub strategy: Strategy,
    /// Alternatives kept per chart forest node
    pub forest_cap: usize,
    pub max_trees: usize,
    /// Multiplier on the descent parser's depth budget
    pub budget_factor: usize,
    /// Memo misses after which the descent parser gives up
    pub step_limit: usize,
}

impl ParserConfig {
    /// The configured strategy, ready to use.
    pub fn parser(&self) -> Box<dyn ParseStrategy + Send + Sync> {
        match self.strategy {
            Strategy::Chart => Box::new(ChartParser::new(self.forest_cap)),
            Strategy::Descent => Box::new(DescentParser::new(self.budget_factor, self.step_limit)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorConfig {
    /// Rewrite typographic quotes in token text to ASCII
    pub normalize_quotes: bool,
}

/// Layers user settings over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files are an error at build time.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML text, e.g. from a test.
    pub fn with_toml(mut self, text: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(text, FileFormat::Toml));
        self
    }

    /// Override one dotted key, e.g. `parser.forest_cap`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<EngineConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.grammar.locales, vec!["en", "fr", "es"]);
        assert_eq!(config.parser.strategy, Strategy::Chart);
        assert_eq!(config.parser.forest_cap, 1);
        assert_eq!(config.parser.max_trees, 1);
        assert_eq!(config.parser.step_limit, 200_000);
        assert!(config.evaluator.normalize_quotes);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parser.strategy", "descent")
            .expect("override to apply")
            .set_override("parser.max_trees", 3)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.parser.strategy, Strategy::Descent);
        assert_eq!(config.parser.max_trees, 3);
    }

    #[test]
    fn layers_toml_text() {
        let config = Loader::new()
            .with_toml("[grammar]\nlocales = [\"fr\"]\n[evaluator]\nnormalize_quotes = false\n")
            .build()
            .expect("config to build");
        assert_eq!(config.grammar.locales, vec!["fr"]);
        assert!(!config.evaluator.normalize_quotes);
        assert_eq!(config.parser.forest_cap, 1);
    }

    #[test]
    fn missing_required_file_fails() {
        assert!(Loader::new()
            .with_file("/nonexistent/blocks.toml")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Loader::new()
            .set_override("parser.strategy", "earley")
            .expect("override to apply")
            .build()
            .is_err());
    }
}
