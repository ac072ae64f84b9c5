//! Text to blueprint pipeline
//!
//!     An [Engine] owns one compiled language: lexicon, grammar with every enabled locale
//!     folded in, template table, and the configured parsing strategy. All of it is built once
//!     and read-only afterwards, so one engine serves any number of requests:
//!
//!         text -> tokenize -> parse -> concrete trees -> evaluate -> blueprints
//!
//!     The bundled language lives in `grammar/` and is embedded at compile time;
//!     [Engine::standard] builds it once per process with the default configuration.

use crate::blocks::building::{
    Blueprint, EvaluateError, Evaluator, TemplateError, TemplateTable,
};
use crate::blocks::config::{load_defaults, EngineConfig};
use crate::blocks::grammar::{compile, CompiledGrammar, GrammarError, GrammarSource};
use crate::blocks::lexing::{tokenize, Lexicon, LexiconError, Token};
use crate::blocks::locale::{LocaleError, LocaleTable};
use crate::blocks::parsing::{ConcreteParseTree, ParseError, ParseStrategy};
use once_cell::sync::Lazy;
use std::fmt;

const BUNDLED_TOKENS: &str = include_str!("../../grammar/tokens.yaml");
const BUNDLED_RULES: &str = include_str!("../../grammar/rules.yaml");
const BUNDLED_TEMPLATES: &str = include_str!("../../grammar/templates.yaml");
const BUNDLED_LOCALES: &[&str] = &[
    include_str!("../../grammar/locales/en.yaml"),
    include_str!("../../grammar/locales/fr.yaml"),
    include_str!("../../grammar/locales/es.yaml"),
];

static STANDARD: Lazy<Result<Engine, EngineError>> = Lazy::new(|| {
    let config = load_defaults().map_err(|e| EngineError::Config(e.to_string()))?;
    Engine::from_sources(&GrammarSources::bundled(), &config)
});

/// The YAML documents that define a language.
#[derive(Debug, Clone, Default)]
pub struct GrammarSources {
    pub tokens: String,
    pub rules: String,
    pub templates: String,
    /// One document per locale
    pub locales: Vec<String>,
}

impl GrammarSources {
    pub fn bundled() -> Self {
        Self {
            tokens: BUNDLED_TOKENS.to_string(),
            rules: BUNDLED_RULES.to_string(),
            templates: BUNDLED_TEMPLATES.to_string(),
            locales: BUNDLED_LOCALES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Config(String),
    Lexicon(LexiconError),
    Locale(LocaleError),
    Grammar(GrammarError),
    Template(TemplateError),
    Parse(ParseError),
    Evaluate(EvaluateError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            EngineError::Lexicon(err) => write!(f, "{}", err),
            EngineError::Locale(err) => write!(f, "{}", err),
            EngineError::Grammar(err) => write!(f, "{}", err),
            EngineError::Template(err) => write!(f, "{}", err),
            EngineError::Parse(err) => write!(f, "{}", err),
            EngineError::Evaluate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<LexiconError> for EngineError {
    fn from(err: LexiconError) -> Self {
        EngineError::Lexicon(err)
    }
}

impl From<LocaleError> for EngineError {
    fn from(err: LocaleError) -> Self {
        EngineError::Locale(err)
    }
}

impl From<GrammarError> for EngineError {
    fn from(err: GrammarError) -> Self {
        EngineError::Grammar(err)
    }
}

impl From<TemplateError> for EngineError {
    fn from(err: TemplateError) -> Self {
        EngineError::Template(err)
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::Parse(err)
    }
}

impl From<EvaluateError> for EngineError {
    fn from(err: EvaluateError) -> Self {
        EngineError::Evaluate(err)
    }
}

pub struct Engine {
    lexicon: Lexicon,
    locales: LocaleTable,
    grammar: CompiledGrammar,
    templates: TemplateTable,
    evaluator: Evaluator,
    parser: Box<dyn ParseStrategy + Send + Sync>,
    config: EngineConfig,
}

impl Engine {
    /// Assemble an engine. Any problem with the documents is reported here, never later.
    pub fn from_sources(sources: &GrammarSources, config: &EngineConfig) -> Result<Self, EngineError> {
        let lexicon = Lexicon::from_yaml(&sources.tokens)?;

        let mut locales = LocaleTable::new();
        for document in &sources.locales {
            locales.load_yaml(document)?;
        }

        let source = GrammarSource::from_yaml(&sources.rules)?;
        let grammar = compile(
            &source,
            &lexicon.kinds(),
            &locales,
            &config.grammar.locales,
        )?;

        let templates = TemplateTable::from_yaml(&sources.templates)?;
        templates.check_symbols(grammar.rules())?;

        tracing::debug!(
            token_patterns = lexicon.patterns().len(),
            locales = ?config.grammar.locales,
            templates = templates.len(),
            strategy = %config.parser.strategy,
            "engine assembled"
        );

        Ok(Self {
            lexicon,
            locales,
            grammar,
            templates,
            evaluator: Evaluator::new(config.evaluator.normalize_quotes),
            parser: config.parser.parser(),
            config: config.clone(),
        })
    }

    /// The bundled language with the default configuration, built on first use.
    pub fn standard() -> Result<&'static Engine, EngineError> {
        Lazy::force(&STANDARD).as_ref().map_err(Clone::clone)
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn locales(&self) -> &LocaleTable {
        &self.locales
    }

    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text, &self.lexicon)
    }

    /// Parse trees with the configured strategy and tree limit. Empty when `text` is not a
    /// statement of the language.
    pub fn parse_trees(&self, text: &str) -> Result<Vec<ConcreteParseTree>, EngineError> {
        self.parse_trees_with(text, self.parser.as_ref(), self.config.parser.max_trees)
    }

    /// Parse trees with any strategy.
    pub fn parse_trees_with(
        &self,
        text: &str,
        strategy: &dyn ParseStrategy,
        max_trees: usize,
    ) -> Result<Vec<ConcreteParseTree>, EngineError> {
        let tokens = self.tokenize(text);
        Ok(strategy.parse(&self.grammar, &tokens, max_trees)?)
    }

    pub fn evaluate(&self, tree: &ConcreteParseTree) -> Result<Blueprint, EngineError> {
        Ok(self.evaluator.evaluate(tree, &self.templates)?)
    }

    /// One blueprint per parse tree, in tree order.
    pub fn blueprints(&self, text: &str) -> Result<Vec<Blueprint>, EngineError> {
        self.parse_trees(text)?
            .iter()
            .map(|tree| self.evaluate(tree))
            .collect()
    }

    /// The first blueprint, or `None` when `text` does not parse.
    pub fn blueprint(&self, text: &str) -> Result<Option<Blueprint>, EngineError> {
        Ok(self.blueprints(text)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::config::Loader;

    fn engine() -> &'static Engine {
        Engine::standard().expect("bundled grammar to compile")
    }

    #[test]
    fn test_standard_engine_builds() {
        let engine = engine();
        assert_eq!(engine.grammar().start(), "statement");
        assert!(engine.grammar().max_unit_chain_depth() >= 3);
        assert_eq!(engine.locales().locales(), &["en", "fr", "es"]);
    }

    #[test]
    fn test_display_statement() {
        let blueprint = engine().blueprint("display(\"hi\")").unwrap().unwrap();
        insta::assert_snapshot!(
            blueprint.to_string(),
            @r#"{"type":"text_print","fields":{},"children":{"TEXT":{"type":"text","fields":{"TEXT":"hi"},"children":{}}}}"#
        );
    }

    #[test]
    fn test_no_parse_is_none() {
        assert_eq!(engine().blueprint("display(").unwrap(), None);
        assert_eq!(engine().blueprint("").unwrap(), None);
    }

    #[test]
    fn test_template_for_unknown_symbol_is_rejected() {
        let mut sources = GrammarSources::bundled();
        sources.templates.push_str("\nno_such_rule: nothing\n");
        let config = load_defaults().unwrap();
        assert!(matches!(
            Engine::from_sources(&sources, &config),
            Err(EngineError::Template(TemplateError::UnknownSymbol(symbol))) if symbol == "no_such_rule"
        ));
    }

    #[test]
    fn test_disabled_locale_does_not_parse() {
        let config = Loader::new()
            .with_toml("[grammar]\nlocales = [\"en\"]\n")
            .build()
            .unwrap();
        let engine = Engine::from_sources(&GrammarSources::bundled(), &config).unwrap();
        assert!(engine.blueprint("display(1)").unwrap().is_some());
        assert_eq!(engine.blueprint("afficher(1)").unwrap(), None);
    }
}
