//! Declarative grammar source
//!
//! The rule table as written by grammar authors, before compilation:
//!
//! ```text
//! start: statement
//! terminals: [display]
//! rules:
//!   statement:
//!     display_statement: display lparen expression rparen
//!   expression: value | lparen expression rparen
//! ```
//!
//! A rule value is a production string, a list of production strings, a map of named
//! alternatives (each itself a rule value), or empty. Declaration order is preserved
//! everywhere because the parsers' tie-breaks depend on it.

use super::error::GrammarError;
use serde_yaml::Value;

/// Start symbol used when a grammar document does not name one.
pub const DEFAULT_START: &str = "statement";

/// The right-hand side of one declared rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// Unnamed productions, in notation
    Productions(Vec<String>),
    /// Named alternatives: each name becomes its own rule
    Named(Vec<(String, RuleSource)>),
}

/// A whole grammar document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSource {
    pub start: String,
    pub terminals: Vec<String>,
    pub rules: Vec<(String, RuleSource)>,
}

impl GrammarSource {
    pub fn new(start: &str) -> Self {
        Self {
            start: start.to_string(),
            terminals: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Declare a terminal whose forms come from the locale tables.
    pub fn terminal(mut self, name: &str) -> Self {
        self.terminals.push(name.to_string());
        self
    }

    /// Add one production (which may itself contain `|`) to `lhs`.
    pub fn rule(mut self, lhs: &str, production: &str) -> Self {
        self.rules.push((
            lhs.to_string(),
            RuleSource::Productions(vec![production.to_string()]),
        ));
        self
    }

    /// Add named alternatives to `lhs`.
    pub fn named(mut self, lhs: &str, alternatives: &[(&str, &str)]) -> Self {
        let named = alternatives
            .iter()
            .map(|(name, production)| {
                (
                    name.to_string(),
                    RuleSource::Productions(vec![production.to_string()]),
                )
            })
            .collect();
        self.rules.push((lhs.to_string(), RuleSource::Named(named)));
        self
    }

    pub fn from_yaml(source: &str) -> Result<Self, GrammarError> {
        let document: Value =
            serde_yaml::from_str(source).map_err(|e| GrammarError::Malformed(e.to_string()))?;
        let Value::Mapping(document) = document else {
            return Err(GrammarError::Malformed(
                "grammar document must be a mapping".to_string(),
            ));
        };

        let start = match document.get("start") {
            None => DEFAULT_START.to_string(),
            Some(value) => scalar(value).ok_or_else(|| {
                GrammarError::Malformed("'start' must be a symbol name".to_string())
            })?,
        };

        let terminals = match document.get("terminals") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    scalar(item).ok_or_else(|| {
                        GrammarError::Malformed("'terminals' must list symbol names".to_string())
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(GrammarError::Malformed(
                    "'terminals' must be a list".to_string(),
                ))
            }
        };

        let rules = match document.get("rules") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Mapping(rules)) => rules
                .iter()
                .map(|(name, value)| {
                    let name = scalar(name).ok_or_else(|| {
                        GrammarError::Malformed("rule names must be strings".to_string())
                    })?;
                    let rule = rule_source(&name, value)?;
                    Ok((name, rule))
                })
                .collect::<Result<_, GrammarError>>()?,
            Some(_) => {
                return Err(GrammarError::Malformed(
                    "'rules' must be a mapping".to_string(),
                ))
            }
        };

        Ok(Self {
            start,
            terminals,
            rules,
        })
    }
}

fn rule_source(name: &str, value: &Value) -> Result<RuleSource, GrammarError> {
    match value {
        Value::Null => Ok(RuleSource::Productions(Vec::new())),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar(item).ok_or_else(|| {
                    GrammarError::Malformed(format!(
                        "rule '{}' lists something that is not a production",
                        name
                    ))
                })
            })
            .collect::<Result<_, _>>()
            .map(RuleSource::Productions),
        Value::Mapping(entries) => entries
            .iter()
            .map(|(alt_name, alt_value)| {
                let alt_name = scalar(alt_name).ok_or_else(|| {
                    GrammarError::Malformed(format!(
                        "rule '{}' has an alternative name that is not a string",
                        name
                    ))
                })?;
                let alt_rule = rule_source(&alt_name, alt_value)?;
                Ok((alt_name, alt_rule))
            })
            .collect::<Result<_, GrammarError>>()
            .map(RuleSource::Named),
        other => scalar(other)
            .map(|production| RuleSource::Productions(vec![production]))
            .ok_or_else(|| GrammarError::Malformed(format!("rule '{}' has no production", name))),
    }
}

/// Plain scalars as text. YAML reads `true` or `1` as non-strings, but in a grammar they are
/// names and productions like any other.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
