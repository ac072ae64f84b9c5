//! Token pattern tables
//!
//! A pattern table is a list of `{name, pattern, priority}` entries. Several entries may share
//! a name, which is how different quoting styles all produce `string` tokens.

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::ops::Range;

/// Token kind emitted for characters no pattern recognizes.
pub const UNKNOWN: &str = "unknown";

/// One declarative entry of the pattern table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPattern {
    pub name: String,
    pub pattern: String,
    pub priority: i32,
}

impl TokenPattern {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            priority,
        }
    }
}

/// Errors raised while compiling a pattern table
#[derive(Debug, Clone, PartialEq)]
pub enum LexiconError {
    /// The pattern is not a valid regular expression
    InvalidPattern { name: String, message: String },
    /// A pattern tried to use a reserved token kind
    ReservedName(String),
    /// The table document could not be read
    Malformed(String),
}

impl fmt::Display for LexiconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexiconError::InvalidPattern { name, message } => {
                write!(f, "Invalid pattern for token '{}': {}", name, message)
            }
            LexiconError::ReservedName(name) => {
                write!(f, "Token kind '{}' is reserved", name)
            }
            LexiconError::Malformed(msg) => write!(f, "Malformed token table: {}", msg),
        }
    }
}

impl std::error::Error for LexiconError {}

/// A token pattern with its regex compiled.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    name: String,
    regex: Regex,
    priority: i32,
}

impl CompiledPattern {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Leftmost non-empty occurrence of this pattern in `text`.
    ///
    /// Returns the byte range of the whole match and the token value: the first non-empty
    /// capture group, or the whole match when there is none.
    pub fn find(&self, text: &str) -> Option<(Range<usize>, String)> {
        self.regex.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            if whole.as_str().is_empty() {
                return None;
            }
            let value = caps
                .iter()
                .skip(1)
                .flatten()
                .find(|group| !group.as_str().is_empty())
                .unwrap_or(whole);
            Some((whole.range(), value.as_str().to_string()))
        })
    }
}

/// The compiled, priority-ordered pattern set.
///
/// Sorting is stable, so patterns sharing a priority keep their declaration order.
#[derive(Debug, Clone)]
pub struct Lexicon {
    patterns: Vec<CompiledPattern>,
}

impl Lexicon {
    pub fn new(table: Vec<TokenPattern>) -> Result<Self, LexiconError> {
        let mut patterns = table
            .into_iter()
            .map(|entry| {
                if entry.name == UNKNOWN {
                    return Err(LexiconError::ReservedName(entry.name));
                }
                let regex =
                    Regex::new(&entry.pattern).map_err(|e| LexiconError::InvalidPattern {
                        name: entry.name.clone(),
                        message: e.to_string(),
                    })?;
                Ok(CompiledPattern {
                    name: entry.name,
                    regex,
                    priority: entry.priority,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        patterns.sort_by_key(|p| p.priority);
        Ok(Self { patterns })
    }

    /// Compile a YAML pattern table.
    pub fn from_yaml(source: &str) -> Result<Self, LexiconError> {
        let table: Vec<TokenPattern> =
            serde_yaml::from_str(source).map_err(|e| LexiconError::Malformed(e.to_string()))?;
        Self::new(table)
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Every token kind this lexicon can emit, `unknown` included, in priority order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for pattern in &self.patterns {
            if !kinds.contains(&pattern.name()) {
                kinds.push(pattern.name());
            }
        }
        kinds.push(UNKNOWN);
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_by_priority_keeping_declaration_order() {
        let lexicon = Lexicon::new(vec![
            TokenPattern::new("word", "[a-z]+", 2),
            TokenPattern::new("single", "'[^']*'", 0),
            TokenPattern::new("double", "\"[^\"]*\"", 0),
        ])
        .unwrap();

        let names: Vec<&str> = lexicon.patterns().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["single", "double", "word"]);
    }

    #[test]
    fn test_kinds_are_distinct_and_end_with_unknown() {
        let lexicon = Lexicon::new(vec![
            TokenPattern::new("string", "'([^']*)'", 0),
            TokenPattern::new("string", "\"([^\"]*)\"", 0),
            TokenPattern::new("number", r"\d+", 1),
        ])
        .unwrap();

        assert_eq!(lexicon.kinds(), vec!["string", "number", UNKNOWN]);
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let err = Lexicon::new(vec![TokenPattern::new("broken", "(", 0)]).unwrap_err();
        assert!(matches!(err, LexiconError::InvalidPattern { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_unknown_is_reserved() {
        let err = Lexicon::new(vec![TokenPattern::new(UNKNOWN, ".", 0)]).unwrap_err();
        assert_eq!(err, LexiconError::ReservedName(UNKNOWN.to_string()));
    }

    #[test]
    fn test_find_prefers_first_non_empty_group() {
        let lexicon = Lexicon::new(vec![TokenPattern::new("string", "\"([^\"]*)\"", 0)]).unwrap();
        let pattern = &lexicon.patterns()[0];

        assert_eq!(pattern.find("say \"hi\""), Some((4..8, "hi".to_string())));
        // An empty group falls back to the whole match
        assert_eq!(pattern.find("\"\""), Some((0..2, "\"\"".to_string())));
    }

    #[test]
    fn test_find_skips_empty_matches() {
        let lexicon = Lexicon::new(vec![TokenPattern::new("digits", r"\d*", 0)]).unwrap();
        let pattern = &lexicon.patterns()[0];

        assert_eq!(pattern.find("ab12"), Some((2..4, "12".to_string())));
        assert_eq!(pattern.find("abc"), None);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = "- name: number\n  pattern: '\\d+'\n  priority: 1\n";
        let lexicon = Lexicon::from_yaml(yaml).unwrap();
        assert_eq!(lexicon.kinds(), vec!["number", UNKNOWN]);
    }
}
