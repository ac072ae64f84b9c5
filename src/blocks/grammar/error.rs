use super::notation::NotationError;
use std::fmt;

/// Fatal grammar configuration errors. A grammar that fails to compile must not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The grammar document does not have the expected shape
    Malformed(String),
    /// A production string could not be read
    Notation {
        rule: String,
        production: String,
        error: NotationError,
    },
    /// A production refers to a symbol that is neither a rule, a terminal nor a token kind
    UndeclaredSymbol { symbol: String, rule: String },
    /// The start symbol has no rule
    MissingStart(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Malformed(msg) => write!(f, "Malformed grammar: {}", msg),
            GrammarError::Notation {
                rule,
                production,
                error,
            } => write!(
                f,
                "Invalid production for '{}' ({:?}): {}",
                rule, production, error
            ),
            GrammarError::UndeclaredSymbol { symbol, rule } => {
                write!(f, "Rule '{}' refers to undeclared symbol '{}'", rule, symbol)
            }
            GrammarError::MissingStart(start) => {
                write!(f, "Start symbol '{}' has no rule", start)
            }
        }
    }
}

impl std::error::Error for GrammarError {}
