//! Parsing
//!
//!     Two independent strategies turn a token sequence into concrete parse trees over the
//!     same [CompiledGrammar]:
//!
//!         - [DescentParser]: memoized top-down backtracking over the rule table. Small and
//!           easy to follow; bounded by a budget and a step limit.
//!         - [ChartParser]: bottom-up chart over the binarized opposite index, producing a
//!           bounded packed forest ([forest]) that is then expanded into trees.
//!
//!     Both implement [ParseStrategy] and are interchangeable. An empty result means the input
//!     is not a statement of the language; it is not an error.
//!
//! Tie-breaks
//!
//!     The descent parser yields derivations in declaration order. The chart keeps, per root
//!     and span, the derivations it finds first: shortest left part first, then shortest unit
//!     chain, with keyword literals seeded before token kinds. Grammars that list keyword
//!     readings before catch-all ones (identifiers) get the same first tree from both.

pub mod chart;
pub mod descent;
pub mod forest;
pub mod tree;

pub use chart::ChartParser;
pub use descent::DescentParser;
pub use forest::{ForestAlternative, ForestError, ParseForestNode};
pub use tree::{ConcreteParseTree, TreeChildren};

use crate::blocks::grammar::CompiledGrammar;
use crate::blocks::lexing::Token;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A parsing strategy.
pub trait ParseStrategy {
    /// Up to `max_trees` parse trees of the whole token sequence from the start symbol.
    fn parse(
        &self,
        grammar: &CompiledGrammar,
        tokens: &[Token],
        max_trees: usize,
    ) -> Result<Vec<ConcreteParseTree>, ParseError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The descent parser spent its whole step budget
    StepLimitExceeded { limit: usize },
    Forest(ForestError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::StepLimitExceeded { limit } => {
                write!(f, "Parse abandoned after {} steps", limit)
            }
            ParseError::Forest(err) => write!(f, "Forest error: {}", err),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ForestError> for ParseError {
    fn from(err: ForestError) -> Self {
        ParseError::Forest(err)
    }
}

/// Strategy selector used by configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Chart,
    Descent,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Chart => write!(f, "chart"),
            Strategy::Descent => write!(f, "descent"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chart" => Ok(Strategy::Chart),
            "descent" => Ok(Strategy::Descent),
            other => Err(format!(
                "unknown strategy '{}' (expected 'chart' or 'descent')",
                other
            )),
        }
    }
}
