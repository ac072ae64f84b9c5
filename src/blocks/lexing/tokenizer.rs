//! Priority tokenizer
//!
//! See the [lexing module](super) for the priority-before-position rule.

use super::patterns::{Lexicon, UNKNOWN};
use serde::Serialize;
use std::fmt;

/// One token of learner input: its kind (the pattern name) and its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: String,
    pub value: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == UNKNOWN
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.value)
    }
}

/// Split `text` into tokens using the lexicon's patterns.
///
/// Blank input yields no tokens. This never fails: unmatched characters become `unknown`
/// tokens.
pub fn tokenize(text: &str, lexicon: &Lexicon) -> Vec<Token> {
    let mut tokens = Vec::new();
    tokenize_into(text, lexicon, &mut tokens);
    tokens
}

fn tokenize_into(text: &str, lexicon: &Lexicon, out: &mut Vec<Token>) {
    if text.trim().is_empty() {
        return;
    }

    for pattern in lexicon.patterns() {
        if let Some((range, value)) = pattern.find(text) {
            tokenize_into(&text[..range.start], lexicon, out);
            out.push(Token::new(pattern.name(), value));
            tokenize_into(&text[range.end..], lexicon, out);
            return;
        }
    }

    out.extend(
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Token::new(UNKNOWN, c.to_string())),
    );
}
