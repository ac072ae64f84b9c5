//! Production notation
//!
//!     Productions in the rule table are short strings rather than nested YAML, so a rule reads
//!     the way a learner statement does:
//!
//!         display lparen expression rparen
//!         value | lparen expression rparen
//!         expression [comparison | equals] expression
//!         repeat expression "times"
//!
//!     Bare names are symbol references, `"text"` is a literal, `|` separates alternatives and
//!     `[ ... ]` opens an inline group with its own alternatives. The notation is tokenized with
//!     a logos lexer and read by a small recursive descent over the lexemes. Lowering items to
//!     symbols (and naming synthetic ones) is the compiler's job, not this module's.

use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Lexeme {
    #[token("[")]
    Open,

    #[token("]")]
    Close,

    #[token("|")]
    Pipe,

    #[regex(r#""([^"\\]|\\.)*""#, unquote)]
    Literal(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),
}

fn unquote(lex: &mut logos::Lexer<Lexeme>) -> String {
    let quoted = lex.slice();
    let mut text = String::with_capacity(quoted.len());
    let mut chars = quoted[1..quoted.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                text.push(escaped);
            }
        } else {
            text.push(c);
        }
    }
    text
}

/// One element of a production branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Symbol(String),
    Literal(String),
    Group(Vec<Branch>),
}

/// One alternative of a production: its items in order.
pub type Branch = Vec<Item>;

/// Errors in production notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// A `[` without its `]`, or the other way around
    UnbalancedBracket,
    /// Text that is neither a name, a literal nor punctuation
    UnexpectedCharacter { offset: usize },
    /// An alternative with no items (`a | | b`, `[]`, or an empty production)
    EmptyAlternative,
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationError::UnbalancedBracket => write!(f, "unbalanced brackets"),
            NotationError::UnexpectedCharacter { offset } => {
                write!(f, "unexpected character at offset {}", offset)
            }
            NotationError::EmptyAlternative => write!(f, "empty alternative"),
        }
    }
}

impl std::error::Error for NotationError {}

/// Parse one production string into its top-level branches.
pub fn parse_production(text: &str) -> Result<Vec<Branch>, NotationError> {
    let mut lexer = Lexeme::lexer(text);
    let mut lexemes = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(lexeme) => lexemes.push(lexeme),
            Err(()) => {
                return Err(NotationError::UnexpectedCharacter {
                    offset: lexer.span().start,
                })
            }
        }
    }

    let mut reader = Reader {
        lexemes: lexemes.into_iter(),
    };
    reader.branches(false)
}

struct Reader {
    lexemes: std::vec::IntoIter<Lexeme>,
}

impl Reader {
    fn branches(&mut self, nested: bool) -> Result<Vec<Branch>, NotationError> {
        let mut branches = Vec::new();
        let mut current = Vec::new();

        loop {
            match self.lexemes.next() {
                None if nested => return Err(NotationError::UnbalancedBracket),
                None => break,
                Some(Lexeme::Close) if !nested => return Err(NotationError::UnbalancedBracket),
                Some(Lexeme::Close) => break,
                Some(Lexeme::Open) => current.push(Item::Group(self.branches(true)?)),
                Some(Lexeme::Pipe) => branches.push(Self::finish(std::mem::take(&mut current))?),
                Some(Lexeme::Literal(text)) => current.push(Item::Literal(text)),
                Some(Lexeme::Name(name)) => current.push(Item::Symbol(name)),
            }
        }

        branches.push(Self::finish(current)?);
        Ok(branches)
    }

    fn finish(branch: Branch) -> Result<Branch, NotationError> {
        if branch.is_empty() {
            Err(NotationError::EmptyAlternative)
        } else {
            Ok(branch)
        }
    }
}
