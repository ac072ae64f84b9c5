//! Lexer
//!
//!     This module turns one line of learner text into a flat token sequence. There is no
//!     hand-written lexer here: the token kinds and their surface patterns are data, loaded
//!     from a pattern table and compiled once into a [Lexicon](patterns::Lexicon).
//!
//! Priority Before Position
//!
//!     Patterns are tried in ascending priority order, and the first pattern that matches
//!     anywhere in the text wins, even when a lower priority pattern would match earlier.
//!     The winning occurrence splits the text in three: the prefix and suffix are tokenized
//!     recursively and the match becomes one token. This is what keeps a quoted string with
//!     parentheses inside it in one piece when strings have the highest priority.
//!
//! Unknown Input
//!
//!     Tokenizing never fails. A non-blank fragment that no pattern matches becomes one
//!     `unknown` token per non-whitespace character, which the parser then rejects.

pub mod patterns;
pub mod tokenizer;

pub use patterns::{CompiledPattern, Lexicon, LexiconError, TokenPattern, UNKNOWN};
pub use tokenizer::{tokenize, Token};
