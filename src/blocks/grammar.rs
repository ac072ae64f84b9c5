//! Grammar
//!
//!     The grammar is data. Authors write a rule table in a small notation (see [source] and
//!     [notation]); [compiler::compile] turns it into a [CompiledGrammar] that both parsing
//!     strategies read and never modify.
//!
//! Notation
//!
//!     A production is a space separated list of items. An item is a symbol name, a quoted
//!     literal (`"times"`), or a bracketed group of `|` separated branches (`[a | b c]`).
//!     A top-level `|` separates alternatives. Literals and groups used inside a longer
//!     production become synthetic symbols, so that every position in a sequence is a symbol.
//!
//! Symbols
//!
//!     Names are rules, terminals (whose spellings come from the locale tables) or token
//!     kinds (whatever the lexicon emits, plus `unknown`). Referring to anything else is a
//!     compile error.

pub mod compiler;
pub mod error;
pub mod notation;
pub mod source;
pub mod symbol;
pub mod table;

pub use compiler::{compile, CompiledGrammar};
pub use error::GrammarError;
pub use notation::NotationError;
pub use source::{GrammarSource, RuleSource};
pub use symbol::{Alternative, Symbol};
pub use table::{OppositeIndex, Rhs, RuleTable};
