//! # blockscript
//!
//! Turns one line of learner-typed pseudo-code into a locale-independent blueprint of the
//! equivalent visual program fragment.
//!
//! File Layout
//!
//! Two parser designs run side by side over the same compiled grammar: a memoized descent
//! parser that is easy to follow, and a chart parser that scales and produces packed forests.
//! The contract is shared input (a token sequence) and shared output (concrete parse trees),
//! so both feed the same blueprint builder and can be compared against each other in tests.
//!
//! src/blocks
//!   ├── lexing      Token patterns and the priority tokenizer
//!   ├── grammar     Rule notation, compiler, rule table and opposite index
//!   ├── locale      Localized surface forms for terminals
//!   ├── parsing     Forest, descent and chart strategies
//!   ├── building    Templates and blueprint evaluation
//!   ├── config      Layered engine configuration
//!   └── pipeline    The engine tying it all together
//!
//! For test helpers, see the [testing module](blocks::testing).

#![allow(rustdoc::invalid_html_tags)]

pub mod blocks;
