//! Testing utilities
//!
//!     Shared by unit tests and the integration tests under `tests/`.
//!
//!         - [factories]: terse constructors for tokens and trees
//!         - [SAMPLE_STATEMENTS]: statements the bundled language must accept, used wherever
//!           a test needs realistic input (strategy agreement, determinism, localization)
//!
//!     Prefer the samples over inventing new statements inline: when the bundled grammar
//!     changes, this is the one list to update.

use crate::blocks::building::Blueprint;
use crate::blocks::parsing::ParseStrategy;
use crate::blocks::pipeline::{Engine, EngineError};

/// English statements covering every statement form of the bundled grammar.
pub const SAMPLE_STATEMENTS: &[&str] = &[
    "display(\"hello\")",
    "print(42)",
    "display(1 + 2 * 3)",
    "display((x))",
    "move forward 10",
    "move back 3",
    "turn left 90",
    "repeat 4 times:",
    "if x < 3:",
    "if true:",
    "while count != 0:",
    "x = 3",
    "total = total + 1",
    "draw_square(10, 20)",
    "reset()",
];

/// Same statements in every bundled locale: `(en, fr, es)`.
pub const LOCALIZED_STATEMENTS: &[(&str, &str, &str)] = &[
    ("display(\"hi\")", "afficher(\"hi\")", "mostrar(\"hi\")"),
    ("move forward 10", "déplacer devant 10", "mover adelante 10"),
    ("turn right 45", "tourner droite 45", "girar derecha 45"),
    ("repeat 3 times:", "répéter 3 fois:", "repetir 3 veces:"),
    ("while true:", "tantque vrai:", "mientras verdadero:"),
];

/// First blueprint of `text` parsed with `strategy` instead of the engine's own.
pub fn first_blueprint_with(
    engine: &Engine,
    text: &str,
    strategy: &dyn ParseStrategy,
) -> Result<Option<Blueprint>, EngineError> {
    engine
        .parse_trees_with(text, strategy, 1)?
        .first()
        .map(|tree| engine.evaluate(tree))
        .transpose()
}

pub mod factories {
    use crate::blocks::grammar::Symbol;
    use crate::blocks::lexing::Token;
    use crate::blocks::parsing::ConcreteParseTree;

    /// Tokens from `(kind, value)` pairs.
    pub fn mk_tokens(specs: &[(&str, &str)]) -> Vec<Token> {
        specs
            .iter()
            .map(|(kind, value)| Token::new(*kind, *value))
            .collect()
    }

    pub fn mk_leaf(symbol: &str, value: &str) -> ConcreteParseTree {
        ConcreteParseTree::literal(Symbol::new(symbol), value)
    }

    pub fn mk_node(symbol: &str, children: Vec<ConcreteParseTree>) -> ConcreteParseTree {
        ConcreteParseTree::node(Symbol::new(symbol), children)
    }
}
