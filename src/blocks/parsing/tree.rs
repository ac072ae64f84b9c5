//! Concrete parse trees
//!
//!     One fully resolved derivation. Leaves carry the matched token's text; internal nodes
//!     carry one child per symbol of the alternative they were built from. Both strategies
//!     produce this type, so trees from either can be compared directly.

use crate::blocks::grammar::Symbol;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeChildren {
    /// The text of the single token this node covers
    Literal(String),
    Nodes(Vec<ConcreteParseTree>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteParseTree {
    pub symbol: Symbol,
    pub children: TreeChildren,
}

impl ConcreteParseTree {
    pub fn literal(symbol: Symbol, value: impl Into<String>) -> Self {
        Self {
            symbol,
            children: TreeChildren::Literal(value.into()),
        }
    }

    pub fn node(symbol: Symbol, children: Vec<ConcreteParseTree>) -> Self {
        Self {
            symbol,
            children: TreeChildren::Nodes(children),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.children, TreeChildren::Literal(_))
    }

    /// Token values covered by this tree, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a str>) {
        match &self.children {
            TreeChildren::Literal(value) => leaves.push(value),
            TreeChildren::Nodes(children) => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Indented outline, one node per line.
    pub fn to_outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        match &self.children {
            TreeChildren::Literal(value) => {
                out.push_str(&format!("{} {:?}\n", self.symbol, value));
            }
            TreeChildren::Nodes(children) => {
                out.push_str(self.symbol.as_str());
                out.push('\n');
                for child in children {
                    child.write_outline(out, depth + 1);
                }
            }
        }
    }
}

/// S-expression form: `(assignment (identifier (word "x")) (equals "=") ...)`.
impl fmt::Display for ConcreteParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.children {
            TreeChildren::Literal(value) => write!(f, "({} {:?})", self.symbol, value),
            TreeChildren::Nodes(children) => {
                write!(f, "({}", self.symbol)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConcreteParseTree {
        ConcreteParseTree::node(
            Symbol::new("assignment"),
            vec![
                ConcreteParseTree::node(
                    Symbol::new("identifier"),
                    vec![ConcreteParseTree::literal(Symbol::new("word"), "x")],
                ),
                ConcreteParseTree::literal(Symbol::new("equals"), "="),
                ConcreteParseTree::literal(Symbol::new("number"), "3"),
            ],
        )
    }

    #[test]
    fn test_display_as_s_expression() {
        insta::assert_snapshot!(
            sample().to_string(),
            @r#"(assignment (identifier (word "x")) (equals "=") (number "3"))"#
        );
    }

    #[test]
    fn test_leaves_in_order() {
        assert_eq!(sample().leaves(), vec!["x", "=", "3"]);
    }

    #[test]
    fn test_outline() {
        assert_eq!(
            sample().to_outline(),
            "assignment\n  identifier\n    word \"x\"\n  equals \"=\"\n  number \"3\"\n"
        );
    }
}
