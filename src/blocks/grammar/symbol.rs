//! Grammar symbols and alternatives

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An interned grammar symbol name.
///
/// Symbols have no identity beyond their name: two symbols are equal when their names are.
/// Cloning is a reference count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Symbol {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(Arc::from(name))
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One right-hand side a symbol can expand to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Alternative {
    /// Matches one token whose value is exactly this text
    Literal(String),
    /// Matches the symbols in order, each covering at least one token
    Sequence(Vec<Symbol>),
}

impl Alternative {
    pub fn sequence<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Alternative::Sequence(symbols.into_iter().map(Into::into).collect())
    }

    /// Number of children a tree node built from this alternative has.
    pub fn arity(&self) -> usize {
        match self {
            Alternative::Literal(_) => 1,
            Alternative::Sequence(symbols) => symbols.len(),
        }
    }

    /// The target of a unit production, if this is one.
    pub fn unit_target(&self) -> Option<&Symbol> {
        match self {
            Alternative::Sequence(symbols) if symbols.len() == 1 => symbols.first(),
            _ => None,
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alternative::Literal(text) => write!(f, "{:?}", text),
            Alternative::Sequence(symbols) => {
                let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
                f.write_str(&names.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_symbols_compare_by_name() {
        assert_eq!(Symbol::new("expression"), Symbol::from("expression".to_string()));
        assert_eq!(Symbol::new("expression"), "expression");
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Symbol::new("display"), 1);
        assert_eq!(map.get("display"), Some(&1));
    }

    #[test]
    fn test_alternative_shape() {
        let unit = Alternative::sequence(["expression"]);
        assert_eq!(unit.unit_target(), Some(&Symbol::new("expression")));
        assert_eq!(unit.arity(), 1);

        let seq = Alternative::sequence(["display", "lparen", "expression", "rparen"]);
        assert_eq!(seq.unit_target(), None);
        assert_eq!(seq.arity(), 4);
        assert_eq!(seq.to_string(), "display lparen expression rparen");

        assert_eq!(Alternative::Literal("+".into()).to_string(), "\"+\"");
    }
}
