//! Rule table and opposite index
//!
//!     The rule table maps each symbol to its alternatives in declaration order. It is what the
//!     descent parser walks top-down.
//!
//!     The opposite index inverts it for the chart parser, which works bottom-up: given what was
//!     found (a token value, one symbol, or two adjacent symbols), which symbols could have
//!     produced it? The chart only ever joins two neighbouring spans, so every sequence longer
//!     than two is binarized right to left when the index is derived:
//!
//!         A -> B C D      becomes     Pair(C, D)     -> <C D>
//!                                     Pair(B, <C D>) -> A
//!
//!     Intermediate symbols are named after the suffix they stand for, so rules that end the
//!     same way share them. They only exist in the index and never reach a parse tree: the chart
//!     splices their children into the parent.

use super::symbol::{Alternative, Symbol};
use std::collections::{HashMap, HashSet};

/// A compiled rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    start: Symbol,
    order: Vec<Symbol>,
    rules: HashMap<Symbol, Vec<Alternative>>,
    token_kinds: HashSet<Symbol>,
    synthetic: HashSet<Symbol>,
}

impl RuleTable {
    pub(crate) fn new(
        start: Symbol,
        order: Vec<Symbol>,
        rules: HashMap<Symbol, Vec<Alternative>>,
        token_kinds: HashSet<Symbol>,
        synthetic: HashSet<Symbol>,
    ) -> Self {
        Self {
            start,
            order,
            rules,
            token_kinds,
            synthetic,
        }
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    /// Declared symbols in declaration order, synthetic ones included.
    pub fn symbols(&self) -> &[Symbol] {
        &self.order
    }

    /// Alternatives of `symbol`, empty for token kinds and unknown names.
    pub fn alternatives(&self, symbol: &str) -> &[Alternative] {
        self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    pub fn is_token_kind(&self, symbol: &str) -> bool {
        self.token_kinds.contains(symbol)
    }

    /// Whether the compiler made this symbol up (inline groups and inline literals).
    pub fn is_synthetic(&self, symbol: &str) -> bool {
        self.synthetic.contains(symbol)
    }

    pub fn alternative_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Length of the longest chain of unit productions (`A -> B`, `B -> C`, ...) that starts at
    /// a symbol reachable from the start symbol. Chains never repeat a symbol, so the value is
    /// finite even when unit productions form cycles.
    pub fn max_unit_chain_depth(&self) -> usize {
        self.reachable()
            .iter()
            .map(|symbol| {
                let mut on_chain = HashSet::from([symbol.clone()]);
                self.longest_unit_chain(symbol, &mut on_chain)
            })
            .max()
            .unwrap_or(0)
    }

    fn longest_unit_chain(&self, symbol: &Symbol, on_chain: &mut HashSet<Symbol>) -> usize {
        let mut longest = 0;
        for target in self.alternatives(symbol).iter().filter_map(Alternative::unit_target) {
            if !on_chain.insert(target.clone()) {
                continue;
            }
            longest = longest.max(1 + self.longest_unit_chain(target, on_chain));
            on_chain.remove(target);
        }
        longest
    }

    /// Symbols reachable from the start symbol, in discovery order.
    fn reachable(&self) -> Vec<Symbol> {
        let mut seen = HashSet::from([self.start.clone()]);
        let mut found = vec![self.start.clone()];
        let mut next = 0;
        while next < found.len() {
            let symbol = found[next].clone();
            next += 1;
            for alternative in self.alternatives(&symbol) {
                if let Alternative::Sequence(items) = alternative {
                    for item in items {
                        if seen.insert(item.clone()) {
                            found.push(item.clone());
                        }
                    }
                }
            }
        }
        found
    }
}

/// What the chart has found, as a key into the [OppositeIndex].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rhs {
    /// One token whose value is this text
    Literal(String),
    /// One symbol on its own
    Unit(Symbol),
    /// Two symbols on adjacent spans
    Pair(Symbol, Symbol),
}

/// Right-hand side to candidate left-hand sides, with binarization intermediates.
#[derive(Debug, Clone, Default)]
pub struct OppositeIndex {
    parents: HashMap<Rhs, Vec<Symbol>>,
    intermediates: HashSet<Symbol>,
}

impl OppositeIndex {
    /// Invert a rule table. Candidates keep rule declaration order.
    pub fn derive(table: &RuleTable) -> Self {
        let mut index = OppositeIndex::default();
        for symbol in table.symbols() {
            for alternative in table.alternatives(symbol) {
                match alternative {
                    Alternative::Literal(text) => {
                        index.insert(Rhs::Literal(text.clone()), symbol.clone())
                    }
                    Alternative::Sequence(items) => index.insert_sequence(symbol, items),
                }
            }
        }
        index
    }

    fn insert_sequence(&mut self, parent: &Symbol, items: &[Symbol]) {
        match items {
            [] => {}
            [only] => self.insert(Rhs::Unit(only.clone()), parent.clone()),
            [first, rest @ ..] => {
                let mut right = rest[rest.len() - 1].clone();
                for offset in (1..items.len() - 1).rev() {
                    let intermediate = intermediate_name(&items[offset..]);
                    self.insert(
                        Rhs::Pair(items[offset].clone(), right),
                        intermediate.clone(),
                    );
                    self.intermediates.insert(intermediate.clone());
                    right = intermediate;
                }
                self.insert(Rhs::Pair(first.clone(), right), parent.clone());
            }
        }
    }

    fn insert(&mut self, rhs: Rhs, parent: Symbol) {
        let parents = self.parents.entry(rhs).or_default();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    pub fn parents(&self, rhs: &Rhs) -> &[Symbol] {
        self.parents.get(rhs).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn literal_parents(&self, text: &str) -> &[Symbol] {
        self.parents(&Rhs::Literal(text.to_string()))
    }

    pub fn unit_parents(&self, child: &Symbol) -> &[Symbol] {
        self.parents(&Rhs::Unit(child.clone()))
    }

    pub fn pair_parents(&self, left: &Symbol, right: &Symbol) -> &[Symbol] {
        self.parents(&Rhs::Pair(left.clone(), right.clone()))
    }

    /// Whether `symbol` is a binarization intermediate whose children splice into its parent.
    pub fn is_intermediate(&self, symbol: &Symbol) -> bool {
        self.intermediates.contains(symbol)
    }

    pub fn intermediate_count(&self) -> usize {
        self.intermediates.len()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

fn intermediate_name(suffix: &[Symbol]) -> Symbol {
    let names: Vec<&str> = suffix.iter().map(Symbol::as_str).collect();
    Symbol::from(format!("<{}>", names.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(start: &str, rules: &[(&str, Vec<Alternative>)]) -> RuleTable {
        let order: Vec<Symbol> = rules.iter().map(|(name, _)| Symbol::new(name)).collect();
        let map = rules
            .iter()
            .map(|(name, alternatives)| (Symbol::new(name), alternatives.clone()))
            .collect();
        RuleTable::new(
            Symbol::new(start),
            order,
            map,
            HashSet::new(),
            HashSet::new(),
        )
    }

    fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    #[test]
    fn test_binarizes_right_to_left() {
        let table = table(
            "a",
            &[("a", vec![Alternative::sequence(["b", "c", "d", "e"])])],
        );
        let index = OppositeIndex::derive(&table);

        assert_eq!(index.pair_parents(&sym("d"), &sym("e")), &[sym("<d e>")]);
        assert_eq!(
            index.pair_parents(&sym("c"), &sym("<d e>")),
            &[sym("<c d e>")]
        );
        assert_eq!(index.pair_parents(&sym("b"), &sym("<c d e>")), &[sym("a")]);
        assert!(index.is_intermediate(&sym("<c d e>")));
        assert!(!index.is_intermediate(&sym("a")));
        assert_eq!(index.intermediate_count(), 2);
    }

    #[test]
    fn test_shared_suffixes_share_intermediates() {
        let table = table(
            "a",
            &[
                ("a", vec![Alternative::sequence(["x", "c", "d"])]),
                ("b", vec![Alternative::sequence(["y", "c", "d"])]),
            ],
        );
        let index = OppositeIndex::derive(&table);

        assert_eq!(index.pair_parents(&sym("c"), &sym("d")), &[sym("<c d>")]);
        assert_eq!(index.intermediate_count(), 1);
        assert_eq!(index.pair_parents(&sym("x"), &sym("<c d>")), &[sym("a")]);
        assert_eq!(index.pair_parents(&sym("y"), &sym("<c d>")), &[sym("b")]);
    }

    #[test]
    fn test_units_literals_and_pairs() {
        let table = table(
            "expression",
            &[
                (
                    "expression",
                    vec![
                        Alternative::sequence(["number"]),
                        Alternative::sequence(["expression", "operator"]),
                    ],
                ),
                ("plus", vec![Alternative::Literal("+".to_string())]),
            ],
        );
        let index = OppositeIndex::derive(&table);

        assert_eq!(index.unit_parents(&sym("number")), &[sym("expression")]);
        assert_eq!(index.literal_parents("+"), &[sym("plus")]);
        assert_eq!(
            index.pair_parents(&sym("expression"), &sym("operator")),
            &[sym("expression")]
        );
        assert!(index.unit_parents(&sym("operator")).is_empty());
    }

    #[test]
    fn test_unit_chain_depth() {
        let table = table(
            "statement",
            &[
                ("statement", vec![Alternative::sequence(["expression"])]),
                (
                    "expression",
                    vec![
                        Alternative::sequence(["value"]),
                        Alternative::sequence(["lparen", "expression", "rparen"]),
                    ],
                ),
                ("value", vec![Alternative::sequence(["number"])]),
                ("unreachable", vec![Alternative::sequence(["a"])]),
                ("a", vec![Alternative::sequence(["b"])]),
                ("b", vec![Alternative::sequence(["c"])]),
            ],
        );
        assert_eq!(table.max_unit_chain_depth(), 3);
    }

    #[test]
    fn test_unit_chain_depth_is_finite_on_cycles() {
        let table = table(
            "a",
            &[
                ("a", vec![Alternative::sequence(["b"])]),
                (
                    "b",
                    vec![
                        Alternative::sequence(["a"]),
                        Alternative::sequence(["c"]),
                    ],
                ),
                ("c", vec![Alternative::Literal("x".to_string())]),
            ],
        );
        // Longest simple chain: a -> b -> c
        assert_eq!(table.max_unit_chain_depth(), 2);
    }
}
