//! Bottom-up chart parser
//!
//!     `cells[len][start]` holds one forest node per distinct root symbol that derives the
//!     `len` tokens beginning at `start`. The first row is seeded from the tokens, and every
//!     longer span is built from two adjacent shorter ones through the opposite index, which
//!     only knows pairs because the grammar was binarized when it was compiled.
//!
//!     After each cell's pairs are in, unit productions are closed over it breadth-first:
//!     each round only propagates roots that were new in the previous round, and at most
//!     `max_unit_chain_depth` rounds run. Unit links that would close a cycle within the cell
//!     are dropped. The cell is then sealed: nodes are built children first, so every parent
//!     sees all of its children's alternatives. Combined with the forest cap, the derivations
//!     that survive for a root are the ones found first: shortest left part first, then
//!     shortest unit chain.

use super::forest::{ForestAlternative, ParseForestNode};
use super::tree::ConcreteParseTree;
use super::{ParseError, ParseStrategy};
use crate::blocks::grammar::{CompiledGrammar, Symbol};
use crate::blocks::lexing::Token;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
pub struct ChartParser {
    forest_cap: usize,
}

impl Default for ChartParser {
    fn default() -> Self {
        Self { forest_cap: 1 }
    }
}

impl ChartParser {
    pub fn new(forest_cap: usize) -> Self {
        Self {
            forest_cap: forest_cap.max(1),
        }
    }

    /// The full-span forest rooted at the start symbol, if there is one.
    pub fn parse_chart(
        &self,
        grammar: &CompiledGrammar,
        tokens: &[Token],
    ) -> Result<Option<Rc<ParseForestNode>>, ParseError> {
        let n = tokens.len();
        if n == 0 {
            return Ok(None);
        }

        // cells[len - 1][start]
        let mut cells: Vec<Vec<Cell>> = Vec::with_capacity(n);

        let mut row = Vec::with_capacity(n);
        for token in tokens {
            row.push(self.seed(grammar, token)?);
        }
        cells.push(row);

        for len in 2..=n {
            let mut row = Vec::with_capacity(n - len + 1);
            for start in 0..=n - len {
                let mut cell = Cell::default();
                for split in 1..len {
                    let left_cell = &cells[split - 1][start];
                    let right_cell = &cells[len - split - 1][start + split];
                    for left in &left_cell.nodes {
                        for right in &right_cell.nodes {
                            for parent in grammar.index().pair_parents(left.root(), right.root()) {
                                let node = self.join(grammar, parent, left, right)?;
                                cell.add(node)?;
                            }
                        }
                    }
                }
                cell.close(grammar, self.forest_cap)?;
                row.push(cell);
            }
            cells.push(row);
        }

        tracing::debug!(
            tokens = n,
            nodes = cells.iter().flatten().map(|cell| cell.nodes.len()).sum::<usize>(),
            "chart built"
        );

        Ok(cells[n - 1][0].get(grammar.start()))
    }

    fn seed(&self, grammar: &CompiledGrammar, token: &Token) -> Result<Cell, ParseError> {
        let mut cell = Cell::default();
        let literal = |root: &Symbol| {
            ParseForestNode::new(
                root.clone(),
                ForestAlternative::Literal(token.value.clone()),
                self.forest_cap,
            )
        };

        for root in grammar.index().literal_parents(&token.value) {
            cell.add(literal(root))?;
        }
        let kind = Symbol::new(&token.kind);
        cell.add(literal(&kind))?;
        cell.close(grammar, self.forest_cap)?;
        Ok(cell)
    }

    fn join(
        &self,
        grammar: &CompiledGrammar,
        parent: &Symbol,
        left: &Rc<ParseForestNode>,
        right: &Rc<ParseForestNode>,
    ) -> Result<ParseForestNode, ParseError> {
        if grammar.index().is_intermediate(right.root()) {
            let head = ParseForestNode::new(
                parent.clone(),
                ForestAlternative::Children(vec![Rc::clone(left)]),
                self.forest_cap,
            );
            return Ok(head.concat_to(parent.clone(), right)?);
        }
        Ok(ParseForestNode::new(
            parent.clone(),
            ForestAlternative::Children(vec![Rc::clone(left), Rc::clone(right)]),
            self.forest_cap,
        ))
    }
}

impl ParseStrategy for ChartParser {
    fn parse(
        &self,
        grammar: &CompiledGrammar,
        tokens: &[Token],
        max_trees: usize,
    ) -> Result<Vec<ConcreteParseTree>, ParseError> {
        Ok(self
            .parse_chart(grammar, tokens)?
            .map(|forest| forest.expand(max_trees))
            .unwrap_or_default())
    }
}

/// One chart cell, one node per root in discovery order.
///
/// While the cell is filled, a unit alternative names its child by index into `pending`
/// instead of holding the child node, because the child may still gain alternatives.
/// [Cell::seal] builds the nodes children first once nothing more can be added.
#[derive(Default)]
struct Cell {
    pending: Vec<Pending>,
    by_root: HashMap<Symbol, usize>,
    /// Roots added since the last closure round
    fresh: Vec<usize>,
    nodes: Vec<Rc<ParseForestNode>>,
}

struct Pending {
    root: Symbol,
    /// Literal and pair alternatives
    direct: Option<ParseForestNode>,
    /// Unit alternatives, as indices of the child roots
    units: Vec<usize>,
}

impl Cell {
    fn add(&mut self, node: ParseForestNode) -> Result<(), ParseError> {
        let at = self.entry(node.root());
        match self.pending[at].direct.as_mut() {
            Some(held) => held.merge(&node)?,
            None => self.pending[at].direct = Some(node),
        }
        Ok(())
    }

    /// Record `parent -> child` unless it would close a unit cycle inside this cell.
    fn add_unit(&mut self, parent: &Symbol, child: usize) {
        let at = self.entry(parent);
        if at == child || self.pending[at].units.contains(&child) || self.reaches(child, at) {
            return;
        }
        self.pending[at].units.push(child);
    }

    fn entry(&mut self, root: &Symbol) -> usize {
        if let Some(&at) = self.by_root.get(root) {
            return at;
        }
        let at = self.pending.len();
        self.by_root.insert(root.clone(), at);
        self.fresh.push(at);
        self.pending.push(Pending {
            root: root.clone(),
            direct: None,
            units: Vec::new(),
        });
        at
    }

    /// Whether `target` is reachable from `from` through unit alternatives.
    fn reaches(&self, from: usize, target: usize) -> bool {
        let mut stack = vec![from];
        let mut seen = vec![false; self.pending.len()];
        while let Some(at) = stack.pop() {
            if at == target {
                return true;
            }
            if !std::mem::replace(&mut seen[at], true) {
                stack.extend(&self.pending[at].units);
            }
        }
        false
    }

    fn close(&mut self, grammar: &CompiledGrammar, cap: usize) -> Result<(), ParseError> {
        for _ in 0..grammar.max_unit_chain_depth() {
            let frontier = std::mem::take(&mut self.fresh);
            if frontier.is_empty() {
                break;
            }
            for child in frontier {
                let root = self.pending[child].root.clone();
                for parent in grammar.index().unit_parents(&root) {
                    self.add_unit(parent, child);
                }
            }
        }
        self.fresh.clear();
        self.seal(cap)
    }

    fn seal(&mut self, cap: usize) -> Result<(), ParseError> {
        let mut built = vec![None; self.pending.len()];
        for at in 0..self.pending.len() {
            self.build(at, cap, &mut built)?;
        }
        self.nodes = built.into_iter().flatten().collect();
        self.by_root = self
            .nodes
            .iter()
            .enumerate()
            .map(|(at, node)| (node.root().clone(), at))
            .collect();
        Ok(())
    }

    fn build(
        &self,
        at: usize,
        cap: usize,
        built: &mut [Option<Rc<ParseForestNode>>],
    ) -> Result<Option<Rc<ParseForestNode>>, ParseError> {
        if let Some(node) = &built[at] {
            return Ok(Some(Rc::clone(node)));
        }
        let pending = &self.pending[at];
        let mut node = pending.direct.clone();
        for &child in &pending.units {
            let Some(child) = self.build(child, cap, built)? else {
                continue;
            };
            let unit = ParseForestNode::new(
                pending.root.clone(),
                ForestAlternative::Children(vec![child]),
                cap,
            );
            match node.as_mut() {
                Some(held) => held.merge(&unit)?,
                None => node = Some(unit),
            }
        }
        let node = node.map(Rc::new);
        built[at] = node.clone();
        Ok(node)
    }

    fn get(&self, root: &Symbol) -> Option<Rc<ParseForestNode>> {
        self.by_root.get(root).map(|&at| Rc::clone(&self.nodes[at]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::grammar::{compile, GrammarSource};
    use crate::blocks::locale::LocaleTable;
    use crate::blocks::parsing::DescentParser;
    use crate::blocks::testing::factories::mk_tokens;

    fn grammar(source: GrammarSource, locales: &LocaleTable) -> CompiledGrammar {
        compile(
            &source,
            &["word", "number", "operator", "lparen", "rparen", "equals"],
            locales,
            &["en".to_string()],
        )
        .unwrap()
    }

    fn arithmetic() -> CompiledGrammar {
        let source = GrammarSource::new("expression").named(
            "expression",
            &[
                ("sum", "expression operator expression"),
                ("group", "lparen expression rparen"),
                ("value", "number"),
            ],
        );
        grammar(source, &LocaleTable::new())
    }

    fn sum_tokens() -> Vec<Token> {
        mk_tokens(&[
            ("number", "1"),
            ("operator", "+"),
            ("number", "2"),
            ("operator", "+"),
            ("number", "3"),
        ])
    }

    #[test]
    fn test_long_sequences_are_spliced() {
        let source = GrammarSource::new("statement").rule("statement", "word equals number");
        let grammar = grammar(source, &LocaleTable::new());
        let tokens = mk_tokens(&[("word", "x"), ("equals", "="), ("number", "3")]);

        let trees = ChartParser::default().parse(&grammar, &tokens, 1).unwrap();
        insta::assert_snapshot!(
            trees[0].to_string(),
            @r#"(statement (word "x") (equals "=") (number "3"))"#
        );
    }

    #[test]
    fn test_cap_bounds_ambiguity() {
        let tokens = sum_tokens();
        let one = ChartParser::new(1).parse(&arithmetic(), &tokens, 5).unwrap();
        assert_eq!(one.len(), 1);

        let two = ChartParser::new(2).parse(&arithmetic(), &tokens, 5).unwrap();
        assert_eq!(two.len(), 2);
        assert_ne!(two[0], two[1]);
        for tree in &two {
            assert_eq!(tree.leaves(), vec!["1", "+", "2", "+", "3"]);
        }
    }

    #[test]
    fn test_first_tree_matches_descent() {
        let tokens = sum_tokens();
        let chart = ChartParser::default().parse(&arithmetic(), &tokens, 1).unwrap();
        let descent = DescentParser::default()
            .parse(&arithmetic(), &tokens, 1)
            .unwrap();
        assert_eq!(chart, descent);
    }

    #[test]
    fn test_no_parse() {
        let tokens = mk_tokens(&[("lparen", "("), ("number", "1")]);
        assert_eq!(
            ChartParser::default()
                .parse_chart(&arithmetic(), &tokens)
                .unwrap()
                .map(|forest| forest.root().clone()),
            None
        );
        assert!(ChartParser::default()
            .parse(&arithmetic(), &[], 1)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_keyword_literals_seed_before_kinds() {
        let source = GrammarSource::new("value")
            .terminal("true")
            .named("value", &[("boolean", "true"), ("name", "word")]);
        let locales = LocaleTable::new().with("en", "true", "true");
        let grammar = grammar(source, &locales);

        let trees = ChartParser::default()
            .parse(&grammar, &mk_tokens(&[("word", "true")]), 1)
            .unwrap();
        assert_eq!(trees[0].to_string(), r#"(value (boolean (true "true")))"#);
    }

    #[test]
    fn test_unit_cycles_terminate() {
        let source = GrammarSource::new("a").rule("a", "b | number").rule("b", "word");
        let locales = LocaleTable::new().with("en", "b", "@a");
        let grammar = grammar(source, &locales);

        for cap in [1, 3] {
            let trees = ChartParser::new(cap)
                .parse(&grammar, &mk_tokens(&[("number", "1")]), 10)
                .unwrap();
            assert!(!trees.is_empty());
            assert_eq!(trees[0].to_string(), r#"(a (number "1"))"#);
        }
    }

    #[test]
    fn test_deterministic() {
        let tokens = sum_tokens();
        let first = ChartParser::new(2).parse(&arithmetic(), &tokens, 5).unwrap();
        for _ in 0..5 {
            assert_eq!(
                ChartParser::new(2).parse(&arithmetic(), &tokens, 5).unwrap(),
                first
            );
        }
    }

    fn rendered(trees: &[ConcreteParseTree]) -> Vec<String> {
        let mut rendered: Vec<String> = trees.iter().map(ToString::to_string).collect();
        rendered.sort();
        rendered
    }

    #[test]
    fn test_unit_parents_see_later_merges() {
        // `c` gains its `a` reading after `d` was already built over it
        let source = GrammarSource::new("d")
            .rule("d", "c")
            .rule("c", "number | a")
            .rule("a", "number");
        let grammar = grammar(source, &LocaleTable::new());
        let tokens = mk_tokens(&[("number", "1")]);

        let chart = ChartParser::new(2).parse(&grammar, &tokens, 10).unwrap();
        let descent = DescentParser::default().parse(&grammar, &tokens, 10).unwrap();
        assert_eq!(chart.len(), 2);
        assert_eq!(rendered(&chart), rendered(&descent));
        assert_eq!(
            rendered(&chart),
            vec![
                r#"(d (c (a (number "1"))))"#.to_string(),
                r#"(d (c (number "1")))"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_unit_cycles_are_not_followed_twice() {
        let source = GrammarSource::new("a").rule("a", "b | number").rule("b", "a");
        let grammar = grammar(source, &LocaleTable::new());

        let forest = ChartParser::new(8)
            .parse_chart(&grammar, &mk_tokens(&[("number", "1")]))
            .unwrap()
            .unwrap();
        let trees = forest.expand(100);
        assert_eq!(rendered(&trees), vec![r#"(a (number "1"))"#.to_string()]);
    }
}
