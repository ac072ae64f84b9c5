//! Memoized top-down parser
//!
//!     Reads the rule table directly. To parse a symbol over a span it tries each alternative
//!     in declaration order; to parse a sequence it tries every split point, shortest head
//!     first. Results are memoized per call on `(fragment, start, end, budget)`, where a
//!     fragment is a symbol or the tail of one of its sequence alternatives.
//!
//!     Unit productions may form cycles (`a -> b`, `b -> a`), which would recurse forever on
//!     the same span. Every symbol step costs one unit of budget and nothing is tried once
//!     the budget runs out. The starting budget, `(max_unit_chain_depth + 1) * (tokens + 1)`,
//!     is enough for the deepest acyclic derivation of the input.
//!
//!     A memo entry keeps at most `max_trees` derivations. Results are built in declaration
//!     order and every combination step preserves that order, so the kept prefix is exactly
//!     what the caller would have seen of the full list.
//!
//!     The worst case is still exponential, so every memo miss, every joined sequence and every
//!     tree built costs one step, and the parse aborts with [ParseError::StepLimitExceeded]
//!     once `step_limit` steps have been spent.

use super::tree::ConcreteParseTree;
use super::{ParseError, ParseStrategy};
use crate::blocks::grammar::{Alternative, CompiledGrammar, Symbol};
use crate::blocks::lexing::Token;
use std::collections::HashMap;
use std::rc::Rc;

pub const DEFAULT_STEP_LIMIT: usize = 200_000;

#[derive(Debug, Clone, Copy)]
pub struct DescentParser {
    budget_factor: usize,
    step_limit: usize,
}

impl Default for DescentParser {
    fn default() -> Self {
        Self {
            budget_factor: 1,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl DescentParser {
    pub fn new(budget_factor: usize, step_limit: usize) -> Self {
        Self {
            budget_factor: budget_factor.max(1),
            step_limit,
        }
    }
}

impl ParseStrategy for DescentParser {
    fn parse(
        &self,
        grammar: &CompiledGrammar,
        tokens: &[Token],
        max_trees: usize,
    ) -> Result<Vec<ConcreteParseTree>, ParseError> {
        if tokens.is_empty() || max_trees == 0 {
            return Ok(Vec::new());
        }
        let budget =
            (grammar.max_unit_chain_depth() + 1) * (tokens.len() + 1) * self.budget_factor;
        let mut run = Descent {
            grammar,
            tokens,
            max_trees,
            memo: HashMap::new(),
            steps: 0,
            step_limit: self.step_limit,
        };
        let found = run.symbol(grammar.start(), 0, tokens.len(), budget)?;
        tracing::debug!(
            steps = run.steps,
            memo = run.memo.len(),
            trees = found.len(),
            "descent parse finished"
        );
        Ok(found
            .iter()
            .filter_map(|sequence| sequence.first().cloned())
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Fragment {
    Symbol(Symbol),
    /// Items `offset..` of alternative `alternative` of `symbol`
    Tail {
        symbol: Symbol,
        alternative: usize,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    fragment: Fragment,
    start: usize,
    end: usize,
    budget: usize,
}

/// Each entry is one way to cover the span: a single tree for a symbol fragment, the
/// children for a tail fragment.
type Parsed = Rc<Vec<Vec<ConcreteParseTree>>>;

struct Descent<'a> {
    grammar: &'a CompiledGrammar,
    tokens: &'a [Token],
    /// Derivations kept per memo entry
    max_trees: usize,
    memo: HashMap<MemoKey, Parsed>,
    steps: usize,
    step_limit: usize,
}

impl Descent<'_> {
    fn lookup(&mut self, key: &MemoKey) -> Result<Option<Parsed>, ParseError> {
        if let Some(found) = self.memo.get(key) {
            return Ok(Some(Rc::clone(found)));
        }
        self.charge()?;
        Ok(None)
    }

    fn charge(&mut self) -> Result<(), ParseError> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(ParseError::StepLimitExceeded {
                limit: self.step_limit,
            });
        }
        Ok(())
    }

    fn symbol(
        &mut self,
        symbol: &Symbol,
        start: usize,
        end: usize,
        budget: usize,
    ) -> Result<Parsed, ParseError> {
        let key = MemoKey {
            fragment: Fragment::Symbol(symbol.clone()),
            start,
            end,
            budget,
        };
        if let Some(found) = self.lookup(&key)? {
            return Ok(found);
        }

        let mut trees: Vec<ConcreteParseTree> = Vec::new();
        if budget > 0 {
            let rules = self.grammar.rules();
            if end - start == 1 {
                let token = &self.tokens[start];
                let kind_matches = token.kind == symbol.as_str();
                let literal_matches = rules.alternatives(symbol).iter().any(
                    |alternative| matches!(alternative, Alternative::Literal(text) if *text == token.value),
                );
                if kind_matches || literal_matches {
                    trees.push(ConcreteParseTree::literal(symbol.clone(), token.value.clone()));
                }
            }

            let alternatives = rules.alternatives(symbol);
            for (index, alternative) in alternatives.iter().enumerate() {
                if trees.len() >= self.max_trees {
                    break;
                }
                let Alternative::Sequence(items) = alternative else {
                    continue;
                };
                let tails = self.tail(symbol, index, 0, start, end, budget - 1)?;
                for children in tails.iter().filter(|children| children.len() == items.len()) {
                    if trees.len() >= self.max_trees {
                        break;
                    }
                    self.charge()?;
                    let tree = ConcreteParseTree::node(symbol.clone(), children.clone());
                    if !trees.contains(&tree) {
                        trees.push(tree);
                    }
                }
            }
        }

        let parsed: Parsed = Rc::new(trees.into_iter().map(|tree| vec![tree]).collect());
        self.memo.insert(key, Rc::clone(&parsed));
        Ok(parsed)
    }

    fn tail(
        &mut self,
        symbol: &Symbol,
        alternative: usize,
        offset: usize,
        start: usize,
        end: usize,
        budget: usize,
    ) -> Result<Parsed, ParseError> {
        let key = MemoKey {
            fragment: Fragment::Tail {
                symbol: symbol.clone(),
                alternative,
                offset,
            },
            start,
            end,
            budget,
        };
        if let Some(found) = self.lookup(&key)? {
            return Ok(found);
        }

        let items = match &self.grammar.rules().alternatives(symbol)[alternative] {
            Alternative::Sequence(items) => items.clone(),
            Alternative::Literal(_) => Vec::new(),
        };
        let remaining = items.len().saturating_sub(offset);
        let mut sequences = Vec::new();

        if remaining > 0 && end - start >= remaining {
            let head = &items[offset];
            if remaining == 1 {
                for tree in self.symbol(head, start, end, budget)?.iter() {
                    sequences.push(tree.clone());
                }
            } else {
                // Leave at least one token for every item after the head
                'splits: for split in start + 1..=end - (remaining - 1) {
                    let heads = self.symbol(head, start, split, budget)?;
                    if heads.is_empty() {
                        continue;
                    }
                    let rests = self.tail(symbol, alternative, offset + 1, split, end, budget)?;
                    for first in heads.iter() {
                        for rest in rests.iter() {
                            if sequences.len() >= self.max_trees {
                                break 'splits;
                            }
                            self.charge()?;
                            let mut sequence = first.clone();
                            sequence.extend(rest.iter().cloned());
                            sequences.push(sequence);
                        }
                    }
                }
            }
        }

        let parsed: Parsed = Rc::new(sequences);
        self.memo.insert(key, Rc::clone(&parsed));
        Ok(parsed)
    }
}
