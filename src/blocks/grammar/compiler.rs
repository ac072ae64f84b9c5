//! Grammar compiler
//!
//!     Turns a [GrammarSource] into a [CompiledGrammar] in five passes:
//!
//!         1. Expansion. Productions are read from notation and lowered to alternatives. Named
//!            alternatives become unit alternatives of their parent plus a rule of their own, so
//!            templates can address them. Inline groups and inline literals become synthetic
//!            symbols (`lhs[1]`, `"times"`).
//!         2. Localization. Every enabled locale's surface forms for a declared symbol are added
//!            as literal alternatives; `@other` forms add the unit alternative `symbol -> other`.
//!         3. Deduplication, keeping first occurrences.
//!         4. Validation of every symbol reference and of the start symbol.
//!         5. Derivation of the opposite index and of the unit-chain bound.

use super::error::GrammarError;
use super::notation::{parse_production, Branch, Item};
use super::source::{GrammarSource, RuleSource};
use super::symbol::{Alternative, Symbol};
use super::table::{OppositeIndex, RuleTable};
use crate::blocks::lexing::UNKNOWN;
use crate::blocks::locale::{SurfaceForm, SurfaceForms};
use std::collections::{HashMap, HashSet};

/// Everything the parsers need, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    rules: RuleTable,
    index: OppositeIndex,
    max_unit_chain_depth: usize,
}

impl CompiledGrammar {
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn index(&self) -> &OppositeIndex {
        &self.index
    }

    pub fn start(&self) -> &Symbol {
        self.rules.start()
    }

    /// Termination bound for unit-production chains, consumed by both parsing strategies.
    pub fn max_unit_chain_depth(&self) -> usize {
        self.max_unit_chain_depth
    }
}

/// Compile a grammar.
///
/// `token_kinds` are the kinds the lexicon emits; productions may refer to them directly.
/// `locales` is consulted for every locale in `enabled_locales`, in that order.
pub fn compile(
    source: &GrammarSource,
    token_kinds: &[&str],
    locales: &dyn SurfaceForms,
    enabled_locales: &[String],
) -> Result<CompiledGrammar, GrammarError> {
    let mut builder = TableBuilder::default();

    for terminal in &source.terminals {
        builder.declare(terminal);
    }
    for (lhs, rule) in &source.rules {
        builder.expand(lhs, rule)?;
    }

    builder.localize(locales, enabled_locales);
    builder.deduplicate();

    let token_kinds: HashSet<Symbol> = token_kinds
        .iter()
        .copied()
        .chain(std::iter::once(UNKNOWN))
        .map(Symbol::new)
        .collect();
    builder.validate(&source.start, &token_kinds)?;

    let rules = RuleTable::new(
        Symbol::new(&source.start),
        builder.order,
        builder.rules,
        token_kinds,
        builder.synthetic,
    );
    let index = OppositeIndex::derive(&rules);
    let max_unit_chain_depth = rules.max_unit_chain_depth();

    tracing::debug!(
        symbols = rules.symbols().len(),
        alternatives = rules.alternative_count(),
        intermediates = index.intermediate_count(),
        max_unit_chain_depth,
        "compiled grammar"
    );

    Ok(CompiledGrammar {
        rules,
        index,
        max_unit_chain_depth,
    })
}

#[derive(Default)]
struct TableBuilder {
    order: Vec<Symbol>,
    rules: HashMap<Symbol, Vec<Alternative>>,
    synthetic: HashSet<Symbol>,
    groups: HashMap<Symbol, usize>,
}

impl TableBuilder {
    fn declare(&mut self, name: &str) -> Symbol {
        let symbol = Symbol::new(name);
        if !self.rules.contains_key(&symbol) {
            self.order.push(symbol.clone());
            self.rules.insert(symbol.clone(), Vec::new());
        }
        symbol
    }

    fn declare_synthetic(&mut self, name: String) -> Symbol {
        let symbol = self.declare(&name);
        self.synthetic.insert(symbol.clone());
        symbol
    }

    fn push(&mut self, lhs: &Symbol, alternative: Alternative) {
        self.rules.entry(lhs.clone()).or_default().push(alternative);
    }

    fn expand(&mut self, lhs: &str, rule: &RuleSource) -> Result<(), GrammarError> {
        let lhs = self.declare(lhs);
        match rule {
            RuleSource::Productions(productions) => {
                for production in productions {
                    let branches =
                        parse_production(production).map_err(|error| GrammarError::Notation {
                            rule: lhs.to_string(),
                            production: production.clone(),
                            error,
                        })?;
                    for branch in branches {
                        let alternative = self.lower(&lhs, branch);
                        self.push(&lhs, alternative);
                    }
                }
            }
            RuleSource::Named(entries) => {
                for (name, sub_rule) in entries {
                    let named = self.declare(name);
                    self.push(&lhs, Alternative::Sequence(vec![named]));
                    self.expand(name, sub_rule)?;
                }
            }
        }
        Ok(())
    }

    fn lower(&mut self, lhs: &Symbol, branch: Branch) -> Alternative {
        if let [Item::Literal(text)] = branch.as_slice() {
            return Alternative::Literal(text.clone());
        }
        let items = branch
            .into_iter()
            .map(|item| self.lower_item(lhs, item))
            .collect();
        Alternative::Sequence(items)
    }

    fn lower_item(&mut self, lhs: &Symbol, item: Item) -> Symbol {
        match item {
            Item::Symbol(name) => Symbol::from(name),
            Item::Literal(text) => {
                let symbol = self.declare_synthetic(format!("{:?}", text));
                self.push(&symbol, Alternative::Literal(text));
                symbol
            }
            Item::Group(branches) => {
                let counter = self.groups.entry(lhs.clone()).or_insert(0);
                *counter += 1;
                let name = format!("{}[{}]", lhs, counter);
                let group = self.declare_synthetic(name);
                for branch in branches {
                    let alternative = self.lower(&group, branch);
                    self.push(&group, alternative);
                }
                group
            }
        }
    }

    fn localize(&mut self, locales: &dyn SurfaceForms, enabled_locales: &[String]) {
        let declared: Vec<Symbol> = self
            .order
            .iter()
            .filter(|symbol| !self.synthetic.contains(*symbol))
            .cloned()
            .collect();
        for symbol in declared {
            for locale in enabled_locales {
                for form in locales.surface_forms(locale, &symbol) {
                    let alternative = match SurfaceForm::classify(form) {
                        SurfaceForm::Text(text) => Alternative::Literal(text.to_string()),
                        SurfaceForm::Alias(other) => Alternative::Sequence(vec![Symbol::new(other)]),
                    };
                    self.push(&symbol, alternative);
                }
            }
        }
    }

    fn deduplicate(&mut self) {
        for alternatives in self.rules.values_mut() {
            let mut seen = HashSet::new();
            alternatives.retain(|alternative| seen.insert(alternative.clone()));
        }
    }

    fn validate(&self, start: &str, token_kinds: &HashSet<Symbol>) -> Result<(), GrammarError> {
        if !self.rules.contains_key(start) {
            return Err(GrammarError::MissingStart(start.to_string()));
        }

        for symbol in &self.order {
            let alternatives = &self.rules[symbol];
            if alternatives.is_empty() && !token_kinds.contains(symbol) {
                tracing::warn!(symbol = %symbol, "symbol has no alternatives and can never match");
            }
            for alternative in alternatives {
                let Alternative::Sequence(items) = alternative else {
                    continue;
                };
                for item in items {
                    if !self.rules.contains_key(item) && !token_kinds.contains(item) {
                        return Err(GrammarError::UndeclaredSymbol {
                            symbol: item.to_string(),
                            rule: symbol.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
