//! Blueprint evaluation
//!
//!     Bottom-up over a concrete parse tree. A leaf evaluates to its token text. An internal
//!     node evaluates its children first, then applies its symbol's template to them:
//!
//!         - no template: the first child's blueprint passes through unchanged
//!         - `%k` alone: child `k` as it is, whatever its shape
//!         - anything else: the template's shape, with every text slot filled in
//!
//!     A slot that is exactly `%k` takes child `k` as it is. A slot mixing text and
//!     placeholders is joined as text, unless one of its placeholders refers to a list or a
//!     map: then the first such child replaces the whole slot and the text is dropped.
//!
//!     References past the last child are not errors. They are left in place (`Deferred`
//!     for a whole slot, `%k` text inside a mixed one) so the blueprint can be completed once
//!     that child is known.

use super::blueprint::Blueprint;
use super::template::{Segment, Slot, Template, TemplateTable};
use crate::blocks::parsing::{ConcreteParseTree, TreeChildren};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluateError {
    /// An internal tree node without children, which no parser produces
    EmptyNode(String),
}

impl fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluateError::EmptyNode(symbol) => {
                write!(f, "Parse tree node '{}' has no children", symbol)
            }
        }
    }
}

impl std::error::Error for EvaluateError {}

#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    normalize_quotes: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            normalize_quotes: true,
        }
    }
}

impl Evaluator {
    pub fn new(normalize_quotes: bool) -> Self {
        Self { normalize_quotes }
    }

    pub fn evaluate(
        &self,
        tree: &ConcreteParseTree,
        templates: &TemplateTable,
    ) -> Result<Blueprint, EvaluateError> {
        match &tree.children {
            TreeChildren::Literal(value) => Ok(Blueprint::Literal(self.leaf_text(value))),
            TreeChildren::Nodes(children) if children.is_empty() => {
                Err(EvaluateError::EmptyNode(tree.symbol.to_string()))
            }
            TreeChildren::Nodes(children) => {
                let args = children
                    .iter()
                    .map(|child| self.evaluate(child, templates))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.evaluate_partial(&tree.symbol, &args, templates))
            }
        }
    }

    /// Apply `symbol`'s template to the children known so far. Missing ones stay deferred.
    pub fn evaluate_partial(
        &self,
        symbol: &str,
        args: &[Blueprint],
        templates: &TemplateTable,
    ) -> Blueprint {
        match templates.get(symbol) {
            None => argument(args, 1),
            Some(template) => substitute(template, args),
        }
    }

    fn leaf_text(&self, value: &str) -> String {
        if self.normalize_quotes {
            normalize_quotes(value)
        } else {
            value.to_string()
        }
    }
}

fn argument(args: &[Blueprint], k: usize) -> Blueprint {
    args.get(k - 1).cloned().unwrap_or(Blueprint::Deferred(k))
}

fn substitute(template: &Template, args: &[Blueprint]) -> Blueprint {
    match template {
        Template::Slot(slot) => fill(slot, args),
        Template::List(items) => {
            Blueprint::List(items.iter().map(|item| substitute(item, args)).collect())
        }
        Template::Map(entries) => Blueprint::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), substitute(item, args)))
                .collect(),
        ),
    }
}

fn fill(slot: &Slot, args: &[Blueprint]) -> Blueprint {
    if let Some(k) = slot.sole_placeholder() {
        return argument(args, k);
    }

    // The first structural argument takes the whole slot
    let structural = slot.segments().iter().find_map(|segment| match segment {
        Segment::Placeholder(k) => args.get(k - 1).filter(|arg| arg.is_structural()),
        Segment::Literal(_) => None,
    });
    if let Some(arg) = structural {
        return arg.clone();
    }

    let mut text = String::new();
    for segment in slot.segments() {
        match segment {
            Segment::Literal(literal) => text.push_str(literal),
            Segment::Placeholder(k) => match args.get(k - 1).and_then(Blueprint::literal_form) {
                Some(form) => text.push_str(&form),
                None => text.push_str(&format!("%{}", k)),
            },
        }
    }
    Blueprint::Literal(text)
}

/// Typographic quotes to their ASCII counterparts.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}
