//! Bounded packed parse forest
//!
//!     A forest node stands for every derivation of one symbol over one span that the chart
//!     chose to keep. Each alternative is either the text of a single token or a list of
//!     child nodes. Children are shared through `Rc`, so a sub-derivation used by many parents
//!     exists once.
//!
//!     Nodes hold at most `cap` alternatives. Merging keeps the oldest ones: with a cap of 1
//!     the first derivation the chart discovers is the only one that survives, which is what
//!     makes the first tree deterministic.

use super::tree::ConcreteParseTree;
use crate::blocks::grammar::Symbol;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum ForestAlternative {
    Literal(String),
    Children(Vec<Rc<ParseForestNode>>),
}

impl ForestAlternative {
    /// Same token text, or the very same child nodes.
    fn same_as(&self, other: &ForestAlternative) -> bool {
        match (self, other) {
            (ForestAlternative::Literal(a), ForestAlternative::Literal(b)) => a == b,
            (ForestAlternative::Children(a), ForestAlternative::Children(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Rc::ptr_eq(x, y))
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestError {
    /// Merging nodes whose roots differ
    RootMismatch { expected: Symbol, found: Symbol },
    /// Concatenating a single-token alternative, which has no children to extend
    LiteralConcat(Symbol),
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForestError::RootMismatch { expected, found } => write!(
                f,
                "Cannot merge a '{}' forest into a '{}' forest",
                found, expected
            ),
            ForestError::LiteralConcat(root) => {
                write!(f, "Cannot concatenate the literal alternative of '{}'", root)
            }
        }
    }
}

impl std::error::Error for ForestError {}

#[derive(Debug, Clone)]
pub struct ParseForestNode {
    root: Symbol,
    alternatives: Vec<ForestAlternative>,
    cap: usize,
}

impl ParseForestNode {
    /// A node with one alternative. A cap of 0 is treated as 1.
    pub fn new(root: Symbol, alternative: ForestAlternative, cap: usize) -> Self {
        Self {
            root,
            alternatives: vec![alternative],
            cap: cap.max(1),
        }
    }

    pub fn root(&self) -> &Symbol {
        &self.root
    }

    pub fn alternatives(&self) -> &[ForestAlternative] {
        &self.alternatives
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn is_full(&self) -> bool {
        self.alternatives.len() >= self.cap
    }

    /// Add `other`'s alternatives to this node while there is room, skipping ones already
    /// held.
    pub fn merge(&mut self, other: &ParseForestNode) -> Result<(), ForestError> {
        if other.root != self.root {
            return Err(ForestError::RootMismatch {
                expected: self.root.clone(),
                found: other.root.clone(),
            });
        }
        for alternative in &other.alternatives {
            if self.is_full() {
                break;
            }
            if !self.alternatives.iter().any(|held| held.same_as(alternative)) {
                self.alternatives.push(alternative.clone());
            }
        }
        Ok(())
    }

    /// A node rooted at `root` whose alternatives are every alternative of `self` followed by
    /// the children of every alternative of `other`, up to the cap.
    ///
    /// This is how the chart splices a binarization intermediate back into its parent: with
    /// `self` holding the left child and `other` the intermediate covering the rest.
    pub fn concat_to(
        &self,
        root: Symbol,
        other: &ParseForestNode,
    ) -> Result<ParseForestNode, ForestError> {
        let mut alternatives = Vec::new();
        'outer: for left in &self.alternatives {
            let ForestAlternative::Children(left) = left else {
                return Err(ForestError::LiteralConcat(self.root.clone()));
            };
            for right in &other.alternatives {
                let ForestAlternative::Children(right) = right else {
                    return Err(ForestError::LiteralConcat(other.root.clone()));
                };
                if alternatives.len() >= self.cap {
                    break 'outer;
                }
                let children = left.iter().chain(right).cloned().collect();
                alternatives.push(ForestAlternative::Children(children));
            }
        }
        Ok(ParseForestNode {
            root,
            alternatives,
            cap: self.cap,
        })
    }

    /// Up to `max_trees` concrete trees, first alternative first and, within an alternative,
    /// the last child varying fastest.
    pub fn expand(&self, max_trees: usize) -> Vec<ConcreteParseTree> {
        let mut trees = Vec::new();
        for alternative in &self.alternatives {
            if trees.len() >= max_trees {
                break;
            }
            match alternative {
                ForestAlternative::Literal(value) => {
                    trees.push(ConcreteParseTree::literal(self.root.clone(), value.clone()))
                }
                ForestAlternative::Children(children) => {
                    let wanted = max_trees - trees.len();
                    for sequence in expand_sequence(children, wanted) {
                        trees.push(ConcreteParseTree::node(self.root.clone(), sequence));
                    }
                }
            }
        }
        trees
    }

    /// Number of distinct nodes reachable from this one, itself included.
    pub fn node_count(&self) -> usize {
        let mut seen = Vec::new();
        self.count_into(&mut seen);
        seen.len() + 1
    }

    fn count_into(&self, seen: &mut Vec<*const ParseForestNode>) {
        for alternative in &self.alternatives {
            if let ForestAlternative::Children(children) = alternative {
                for child in children {
                    let ptr = Rc::as_ptr(child);
                    if !seen.contains(&ptr) {
                        seen.push(ptr);
                        child.count_into(seen);
                    }
                }
            }
        }
    }
}

/// Cartesian product of the children's expansions, stopping after `limit` sequences.
///
/// Children are expanded right to left, each only as far as the first `limit` sequences can
/// reach: with the last child varying fastest, a child is advanced once per full turn of the
/// children after it.
fn expand_sequence(children: &[Rc<ParseForestNode>], limit: usize) -> Vec<Vec<ConcreteParseTree>> {
    if limit == 0 {
        return Vec::new();
    }
    let mut options = vec![Vec::new(); children.len()];
    let mut turn: usize = 1;
    for (at, child) in children.iter().enumerate().rev() {
        let needed = limit.div_ceil(turn).max(1);
        options[at] = child.expand(needed);
        if options[at].is_empty() {
            return Vec::new();
        }
        turn = turn.saturating_mul(options[at].len());
    }

    let mut sequences = Vec::new();
    let mut picks = vec![0; options.len()];
    loop {
        sequences.push(
            picks
                .iter()
                .zip(&options)
                .map(|(&pick, trees)| trees[pick].clone())
                .collect(),
        );
        if sequences.len() >= limit {
            break;
        }
        // Odometer, last position fastest
        let mut position = options.len();
        loop {
            if position == 0 {
                return sequences;
            }
            position -= 1;
            picks[position] += 1;
            if picks[position] < options[position].len() {
                break;
            }
            picks[position] = 0;
        }
    }
    sequences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(root: &str, value: &str) -> Rc<ParseForestNode> {
        Rc::new(ParseForestNode::new(
            Symbol::new(root),
            ForestAlternative::Literal(value.to_string()),
            2,
        ))
    }

    fn branch(root: &str, children: &[&Rc<ParseForestNode>], cap: usize) -> ParseForestNode {
        ParseForestNode::new(
            Symbol::new(root),
            ForestAlternative::Children(children.iter().map(|c| Rc::clone(c)).collect()),
            cap,
        )
    }

    #[test]
    fn test_merge_respects_cap_and_keeps_oldest() {
        let a = leaf("number", "1");
        let b = leaf("number", "2");
        let mut node = branch("expression", &[&a], 1);
        node.merge(&branch("expression", &[&b], 1)).unwrap();

        assert_eq!(node.alternatives().len(), 1);
        assert_eq!(node.expand(5)[0].leaves(), vec!["1"]);
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let a = leaf("number", "1");
        let mut node = branch("expression", &[&a], 3);
        node.merge(&branch("expression", &[&a], 3)).unwrap();
        assert_eq!(node.alternatives().len(), 1);
    }

    #[test]
    fn test_merge_rejects_other_roots() {
        let a = leaf("number", "1");
        let mut node = branch("expression", &[&a], 2);
        assert_eq!(
            node.merge(&branch("statement", &[&a], 2)).unwrap_err(),
            ForestError::RootMismatch {
                expected: Symbol::new("expression"),
                found: Symbol::new("statement"),
            }
        );
    }

    #[test]
    fn test_concat_splices_children() {
        let x = leaf("word", "x");
        let eq = leaf("equals", "=");
        let three = leaf("number", "3");
        let head = branch("assignment", &[&x], 2);
        let rest = branch("<equals number>", &[&eq, &three], 2);

        let joined = head.concat_to(Symbol::new("assignment"), &rest).unwrap();
        let trees = joined.expand(1);
        assert_eq!(
            trees[0].to_string(),
            r#"(assignment (word "x") (equals "=") (number "3"))"#
        );
    }

    #[test]
    fn test_concat_rejects_literals() {
        let x = leaf("word", "x");
        let rest = branch("<x>", &[&x], 1);
        assert!(matches!(
            x.concat_to(Symbol::new("a"), &rest),
            Err(ForestError::LiteralConcat(_))
        ));
    }

    #[test]
    fn test_expand_last_child_varies_fastest() {
        let mut left = ParseForestNode::new(
            Symbol::new("a"),
            ForestAlternative::Literal("1".into()),
            2,
        );
        left.merge(&ParseForestNode::new(
            Symbol::new("a"),
            ForestAlternative::Literal("2".into()),
            2,
        ))
        .unwrap();
        let mut right = ParseForestNode::new(
            Symbol::new("b"),
            ForestAlternative::Literal("3".into()),
            2,
        );
        right
            .merge(&ParseForestNode::new(
                Symbol::new("b"),
                ForestAlternative::Literal("4".into()),
                2,
            ))
            .unwrap();
        let (left, right) = (Rc::new(left), Rc::new(right));
        let root = branch("s", &[&left, &right], 1);

        let order: Vec<String> = root
            .expand(10)
            .iter()
            .map(|tree| tree.leaves().join(" "))
            .collect();
        assert_eq!(order, vec!["1 3", "1 4", "2 3", "2 4"]);
        assert_eq!(root.expand(3).len(), 3);
    }

    #[test]
    fn test_wide_nodes_expand_in_order() {
        let pairs: Vec<Rc<ParseForestNode>> = (0..12)
            .map(|i| {
                let mut node = ParseForestNode::new(
                    Symbol::new("digit"),
                    ForestAlternative::Literal(format!("{}a", i)),
                    2,
                );
                node.merge(&ParseForestNode::new(
                    Symbol::new("digit"),
                    ForestAlternative::Literal(format!("{}b", i)),
                    2,
                ))
                .unwrap();
                Rc::new(node)
            })
            .collect();
        let row = ParseForestNode::new(
            Symbol::new("row"),
            ForestAlternative::Children(pairs),
            1,
        );

        let trees = row.expand(3);
        assert_eq!(trees.len(), 3);
        let last: Vec<String> = trees
            .iter()
            .map(|tree| tree.leaves()[10..].join(" "))
            .collect();
        assert_eq!(last, vec!["10a 11a", "10a 11b", "10b 11a"]);
        assert!(trees.iter().all(|tree| tree.leaves()[0] == "0a"));
    }

    #[test]
    fn test_node_count_counts_shared_children_once() {
        let x = leaf("word", "x");
        let node = branch("pair", &[&x, &x], 1);
        assert_eq!(node.node_count(), 2);
    }
}
