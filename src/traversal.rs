//! Depth-first walk over every leaf [`Comparison`] of a pattern
//!
//! The walk keeps its own stack of pending nodes instead of recursing, so a
//! caller that stops after the first hit never touches the rest of the tree,
//! and a cloned iterator resumes independently from the same point.

use std::iter::FusedIterator;

use crate::ast::{Comparison, ComparisonExpression, PatternExpression};

/// Comparisons of `pattern` in source order, left before right
///
/// ```
/// let pattern = stix_patterns::parse("[a:b = 1 AND a:c = 2] FOLLOWEDBY [d:e = 3]").unwrap();
/// let paths: Vec<String> = stix_patterns::comparisons_of(&pattern)
///     .map(|c| c.path.to_string())
///     .collect();
/// assert_eq!(paths, ["a:b", "a:c", "d:e"]);
/// ```
pub fn comparisons_of(pattern: &PatternExpression) -> Comparisons<'_> {
    Comparisons::new(Node::Pattern(pattern))
}

#[derive(Debug, Clone, Copy)]
enum Node<'a> {
    Pattern(&'a PatternExpression),
    Comparison(&'a ComparisonExpression),
}

#[derive(Debug, Clone)]
pub struct Comparisons<'a> {
    stack: Vec<Node<'a>>,
}

impl<'a> Comparisons<'a> {
    fn new(root: Node<'a>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Comparisons<'a> {
    type Item = &'a Comparison;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Pattern(PatternExpression::Observation(expr)) => {
                    self.stack.push(Node::Comparison(expr));
                }
                // right goes on first so left pops first
                Node::Pattern(PatternExpression::Composite(p)) => {
                    self.stack.push(Node::Pattern(&p.right));
                    self.stack.push(Node::Pattern(&p.left));
                }
                Node::Pattern(PatternExpression::Qualified(q)) => {
                    self.stack.push(Node::Pattern(&q.pattern));
                }
                Node::Comparison(ComparisonExpression::Comparison(c)) => return Some(c),
                Node::Comparison(ComparisonExpression::Composite(c)) => {
                    self.stack.push(Node::Comparison(&c.right));
                    self.stack.push(Node::Comparison(&c.left));
                }
            }
        }
        None
    }
}

impl FusedIterator for Comparisons<'_> {}

impl PatternExpression {
    pub fn comparisons(&self) -> Comparisons<'_> {
        comparisons_of(self)
    }
}

impl ComparisonExpression {
    pub fn comparisons(&self) -> Comparisons<'_> {
        Comparisons::new(Node::Comparison(self))
    }
}
