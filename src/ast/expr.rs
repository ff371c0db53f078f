//! Pattern and comparison expression nodes
//!
//! Two layers: [`PatternExpression`] combines bracketed observations with
//! AND/OR/FOLLOWEDBY and qualifiers; [`ComparisonExpression`] combines single
//! property tests with AND/OR inside one `[...]`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use super::operators::{BooleanOp, ComparisonOp, ComparisonOperator, ObservationOp, UnaryOp};
use super::path::ObjectPath;
use super::values::ComparisonRhs;

// ============================================================================
// Comparison layer
// ============================================================================

/// A single object-property test: `file:size > 1000`, `EXISTS file:name`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub path: ObjectPath,
    pub op: ComparisonOperator,
    /// `None` only for unary operators
    pub value: Option<ComparisonRhs>,
    /// `path NOT op value`
    pub negated: bool,
}

impl Comparison {
    pub fn new(path: ObjectPath, op: ComparisonOp, value: impl Into<ComparisonRhs>) -> Self {
        Self {
            path,
            op: ComparisonOperator::Binary(op),
            value: Some(value.into()),
            negated: false,
        }
    }

    pub fn exists(path: ObjectPath) -> Self {
        Self {
            path,
            op: ComparisonOperator::Unary(UnaryOp::Exists),
            value: None,
            negated: false,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// The binary operator, if this is not a unary test
    pub fn binary_op(&self) -> Option<ComparisonOp> {
        match self.op {
            ComparisonOperator::Binary(op) => Some(op),
            ComparisonOperator::Unary(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeComparison {
    pub left: Box<ComparisonExpression>,
    pub op: BooleanOp,
    pub right: Box<ComparisonExpression>,
}

impl CompositeComparison {
    pub fn new(left: ComparisonExpression, op: BooleanOp, right: ComparisonExpression) -> Self {
        Self {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// Body of one observation bracket
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonExpression {
    Comparison(Comparison),
    Composite(CompositeComparison),
}

impl ComparisonExpression {
    pub fn and(self, right: impl Into<ComparisonExpression>) -> Self {
        CompositeComparison::new(self, BooleanOp::And, right.into()).into()
    }

    pub fn or(self, right: impl Into<ComparisonExpression>) -> Self {
        CompositeComparison::new(self, BooleanOp::Or, right.into()).into()
    }

    fn precedence(&self) -> Option<u8> {
        match self {
            ComparisonExpression::Comparison(_) => None,
            ComparisonExpression::Composite(c) => Some(c.op.precedence()),
        }
    }
}

impl From<Comparison> for ComparisonExpression {
    fn from(c: Comparison) -> Self {
        ComparisonExpression::Comparison(c)
    }
}

impl From<CompositeComparison> for ComparisonExpression {
    fn from(c: CompositeComparison) -> Self {
        ComparisonExpression::Composite(c)
    }
}

// ============================================================================
// Pattern layer
// ============================================================================

/// Temporal or repetition constraint on a pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Qualifier {
    /// `REPEATS n TIMES`
    Repeats(u32),
    /// `WITHIN n SECONDS`
    Within(f64),
    /// `START t'..' STOP t'..'`
    StartStop {
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    },
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Repeats(n) => write!(f, "REPEATS {} TIMES", n),
            Qualifier::Within(secs) => {
                // whole seconds read better as `300` than `300.0`
                if secs.fract() == 0.0 && secs.abs() < 1e15 {
                    write!(f, "WITHIN {} SECONDS", secs)
                } else {
                    write!(f, "WITHIN {:?} SECONDS", secs)
                }
            }
            Qualifier::StartStop { start, stop } => write!(
                f,
                "START t'{}' STOP t'{}'",
                start.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                stop.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositePattern {
    pub left: Box<PatternExpression>,
    pub op: ObservationOp,
    pub right: Box<PatternExpression>,
}

impl CompositePattern {
    pub fn new(left: PatternExpression, op: ObservationOp, right: PatternExpression) -> Self {
        Self {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedPattern {
    pub pattern: Box<PatternExpression>,
    pub qualifier: Qualifier,
}

impl QualifiedPattern {
    pub fn new(pattern: PatternExpression, qualifier: Qualifier) -> Self {
        Self {
            pattern: Box::new(pattern),
            qualifier,
        }
    }
}

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq)]
pub enum PatternExpression {
    /// One bracketed observation: `[...]`
    Observation(ComparisonExpression),
    Composite(CompositePattern),
    Qualified(QualifiedPattern),
}

impl PatternExpression {
    pub fn observation(expr: impl Into<ComparisonExpression>) -> Self {
        PatternExpression::Observation(expr.into())
    }

    pub fn and(self, right: PatternExpression) -> Self {
        CompositePattern::new(self, ObservationOp::And, right).into()
    }

    pub fn or(self, right: PatternExpression) -> Self {
        CompositePattern::new(self, ObservationOp::Or, right).into()
    }

    pub fn followed_by(self, right: PatternExpression) -> Self {
        CompositePattern::new(self, ObservationOp::FollowedBy, right).into()
    }

    pub fn qualify(self, qualifier: Qualifier) -> Self {
        QualifiedPattern::new(self, qualifier).into()
    }
}

impl From<CompositePattern> for PatternExpression {
    fn from(p: CompositePattern) -> Self {
        PatternExpression::Composite(p)
    }
}

impl From<QualifiedPattern> for PatternExpression {
    fn from(p: QualifiedPattern) -> Self {
        PatternExpression::Qualified(p)
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.op, &self.value) {
            (ComparisonOperator::Unary(op), _) => write!(f, "{} {}", op, self.path),
            (ComparisonOperator::Binary(op), value) => {
                write!(f, "{}", self.path)?;
                if self.negated {
                    f.write_str(" NOT")?;
                }
                write!(f, " {}", op)?;
                if let Some(value) = value {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
        }
    }
}

/// Write `child` of a binary node, wrapping it when it binds looser than the
/// parent, or equally loose on the right (all operators are left-associative)
fn write_operand<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    child: &T,
    child_prec: Option<u8>,
    parent_prec: u8,
    is_right: bool,
) -> fmt::Result {
    let wrap = match child_prec {
        None => false,
        Some(p) => p < parent_prec || (is_right && p == parent_prec),
    };
    if wrap {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

/// Left-nested chains (`a OR b OR c ...`) render in a loop over the left
/// spine rather than one recursive call per operator
impl fmt::Display for CompositeComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut spine = vec![self];
        let mut leftmost = &*self.left;
        while let ComparisonExpression::Composite(inner) = leftmost {
            if inner.op.precedence() < spine[spine.len() - 1].op.precedence() {
                break;
            }
            spine.push(inner);
            leftmost = &*inner.left;
        }

        let deepest = spine[spine.len() - 1].op.precedence();
        write_operand(f, leftmost, leftmost.precedence(), deepest, false)?;
        for node in spine.iter().rev() {
            write!(f, " {} ", node.op)?;
            write_operand(f, &*node.right, node.right.precedence(), node.op.precedence(), true)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonExpression::Comparison(c) => write!(f, "{}", c),
            ComparisonExpression::Composite(c) => write!(f, "{}", c),
        }
    }
}

impl PatternExpression {
    fn precedence(&self) -> Option<u8> {
        match self {
            PatternExpression::Composite(c) => Some(c.op.precedence()),
            PatternExpression::Observation(_) | PatternExpression::Qualified(_) => None,
        }
    }

    /// Render as an operand of a composite pattern
    fn write_operand(&self, f: &mut fmt::Formatter<'_>, parent_prec: u8, is_right: bool) -> fmt::Result {
        match self {
            // a trailing qualifier would otherwise swallow the whole composite
            PatternExpression::Qualified(_) => write!(f, "({})", self),
            _ => write_operand(f, self, self.precedence(), parent_prec, is_right),
        }
    }
}

impl fmt::Display for CompositePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut spine = vec![self];
        let mut leftmost = &*self.left;
        while let PatternExpression::Composite(inner) = leftmost {
            if inner.op.precedence() < spine[spine.len() - 1].op.precedence() {
                break;
            }
            spine.push(inner);
            leftmost = &*inner.left;
        }

        leftmost.write_operand(f, spine[spine.len() - 1].op.precedence(), false)?;
        for node in spine.iter().rev() {
            write!(f, " {} ", node.op)?;
            node.right.write_operand(f, node.op.precedence(), true)?;
        }
        Ok(())
    }
}

impl fmt::Display for QualifiedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut qualifiers = vec![&self.qualifier];
        let mut base = &*self.pattern;
        while let PatternExpression::Qualified(inner) = base {
            qualifiers.push(&inner.qualifier);
            base = &*inner.pattern;
        }

        write!(f, "{}", base)?;
        for qualifier in qualifiers.iter().rev() {
            write!(f, " {}", qualifier)?;
        }
        Ok(())
    }
}

impl fmt::Display for PatternExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternExpression::Observation(expr) => write!(f, "[{}]", expr),
            PatternExpression::Composite(p) => write!(f, "{}", p),
            PatternExpression::Qualified(p) => write!(f, "{}", p),
        }
    }
}
