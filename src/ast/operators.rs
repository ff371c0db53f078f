//! Operator types for AST expressions

use std::fmt;

// ============================================================================
// Operator Enums
// ============================================================================

/// Binary operator of a single comparison: `path <op> value`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Ge,
    Le,
    In,
    Like,
    Matches,
    IsSubset,
    IsSuperset,
}

impl ComparisonOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Le => "<=",
            ComparisonOp::In => "IN",
            ComparisonOp::Like => "LIKE",
            ComparisonOp::Matches => "MATCHES",
            ComparisonOp::IsSubset => "ISSUBSET",
            ComparisonOp::IsSuperset => "ISSUPERSET",
        }
    }
}

/// Prefix operator applied to an object path with no right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Exists,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Exists => "EXISTS",
        }
    }
}

/// Either kind of operator a [`super::Comparison`] can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Binary(ComparisonOp),
    Unary(UnaryOp),
}

impl From<ComparisonOp> for ComparisonOperator {
    fn from(op: ComparisonOp) -> Self {
        ComparisonOperator::Binary(op)
    }
}

impl From<UnaryOp> for ComparisonOperator {
    fn from(op: UnaryOp) -> Self {
        ComparisonOperator::Unary(op)
    }
}

/// Combines comparisons inside one observation bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    And,
    Or,
}

impl BooleanOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
        }
    }

    /// Higher binds tighter
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BooleanOp::Or => 0,
            BooleanOp::And => 1,
        }
    }
}

/// Combines observation expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationOp {
    And,
    Or,
    FollowedBy,
}

impl ObservationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ObservationOp::And => "AND",
            ObservationOp::Or => "OR",
            ObservationOp::FollowedBy => "FOLLOWEDBY",
        }
    }

    /// Higher binds tighter
    pub(crate) fn precedence(self) -> u8 {
        match self {
            ObservationOp::Or => 0,
            ObservationOp::And => 1,
            ObservationOp::FollowedBy => 2,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(ComparisonOp, UnaryOp, BooleanOp, ObservationOp);

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Binary(op) => write!(f, "{}", op),
            ComparisonOperator::Unary(op) => write!(f, "{}", op),
        }
    }
}
