//! Syntax tree produced by [`crate::parse`]
//!
//! Every node is an owned value: parents hold children through `Box`, nothing
//! is shared and nothing is mutated after the parser returns. `Display` on any
//! node renders canonical pattern text that parses back to an equal tree.

mod expr;
mod operators;
mod path;
mod values;

pub use expr::{
    Comparison, ComparisonExpression, CompositeComparison, CompositePattern, PatternExpression,
    QualifiedPattern, Qualifier,
};
pub use operators::{BooleanOp, ComparisonOp, ComparisonOperator, ObservationOp, UnaryOp};
pub use path::{ListIndex, ObjectPath, PathComponent};
pub use values::{ComparisonRhs, StixValue};
