//! Comparison layer: everything between `[` and `]`

use pest::iterators::Pair;

use super::{children, next_child, unexpected_rule, Builder};
use crate::ast::{
    BooleanOp, Comparison, ComparisonExpression, ComparisonOp, ComparisonOperator, ComparisonRhs,
    CompositeComparison,
};
use crate::error::{Error, ParseError};
use crate::grammar::Rule;

fn comparison_op(pair: &Pair<'_, Rule>) -> Result<ComparisonOp, Error> {
    Ok(match pair.as_rule() {
        Rule::eq => ComparisonOp::Eq,
        Rule::neq => ComparisonOp::Neq,
        Rule::gt => ComparisonOp::Gt,
        Rule::lt => ComparisonOp::Lt,
        Rule::ge => ComparisonOp::Ge,
        Rule::le => ComparisonOp::Le,
        Rule::in_kw => ComparisonOp::In,
        Rule::like_kw => ComparisonOp::Like,
        Rule::matches_kw => ComparisonOp::Matches,
        Rule::issubset_kw => ComparisonOp::IsSubset,
        Rule::issuperset_kw => ComparisonOp::IsSuperset,
        _ => return Err(unexpected_rule(pair)),
    })
}

fn boolean_op(pair: &Pair<'_, Rule>) -> Result<BooleanOp, Error> {
    match pair.as_rule() {
        Rule::and_kw => Ok(BooleanOp::And),
        Rule::or_kw => Ok(BooleanOp::Or),
        _ => Err(unexpected_rule(pair)),
    }
}

impl<'a> Builder<'a> {
    /// `comparison_or`, `comparison_and` or a single term
    pub(super) fn comparison_chain(
        &mut self,
        pair: Pair<'a, Rule>,
    ) -> Result<ComparisonExpression, Error> {
        match pair.as_rule() {
            Rule::comparison_or | Rule::comparison_and => {
                let mut inner = children(pair);
                let mut left = self.comparison_chain(next_child(&mut inner, "an operand")?)?;
                while let Some(op) = inner.next() {
                    self.count_operator(&op)?;
                    let op = boolean_op(&op)?;
                    let right = self.comparison_chain(next_child(&mut inner, "an operand")?)?;
                    left = CompositeComparison::new(left, op, right).into();
                }
                Ok(left)
            }
            Rule::comparison_term => {
                let term = next_child(&mut children(pair), "a comparison")?;
                match term.as_rule() {
                    Rule::comparison_group => {
                        let body = next_child(&mut children(term), "a grouped comparison")?;
                        self.comparison_chain(body)
                    }
                    Rule::exists_comparison => {
                        let path = next_child(&mut children(term).skip(1), "a path after EXISTS")?;
                        Ok(Comparison::exists(self.object_path(path)?).into())
                    }
                    Rule::comparison => Ok(self.comparison(term)?.into()),
                    _ => Err(unexpected_rule(&term)),
                }
            }
            _ => Err(unexpected_rule(&pair)),
        }
    }

    /// `NOT? path NOT? op rhs`; the grammar admits at most one NOT
    fn comparison(&mut self, pair: Pair<'a, Rule>) -> Result<Comparison, Error> {
        let mut negated = false;
        let mut path = None;
        let mut tail = None;

        for child in children(pair) {
            match child.as_rule() {
                Rule::not_kw => negated = true,
                Rule::object_path => path = Some(self.object_path(child)?),
                Rule::equality
                | Rule::ordered_comparison
                | Rule::in_comparison
                | Rule::subset_comparison
                | Rule::string_comparison => tail = Some(self.comparison_tail(child)?),
                _ => return Err(unexpected_rule(&child)),
            }
        }

        let path = path.ok_or_else(|| ParseError::internal("comparison without a path"))?;
        let (op, value) = tail.ok_or_else(|| ParseError::internal("comparison without an operator"))?;
        Ok(Comparison {
            path,
            op: ComparisonOperator::Binary(op),
            value: Some(value),
            negated,
        })
    }

    fn comparison_tail(
        &mut self,
        pair: Pair<'a, Rule>,
    ) -> Result<(ComparisonOp, ComparisonRhs), Error> {
        let mut inner = children(pair);
        let op = comparison_op(&next_child(&mut inner, "an operator")?)?;
        let rhs = self.comparison_rhs(next_child(&mut inner, "a right-hand side")?)?;
        Ok((op, rhs))
    }

    fn comparison_rhs(&mut self, pair: Pair<'a, Rule>) -> Result<ComparisonRhs, Error> {
        match pair.as_rule() {
            Rule::value | Rule::ordered_value | Rule::set_or_string => {
                let inner = next_child(&mut children(pair), "a literal")?;
                self.comparison_rhs(inner)
            }
            Rule::set_literal => {
                let mut values = Vec::new();
                for element in children(pair) {
                    let literal = next_child(&mut children(element), "a set element")?;
                    values.push(self.literal(&literal)?);
                }
                Ok(ComparisonRhs::Set(values))
            }
            Rule::string_lit
            | Rule::hex_lit
            | Rule::binary_lit
            | Rule::timestamp_lit
            | Rule::bool_lit
            | Rule::float_lit
            | Rule::int_lit => Ok(ComparisonRhs::Value(self.literal(&pair)?)),
            _ => Err(unexpected_rule(&pair)),
        }
    }
}
