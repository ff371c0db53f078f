//! Qualifiers: `REPEATS n TIMES`, `WITHIN n SECONDS`,
//! `START t'..' STOP t'..'` (also spelled `STARTSTOP t'..' t'..'`)
//!
//! The grammar fixes the shape; the ranges are checked here.

use chrono::{DateTime, Utc};
use pest::iterators::Pair;

use super::{children, next_child, unexpected_rule, Builder};
use crate::ast::{Qualifier, StixValue};
use crate::error::{Error, ParseError};
use crate::grammar::Rule;

impl<'a> Builder<'a> {
    pub(super) fn qualifier(&mut self, pair: Pair<'a, Rule>) -> Result<Qualifier, Error> {
        let qualifier = next_child(&mut children(pair), "a qualifier")?;
        let rule = qualifier.as_rule();
        let mut literals = children(qualifier).filter(|p| {
            matches!(
                p.as_rule(),
                Rule::int_lit | Rule::float_lit | Rule::timestamp_lit
            )
        });

        match rule {
            Rule::repeats => {
                let count = next_child(&mut literals, "a repeat count")?;
                Ok(Qualifier::Repeats(self.repeat_count(&count)?))
            }
            Rule::within => {
                let seconds = next_child(&mut literals, "a number of seconds")?;
                Ok(Qualifier::Within(self.seconds(&seconds)?))
            }
            Rule::start_stop | Rule::start_stop_compact => {
                let start = next_child(&mut literals, "a START time")?;
                let stop = next_child(&mut literals, "a STOP time")?;
                let start = self.timestamp(&start, None)?;
                let stop = self.timestamp(&stop, Some(start))?;
                Ok(Qualifier::StartStop { start, stop })
            }
            _ => Err(ParseError::internal(format!("unexpected {rule:?} qualifier")).into()),
        }
    }

    fn repeat_count(&mut self, pair: &Pair<'a, Rule>) -> Result<u32, Error> {
        let count = match self.literal(pair)? {
            StixValue::Int(n) => u32::try_from(n).ok().filter(|n| *n >= 1),
            _ => return Err(unexpected_rule(pair)),
        };
        match count {
            Some(count) => Ok(count),
            None => Err(ParseError::invalid_value(
                self.token(pair)?,
                "a repeat count between 1 and 4294967295",
            )
            .into()),
        }
    }

    fn seconds(&mut self, pair: &Pair<'a, Rule>) -> Result<f64, Error> {
        let seconds = match self.literal(pair)? {
            StixValue::Int(n) => n as f64,
            StixValue::Float(x) => x,
            _ => return Err(unexpected_rule(pair)),
        };
        if seconds <= 0.0 {
            return Err(
                ParseError::invalid_value(self.token(pair)?, "a positive number of seconds").into(),
            );
        }
        Ok(seconds)
    }

    /// A timestamp literal, strictly later than `after` when given
    fn timestamp(
        &mut self,
        pair: &Pair<'a, Rule>,
        after: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, Error> {
        let ts = match self.literal(pair)? {
            StixValue::Timestamp(ts) => ts,
            _ => return Err(unexpected_rule(pair)),
        };
        if after.is_some_and(|start| ts <= start) {
            return Err(
                ParseError::invalid_value(self.token(pair)?, "a STOP time later than START").into(),
            );
        }
        Ok(ts)
    }
}
