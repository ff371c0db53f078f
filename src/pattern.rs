use std::fmt;
use std::str::FromStr;

use crate::ast::PatternExpression;
use crate::error::Error;
use crate::traversal::{comparisons_of, Comparisons};

/// A parsed pattern that remembers the text it came from
#[derive(Clone, PartialEq)]
pub struct StixPattern {
    raw: String,
    nodes: PatternExpression,
}

impl StixPattern {
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        let nodes = crate::parse(&raw)?;
        Ok(Self { raw, nodes })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn nodes(&self) -> &PatternExpression {
        &self.nodes
    }

    pub fn comparisons(&self) -> Comparisons<'_> {
        comparisons_of(&self.nodes)
    }
}

impl FromStr for StixPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for StixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// The raw text is the most useful thing to show in assertion failures
impl fmt::Debug for StixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
