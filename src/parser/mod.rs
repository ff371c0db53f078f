//! Parser for STIX patterns
//!
//! Parsing runs in three steps:
//! 1. the lexer tokenizes the input, decoding every literal once
//! 2. the `pattern` rule of the pest grammar checks the structure, with one
//!    rule per precedence level:
//!
//! ```text
//! observation_expr    observation_or qualifier*
//! observation_or      observation_and (OR observation_and)*
//! observation_and     observation_seq (AND observation_seq)*
//! observation_seq     observation_operand (FOLLOWEDBY observation_operand)*
//! observation_operand observation_term (qualifier+ &(AND | OR | FOLLOWEDBY))?
//! observation_term    '[' comparison_or ']' | '(' observation_expr ')'
//! ```
//!
//! 3. [`Builder`] folds each level left-associatively into the typed tree,
//!    taking literal values from the tokens of step 1.
//!
//! The comparison layer, object paths and qualifiers live in submodules.

mod comparison;
mod path;
mod qualifier;

use log::debug;
use pest::iterators::Pair;
use pest::Parser as _;

use crate::ast::{CompositePattern, ObservationOp, PatternExpression, StixValue};
use crate::error::{Error, ParseError};
use crate::grammar::{self, Rule, StixGrammar};
use crate::lexer::{tokenize, Token, TokenKind};

pub const DEFAULT_MAX_INPUT_LEN: usize = 64 * 1024;
pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_MAX_OPERATORS: usize = 1024;

/// Resource limits applied while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Longest accepted input in bytes; `None` disables the check
    pub max_input_len: Option<usize>,
    /// Deepest accepted nesting of `[`, `(` groups
    pub max_depth: usize,
    /// Most binary operators plus qualifiers in one pattern, which bounds the
    /// height of left-nested chains
    pub max_operators: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_input_len: Some(DEFAULT_MAX_INPUT_LEN),
            max_depth: DEFAULT_MAX_DEPTH,
            max_operators: DEFAULT_MAX_OPERATORS,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_input_len(mut self, limit: Option<usize>) -> Self {
        self.max_input_len = limit;
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn max_operators(mut self, limit: usize) -> Self {
        self.max_operators = limit;
        self
    }
}

/// Parse a pattern with the default limits
///
/// ```
/// use stix_patterns::{parse, ast::PatternExpression};
///
/// let pattern = parse("[file:name = 'foo.exe'] REPEATS 2 TIMES").unwrap();
/// assert!(matches!(pattern, PatternExpression::Qualified(_)));
/// ```
pub fn parse(input: &str) -> Result<PatternExpression, Error> {
    parse_with(input, &ParserOptions::default())
}

pub fn parse_with(input: &str, options: &ParserOptions) -> Result<PatternExpression, Error> {
    debug!("parsing pattern of {} bytes", input.len());

    let result = parse_inner(input, options);
    match &result {
        Ok(_) => debug!("parsed pattern of {} bytes", input.len()),
        Err(e) => debug!("rejected pattern at offset {}: {}", e.position().offset, e),
    }
    result
}

fn parse_inner(input: &str, options: &ParserOptions) -> Result<PatternExpression, Error> {
    if let Some(limit) = options.max_input_len {
        if input.len() > limit {
            return Err(ParseError::too_long(input, limit).into());
        }
    }

    let tokens = tokenize(input)?;
    check_nesting(&tokens, options.max_depth)?;

    let pattern = StixGrammar::parse(Rule::pattern, input)
        .map_err(|e| ParseError::from_pest(&e, &tokens))?
        .next()
        .ok_or_else(|| ParseError::internal("pest returned no pattern"))?;

    Builder::new(tokens, options.max_operators).pattern(pattern)
}

/// Reject bracket and parenthesis nesting deeper than `max_depth` before the
/// grammar recurses into it
fn check_nesting(tokens: &[Token<'_>], max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for token in tokens {
        match token.kind {
            TokenKind::LBracket | TokenKind::LParen => {
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::too_deep(token, max_depth));
                }
            }
            TokenKind::RBracket | TokenKind::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// Tree building
// ============================================================================

/// Children of `pair`, minus the brackets and separators the grammar keeps
/// only for error reporting
fn children(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner()
        .filter(|p| !grammar::is_punctuation(p.as_rule()))
}

fn next_child<'a>(
    children: &mut impl Iterator<Item = Pair<'a, Rule>>,
    what: &str,
) -> Result<Pair<'a, Rule>, Error> {
    children
        .next()
        .ok_or_else(|| ParseError::internal(format!("grammar guarantees {what}")).into())
}

fn unexpected_rule(pair: &Pair<'_, Rule>) -> Error {
    ParseError::internal(format!("unexpected {:?} in parse tree", pair.as_rule())).into()
}

/// Turns the pest parse tree into the typed syntax tree
///
/// Literal values and error positions come from the token pass, looked up by
/// start offset; both passes use the same literal rules, so the spans agree.
struct Builder<'a> {
    tokens: Vec<Token<'a>>,
    operators: usize,
    max_operators: usize,
}

impl<'a> Builder<'a> {
    fn new(tokens: Vec<Token<'a>>, max_operators: usize) -> Self {
        Self {
            tokens,
            operators: 0,
            max_operators,
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn token_index(&self, pair: &Pair<'a, Rule>) -> Result<usize, Error> {
        let start = pair.as_span().start();
        self.tokens
            .binary_search_by_key(&start, |t| t.span.start)
            .map_err(|_| ParseError::internal(format!("no token at offset {start}")).into())
    }

    /// The token `pair` starts with
    fn token(&self, pair: &Pair<'a, Rule>) -> Result<&Token<'a>, Error> {
        let index = self.token_index(pair)?;
        Ok(&self.tokens[index])
    }

    /// Decoded value of a literal pair; each literal is taken once
    fn literal(&mut self, pair: &Pair<'a, Rule>) -> Result<StixValue, Error> {
        let index = self.token_index(pair)?;
        self.tokens[index].value.take().ok_or_else(|| {
            ParseError::internal(format!("{:?} has no decoded value", pair.as_rule())).into()
        })
    }

    /// Called once per binary operator and qualifier
    fn count_operator(&mut self, pair: &Pair<'a, Rule>) -> Result<(), Error> {
        self.operators += 1;
        if self.operators > self.max_operators {
            let token = self.token(pair)?;
            return Err(ParseError::too_many_operators(token, self.max_operators).into());
        }
        Ok(())
    }

    // ========================================================================
    // Pattern layer
    // ========================================================================

    fn pattern(&mut self, pair: Pair<'a, Rule>) -> Result<PatternExpression, Error> {
        let expr = next_child(&mut children(pair), "an observation expression")?;
        self.observation_expr(expr)
    }

    /// An operator chain followed by the qualifiers that wrap all of it
    fn observation_expr(&mut self, pair: Pair<'a, Rule>) -> Result<PatternExpression, Error> {
        let mut inner = children(pair);
        let chain = next_child(&mut inner, "an observation chain")?;
        let mut expr = self.observation_chain(chain)?;
        for qualifier in inner {
            expr = self.qualify(expr, qualifier)?;
        }
        Ok(expr)
    }

    fn qualify(
        &mut self,
        expr: PatternExpression,
        pair: Pair<'a, Rule>,
    ) -> Result<PatternExpression, Error> {
        self.count_operator(&pair)?;
        Ok(expr.qualify(self.qualifier(pair)?))
    }

    /// One precedence level: `operand (op operand)*`, folded to the left
    fn observation_chain(&mut self, pair: Pair<'a, Rule>) -> Result<PatternExpression, Error> {
        match pair.as_rule() {
            Rule::observation_or | Rule::observation_and | Rule::observation_seq => {
                let mut inner = children(pair);
                let mut left = self.observation_chain(next_child(&mut inner, "an operand")?)?;
                while let Some(op) = inner.next() {
                    self.count_operator(&op)?;
                    let op = observation_op(&op)?;
                    let right = self.observation_chain(next_child(&mut inner, "an operand")?)?;
                    left = CompositePattern::new(left, op, right).into();
                }
                Ok(left)
            }
            Rule::observation_operand => {
                let mut inner = children(pair);
                let mut expr = self.observation_term(next_child(&mut inner, "an observation")?)?;
                for qualifier in inner {
                    expr = self.qualify(expr, qualifier)?;
                }
                Ok(expr)
            }
            _ => Err(unexpected_rule(&pair)),
        }
    }

    fn observation_term(&mut self, pair: Pair<'a, Rule>) -> Result<PatternExpression, Error> {
        let term = next_child(&mut children(pair), "an observation or group")?;
        match term.as_rule() {
            Rule::observation => {
                let body = next_child(&mut children(term), "a comparison expression")?;
                Ok(PatternExpression::Observation(self.comparison_chain(body)?))
            }
            Rule::group => {
                let body = next_child(&mut children(term), "a grouped pattern")?;
                self.observation_expr(body)
            }
            _ => Err(unexpected_rule(&term)),
        }
    }
}

fn observation_op(pair: &Pair<'_, Rule>) -> Result<ObservationOp, Error> {
    match pair.as_rule() {
        Rule::and_kw => Ok(ObservationOp::And),
        Rule::or_kw => Ok(ObservationOp::Or),
        Rule::followedby_kw => Ok(ObservationOp::FollowedBy),
        _ => Err(unexpected_rule(pair)),
    }
}
