//! Tokenizer for STIX pattern text
//!
//! Runs the `tokens` rule of the pest grammar and turns its pairs into
//! classified tokens with byte offsets and line/column positions. Literal
//! tokens are decoded here, so the parser never looks inside a lexeme:
//! - `'it\'s'` → QuotedString, value `String("it's")`
//! - `h'ff00'` → HexLiteral, value `Hex([0xff, 0x00])`
//! - `t'2016-02-14T00:00:00Z'` → Timestamp
//! - `network-traffic` → Identifier (hyphens allowed)
//! - `and`, `And`, `AND` → Keyword(And)

mod literal;
mod token;

pub use token::{Keyword, Position, Span, Token, TokenKind};

use log::trace;
use pest::iterators::{Pair, Pairs};
use pest::Parser as _;

use crate::ast::StixValue;
use crate::error::{LexError, LexErrorKind, LiteralKind};
use crate::grammar::{self, Rule, StixGrammar};

/// Tokenize the whole input; the last token is always [`TokenKind::Eof`]
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input).collect()
}

/// Line and column bookkeeping. Tokens arrive in order, so each step only
/// scans the text since the previous one.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance_to(&mut self, input: &str, offset: usize) -> Position {
        for c in input[self.offset..offset].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = offset;
        Position::new(offset, self.line, self.column)
    }
}

/// Lazy tokenizer, also usable as an iterator that ends after `Eof` or the
/// first error
pub struct Lexer<'a> {
    input: &'a str,
    pairs: Option<Pairs<'a, Rule>>,
    failure: Option<LexError>,
    cursor: Cursor,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let (pairs, failure) = match StixGrammar::parse(Rule::tokens, input) {
            Ok(pairs) => (Some(pairs), None),
            Err(e) => (None, Some(grammar_failure(input, &e))),
        };
        Self {
            input,
            pairs,
            failure,
            cursor: Cursor::start(),
            done: false,
        }
    }

    /// Produce the next token; at end of input this keeps returning `Eof`
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }

        let token = match self.pairs.as_mut().and_then(Iterator::next) {
            Some(pair) => self.classify(pair)?,
            None => {
                let end = self.input.len();
                let at = self.cursor.advance_to(self.input, end);
                self.token(at, end, TokenKind::Eof, None)
            }
        };

        trace!("token {:?} {:?} at {}", token.kind, token.lexeme, token.position());
        Ok(token)
    }

    fn token(
        &self,
        at: Position,
        end: usize,
        kind: TokenKind,
        value: Option<StixValue>,
    ) -> Token<'a> {
        Token {
            kind,
            lexeme: &self.input[at.offset..end],
            span: Span::new(at.offset, end),
            line: at.line,
            column: at.column,
            value,
        }
    }

    fn classify(&mut self, pair: Pair<'a, Rule>) -> Result<Token<'a>, LexError> {
        let span = pair.as_span();
        let (start, end) = (span.start(), span.end());
        let text = span.as_str();
        let at = self.cursor.advance_to(self.input, start);
        let error = |kind| LexError::new(at, Span::new(start, end), kind);

        let (kind, value) = match pair.as_rule() {
            Rule::EOI => (TokenKind::Eof, None),

            Rule::string_lit => {
                let value = literal::unescape(&text[1..text.len() - 1])
                    .map_err(|(offset, c)| self.invalid_escape(start + 1 + offset, c))?;
                (TokenKind::QuotedString, Some(StixValue::String(value)))
            }
            Rule::unterminated_string => {
                // a bad escape before the end of input is the earlier problem
                if let Err((offset, c)) = literal::unescape(&text[1..]) {
                    return Err(self.invalid_escape(start + 1 + offset, c));
                }
                return Err(error(LexErrorKind::Unterminated(LiteralKind::String)));
            }

            Rule::hex_lit | Rule::binary_lit | Rule::timestamp_lit => {
                let body = &text[2..text.len() - 1];
                let (literal, decoded) = match pair.as_rule() {
                    Rule::hex_lit => (
                        LiteralKind::Hex,
                        literal::decode_hex(body).map(StixValue::Hex),
                    ),
                    Rule::binary_lit => (
                        LiteralKind::Binary,
                        literal::decode_binary(body).map(StixValue::Binary),
                    ),
                    _ => (
                        LiteralKind::Timestamp,
                        literal::parse_timestamp(body).map(StixValue::Timestamp),
                    ),
                };
                let value =
                    decoded.map_err(|reason| error(LexErrorKind::Malformed { literal, reason }))?;
                let kind = match literal {
                    LiteralKind::Hex => TokenKind::HexLiteral,
                    LiteralKind::Binary => TokenKind::BinaryLiteral,
                    _ => TokenKind::Timestamp,
                };
                (kind, Some(value))
            }
            Rule::unterminated_prefixed => {
                let literal = match text.as_bytes()[0] {
                    b'h' => LiteralKind::Hex,
                    b'b' => LiteralKind::Binary,
                    _ => LiteralKind::Timestamp,
                };
                return Err(error(LexErrorKind::Unterminated(literal)));
            }

            Rule::float_lit => {
                let value = literal::parse_float(text).map_err(|reason| {
                    error(LexErrorKind::Malformed {
                        literal: LiteralKind::Float,
                        reason,
                    })
                })?;
                (TokenKind::FloatLiteral, Some(StixValue::Float(value)))
            }
            Rule::int_lit => {
                let value = literal::parse_integer(text).map_err(|reason| {
                    error(LexErrorKind::Malformed {
                        literal: LiteralKind::Integer,
                        reason,
                    })
                })?;
                (TokenKind::IntegerLiteral, Some(StixValue::Int(value)))
            }
            // `10abc` is one malformed token, not a number followed by a word
            Rule::malformed_number => {
                let literal = if text.contains('.') {
                    LiteralKind::Float
                } else {
                    LiteralKind::Integer
                };
                return Err(error(LexErrorKind::Malformed {
                    literal,
                    reason: format!("'{text}' is not a number"),
                }));
            }

            Rule::ident => classify_word(text),

            rule => match grammar::punctuation_kind(rule) {
                Some(kind) => (kind, None),
                None => {
                    let c = text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(error(LexErrorKind::UnexpectedChar(c)));
                }
            },
        };

        Ok(self.token(at, end, kind, value))
    }

    /// Error for the escape starting at the backslash at `offset`
    fn invalid_escape(&self, offset: usize, escaped: char) -> LexError {
        let mut cursor = self.cursor;
        let at = cursor.advance_to(self.input, offset);
        LexError::new(
            at,
            Span::new(offset, offset + 1 + escaped.len_utf8()),
            LexErrorKind::InvalidEscape(escaped),
        )
    }
}

/// Identifier, keyword or boolean
fn classify_word(text: &str) -> (TokenKind, Option<StixValue>) {
    if let Some(keyword) = Keyword::from_word(text) {
        (TokenKind::Keyword(keyword), None)
    } else if text.eq_ignore_ascii_case("true") {
        (TokenKind::BooleanLiteral, Some(StixValue::Bool(true)))
    } else if text.eq_ignore_ascii_case("false") {
        (TokenKind::BooleanLiteral, Some(StixValue::Bool(false)))
    } else {
        (TokenKind::Identifier, None)
    }
}

/// The token rule ends in a match-anything alternative, so pest only fails
/// here on input it cannot index; report the character it stopped at
fn grammar_failure(input: &str, err: &pest::error::Error<Rule>) -> LexError {
    let offset = match err.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    let (line, column) = match err.line_col {
        pest::error::LineColLocation::Pos(lc) => lc,
        pest::error::LineColLocation::Span(lc, _) => lc,
    };
    let c = input
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    LexError::new(
        Position::new(offset, line, column),
        Span::new(offset, offset + c.len_utf8()),
        LexErrorKind::UnexpectedChar(c),
    )
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        self.done = match &result {
            Ok(token) => token.kind == TokenKind::Eof,
            Err(_) => true,
        };
        Some(result)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
