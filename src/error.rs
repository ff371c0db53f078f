//! Error types for lexing and parsing, plus miette diagnostics

use std::fmt;

use itertools::Itertools;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::grammar::{self, Rule};
use crate::lexer::{Keyword, Position, Span, Token, TokenKind};

// ============================================================================
// Lexer errors
// ============================================================================

/// Kinds of literal the lexer decodes, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Integer,
    Float,
    Hex,
    Binary,
    Timestamp,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LiteralKind::String => "string",
            LiteralKind::Integer => "integer",
            LiteralKind::Float => "float",
            LiteralKind::Hex => "hex",
            LiteralKind::Binary => "binary",
            LiteralKind::Timestamp => "timestamp",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated {0} literal")]
    Unterminated(LiteralKind),

    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    #[error("malformed {literal} literal: {reason}")]
    Malformed { literal: LiteralKind, reason: String },

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
}

/// A malformed token; lexing stops at the first one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct LexError {
    pub position: Position,
    pub span: Span,
    pub kind: LexErrorKind,
}

impl LexError {
    pub fn new(position: Position, span: Span, kind: LexErrorKind) -> Self {
        Self {
            position,
            span,
            kind,
        }
    }
}

// ============================================================================
// Parser errors
// ============================================================================

/// One entry of the set of things the parser would have accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    Token(TokenKind),
    /// any scalar literal
    Literal,
    /// a literal the ordering operators accept
    OrderedLiteral,
    ObjectPath,
    PropertyName,
    ComparisonOperator,
    Qualifier,
}

impl Expected {
    pub fn keyword(k: Keyword) -> Self {
        Expected::Token(TokenKind::Keyword(k))
    }
}

impl From<TokenKind> for Expected {
    fn from(kind: TokenKind) -> Self {
        Expected::Token(kind)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Literal => f.write_str("literal value"),
            Expected::OrderedLiteral => f.write_str("string, number or timestamp"),
            Expected::ObjectPath => f.write_str("object path"),
            Expected::PropertyName => f.write_str("property name"),
            Expected::ComparisonOperator => f.write_str("comparison operator"),
            Expected::Qualifier => f.write_str("qualifier (REPEATS, WITHIN, START)"),
        }
    }
}

/// The token the parser stopped at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Found {
    pub fn from_token(token: &Token<'_>) -> Self {
        Self {
            kind: token.kind,
            lexeme: token.lexeme.to_string(),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {}, found {found}", describe_expected(.expected))]
    Unexpected {
        expected: Vec<Expected>,
        found: Found,
    },

    #[error("expected {expected}, found {found}")]
    InvalidValue {
        expected: &'static str,
        found: String,
    },

    #[error("nesting exceeds the maximum depth of {limit}")]
    TooDeep { limit: usize },

    #[error("pattern is {len} bytes, exceeding the limit of {limit} bytes")]
    TooLong { len: usize, limit: usize },

    #[error("pattern has more than {limit} operators and qualifiers")]
    TooManyOperators { limit: usize },

    #[error("internal parser error: {0}")]
    Internal(String),
}

fn describe_expected(expected: &[Expected]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} or {}", init.iter().join(", "), last),
    }
}

/// A token sequence that violates the grammar; parsing stops at the first one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct ParseError {
    pub position: Position,
    pub span: Span,
    pub kind: ParseErrorKind,
}

impl ParseError {
    // =========================================================================
    // Builder methods for consistent error construction
    // =========================================================================

    /// The parser found `token` where one of `expected` was required
    pub fn unexpected(token: &Token<'_>, expected: Vec<Expected>) -> Self {
        Self {
            position: token.position(),
            span: token.span,
            kind: ParseErrorKind::Unexpected {
                expected,
                found: Found::from_token(token),
            },
        }
    }

    /// The token is of the right class but its value is out of range
    pub fn invalid_value(token: &Token<'_>, expected: &'static str) -> Self {
        Self {
            position: token.position(),
            span: token.span,
            kind: ParseErrorKind::InvalidValue {
                expected,
                found: token.lexeme.to_string(),
            },
        }
    }

    pub fn too_deep(token: &Token<'_>, limit: usize) -> Self {
        Self {
            position: token.position(),
            span: token.span,
            kind: ParseErrorKind::TooDeep { limit },
        }
    }

    pub fn too_many_operators(token: &Token<'_>, limit: usize) -> Self {
        Self {
            position: token.position(),
            span: token.span,
            kind: ParseErrorKind::TooManyOperators { limit },
        }
    }

    /// `input` runs past `limit` bytes; the error points at the first
    /// character that does not fit
    pub fn too_long(input: &str, limit: usize) -> Self {
        let offset = (0..=limit.min(input.len()))
            .rev()
            .find(|&i| input.is_char_boundary(i))
            .unwrap_or(0);
        let (line, column) = pest::Position::new(input, offset)
            .map(|pos| pos.line_col())
            .unwrap_or((1, 1));
        Self {
            position: Position::new(offset, line, column),
            span: Span::new(offset, input.len()),
            kind: ParseErrorKind::TooLong {
                len: input.len(),
                limit,
            },
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            position: Position::new(0, 1, 1),
            span: Span::new(0, 0),
            kind: ParseErrorKind::Internal(message.into()),
        }
    }

    /// Map a pest failure onto the token it stopped at
    ///
    /// `tokens` is the output of the token pass over the same input. The
    /// expected set is built from the rules pest tried at the failure offset,
    /// in the order it tried them.
    pub(crate) fn from_pest(err: &pest::error::Error<Rule>, tokens: &[Token<'_>]) -> Self {
        use pest::error::{ErrorVariant, InputLocation, LineColLocation};

        let offset = match err.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        let (line, column) = match err.line_col {
            LineColLocation::Pos(lc) => lc,
            LineColLocation::Span(lc, _) => lc,
        };
        let expected = match &err.variant {
            ErrorVariant::ParsingError { positives, .. } => positives
                .iter()
                .flat_map(|rule| grammar::expected_for(*rule))
                .copied()
                .unique()
                .collect(),
            ErrorVariant::CustomError { .. } => Vec::new(),
        };
        let position = Position::new(offset, line, column);

        match tokens.iter().find(|t| t.span.end > offset || t.kind == TokenKind::Eof) {
            Some(token) => Self {
                position,
                ..Self::unexpected(token, expected)
            },
            None => Self {
                position,
                span: Span::new(offset, offset),
                kind: ParseErrorKind::Unexpected {
                    expected,
                    found: Found {
                        kind: TokenKind::Eof,
                        lexeme: String::new(),
                    },
                },
            },
        }
    }

    /// Token classes that would have been accepted at `position`
    pub fn expected(&self) -> &[Expected] {
        match &self.kind {
            ParseErrorKind::Unexpected { expected, .. } => expected,
            _ => &[],
        }
    }

    /// The offending token, if the failure was a grammar mismatch
    pub fn found(&self) -> Option<&Found> {
        match &self.kind {
            ParseErrorKind::Unexpected { found, .. } => Some(found),
            _ => None,
        }
    }
}

// ============================================================================
// Umbrella error
// ============================================================================

/// Any failure of [`crate::parse`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Lex(e) => e.position,
            Error::Parse(e) => e.position,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span,
            Error::Parse(e) => e.span,
        }
    }

    /// Attach the pattern text, producing a caret-style diagnostic
    pub fn with_source(self, src: impl Into<String>) -> PatternDiagnostic {
        let src = src.into();
        let span = label_span(self.span(), src.len());
        let Position { line, column, .. } = self.position();

        match self {
            Error::Lex(e) => PatternDiagnostic::Lex {
                help: lex_help(&e.kind),
                reason: e.kind.to_string(),
                src,
                span,
                line,
                column,
            },
            Error::Parse(e) => PatternDiagnostic::Syntax {
                help: parse_help(&e.kind),
                message: syntax_label(&e.kind),
                src,
                span,
                line,
                column,
            },
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A parse failure together with its source text, for rich rendering
#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum PatternDiagnostic {
    #[error("Invalid token at line {line}, column {column}")]
    #[diagnostic(code(stix_patterns::lex))]
    Lex {
        #[source_code]
        src: String,
        #[label("{reason}")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        reason: String,
        line: usize,
        column: usize,
    },

    #[error("Syntax error at line {line}, column {column}")]
    #[diagnostic(code(stix_patterns::syntax))]
    Syntax {
        #[source_code]
        src: String,
        #[label("{message}")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        message: String,
        line: usize,
        column: usize,
    },
}

/// Non-zero width label so miette draws an arrow; at end of input point back
/// at the last character
fn label_span(span: Span, src_len: usize) -> SourceSpan {
    if span.start >= src_len {
        if src_len > 0 {
            (src_len - 1, 1).into()
        } else {
            (0, 0).into()
        }
    } else {
        let end = span.end.min(src_len);
        (span.start, end.saturating_sub(span.start).max(1)).into()
    }
}

fn syntax_label(kind: &ParseErrorKind) -> String {
    match kind {
        ParseErrorKind::Unexpected { expected, .. } => {
            let names: Vec<String> = expected.iter().map(|e| e.to_string()).collect();
            match names.len() {
                0 => "unexpected input".to_string(),
                1 => format!("expected {}", names[0]),
                2..=4 => format!("expected one of: {}", names.join(", ")),
                _ => format!("expected one of: {}, ...", names[..4].join(", ")),
            }
        }
        other => other.to_string(),
    }
}

fn lex_help(kind: &LexErrorKind) -> Option<String> {
    match kind {
        LexErrorKind::Unterminated(LiteralKind::String) => {
            Some("Close the string with a single quote (')".to_string())
        }
        LexErrorKind::Unterminated(literal) => Some(format!(
            "Close the {literal} literal with a single quote, e.g. {}",
            match literal {
                LiteralKind::Hex => "h'ff00'",
                LiteralKind::Binary => "b'aGVsbG8='",
                _ => "t'2016-02-14T00:00:00Z'",
            }
        )),
        LexErrorKind::InvalidEscape(_) => {
            Some("Only \\' and \\\\ escapes are allowed in strings".to_string())
        }
        LexErrorKind::Malformed {
            literal: LiteralKind::Timestamp,
            ..
        } => Some("Timestamps use RFC 3339, e.g. t'2016-02-14T00:00:00Z'".to_string()),
        LexErrorKind::Malformed { .. } => None,
        LexErrorKind::UnexpectedChar('"') => {
            Some("Strings are quoted with single quotes, e.g. 'foo.exe'".to_string())
        }
        LexErrorKind::UnexpectedChar(_) => None,
    }
}

/// Generate contextual help text based on error patterns
fn parse_help(kind: &ParseErrorKind) -> Option<String> {
    let (expected, found) = match kind {
        ParseErrorKind::Unexpected { expected, found } => (expected, found),
        ParseErrorKind::TooDeep { .. } => {
            return Some("Reduce the bracket nesting or raise the depth limit".to_string())
        }
        ParseErrorKind::TooLong { .. } => {
            return Some("Shorten the pattern or raise the input length limit".to_string())
        }
        ParseErrorKind::TooManyOperators { .. } => {
            return Some(
                "Split the pattern into smaller ones or raise the operator limit".to_string(),
            )
        }
        ParseErrorKind::InvalidValue { .. } | ParseErrorKind::Internal(_) => return None,
    };

    if found.kind == TokenKind::Keyword(Keyword::Not)
        && expected.contains(&Expected::Token(TokenKind::LBracket))
    {
        return Some(
            "NOT negates a single comparison and goes inside the brackets, e.g. [file:name NOT = 'a.exe']"
                .to_string(),
        );
    }

    if expected.contains(&Expected::Literal) {
        return Some(
            "Add a value after the operator, e.g. [file:name = 'foo.exe']".to_string(),
        );
    }

    if expected.contains(&Expected::Token(TokenKind::RBracket)) && found.is_eof() {
        return Some("Observation expressions must be closed with ']'".to_string());
    }

    if expected.contains(&Expected::Token(TokenKind::RParen)) && found.is_eof() {
        return Some("Close the group with ')'".to_string());
    }

    if expected.contains(&Expected::Token(TokenKind::Colon)) {
        return Some(
            "Object paths start with an object type and a colon, e.g. file:name".to_string(),
        );
    }

    if expected.contains(&Expected::Qualifier) && found.kind == TokenKind::Identifier {
        return Some(
            "Valid qualifiers: REPEATS <n> TIMES, WITHIN <n> SECONDS, START t'...' STOP t'...'"
                .to_string(),
        );
    }

    if expected.contains(&Expected::Token(TokenKind::Eof)) {
        return Some(
            "Unexpected input after the pattern. Check for unbalanced brackets or parentheses."
                .to_string(),
        );
    }

    None
}
