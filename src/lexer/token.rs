//! Token types produced by the lexer

use std::fmt;

use miette::SourceSpan;

use crate::ast::StixValue;

// ============================================================================
// Keywords
// ============================================================================

/// Reserved words of the pattern language, matched case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    And,
    Or,
    Not,
    FollowedBy,
    Within,
    Seconds,
    Repeats,
    Times,
    StartStop,
    Start,
    Stop,
    Like,
    Matches,
    IsSubset,
    IsSuperset,
    In,
    Exists,
}

impl Keyword {
    const ALL: [Keyword; 17] = [
        Keyword::And,
        Keyword::Or,
        Keyword::Not,
        Keyword::FollowedBy,
        Keyword::Within,
        Keyword::Seconds,
        Keyword::Repeats,
        Keyword::Times,
        Keyword::StartStop,
        Keyword::Start,
        Keyword::Stop,
        Keyword::Like,
        Keyword::Matches,
        Keyword::IsSubset,
        Keyword::IsSuperset,
        Keyword::In,
        Keyword::Exists,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::FollowedBy => "FOLLOWEDBY",
            Keyword::Within => "WITHIN",
            Keyword::Seconds => "SECONDS",
            Keyword::Repeats => "REPEATS",
            Keyword::Times => "TIMES",
            Keyword::StartStop => "STARTSTOP",
            Keyword::Start => "START",
            Keyword::Stop => "STOP",
            Keyword::Like => "LIKE",
            Keyword::Matches => "MATCHES",
            Keyword::IsSubset => "ISSUBSET",
            Keyword::IsSuperset => "ISSUPERSET",
            Keyword::In => "IN",
            Keyword::Exists => "EXISTS",
        }
    }

    /// Look up a bare word, ignoring ASCII case
    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Token kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    QuotedString,
    IntegerLiteral,
    FloatLiteral,
    HexLiteral,
    BinaryLiteral,
    BooleanLiteral,
    Timestamp,
    Keyword(Keyword),
    // comparison operators
    Eq,
    Neq,
    Gt,
    Lt,
    Ge,
    Le,
    // structure
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    Colon,
    Asterisk,
    Eof,
}

impl TokenKind {
    /// True for every kind whose token carries a decoded [`StixValue`]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::QuotedString
                | TokenKind::IntegerLiteral
                | TokenKind::FloatLiteral
                | TokenKind::HexLiteral
                | TokenKind::BinaryLiteral
                | TokenKind::BooleanLiteral
                | TokenKind::Timestamp
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => f.write_str("identifier"),
            TokenKind::QuotedString => f.write_str("string literal"),
            TokenKind::IntegerLiteral => f.write_str("integer"),
            TokenKind::FloatLiteral => f.write_str("float"),
            TokenKind::HexLiteral => f.write_str("hex literal"),
            TokenKind::BinaryLiteral => f.write_str("binary literal"),
            TokenKind::BooleanLiteral => f.write_str("boolean"),
            TokenKind::Timestamp => f.write_str("timestamp"),
            TokenKind::Keyword(k) => write!(f, "{}", k),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::Neq => f.write_str("'!='"),
            TokenKind::Gt => f.write_str("'>'"),
            TokenKind::Lt => f.write_str("'<'"),
            TokenKind::Ge => f.write_str("'>='"),
            TokenKind::Le => f.write_str("'<='"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Asterisk => f.write_str("'*'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

// ============================================================================
// Positions
// ============================================================================

/// A location in the pattern text: byte offset plus 1-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Half-open byte range `start..end` into the pattern text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Source text of the token, exactly as written
    pub lexeme: &'a str,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    /// Decoded value; `Some` exactly when `kind.is_literal()`
    pub value: Option<StixValue>,
}

impl<'a> Token<'a> {
    pub fn position(&self) -> Position {
        Position::new(self.span.start, self.line, self.column)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}
