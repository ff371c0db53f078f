//! pest grammar shared by the lexer and the parser

use pest_derive::Parser;

use crate::error::Expected;
use crate::error::Expected::Token as Tok;
use crate::lexer::{Keyword, TokenKind};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub(crate) struct StixGrammar;

/// Rules that stay in the parse tree only so failures can name them
pub(crate) fn is_punctuation(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::lbracket
            | Rule::rbracket
            | Rule::lparen
            | Rule::rparen
            | Rule::comma
            | Rule::dot
            | Rule::colon
            | Rule::EOI
    )
}

const OBSERVATION_START: &[Expected] = &[Tok(TokenKind::LBracket), Tok(TokenKind::LParen)];

/// What a failed attempt at `rule` tells the user was expected
pub(crate) fn expected_for(rule: Rule) -> &'static [Expected] {
    match rule {
        Rule::EOI => &[Tok(TokenKind::Eof)],

        Rule::pattern
        | Rule::observation_expr
        | Rule::observation_or
        | Rule::observation_and
        | Rule::observation_seq
        | Rule::observation_operand
        | Rule::observation_term => OBSERVATION_START,
        Rule::observation => &[Tok(TokenKind::LBracket)],
        Rule::group => &[Tok(TokenKind::LParen)],

        Rule::qualifier
        | Rule::repeats
        | Rule::within
        | Rule::start_stop
        | Rule::start_stop_compact => &[Expected::Qualifier],

        Rule::comparison_or | Rule::comparison_and | Rule::comparison_term => &[
            Expected::ObjectPath,
            Tok(TokenKind::LParen),
            Tok(TokenKind::Keyword(Keyword::Not)),
            Tok(TokenKind::Keyword(Keyword::Exists)),
        ],
        Rule::comparison => &[Expected::ObjectPath, Tok(TokenKind::Keyword(Keyword::Not))],
        Rule::comparison_group => &[Tok(TokenKind::LParen)],
        Rule::exists_comparison => &[Tok(TokenKind::Keyword(Keyword::Exists))],

        Rule::equality
        | Rule::ordered_comparison
        | Rule::in_comparison
        | Rule::subset_comparison
        | Rule::string_comparison
        | Rule::eq
        | Rule::neq
        | Rule::ge
        | Rule::le
        | Rule::gt
        | Rule::lt
        | Rule::in_kw
        | Rule::like_kw
        | Rule::matches_kw
        | Rule::issubset_kw
        | Rule::issuperset_kw => &[Expected::ComparisonOperator],

        Rule::value => &[Expected::Literal],
        Rule::ordered_value => &[Expected::OrderedLiteral],
        Rule::set_literal => &[Tok(TokenKind::LParen)],
        Rule::set_or_string => &[Tok(TokenKind::LParen), Tok(TokenKind::QuotedString)],

        Rule::object_path | Rule::object_type => &[Expected::ObjectPath],
        Rule::path_property | Rule::property_name => &[Expected::PropertyName],
        Rule::list_index => &[Tok(TokenKind::IntegerLiteral), Tok(TokenKind::Asterisk)],

        Rule::string_lit => &[Tok(TokenKind::QuotedString)],
        Rule::hex_lit => &[Tok(TokenKind::HexLiteral)],
        Rule::binary_lit => &[Tok(TokenKind::BinaryLiteral)],
        Rule::timestamp_lit => &[Tok(TokenKind::Timestamp)],
        Rule::float_lit => &[Tok(TokenKind::FloatLiteral)],
        Rule::int_lit => &[Tok(TokenKind::IntegerLiteral)],
        Rule::bool_lit => &[Tok(TokenKind::BooleanLiteral)],

        Rule::and_kw => &[Tok(TokenKind::Keyword(Keyword::And))],
        Rule::or_kw => &[Tok(TokenKind::Keyword(Keyword::Or))],
        Rule::not_kw => &[Tok(TokenKind::Keyword(Keyword::Not))],
        Rule::followedby_kw => &[Tok(TokenKind::Keyword(Keyword::FollowedBy))],
        Rule::within_kw => &[Tok(TokenKind::Keyword(Keyword::Within))],
        Rule::seconds_kw => &[Tok(TokenKind::Keyword(Keyword::Seconds))],
        Rule::repeats_kw => &[Tok(TokenKind::Keyword(Keyword::Repeats))],
        Rule::times_kw => &[Tok(TokenKind::Keyword(Keyword::Times))],
        Rule::startstop_kw => &[Tok(TokenKind::Keyword(Keyword::StartStop))],
        Rule::start_kw => &[Tok(TokenKind::Keyword(Keyword::Start))],
        Rule::stop_kw => &[Tok(TokenKind::Keyword(Keyword::Stop))],
        Rule::exists_kw => &[Tok(TokenKind::Keyword(Keyword::Exists))],

        Rule::lbracket => &[Tok(TokenKind::LBracket)],
        Rule::rbracket => &[Tok(TokenKind::RBracket)],
        Rule::lparen => &[Tok(TokenKind::LParen)],
        Rule::rparen => &[Tok(TokenKind::RParen)],
        Rule::comma => &[Tok(TokenKind::Comma)],
        Rule::dot => &[Tok(TokenKind::Dot)],
        Rule::colon => &[Tok(TokenKind::Colon)],
        Rule::asterisk => &[Tok(TokenKind::Asterisk)],

        _ => &[],
    }
}

/// The token kind a punctuation rule lexes to
pub(crate) fn punctuation_kind(rule: Rule) -> Option<TokenKind> {
    Some(match rule {
        Rule::eq => TokenKind::Eq,
        Rule::neq => TokenKind::Neq,
        Rule::ge => TokenKind::Ge,
        Rule::le => TokenKind::Le,
        Rule::gt => TokenKind::Gt,
        Rule::lt => TokenKind::Lt,
        Rule::lbracket => TokenKind::LBracket,
        Rule::rbracket => TokenKind::RBracket,
        Rule::lparen => TokenKind::LParen,
        Rule::rparen => TokenKind::RParen,
        Rule::comma => TokenKind::Comma,
        Rule::dot => TokenKind::Dot,
        Rule::colon => TokenKind::Colon,
        Rule::asterisk => TokenKind::Asterisk,
        _ => return None,
    })
}
