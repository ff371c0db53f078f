//! Parser for STIX Patterning expressions
//!
//! Turns pattern text such as
//! `[file:hashes.'SHA-256' = 'abcd'] AND [network-traffic:dst_port = 443] WITHIN 300 SECONDS`
//! into a typed [`ast::PatternExpression`] tree. Consumers walk the tree with
//! exhaustive matches or pull the leaf comparisons with [`comparisons_of`];
//! `Display` on any node renders canonical pattern text.

pub mod ast;
pub mod error;
mod grammar;
pub mod lexer;
pub mod parser;
mod pattern;
pub mod traversal;

pub use error::{Error, LexError, ParseError, PatternDiagnostic};
pub use lexer::tokenize;
pub use parser::{parse, parse_with, ParserOptions};
pub use pattern::StixPattern;
pub use traversal::{comparisons_of, Comparisons};
