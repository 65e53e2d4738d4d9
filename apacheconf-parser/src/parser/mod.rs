//! Lexer, tree and parser for Apache httpd configuration
//!
//! This module provides the token stream, the directive tree and the
//! recursive-descent parser that builds one from the other.

pub mod ast;
pub mod classify;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod semantic;

pub use ast::{DirectiveKind, Node, NodeId, NodeKind, SectionKind, Tree};
pub use lexer::{tokenize, Lexer, Token, TokenKind, TokenText};
pub use parser::{parse_tokens, Parser};
pub use semantic::{validate, Diagnostic};
