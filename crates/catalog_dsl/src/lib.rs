//! EventCatalog DSL
//!
//! Syntax tree for `.ec` architecture documents and the text parser that
//! produces it. Consumers depend on the [`DslParser`] seam, not on the
//! concrete parser.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod lex;
pub mod parse;

pub use ast::{
    Definition, DomainDef, DomainItem, Field, FieldDef, FieldValue, MessageDef, MessageStmt,
    Program, Reference, ServiceDef, Statement, VisualizerDef, ChannelAttachment,
};
pub use parse::{DslParser, TextParser};
