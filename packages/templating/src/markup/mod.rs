//! Markup parsing
//!
//! A small HTML reader used for inline component templates and for building
//! node trees from strings.

pub mod lexer;
pub mod parser;
pub mod tags;

pub use parser::parse;
pub use tags::is_void_element;
