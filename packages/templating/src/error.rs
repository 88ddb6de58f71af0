//! Errors
//!
//! Every fallible operation of the crate reports a [`TemplatingError`].

use std::fmt;

use thiserror::Error;

/// Location of a markup syntax error inside a template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub msg: String,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseError {
    pub fn new(msg: impl Into<String>, offset: usize, line: usize, col: usize) -> Self {
        ParseError {
            msg: msg.into(),
            offset,
            line,
            col,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.msg, self.line, self.col)
    }
}

#[derive(Debug, Error)]
pub enum TemplatingError {
    /// A directive selector that cannot be matched against anything.
    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid compiler configuration: {0}")]
    InvalidConfig(String),

    #[error("template parse error: {0}")]
    Markup(ParseError),

    /// Two directives both want to own the same element.
    #[error("element <{element}> is claimed by both \"{first}\" and \"{second}\"")]
    ConflictingDirectives {
        element: String,
        first: String,
        second: String,
    },

    #[error("component \"{0}\" instantiates itself through its own template")]
    RecursiveComponent(String),

    #[error("view is not present in this view port")]
    ViewNotInPort,

    #[error("view port anchor is not attached to a parent node")]
    DetachedAnchor,

    #[error("invalid node hierarchy: {0}")]
    Hierarchy(String),
}

impl From<ParseError> for TemplatingError {
    fn from(err: ParseError) -> Self {
        TemplatingError::Markup(err)
    }
}

pub type Result<T> = std::result::Result<T, TemplatingError>;
