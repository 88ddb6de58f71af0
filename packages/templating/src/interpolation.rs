//! Interpolation markers
//!
//! Decides whether a text node needs a binder. The expression between the
//! markers is never looked at.

use serde::{Deserialize, Serialize};

use crate::assertions::assert_interpolation_symbols;
use crate::error::Result;

/// Interpolation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct InterpolationConfig {
    pub start: String,
    pub end: String,
}

impl InterpolationConfig {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        InterpolationConfig {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Builds a config from `[start, end]` markers, validating them.
    pub fn from_markers(start: &str, end: &str) -> Result<Self> {
        assert_interpolation_symbols("interpolation", start, end)?;
        Ok(InterpolationConfig::new(start, end))
    }

    pub fn validate(&self) -> Result<()> {
        assert_interpolation_symbols("interpolation", &self.start, &self.end)
    }

    /// True when `text` holds a start marker that is closed later on.
    pub fn requires_binding(&self, text: &str) -> bool {
        match text.find(&self.start) {
            Some(pos) => text[pos + self.start.len()..].contains(&self.end),
            None => false,
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        InterpolationConfig::new("{{", "}}")
    }
}

impl From<[String; 2]> for InterpolationConfig {
    fn from([start, end]: [String; 2]) -> Self {
        InterpolationConfig { start, end }
    }
}

impl From<InterpolationConfig> for [String; 2] {
    fn from(config: InterpolationConfig) -> Self {
        [config.start, config.end]
    }
}
