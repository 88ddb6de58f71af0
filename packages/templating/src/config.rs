//! Compiler configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplatingError};
use crate::interpolation::InterpolationConfig;

/// Tag name of elements that only exist to carry template content.
pub const DEFAULT_TEMPLATE_TAG: &str = "template";

/// Text of the comment left where a template directive extracted content.
pub const DEFAULT_ANCHOR_TEXT: &str = "template anchor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    pub interpolation: InterpolationConfig,
    pub template_tag: String,
    pub anchor_text: String,
}

impl CompilerConfig {
    pub fn validate(&self) -> Result<()> {
        self.interpolation.validate()?;
        if self.template_tag.trim().is_empty() {
            return Err(TemplatingError::InvalidConfig(
                "templateTag must not be empty".to_string(),
            ));
        }
        if self.anchor_text.contains("--") {
            return Err(TemplatingError::InvalidConfig(format!(
                "anchorText \"{}\" cannot be placed inside a comment",
                self.anchor_text
            )));
        }
        Ok(())
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            interpolation: InterpolationConfig::default(),
            template_tag: DEFAULT_TEMPLATE_TAG.to_string(),
            anchor_text: DEFAULT_ANCHOR_TEXT.to_string(),
        }
    }
}
