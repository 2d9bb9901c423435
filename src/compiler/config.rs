use crate::error::{Result, SourceMapError};

/// Where the source path goes in a command template.
pub const PATH_SLOT: &str = "%s";

/// Optimized build with assembly JSON, which carries per-instruction offsets.
pub const DEFAULT_COMMAND_TEMPLATE: &str = "solc --optimize --asm-json %s";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    command_template: String,
}

impl CompilerConfig {
    /// Accepts a template holding exactly one `%s` slot.
    pub fn new(command_template: impl Into<String>) -> Result<Self> {
        let command_template = command_template.into();
        if command_template.matches(PATH_SLOT).count() != 1 {
            return Err(SourceMapError::Template(command_template));
        }
        Ok(Self { command_template })
    }

    pub fn command_template(&self) -> &str {
        &self.command_template
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command_template: DEFAULT_COMMAND_TEMPLATE.to_string(),
        }
    }
}
