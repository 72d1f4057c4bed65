//! Traits for language generators and parsers.

use crate::ir::{Language, NodeKind, SourceFile};

/// Error that can occur when rendering IR as source code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error("unsupported {kind}{}", quoted_name(.name))]
    UnsupportedConstruct {
        kind: NodeKind,
        name: Option<String>,
    },
}

impl GenerateError {
    pub fn unsupported(kind: NodeKind, name: Option<&str>) -> Self {
        GenerateError::UnsupportedConstruct {
            kind,
            name: name.map(str::to_string),
        }
    }
}

fn quoted_name(name: &Option<String>) -> String {
    name.as_deref()
        .map(|n| format!(" `{}`", n))
        .unwrap_or_default()
}

/// Error that can occur when reading source code into IR.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    EmptyInput,

    #[error("parser made no progress at line {line}")]
    Stalled { line: usize },
}

/// Options shared by every generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Turn instance fields and auto properties into initializer
    /// assignments (Python).
    pub synthesize_initializers: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            synthesize_initializers: true,
        }
    }
}

/// Options shared by every parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Columns a tab advances the indentation by.
    pub tab_width: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { tab_width: 4 }
    }
}

/// A generator emits the IR as source code in a target language.
pub trait Generator: Send + Sync {
    /// Target language.
    fn language(&self) -> Language;

    /// File extension for output (e.g., "py").
    fn extension(&self) -> &'static str {
        self.language().extension()
    }

    /// Render a whole file. Never returns partial output.
    fn generate(&self, file: &SourceFile, options: &GenerateOptions)
    -> Result<String, GenerateError>;
}

/// A parser reads source code into the IR.
pub trait Parser: Send + Sync {
    /// Source language.
    fn language(&self) -> Language;

    /// File extensions this parser handles (e.g., &["py", "pyi"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source code. `file_name` is the name without extension.
    fn parse(
        &self,
        source: &str,
        file_name: &str,
        options: &ParseOptions,
    ) -> Result<SourceFile, ParseError>;
}
