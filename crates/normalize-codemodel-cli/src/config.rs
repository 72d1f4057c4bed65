//! Configuration for the codemodel CLI.
//!
//! Loads config from:
//! 1. Global: ~/.config/normalize/codemodel.toml
//! 2. Per-project: .normalize/codemodel.toml (overrides global)
//!
//! Example codemodel.toml:
//! ```toml
//! [generate]
//! target = "csharp"
//! indent_width = 2
//!
//! [parse]
//! tab_width = 8
//! ```

use anyhow::Context;
use normalize_codemodel::{GenerateOptions, ParseOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// `[generate]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Default target language for `generate` and `translate`.
    pub target: Option<String>,
    pub indent_width: Option<usize>,
    pub synthesize_initializers: Option<bool>,
}

/// `[parse]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    pub tab_width: Option<usize>,
}

/// Root configuration structure. Unset keys fall back to library defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodemodelConfig {
    pub generate: GenerateConfig,
    pub parse: ParseConfig,
}

impl CodemodelConfig {
    /// Load the global config, then merge the project config found under `root`.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        Self::load_from(Self::global_config_path().as_deref(), root)
    }

    /// Like [`CodemodelConfig::load`] with an explicit global path.
    pub fn load_from(global: Option<&Path>, root: &Path) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = global
            && let Some(global) = Self::load_file(global_path)?
        {
            config = config.merge(global);
        }

        let project_path = root.join(".normalize").join("codemodel.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = config.merge(project);
        }

        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("normalize").join("codemodel.toml"))
    }

    /// A missing file is not an error; a malformed one is.
    fn load_file(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        tracing::debug!(path = %path.display(), "loading config");
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(Some(config))
    }

    /// Keys set in `other` win; unset keys keep the value from `self`.
    fn merge(self, other: Self) -> Self {
        Self {
            generate: GenerateConfig {
                target: other.generate.target.or(self.generate.target),
                indent_width: other.generate.indent_width.or(self.generate.indent_width),
                synthesize_initializers: other
                    .generate
                    .synthesize_initializers
                    .or(self.generate.synthesize_initializers),
            },
            parse: ParseConfig {
                tab_width: other.parse.tab_width.or(self.parse.tab_width),
            },
        }
    }

    pub fn generate_options(&self) -> GenerateOptions {
        let defaults = GenerateOptions::default();
        GenerateOptions {
            indent_width: self.generate.indent_width.unwrap_or(defaults.indent_width),
            synthesize_initializers: self
                .generate
                .synthesize_initializers
                .unwrap_or(defaults.synthesize_initializers),
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        let defaults = ParseOptions::default();
        ParseOptions {
            tab_width: self.parse.tab_width.unwrap_or(defaults.tab_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project_config(dir: &Path, content: &str) {
        let config_dir = dir.join(".normalize");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("codemodel.toml"), content).unwrap();
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CodemodelConfig::load_from(None, dir.path()).unwrap();
        assert_eq!(config, CodemodelConfig::default());
        assert_eq!(config.generate_options(), GenerateOptions::default());
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_project_config(
            dir.path(),
            "[generate]\ntarget = \"csharp\"\nindent_width = 2\n\n[parse]\ntab_width = 8\n",
        );

        let config = CodemodelConfig::load_from(None, dir.path()).unwrap();
        assert_eq!(config.generate.target.as_deref(), Some("csharp"));
        assert_eq!(config.generate_options().indent_width, 2);
        // unset
        assert!(config.generate_options().synthesize_initializers);
        assert_eq!(config.parse_options().tab_width, 8);
    }

    #[test]
    fn test_project_overrides_only_set_keys() {
        let global_dir = TempDir::new().unwrap();
        let global_path = global_dir.path().join("codemodel.toml");
        std::fs::write(
            &global_path,
            "[generate]\ntarget = \"python\"\nindent_width = 2\nsynthesize_initializers = false\n",
        )
        .unwrap();

        let project = TempDir::new().unwrap();
        write_project_config(project.path(), "[generate]\ntarget = \"csharp\"\n");

        let config = CodemodelConfig::load_from(Some(&global_path), project.path()).unwrap();
        assert_eq!(config.generate.target.as_deref(), Some("csharp"));
        assert_eq!(config.generate.indent_width, Some(2));
        assert_eq!(config.generate.synthesize_initializers, Some(false));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[generate]\nindent_width = \"wide\"\n");

        let err = CodemodelConfig::load_from(None, dir.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[parse]\ntabs = 2\n");
        assert!(CodemodelConfig::load_from(None, dir.path()).is_err());
    }
}
