//! Registry for generators and parsers.
//!
//! Built-in entries are registered lazily on first lookup, gated by the
//! `write-*` / `read-*` features. Entries are stateless: each call creates
//! its own working state.

use crate::ir::Language;
use crate::traits::{Generator, Parser};
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global generator registry.
static GENERATORS: RwLock<Vec<&'static dyn Generator>> = RwLock::new(Vec::new());
static GENERATORS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Global parser registry.
static PARSERS: RwLock<Vec<&'static dyn Parser>> = RwLock::new(Vec::new());
static PARSERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom generator. Later registrations do not shadow earlier
/// ones for the same language.
pub fn register_generator(generator: &'static dyn Generator) {
    init_generators();
    GENERATORS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(generator);
}

/// Register a custom parser.
pub fn register_parser(parser: &'static dyn Parser) {
    init_parsers();
    PARSERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(parser);
}

fn init_generators() {
    GENERATORS_INITIALIZED.get_or_init(|| {
        let mut generators = GENERATORS.write().unwrap_or_else(PoisonError::into_inner);
        #[cfg(feature = "write-python")]
        {
            generators.push(&crate::output::python::PYTHON_GENERATOR);
        }
        #[cfg(feature = "write-csharp")]
        {
            generators.push(&crate::output::csharp::CSHARP_GENERATOR);
        }
        tracing::trace!(count = generators.len(), "registered built-in generators");
    });
}

fn init_parsers() {
    PARSERS_INITIALIZED.get_or_init(|| {
        let mut parsers = PARSERS.write().unwrap_or_else(PoisonError::into_inner);
        #[cfg(feature = "read-python")]
        {
            parsers.push(&crate::input::python::PYTHON_PARSER);
        }
        tracing::trace!(count = parsers.len(), "registered built-in parsers");
    });
}

/// Get a generator by language identifier (`"python"`, `"csharp"`, `"c#"`, ...).
pub fn generator_for_language(lang: &str) -> Option<&'static dyn Generator> {
    let lang = Language::from_id(lang)?;
    init_generators();
    GENERATORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|g| g.language() == lang)
        .copied()
}

/// Get a generator by output file extension.
pub fn generator_for_extension(ext: &str) -> Option<&'static dyn Generator> {
    let ext = ext.trim_start_matches('.');
    init_generators();
    GENERATORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|g| g.extension() == ext || Language::from_extension(ext) == Some(g.language()))
        .copied()
}

/// Get a parser by language identifier.
pub fn parser_for_language(lang: &str) -> Option<&'static dyn Parser> {
    let lang = Language::from_id(lang)?;
    init_parsers();
    PARSERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|p| p.language() == lang)
        .copied()
}

/// Get a parser by source file extension.
pub fn parser_for_extension(ext: &str) -> Option<&'static dyn Parser> {
    let ext = ext.trim_start_matches('.');
    init_parsers();
    PARSERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|p| p.extensions().contains(&ext))
        .copied()
}

/// Get all registered generators.
pub fn generators() -> Vec<&'static dyn Generator> {
    init_generators();
    GENERATORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Get all registered parsers.
pub fn parsers() -> Vec<&'static dyn Parser> {
    init_parsers();
    PARSERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "write-python")]
    fn test_python_generator_lookup() {
        let generator = generator_for_language("python").expect("python generator");
        assert_eq!(generator.language(), Language::Python);
        assert_eq!(generator.extension(), "py");

        let generator = generator_for_extension(".pyi").expect("pyi extension");
        assert_eq!(generator.language(), Language::Python);
    }

    #[test]
    #[cfg(feature = "write-csharp")]
    fn test_csharp_generator_lookup() {
        let generator = generator_for_language("C#").expect("csharp generator");
        assert_eq!(generator.extension(), "cs");
        assert!(generator_for_extension("cs").is_some());
    }

    #[test]
    #[cfg(feature = "read-python")]
    fn test_parser_lookup() {
        let parser = parser_for_extension("py").expect("py parser");
        assert_eq!(parser.language(), Language::Python);
        assert!(parser_for_language("python").is_some());
        assert!(parser_for_language("csharp").is_none());
    }

    #[test]
    fn test_unknown_language() {
        assert!(generator_for_language("cobol").is_none());
        assert!(parser_for_extension("rs").is_none());
    }

    #[test]
    #[cfg(all(feature = "read-python", feature = "write-python"))]
    fn test_roundtrip_via_registry() {
        use crate::traits::{GenerateOptions, ParseOptions};

        let parser = parser_for_language("python").unwrap();
        let generator = generator_for_language("python").unwrap();

        let ir = parser
            .parse("x = 1 + 2\n", "main", &ParseOptions::default())
            .unwrap();
        let py = generator.generate(&ir, &GenerateOptions::default()).unwrap();

        assert_eq!(py, "x = 1 + 2\n");
    }

    #[test]
    #[cfg(all(feature = "write-python", feature = "write-csharp"))]
    fn test_builtins_listed() {
        let languages: Vec<Language> = generators().iter().map(|g| g.language()).collect();
        assert!(languages.contains(&Language::Python));
        assert!(languages.contains(&Language::CSharp));
    }
}
