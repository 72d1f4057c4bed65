//! Language-neutral code model with source generators and parsers.
//!
//! `normalize-codemodel` provides a tree-shaped IR for object-oriented
//! programs (files, types, members, statements) and translates it to and
//! from source text. Expressions stay opaque text: the model captures
//! declarations and control flow, not deep semantics.
//!
//! # Architecture
//!
//! ```text
//! Source Languages        IR                 Target Languages
//! ────────────────    ──────────────     ────────────────────
//! Python          ──> SourceFile ─────┬─> Python
//!                      (ir/)          └─> C#
//! ```
//!
//! # Example
//!
//! ```
//! use normalize_codemodel::{GenerateOptions, ParseOptions};
//! use normalize_codemodel::{generator_for_language, parser_for_extension};
//!
//! let parser = parser_for_extension("py").unwrap();
//! let ir = parser.parse("x = 1 + 2\n", "main", &ParseOptions::default()).unwrap();
//!
//! let csharp = generator_for_language("csharp").unwrap();
//! let text = csharp.generate(&ir, &GenerateOptions::default()).unwrap();
//! assert!(text.contains("x = 1 + 2;"));
//! ```
//!
//! # Round trips
//!
//! Output of the Python generator is laid out so that the Python parser
//! reads it back into an equivalent tree: generating, parsing and
//! generating again reproduces the first output for any tree without
//! raw-code overrides. Structural equivalence between trees is checked
//! with [`StructureEq`].

pub mod ir;
pub mod naming;
pub mod registry;
pub mod resolve;
pub mod traits;

pub mod input;
pub mod output;

// Re-exports: IR types
pub use ir::{
    Access, Annotation, Import, Language, Member, MemberKind, Modifiers, Namespace, Node,
    NodeKind, NodeMeta, Parameter, SourceFile, Stmt, StmtKind, StructureEq, TypeDecl, TypeKind,
    TypeRef,
};

// Re-exports: Traits
pub use traits::{GenerateError, GenerateOptions, Generator, ParseError, ParseOptions, Parser};

// Re-exports: Registry
pub use registry::{
    generator_for_extension, generator_for_language, generators, parser_for_extension,
    parser_for_language, parsers, register_generator, register_parser,
};

pub use resolve::TypeResolver;

// Re-exports: Built-in parsers
#[cfg(feature = "read-python")]
pub use input::python::{PythonParser, parse_python};

// Re-exports: Built-in generators
#[cfg(feature = "write-csharp")]
pub use output::csharp::{CSharpGenerator, CSharpGeneratorImpl};
#[cfg(feature = "write-python")]
pub use output::python::{PythonGenerator, PythonGeneratorImpl};
