//! Parsers: read source code into the code model.

#[cfg(feature = "read-python")]
pub mod python;

#[cfg(feature = "read-python")]
pub use python::{PYTHON_PARSER, PythonParser, parse_python};
