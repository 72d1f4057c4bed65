//! Generators: emit the code model as source code.

#[cfg(feature = "write-csharp")]
pub mod csharp;
#[cfg(feature = "write-python")]
pub mod python;

#[cfg(feature = "write-csharp")]
pub use csharp::{CSHARP_GENERATOR, CSharpGenerator, CSharpGeneratorImpl};
#[cfg(feature = "write-python")]
pub use python::{PYTHON_GENERATOR, PythonGenerator, PythonGeneratorImpl};
