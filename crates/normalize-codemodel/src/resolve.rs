//! Type-reference resolution between language type systems.
//!
//! A [`TypeResolver`] maps source-domain type names to target-domain names
//! through a static table, recursing into generic arguments. Unmapped names
//! pass through unchanged.

use crate::ir::TypeRef;
use std::collections::HashMap;

/// How the target spells generics, arrays and nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// `list[int]`, nested `list[...]` for arrays, `Optional[T]`.
    Python,
    /// `List<int>`, `T[]` / `T[,]`, `T?`.
    CSharp,
}

/// Maps type references to a target language's spelling.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    style: Style,
    table: HashMap<&'static str, &'static str>,
}

const PYTHON_TABLE: &[(&str, &str)] = &[
    ("int", "int"),
    ("Int16", "int"),
    ("Int32", "int"),
    ("Int64", "int"),
    ("long", "int"),
    ("short", "int"),
    ("byte", "int"),
    ("sbyte", "int"),
    ("uint", "int"),
    ("ulong", "int"),
    ("ushort", "int"),
    ("double", "float"),
    ("Double", "float"),
    ("Single", "float"),
    ("decimal", "float"),
    ("Decimal", "float"),
    ("string", "str"),
    ("String", "str"),
    ("char", "str"),
    ("Char", "str"),
    ("Boolean", "bool"),
    ("void", "None"),
    ("Void", "None"),
    ("object", "Any"),
    ("Object", "Any"),
    ("dynamic", "Any"),
    ("List", "list"),
    ("IList", "list"),
    ("IEnumerable", "list"),
    ("ICollection", "list"),
    ("IReadOnlyList", "list"),
    ("Dictionary", "dict"),
    ("IDictionary", "dict"),
    ("IReadOnlyDictionary", "dict"),
    ("Dict", "dict"),
    ("HashSet", "set"),
    ("ISet", "set"),
    ("Set", "set"),
    ("FrozenSet", "frozenset"),
    ("Tuple", "tuple"),
    ("Type", "type"),
];

const CSHARP_TABLE: &[(&str, &str)] = &[
    ("str", "string"),
    ("float", "double"),
    ("complex", "System.Numerics.Complex"),
    ("bytes", "byte[]"),
    ("list", "List"),
    ("List", "List"),
    ("Sequence", "IList"),
    ("Iterable", "IEnumerable"),
    ("Iterator", "IEnumerator"),
    ("dict", "Dictionary"),
    ("Dict", "Dictionary"),
    ("Mapping", "IDictionary"),
    ("set", "HashSet"),
    ("Set", "HashSet"),
    ("frozenset", "HashSet"),
    ("tuple", "Tuple"),
    ("None", "void"),
    ("Any", "object"),
    ("type", "Type"),
];

/// Names that must be imported from `typing` when they appear in Python output.
const TYPING_NAMES: &[&str] = &[
    "Any",
    "Callable",
    "Iterable",
    "Iterator",
    "Mapping",
    "Sequence",
    "Union",
];

impl TypeResolver {
    pub fn python() -> Self {
        Self {
            style: Style::Python,
            table: PYTHON_TABLE.iter().copied().collect(),
        }
    }

    pub fn csharp() -> Self {
        Self {
            style: Style::CSharp,
            table: CSHARP_TABLE.iter().copied().collect(),
        }
    }

    /// Target name for a bare type name.
    pub fn map_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.table.get(name).copied().unwrap_or(name)
    }

    /// Render a type reference in the target's syntax.
    pub fn resolve(&self, ty: &TypeRef) -> String {
        if let Some(raw) = &ty.raw_code {
            return raw.clone();
        }
        let mut text = self.map_name(&ty.name).to_string();
        if ty.is_generic() {
            let args: Vec<String> = ty.generic_args.iter().map(|a| self.resolve(a)).collect();
            text = match self.style {
                Style::Python => format!("{}[{}]", text, args.join(", ")),
                Style::CSharp => format!("{}<{}>", text, args.join(", ")),
            };
        }
        match self.style {
            Style::Python => {
                for _ in 0..ty.array_rank {
                    text = format!("list[{}]", text);
                }
                if ty.nullable {
                    text = format!("Optional[{}]", text);
                }
            }
            Style::CSharp => {
                if ty.is_array() {
                    text = format!("{}[{}]", text, ",".repeat(ty.array_rank - 1));
                }
                if ty.nullable {
                    text.push('?');
                }
            }
        }
        text
    }

    /// `typing` names a rendered reference depends on, for Python output.
    pub fn typing_imports(&self, ty: &TypeRef, out: &mut Vec<&'static str>) {
        if self.style != Style::Python || ty.raw_code.is_some() {
            return;
        }
        if ty.nullable && !out.contains(&"Optional") {
            out.push("Optional");
        }
        let mapped = self.map_name(&ty.name);
        if let Some(name) = TYPING_NAMES.iter().find(|n| **n == mapped)
            && !out.contains(name)
        {
            out.push(name);
        }
        for arg in &ty.generic_args {
            self.typing_imports(arg, out);
        }
    }

    /// Default value for an uninitialized slot of this type.
    pub fn default_value(&self, ty: Option<&TypeRef>) -> &'static str {
        let (null, zero, float, falsy, empty) = match self.style {
            Style::Python => ("None", "0", "0.0", "False", "\"\""),
            Style::CSharp => ("null", "0", "0.0", "false", "\"\""),
        };
        let Some(ty) = ty else {
            return null;
        };
        if ty.nullable || ty.is_array() || ty.raw_code.is_some() {
            return null;
        }
        let python_name = TypeResolver::python().map_name(&ty.name).to_string();
        match python_name.as_str() {
            "int" => zero,
            "float" => float,
            "bool" => falsy,
            "str" => empty,
            _ => null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_primitives() {
        let r = TypeResolver::python();
        assert_eq!(r.resolve(&TypeRef::new("string")), "str");
        assert_eq!(r.resolve(&TypeRef::new("Int32")), "int");
        assert_eq!(r.resolve(&TypeRef::new("decimal")), "float");
        assert_eq!(r.resolve(&TypeRef::new("Customer")), "Customer");
    }

    #[test]
    fn test_python_generics_arrays_nullable() {
        let r = TypeResolver::python();
        let dict = TypeRef::generic(
            "Dictionary",
            vec![TypeRef::new("string"), TypeRef::generic("List", vec![TypeRef::new("int")])],
        );
        assert_eq!(r.resolve(&dict), "dict[str, list[int]]");
        assert_eq!(r.resolve(&TypeRef::new("int").array(2)), "list[list[int]]");
        assert_eq!(r.resolve(&TypeRef::new("string").nullable()), "Optional[str]");
    }

    #[test]
    fn test_csharp_rendering() {
        let r = TypeResolver::csharp();
        assert_eq!(r.resolve(&TypeRef::new("str")), "string");
        assert_eq!(r.resolve(&TypeRef::generic("list", vec![TypeRef::new("float")])), "List<double>");
        assert_eq!(r.resolve(&TypeRef::new("int").array(1)), "int[]");
        assert_eq!(r.resolve(&TypeRef::new("int").array(2)), "int[,]");
        assert_eq!(r.resolve(&TypeRef::new("int").nullable()), "int?");
    }

    #[test]
    fn test_raw_reference_is_verbatim() {
        let ty = TypeRef::raw("int | str");
        assert_eq!(TypeResolver::python().resolve(&ty), "int | str");
        assert_eq!(TypeResolver::csharp().resolve(&ty), "int | str");
    }

    #[test]
    fn test_typing_imports() {
        let r = TypeResolver::python();
        let mut names = Vec::new();
        r.typing_imports(
            &TypeRef::generic("List", vec![TypeRef::new("object")]).nullable(),
            &mut names,
        );
        assert_eq!(names, vec!["Optional", "Any"]);
    }

    #[test]
    fn test_default_values() {
        let py = TypeResolver::python();
        assert_eq!(py.default_value(Some(&TypeRef::new("int"))), "0");
        assert_eq!(py.default_value(Some(&TypeRef::new("double"))), "0.0");
        assert_eq!(py.default_value(Some(&TypeRef::new("bool"))), "False");
        assert_eq!(py.default_value(Some(&TypeRef::new("string"))), "\"\"");
        assert_eq!(py.default_value(Some(&TypeRef::new("Customer"))), "None");
        assert_eq!(py.default_value(Some(&TypeRef::new("int").nullable())), "None");
        assert_eq!(py.default_value(None), "None");
        assert_eq!(TypeResolver::csharp().default_value(Some(&TypeRef::new("bool"))), "false");
    }
}
