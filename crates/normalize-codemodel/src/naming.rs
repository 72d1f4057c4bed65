//! Identifier case conventions.
//!
//! All conversions share one word splitter: underscores separate words, a
//! lowercase letter or digit followed by an uppercase letter starts a new
//! word, and an uppercase run followed by a lowercase letter ends one letter
//! early (`XMLParser` → `XML`, `Parser`).
//!
//! Leading and trailing underscores are preserved by the snake-case forms so
//! private names and dunders (`_cache`, `__init__`) survive conversion.

/// Split an identifier into words, ignoring underscores.
pub fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let chars: Vec<char> = name.chars().collect();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Split off leading and trailing underscores: `("__", "init", "__")`.
fn affixes(name: &str) -> (&str, &str, &str) {
    let core_start = name.len() - name.trim_start_matches('_').len();
    let trimmed = &name[core_start..];
    let core_len = trimmed.trim_end_matches('_').len();
    (
        &name[..core_start],
        &trimmed[..core_len],
        &trimmed[core_len..],
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `GetValue` → `get_value`, `XMLHttpRequest` → `xml_http_request`.
pub fn to_snake_case(name: &str) -> String {
    let (prefix, core, suffix) = affixes(name);
    if core.is_empty() {
        return name.to_string();
    }
    let words: Vec<String> = split_words(core).iter().map(|w| w.to_lowercase()).collect();
    format!("{}{}{}", prefix, words.join("_"), suffix)
}

/// `maxRetries` → `MAX_RETRIES`.
pub fn to_screaming_snake_case(name: &str) -> String {
    let (prefix, core, suffix) = affixes(name);
    if core.is_empty() {
        return name.to_string();
    }
    let words: Vec<String> = split_words(core).iter().map(|w| w.to_uppercase()).collect();
    format!("{}{}{}", prefix, words.join("_"), suffix)
}

/// `get_value` → `GetValue`. Underscores are dropped.
pub fn to_pascal_case(name: &str) -> String {
    let words = split_words(name);
    if words.is_empty() {
        return name.to_string();
    }
    words.iter().map(|w| capitalize(w)).collect()
}

/// `get_value` → `getValue`. Underscores are dropped.
pub fn to_camel_case(name: &str) -> String {
    let words = split_words(name);
    let Some((first, rest)) = words.split_first() else {
        return name.to_string();
    };
    let mut out = first.to_lowercase();
    out.extend(rest.iter().map(|w| capitalize(w)));
    out
}

/// Whether every cased character is uppercase (`MAX_SIZE`, `PI`).
pub fn is_screaming_case(name: &str) -> bool {
    name.chars().any(char::is_alphabetic)
        && !name.chars().any(char::is_lowercase)
}

/// `__add__` and friends.
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

// ----------------------------------------------------------------------
// Python special names
// ----------------------------------------------------------------------

/// Python base classes that make a class an enum.
pub const ENUM_BASES: &[&str] = &["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];

/// Operator symbols and their dunder methods. Unary forms are chosen when
/// the operator has at most one operand.
const BINARY_OPERATORS: &[(&str, &str)] = &[
    ("+", "__add__"),
    ("-", "__sub__"),
    ("*", "__mul__"),
    ("/", "__truediv__"),
    ("//", "__floordiv__"),
    ("%", "__mod__"),
    ("**", "__pow__"),
    ("@", "__matmul__"),
    ("==", "__eq__"),
    ("!=", "__ne__"),
    ("<", "__lt__"),
    (">", "__gt__"),
    ("<=", "__le__"),
    (">=", "__ge__"),
    ("&", "__and__"),
    ("|", "__or__"),
    ("^", "__xor__"),
    ("<<", "__lshift__"),
    (">>", "__rshift__"),
];

const UNARY_OPERATORS: &[(&str, &str)] = &[("-", "__neg__"), ("+", "__pos__"), ("~", "__invert__")];

/// Dunder method for an operator symbol with the given operand count.
pub fn operator_dunder(symbol: &str, operands: usize) -> Option<&'static str> {
    let unary = UNARY_OPERATORS.iter().find(|(s, _)| *s == symbol);
    if operands <= 1
        && let Some((_, dunder)) = unary
    {
        return Some(*dunder);
    }
    BINARY_OPERATORS
        .iter()
        .chain(UNARY_OPERATORS)
        .find(|(s, _)| *s == symbol)
        .map(|(_, dunder)| *dunder)
}

/// Operator symbol for a dunder method name.
pub fn dunder_operator(name: &str) -> Option<&'static str> {
    BINARY_OPERATORS
        .iter()
        .chain(UNARY_OPERATORS)
        .find(|(_, d)| *d == name)
        .map(|(symbol, _)| *symbol)
}
