//! Indentation-aware Python parser.
//!
//! A hand-written recursive-descent reader over logical lines. It recovers
//! declarations (classes, functions, members) and control flow; anything it
//! does not recognize is kept as raw statement text, so parsing never fails
//! on unfamiliar syntax.

use crate::ir::*;
use crate::naming::{ENUM_BASES, dunder_operator, is_dunder, is_screaming_case};
use crate::traits::{ParseError, ParseOptions, Parser};
use std::collections::{HashMap, HashSet};

/// Static instance of the Python parser for registry.
pub static PYTHON_PARSER: PythonParser = PythonParser;

/// Python parser implementing the Parser trait.
pub struct PythonParser;

impl Parser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn parse(
        &self,
        source: &str,
        file_name: &str,
        options: &ParseOptions,
    ) -> Result<SourceFile, ParseError> {
        parse_python(source, file_name, options)
    }
}

/// Parse Python source into the code model.
pub fn parse_python(
    source: &str,
    file_name: &str,
    options: &ParseOptions,
) -> Result<SourceFile, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let mut ctx = ParseContext::new(source, options);
    tracing::debug!(
        file = file_name,
        bytes = source.len(),
        lines = ctx.lines.len(),
        "parsing python"
    );
    let mut file = SourceFile::new(file_name, Language::Python);
    ctx.parse_module(&mut file)?;
    absorb_typevars(&mut file);
    Ok(file)
}

// ----------------------------------------------------------------------
// Lexical helpers
// ----------------------------------------------------------------------

/// Walk `text`, calling `visit(index, byte, depth)` for every byte outside
/// string literals and comments. `depth` is the bracket depth before the
/// byte is applied. Returning `false` stops the walk.
fn scan(text: &str, mut visit: impl FnMut(usize, u8, usize) -> bool) {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => {
                let triple = bytes[i..].starts_with(&[b, b, b]);
                let quote_len = if triple { 3 } else { 1 };
                i += quote_len;
                while i < bytes.len() {
                    if bytes[i] == b'\\' {
                        i += 2;
                        continue;
                    }
                    if triple && bytes[i..].starts_with(&[b, b, b]) {
                        i += 3;
                        break;
                    }
                    if !triple && (bytes[i] == b || bytes[i] == b'\n') {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
                continue;
            }
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            _ => {}
        }
        if !visit(i, b, depth) {
            return;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
}

/// Split on a separator that is not nested in brackets or strings.
pub fn split_top_level(text: &str, sep: u8) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan(text, |i, b, depth| {
        if b == sep && depth == 0 {
            parts.push(text[start..i].trim().to_string());
            start = i + 1;
        }
        true
    });
    parts.push(text[start..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Byte index of the first top-level occurrence of `pat`.
fn find_top_level(text: &str, pat: &str) -> Option<usize> {
    let mut found = None;
    scan(text, |i, _, depth| {
        if depth == 0 && text.as_bytes()[i..].starts_with(pat.as_bytes()) {
            found = Some(i);
            return false;
        }
        true
    });
    found
}

/// Index of the bracket closing the one at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut found = None;
    scan(&text[open..], |i, b, depth| {
        if matches!(b, b')' | b']' | b'}') && depth == 1 {
            found = Some(open + i);
            return false;
        }
        true
    });
    found
}

/// Text following a statement keyword, if `text` starts with it.
fn keyword_rest<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.bytes().next() {
        None => Some(""),
        Some(b' ' | b'\t' | b'(' | b':' | b'[' | b'"' | b'\'') => Some(rest.trim()),
        Some(_) => None,
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Strip a trailing comment from the text after a header colon.
fn inline_body(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with('#') { "" } else { text }
}

/// Split `head: inline` at the first top-level colon.
fn split_header(text: &str) -> Option<(&str, &str)> {
    let colon = find_top_level(text, ":")?;
    Some((text[..colon].trim(), inline_body(&text[colon + 1..])))
}

fn comment_text(text: &str) -> String {
    let body = text.strip_prefix('#').unwrap_or(text);
    body.strip_prefix(' ').unwrap_or(body).to_string()
}

fn is_string_literal(text: &str) -> bool {
    let body = text.trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F']);
    let Some(quote) = body.bytes().next().filter(|b| matches!(b, b'"' | b'\'')) else {
        return false;
    };
    let triple = body.as_bytes().starts_with(&[quote, quote, quote]);
    let delim_len = if triple { 3 } else { 1 };
    if body.len() < delim_len * 2 {
        return false;
    }
    // The literal must run to the end of the statement.
    let mut end = None;
    scan(body, |i, _, _| {
        end = Some(i);
        false
    });
    end.is_none() && body.as_bytes().ends_with(&body.as_bytes()[..delim_len])
}

/// Private names start with one `_`; names starting with `__` keep it.
fn split_private(name: &str) -> (String, bool) {
    if is_dunder(name) {
        return (name.to_string(), false);
    }
    match name.strip_prefix('_') {
        Some(rest) if !rest.is_empty() && !rest.starts_with('_') => (rest.to_string(), true),
        Some(_) => (name.to_string(), true),
        None => (name.to_string(), false),
    }
}

/// Parse a type annotation into a type reference.
pub fn parse_type_ref(text: &str) -> TypeRef {
    let text = text.trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
        .unwrap_or(text);

    let union = split_top_level(text, b'|');
    if union.len() > 1 {
        return match union.as_slice() {
            [a, b] if b == "None" => parse_type_ref(a).nullable(),
            [a, b] if a == "None" => parse_type_ref(b).nullable(),
            _ => TypeRef::raw(text),
        };
    }

    let Some(open) = text.find('[') else {
        return TypeRef::new(text);
    };
    let Some(close) = matching_close(text, open).filter(|c| *c == text.len() - 1) else {
        return TypeRef::raw(text);
    };
    let name = text[..open].trim();
    let args = split_top_level(&text[open + 1..close], b',');
    let simple = name.rsplit('.').next().unwrap_or(name);
    match (simple, args.as_slice()) {
        ("Optional", [inner]) => parse_type_ref(inner).nullable(),
        ("Union", [a, b]) if b == "None" => parse_type_ref(a).nullable(),
        ("Union", _) => TypeRef::raw(text),
        _ => TypeRef::generic(name, args.iter().map(|a| parse_type_ref(a)).collect()),
    }
}

/// Parse one entry of a parameter list.
pub fn parse_parameter(text: &str) -> Option<Parameter> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (kind, rest) = if let Some(rest) = text.strip_prefix("**") {
        (ParamKind::KwArgs, rest)
    } else if let Some(rest) = text.strip_prefix('*').filter(|r| !r.trim().is_empty()) {
        (ParamKind::VarArgs, rest)
    } else {
        (ParamKind::Normal, text)
    };
    let (decl, default) = match find_top_level(rest, "=") {
        Some(i) => (&rest[..i], Some(rest[i + 1..].trim())),
        None => (rest, None),
    };
    let (name, ty) = match find_top_level(decl, ":") {
        Some(i) => (decl[..i].trim(), Some(parse_type_ref(&decl[i + 1..]))),
        None => (decl.trim(), None),
    };
    let mut param = Parameter::new(name).with_kind(kind);
    param.ty = ty;
    param.default_value = default.map(str::to_string);
    Some(param)
}

fn parse_parameters(text: &str) -> Vec<Parameter> {
    split_top_level(text, b',')
        .iter()
        .filter_map(|p| parse_parameter(p))
        .collect()
}

/// A top-level assignment split into its parts.
struct Assignment {
    target: String,
    operator: String,
    value: String,
    declared_type: Option<TypeRef>,
}

const AUGMENTED: &[&str] = &["//", "**", ">>", "<<", "+", "-", "*", "/", "%", "&", "|", "^", "@"];

const NON_TARGET_KEYWORDS: &[&str] = &[
    "lambda", "yield", "await", "not", "assert", "del", "global", "nonlocal", "import", "from",
    "print", "return", "raise", "if", "elif", "else", "for", "while", "try", "except", "finally",
    "with", "class", "def", "async",
];

fn is_target(text: &str) -> bool {
    let text = text.trim();
    let Some(first) = text.chars().next() else {
        return false;
    };
    if !(first.is_alphabetic() || matches!(first, '_' | '(' | '[' | '*')) {
        return false;
    }
    let first_word = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("");
    if NON_TARGET_KEYWORDS.contains(&first_word) {
        return false;
    }
    let mut ok = true;
    scan(text, |_, b, depth| {
        if depth == 0
            && !(b.is_ascii_alphanumeric()
                || matches!(b, b'_' | b'.' | b',' | b' ' | b'*' | b'(' | b'[' | b')' | b']')
                || !b.is_ascii())
        {
            ok = false;
            return false;
        }
        true
    });
    ok
}

fn parse_assignment(text: &str) -> Option<Assignment> {
    let bytes = text.as_bytes();
    let mut eq = None;
    scan(text, |i, b, depth| {
        if b != b'=' || depth != 0 {
            return true;
        }
        let next = bytes.get(i + 1).copied();
        let prev = if i > 0 { Some(bytes[i - 1]) } else { None };
        let shift = text[..i].ends_with("<<") || text[..i].ends_with(">>");
        if next == Some(b'=') || (matches!(prev, Some(b'=' | b'!' | b'<' | b'>' | b':')) && !shift) {
            return true;
        }
        eq = Some(i);
        false
    });

    let Some(eq) = eq else {
        // Annotation without a value: `name: T`.
        let colon = find_top_level(text, ":")?;
        let (target, ty) = (text[..colon].trim(), text[colon + 1..].trim());
        if ty.is_empty() || !is_target(target) || target.contains(' ') {
            return None;
        }
        return Some(Assignment {
            target: target.to_string(),
            operator: "=".into(),
            value: String::new(),
            declared_type: Some(parse_type_ref(ty)),
        });
    };

    let lhs = &text[..eq];
    let op = AUGMENTED.iter().find(|op| lhs.ends_with(*op));
    let (lhs, operator) = match op {
        Some(op) => (&lhs[..lhs.len() - op.len()], format!("{}=", op)),
        None => (lhs, "=".to_string()),
    };
    let value = text[eq + 1..].trim().to_string();

    let (target, declared_type) = match find_top_level(lhs, ":") {
        Some(colon) if operator == "=" && !lhs[..colon].trim().contains(' ') => (
            lhs[..colon].trim(),
            Some(parse_type_ref(&lhs[colon + 1..])),
        ),
        Some(_) => return None,
        None => (lhs.trim(), None),
    };
    if !is_target(target) {
        return None;
    }
    Some(Assignment {
        target: target.to_string(),
        operator,
        value,
        declared_type,
    })
}

/// Statements that fit on one line (inline bodies and simple lines).
fn simple_statement(text: &str) -> Option<Stmt> {
    let text = text.trim();
    if text == "pass" {
        return None;
    }
    if let Some(rest) = keyword_rest(text, "return") {
        return Some(Stmt::return_stmt((!rest.is_empty()).then_some(rest)));
    }
    if let Some(rest) = keyword_rest(text, "raise") {
        return Some(Stmt::throw((!rest.is_empty()).then_some(rest)));
    }
    if let Some(assign) = parse_assignment(text) {
        return Some(Stmt::new(StmtKind::Assignment {
            target: assign.target,
            operator: assign.operator,
            value: assign.value,
            declared_type: assign.declared_type,
        }));
    }
    Some(Stmt::raw(text))
}

fn inline_statements(text: &str) -> Vec<Stmt> {
    if find_top_level(text, ";").is_some() {
        return vec![Stmt::raw(text)];
    }
    simple_statement(text).into_iter().collect()
}

fn parse_decorator(text: &str) -> Annotation {
    let body = text.trim_start_matches('@').trim();
    match body.find('(') {
        Some(open) if body.ends_with(')') => Annotation::with_arguments(
            body[..open].trim(),
            split_top_level(&body[open + 1..body.len() - 1], b','),
        ),
        _ => Annotation::new(body),
    }
}

fn annotation_is(annotation: &Annotation, names: &[&str]) -> bool {
    let simple = annotation.name.rsplit('.').next().unwrap_or(&annotation.name);
    names.contains(&simple)
}

// ----------------------------------------------------------------------
// Logical lines
// ----------------------------------------------------------------------

/// One logical line: a physical line plus any continuation lines.
#[derive(Debug, Clone)]
struct LogicalLine {
    /// 1-based physical line number of the first line.
    number: usize,
    indent: usize,
    /// Content without leading indentation; continuation lines verbatim.
    text: String,
    /// The whole logical line, verbatim.
    raw: String,
}

impl LogicalLine {
    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Default)]
struct LineState {
    depth: usize,
    triple: Option<u8>,
}

/// Update the continuation state with one physical line; returns whether
/// the logical line continues onto the next.
fn continues(line: &str, state: &mut LineState) -> bool {
    let bytes = line.as_bytes();
    let mut i = 0;
    let mut last = None;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = state.triple {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if bytes[i..].starts_with(&[q, q, q]) {
                state.triple = None;
                i += 3;
                last = Some(q);
                continue;
            }
            i += 1;
            continue;
        }
        match b {
            b'#' => break,
            b'"' | b'\'' => {
                if bytes[i..].starts_with(&[b, b, b]) {
                    state.triple = Some(b);
                    i += 3;
                    continue;
                }
                i += 1;
                while i < bytes.len() && bytes[i] != b {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'(' | b'[' | b'{' => state.depth += 1,
            b')' | b']' | b'}' => state.depth = state.depth.saturating_sub(1),
            _ => {}
        }
        if !b.is_ascii_whitespace() {
            last = Some(b);
        }
        i += 1;
    }
    state.triple.is_some() || state.depth > 0 || last == Some(b'\\')
}

fn indent_width(line: &str, tab_width: usize) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Lines after the first lose up to `columns` of leading whitespace.
fn dedent_continuation(text: &str, columns: usize, tab_width: usize) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        out.push_str(strip_columns(line, columns, tab_width));
    }
    out
}

fn strip_columns(line: &str, columns: usize, tab_width: usize) -> &str {
    let mut width = 0;
    for (i, c) in line.char_indices() {
        if width >= columns {
            return &line[i..];
        }
        match c {
            ' ' => width += 1,
            '\t' => width += tab_width,
            _ => return &line[i..],
        }
    }
    ""
}

fn logical_lines(source: &str, tab_width: usize) -> Vec<LogicalLine> {
    let physical: Vec<&str> = source.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < physical.len() {
        let first = physical[i];
        let number = i + 1;
        let mut state = LineState::default();
        let mut more = continues(first, &mut state);
        let mut raw = first.trim_end().to_string();
        i += 1;
        while more && i < physical.len() {
            raw.push('\n');
            raw.push_str(physical[i].trim_end());
            more = continues(physical[i], &mut state);
            i += 1;
        }
        let raw = raw.trim_end().to_string();
        out.push(LogicalLine {
            number,
            indent: indent_width(first, tab_width),
            text: raw.trim_start().to_string(),
            raw,
        });
    }
    out
}

// ----------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------

/// What a `def` inside a class turned into.
enum DefResult {
    Member(Member),
    /// `@name.setter`: attach to the property `name`.
    Setter { name: String, setter: Accessor, ty: Option<TypeRef> },
    /// `__setitem__`: attach to the indexer.
    IndexSetter {
        parameters: Vec<Parameter>,
        ty: TypeRef,
        setter: Accessor,
    },
}

/// The type whose body is being parsed.
struct ClassContext<'a> {
    name: &'a str,
}

/// Per-call parser state: the logical lines and a cursor.
struct ParseContext {
    lines: Vec<LogicalLine>,
    pos: usize,
    tab_width: usize,
}

impl ParseContext {
    fn new(source: &str, options: &ParseOptions) -> Self {
        Self {
            lines: logical_lines(source, options.tab_width.max(1)),
            pos: 0,
            tab_width: options.tab_width.max(1),
        }
    }

    fn current(&self) -> Option<&LogicalLine> {
        self.lines.get(self.pos)
    }

    fn skip_blank(&mut self) {
        while self.current().is_some_and(LogicalLine::is_blank) {
            self.pos += 1;
        }
    }

    fn stalled(&self, start: usize) -> Result<(), ParseError> {
        if self.pos == start {
            let line = self.lines.get(start).map_or(0, |l| l.number);
            return Err(ParseError::Stalled { line });
        }
        Ok(())
    }

    /// Indent of the block following a header at `header_indent`, if any.
    fn block_indent_after(&self, header_indent: usize) -> Option<usize> {
        self.lines[self.pos..]
            .iter()
            .find(|l| !l.is_blank())
            .map(|l| l.indent)
            .filter(|indent| *indent > header_indent)
    }

    /// Consume a docstring at the start of a block.
    fn take_docstring(&mut self, block_indent: usize) -> Option<String> {
        self.skip_blank();
        let line = self.current()?;
        if line.indent != block_indent || !is_string_literal(&line.text) {
            return None;
        }
        let doc = docstring_text(&line.text, block_indent);
        self.pos += 1;
        Some(doc)
    }

    /// Consume a header and every deeper line as one raw statement.
    fn raw_block_statement(&mut self) -> Stmt {
        let indent = self.current().map_or(0, |l| l.indent);
        let text = self.raw_block();
        Stmt::raw(dedent_continuation(&text, indent, self.tab_width))
    }

    /// A header and every deeper line, continuation lines verbatim.
    fn raw_block(&mut self) -> String {
        let Some(header) = self.current().cloned() else {
            return String::new();
        };
        self.pos += 1;
        let mut end = self.pos;
        let mut cursor = self.pos;
        while let Some(line) = self.lines.get(cursor) {
            if !line.is_blank() && line.indent <= header.indent {
                break;
            }
            cursor += 1;
            if !line.is_blank() {
                end = cursor;
            }
        }
        let mut text = header.text.clone();
        for line in &self.lines[self.pos..end] {
            text.push('\n');
            text.push_str(&line.raw);
        }
        self.pos = end;
        text
    }

    /// Collect decorator lines at the cursor.
    fn take_decorators(&mut self) -> Vec<Annotation> {
        let mut decorators = Vec::new();
        while let Some(line) = self.current() {
            if line.is_blank() {
                self.pos += 1;
                continue;
            }
            if !line.text.starts_with('@') {
                break;
            }
            decorators.push(parse_decorator(&line.text));
            self.pos += 1;
        }
        decorators
    }

    // ------------------------------------------------------------------
    // Module
    // ------------------------------------------------------------------

    fn parse_module(&mut self, file: &mut SourceFile) -> Result<(), ParseError> {
        let mut seen_code = false;
        let mut last_comment: Option<usize> = None;

        loop {
            self.skip_blank();
            let Some(line) = self.current().cloned() else {
                break;
            };
            let start = self.pos;
            let text = line.text.as_str();

            if text.starts_with('#') {
                file.statements.push(Stmt::comment(comment_text(text)));
                last_comment = Some(start);
                self.pos += 1;
                continue;
            }
            if !seen_code && is_string_literal(text) {
                file.meta.doc = Some(docstring_text(text, line.indent));
                seen_code = true;
                self.pos += 1;
                continue;
            }
            seen_code = true;

            if let Some(imports) = parse_import(text) {
                tracing::trace!(line = line.number, "import");
                file.imports.extend(imports);
                self.pos += 1;
                continue;
            }

            if text.starts_with('@') || is_class_header(text) || is_def_header(text) {
                let mut comment_doc = match (last_comment, file.statements.last()) {
                    (Some(idx), Some(Stmt { kind: StmtKind::Comment(c), .. }))
                        if idx + 1 == start =>
                    {
                        Some(c.clone())
                    }
                    _ => None,
                };
                let had_comment = comment_doc.is_some();
                let decorators = self.take_decorators();
                let Some(header) = self.current().cloned() else {
                    break;
                };

                if is_class_header(&header.text) {
                    match self.parse_class(&header, decorators, &mut comment_doc)? {
                        Some(ty) => file.types.push(ty),
                        None => file.statements.push(self.degraded(&header)),
                    }
                } else if is_def_header(&header.text) {
                    match self.parse_def(&header, decorators, &mut comment_doc, None)? {
                        Some(DefResult::Member(member)) => file.functions.push(member),
                        Some(_) => {}
                        None => file.statements.push(self.degraded(&header)),
                    }
                } else {
                    // Decorators without a definition: keep them as text.
                    for decorator in decorators {
                        file.statements.push(Stmt::raw(decorator_line(&decorator)));
                    }
                    continue;
                }

                if had_comment
                    && comment_doc.is_none()
                    && let Some(pos) = file
                        .statements
                        .iter()
                        .rposition(|s| matches!(s.kind, StmtKind::Comment(_)))
                {
                    // The comment became documentation.
                    file.statements.remove(pos);
                }
                last_comment = None;
                self.stalled(start)?;
                continue;
            }

            if let Some(stmt) = self.parse_statement()? {
                file.statements.push(stmt);
            }
            self.stalled(start)?;
        }
        Ok(())
    }

    /// A malformed header and its block as a raw statement.
    fn degraded(&mut self, header: &LogicalLine) -> Stmt {
        let text = self.degraded_text(header);
        Stmt::raw(dedent_continuation(&text, header.indent, self.tab_width))
    }

    /// A malformed header and its block, continuation lines verbatim.
    fn degraded_text(&mut self, header: &LogicalLine) -> String {
        tracing::warn!(line = header.number, header = %header.text, "malformed header kept as raw code");
        self.raw_block()
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_class(
        &mut self,
        header: &LogicalLine,
        decorators: Vec<Annotation>,
        comment_doc: &mut Option<String>,
    ) -> Result<Option<TypeDecl>, ParseError> {
        let Some((name, bases, inline)) = parse_class_header(&header.text) else {
            return Ok(None);
        };
        self.pos += 1;
        tracing::trace!(line = header.number, class = %name, "class");

        let mut ty = TypeDecl::class(name);
        let mut is_struct = false;
        for decorator in decorators {
            if annotation_is(&decorator, &["dataclass"]) {
                is_struct = true;
            } else {
                ty.meta.annotations.push(decorator);
            }
        }

        for base in &bases {
            let simple_head = base.split('[').next().unwrap_or(base).trim();
            let simple_head = simple_head.rsplit('.').next().unwrap_or(simple_head);
            if base.contains('=') {
                ty.base_types.push(TypeRef::raw(base.as_str()));
            } else if simple_head == "Protocol" {
                ty.kind = TypeKind::Interface;
                ty.generic_params.extend(generic_names(base));
            } else if simple_head == "Generic" {
                ty.generic_params.extend(generic_names(base));
            } else if ENUM_BASES.contains(&simple_head) {
                ty.kind = TypeKind::Enum;
                if simple_head != "Enum" {
                    ty.base_types.push(parse_type_ref(base));
                }
            } else {
                ty.base_types.push(parse_type_ref(base));
            }
        }
        if is_struct {
            ty.kind = TypeKind::Struct;
        }

        if !inline.is_empty() {
            if inline != "pass" && inline != "..." {
                ty.members.push(raw_member(&inline));
            }
            ty.meta.doc = comment_doc.take();
            return Ok(Some(ty));
        }

        let Some(body_indent) = self.block_indent_after(header.indent) else {
            ty.meta.doc = comment_doc.take();
            return Ok(Some(ty));
        };
        ty.meta.doc = self.take_docstring(body_indent).or_else(|| comment_doc.take());
        self.parse_class_body(&mut ty, body_indent)?;
        Ok(Some(ty))
    }

    fn parse_class_body(&mut self, ty: &mut TypeDecl, body_indent: usize) -> Result<(), ParseError> {
        let mut pending_comment: Option<(usize, String)> = None;
        let class_name = ty.name().to_string();
        let kind = ty.kind.clone();

        loop {
            self.skip_blank();
            let Some(line) = self.current().cloned() else {
                break;
            };
            if line.indent < body_indent {
                break;
            }
            let start = self.pos;
            let text = line.text.as_str();

            if text.starts_with('#') {
                if let Some((_, earlier)) = pending_comment.replace((start, text.to_string())) {
                    ty.members.push(raw_member(&earlier));
                }
                self.pos += 1;
                continue;
            }
            // An adjacent comment may become the next declaration's doc;
            // otherwise it is kept as a raw member in place.
            let slot = ty.members.len();
            let adjacent = match pending_comment.take() {
                Some((idx, comment)) if idx + 1 == start => Some(comment),
                Some((_, comment)) => {
                    ty.members.push(raw_member(&comment));
                    None
                }
                None => None,
            };
            let mut comment_doc = adjacent.as_deref().map(comment_text);

            if text.starts_with('@') || is_class_header(text) || is_def_header(text) {
                let decorators = self.take_decorators();
                let Some(header) = self.current().cloned() else {
                    break;
                };
                if is_class_header(&header.text) {
                    match self.parse_class(&header, decorators, &mut comment_doc)? {
                        Some(nested) => ty.nested_types.push(nested),
                        None => {
                            let raw = self.degraded_text(&header);
                            ty.members.push(raw_member(&raw));
                        }
                    }
                } else if is_def_header(&header.text) {
                    let context = ClassContext { name: &class_name };
                    match self.parse_def(&header, decorators, &mut comment_doc, Some(&context))? {
                        Some(result) => attach_member(ty, result),
                        None => {
                            let raw = self.degraded_text(&header);
                            ty.members.push(raw_member(&raw));
                        }
                    }
                } else {
                    for decorator in decorators {
                        ty.members.push(raw_member(&decorator_line(&decorator)));
                    }
                }
                keep_unused_comment(ty, slot, adjacent, comment_doc);
                self.stalled(start)?;
                continue;
            }

            if text == "pass" || text == "..." {
                keep_unused_comment(ty, slot, adjacent, comment_doc);
                self.pos += 1;
                continue;
            }

            if let Some(assign) = parse_assignment(text).filter(|a| a.operator == "=") {
                tracing::trace!(line = line.number, field = %assign.target, "field");
                let mut member = class_field(&kind, assign);
                if member.meta.doc.is_none() {
                    member.meta.doc = comment_doc.take();
                }
                ty.members.push(member);
                keep_unused_comment(ty, slot, adjacent, comment_doc);
                self.pos += 1;
                continue;
            }

            keep_unused_comment(ty, slot, adjacent, comment_doc);
            let raw = self.raw_block();
            ty.members.push(raw_member(&raw));
            self.stalled(start)?;
        }
        if let Some((_, comment)) = pending_comment {
            ty.members.push(raw_member(&comment));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    fn parse_def(
        &mut self,
        header: &LogicalLine,
        decorators: Vec<Annotation>,
        comment_doc: &mut Option<String>,
        class: Option<&ClassContext<'_>>,
    ) -> Result<Option<DefResult>, ParseError> {
        let Some(def) = parse_def_header(&header.text) else {
            return Ok(None);
        };
        self.pos += 1;
        tracing::trace!(line = header.number, function = %def.name, "def");

        let (docstring, body) = if def.inline.is_empty() {
            match self.block_indent_after(header.indent) {
                Some(indent) => {
                    let doc = self.take_docstring(indent);
                    let stmts = self.parse_block(header.indent)?;
                    let body = match stmts.as_slice() {
                        [Stmt {
                            kind: StmtKind::Raw(text),
                            meta,
                        }] if text == "..." && meta.raw_code.is_none() => None,
                        _ => Some(stmts),
                    };
                    (doc, body)
                }
                None => (None, Some(Vec::new())),
            }
        } else if def.inline == "..." {
            (None, None)
        } else {
            (None, Some(inline_statements(&def.inline)))
        };
        let doc = docstring.or_else(|| comment_doc.take());

        let mut modifiers = Modifiers::empty();
        if def.is_async {
            modifiers |= Modifiers::ASYNC;
        }
        let mut annotations = Vec::new();
        let mut property = false;
        let mut setter_of = None;
        for decorator in decorators {
            if annotation_is(&decorator, &["staticmethod"]) {
                modifiers |= Modifiers::STATIC;
            } else if annotation_is(&decorator, &["abstractmethod"]) {
                modifiers |= Modifiers::ABSTRACT;
            } else if decorator.name == "property" {
                property = true;
            } else if let Some(target) = decorator.name.strip_suffix(".setter") {
                setter_of = Some(target.to_string());
            } else {
                annotations.push(decorator);
            }
        }

        let mut params = def.params;
        let Some(class) = class else {
            let mut member = Member::method(def.name, params, def.returns, body);
            member.meta.doc = doc;
            member.meta.modifiers |= modifiers;
            member.meta.annotations = annotations;
            return Ok(Some(DefResult::Member(member)));
        };

        let operator = dunder_operator(&def.name);
        if !modifiers.contains(Modifiers::STATIC) && operator.is_none() && !params.is_empty() {
            params.remove(0);
        }

        if let Some(target) = setter_of {
            let (name, _) = split_private(&target);
            let ty = params.last().and_then(|p| p.ty.clone());
            return Ok(Some(DefResult::Setter {
                name,
                setter: accessor(body),
                ty,
            }));
        }

        let (name, private) = split_private(&def.name);
        let mut member = if property {
            Member {
                meta: NodeMeta::named(name),
                kind: MemberKind::Property {
                    ty: def.returns,
                    getter: Some(accessor(body)),
                    setter: None,
                    initial_value: None,
                },
            }
        } else if def.name == "__init__" {
            Member {
                meta: NodeMeta::named(class.name),
                kind: MemberKind::Constructor {
                    parameters: params,
                    base_call: None,
                    body,
                },
            }
        } else if def.name == "__getitem__" {
            Member::indexer(
                def.returns.unwrap_or_else(|| TypeRef::new("Any")),
                params,
                Some(accessor(body)),
                None,
            )
        } else if def.name == "__setitem__" {
            let value = params.pop();
            return Ok(Some(DefResult::IndexSetter {
                parameters: params,
                ty: value
                    .and_then(|v| v.ty)
                    .unwrap_or_else(|| TypeRef::new("Any")),
                setter: accessor(body),
            }));
        } else if let Some(symbol) = operator {
            let mut member = Member::operator(symbol, params, def.returns, Vec::new());
            member.meta.modifiers.remove(Modifiers::STATIC);
            if let Some(slot) = member.body_mut() {
                *slot = body;
            }
            member
        } else {
            Member::method(name, params, def.returns, body)
        };

        if private {
            member.meta.access = Access::Private;
        }
        member.meta.doc = doc;
        member.meta.modifiers |= modifiers;
        member.meta.annotations = annotations;
        Ok(Some(DefResult::Member(member)))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Parse the indented block after a header at `header_indent`.
    fn parse_block(&mut self, header_indent: usize) -> Result<Vec<Stmt>, ParseError> {
        let Some(indent) = self.block_indent_after(header_indent) else {
            return Ok(Vec::new());
        };
        let mut stmts = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.current() else {
                break;
            };
            if line.indent < indent {
                break;
            }
            let start = self.pos;
            if let Some(stmt) = self.parse_statement()? {
                stmts.push(stmt);
            }
            self.stalled(start)?;
        }
        Ok(stmts)
    }

    /// Body of a compound statement: the inline text or the indented block.
    fn parse_suite(&mut self, header_indent: usize, inline: &str) -> Result<Vec<Stmt>, ParseError> {
        if inline.is_empty() {
            self.parse_block(header_indent)
        } else {
            Ok(inline_statements(inline))
        }
    }

    /// The next clause header at exactly `indent`, if it starts with `keyword`.
    fn clause(&mut self, indent: usize, keyword: &str) -> Option<LogicalLine> {
        let saved = self.pos;
        self.skip_blank();
        match self.current() {
            Some(line) if line.indent == indent && keyword_rest(&line.text, keyword).is_some() => {
                let line = line.clone();
                self.pos += 1;
                Some(line)
            }
            _ => {
                self.pos = saved;
                None
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        let Some(line) = self.current().cloned() else {
            return Ok(None);
        };
        let text = line.text.as_str();
        let indent = line.indent;

        if text.starts_with('#') {
            self.pos += 1;
            return Ok(Some(Stmt::comment(comment_text(text))));
        }
        if text == "pass" {
            self.pos += 1;
            return Ok(None);
        }
        if keyword_rest(text, "return").is_some() || keyword_rest(text, "raise").is_some() {
            self.pos += 1;
            return Ok(simple_statement(text));
        }

        if let Some(rest) = keyword_rest(text, "if")
            && let Some((condition, inline)) = split_header(rest)
        {
            tracing::trace!(line = line.number, "if");
            self.pos += 1;
            let then_branch = self.parse_suite(indent, inline)?;
            let mut else_ifs = Vec::new();
            let mut else_branch = None;
            loop {
                if let Some(clause) = self.clause(indent, "elif") {
                    let rest = keyword_rest(&clause.text, "elif").unwrap_or("");
                    let (condition, inline) = split_header(rest).unwrap_or((rest, ""));
                    let body = self.parse_suite(indent, inline)?;
                    else_ifs.push(ElseIf {
                        condition: condition.to_string(),
                        body,
                    });
                } else if let Some(clause) = self.clause(indent, "else") {
                    let (_, inline) = split_header(&clause.text).unwrap_or(("", ""));
                    else_branch = Some(self.parse_suite(indent, inline)?);
                    break;
                } else {
                    break;
                }
            }
            return Ok(Some(Stmt::new(StmtKind::If {
                condition: condition.to_string(),
                then_branch,
                else_ifs,
                else_branch,
            })));
        }

        if let Some(rest) = keyword_rest(text, "for")
            && let Some((head, inline)) = split_header(rest)
            && let Some(in_at) = find_top_level(head, " in ")
        {
            tracing::trace!(line = line.number, "for");
            self.pos += 1;
            let body = self.parse_suite(indent, inline)?;
            return Ok(Some(Stmt::for_each(
                head[..in_at].trim(),
                head[in_at + 4..].trim(),
                body,
            )));
        }

        if let Some(rest) = keyword_rest(text, "while")
            && let Some((condition, inline)) = split_header(rest)
        {
            tracing::trace!(line = line.number, "while");
            self.pos += 1;
            let body = self.parse_suite(indent, inline)?;
            return Ok(Some(Stmt::while_loop(condition, body)));
        }

        if let Some(rest) = keyword_rest(text, "try")
            && let Some(("", inline)) = split_header(rest)
        {
            tracing::trace!(line = line.number, "try");
            self.pos += 1;
            return self.parse_try(indent, inline).map(Some);
        }

        if let Some(rest) = keyword_rest(text, "with")
            && let Some((items, inline)) = split_header(rest)
        {
            tracing::trace!(line = line.number, "with");
            self.pos += 1;
            let body = self.parse_suite(indent, inline)?;
            let items = split_top_level(items, b',');
            let stmt = items
                .iter()
                .rev()
                .fold(body, |body, item| {
                    let (resource, variable) = match find_top_level(item, " as ") {
                        Some(at) => (item[..at].trim(), Some(item[at + 4..].trim())),
                        None => (item.as_str(), None),
                    };
                    vec![Stmt::using(resource, variable, body)]
                });
            return Ok(stmt.into_iter().next());
        }

        if let Some(rest) = keyword_rest(text, "match")
            && let Some((subject, "")) = split_header(rest)
            && self.next_starts_with_case(indent)
        {
            tracing::trace!(line = line.number, "match");
            self.pos += 1;
            return self.parse_match(indent, subject).map(Some);
        }

        if let Some(assign) = parse_assignment(text) {
            tracing::trace!(line = line.number, target = %assign.target, "assignment");
            self.pos += 1;
            return Ok(Some(Stmt::new(StmtKind::Assignment {
                target: assign.target,
                operator: assign.operator,
                value: assign.value,
                declared_type: assign.declared_type,
            })));
        }

        if text.ends_with(':') && self.block_indent_after_next(indent) {
            tracing::trace!(line = line.number, "raw block");
            return Ok(Some(self.raw_block_statement()));
        }

        tracing::trace!(line = line.number, "raw");
        self.pos += 1;
        Ok(Some(Stmt::raw(dedent_continuation(
            text,
            indent,
            self.tab_width,
        ))))
    }

    /// Whether the line after the cursor starts a deeper block.
    fn block_indent_after_next(&self, indent: usize) -> bool {
        self.lines[self.pos + 1..]
            .iter()
            .find(|l| !l.is_blank())
            .is_some_and(|l| l.indent > indent)
    }

    fn next_starts_with_case(&self, indent: usize) -> bool {
        self.lines[self.pos + 1..]
            .iter()
            .find(|l| !l.is_blank() && !l.text.starts_with('#'))
            .is_some_and(|l| l.indent > indent && keyword_rest(&l.text, "case").is_some())
    }

    fn parse_try(&mut self, indent: usize, inline: &str) -> Result<Stmt, ParseError> {
        let mut body = self.parse_suite(indent, inline)?;
        let mut catches = Vec::new();
        let mut finally = None;

        while let Some(clause) = self.clause(indent, "except") {
            let rest = keyword_rest(&clause.text, "except").unwrap_or("");
            let (head, inline) = split_header(rest).unwrap_or((rest, ""));
            let (exception_type, variable) = match find_top_level(head, " as ") {
                Some(at) => (head[..at].trim(), Some(head[at + 4..].trim().to_string())),
                None => (head, None),
            };
            let exception_type = match exception_type {
                "" => None,
                ty if ty.starts_with('(') => Some(TypeRef::raw(ty)),
                ty => Some(parse_type_ref(ty)),
            };
            let handler = self.parse_suite(indent, inline)?;
            catches.push(CatchClause::new(exception_type, variable, handler));
        }
        if let Some(clause) = self.clause(indent, "else") {
            let (_, inline) = split_header(&clause.text).unwrap_or(("", ""));
            body.push(Stmt::comment("else"));
            body.extend(self.parse_suite(indent, inline)?);
        }
        if let Some(clause) = self.clause(indent, "finally") {
            let (_, inline) = split_header(&clause.text).unwrap_or(("", ""));
            finally = Some(self.parse_suite(indent, inline)?);
        }
        Ok(Stmt::try_catch(body, catches, finally))
    }

    fn parse_match(&mut self, indent: usize, subject: &str) -> Result<Stmt, ParseError> {
        let Some(case_indent) = self.block_indent_after(indent) else {
            return Ok(Stmt::switch(subject, Vec::new(), None));
        };
        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut default = None;
        while let Some(clause) = self.clause(case_indent, "case") {
            let rest = keyword_rest(&clause.text, "case").unwrap_or("");
            let (pattern, inline) = split_header(rest).unwrap_or((rest, ""));
            let body = self.parse_suite(case_indent, inline)?;
            // Comments between cases have no home in the model.
            while self
                .current()
                .is_some_and(|l| l.is_blank() || (l.text.starts_with('#') && l.indent >= case_indent))
            {
                self.pos += 1;
            }
            let is_last = self.clause_peek(case_indent, "case").is_none();
            if pattern == "_" && is_last {
                default = Some(body);
            } else {
                cases.push(SwitchCase::new(split_top_level(pattern, b'|'), body));
            }
        }
        Ok(Stmt::switch(subject, cases, default))
    }

    fn clause_peek(&self, indent: usize, keyword: &str) -> Option<&LogicalLine> {
        self.lines[self.pos..]
            .iter()
            .find(|l| !l.is_blank())
            .filter(|l| l.indent == indent && keyword_rest(&l.text, keyword).is_some())
    }
}

fn decorator_line(annotation: &Annotation) -> String {
    if annotation.arguments.is_empty() {
        format!("@{}", annotation.name)
    } else {
        format!("@{}({})", annotation.name, annotation.arguments.join(", "))
    }
}

/// A class-level line with no model counterpart, kept verbatim.
fn raw_member(text: &str) -> Member {
    Member {
        meta: NodeMeta {
            raw_code: Some(text.to_string()),
            ..NodeMeta::default()
        },
        kind: MemberKind::Field {
            ty: None,
            initial_value: None,
        },
    }
}

/// Re-insert a comment no declaration took as its doc, where it stood.
fn keep_unused_comment(
    ty: &mut TypeDecl,
    slot: usize,
    comment: Option<String>,
    doc: Option<String>,
) {
    if let (Some(comment), Some(_)) = (comment, doc) {
        let slot = slot.min(ty.members.len());
        ty.members.insert(slot, raw_member(&comment));
    }
}

fn accessor(body: Option<Vec<Stmt>>) -> Accessor {
    Accessor { access: None, body }
}

/// Fold a parsed `def` into the type's members.
fn attach_member(ty: &mut TypeDecl, result: DefResult) {
    match result {
        DefResult::Member(member) => ty.members.push(member),
        DefResult::Setter {
            name,
            setter,
            ty: value_type,
        } => {
            let existing = ty.members.iter_mut().find(|m| {
                m.name() == name && matches!(m.kind, MemberKind::Property { .. })
            });
            match existing {
                Some(Member {
                    kind: MemberKind::Property { setter: slot, .. },
                    ..
                }) => *slot = Some(setter),
                _ => ty.members.push(Member {
                    meta: NodeMeta::named(name),
                    kind: MemberKind::Property {
                        ty: value_type,
                        getter: None,
                        setter: Some(setter),
                        initial_value: None,
                    },
                }),
            }
        }
        DefResult::IndexSetter {
            parameters,
            ty: element,
            setter,
        } => {
            let existing = ty
                .members
                .iter_mut()
                .find(|m| matches!(m.kind, MemberKind::Indexer { .. }));
            match existing {
                Some(Member {
                    kind: MemberKind::Indexer { setter: slot, .. },
                    ..
                }) => *slot = Some(setter),
                _ => ty
                    .members
                    .push(Member::indexer(element, parameters, None, Some(setter))),
            }
        }
    }
}

/// A class-level assignment as a field.
fn class_field(kind: &TypeKind, assign: Assignment) -> Member {
    let (name, private) = split_private(&assign.target);
    let annotated = assign.declared_type.is_some();
    let has_value = !assign.value.is_empty();
    let is_static = match kind {
        TypeKind::Struct | TypeKind::Interface => !annotated,
        TypeKind::Enum => true,
        _ => has_value,
    };

    let mut initial = has_value.then_some(assign.value);
    if *kind == TypeKind::Enum && initial.as_deref() == Some("auto()") {
        initial = None;
    }
    let mut member = Member {
        meta: NodeMeta::named(name.clone()),
        kind: MemberKind::Field {
            ty: assign.declared_type,
            initial_value: initial,
        },
    };
    if is_static {
        member.meta.modifiers |= Modifiers::STATIC;
    }
    if is_screaming_case(&name) {
        member.meta.modifiers |= Modifiers::STATIC | Modifiers::CONST;
    }
    if private {
        member.meta.access = Access::Private;
    }
    member
}

/// Names in `Generic[T, U]` / `Protocol[T]`.
fn generic_names(base: &str) -> Vec<GenericParam> {
    let Some(open) = base.find('[') else {
        return Vec::new();
    };
    let Some(close) = matching_close(base, open) else {
        return Vec::new();
    };
    split_top_level(&base[open + 1..close], b',')
        .into_iter()
        .map(GenericParam::new)
        .collect()
}

fn is_class_header(text: &str) -> bool {
    text.strip_prefix("class").is_some_and(|r| r.starts_with([' ', '\t']))
}

fn is_def_header(text: &str) -> bool {
    let text = text.strip_prefix("async").map_or(text, str::trim_start);
    text.strip_prefix("def").is_some_and(|r| r.starts_with([' ', '\t']))
}

/// `class Name(bases):` → name, bases, inline body.
fn parse_class_header(text: &str) -> Option<(String, Vec<String>, String)> {
    let rest = text.strip_prefix("class")?.trim_start();
    let name_end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    if !is_identifier(name) {
        return None;
    }
    let mut after = rest[name_end..].trim_start();
    let mut bases = Vec::new();
    if after.starts_with('(') {
        let close = matching_close(after, 0)?;
        bases = split_top_level(&after[1..close], b',');
        after = after[close + 1..].trim_start();
    }
    let inline = after.strip_prefix(':')?;
    Some((name.to_string(), bases, inline_body(inline).to_string()))
}

struct DefHeader {
    is_async: bool,
    name: String,
    params: Vec<Parameter>,
    returns: Option<TypeRef>,
    inline: String,
}

/// `async def name(params) -> T:` → its parts.
fn parse_def_header(text: &str) -> Option<DefHeader> {
    let (is_async, rest) = match text.strip_prefix("async") {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    let rest = rest.strip_prefix("def")?.trim_start();
    let open = rest.find('(')?;
    let name = rest[..open].trim();
    if !is_identifier(name) {
        return None;
    }
    let close = matching_close(rest, open)?;
    let after = rest[close + 1..].trim_start();
    let colon = find_top_level(after, ":")?;
    let annotation = after[..colon].trim();
    let returns = if annotation.is_empty() {
        None
    } else {
        Some(parse_type_ref(annotation.strip_prefix("->")?))
    };
    Some(DefHeader {
        is_async,
        name: name.to_string(),
        params: parse_parameters(&rest[open + 1..close]),
        returns,
        inline: inline_body(&after[colon + 1..]).to_string(),
    })
}

/// `import a, b as c` / `from m import x, y`.
fn parse_import(text: &str) -> Option<Vec<Import>> {
    if let Some(rest) = keyword_rest(text, "import") {
        let imports = split_top_level(rest, b',')
            .iter()
            .map(|item| match find_top_level(item, " as ") {
                Some(at) => Import::module(item[..at].trim()).with_alias(item[at + 4..].trim()),
                None => Import::module(item.as_str()),
            })
            .collect();
        return Some(imports);
    }
    let rest = keyword_rest(text, "from")?;
    let at = rest.find(" import ")?;
    let module = rest[..at].trim();
    let names = rest[at + 8..].trim();
    let names = names
        .strip_prefix('(')
        .and_then(|n| n.strip_suffix(')'))
        .unwrap_or(names);
    let names: Vec<String> = split_top_level(names, b',')
        .into_iter()
        .map(|n| n.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    if let [single] = names.as_slice()
        && let Some((name, alias)) = single.split_once(" as ")
    {
        return Some(vec![
            Import::from(module, vec![name.trim().to_string()]).with_alias(alias.trim()),
        ]);
    }
    Some(vec![Import::from(module, names)])
}

/// The documentation text of a string-literal line.
fn docstring_text(text: &str, indent: usize) -> String {
    let body = text.trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F']);
    let delim = if body.starts_with("\"\"\"") || body.starts_with("'''") {
        3
    } else {
        1
    };
    let inner = &body[delim..body.len().saturating_sub(delim).max(delim)];
    let mut lines = inner.lines();
    let mut out = vec![lines.next().unwrap_or("").trim().to_string()];
    for line in lines {
        let strip = line
            .char_indices()
            .take_while(|(i, c)| *i < indent && (*c == ' ' || *c == '\t'))
            .count();
        out.push(line[strip..].trim_end().to_string());
    }
    out.join("\n").trim().to_string()
}

/// Fold `T = TypeVar(...)` lines into the generic parameters that use them.
fn absorb_typevars(file: &mut SourceFile) {
    let mut bounds: HashMap<String, Vec<TypeRef>> = HashMap::new();
    for stmt in &file.statements {
        if let StmtKind::Assignment { target, value, .. } = &stmt.kind
            && let Some(args) = value
                .trim()
                .strip_prefix("TypeVar(")
                .and_then(|v| v.strip_suffix(')'))
        {
            let constraints = split_top_level(args, b',')
                .iter()
                .skip(1)
                .map(|arg| parse_type_ref(arg.strip_prefix("bound=").unwrap_or(arg)))
                .collect();
            bounds.insert(target.clone(), constraints);
        }
    }
    if bounds.is_empty() {
        return;
    }

    let mut used = HashSet::new();
    for ty in file.all_types() {
        ty.walk(&mut |t| {
            used.extend(t.generic_params.iter().map(|p| p.name.clone()));
        });
    }
    file.statements.retain(|stmt| match &stmt.kind {
        StmtKind::Assignment { target, .. } => !(used.contains(target) && bounds.contains_key(target)),
        _ => true,
    });

    fn apply(ty: &mut TypeDecl, bounds: &HashMap<String, Vec<TypeRef>>) {
        for param in &mut ty.generic_params {
            if let Some(constraints) = bounds.get(&param.name) {
                param.constraints = constraints.clone();
            }
        }
        for nested in &mut ty.nested_types {
            apply(nested, bounds);
        }
    }
    for ty in &mut file.types {
        apply(ty, &bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        parse_python(source, "test", &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_split_top_level_respects_brackets() {
        assert_eq!(
            split_top_level("a: Dict[str, int], b: List[int] = []", b','),
            vec!["a: Dict[str, int]", "b: List[int] = []"]
        );
        assert_eq!(split_top_level("f(a, b), 'x, y', {1: 2}", b','), vec![
            "f(a, b)",
            "'x, y'",
            "{1: 2}"
        ]);
    }

    #[test]
    fn test_parameters() {
        let params = parse_parameters("a: Dict[str, int], b: List[int] = [], *args, **kw");
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "a");
        assert_eq!(params[0].ty.as_ref().unwrap().generic_args.len(), 2);
        assert_eq!(params[1].default_value.as_deref(), Some("[]"));
        assert_eq!(params[2].kind, ParamKind::VarArgs);
        assert_eq!(params[3].kind, ParamKind::KwArgs);
    }

    #[test]
    fn test_type_refs() {
        assert!(parse_type_ref("Optional[str]").nullable);
        assert!(parse_type_ref("str | None").nullable);
        assert_eq!(parse_type_ref("int | str").raw_code.as_deref(), Some("int | str"));
        let ty = parse_type_ref("dict[str, list[int]]");
        assert_eq!(ty.name, "dict");
        assert_eq!(ty.generic_depth(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            parse_python("  \n\t\n", "x", &ParseOptions::default()).unwrap_err(),
            ParseError::EmptyInput
        );
    }

    #[test]
    fn test_logical_lines_join_brackets() {
        let lines = logical_lines("x = f(\n    1,\n    2)\ny = 3\n", 4);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "x = f(\n    1,\n    2)");
        assert_eq!(lines[1].number, 4);
    }

    #[test]
    fn test_tabs_use_tab_width() {
        let file = parse_python(
            "if x:\n\ty = 1\n\tz = 2\n",
            "t",
            &ParseOptions { tab_width: 8 },
        )
        .unwrap();
        let StmtKind::If { then_branch, .. } = &file.statements[0].kind else {
            panic!("expected if");
        };
        assert_eq!(then_branch.len(), 2);
    }

    #[test]
    fn test_if_elif_else() {
        let file = parse("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    pass\n");
        let StmtKind::If {
            else_ifs,
            else_branch,
            ..
        } = &file.statements[0].kind
        else {
            panic!("expected if");
        };
        assert_eq!(else_ifs.len(), 1);
        assert_eq!(else_branch.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_try_clauses() {
        let file = parse(
            "try:\n    run()\nexcept ValueError as e:\n    log(e)\nexcept:\n    pass\nelse:\n    ok()\nfinally:\n    close()\n",
        );
        let StmtKind::Try {
            body,
            catches,
            finally,
        } = &file.statements[0].kind
        else {
            panic!("expected try");
        };
        assert_eq!(catches.len(), 2);
        assert_eq!(catches[0].variable.as_deref(), Some("e"));
        assert!(catches[1].exception_type.is_none());
        assert_eq!(body.len(), 3);
        assert!(finally.is_some());
    }

    #[test]
    fn test_match_cases() {
        let file = parse("match cmd:\n    case \"a\" | \"b\":\n        go()\n    case _:\n        stop()\n");
        let StmtKind::Switch { cases, default, .. } = &file.statements[0].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases[0].labels, vec!["\"a\"", "\"b\""]);
        assert!(default.is_some());
    }

    #[test]
    fn test_match_as_identifier_is_assignment() {
        let file = parse("match = pattern.match(text)\n");
        assert!(matches!(file.statements[0].kind, StmtKind::Assignment { .. }));
    }

    #[test]
    fn test_augmented_and_annotated_assignment() {
        let file = parse("count += 1\nname: str = \"x\"\nflags <<= 2\nok = a == b\n");
        let ops: Vec<&str> = file
            .statements
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Assignment { operator, .. } => operator.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(ops, vec!["+=", "=", "<<=", "="]);
    }

    #[test]
    fn test_class_kinds() {
        let file = parse(
            "@dataclass\nclass P:\n    x: int\n\n\nclass S(Protocol):\n    def area(self) -> float: ...\n\n\nclass C(IntEnum):\n    RED = 1\n",
        );
        assert_eq!(file.types[0].kind, TypeKind::Struct);
        assert_eq!(file.types[1].kind, TypeKind::Interface);
        assert!(!file.types[1].members[0].has_body());
        assert_eq!(file.types[2].kind, TypeKind::Enum);
        assert_eq!(file.types[2].base_types[0].name, "IntEnum");
        assert!(file.types[2].members[0].has_modifier(Modifiers::CONST));
    }

    #[test]
    fn test_special_members() {
        let file = parse(concat!(
            "class V:\n",
            "    def __init__(self, x):\n        self.x = x\n\n",
            "    @property\n    def size(self) -> int:\n        return self._size\n\n",
            "    @size.setter\n    def size(self, value: int) -> None:\n        self._size = value\n\n",
            "    def __getitem__(self, i: int) -> float:\n        return self.items[i]\n\n",
            "    def __add__(self, other):\n        return V(self.x + other.x)\n\n",
            "    def _helper(self):\n        pass\n",
        ));
        let kinds: Vec<NodeKind> = file.types[0].members.iter().map(|m| m.node_kind()).collect();
        assert_eq!(kinds, vec![
            NodeKind::Constructor,
            NodeKind::Property,
            NodeKind::Indexer,
            NodeKind::Operator,
            NodeKind::Method
        ]);
        let property = &file.types[0].members[1];
        assert!(matches!(
            &property.kind,
            MemberKind::Property { setter: Some(_), .. }
        ));
        assert_eq!(file.types[0].members[3].parameters()[0].name, "self");
        let helper = &file.types[0].members[4];
        assert_eq!(helper.name(), "helper");
        assert_eq!(helper.meta.access, Access::Private);
    }

    #[test]
    fn test_malformed_header_degrades_to_raw() {
        let file = parse("class :\n    x = 1\ny = 2\n");
        assert!(file.types.is_empty());
        assert_eq!(
            file.statements[0].kind,
            StmtKind::Raw("class :\n    x = 1".into())
        );
        assert!(matches!(file.statements[1].kind, StmtKind::Assignment { .. }));
    }

    #[test]
    fn test_non_ascii_identifiers() {
        let file = parse(concat!(
            "café = 1\n",
            "if naïve:\n",
            "    x = 1\n",
            "\n",
            "\n",
            "def grüß(größe: int, ñ=\"ü\"):\n",
            "    return größe\n",
        ));
        assert!(matches!(
            &file.statements[0].kind,
            StmtKind::Assignment { target, value, .. } if target == "café" && value == "1"
        ));
        let StmtKind::If { condition, .. } = &file.statements[1].kind else {
            panic!("expected if");
        };
        assert_eq!(condition, "naïve");
        let params = file.functions[0].parameters();
        assert_eq!(params[0].name, "größe");
        assert_eq!(params[1].name, "ñ");
        assert_eq!(params[1].default_value.as_deref(), Some("\"ü\""));
    }

    #[test]
    fn test_raw_block_is_stored_relative_to_its_header() {
        let file = parse(concat!(
            "def f(items):\n",
            "    for i in items:\n",
            "        use(i)\n",
            "    else:\n",
            "        done()\n",
            "        again()\n",
        ));
        let body = file.functions[0].body().expect("body");
        assert!(matches!(body[0].kind, StmtKind::ForEach { .. }));
        assert_eq!(
            body[1].kind,
            StmtKind::Raw("else:\n    done()\n    again()".into())
        );
    }

    #[test]
    fn test_typevars_absorbed() {
        let file = parse("T = TypeVar(\"T\", bound=Base)\n\n\nclass Box(Generic[T]):\n    pass\n");
        assert!(file.statements.is_empty());
        let param = &file.types[0].generic_params[0];
        assert_eq!(param.name, "T");
        assert_eq!(param.constraints[0].name, "Base");
    }

    #[test]
    fn test_imports() {
        let file = parse("import os, sys as system\nfrom typing import (\n    Any,\n    Optional,\n)\n");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[1].alias.as_deref(), Some("system"));
        assert_eq!(file.imports[2].names, vec!["Any", "Optional"]);
    }
}
