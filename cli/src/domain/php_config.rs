//! PHP array-literal configuration documents.
//!
//! Magento keeps its runtime configuration in `app/etc/env.php`, a PHP file
//! that returns one nested array literal. This module parses that literal
//! into a [`PhpValue`] tree and remembers where every value came from.
//! Rendering copies the source text and splices in only the values that were
//! changed or added, so comments, quoting and number spelling survive on
//! every line nobody touched.
//!
//! Expressions that can only be evaluated by PHP itself (class constants,
//! function calls, other constants) are kept as opaque [`PhpValue::Expr`]
//! nodes holding their source text.

use std::fmt::Write as _;
use std::ops::Range;

use indexmap::IndexMap;
use thiserror::Error;

const SHORT_INDENT: usize = 4;

// ── Values ───────────────────────────────────────────────────────────────────

/// Key of a PHP array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhpKey {
    Int(i64),
    Str(String),
    /// Key given by an expression, such as `\PDO::MYSQL_ATTR_SSL_CA`.
    Expr(String),
}

impl PhpKey {
    /// Key for `s`, normalised the way PHP does: decimal integer strings
    /// become integer keys.
    #[must_use]
    pub fn from_str_key(s: &str) -> Self {
        match s.parse() {
            Ok(i) if is_canonical_int(s) => Self::Int(i),
            _ => Self::Str(s.to_string()),
        }
    }

    fn from_value(value: PhpValue) -> Result<Self, &'static str> {
        Ok(match value {
            PhpValue::Str(s) => Self::from_str_key(&s),
            PhpValue::Int(i) => Self::Int(i),
            PhpValue::Bool(b) => Self::Int(i64::from(b)),
            #[allow(clippy::cast_possible_truncation)]
            PhpValue::Float(f) => Self::Int(f.trunc() as i64),
            PhpValue::Null => Self::Str(String::new()),
            PhpValue::Expr(text) => Self::Expr(text),
            PhpValue::Array(_) => return Err("array used as array key"),
        })
    }
}

fn is_canonical_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => digits.len() == s.len(),
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
    }
}

/// A PHP value as it can appear in a configuration literal.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(PhpArray),
    /// Source text of an expression only PHP can evaluate.
    Expr(String),
}

impl PhpValue {
    /// PHP truthiness: `null`, `false`, `0`, `0.0`, `""`, `"0"` and empty
    /// arrays are falsy. Opaque expressions count as truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !(s.is_empty() || s == "0"),
            Self::Array(a) => !a.is_empty(),
            Self::Expr(_) => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&PhpArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut PhpArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<&str> for PhpValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for PhpValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u16> for PhpValue {
    fn from(i: u16) -> Self {
        Self::Int(i64::from(i))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: PhpValue,
    /// Byte range of the value in the parsed source; `None` for added keys.
    span: Option<Range<usize>>,
    dirty: bool,
}

/// Where new entries of a parsed array go.
#[derive(Debug, Clone, Copy)]
struct ArrayOrigin {
    /// Just past the last entry (and its comma, if any), or the opening
    /// bracket of an empty array.
    tail: usize,
    /// A `,` must precede an appended entry.
    needs_separator: bool,
}

/// Ordered PHP array.
#[derive(Debug, Clone, Default)]
pub struct PhpArray {
    entries: IndexMap<PhpKey, Entry>,
    next_index: i64,
    origin: Option<ArrayOrigin>,
}

impl PartialEq for PhpArray {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.iter().eq(other.iter())
    }
}

impl PhpArray {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PhpValue> {
        self.entries
            .get(&PhpKey::from_str_key(key))
            .map(|e| &e.value)
    }

    /// Insert or overwrite. Overwriting keeps the key's position; writing an
    /// equal value is not a change.
    pub fn insert(&mut self, key: PhpKey, value: PhpValue) {
        self.track_index(&key);
        match self.entries.get_mut(&key) {
            Some(entry) if entry.value == value => {}
            Some(entry) => {
                entry.value = value;
                entry.dirty = true;
            }
            None => {
                self.entries.insert(
                    key,
                    Entry {
                        value,
                        span: None,
                        dirty: true,
                    },
                );
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PhpKey, &PhpValue)> {
        self.entries.iter().map(|(k, e)| (k, &e.value))
    }

    /// Value at a nested key path.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&PhpValue> {
        let (last, parents) = path.split_last()?;
        self.array_at(parents)?.get(last)
    }

    /// Nested array at `path`; the empty path is `self`.
    #[must_use]
    pub fn array_at(&self, path: &[&str]) -> Option<&PhpArray> {
        path.iter()
            .try_fold(self, |arr, key| arr.get(key)?.as_array())
    }

    pub fn array_at_mut(&mut self, path: &[&str]) -> Option<&mut PhpArray> {
        path.iter().try_fold(self, |arr, key| {
            arr.entries
                .get_mut(&PhpKey::from_str_key(key))?
                .value
                .as_array_mut()
        })
    }

    fn track_index(&mut self, key: &PhpKey) {
        if let PhpKey::Int(i) = *key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
    }

    fn insert_parsed(&mut self, key: PhpKey, value: PhpValue, span: Range<usize>) {
        self.track_index(&key);
        self.entries.insert(
            key,
            Entry {
                value,
                span: Some(span),
                dirty: false,
            },
        );
    }

    fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(i, k)| i64::try_from(i).is_ok_and(|i| *k == PhpKey::Int(i)))
    }
}

// ── Document ─────────────────────────────────────────────────────────────────

/// How the array literal is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStyle {
    /// `var_export` output: `array (`, two-space indent, trailing commas.
    VarExport,
    /// Magento's deployment config formatter: `[`, four-space indent.
    Short,
}

/// A parsed `env.php`-style document.
#[derive(Debug, Clone)]
pub struct PhpConfigDocument {
    source: String,
    body: Range<usize>,
    root: PhpArray,
    style: ArrayStyle,
}

/// Where and why a document failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct PhpParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl PhpConfigDocument {
    /// Parse a document of the form `<?php return <array literal>;`.
    ///
    /// # Errors
    ///
    /// Returns [`PhpParseError`] if the text is not a single returned array
    /// literal.
    pub fn parse(src: &str) -> Result<Self, PhpParseError> {
        Parser::new(src).document()
    }

    #[must_use]
    pub fn root(&self) -> &PhpArray {
        &self.root
    }

    /// Set `key` inside the existing array at `parent`.
    ///
    /// Returns `false`, changing nothing, when `parent` does not exist.
    pub fn set_in_existing(&mut self, parent: &[&str], key: &str, value: PhpValue) -> bool {
        match self.root.array_at_mut(parent) {
            Some(arr) => {
                arr.insert(PhpKey::from_str_key(key), value);
                true
            }
            None => false,
        }
    }

    /// Render the document back to text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut edits = Vec::new();
        if self.root.origin.is_some() {
            collect_edits(&self.root, self.style, 1, &mut edits);
        } else {
            let mut text = String::new();
            write_array(&self.root, self.style, 1, &mut text);
            edits.push(Edit {
                at: self.body.clone(),
                text,
            });
        }
        edits.sort_by_key(|e| e.at.start);

        let mut out = String::with_capacity(self.source.len() + 256);
        let mut cursor = 0;
        for edit in edits {
            out.push_str(&self.source[cursor..edit.at.start]);
            out.push_str(&edit.text);
            cursor = edit.at.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Replacement of `at` in the source by `text`; empty ranges insert.
struct Edit {
    at: Range<usize>,
    text: String,
}

fn collect_edits(arr: &PhpArray, style: ArrayStyle, level: usize, edits: &mut Vec<Edit>) {
    let Some(origin) = arr.origin else {
        return;
    };
    let keyed = style == ArrayStyle::VarExport || !arr.is_list();
    let mut appended = String::new();
    let mut needs_separator = origin.needs_separator;

    for (key, entry) in &arr.entries {
        let Some(span) = &entry.span else {
            if needs_separator {
                appended.push(',');
            }
            appended.push('\n');
            write_entry(keyed.then_some(key), &entry.value, style, level, &mut appended);
            needs_separator = style == ArrayStyle::Short;
            if !needs_separator {
                appended.push(',');
            }
            continue;
        };
        match &entry.value {
            PhpValue::Array(inner) if !entry.dirty && inner.origin.is_some() => {
                collect_edits(inner, style, child_level(style, level), edits);
            }
            value if entry.dirty || matches!(value, PhpValue::Array(_)) => {
                let mut text = String::new();
                write_value(value, style, child_level(style, level), &mut text);
                edits.push(Edit {
                    at: span.clone(),
                    text,
                });
            }
            _ => {}
        }
    }

    if !appended.is_empty() {
        edits.push(Edit {
            at: origin.tail..origin.tail,
            text: appended,
        });
    }
}

fn child_level(style: ArrayStyle, level: usize) -> usize {
    match style {
        ArrayStyle::VarExport => level + 2,
        ArrayStyle::Short => level + 1,
    }
}

fn spaces(out: &mut String, n: usize) {
    out.extend(std::iter::repeat_n(' ', n));
}

/// One `key => value` line of an array at `level`, without separators.
fn write_entry(
    key: Option<&PhpKey>,
    value: &PhpValue,
    style: ArrayStyle,
    level: usize,
    out: &mut String,
) {
    let indent = match style {
        ArrayStyle::VarExport => level + 1,
        ArrayStyle::Short => SHORT_INDENT * level,
    };
    spaces(out, indent);
    if let Some(key) = key {
        export_key(key, out);
        out.push_str(" => ");
    }
    if style == ArrayStyle::VarExport && matches!(value, PhpValue::Array(_)) {
        out.push('\n');
        spaces(out, indent);
    }
    write_value(value, style, child_level(style, level), out);
}

fn write_value(value: &PhpValue, style: ArrayStyle, level: usize, out: &mut String) {
    match value {
        PhpValue::Array(arr) => write_array(arr, style, level, out),
        PhpValue::Null => out.push_str(match style {
            ArrayStyle::VarExport => "NULL",
            ArrayStyle::Short => "null",
        }),
        PhpValue::Bool(true) => out.push_str("true"),
        PhpValue::Bool(false) => out.push_str("false"),
        PhpValue::Int(i) => export_int(*i, out),
        PhpValue::Float(f) => out.push_str(&php_float_repr(*f)),
        PhpValue::Str(s) => export_string(s, out),
        PhpValue::Expr(text) => out.push_str(text),
    }
}

fn write_array(arr: &PhpArray, style: ArrayStyle, level: usize, out: &mut String) {
    match style {
        ArrayStyle::VarExport => {
            out.push_str("array (\n");
            for (key, value) in arr.iter() {
                write_entry(Some(key), value, style, level, out);
                out.push_str(",\n");
            }
            spaces(out, level.saturating_sub(1));
            out.push(')');
        }
        ArrayStyle::Short => {
            let list = arr.is_list();
            out.push_str("[\n");
            for (i, (key, value)) in arr.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                write_entry((!list).then_some(key), value, style, level, out);
            }
            out.push('\n');
            spaces(out, SHORT_INDENT * level.saturating_sub(1));
            out.push(']');
        }
    }
}

fn export_key(key: &PhpKey, out: &mut String) {
    match key {
        PhpKey::Int(i) => export_int(*i, out),
        PhpKey::Str(s) => export_string(s, out),
        PhpKey::Expr(text) => out.push_str(text),
    }
}

fn export_int(i: i64, out: &mut String) {
    if i == i64::MIN {
        // PHP cannot lex the literal, so var_export spells it as an expression.
        out.push_str("-9223372036854775807-1");
    } else {
        let _ = write!(out, "{i}");
    }
}

/// Single-quoted PHP string; NUL bytes are spliced in as `"\0"`.
fn export_string(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("' . \"\\0\" . '"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

/// Float text as PHP prints it with `serialize_precision = -1`.
fn php_float_repr(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let sci = format!("{f:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent > 16 {
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{mantissa}.0")
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}E{sign}{}", exponent.abs());
    }

    let fixed = format!("{f}");
    if fixed.contains('.') {
        fixed
    } else {
        format!("{fixed}.0")
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

type ParseResult<T> = Result<T, PhpParseError>;

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn document(mut self) -> ParseResult<PhpConfigDocument> {
        self.skip_whitespace();
        if !self.eat_ignore_case("<?php") {
            return Err(self.error("expected '<?php' opening tag"));
        }
        self.skip_trivia();
        if !self.eat_keyword("return") {
            return Err(self.error("expected 'return'"));
        }
        self.skip_trivia();
        let body_start = self.pos;

        let style = if self.peek() == Some('[') {
            ArrayStyle::Short
        } else {
            ArrayStyle::VarExport
        };
        let root = match self.expr()? {
            PhpValue::Array(arr) => arr,
            _ => return Err(self.error_at(body_start, "returned value is not an array")),
        };
        let body_end = self.pos;

        self.skip_trivia();
        if !self.eat(";") {
            return Err(self.error("expected ';' after returned array"));
        }
        self.skip_trivia();
        if !self.rest().is_empty() && !self.eat("?>") {
            return Err(self.error("unexpected content after returned array"));
        }

        Ok(PhpConfigDocument {
            source: self.src.to_string(),
            body: body_start..body_end,
            root,
            style,
        })
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    /// A term followed by any number of `.`, `+` or `-` operations. An
    /// operation involving an opaque term makes the whole expression opaque.
    fn expr(&mut self) -> ParseResult<PhpValue> {
        self.skip_trivia();
        let start = self.pos;
        let mut value = self.term()?;
        let mut opaque = matches!(value, PhpValue::Expr(_));
        loop {
            let save = self.pos;
            self.skip_trivia();
            let op = match self.peek() {
                Some('.') if !self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => '.',
                Some(c @ ('+' | '-')) => c,
                _ => {
                    self.pos = save;
                    break;
                }
            };
            let at = self.pos;
            self.bump();
            let rhs = self.term()?;
            if opaque || matches!(rhs, PhpValue::Expr(_)) {
                opaque = true;
                continue;
            }
            value = binary(op, value, rhs)
                .ok_or_else(|| self.error_at(at, &format!("unsupported operand for '{op}'")))?;
        }
        if opaque {
            return Ok(PhpValue::Expr(self.src[start..self.pos].to_string()));
        }
        Ok(value)
    }

    fn term(&mut self) -> ParseResult<PhpValue> {
        self.skip_trivia();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('\'') => self.single_quoted().map(PhpValue::Str),
            Some('"') => self.double_quoted().map(PhpValue::Str),
            Some('[') => {
                self.bump();
                self.array_body(']').map(PhpValue::Array)
            }
            Some(sign @ ('-' | '+')) => {
                let at = self.pos;
                self.bump();
                let value = self.term()?;
                let signed = if sign == '-' {
                    negate(value)
                } else {
                    matches!(value, PhpValue::Int(_) | PhpValue::Float(_) | PhpValue::Expr(_))
                        .then_some(value)
                };
                signed.ok_or_else(|| self.error_at(at, &format!("unsupported operand for '{sign}'")))
            }
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
            Some(c) if is_ident_start(c) || c == '\\' => self.name(),
            Some(c) => Err(self.error(&format!("unexpected character '{c}'"))),
        }
    }

    /// Keywords, `array(...)`, and opaque names: constants, `Class::CONST`
    /// and calls.
    fn name(&mut self) -> ParseResult<PhpValue> {
        let start = self.pos;
        let mut qualified = self.eat_char('\\');
        let ident = self.ident();
        if ident.is_empty() {
            return Err(self.error_at(start, "expected a name after '\\'"));
        }
        while self.peek() == Some('\\') && self.peek_nth(1).is_some_and(is_ident_start) {
            self.bump();
            self.ident();
            qualified = true;
        }

        if !qualified {
            match ident.to_ascii_lowercase().as_str() {
                "true" => return Ok(PhpValue::Bool(true)),
                "false" => return Ok(PhpValue::Bool(false)),
                "null" => return Ok(PhpValue::Null),
                "array" => {
                    self.skip_trivia();
                    if !self.eat("(") {
                        return Err(self.error("expected '(' after 'array'"));
                    }
                    return self.array_body(')').map(PhpValue::Array);
                }
                _ => {}
            }
        }

        let save = self.pos;
        self.skip_trivia();
        if self.eat("::") {
            self.skip_trivia();
            if self.ident().is_empty() {
                return Err(self.error("expected a name after '::'"));
            }
            let after = self.pos;
            self.skip_trivia();
            if self.peek() == Some('(') {
                self.balanced()?;
            } else {
                self.pos = after;
            }
        } else if self.peek() == Some('(') {
            self.balanced()?;
        } else {
            self.pos = save;
        }
        Ok(PhpValue::Expr(self.src[start..self.pos].to_string()))
    }

    /// Skip a parenthesised argument list, strings included.
    fn balanced(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unbalanced parentheses")),
                Some('(' | '[') => {
                    self.bump();
                    depth += 1;
                }
                Some(')' | ']') => {
                    self.bump();
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(quote @ ('\'' | '"')) => self.skip_string(quote)?,
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn skip_string(&mut self, quote: char) -> ParseResult<()> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn array_body(&mut self, close: char) -> ParseResult<PhpArray> {
        let mut arr = PhpArray::new();
        let mut tail = self.pos;
        let mut needs_separator = false;
        loop {
            self.skip_trivia();
            if self.eat_char(close) {
                break;
            }
            let key_at = self.pos;
            let first = self.expr()?;
            let mut span = key_at..self.pos;
            self.skip_trivia();
            if self.eat("=>") {
                let key = PhpKey::from_value(first).map_err(|m| self.error_at(key_at, m))?;
                self.skip_trivia();
                let value_at = self.pos;
                let value = self.expr()?;
                span = value_at..self.pos;
                arr.insert_parsed(key, value, span.clone());
            } else {
                arr.insert_parsed(PhpKey::Int(arr.next_index), first, span.clone());
            }
            tail = span.end;
            needs_separator = true;

            self.skip_trivia();
            if self.eat(",") {
                tail = self.pos;
                needs_separator = false;
                continue;
            }
            if self.eat_char(close) {
                break;
            }
            return Err(self.error(&format!("expected ',' or '{close}'")));
        }
        arr.origin = Some(ArrayOrigin {
            tail,
            needs_separator,
        });
        Ok(arr)
    }

    fn number(&mut self) -> ParseResult<PhpValue> {
        let start = self.pos;
        let rest = self.rest();
        let radix = match rest.get(..2) {
            Some("0x" | "0X") => 16,
            Some("0b" | "0B") => 2,
            _ => 10,
        };
        if radix != 10 {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_digit(radix) || c == '_') {
                self.bump();
            }
            let digits = self.src[digits_start..self.pos].replace('_', "");
            if digits.is_empty() {
                return Err(self.error_at(start, "malformed number"));
            }
            return Ok(match i64::from_str_radix(&digits, radix) {
                Ok(i) => PhpValue::Int(i),
                Err(_) => PhpValue::Float(radix_to_f64(&digits, radix)),
            });
        }

        let mut is_float = false;
        self.digits();
        if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
            is_float = true;
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.digits();
            } else {
                self.pos = save;
            }
        }

        let text = self.src[start..self.pos].replace('_', "");
        if is_float {
            return text
                .parse()
                .map(PhpValue::Float)
                .map_err(|_| self.error_at(start, "malformed number"));
        }
        if text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Ok(match i64::from_str_radix(&text[1..], 8) {
                Ok(i) => PhpValue::Int(i),
                Err(_) => PhpValue::Float(radix_to_f64(&text[1..], 8)),
            });
        }
        match text.parse::<i64>() {
            Ok(i) => Ok(PhpValue::Int(i)),
            Err(_) => text
                .parse()
                .map(PhpValue::Float)
                .map_err(|_| self.error_at(start, "malformed number")),
        }
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn single_quoted(&mut self) -> ParseResult<String> {
        let start = self.pos;
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('\'') => return Ok(s),
                Some('\\') => match self.peek() {
                    Some(c @ ('\\' | '\'')) => {
                        self.bump();
                        s.push(c);
                    }
                    _ => s.push('\\'),
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn double_quoted(&mut self) -> ParseResult<String> {
        let start = self.pos;
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('"') => return Ok(s),
                Some('$') if self.peek().is_some_and(|c| is_ident_start(c) || c == '{') => {
                    return Err(self.error("string interpolation is not supported"));
                }
                Some('\\') => self.escape(&mut s)?,
                Some(c) => s.push(c),
            }
        }
    }

    fn escape(&mut self, s: &mut String) -> ParseResult<()> {
        let Some(c) = self.peek() else {
            return Err(self.error("unterminated string"));
        };
        let simple = match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'v' => Some('\u{0b}'),
            'e' => Some('\u{1b}'),
            'f' => Some('\u{0c}'),
            '\\' | '$' | '"' => Some(c),
            _ => None,
        };
        if let Some(resolved) = simple {
            self.bump();
            s.push(resolved);
            return Ok(());
        }
        match c {
            '0'..='7' => {
                let code = self.radix_digits(8, 3);
                s.push(char::from((code & 0xff) as u8));
            }
            'x' if self.peek_nth(1).is_some_and(|d| d.is_ascii_hexdigit()) => {
                self.bump();
                let code = self.radix_digits(16, 2);
                s.push(char::from((code & 0xff) as u8));
            }
            'u' if self.peek_nth(1) == Some('{') => {
                self.pos += 2;
                let code = self.radix_digits(16, 6);
                if !self.eat("}") {
                    return Err(self.error("unterminated unicode escape"));
                }
                let ch = char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))?;
                s.push(ch);
            }
            _ => s.push('\\'),
        }
        Ok(())
    }

    fn radix_digits(&mut self, radix: u32, max: usize) -> u32 {
        let mut code = 0u32;
        for _ in 0..max {
            match self.peek().and_then(|c| c.to_digit(radix)) {
                Some(d) => {
                    code = code * radix + d;
                    self.bump();
                }
                None => break,
            }
        }
        code
    }

    // ── Lexing helpers ───────────────────────────────────────────────────────

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_ignore_case(&mut self, token: &str) -> bool {
        match self.rest().get(..token.len()) {
            Some(head) if head.eq_ignore_ascii_case(token) => {
                self.pos += token.len();
                true
            }
            _ => false,
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let save = self.pos;
        if self.eat_ignore_case(keyword) && !self.peek().is_some_and(is_ident_char) {
            return true;
        }
        self.pos = save;
        false
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("//") || (rest.starts_with('#') && !rest.starts_with("#[")) {
                while let Some(c) = self.peek() {
                    if c == '\n' || self.rest().starts_with("?>") {
                        break;
                    }
                    self.bump();
                }
            } else if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => self.pos = self.src.len(),
                }
            } else {
                return;
            }
        }
    }

    fn error(&self, message: &str) -> PhpParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: &str) -> PhpParseError {
        let before = &self.src[..pos.min(self.src.len())];
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        PhpParseError {
            line,
            column,
            message: message.to_string(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[allow(clippy::cast_precision_loss)]
fn negate(value: PhpValue) -> Option<PhpValue> {
    match value {
        PhpValue::Int(i) => Some(
            i.checked_neg()
                .map_or(PhpValue::Float(-(i as f64)), PhpValue::Int),
        ),
        PhpValue::Float(f) => Some(PhpValue::Float(-f)),
        PhpValue::Expr(text) => Some(PhpValue::Expr(format!("-{text}"))),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn binary(op: char, lhs: PhpValue, rhs: PhpValue) -> Option<PhpValue> {
    fn number(value: &PhpValue) -> Option<f64> {
        match *value {
            PhpValue::Int(i) => Some(i as f64),
            PhpValue::Float(f) => Some(f),
            _ => None,
        }
    }

    match (op, lhs, rhs) {
        ('.', lhs, rhs) => Some(PhpValue::Str(concat_operand(lhs)? + &concat_operand(rhs)?)),
        ('+', PhpValue::Int(a), PhpValue::Int(b)) => Some(
            a.checked_add(b)
                .map_or(PhpValue::Float(a as f64 + b as f64), PhpValue::Int),
        ),
        ('-', PhpValue::Int(a), PhpValue::Int(b)) => Some(
            a.checked_sub(b)
                .map_or(PhpValue::Float(a as f64 - b as f64), PhpValue::Int),
        ),
        (op, lhs, rhs) => {
            let (a, b) = (number(&lhs)?, number(&rhs)?);
            Some(PhpValue::Float(if op == '+' { a + b } else { a - b }))
        }
    }
}

fn concat_operand(value: PhpValue) -> Option<String> {
    match value {
        PhpValue::Str(s) => Some(s),
        PhpValue::Int(i) => Some(i.to_string()),
        PhpValue::Null | PhpValue::Bool(false) => Some(String::new()),
        PhpValue::Bool(true) => Some("1".to_string()),
        PhpValue::Float(_) | PhpValue::Array(_) | PhpValue::Expr(_) => None,
    }
}

fn radix_to_f64(digits: &str, radix: u32) -> f64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}
