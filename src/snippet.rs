//! Converts a [`Post`] into a snippet meant to be pasted by hand into the seed
//! collection, e.g.:
//!
//! ```text
//! {
//!
//!   id: 'hello-world-1714558830123',
//!   title: 'Hello World',
//!   excerpt: 'A "quoted" word',
//!   content: 'line one\nit\'s line two',
//!   imageUrl: 'https://picsum.photos/seed/hello-world-1714558830123/400/300',
//!   date: '2024-05-01T10:20:30.123Z'
//!
//! }
//! ```
//!
//! The snippet starts life as pretty-printed JSON. Keys then lose their quotes
//! and string values are re-quoted with single quotes. Finally the outer braces
//! are replaced by `{\n` and `\n}`, which leaves a blank line at either end.
//! The result is pasted into the seed collection, which [`parse_collection`]
//! reads back when the store is loaded.

use crate::post::Post;
use std::fmt;

/// Serializes `post` into a snippet. Keys appear in the canonical field order
/// of [`Post`].
pub fn serialize(post: &Post) -> Result<String> {
    let json = serde_json::to_string_pretty(post)?;
    let requoted = requote(&json);
    let inner = requoted
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| Error::Malformed("encoded post isn't an object".to_owned()))?;
    Ok(format!("{{\n{}\n}}", inner))
}

/// Parses a snippet produced by [`serialize`] by restoring standard JSON
/// quoting.
pub fn parse(snippet: &str) -> Result<Post> {
    let json = restore_quotes(snippet)?;
    Ok(serde_json::from_str(&json)?)
}

/// Parses a collection of snippets: `[`, snippets separated by commas, `]`.
/// This is the format of the seed file.
pub fn parse_collection(input: &str) -> Result<Vec<Post>> {
    let json = restore_quotes(input)?;
    Ok(serde_json::from_str(&json)?)
}

/// Unquotes object keys and re-quotes string values with `'`. Only real keys
/// (string tokens followed by `:`) are unquoted, so values that happen to
/// contain `"x":` are left intact.
fn requote(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut rest = json;
    while let Some(open) = rest.find('"') {
        out.push_str(&rest[..open]);
        let body = &rest[open + 1..];
        let len = match literal_len(body) {
            Some(len) => len,
            None => {
                // Unterminated literal; serde_json never produces one.
                out.push_str(&rest[open..]);
                return out;
            }
        };
        let literal = &body[..len];
        rest = &body[len + 1..];
        if rest.trim_start().starts_with(':') {
            out.push_str(literal);
        } else {
            out.push('\'');
            push_single_quoted(&mut out, literal);
            out.push('\'');
        }
    }
    out.push_str(rest);
    out
}

/// Returns the byte length of a JSON string literal's body, i.e. the offset
/// of its closing quote. JSON escapes are ASCII, so skipping one byte after a
/// backslash never lands inside a multi-byte character.
fn literal_len(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Copies an escaped JSON literal body into `out` so it's valid inside single
/// quotes: `\"` becomes `"` and `'` becomes `\'`. Other escapes pass through.
fn push_single_quoted(out: &mut String, literal: &str) {
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('"') => out.push('"'),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
}

/// The inverse of [`requote`]: bare identifiers become quoted keys and
/// single-quoted values become double-quoted ones. Since snippets get pasted
/// into a hand-edited collection, `//` line comments are dropped and trailing
/// commas before `]` or `}` are removed.
fn restore_quotes(snippet: &str) -> Result<String> {
    let mut out = String::with_capacity(snippet.len() + 16);
    let mut trailing_comma: Option<usize> = None;
    let mut chars = snippet.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            out.push(c);
            continue;
        }
        if c == '/' && chars.peek() == Some(&'/') {
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }
        match (c, trailing_comma.take()) {
            (']', Some(comma)) | ('}', Some(comma)) => {
                out.remove(comma);
            }
            _ => {}
        }
        match c {
            ',' => {
                trailing_comma = Some(out.len());
                out.push(c);
            }
            '\'' => {
                out.push('"');
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some('"') => out.push_str("\\\""),
                        Some('\\') => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => return Err(Error::Malformed("dangling escape".to_owned())),
                        },
                        Some(c) => out.push(c),
                        None => return Err(Error::Malformed("unterminated string".to_owned())),
                    }
                }
                out.push('"');
            }
            c if is_ident_start(c) => {
                out.push('"');
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if !is_ident_start(next) && !next.is_ascii_digit() {
                        break;
                    }
                    out.push(next);
                    chars.next();
                }
                out.push('"');
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

/// The result of a snippet operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to encode or decode a snippet.
#[derive(Debug)]
pub enum Error {
    /// Returned when the JSON encoder or decoder fails.
    Json(serde_json::Error),

    /// Returned when a snippet isn't shaped like one [`serialize`] produces.
    Malformed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Json(err) => err.fmt(f),
            Error::Malformed(msg) => write!(f, "malformed snippet: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Malformed(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`] so we can use `?`.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
