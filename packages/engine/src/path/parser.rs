//! Path expression parsing
//!
//! Grammar: keys separated by `.`, each optionally followed by bracket
//! selectors. `[*]` is a wildcard, `[n]` a fixed index and `['key']` /
//! `["key"]` a key that contains dots or brackets.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One step of a [`PathExpression`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named object key
    Key(String),
    /// `[*]`: every array item, or every value of an object
    Wildcard,
    /// `[n]`: fixed array index
    Index(usize),
}

/// A parsed, reusable path expression such as `payload.items[*].itemLevel`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpression {
    source: String,
    segments: Vec<PathSegment>,
}

impl PathExpression {
    /// Parse a path expression.
    ///
    /// An empty string is the identity path and selects the value itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for empty keys, unbalanced brackets and
    /// bracket contents that are neither `*`, an index nor a quoted key.
    pub fn parse(source: &str) -> Result<Self> {
        let text = source.trim();
        let mut segments = Vec::new();
        let mut key = String::new();
        // A '.' is legal right after ']' without a preceding key
        let mut after_bracket = false;
        let mut chars = text.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && !after_bracket {
                        return Err(Error::invalid_path(
                            source,
                            format!("empty key before '.' at position {position}"),
                        ));
                    }
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    after_bracket = false;
                    if chars.peek().is_none() {
                        return Err(Error::invalid_path(source, "path ends with '.'"));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == ']' && !is_open_quote(&inner) {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(Error::invalid_path(
                            source,
                            format!("unclosed '[' at position {position}"),
                        ));
                    }
                    segments.push(parse_bracket(source, inner.trim())?);
                    after_bracket = true;
                }
                ']' => {
                    return Err(Error::invalid_path(
                        source,
                        format!("unexpected ']' at position {position}"),
                    ));
                }
                _ => {
                    if after_bracket && key.is_empty() {
                        return Err(Error::invalid_path(
                            source,
                            format!("expected '.' or '[' after ']' at position {position}"),
                        ));
                    }
                    key.push(c);
                }
            }
        }
        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        }

        Ok(Self {
            source: text.to_string(),
            segments,
        })
    }

    /// Build an expression directly from segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        let source = render(&segments);
        Self { source, segments }
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The expression text as written by the caller.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if any segment can fan out to several values.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.segments.contains(&PathSegment::Wildcard)
    }
}

/// Inside `[...]`, is a quote still open (so `]` is part of the key)?
fn is_open_quote(inner: &str) -> bool {
    let mut chars = inner.trim_start().chars();
    match chars.next() {
        Some(quote @ ('\'' | '"')) => !chars.as_str().ends_with(quote),
        _ => false,
    }
}

fn parse_bracket(source: &str, inner: &str) -> Result<PathSegment> {
    if inner == "*" {
        return Ok(PathSegment::Wildcard);
    }
    if let Ok(index) = inner.parse::<usize>() {
        return Ok(PathSegment::Index(index));
    }
    for quote in ['\'', '"'] {
        if let Some(name) = inner
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Ok(PathSegment::Key(name.to_string()));
        }
    }
    Err(Error::invalid_path(
        source,
        format!("unsupported bracket selector '[{inner}]'"),
    ))
}

fn render(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) if key.contains(['.', '[', ']']) => {
                out.push_str(&format!("['{key}']"));
            }
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Wildcard => out.push_str("[*]"),
            PathSegment::Index(index) => out.push_str(&format!("[{index}]")),
        }
    }
    out
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for PathExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
