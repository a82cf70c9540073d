//! Declarative field paths such as `metadata.date`, `items[0].name` or
//! `metadata["file name"]`.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing or evaluating a field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldPathError {
    /// The expression is not a valid path.
    #[error("invalid field path {expression:?}: {message}")]
    Parse { expression: String, message: String },
    /// A segment was read from an absent or null parent.
    #[error("cannot read {segment} of missing value at {path}")]
    Unresolved { path: String, segment: String },
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key:?}"),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    expression: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a path expression.
    pub fn parse(expression: &str) -> Result<Self, FieldPathError> {
        let segments = Parser::new(expression).parse()?;
        Ok(Self {
            expression: expression.trim().to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Resolve the path against `value`.
    ///
    /// A missing final field is `Ok(None)`; reading through an absent or null
    /// intermediate value is an error. Reading a key of a scalar yields `None`.
    pub fn lookup<'a>(&self, value: &'a Value) -> Result<Option<&'a Value>, FieldPathError> {
        let mut current = Some(value);
        for (depth, segment) in self.segments.iter().enumerate() {
            let parent = match current {
                None | Some(Value::Null) => {
                    return Err(FieldPathError::Unresolved {
                        path: self.prefix(depth),
                        segment: segment.to_string(),
                    });
                }
                Some(parent) => parent,
            };
            current = match (parent, segment) {
                (Value::Object(map), Segment::Key(key)) => map.get(key.as_str()),
                (Value::Object(map), Segment::Index(index)) => map.get(index.to_string().as_str()),
                (Value::Array(items), Segment::Index(index)) => items.get(*index),
                (Value::Array(items), Segment::Key(key)) => {
                    key.parse::<usize>().ok().and_then(|index| items.get(index))
                }
                _ => None,
            };
        }
        Ok(current)
    }

    /// Resolve the path and return the value only when it is a non-empty string.
    pub fn lookup_str<'a>(&self, value: &'a Value) -> Result<Option<&'a str>, FieldPathError> {
        Ok(self
            .lookup(value)?
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty()))
    }

    fn prefix(&self, depth: usize) -> String {
        if depth == 0 {
            return "<root>".to_string();
        }
        self.segments[..depth]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(expression)
    }
}

struct Parser<'a> {
    expression: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        let expression = expression.trim();
        Self {
            expression,
            chars: expression.chars().peekable(),
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>, FieldPathError> {
        if self.expression.is_empty() {
            return Err(self.error("empty path"));
        }
        let mut segments = Vec::new();
        let mut expect_identifier = true;
        while let Some(&next) = self.chars.peek() {
            match next {
                '[' => {
                    self.chars.next();
                    segments.push(self.bracket()?);
                    expect_identifier = false;
                }
                '.' if !expect_identifier => {
                    self.chars.next();
                    expect_identifier = true;
                    if self.chars.peek().is_none() {
                        return Err(self.error("trailing '.'"));
                    }
                }
                _ if expect_identifier => {
                    segments.push(Segment::Key(self.identifier()?));
                    expect_identifier = false;
                }
                other => return Err(self.error(format!("unexpected {other:?}"))),
            }
        }
        Ok(segments)
    }

    fn identifier(&mut self) -> Result<String, FieldPathError> {
        let mut ident = String::new();
        while let Some(&next) = self.chars.peek() {
            if matches!(next, '.' | '[' | ']' | '"' | '\'') || next.is_whitespace() {
                break;
            }
            ident.push(next);
            self.chars.next();
        }
        if ident.is_empty() {
            return Err(self.error("expected a field name"));
        }
        Ok(ident)
    }

    fn bracket(&mut self) -> Result<Segment, FieldPathError> {
        let segment = match self.chars.peek() {
            Some(&quote) if quote == '"' || quote == '\'' => {
                self.chars.next();
                let mut key = String::new();
                loop {
                    match self.chars.next() {
                        Some('\\') => match self.chars.next() {
                            Some(escaped) => key.push(escaped),
                            None => return Err(self.error("unterminated escape")),
                        },
                        Some(ch) if ch == quote => break,
                        Some(ch) => key.push(ch),
                        None => return Err(self.error("unterminated string")),
                    }
                }
                Segment::Key(key)
            }
            _ => {
                let mut digits = String::new();
                while let Some(&next) = self.chars.peek() {
                    if !next.is_ascii_digit() {
                        break;
                    }
                    digits.push(next);
                    self.chars.next();
                }
                let index = digits
                    .parse()
                    .map_err(|_| self.error("expected an index or quoted key"))?;
                Segment::Index(index)
            }
        };
        match self.chars.next() {
            Some(']') => Ok(segment),
            _ => Err(self.error("expected ']'")),
        }
    }

    fn error(&self, message: impl Into<String>) -> FieldPathError {
        FieldPathError::Parse {
            expression: self.expression.to_string(),
            message: message.into(),
        }
    }
}
