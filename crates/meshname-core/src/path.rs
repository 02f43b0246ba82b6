//! Hierarchical naming paths.
//!
//! A `Path` is an immutable sequence of byte segments used both as a
//! logical name (`/svc/foo`) and as a bound identifier returned by the
//! interpreter (`/#/io.l5d.k8s/default/http/foo`).
//!
//! Text form: `/` followed by `/`-separated segments. The empty path is
//! `/`. Bytes outside `[A-Za-z0-9_:.#$%-]` are written as `\xHH`.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error;

/// Errors produced when reading a path from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must start with '/': {0:?}")]
    MissingLeadingSlash(String),

    #[error("path has an empty segment: {0:?}")]
    EmptySegment(String),

    #[error("invalid character {ch:?} in path {input:?}")]
    InvalidChar { ch: char, input: String },

    #[error("invalid escape sequence in path {0:?}")]
    InvalidEscape(String),
}

/// An immutable hierarchical path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Bytes>,
}

impl Path {
    /// The empty path, `/`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a path from raw segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a path from its text form.
    pub fn read(input: &str) -> Result<Self, PathError> {
        let rest = input
            .strip_prefix('/')
            .ok_or_else(|| PathError::MissingLeadingSlash(input.to_string()))?;

        if rest.is_empty() {
            return Ok(Self::empty());
        }

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(PathError::EmptySegment(input.to_string()));
            }
            segments.push(Bytes::from(decode_segment(raw, input)?));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Bytes] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn is_showable(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'.' | b'#' | b'$' | b'%' | b'-')
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn decode_segment(raw: &str, input: &str) -> Result<Vec<u8>, PathError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            let value = match bytes.get(i + 1..i + 4) {
                Some([b'x', hi, lo]) => hex_value(*hi).zip(hex_value(*lo)).map(|(h, l)| h << 4 | l),
                _ => None,
            };
            let Some(value) = value else {
                return Err(PathError::InvalidEscape(input.to_string()));
            };
            out.push(value);
            i += 4;
        } else if is_showable(b) {
            out.push(b);
            i += 1;
        } else {
            // Showable bytes are ASCII, so `i` always sits on a char boundary here.
            let ch = raw[i..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(PathError::InvalidChar {
                ch,
                input: input.to_string(),
            });
        }
    }

    Ok(out)
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            f.write_str("/")?;
            for &b in segment.iter() {
                if is_showable(b) {
                    write!(f, "{}", b as char)?;
                } else {
                    write!(f, "\\x{b:02x}")?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read(s)
    }
}

impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Path::read(&s).map_err(serde::de::Error::custom)
    }
}
