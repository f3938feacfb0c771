//! Dotted field paths with `\.` escaping.
//!
//! `name.first` addresses `record["name"]["first"]`, while `name\.first`
//! addresses the single key `"name.first"`. A backslash only escapes a dot;
//! any other backslash is literal, except at the very end of a path where it
//! would escape nothing.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Record, Value};

/// Split a path on unescaped dots. Segments keep their escapes; run them
/// through [`unescape_field`] to get the key.
pub fn split_field(path: &str) -> Result<Vec<String>> {
    if ends_with_unescaped_backslash(path) {
        return Err(Error::MalformedPath(path.to_string()));
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut prev_backslash = false;
    for ch in path.chars() {
        if ch == '.' && !prev_backslash {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
        prev_backslash = ch == '\\';
    }
    segments.push(current);
    Ok(segments)
}

/// Drop the escape marker in front of literal dots.
pub fn unescape_field(segment: &str) -> String {
    segment.replace("\\.", ".")
}

/// Inverse of [`unescape_field`].
pub fn escape_field(segment: &str) -> String {
    segment.replace('.', "\\.")
}

fn ends_with_unescaped_backslash(path: &str) -> bool {
    path.ends_with('\\')
}

/// A parsed path: unescaped keys from the outermost object inwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self> {
        let segments = split_field(path)?
            .iter()
            .map(|s| unescape_field(s))
            .collect();
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Top-level key this path starts at.
    pub fn root(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    /// Value at this path, or `None` when any segment is absent.
    pub fn get<'r>(&self, record: &'r Record) -> Option<&'r Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut obj = record;
        for key in parents {
            obj = obj.get(key)?.as_object()?;
        }
        obj.get(last)
    }

    /// Write `value` at this path, creating intermediate objects on the way.
    /// Fails if an existing intermediate value is not an object.
    pub fn set(&self, record: &mut Record, value: Value) -> Result<()> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Ok(());
        };
        let mut obj = record;
        for key in parents {
            let slot = obj
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Record::new()));
            obj = match slot {
                Value::Object(inner) => inner,
                _ => {
                    return Err(Error::NotAnObject {
                        path: self.to_string(),
                        segment: key.clone(),
                    })
                }
            };
        }
        obj.insert(last.clone(), value);
        Ok(())
    }

    /// Remove and return the value at this path. Missing prefixes are a
    /// no-op; nothing is created.
    pub fn remove(&self, record: &mut Record) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut obj = record;
        for key in parents {
            obj = obj.get_mut(key)?.as_object_mut()?;
        }
        obj.remove(last)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped: Vec<String> = self.segments.iter().map(|s| escape_field(s)).collect();
        f.write_str(&escaped.join("."))
    }
}

impl std::str::FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}
