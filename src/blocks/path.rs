//! Dotted field paths into a block's JSON (`content.button.text`,
//! `items.2.title`) and the single "set value at path" primitive every edit
//! goes through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,
    #[error("field path '{0}' has an empty segment")]
    EmptySegment(String),
    #[error("'{0}' cannot be changed")]
    Immutable(String),
    #[error("'{segment}' in '{path}' is not a list index")]
    NotAnIndex { path: String, segment: String },
    #[error("index {index} in '{path}' is out of range ({len} records)")]
    OutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Root keys an edit may never touch.
const IMMUTABLE_ROOTS: [&str; 2] = ["id", "type"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Path of the record at `index` inside this list path.
    pub fn child(&self, segment: impl Into<String>) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        FieldPath { segments }
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = raw.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment(raw.to_string()));
        }
        Ok(FieldPath { segments })
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Read the value at `path`, if every segment resolves.
pub fn get_path<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments().iter().try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Set `value` at `path` inside `root`.
///
/// Missing intermediate objects are created, and scalars in the way are
/// replaced by objects. Numeric segments only index existing arrays; they
/// never create a record.
pub fn set_path(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), PathError> {
    if IMMUTABLE_ROOTS.contains(&path.root()) {
        return Err(PathError::Immutable(path.root().to_string()));
    }
    let (leaf, parents) = path
        .segments()
        .split_last()
        .ok_or(PathError::Empty)?;

    let mut current = root;
    for segment in parents {
        current = child_mut(current, segment, path)?;
    }
    match current {
        Value::Array(items) => {
            let index = parse_index(leaf, path)?;
            let len = items.len();
            let slot = items.get_mut(index).ok_or_else(|| PathError::OutOfRange {
                path: path.to_string(),
                index,
                len,
            })?;
            *slot = value;
        }
        other => {
            missing_record(other, leaf, path)?;
            ensure_object(other).insert(leaf.clone(), value);
        }
    }
    Ok(())
}

fn child_mut<'a>(
    current: &'a mut Value,
    segment: &str,
    path: &FieldPath,
) -> Result<&'a mut Value, PathError> {
    match current {
        Value::Array(items) => {
            let index = parse_index(segment, path)?;
            let len = items.len();
            items.get_mut(index).ok_or_else(|| PathError::OutOfRange {
                path: path.to_string(),
                index,
                len,
            })
        }
        other => {
            missing_record(other, segment, path)?;
            Ok(ensure_object(other)
                .entry(segment.to_string())
                .or_insert(Value::Null))
        }
    }
}

/// A numeric segment with no array behind it names a record that does not
/// exist. Existing numeric object keys are still addressable.
fn missing_record(current: &Value, segment: &str, path: &FieldPath) -> Result<(), PathError> {
    let Ok(index) = segment.parse::<usize>() else {
        return Ok(());
    };
    if current.as_object().is_some_and(|map| map.contains_key(segment)) {
        return Ok(());
    }
    Err(PathError::OutOfRange {
        path: path.to_string(),
        index,
        len: 0,
    })
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn parse_index(segment: &str, path: &FieldPath) -> Result<usize, PathError> {
    segment.parse().map_err(|_| PathError::NotAnIndex {
        path: path.to_string(),
        segment: segment.to_string(),
    })
}
