//! Path-addressed reads and copy-on-write updates over a JSON tree.
//!
//! Every write returns a fresh document and leaves its input untouched, so a
//! snapshot handed to a renderer stays valid after later edits. Writes never
//! create missing intermediates: the caller addresses nodes that already exist
//! (or a new key directly inside an existing mapping).

use serde_json::Value;
use thiserror::Error;

use crate::domain::{FieldPath, PathSegment};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("cannot write to the document root")]
    EmptyPath,
    #[error("nothing exists at {path}")]
    Missing { path: FieldPath },
    #[error("{path} is not a mapping or sequence")]
    NotAContainer { path: FieldPath },
    #[error("{path} is not a sequence")]
    NotASequence { path: FieldPath },
    #[error("index {index} is out of range for {path} (length {len})")]
    IndexOutOfRange {
        path: FieldPath,
        index: usize,
        len: usize,
    },
}

/// Reads the node at `path`. Any missing step yields `None`.
pub fn get<'a>(doc: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(doc, |node, segment| step(node, segment))
}

/// Length of the sequence at `path`, if there is one.
pub fn len_at(doc: &Value, path: &FieldPath) -> Option<usize> {
    get(doc, path).and_then(Value::as_array).map(Vec::len)
}

/// Returns a copy of `doc` whose node at `path` holds `value`.
pub fn set(doc: &Value, path: &FieldPath, value: Value) -> Result<Value, PathError> {
    let (last, parent_path) = split_last(path)?;
    let mut next = doc.clone();
    let parent = resolve_mut(&mut next, &parent_path)?;
    match (parent, last) {
        (Value::Object(map), segment) => {
            map.insert(segment.to_string(), value);
        }
        (Value::Array(items), PathSegment::Index(index)) => {
            let len = items.len();
            let slot = items.get_mut(*index).ok_or(PathError::IndexOutOfRange {
                path: parent_path.clone(),
                index: *index,
                len,
            })?;
            *slot = value;
        }
        (Value::Array(_), PathSegment::Key(_)) => {
            return Err(PathError::Missing { path: path.clone() });
        }
        _ => return Err(PathError::NotAContainer { path: parent_path }),
    }
    Ok(next)
}

/// Returns a copy of `doc` with `value` appended to the sequence at `array_path`.
pub fn insert_at(doc: &Value, array_path: &FieldPath, value: Value) -> Result<Value, PathError> {
    let mut next = doc.clone();
    sequence_mut(&mut next, array_path)?.push(value);
    Ok(next)
}

/// Returns a copy of `doc` without element `index` of the sequence at `array_path`.
pub fn remove_at(doc: &Value, array_path: &FieldPath, index: usize) -> Result<Value, PathError> {
    let mut next = doc.clone();
    let items = sequence_mut(&mut next, array_path)?;
    if index >= items.len() {
        return Err(PathError::IndexOutOfRange {
            path: array_path.clone(),
            index,
            len: items.len(),
        });
    }
    items.remove(index);
    Ok(next)
}

fn split_last(path: &FieldPath) -> Result<(&PathSegment, FieldPath), PathError> {
    match (path.last(), path.parent()) {
        (Some(last), Some(parent)) => Ok((last, parent)),
        _ => Err(PathError::EmptyPath),
    }
}

fn step<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
        (Value::Object(map), PathSegment::Index(index)) => map.get_mut(&index.to_string()),
        (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

fn resolve_mut<'a>(doc: &'a mut Value, path: &FieldPath) -> Result<&'a mut Value, PathError> {
    let mut node = doc;
    for (depth, segment) in path.segments().iter().enumerate() {
        node = step_mut(node, segment).ok_or_else(|| PathError::Missing {
            path: path.segments()[..=depth].iter().cloned().collect(),
        })?;
    }
    Ok(node)
}

fn sequence_mut<'a>(doc: &'a mut Value, path: &FieldPath) -> Result<&'a mut Vec<Value>, PathError> {
    resolve_mut(doc, path)?
        .as_array_mut()
        .ok_or_else(|| PathError::NotASequence { path: path.clone() })
}
