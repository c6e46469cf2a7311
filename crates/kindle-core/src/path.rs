//! Dotted-path access into a property [`Map`].
//!
//! `"a.b.c"` walks nested `Value::Map`s. Reads never fail: any missing or
//! non-map segment yields `Value::Null`. Writes create missing intermediate
//! maps (a `Null` slot counts as missing) and refuse to walk through any
//! other non-map value.

use crate::value::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty property path")]
    EmptyPath,
    #[error("cannot set `{path}`: `{segment}` is not a map")]
    NotAMap { path: String, segment: String },
}

pub fn get(root: &Map, path: &str) -> Value {
    let mut segments = path.split('.');
    let Some(mut cur) = segments.next().and_then(|first| root.get(first)) else {
        return Value::Null;
    };
    for seg in segments {
        match cur.as_map().and_then(|m| m.get(seg)) {
            Some(next) => cur = next,
            None => return Value::Null,
        }
    }
    cur.clone()
}

/// Writes `value` at `path`, returning the previous value (`Null` if unset).
pub fn set(root: &mut Map, path: &str, value: Value) -> Result<Value, PathError> {
    if path.is_empty() {
        return Err(PathError::EmptyPath);
    }
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut cur = root;
    if let Some(parents) = parents {
        for seg in parents.split('.') {
            let slot = cur
                .entry(seg.to_string())
                .or_insert_with(|| Value::Map(Map::new()));
            if slot.is_null() {
                *slot = Value::Map(Map::new());
            }
            cur = match slot {
                Value::Map(m) => m,
                _ => {
                    return Err(PathError::NotAMap {
                        path: path.to_string(),
                        segment: seg.to_string(),
                    });
                }
            };
        }
    }
    Ok(cur.insert(leaf.to_string(), value).unwrap_or_default())
}
