//! Store - key-value state of a single node
//!
//! Keys are dotted paths: `set("job.progress", 3)` creates the `job` object
//! when missing and writes `progress` inside it. Reads descend through
//! objects by key and through arrays by numeric index.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use hooked_core::{HookedError, HookedResult};

/// Dotted-path key-value store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    root: Map<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Write `value` at `path`.
    ///
    /// Missing intermediate objects are created. A numeric segment on an
    /// existing array writes that slot, padding with nulls. Any other
    /// intermediate value that is not an object is replaced by one.
    pub fn set(&mut self, path: &str, value: Value) {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or(path);

        let mut current = self.root.entry(first.to_string()).or_insert(Value::Null);
        for segment in segments {
            current = child_slot(current, segment);
        }
        *current = value;
    }

    /// Value at `path`, if any
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Value at `path` decoded into `D`
    pub fn get_as<D: DeserializeOwned>(&self, path: &str) -> HookedResult<Option<D>> {
        self.get(path)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| HookedError::Decode {
                    key: path.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The whole store as one JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

fn child_slot<'a>(parent: &'a mut Value, segment: &str) -> &'a mut Value {
    match (parent, segment.parse::<usize>()) {
        (Value::Array(items), Ok(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (parent, _) => as_object(parent)
            .entry(segment.to_string())
            .or_insert(Value::Null),
    }
}

fn as_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}
