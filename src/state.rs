//! Element state.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The state record of an element: a JSON object which is only ever
/// changed by a shallow [`merge`](State::merge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    /// An empty state record.
    pub fn new() -> State {
        State::default()
    }

    /// Build a state record from a JSON object.
    pub fn from_value(value: Value) -> Result<State> {
        match value {
            Value::Object(map) => Ok(State(map)),
            other => Err(Error::InvalidState(other.to_string())),
        }
    }

    /// Overwrite the top-level keys present in `partial`, leaving every
    /// other key untouched.
    pub fn merge(&mut self, partial: Value) -> Result<()> {
        let partial = State::from_value(partial)?;
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
        Ok(())
    }

    /// The raw value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The value under `key` deserialized into `T`. `None` when the key is
    /// missing or holds something else.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The state as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
