// pilgrim/src/core/context.rs

//! Defines `Context`, the request-scoped mapping accumulated across a middleware chain,
//! and the deep-merge used to fold each middleware's partial context into it.
//!
//! Merge rules:
//!  - Object values present on both sides merge key by key, recursively.
//!  - Any other value in the patch (arrays, scalars, `null`) replaces the base value wholesale.
//!  - Keys absent from the patch are left untouched.
//!
//! Both inputs are borrowed; the merged result is always a new value.

use crate::error::{PilgrimError, PilgrimResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mapping from string keys to JSON values, threaded through a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
  pub fn new() -> Self {
    Context(Map::new())
  }

  /// Builds a context from a JSON value. Only objects are accepted.
  pub fn from_value(value: Value) -> PilgrimResult<Self> {
    match value {
      Value::Object(map) => Ok(Context(map)),
      other => Err(PilgrimError::InvalidContext {
        found: json_kind(&other).to_string(),
      }),
    }
  }

  /// Serializes `data` and builds a context from it. `data` must serialize to an object.
  pub fn from_serialize<T: Serialize>(data: &T) -> PilgrimResult<Self> {
    let value = serde_json::to_value(data).map_err(|source| PilgrimError::ContextDecode {
      key: std::any::type_name::<T>().to_string(),
      source,
    })?;
    Self::from_value(value)
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  /// Looks up a dotted path such as `request.id`.
  pub fn get_path(&self, path: &str) -> Option<&Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = self.0.get(first)?;
    for segment in segments {
      current = current.as_object()?.get(segment)?;
    }
    Some(current)
  }

  pub fn contains_path(&self, path: &str) -> bool {
    self.get_path(path).is_some()
  }

  /// Deserializes the value at a dotted path.
  pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> PilgrimResult<T> {
    let value = self.get_path(path).ok_or_else(|| PilgrimError::MissingContextKey {
      key: path.to_string(),
    })?;
    T::deserialize(value).map_err(|source| PilgrimError::ContextDecode {
      key: path.to_string(),
      source,
    })
  }

  pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
    self.0.insert(key.into(), value.into())
  }

  /// Chaining form of `insert`, handy for building patches.
  pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
    self.insert(key, value);
    self
  }

  /// Returns `patch` deep-merged on top of `self`. Neither input is modified.
  pub fn merge(&self, patch: &Context) -> Context {
    Context(merge_maps(&self.0, &patch.0))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn into_value(self) -> Value {
    Value::Object(self.0)
  }
}

impl From<Map<String, Value>> for Context {
  fn from(map: Map<String, Value>) -> Self {
    Context(map)
  }
}

impl TryFrom<Value> for Context {
  type Error = PilgrimError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    Context::from_value(value)
  }
}

impl From<Context> for Value {
  fn from(context: Context) -> Self {
    context.into_value()
  }
}

/// Deep-merges `patch` over `base`, returning a new context.
pub fn merge(base: &Context, patch: &Context) -> Context {
  base.merge(patch)
}

/// Deep-merges two JSON values. Only object/object pairs merge; otherwise `patch` wins.
pub fn merge_values(base: &Value, patch: &Value) -> Value {
  match (base, patch) {
    (Value::Object(base_map), Value::Object(patch_map)) => Value::Object(merge_maps(base_map, patch_map)),
    (_, replacement) => replacement.clone(),
  }
}

fn merge_maps(base: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
  let mut merged = base.clone();
  for (key, patch_value) in patch {
    let next_value = match merged.get(key) {
      Some(existing) => merge_values(existing, patch_value),
      None => patch_value.clone(),
    };
    merged.insert(key.clone(), next_value);
  }
  merged
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
