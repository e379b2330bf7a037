// pilgrim/src/core/response.rs

//! The tagged `Response` produced exactly once per invocation, and the helpers used to
//! build, inspect and exhaustively dispatch on it.

use crate::error::{PilgrimError, PilgrimResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type of the sentinel returned when the host runtime expects no value.
pub const NOTHING: &str = "nothing";

/// Type of the provider-neutral HTTP response.
pub const HTTP: &str = "http";

/// Outcome of a pipeline: a `type` discriminant and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub value: Value,
}

impl Response {
  pub fn kind(&self) -> &str {
    &self.kind
  }

  pub fn is(&self, kind: &str) -> bool {
    self.kind == kind
  }

  pub fn value(&self) -> &Value {
    &self.value
  }
}

/// Constructs a response of the given type.
pub fn create<K: Into<String>, V: Into<Value>>(kind: K, value: V) -> Response {
  Response {
    kind: kind.into(),
    value: value.into(),
  }
}

/// Constructs a response from any serializable value.
pub fn create_serialized<K: Into<String>, T: Serialize>(kind: K, value: &T) -> PilgrimResult<Response> {
  let kind = kind.into();
  match serde_json::to_value(value) {
    Ok(value) => Ok(Response { kind, value }),
    Err(source) => Err(PilgrimError::ResponseValue { kind, source }),
  }
}

/// Returns a constructor bound to one response type.
pub fn factory<K: Into<String>>(kind: K) -> impl Fn(Value) -> Response + Clone + Send + Sync + 'static {
  let kind: String = kind.into();
  move |value| create(kind.clone(), value)
}

/// Projects out the value of a response.
pub fn unwrap(response: Response) -> Value {
  response.value
}

/// Deserializes the value of a response.
pub fn value_as<T: DeserializeOwned>(response: &Response) -> PilgrimResult<T> {
  T::deserialize(&response.value).map_err(|source| PilgrimError::ResponseValue {
    kind: response.kind.clone(),
    source,
  })
}

pub fn nothing() -> Response {
  create(NOTHING, Value::Null)
}

/// Provider-neutral HTTP response data, translated by provider middleware.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpResponseData {
  pub status: u16,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub headers: Option<BTreeMap<String, String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

pub fn http(data: HttpResponseData) -> Response {
  // HttpResponseData only holds strings and integers, serialization cannot fail.
  let value = serde_json::to_value(&data).unwrap_or(Value::Null);
  create(HTTP, value)
}

/// Backstop for the final arm of an exhaustive dispatch over response types.
///
/// Always fails, carrying the JSON form of the unmatched response.
pub fn assert_unreachable<T>(response: &Response) -> PilgrimResult<T> {
  let json = serde_json::to_string(response).unwrap_or_else(|_| format!("{:?}", response));
  tracing::error!(response_type = %response.kind, "Unreachable response type reached.");
  Err(PilgrimError::UnexpectedResponse { json })
}
