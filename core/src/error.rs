// pilgrim/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PilgrimError {
  #[error("Context must be a JSON object, got {found}")]
  InvalidContext { found: String },

  #[error("Context key '{key}' is missing")]
  MissingContextKey { key: String },

  #[error("Context key '{key}' could not be decoded. Source: {source}")]
  ContextDecode {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Value of response '{kind}' could not be converted. Source: {source}")]
  ResponseValue {
    kind: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Step '{step}' requires context key '{key}' which no earlier step provides")]
  UnsatisfiedContext { step: String, key: String },

  #[error("Response type '{kind}' can leave the pipeline but the provider does not map it")]
  UnmappedResponse { kind: String },

  #[error("Unexpected response: {json}")]
  UnexpectedResponse { json: String },

  #[error("Error in user-provided middleware or handler. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal Pilgrim error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for PilgrimError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a PilgrimError that was only carried through anyhow.
    match err.downcast::<PilgrimError>() {
      Ok(pilgrim_err) => pilgrim_err,
      Err(source) => PilgrimError::HandlerError { source },
    }
  }
}

pub type PilgrimResult<T, E = PilgrimError> = std::result::Result<T, E>;
