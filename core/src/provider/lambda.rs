// pilgrim/src/provider/lambda.rs

//! A reference composer for Lambda-style hosts, where the runtime calls a function with
//! an event and invocation metadata and expects an optional JSON value back.
//!
//! The event type `Ev` is left to the caller; no event catalog is provided here.

use crate::core::context::Context;
use crate::core::response::{self, HttpResponseData, Response};
use crate::core::shape::{MiddlewareShape, Shape};
use crate::error::PilgrimError;
use crate::pipeline::middleware::{Middleware, Tooling};
use crate::pipeline::{Invocation, Pipeline};
use crate::provider::Composer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::marker::PhantomData;
use tracing::instrument;

/// Response type whose value is returned to the host as-is.
pub const EVENT: &str = "aws:event";

/// Invocation metadata supplied by the host alongside the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaContext {
  pub aws_request_id: String,
  #[serde(default)]
  pub function_name: String,
  #[serde(default)]
  pub function_version: String,
}

/// The pipeline source: the raw event plus its invocation metadata.
#[derive(Debug, Clone)]
pub struct LambdaSource<Ev> {
  pub event: Ev,
  pub context: LambdaContext,
}

pub fn event<V: Into<Value>>(value: V) -> Response {
  response::create(EVENT, value)
}

/// Initial context for every invocation: `{ "request": { "id": <request id> } }`.
pub fn initial_context(context: &LambdaContext) -> Context {
  Context::new().with("request", json!({ "id": context.aws_request_id }))
}

pub struct LambdaComposer<Ev> {
  _event: PhantomData<fn() -> Ev>,
}

impl<Ev> LambdaComposer<Ev> {
  pub fn new() -> Self {
    Self { _event: PhantomData }
  }
}

impl<Ev> Default for LambdaComposer<Ev> {
  fn default() -> Self {
    Self::new()
  }
}

impl<Ev, E> Composer<LambdaSource<Ev>, E> for LambdaComposer<Ev>
where
  Ev: Send + Sync + 'static,
  E: std::error::Error + From<PilgrimError> + Send + Sync + 'static,
{
  type Output = LambdaFunction<Ev, E>;

  fn compose(self, invocation: Invocation<LambdaSource<Ev>, E>) -> LambdaFunction<Ev, E> {
    LambdaFunction { invocation }
  }

  fn context_shape(&self) -> Shape {
    Shape::of(["request.id"])
  }

  fn accepts(&self) -> Shape {
    Shape::of([EVENT, response::NOTHING])
  }
}

/// The function handed to the host runtime.
pub struct LambdaFunction<Ev, E> {
  invocation: Invocation<LambdaSource<Ev>, E>,
}

impl<Ev, E> Clone for LambdaFunction<Ev, E> {
  fn clone(&self) -> Self {
    Self {
      invocation: self.invocation.clone(),
    }
  }
}

impl<Ev, E> LambdaFunction<Ev, E>
where
  Ev: Send + Sync + 'static,
  E: std::error::Error + From<PilgrimError> + Send + Sync + 'static,
{
  /// Runs the pipeline for one host call. `nothing` maps to `None`, `aws:event` to its value.
  #[instrument(name = "LambdaFunction::call", skip_all, fields(request_id = %context.aws_request_id))]
  pub async fn call(&self, event: Ev, context: LambdaContext) -> Result<Option<Value>, E> {
    let initial = initial_context(&context);
    let result = self.invocation.invoke(LambdaSource { event, context }, initial).await?;

    if result.is(response::NOTHING) {
      return Ok(None);
    }
    if result.is(EVENT) {
      return Ok(Some(result.value));
    }
    response::assert_unreachable(&result).map_err(E::from)
  }
}

/// Starts a pipeline for a Lambda-style host.
pub fn lambda<Ev, E>() -> Pipeline<LambdaSource<Ev>, E, LambdaComposer<Ev>>
where
  Ev: Send + Sync + 'static,
  E: std::error::Error + From<PilgrimError> + Send + Sync + 'static,
{
  Pipeline::new(LambdaComposer::new())
}

/// Translates provider-neutral `http` responses into API gateway proxy results.
///
/// Other response types pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpResponseSupport;

#[async_trait]
impl<S, E> Middleware<S, E> for HttpResponseSupport
where
  S: Send + Sync + 'static,
  E: From<PilgrimError> + Send + 'static,
{
  fn name(&self) -> &str {
    "lambda::http_response_support"
  }

  fn shape(&self) -> MiddlewareShape {
    MiddlewareShape {
      consumes: Shape::of([response::HTTP]),
      produces: Shape::of([EVENT]),
      ..MiddlewareShape::default()
    }
  }

  async fn process(&self, tooling: Tooling<S, E>) -> Result<Response, E> {
    let result = tooling.next.pass().await?;
    if !result.is(response::HTTP) {
      return Ok(result);
    }

    let data: HttpResponseData = response::value_as(&result)?;
    Ok(event(json!({
      "statusCode": data.status,
      "body": data.body.unwrap_or_default(),
      "headers": data.headers.unwrap_or_default(),
    })))
  }
}
