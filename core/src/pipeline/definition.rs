// pilgrim/src/pipeline/definition.rs

//! Contains the `Pipeline<S, E, C>` builder: construction, middleware registration
//! and build-time validation. Finalization lives in `execution.rs`.

use crate::core::shape::HandlerShape;
use crate::error::PilgrimResult;
use crate::pipeline::middleware::Middleware;
use crate::pipeline::validation::{self, StepShape};
use crate::provider::Composer;
use std::sync::Arc;
use tracing::{event, Level};

/// An append-only chain of middleware, finalized with a handler into the output of
/// its `Composer`.
///
/// `S` is the provider-defined source, `E` the error type every middleware and handler
/// returns, and `C` the composer that wraps the finished chain.
///
/// The builder moves through each call, so it cannot be extended or finalized again
/// once a handler has been attached:
///
/// ```compile_fail
/// use pilgrim::{handler, provider, response, Invocation, Pipeline, PilgrimError};
///
/// let builder = Pipeline::new(provider::from_fn(|invocation: Invocation<(), PilgrimError>| invocation));
/// let _invocation = builder.handle(handler::from_fn(|_| async { Ok(response::nothing()) }));
/// let _again = builder.handle(handler::from_fn(|_| async { Ok(response::nothing()) }));
/// ```
pub struct Pipeline<S, E, C>
where
  S: Send + Sync + 'static,
  E: std::error::Error + Send + Sync + 'static,
  C: Composer<S, E>,
{
  pub(crate) composer: C,
  /// Middleware in declaration order; the first entry is the outermost wrapper.
  pub(crate) middlewares: Vec<Arc<dyn Middleware<S, E>>>,
}

impl<S, E, C> Pipeline<S, E, C>
where
  S: Send + Sync + 'static,
  E: std::error::Error + Send + Sync + 'static,
  C: Composer<S, E>,
{
  pub fn new(composer: C) -> Self {
    Self {
      composer,
      middlewares: Vec::new(),
    }
  }

  /// Appends `middleware` to the chain.
  ///
  /// Middleware run in the order they are added, and the first one added gets the last
  /// word on the response.
  pub fn using<M>(mut self, middleware: M) -> Self
  where
    M: Middleware<S, E>,
  {
    event!(
      Level::TRACE,
      middleware = middleware.name(),
      position = self.middlewares.len(),
      "Middleware added."
    );
    self.middlewares.push(Arc::new(middleware));
    self
  }

  pub fn len(&self) -> usize {
    self.middlewares.len()
  }

  pub fn is_empty(&self) -> bool {
    self.middlewares.is_empty()
  }

  pub fn middleware_names(&self) -> Vec<&str> {
    self.middlewares.iter().map(|m| m.name()).collect()
  }

  /// Checks declared context requirements and response coverage against a handler shape.
  ///
  /// Called by `handle` and `handle_with_source`; exposed so a chain can be checked
  /// without being finalized.
  pub fn validate(&self, handler: &HandlerShape) -> PilgrimResult<()> {
    self.validate_for("handler", handler)
  }

  pub(crate) fn validate_for(&self, handler_name: &str, handler: &HandlerShape) -> PilgrimResult<()> {
    let steps: Vec<StepShape<'_>> = self
      .middlewares
      .iter()
      .map(|m| StepShape {
        name: m.name(),
        shape: m.shape(),
      })
      .collect();

    validation::validate(
      &self.composer.context_shape(),
      &self.composer.accepts(),
      &steps,
      handler_name,
      handler,
    )
  }
}
