// pilgrim/src/pipeline/execution.rs

//! Finalization of a `Pipeline`: the right fold that nests each middleware around the
//! rest of the chain, and the `Invocation` handed to the composer.
//!
//! For middleware `[m1, m2, .., mn]` and terminal step `T`, the fold produces
//! `m1(m2(..mn(T)))`. Each `Next` captures the context its own middleware received, so
//! a patch is always merged over what that step actually saw.

use crate::core::context::Context;
use crate::core::response::Response;
use crate::error::PilgrimResult;
use crate::pipeline::definition::Pipeline;
use crate::pipeline::handler::{Handler, HandlerTooling, SourceHandler, SourceHandlerTooling};
use crate::pipeline::middleware::{Middleware, Next, Step, Tooling};
use crate::provider::Composer;
use std::sync::Arc;
use tracing::{debug_span, event, instrument, Instrument, Level};

impl<S, E, C> Pipeline<S, E, C>
where
  S: Send + Sync + 'static,
  E: std::error::Error + Send + Sync + 'static,
  C: Composer<S, E>,
{
  /// Finalizes the chain with a handler that sees only the context.
  #[instrument(
    name = "Pipeline::handle",
    skip_all,
    fields(middleware_count = self.middlewares.len()),
    err(Display)
  )]
  pub fn handle<H>(self, handler: H) -> PilgrimResult<C::Output>
  where
    H: Handler<E>,
  {
    self.validate_for(handler.name(), &handler.shape())?;

    let handler = Arc::new(handler);
    let terminal: Step<S, E> = Arc::new(move |_source: Arc<S>, context: Context| {
      let handler = Arc::clone(&handler);
      Box::pin(async move { handler.handle(HandlerTooling { context }).await })
    });

    Ok(self.finalize(terminal))
  }

  /// Finalizes the chain with a handler that also receives the source.
  ///
  /// Prefer `handle` with middleware that expose what the handler needs; this exists
  /// for handlers that process a raw event payload directly.
  #[instrument(
    name = "Pipeline::handle_with_source",
    skip_all,
    fields(middleware_count = self.middlewares.len()),
    err(Display)
  )]
  pub fn handle_with_source<H>(self, handler: H) -> PilgrimResult<C::Output>
  where
    H: SourceHandler<S, E>,
  {
    self.validate_for(handler.name(), &handler.shape())?;

    let handler = Arc::new(handler);
    let terminal: Step<S, E> = Arc::new(move |source: Arc<S>, context: Context| {
      let handler = Arc::clone(&handler);
      Box::pin(async move { handler.handle(SourceHandlerTooling { source, context }).await })
    });

    Ok(self.finalize(terminal))
  }

  fn finalize(self, terminal: Step<S, E>) -> C::Output {
    let depth = self.middlewares.len();
    let composed = compose(&self.middlewares, terminal);
    event!(Level::DEBUG, middleware_count = depth, "Pipeline composed.");
    self.composer.compose(Invocation { step: composed, depth })
  }
}

fn compose<S, E>(middlewares: &[Arc<dyn Middleware<S, E>>], terminal: Step<S, E>) -> Step<S, E>
where
  S: Send + Sync + 'static,
  E: std::error::Error + Send + Sync + 'static,
{
  middlewares
    .iter()
    .enumerate()
    .rev()
    .fold(terminal, |downstream, (position, middleware)| {
      let middleware = Arc::clone(middleware);
      let step: Step<S, E> = Arc::new(move |source: Arc<S>, context: Context| {
        let middleware = Arc::clone(&middleware);
        let next = Next::new(Arc::clone(&source), context.clone(), Arc::clone(&downstream));
        let span = debug_span!("middleware", name = %middleware.name(), position);
        Box::pin(
          async move {
            let result = middleware.process(Tooling { source, context, next }).await;
            match &result {
              Ok(response) => event!(Level::TRACE, response_type = %response.kind, "Middleware returned."),
              Err(e) => event!(Level::DEBUG, error = %e, "Middleware returned an error."),
            }
            result
          }
          .instrument(span),
        )
      });
      step
    })
}

/// The composed chain, called by a composer as `(source, initial context) -> Response`.
pub struct Invocation<S, E> {
  step: Step<S, E>,
  depth: usize,
}

impl<S, E> Clone for Invocation<S, E> {
  fn clone(&self) -> Self {
    Self {
      step: Arc::clone(&self.step),
      depth: self.depth,
    }
  }
}

impl<S, E> Invocation<S, E>
where
  S: Send + Sync + 'static,
  E: std::error::Error + Send + Sync + 'static,
{
  /// Runs the chain once for `source`, starting from `context`.
  pub async fn invoke(&self, source: S, context: Context) -> Result<Response, E> {
    self.invoke_shared(Arc::new(source), context).await
  }

  #[instrument(name = "Invocation::invoke", skip_all, fields(middleware_count = self.depth))]
  pub async fn invoke_shared(&self, source: Arc<S>, context: Context) -> Result<Response, E> {
    event!(Level::DEBUG, "Invocation starting.");
    match (self.step)(source, context).await {
      Ok(response) => {
        event!(Level::DEBUG, response_type = %response.kind, "Invocation completed.");
        Ok(response)
      }
      Err(e) => {
        event!(Level::ERROR, error = %e, "Invocation failed.");
        Err(e)
      }
    }
  }

  /// Number of middleware wrapped around the handler.
  pub fn depth(&self) -> usize {
    self.depth
  }
}
