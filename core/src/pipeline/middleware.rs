// pilgrim/src/pipeline/middleware.rs

//! The `Middleware` trait, the tooling handed to each middleware invocation, and the
//! `Next` continuation that threads a merged context into the rest of the chain.
//!
//! A middleware may:
//!  1. Read the source and the context it was given.
//!  2. Call `next.run(patch)` to continue; `patch` is deep-merged over the context this
//!     middleware received before the downstream step sees it.
//!  3. Inspect or replace the downstream `Response`.
//!  4. Skip `next` entirely and return its own `Response`, short-circuiting the chain.

use crate::core::context::Context;
use crate::core::response::Response;
use crate::core::shape::{MiddlewareShape, Shape};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future that resolves to `T`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One step of a composed chain: the source and the context it should see.
pub(crate) type Step<S, E> = Arc<dyn Fn(Arc<S>, Context) -> BoxFuture<'static, Result<Response, E>> + Send + Sync>;

/// Everything a middleware is handed for one invocation.
pub struct Tooling<S, E> {
  /// The provider-defined input, shared and unchanged across the whole chain.
  pub source: Arc<S>,
  /// The context as this middleware received it.
  pub context: Context,
  /// Continuation into the rest of the chain.
  pub next: Next<S, E>,
}

/// Continuation into the downstream middleware (or the handler).
///
/// Consumed on use, so a middleware can continue the chain at most once.
pub struct Next<S, E> {
  source: Arc<S>,
  base: Context,
  step: Step<S, E>,
}

impl<S, E> Next<S, E> {
  pub(crate) fn new(source: Arc<S>, base: Context, step: Step<S, E>) -> Self {
    Self { source, base, step }
  }

  /// Continues the chain with `patch` deep-merged over the context this middleware received.
  pub async fn run(self, patch: Context) -> Result<Response, E> {
    let merged = self.base.merge(&patch);
    (self.step)(self.source, merged).await
  }

  /// Continues the chain with the received context unchanged.
  pub async fn pass(self) -> Result<Response, E> {
    (self.step)(self.source, self.base).await
  }

  /// The context the downstream step is merged on top of.
  pub fn context(&self) -> &Context {
    &self.base
  }
}

/// A pipeline step that may extend context and/or transform the downstream response.
#[async_trait]
pub trait Middleware<S, E>: Send + Sync + 'static
where
  S: Send + Sync + 'static,
  E: Send + 'static,
{
  /// Name used in tracing spans and validation errors.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  /// Declared context and response behaviour, checked when the pipeline is finalized.
  fn shape(&self) -> MiddlewareShape {
    MiddlewareShape::inherit()
  }

  async fn process(&self, tooling: Tooling<S, E>) -> Result<Response, E>;
}

/// A middleware backed by an async closure. Created with [`from_fn`].
pub struct FnMiddleware<S, E, F> {
  name: String,
  shape: MiddlewareShape,
  func: F,
  _marker: PhantomData<fn(S) -> E>,
}

/// Wraps an async closure as a middleware.
///
/// ```ignore
/// let with_theme = middleware::from_fn(|Tooling { next, .. }: Tooling<Source, PilgrimError>| async move {
///   next.run(Context::new().with("theme", "dark")).await
/// })
/// .provides(["theme"]);
/// ```
pub fn from_fn<S, E, F, Fut>(func: F) -> FnMiddleware<S, E, F>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
  F: Fn(Tooling<S, E>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
  FnMiddleware {
    name: std::any::type_name::<F>().to_string(),
    shape: MiddlewareShape::inherit(),
    func,
    _marker: PhantomData,
  }
}

impl<S, E, F> FnMiddleware<S, E, F> {
  pub fn named<N: Into<String>>(mut self, name: N) -> Self {
    self.name = name.into();
    self
  }

  pub fn requires<I, T>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.shape.requires = Shape::of(paths);
    self
  }

  pub fn provides<I, T>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.shape.provides = Shape::of(paths);
    self
  }

  pub fn consumes<I, T>(mut self, kinds: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.shape.consumes = Shape::of(kinds);
    self
  }

  pub fn produces<I, T>(mut self, kinds: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.shape.produces = Shape::of(kinds);
    self
  }
}

#[async_trait]
impl<S, E, F, Fut> Middleware<S, E> for FnMiddleware<S, E, F>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
  F: Fn(Tooling<S, E>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn shape(&self) -> MiddlewareShape {
    self.shape.clone()
  }

  async fn process(&self, tooling: Tooling<S, E>) -> Result<Response, E> {
    (self.func)(tooling).await
  }
}
