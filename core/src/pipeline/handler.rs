// pilgrim/src/pipeline/handler.rs

//! Terminal steps of a pipeline. A `Handler` sees only the accumulated context;
//! a `SourceHandler` additionally sees the raw source, for the rare cases where
//! writing a middleware to expose it makes no sense (raw queue or mail payloads).

use crate::core::context::Context;
use crate::core::response::Response;
use crate::core::shape::{HandlerShape, Shape};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct HandlerTooling {
  pub context: Context,
}

pub struct SourceHandlerTooling<S> {
  pub source: Arc<S>,
  pub context: Context,
}

#[async_trait]
pub trait Handler<E>: Send + Sync + 'static
where
  E: Send + 'static,
{
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  fn shape(&self) -> HandlerShape {
    HandlerShape::default()
  }

  async fn handle(&self, tooling: HandlerTooling) -> Result<Response, E>;
}

#[async_trait]
pub trait SourceHandler<S, E>: Send + Sync + 'static
where
  S: Send + Sync + 'static,
  E: Send + 'static,
{
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  fn shape(&self) -> HandlerShape {
    HandlerShape::default()
  }

  async fn handle(&self, tooling: SourceHandlerTooling<S>) -> Result<Response, E>;
}

/// A handler backed by an async closure. Created with [`from_fn`].
pub struct FnHandler<E, F> {
  name: String,
  shape: HandlerShape,
  func: F,
  _marker: PhantomData<fn() -> E>,
}

pub fn from_fn<E, F, Fut>(func: F) -> FnHandler<E, F>
where
  E: Send + 'static,
  F: Fn(HandlerTooling) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
  FnHandler {
    name: std::any::type_name::<F>().to_string(),
    shape: HandlerShape::default(),
    func,
    _marker: PhantomData,
  }
}

/// A source-aware handler backed by an async closure. Created with [`from_fn_with_source`].
pub struct FnSourceHandler<S, E, F> {
  name: String,
  shape: HandlerShape,
  func: F,
  _marker: PhantomData<fn(S) -> E>,
}

pub fn from_fn_with_source<S, E, F, Fut>(func: F) -> FnSourceHandler<S, E, F>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
  F: Fn(SourceHandlerTooling<S>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
  FnSourceHandler {
    name: std::any::type_name::<F>().to_string(),
    shape: HandlerShape::default(),
    func,
    _marker: PhantomData,
  }
}

// Shared declaration builders for both closure-backed handler kinds.
macro_rules! impl_shape_builders {
  ($ty:ident < $($param:ident),+ >) => {
    impl<$($param),+> $ty<$($param),+> {
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

      pub fn produces<I, T>(mut self, kinds: I) -> Self
      where
        I: IntoIterator<Item = T>,
        T: Into<String>,
      {
        self.shape.produces = Shape::of(kinds);
        self
      }
    }
  };
}

impl_shape_builders!(FnHandler<E, F>);
impl_shape_builders!(FnSourceHandler<S, E, F>);

#[async_trait]
impl<E, F, Fut> Handler<E> for FnHandler<E, F>
where
  E: Send + 'static,
  F: Fn(HandlerTooling) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn shape(&self) -> HandlerShape {
    self.shape.clone()
  }

  async fn handle(&self, tooling: HandlerTooling) -> Result<Response, E> {
    (self.func)(tooling).await
  }
}

#[async_trait]
impl<S, E, F, Fut> SourceHandler<S, E> for FnSourceHandler<S, E, F>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
  F: Fn(SourceHandlerTooling<S>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn shape(&self) -> HandlerShape {
    self.shape.clone()
  }

  async fn handle(&self, tooling: SourceHandlerTooling<S>) -> Result<Response, E> {
    (self.func)(tooling).await
  }
}
