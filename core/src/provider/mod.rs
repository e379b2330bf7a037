// pilgrim/src/provider/mod.rs

//! The boundary between a composed pipeline and a host runtime.
//!
//! A `Composer` receives the pipeline's [`Invocation`] and wraps it into whatever the host
//! calls. Per external call it must:
//!  - build the source and the initial `Context` from the native arguments,
//!  - call `Invocation::invoke` exactly once,
//!  - translate every response type the pipeline can produce into a native value, failing
//!    loudly (see `response::assert_unreachable`) on any type it does not map.

pub mod lambda;

use crate::core::shape::Shape;
use crate::pipeline::execution::Invocation;
use std::marker::PhantomData;

pub trait Composer<S, E>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
{
  /// What the host runtime is handed, typically a callable.
  type Output;

  fn compose(self, invocation: Invocation<S, E>) -> Self::Output;

  /// Context paths present in every initial context this composer supplies.
  fn context_shape(&self) -> Shape {
    Shape::Inherit
  }

  /// Response types this composer translates into native values.
  fn accepts(&self) -> Shape {
    Shape::Inherit
  }
}

/// A composer backed by a closure. Created with [`from_fn`].
pub struct FnComposer<S, E, F> {
  func: F,
  context_shape: Shape,
  accepts: Shape,
  _marker: PhantomData<fn(S) -> E>,
}

pub fn from_fn<S, E, F, O>(func: F) -> FnComposer<S, E, F>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
  F: FnOnce(Invocation<S, E>) -> O,
{
  FnComposer {
    func,
    context_shape: Shape::Inherit,
    accepts: Shape::Inherit,
    _marker: PhantomData,
  }
}

impl<S, E, F> FnComposer<S, E, F> {
  /// Declares the context paths the closure's initial context always carries.
  pub fn with_context_shape<I, T>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.context_shape = Shape::of(paths);
    self
  }

  /// Declares the response types the closure translates.
  pub fn accepting<I, T>(mut self, kinds: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.accepts = Shape::of(kinds);
    self
  }
}

impl<S, E, F, O> Composer<S, E> for FnComposer<S, E, F>
where
  S: Send + Sync + 'static,
  E: Send + 'static,
  F: FnOnce(Invocation<S, E>) -> O,
{
  type Output = O;

  fn compose(self, invocation: Invocation<S, E>) -> O {
    (self.func)(invocation)
  }

  fn context_shape(&self) -> Shape {
    self.context_shape.clone()
  }

  fn accepts(&self) -> Shape {
    self.accepts.clone()
  }
}
