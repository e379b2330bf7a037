// pilgrim/src/core/shape.rs

//! Declarations a middleware or handler can make about the context keys and response
//! types it touches. Every slot defaults to `Shape::Inherit`, meaning "unconstrained,
//! pass through unchanged", so undeclared steps are never rejected.

use std::collections::BTreeSet;

/// Either unconstrained, or an explicit set of names (context paths or response types).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Shape {
  #[default]
  Inherit,
  Declared(BTreeSet<String>),
}

impl Shape {
  pub fn of<I, T>(names: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    Shape::Declared(names.into_iter().map(Into::into).collect())
  }

  pub fn is_inherit(&self) -> bool {
    matches!(self, Shape::Inherit)
  }

  pub fn declared(&self) -> Option<&BTreeSet<String>> {
    match self {
      Shape::Inherit => None,
      Shape::Declared(names) => Some(names),
    }
  }
}

/// What a middleware reads, adds, intercepts and emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddlewareShape {
  /// Context paths read from the incoming context.
  pub requires: Shape,
  /// Context paths added through `next`.
  pub provides: Shape,
  /// Response types taken from downstream and replaced.
  pub consumes: Shape,
  /// Response types that may be returned upstream.
  pub produces: Shape,
}

impl MiddlewareShape {
  pub fn inherit() -> Self {
    Self::default()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerShape {
  pub requires: Shape,
  pub produces: Shape,
}

/// True when `path` is available given the `available` paths.
///
/// A path covers its own sub-paths (`request` covers `request.id`) and is covered by any
/// of them (`request.id` being present means `request` is).
pub(crate) fn covers(available: &BTreeSet<String>, path: &str) -> bool {
  available.iter().any(|known| {
    known == path || is_sub_path(path, known) || is_sub_path(known, path)
  })
}

fn is_sub_path(path: &str, parent: &str) -> bool {
  path.len() > parent.len() && path.starts_with(parent) && path.as_bytes()[parent.len()] == b'.'
}
