// pilgrim/src/pipeline/validation.rs

//! Build-time checks over declared shapes.
//!
//! Context: walking the chain outermost-first, every required path must already be
//! available from the initial context or an earlier middleware.
//!
//! Responses: walking the chain innermost-first from the handler, track the set of
//! response types that can still leave the pipeline; the composer must accept all of them.
//! `Shape::Inherit` anywhere in the walk makes the affected set unknown, and unknown sets
//! are not checked.

use crate::core::shape::{covers, HandlerShape, MiddlewareShape, Shape};
use crate::error::{PilgrimError, PilgrimResult};
use std::collections::BTreeSet;
use tracing::{event, Level};

pub(crate) struct StepShape<'a> {
  pub name: &'a str,
  pub shape: MiddlewareShape,
}

pub(crate) fn validate(
  initial_context: &Shape,
  accepted: &Shape,
  steps: &[StepShape<'_>],
  handler_name: &str,
  handler: &HandlerShape,
) -> PilgrimResult<()> {
  check_context(initial_context, steps, handler_name, handler)?;
  check_responses(accepted, steps, handler)
}

fn check_context(
  initial_context: &Shape,
  steps: &[StepShape<'_>],
  handler_name: &str,
  handler: &HandlerShape,
) -> PilgrimResult<()> {
  let mut available: BTreeSet<String> = match initial_context.declared() {
    Some(paths) => paths.clone(),
    None => return Ok(()),
  };

  for step in steps {
    require_all(&available, step.name, &step.shape.requires)?;
    if let Some(provided) = step.shape.provides.declared() {
      available.extend(provided.iter().cloned());
    }
  }

  require_all(&available, handler_name, &handler.requires)
}

fn require_all(available: &BTreeSet<String>, step: &str, requires: &Shape) -> PilgrimResult<()> {
  let Some(required) = requires.declared() else {
    return Ok(());
  };
  match required.iter().find(|path| !covers(available, path)) {
    Some(missing) => {
      event!(Level::WARN, step, key = %missing, "Context requirement not satisfied.");
      Err(PilgrimError::UnsatisfiedContext {
        step: step.to_string(),
        key: missing.clone(),
      })
    }
    None => Ok(()),
  }
}

fn check_responses(accepted: &Shape, steps: &[StepShape<'_>], handler: &HandlerShape) -> PilgrimResult<()> {
  let Some(accepted) = accepted.declared() else {
    return Ok(());
  };

  let mut escaping: Option<BTreeSet<String>> = handler.produces.declared().cloned();

  for step in steps.iter().rev() {
    let shape = &step.shape;
    escaping = match (shape.consumes.declared(), shape.produces.declared()) {
      (Some(consumed), Some(produced)) => escaping.map(|mut kinds| {
        kinds.retain(|kind| !consumed.contains(kind));
        kinds.extend(produced.iter().cloned());
        kinds
      }),
      // Consumed types are replaced by something undeclared.
      (Some(_), None) => None,
      (None, Some(produced)) => escaping.map(|mut kinds| {
        kinds.extend(produced.iter().cloned());
        kinds
      }),
      (None, None) => escaping,
    };
  }

  let Some(escaping) = escaping else {
    return Ok(());
  };
  match escaping.iter().find(|kind| !accepted.contains(*kind)) {
    Some(kind) => {
      event!(Level::WARN, response_type = %kind, "Response type is not mapped by the provider.");
      Err(PilgrimError::UnmappedResponse { kind: kind.clone() })
    }
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn step(name: &'static str, shape: MiddlewareShape) -> StepShape<'static> {
    StepShape { name, shape }
  }

  #[test]
  fn inherit_everywhere_always_passes() {
    let steps = vec![step("a", MiddlewareShape::inherit())];
    assert!(validate(&Shape::Inherit, &Shape::Inherit, &steps, "h", &HandlerShape::default()).is_ok());
  }

  #[test]
  fn requirement_satisfied_by_earlier_middleware() {
    let steps = vec![
      step(
        "filters",
        MiddlewareShape {
          provides: Shape::of(["filters"]),
          ..Default::default()
        },
      ),
      step(
        "validate_filters",
        MiddlewareShape {
          requires: Shape::of(["filters.search"]),
          ..Default::default()
        },
      ),
    ];
    let handler = HandlerShape {
      requires: Shape::of(["request.id", "filters"]),
      produces: Shape::Inherit,
    };
    assert!(validate(&Shape::of(["request.id"]), &Shape::Inherit, &steps, "h", &handler).is_ok());
  }

  #[test]
  fn requirement_declared_later_is_rejected() {
    let steps = vec![
      step(
        "validate_filters",
        MiddlewareShape {
          requires: Shape::of(["filters"]),
          ..Default::default()
        },
      ),
      step(
        "filters",
        MiddlewareShape {
          provides: Shape::of(["filters"]),
          ..Default::default()
        },
      ),
    ];
    let err = validate(&Shape::of(["request"]), &Shape::Inherit, &steps, "h", &HandlerShape::default()).unwrap_err();
    match err {
      PilgrimError::UnsatisfiedContext { step, key } => {
        assert_eq!(step, "validate_filters");
        assert_eq!(key, "filters");
      }
      other => panic!("Expected UnsatisfiedContext, got {:?}", other),
    }
  }

  #[test]
  fn consuming_middleware_narrows_escaping_types() {
    let steps = vec![step(
      "http_support",
      MiddlewareShape {
        consumes: Shape::of(["http"]),
        produces: Shape::of(["aws:event"]),
        ..Default::default()
      },
    )];
    let handler = HandlerShape {
      requires: Shape::Inherit,
      produces: Shape::of(["http", "nothing"]),
    };
    let accepted = Shape::of(["aws:event", "nothing"]);
    assert!(validate(&Shape::Inherit, &accepted, &steps, "h", &handler).is_ok());

    let err = validate(&Shape::Inherit, &accepted, &[], "h", &handler).unwrap_err();
    assert!(matches!(err, PilgrimError::UnmappedResponse { ref kind } if kind == "http"));
  }

  #[test]
  fn short_circuit_producers_widen_escaping_types() {
    let steps = vec![step(
      "auth",
      MiddlewareShape {
        produces: Shape::of(["test:denied"]),
        ..Default::default()
      },
    )];
    let handler = HandlerShape {
      requires: Shape::Inherit,
      produces: Shape::of(["test:ok"]),
    };
    let err = validate(&Shape::Inherit, &Shape::of(["test:ok"]), &steps, "h", &handler).unwrap_err();
    assert!(matches!(err, PilgrimError::UnmappedResponse { ref kind } if kind == "test:denied"));
  }

  #[test]
  fn undeclared_replacement_makes_union_unknown() {
    let steps = vec![step(
      "rewriter",
      MiddlewareShape {
        consumes: Shape::of(["test:ok"]),
        ..Default::default()
      },
    )];
    let handler = HandlerShape {
      requires: Shape::Inherit,
      produces: Shape::of(["test:ok", "test:other"]),
    };
    assert!(validate(&Shape::Inherit, &Shape::of(["test:ok"]), &steps, "h", &handler).is_ok());
  }
}
