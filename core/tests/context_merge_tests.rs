// tests/context_merge_tests.rs
mod common;

use common::setup_tracing;
use pilgrim::{merge, merge_values, Context};
use serde_json::{json, Value};

fn ctx(value: Value) -> Context {
  Context::from_value(value).unwrap()
}

#[test]
fn test_merge_with_empty_patch_is_identity() {
  setup_tracing();
  let base = ctx(json!({ "a": 1, "b": { "c": [1, 2], "d": null } }));

  assert_eq!(merge(&base, &Context::new()), base);
}

#[test]
fn test_merge_into_empty_base_is_patch() {
  setup_tracing();
  let patch = ctx(json!({ "a": { "b": { "c": true } }, "list": ["x"] }));

  assert_eq!(merge(&Context::new(), &patch), patch);
}

#[test]
fn test_merge_is_associative() {
  setup_tracing();
  let a = ctx(json!({ "user": { "id": 1, "tags": ["a"] }, "x": 1 }));
  let b = ctx(json!({ "user": { "name": "n", "tags": ["b"] }, "y": { "z": 2 } }));
  let c = ctx(json!({ "user": { "id": 3 }, "y": { "w": 4 }, "x": "replaced" }));

  let left = merge(&merge(&a, &b), &c);
  let right = merge(&a, &merge(&b, &c));

  assert_eq!(left, right);
  assert_eq!(
    left.into_value(),
    json!({
      "user": { "id": 3, "name": "n", "tags": ["b"] },
      "x": "replaced",
      "y": { "z": 2, "w": 4 },
    })
  );
}

#[test]
fn test_arrays_are_replaced_not_concatenated() {
  setup_tracing();
  let base = ctx(json!({ "roles": ["admin", "reader"] }));
  let patch = ctx(json!({ "roles": ["guest"] }));

  assert_eq!(merge(&base, &patch).into_value(), json!({ "roles": ["guest"] }));
}

#[test]
fn test_explicit_null_overrides_but_absent_keys_are_kept() {
  setup_tracing();
  let base = ctx(json!({ "session": { "token": "abc", "expires": 10 }, "keep": true }));
  let patch = ctx(json!({ "session": { "token": null } }));

  let merged = merge(&base, &patch);

  assert_eq!(
    merged.into_value(),
    json!({ "session": { "token": null, "expires": 10 }, "keep": true })
  );
}

#[test]
fn test_scalar_replaces_object_and_object_replaces_scalar() {
  setup_tracing();
  assert_eq!(merge_values(&json!({ "a": 1 }), &json!(5)), json!(5));
  assert_eq!(merge_values(&json!("text"), &json!({ "a": 1 })), json!({ "a": 1 }));
  assert_eq!(merge_values(&json!({ "a": 1 }), &json!([1])), json!([1]));
}

#[test]
fn test_merge_does_not_mutate_inputs() {
  setup_tracing();
  let base = ctx(json!({ "a": { "b": 1 } }));
  let patch = ctx(json!({ "a": { "c": 2 } }));
  let base_before = base.clone();
  let patch_before = patch.clone();

  let merged = base.merge(&patch);

  assert_eq!(base, base_before);
  assert_eq!(patch, patch_before);
  assert_eq!(merged.into_value(), json!({ "a": { "b": 1, "c": 2 } }));
}

#[test]
fn test_deeply_nested_objects_merge_at_every_level() {
  setup_tracing();
  let depth = 20;
  let mut base = json!({ "base_leaf": 0 });
  let mut patch = json!({ "patch_leaf": 1 });
  for level in 0..depth {
    base = json!({ format!("level{}", level): base, "base_marker": level });
    patch = json!({ format!("level{}", level): patch, "patch_marker": level });
  }

  let merged = merge_values(&base, &patch);

  let mut current = &merged;
  for level in (0..depth).rev() {
    assert_eq!(current["base_marker"], json!(level));
    assert_eq!(current["patch_marker"], json!(level));
    current = &current[format!("level{}", level)];
  }
  assert_eq!(current, &json!({ "base_leaf": 0, "patch_leaf": 1 }));
}

#[test]
fn test_context_accessors() {
  setup_tracing();
  let context = ctx(json!({ "request": { "id": "req-1" }, "count": 2 }));

  assert_eq!(context.len(), 2);
  assert!(context.contains_path("request.id"));
  assert!(!context.contains_path("request.missing"));
  assert_eq!(context.get_as::<u32>("count").unwrap(), 2);
  assert_eq!(context.get("count"), Some(&json!(2)));
  assert!(context.get_as::<String>("missing").is_err());

  let round_trip = Context::try_from(context.clone().into_value()).unwrap();
  assert_eq!(round_trip, context);
  assert!(Context::try_from(json!([1, 2])).is_err());
}
