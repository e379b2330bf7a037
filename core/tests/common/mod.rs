// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use pilgrim::{provider, response, Context, Invocation, PilgrimError, Pipeline, Response};
use serde_json::json;
use std::future::Future;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Source ---
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestSource {
  pub test: bool,
  pub payload: String,
}

pub fn test_source() -> TestSource {
  TestSource {
    test: true,
    payload: "source-payload".to_string(),
  }
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Pilgrim framework error: {0}")]
  Pilgrim(String),

  #[error("Test middleware failed: {0}")]
  Middleware(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<PilgrimError> for TestError {
  fn from(pe: PilgrimError) -> Self {
    TestError::Pilgrim(pe.to_string())
  }
}

// --- Response helpers ---
pub const STRING: &str = "test:string";
pub const HTTP: &str = "test:http";

pub fn str_response<V: Into<String>>(value: V) -> Response {
  response::create(STRING, value.into())
}

pub fn unwrap_str(response: Response) -> String {
  match response::unwrap(response) {
    serde_json::Value::String(s) => s,
    other => panic!("Expected a string response value, got {}", other),
  }
}

// --- Composers ---

pub type TestInvocation = Invocation<TestSource, TestError>;
pub type IdentityComposer = provider::FnComposer<TestSource, TestError, fn(TestInvocation) -> TestInvocation>;

pub fn identity(invocation: TestInvocation) -> TestInvocation {
  invocation
}

/// Hands back the invocation itself, so tests can call it directly.
pub fn identity_composer() -> IdentityComposer {
  provider::from_fn(identity as fn(TestInvocation) -> TestInvocation)
}

pub fn identity_pipeline() -> Pipeline<TestSource, TestError, IdentityComposer> {
  Pipeline::new(identity_composer())
}

/// Supplies `{ from: <from> }` as the initial context and renders the response value.
pub fn text_composer(
  from: &'static str,
) -> provider::FnComposer<
  TestSource,
  TestError,
  impl FnOnce(Invocation<TestSource, TestError>) -> TextFunction,
> {
  provider::from_fn(move |invocation: Invocation<TestSource, TestError>| TextFunction { invocation, from })
    .with_context_shape(["from"])
}

pub struct TextFunction {
  invocation: Invocation<TestSource, TestError>,
  from: &'static str,
}

impl TextFunction {
  pub fn call(&self) -> impl Future<Output = Result<String, TestError>> + Send + 'static {
    let invocation = self.invocation.clone();
    let initial = Context::new().with("from", self.from);
    async move {
      let previous = invocation.invoke(test_source(), initial).await?;
      Ok(format!("text-composer({})", json!(response::unwrap(previous))))
    }
  }
}

pub fn initial_context() -> Context {
  Context::from_value(json!({ "from": "pass-through-context-value" })).unwrap()
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static HANDLER_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static DOWNSTREAM_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  HANDLER_EXEC_COUNTER.store(0, Ordering::SeqCst);
  DOWNSTREAM_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
