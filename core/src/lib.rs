// src/lib.rs

//! Pilgrim: composable middleware chains for serverless function handlers.
//!
//! A chain is declared once and compiled into whatever signature a provider's host
//! runtime calls:
//!  - Middleware enrich a JSON `Context` and/or transform the downstream `Response`.
//!  - Each middleware's partial context is deep-merged over the context it received.
//!  - A terminal handler produces the `Response`; middleware may short-circuit instead.
//!  - A `Composer` adapts the composed `(source, context) -> Response` invocation to the
//!    host, translating response types into native return values.
//!  - Optional shape declarations are validated when the chain is finalized.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod provider;

// --- Re-exports for the Public API ---

pub use crate::core::context::{merge, merge_values, Context};
pub use crate::core::response::{self as response, HttpResponseData, Response};
pub use crate::core::shape::{HandlerShape, MiddlewareShape, Shape};

pub use crate::pipeline::handler::{self as handler, Handler, HandlerTooling, SourceHandler, SourceHandlerTooling};
pub use crate::pipeline::middleware::{self as middleware, BoxFuture, Middleware, Next, Tooling};
pub use crate::pipeline::{Invocation, Pipeline};

pub use crate::provider::Composer;

pub use crate::error::{PilgrimError, PilgrimResult};

/*
    Core Workflow:
    1. Pick or write a `Composer` for the host runtime (e.g. `provider::lambda::lambda()`).
    2. Chain `.using(..)` with middleware, in the order they should see the request.
    3. Finish with `.handle(..)` (context only) or `.handle_with_source(..)`.
    4. Hand the composer's output to the host runtime.
*/
