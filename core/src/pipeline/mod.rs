// pilgrim/src/pipeline/mod.rs

//! Defines the `Pipeline<S, E, C>` builder, the middleware and handler contracts,
//! and the fold that composes them into an `Invocation`.

pub mod definition;
pub mod execution;
pub mod handler;
pub mod middleware;
pub(crate) mod validation;

// Re-export the main Pipeline struct
pub use definition::Pipeline;
pub use execution::Invocation;
