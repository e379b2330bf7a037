pub mod context;
pub mod response;
pub mod shape;

// Re-export key types for easier access from other Pilgrim modules (and lib.rs)
pub use context::Context;
pub use response::{HttpResponseData, Response};
pub use shape::{HandlerShape, MiddlewareShape, Shape};
