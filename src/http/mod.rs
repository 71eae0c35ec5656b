//! HTTP primitives: request/response types, the handler trait, and
//! the middleware chain they compose into.

pub mod extensions;
pub mod handler;
pub mod request;
pub mod response;

pub use extensions::Extensions;
pub use handler::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;
