//! Request handlers, one module per wire entity.
//!
//! Handlers follow one shape: read the caller identity, resolve the
//! project scope where the entity needs one, validate the payload,
//! delegate to the store, shape the response. Errors bubble as kinds;
//! the transport layer turns them into status codes.

use hyper::Method;

use crate::auth::AuthContext;
use crate::error::{Error, Result};
use crate::http::{Request, Response};

pub mod auth;
pub mod budget;
pub mod deliverables;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod work_packages;

/// Caller identity stored by the auth middleware. Handlers never run
/// without it on protected paths; the error covers direct handler
/// invocation (tests, future internal dispatch).
pub(crate) fn require_auth(request: &Request) -> Result<AuthContext> {
	request
		.extensions
		.get::<AuthContext>()
		.ok_or_else(|| Error::Authentication("Authentication credentials were not provided.".to_string()))
}

/// Parses the `{id}` path segment. Non-numeric ids answer like missing
/// rows, matching a route constrained to integers.
pub(crate) fn item_id(request: &Request, not_found: &str) -> Result<i64> {
	request
		.path_param("id")
		.and_then(|raw| raw.parse().ok())
		.ok_or_else(|| Error::NotFound(not_found.to_string()))
}

pub(crate) fn method_not_allowed(method: &Method) -> Error {
	Error::MethodNotAllowed(format!("Method {} not allowed.", method))
}

/// 200 with the `{"detail": "<Noun> deleted successfully!"}` body.
pub(crate) fn deleted(noun: &str) -> Result<Response> {
	Response::ok().with_json(&serde_json::json!({
		"detail": format!("{} deleted successfully!", noun),
	}))
}
