//! Handler and middleware traits for request processing.
//!
//! Every endpoint implements [`Handler`]; cross-cutting concerns
//! (logging, CORS, authentication) implement [`Middleware`] and are
//! composed in front of the router with [`MiddlewareChain`].
//!
//! ```rust
//! use planboard::http::{Handler, Request, Response};
//! use async_trait::async_trait;
//!
//! struct Health;
//!
//! #[async_trait]
//! impl Handler for Health {
//!     async fn handle(&self, _request: Request) -> planboard::error::Result<Response> {
//!         Ok(Response::ok().with_body("ok"))
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::http::{Request, Response};

/// Handler trait for processing requests.
///
/// # Errors
///
/// Returns an error if the request cannot be processed.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Blanket implementation so `Arc<dyn Handler>` is itself a Handler,
/// enabling shared ownership of handlers across tasks.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing.
///
/// Middleware can modify the request before passing it along, or modify
/// the response on the way back out.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Process a request, calling `next` to continue the chain.
	///
	/// # Errors
	///
	/// Returns an error if the middleware or the next handler fails.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Whether this middleware should run for the given request.
	///
	/// Returning false skips the middleware entirely; used to bypass
	/// authentication on public endpoints.
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Composes middleware into a single handler.
///
/// Middleware run in the order they were added; the innermost handler
/// runs last.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Add a middleware using the builder pattern
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	/// Add a middleware
	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		if self.middlewares.is_empty() {
			return self.handler.handle(request).await;
		}

		// Wrap the handler from the inside out, skipping middleware whose
		// should_continue declines this request.
		let mut current_handler = self.handler.clone();

		let active_middlewares: Vec<_> = self
			.middlewares
			.iter()
			.rev()
			.filter(|mw| mw.should_continue(&request))
			.collect();

		for middleware in active_middlewares {
			let mw = middleware.clone();
			let handler = current_handler.clone();

			current_handler = Arc::new(ComposedHandler {
				middleware: mw,
				next: handler,
			});
		}

		current_handler.handle(request).await
	}
}

/// One middleware layered over the next handler.
///
/// Honors `response.should_stop_chain()` for early termination.
struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		let response = self.middleware.process(request, self.next.clone()).await?;

		if response.should_stop_chain() {
			return Ok(response);
		}

		Ok(response)
	}
}
