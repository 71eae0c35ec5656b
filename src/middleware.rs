//! Application middleware: request logging, CORS, and JWT authentication.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::auth::{AuthContext, JwtAuth};
use crate::error::{Error, Result};
use crate::http::{Handler, Middleware, Request, Response};

/// Logging middleware
///
/// Logs each request with its method, path, status code, and duration.
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

impl Default for LoggingMiddleware {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.to_string();
		let path = request.path().to_string();

		let result = next.handle(request).await;

		let elapsed_ms = start.elapsed().as_millis();

		match &result {
			Ok(response) => {
				tracing::info!(
					%method,
					%path,
					status = response.status.as_u16(),
					elapsed_ms,
					"request"
				);
			}
			Err(err) => {
				tracing::warn!(%method, %path, error = %err, elapsed_ms, "request failed");
			}
		}

		result
	}
}

/// CORS middleware configuration
pub struct CorsConfig {
	pub allow_origins: Vec<String>,
	pub allow_methods: Vec<String>,
	pub allow_headers: Vec<String>,
	pub allow_credentials: bool,
	pub max_age: Option<u64>,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allow_origins: vec!["*".to_string()],
			allow_methods: vec![
				"GET".to_string(),
				"POST".to_string(),
				"PUT".to_string(),
				"PATCH".to_string(),
				"DELETE".to_string(),
				"OPTIONS".to_string(),
			],
			// X-Project-Id carries the project scope and must be allowed
			// for browser clients.
			allow_headers: vec![
				"Content-Type".to_string(),
				"Authorization".to_string(),
				"X-Project-Id".to_string(),
			],
			allow_credentials: false,
			max_age: Some(3600),
		}
	}
}

/// CORS middleware
pub struct CorsMiddleware {
	config: CorsConfig,
}

impl CorsMiddleware {
	pub fn new(config: CorsConfig) -> Self {
		Self { config }
	}

	/// Permissive CORS for development: all origins, common methods.
	pub fn permissive() -> Self {
		Self::new(CorsConfig::default())
	}
}

#[async_trait]
impl Middleware for CorsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		// Preflight requests are answered here and never reach the
		// auth middleware or the router.
		if request.method.as_str() == "OPTIONS" {
			let mut response = Response::no_content();

			response.headers.insert(
				hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN,
				hyper::header::HeaderValue::from_str(&self.config.allow_origins.join(", "))
					.unwrap_or_else(|_| hyper::header::HeaderValue::from_static("*")),
			);

			response.headers.insert(
				hyper::header::ACCESS_CONTROL_ALLOW_METHODS,
				hyper::header::HeaderValue::from_str(&self.config.allow_methods.join(", "))
					.unwrap_or_else(|_| hyper::header::HeaderValue::from_static("*")),
			);

			response.headers.insert(
				hyper::header::ACCESS_CONTROL_ALLOW_HEADERS,
				hyper::header::HeaderValue::from_str(&self.config.allow_headers.join(", "))
					.unwrap_or_else(|_| hyper::header::HeaderValue::from_static("*")),
			);

			if let Some(max_age) = self.config.max_age {
				response.headers.insert(
					hyper::header::ACCESS_CONTROL_MAX_AGE,
					hyper::header::HeaderValue::from_str(&max_age.to_string())
						.unwrap_or_else(|_| hyper::header::HeaderValue::from_static("3600")),
				);
			}

			if self.config.allow_credentials {
				response.headers.insert(
					hyper::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
					hyper::header::HeaderValue::from_static("true"),
				);
			}

			return Ok(response.with_stop_chain(true));
		}

		let mut response = next.handle(request).await?;

		response.headers.insert(
			hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN,
			hyper::header::HeaderValue::from_str(&self.config.allow_origins.join(", "))
				.unwrap_or_else(|_| hyper::header::HeaderValue::from_static("*")),
		);

		if self.config.allow_credentials {
			response.headers.insert(
				hyper::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
				hyper::header::HeaderValue::from_static("true"),
			);
		}

		Ok(response)
	}
}

/// JWT authentication middleware.
///
/// Extracts the bearer token from the `Authorization` header, verifies it
/// as an access token, and attaches an [`AuthContext`] to the request
/// extensions. Requests to a public path bypass the check entirely via
/// [`Middleware::should_continue`].
pub struct AuthMiddleware {
	jwt: Arc<JwtAuth>,
	public_paths: Vec<String>,
}

impl AuthMiddleware {
	pub fn new(jwt: Arc<JwtAuth>) -> Self {
		Self {
			jwt,
			public_paths: vec!["/api/register".to_string(), "/api/token".to_string()],
		}
	}

	/// Add another path prefix that skips authentication
	pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
		self.public_paths.push(path.into());
		self
	}

	fn is_public(&self, path: &str) -> bool {
		let path = path.trim_end_matches('/');
		self.public_paths.iter().any(|prefix| {
			let prefix = prefix.trim_end_matches('/');
			path == prefix || path.starts_with(&format!("{}/", prefix))
		})
	}
}

#[async_trait]
impl Middleware for AuthMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let token = match request
			.header("authorization")
			.and_then(|h| h.strip_prefix("Bearer "))
		{
			Some(token) => token.to_string(),
			None => {
				return Ok(Response::from(Error::Authentication(
					"Authentication credentials were not provided.".to_string(),
				))
				.with_stop_chain(true));
			}
		};

		let claims = match self.jwt.verify_access(&token) {
			Ok(claims) => claims,
			Err(err) => return Ok(Response::from(err).with_stop_chain(true)),
		};

		let account_id = match claims.sub.parse::<i64>() {
			Ok(id) => id,
			Err(_) => {
				return Ok(Response::from(Error::Authentication(
					"Token is invalid or expired".to_string(),
				))
				.with_stop_chain(true));
			}
		};

		request.extensions.insert(AuthContext {
			account_id,
			username: claims.username,
		});

		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		!self.is_public(request.path())
	}
}
