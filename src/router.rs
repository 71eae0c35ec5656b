//! URL routing.
//!
//! Routes are declared with Django-style patterns (`/api/project/{id}/`)
//! and matched in registration order. A trailing slash in the request
//! path is optional: `/api/project/3` and `/api/project/3/` resolve to
//! the same route.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::error::{Error, Result};
use crate::http::{Handler, Request, Response};

/// A compiled path pattern.
///
/// `{name}` captures one path segment (anything except `/`); literal
/// text matches exactly.
#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	regex: Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	/// Compile a pattern string.
	///
	/// # Errors
	///
	/// Returns an error if the pattern compiles to an invalid regex.
	pub fn new(pattern: &str) -> Result<Self> {
		let (regex_str, param_names) = Self::compile_pattern(pattern);
		let regex = Regex::new(&regex_str)
			.map_err(|e| Error::Internal(format!("Failed to compile pattern regex: {}", e)))?;

		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
		})
	}

	fn compile_pattern(pattern: &str) -> (String, Vec<String>) {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		// The trailing slash is appended as an optional suffix below.
		let mut chars = pattern.trim_end_matches('/').chars().peekable();

		while let Some(c) = chars.next() {
			match c {
				'{' => {
					let mut param = String::new();
					while let Some(next) = chars.next() {
						if next == '}' {
							break;
						}
						param.push(next);
					}

					regex_str.push_str(&format!("(?P<{}>[^/]+)", param));
					param_names.push(param);
				}
				'/' | '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '^' | '$' | '|' | '\\' => {
					regex_str.push('\\');
					regex_str.push(c);
				}
				_ => {
					regex_str.push(c);
				}
			}
		}

		regex_str.push_str("/?$");
		(regex_str, param_names)
	}

	/// The original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Match a path, returning captured parameters on success.
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		self.regex.captures(path).map(|caps| {
			self.param_names
				.iter()
				.filter_map(|name| {
					caps.name(name)
						.map(|m| (name.clone(), m.as_str().to_string()))
				})
				.collect()
		})
	}
}

/// Route definition pairing a path pattern with a handler.
#[derive(Clone)]
pub struct Route {
	pub path: String,
	handler: Arc<dyn Handler>,
	pub name: Option<String>,
}

impl Route {
	pub fn new(path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
		Self {
			path: path.into(),
			handler,
			name: None,
		}
	}

	/// Set the name of the route
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn handler(&self) -> &dyn Handler {
		&*self.handler
	}
}

/// Shorthand for `Route::new`
pub fn path(p: impl Into<String>, handler: Arc<dyn Handler>) -> Route {
	Route::new(p, handler)
}

/// Request router matching paths in registration order.
#[derive(Default)]
pub struct Router {
	routes: Vec<(PathPattern, Route)>,
}

impl Router {
	pub fn new() -> Self {
		Self { routes: Vec::new() }
	}

	/// Register a route.
	///
	/// Panics on an invalid pattern; routes are declared statically at
	/// startup, so a bad pattern is a programming error.
	pub fn add_route(&mut self, route: Route) {
		let pattern = PathPattern::new(&route.path).expect("Invalid path pattern");
		self.routes.push((pattern, route));
	}

	/// Mount routes under the given prefix.
	pub fn mount(&mut self, prefix: &str, routes: Vec<Route>) {
		let prefix = prefix.trim_end_matches('/');

		for mut route in routes {
			let new_path = if route.path.starts_with('/') {
				format!("{}{}", prefix, route.path)
			} else {
				format!("{}/{}", prefix, route.path)
			};
			route.path = new_path;
			self.add_route(route);
		}
	}

	pub fn routes(&self) -> impl Iterator<Item = &Route> {
		self.routes.iter().map(|(_, route)| route)
	}

	/// Dispatch a request to the first matching route.
	///
	/// Handler errors are converted into HTTP responses here so that
	/// every layer above the router sees a concrete status code.
	pub async fn route(&self, mut request: Request) -> Result<Response> {
		let path = request.path().to_string();

		for (pattern, route) in &self.routes {
			if let Some(params) = pattern.matches(&path) {
				request.path_params = params;
				return match route.handler().handle(request).await {
					Ok(response) => Ok(response),
					Err(err) => Ok(Response::from(err)),
				};
			}
		}

		Ok(Response::from(Error::NotFound(format!(
			"No route found for {}",
			path
		))))
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.route(request).await
	}
}
