use crate::error::{Error, Result};
use crate::http::Extensions;
use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;

/// HTTP request representation.
///
/// Wraps the raw hyper parts with the fully buffered body plus the
/// parsed query string, the path parameters filled in by the router,
/// and an [`Extensions`] map for middleware-to-handler state.
#[derive(Debug)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub path_params: HashMap<String, String>,
	pub query_params: HashMap<String, String>,
	pub extensions: Extensions,
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		let query_params = Self::parse_query_params(&uri);
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			query_params,
			extensions: Extensions::new(),
			remote_addr: None,
		}
	}

	/// Start building a request (mainly useful in tests)
	///
	/// # Examples
	///
	/// ```
	/// use planboard::http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/workpackages/")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/api/workpackages/");
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// Parse query parameters from the URI
	fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		uri.query()
			.map(|q| {
				q.split('&')
					.filter_map(|pair| {
						// Split on the first '=' only so '=' survives in values
						let mut parts = pair.splitn(2, '=');
						Some((
							parts.next()?.to_string(),
							parts.next().unwrap_or("").to_string(),
						))
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// The request path
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// A single path parameter extracted by the router
	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	/// Set a path parameter (called by the router during dispatch)
	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}

	/// URL-decoded query parameters
	///
	/// # Examples
	///
	/// ```
	/// use planboard::http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/workpackages/?project=42")
	///     .build()
	///     .unwrap();
	///
	/// let params = request.decoded_query_params();
	/// assert_eq!(params.get("project"), Some(&"42".to_string()));
	/// ```
	pub fn decoded_query_params(&self) -> HashMap<String, String> {
		self.query_params
			.iter()
			.map(|(k, v)| {
				let key = percent_decode_str(k).decode_utf8_lossy().to_string();
				let value = percent_decode_str(v).decode_utf8_lossy().to_string();
				(key, value)
			})
			.collect()
	}

	/// A request header as a string, if present and valid UTF-8
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	/// Deserialize the request body as JSON
	///
	/// # Errors
	///
	/// Returns a validation error when the body is not valid JSON or does
	/// not match the expected shape.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		serde_json::from_slice(&self.body)
			.map_err(|e| Error::Validation(format!("Invalid JSON payload: {}", e)))
	}
}

/// Builder for [`Request`]
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	version: Option<Version>,
	headers: HeaderMap,
	body: Bytes,
	remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add one header, ignoring invalid names or values
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.unwrap_or_else(|| "/".to_string())
			.parse()
			.map_err(|e| Error::Validation(format!("Invalid request URI: {}", e)))?;

		let mut request = Request::new(
			self.method.unwrap_or(Method::GET),
			uri,
			self.version.unwrap_or(Version::HTTP_11),
			self.headers,
			self.body,
		);
		request.remote_addr = self.remote_addr;
		Ok(request)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde::Deserialize;

	#[rstest]
	fn test_parse_query_params_preserves_equals_in_value() {
		// Arrange
		let uri: Uri = "/api/budget/?token=abc==".parse().unwrap();

		// Act
		let params = Request::parse_query_params(&uri);

		// Assert
		assert_eq!(params.get("token"), Some(&"abc==".to_string()));
	}

	#[rstest]
	fn test_parse_query_params_multiple_pairs() {
		// Arrange
		let uri: Uri = "/api/tasks/?project=3&page=2".parse().unwrap();

		// Act
		let params = Request::parse_query_params(&uri);

		// Assert
		assert_eq!(params.get("project"), Some(&"3".to_string()));
		assert_eq!(params.get("page"), Some(&"2".to_string()));
	}

	#[rstest]
	fn test_parse_query_params_key_without_value() {
		let uri: Uri = "/api/tasks/?project=".parse().unwrap();
		let params = Request::parse_query_params(&uri);
		assert_eq!(params.get("project"), Some(&"".to_string()));
	}

	#[rstest]
	fn test_parse_query_params_no_query_string() {
		let uri: Uri = "/api/tasks/".parse().unwrap();
		assert!(Request::parse_query_params(&uri).is_empty());
	}

	#[rstest]
	fn test_decoded_query_params() {
		let request = Request::builder()
			.method(Method::GET)
			.uri("/api/users/?name=Jane%20Doe")
			.build()
			.unwrap();

		let decoded = request.decoded_query_params();
		assert_eq!(decoded.get("name"), Some(&"Jane Doe".to_string()));
	}

	#[rstest]
	fn test_json_body_parsing() {
		#[derive(Deserialize)]
		struct Payload {
			name: String,
		}

		let request = Request::builder()
			.method(Method::POST)
			.uri("/api/users/")
			.body(r#"{"name": "Ada"}"#)
			.build()
			.unwrap();

		let payload: Payload = request.json().unwrap();
		assert_eq!(payload.name, "Ada");
	}

	#[rstest]
	fn test_json_body_rejects_malformed_payload() {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/api/users/")
			.body("not json")
			.build()
			.unwrap();

		let result: Result<serde_json::Value> = request.json();
		assert!(matches!(result, Err(Error::Validation(_))));
	}

	#[rstest]
	fn test_set_path_param() {
		let mut request = Request::builder()
			.method(Method::GET)
			.uri("/api/users/123/")
			.build()
			.unwrap();

		request.set_path_param("id", "123");
		assert_eq!(request.path_param("id"), Some("123"));
	}
}
