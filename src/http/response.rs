use crate::error::Error;
use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// When true, no further middleware or handlers run for this request
	stop_chain: bool,
}

impl Response {
	/// Create a new response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use planboard::http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			stop_chain: false,
		}
	}

	/// HTTP 200 OK
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// HTTP 201 Created
	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	/// HTTP 204 No Content
	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	/// HTTP 400 Bad Request
	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	/// HTTP 401 Unauthorized
	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	/// HTTP 404 Not Found
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// HTTP 405 Method Not Allowed
	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	/// HTTP 409 Conflict
	pub fn conflict() -> Self {
		Self::new(StatusCode::CONFLICT)
	}

	/// HTTP 500 Internal Server Error
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Set the response body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a header, ignoring invalid names or values
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Serialize `data` as the JSON body and set the Content-Type header
	///
	/// # Examples
	///
	/// ```
	/// use planboard::http::Response;
	/// use serde_json::json;
	///
	/// let body = json!({"detail": "WorkPackage deleted successfully!"});
	/// let response = Response::ok().with_json(&body).unwrap();
	///
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap().to_str().unwrap(),
	///     "application/json"
	/// );
	/// ```
	pub fn with_json<T: Serialize>(mut self, data: &T) -> crate::error::Result<Self> {
		let json = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
		self.body = Bytes::from(json);
		self.headers.insert(
			hyper::header::CONTENT_TYPE,
			hyper::header::HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// Whether the middleware chain should stop after this response
	pub fn should_stop_chain(&self) -> bool {
		self.stop_chain
	}

	/// Mark this response as terminating the middleware chain.
	///
	/// Used for early returns such as CORS preflight answers and
	/// authentication failures.
	pub fn with_stop_chain(mut self, stop: bool) -> Self {
		self.stop_chain = stop;
		self
	}
}

/// Map an error kind to its wire shape: the kind's status code with a
/// `{"error": <reason>}` JSON body.
///
/// # Examples
///
/// ```
/// use planboard::error::Error;
/// use planboard::http::Response;
/// use hyper::StatusCode;
///
/// let response = Response::from(Error::NotFound("Task not found.".to_string()));
/// assert_eq!(response.status, StatusCode::NOT_FOUND);
///
/// let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
/// assert_eq!(body["error"], "Task not found.");
/// ```
impl From<Error> for Response {
	fn from(error: Error) -> Self {
		let status =
			StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let body = serde_json::json!({
			"error": error.to_string(),
		});

		Response::new(status)
			.with_json(&body)
			.unwrap_or_else(|_| Response::internal_server_error())
	}
}
