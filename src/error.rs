use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Application error kinds.
///
/// Validators and the store return kinds, never status codes; the HTTP
/// layer maps each kind to its status via [`Error::status_code`].
///
/// # Examples
///
/// ```
/// use planboard::error::Error;
///
/// let err = Error::NotFound("WorkPackage not found.".to_string());
/// assert_eq!(err.status_code(), 404);
/// assert_eq!(err.to_string(), "WorkPackage not found.");
/// ```
#[derive(Debug, Error)]
pub enum Error {
	/// Payload or cross-entity invariant violation
	#[error("{0}")]
	Validation(String),

	/// No project identifier supplied with a project-scoped request
	#[error("{0}")]
	MissingScope(String),

	/// Missing or invalid credentials
	#[error("{0}")]
	Authentication(String),

	/// Absent id, or a row filtered out by the caller's project scope.
	/// "Exists but owned by someone else" is deliberately reported the
	/// same way so other tenants' ids cannot be probed.
	#[error("{0}")]
	NotFound(String),

	/// Known path, unsupported HTTP method
	#[error("{0}")]
	MethodNotAllowed(String),

	/// Uniqueness invariant would be violated
	#[error("{0}")]
	Conflict(String),

	/// Response body could not be serialized
	#[error("{0}")]
	Serialization(String),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("{0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code for this error kind
	pub fn status_code(&self) -> u16 {
		match self {
			Error::Validation(_) | Error::MissingScope(_) => 400,
			Error::Authentication(_) => 401,
			Error::NotFound(_) => 404,
			Error::MethodNotAllowed(_) => 405,
			Error::Conflict(_) => 409,
			Error::Serialization(_) | Error::Database(_) | Error::Internal(_) => 500,
		}
	}
}
