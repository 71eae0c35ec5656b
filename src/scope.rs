//! Active-project resolution.
//!
//! Work packages, tasks, deliverables and budget entries only exist
//! relative to a project. Clients name the active project per request,
//! either in the `X-Project-Id` header or a `project` query parameter;
//! the header wins when both are present. The resolved project must
//! belong to the authenticated account, and a project that exists but
//! belongs to someone else answers exactly like a missing one.

use sqlx::SqlitePool;

use crate::auth::AuthContext;
use crate::error::{Error, Result};
use crate::http::Request;
use crate::store;

pub const SCOPE_HEADER: &str = "x-project-id";
pub const SCOPE_QUERY_PARAM: &str = "project";

/// A verified (project, account) pair every scoped handler runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectScope {
	pub project_id: i64,
	pub account_id: i64,
}

fn scope_candidate(request: &Request) -> Option<String> {
	if let Some(value) = request.header(SCOPE_HEADER) {
		return Some(value.to_string());
	}
	request.query_params.get(SCOPE_QUERY_PARAM).cloned()
}

/// Resolves the request's project scope against the caller's account.
pub async fn resolve_scope(
	pool: &SqlitePool,
	auth: &AuthContext,
	request: &Request,
) -> Result<ProjectScope> {
	let Some(raw) = scope_candidate(request) else {
		return Err(Error::MissingScope("No project selected.".to_string()));
	};
	let project_id: i64 = raw
		.trim()
		.parse()
		.map_err(|_| Error::MissingScope("Invalid project identifier.".to_string()))?;

	// Ownership check; a foreign or absent id is the same NotFound.
	let project = store::projects::get(pool, auth.account_id, project_id).await?;

	Ok(ProjectScope {
		project_id: project.id,
		account_id: auth.account_id,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::Method;

	async fn seed(pool: &SqlitePool) -> (AuthContext, i64) {
		let account = store::accounts::create(pool, "alice", "a@example.com", "hash")
			.await
			.unwrap();
		let project =
			store::projects::create(pool, account.id, "Study", "2026-01-15".parse().unwrap())
				.await
				.unwrap();
		let auth = AuthContext {
			account_id: account.id,
			username: account.username.clone(),
		};
		(auth, project.id)
	}

	fn request_with_header(project_id: &str) -> Request {
		Request::builder()
			.method(Method::GET)
			.uri("/api/workpackages/")
			.header("X-Project-Id", project_id)
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn test_header_carries_the_scope() {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let (auth, project_id) = seed(&pool).await;

		let request = request_with_header(&project_id.to_string());
		let scope = resolve_scope(&pool, &auth, &request).await.unwrap();
		assert_eq!(scope.project_id, project_id);
		assert_eq!(scope.account_id, auth.account_id);
	}

	#[tokio::test]
	async fn test_query_param_is_the_fallback() {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let (auth, project_id) = seed(&pool).await;

		let request = Request::builder()
			.method(Method::GET)
			.uri(&format!("/api/workpackages/?project={}", project_id))
			.build()
			.unwrap();
		let scope = resolve_scope(&pool, &auth, &request).await.unwrap();
		assert_eq!(scope.project_id, project_id);
	}

	#[tokio::test]
	async fn test_header_wins_over_query_param() {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let (auth, project_id) = seed(&pool).await;

		let request = Request::builder()
			.method(Method::GET)
			.uri("/api/workpackages/?project=9999")
			.header("X-Project-Id", &project_id.to_string())
			.build()
			.unwrap();
		let scope = resolve_scope(&pool, &auth, &request).await.unwrap();
		assert_eq!(scope.project_id, project_id);
	}

	#[tokio::test]
	async fn test_missing_scope() {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let (auth, _) = seed(&pool).await;

		let request = Request::builder()
			.method(Method::GET)
			.uri("/api/workpackages/")
			.build()
			.unwrap();
		let err = resolve_scope(&pool, &auth, &request).await.unwrap_err();
		assert!(matches!(err, Error::MissingScope(_)));
		assert_eq!(err.to_string(), "No project selected.");
	}

	#[tokio::test]
	async fn test_non_integer_scope() {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let (auth, _) = seed(&pool).await;

		let err = resolve_scope(&pool, &auth, &request_with_header("abc"))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::MissingScope(_)));
		assert_eq!(err.to_string(), "Invalid project identifier.");
	}

	#[tokio::test]
	async fn test_foreign_project_reads_as_not_found() {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let (_, project_id) = seed(&pool).await;
		let other_account = store::accounts::create(&pool, "bob", "b@example.com", "hash")
			.await
			.unwrap();
		let intruder = AuthContext {
			account_id: other_account.id,
			username: other_account.username.clone(),
		};

		let err = resolve_scope(&pool, &intruder, &request_with_header(&project_id.to_string()))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::NotFound(_)));
		assert_eq!(err.to_string(), "Project not found.");
	}
}
