//! WorkPackage endpoints.
//!
//! All methods run under a resolved project scope. Writes check the
//! week window (`start_week <= end_week`) and that every id in `users`
//! names an existing member before any row is touched; a partial
//! update merges the stored row with the patch and validates the
//! merged result, so a patch cannot sneak an inverted window past the
//! checks.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::models::WorkPackage;
use crate::scope::resolve_scope;
use crate::serializers::{WorkPackagePatch, WorkPackageSerializer, validate_payload};
use crate::store;
use crate::validators::{validate_members_exist, validate_week_order};
use crate::views::{deleted, item_id, method_not_allowed, require_auth};

const NOT_FOUND: &str = "WorkPackage not found.";

async fn check_members(pool: &SqlitePool, proposed: &[i64]) -> Result<()> {
	let known = store::members::names(pool, proposed).await?;
	validate_members_exist(&known, proposed)?;
	Ok(())
}

pub struct WorkPackageCollection {
	pool: SqlitePool,
}

impl WorkPackageCollection {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for WorkPackageCollection {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;

		match request.method.as_str() {
			"GET" => {
				let packages = store::work_packages::list(&self.pool, scope.project_id).await?;
				Response::ok().with_json(&packages)
			}
			"POST" => {
				let payload: WorkPackageSerializer = request.json()?;
				validate_payload(&payload)?;
				validate_week_order(payload.start_week, payload.end_week)?;
				check_members(&self.pool, &payload.users).await?;

				let created = store::work_packages::create(
					&self.pool,
					&WorkPackage {
						id: 0,
						project_id: scope.project_id,
						name: payload.name,
						description: payload.description,
						start_week: payload.start_week,
						end_week: payload.end_week,
						status: payload.status,
						member_ids: payload.users,
					},
				)
				.await?;
				tracing::info!(
					work_package_id = created.id,
					project_id = scope.project_id,
					"work package created"
				);
				Response::created().with_json(&created)
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

pub struct WorkPackageItem {
	pool: SqlitePool,
}

impl WorkPackageItem {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for WorkPackageItem {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;
		let id = item_id(&request, NOT_FOUND)?;

		match request.method.as_str() {
			"GET" => {
				let package = store::work_packages::get(&self.pool, scope.project_id, id).await?;
				Response::ok().with_json(&package)
			}
			"PUT" => {
				let payload: WorkPackageSerializer = request.json()?;
				validate_payload(&payload)?;
				validate_week_order(payload.start_week, payload.end_week)?;
				check_members(&self.pool, &payload.users).await?;

				let updated = store::work_packages::update(
					&self.pool,
					scope.project_id,
					id,
					&WorkPackage {
						id,
						project_id: scope.project_id,
						name: payload.name,
						description: payload.description,
						start_week: payload.start_week,
						end_week: payload.end_week,
						status: payload.status,
						member_ids: payload.users,
					},
				)
				.await?;
				Response::ok().with_json(&updated)
			}
			"PATCH" => {
				let stored = store::work_packages::get(&self.pool, scope.project_id, id).await?;
				let patch: WorkPackagePatch = request.json()?;
				validate_payload(&patch)?;

				let merged = WorkPackage {
					id,
					project_id: scope.project_id,
					name: patch.name.unwrap_or(stored.name),
					description: patch.description.unwrap_or(stored.description),
					start_week: patch.start_week.unwrap_or(stored.start_week),
					end_week: patch.end_week.unwrap_or(stored.end_week),
					status: patch.status.unwrap_or(stored.status),
					member_ids: patch.users.unwrap_or(stored.member_ids),
				};
				validate_week_order(merged.start_week, merged.end_week)?;
				check_members(&self.pool, &merged.member_ids).await?;

				let updated =
					store::work_packages::update(&self.pool, scope.project_id, id, &merged).await?;
				Response::ok().with_json(&updated)
			}
			"DELETE" => {
				store::work_packages::delete(&self.pool, scope.project_id, id).await?;
				tracing::info!(
					work_package_id = id,
					project_id = scope.project_id,
					"work package deleted"
				);
				deleted("WorkPackage")
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::auth::AuthContext;
	use crate::error::Error;
	use hyper::{Method, StatusCode};

	async fn seeded() -> (SqlitePool, AuthContext, i64) {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let account = store::accounts::create(&pool, "alice", "a@example.com", "hash")
			.await
			.unwrap();
		let project =
			store::projects::create(&pool, account.id, "Study", "2026-01-15".parse().unwrap())
				.await
				.unwrap();
		let auth = AuthContext {
			account_id: account.id,
			username: account.username,
		};
		(pool, auth, project.id)
	}

	fn scoped(
		method: Method,
		uri: &str,
		auth: &AuthContext,
		project_id: i64,
		body: Option<serde_json::Value>,
	) -> Request {
		let mut builder = Request::builder()
			.method(method)
			.uri(uri)
			.header("X-Project-Id", &project_id.to_string());
		if let Some(body) = body {
			builder = builder.body(serde_json::to_vec(&body).unwrap());
		}
		let request = builder.build().unwrap();
		request.extensions.insert(auth.clone());
		request
	}

	#[tokio::test]
	async fn test_create_defaults_and_status() {
		let (pool, auth, project) = seeded().await;
		let collection = WorkPackageCollection::new(pool);

		let response = collection
			.handle(scoped(
				Method::POST,
				"/api/workpackages/",
				&auth,
				project,
				Some(serde_json::json!({"name": "WP1", "start_week": 1, "end_week": 10})),
			))
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::CREATED);
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body["status"], "active");
		assert_eq!(body["users"], serde_json::json!([]));
		assert_eq!(body["project"], project);
	}

	#[tokio::test]
	async fn test_inverted_window_is_rejected() {
		let (pool, auth, project) = seeded().await;
		let collection = WorkPackageCollection::new(pool);

		let err = collection
			.handle(scoped(
				Method::POST,
				"/api/workpackages/",
				&auth,
				project,
				Some(serde_json::json!({"name": "WP1", "start_week": 10, "end_week": 1})),
			))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::Validation(_)));
		assert_eq!(err.to_string(), "end_week cannot precede start_week.");
	}

	#[tokio::test]
	async fn test_unknown_member_is_rejected() {
		let (pool, auth, project) = seeded().await;
		let collection = WorkPackageCollection::new(pool);

		let err = collection
			.handle(scoped(
				Method::POST,
				"/api/workpackages/",
				&auth,
				project,
				Some(serde_json::json!({
					"name": "WP1", "start_week": 1, "end_week": 10, "users": [42],
				})),
			))
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "User with ID 42 not found.");
	}

	#[tokio::test]
	async fn test_missing_scope_is_rejected() {
		let (pool, auth, _) = seeded().await;
		let collection = WorkPackageCollection::new(pool);

		let request = Request::builder()
			.method(Method::GET)
			.uri("/api/workpackages/")
			.build()
			.unwrap();
		request.extensions.insert(auth.clone());

		let err = collection.handle(request).await.unwrap_err();
		assert!(matches!(err, Error::MissingScope(_)));
	}

	#[tokio::test]
	async fn test_patch_cannot_invert_window() {
		let (pool, auth, project) = seeded().await;
		let package = store::work_packages::create(
			&pool,
			&WorkPackage {
				id: 0,
				project_id: project,
				name: "WP1".to_string(),
				description: String::new(),
				start_week: 1,
				end_week: 10,
				status: crate::models::Status::Active,
				member_ids: Vec::new(),
			},
		)
		.await
		.unwrap();
		let item = WorkPackageItem::new(pool);

		let mut patch = scoped(
			Method::PATCH,
			&format!("/api/workpackages/{}/", package.id),
			&auth,
			project,
			Some(serde_json::json!({"end_week": 0})),
		);
		patch.set_path_param("id", package.id.to_string());

		let err = item.handle(patch).await.unwrap_err();
		assert_eq!(err.to_string(), "end_week cannot precede start_week.");
	}
}
