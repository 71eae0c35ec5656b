//! Budget endpoint: bulk read and bulk replace, no item routes.
//!
//! The wire format is the flat `"<wpId>_<memberId>_<month>": fraction`
//! object the planner frontend renders as a grid. Values go out as
//! JSON numbers even though they are stored as fixed-point decimals.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use sqlx::SqlitePool;

use crate::budget::{ReplaceOutcome, format_key, replace_budget};
use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::scope::resolve_scope;
use crate::store;
use crate::views::{method_not_allowed, require_auth};

pub struct BudgetView {
	pool: SqlitePool,
}

impl BudgetView {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for BudgetView {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;

		match request.method.as_str() {
			"GET" => {
				let entries = store::budget::fetch_for_project(&self.pool, scope.project_id).await?;
				let mut wire = BTreeMap::new();
				for entry in &entries {
					wire.insert(
						format_key(entry),
						entry.contribution.to_f64().unwrap_or_default(),
					);
				}
				Response::ok().with_json(&wire)
			}
			"POST" => {
				let submission: BTreeMap<String, f64> = request.json()?;
				match replace_budget(&self.pool, scope, &submission).await? {
					ReplaceOutcome::Replaced { saved } => {
						tracing::info!(project_id = scope.project_id, saved, "budget replaced");
						Response::ok().with_json(&serde_json::json!({ "saved": saved }))
					}
					ReplaceOutcome::Rejected { failures } => Response::bad_request()
						.with_json(&serde_json::json!({
							"error": "Budget replace failed.",
							"failures": failures,
						})),
				}
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::auth::AuthContext;
	use crate::models::{Status, WorkPackage};
	use hyper::{Method, StatusCode};

	async fn seeded() -> (SqlitePool, AuthContext, i64, i64, i64) {
		let pool = store::connect("sqlite::memory:").await.unwrap();
		let account = store::accounts::create(&pool, "alice", "a@example.com", "hash")
			.await
			.unwrap();
		let project =
			store::projects::create(&pool, account.id, "Study", "2026-01-15".parse().unwrap())
				.await
				.unwrap();
		let package = store::work_packages::create(
			&pool,
			&WorkPackage {
				id: 0,
				project_id: project.id,
				name: "WP1".to_string(),
				description: String::new(),
				start_week: 1,
				end_week: 12,
				status: Status::Active,
				member_ids: Vec::new(),
			},
		)
		.await
		.unwrap();
		let member = store::members::create(&pool, "Ada", "100".parse().unwrap())
			.await
			.unwrap();
		let auth = AuthContext {
			account_id: account.id,
			username: account.username,
		};
		(pool, auth, project.id, package.id, member.id)
	}

	fn scoped(
		method: Method,
		auth: &AuthContext,
		project_id: i64,
		body: Option<serde_json::Value>,
	) -> Request {
		let mut builder = Request::builder()
			.method(method)
			.uri("/api/budget/")
			.header("X-Project-Id", &project_id.to_string());
		if let Some(body) = body {
			builder = builder.body(serde_json::to_vec(&body).unwrap());
		}
		let request = builder.build().unwrap();
		request.extensions.insert(auth.clone());
		request
	}

	#[tokio::test]
	async fn test_replace_then_read_back_as_numbers() {
		let (pool, auth, project, package, member) = seeded().await;
		let view = BudgetView::new(pool);

		let key = format!("{}_{}_2", package, member);
		let response = view
			.handle(scoped(
				Method::POST,
				&auth,
				project,
				Some(serde_json::json!({ key.clone(): 0.5 })),
			))
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body["saved"], 1);

		let response = view
			.handle(scoped(Method::GET, &auth, project, None))
			.await
			.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert!(body[&key].is_number());
		assert_eq!(body[&key], 0.5);
	}

	#[tokio::test]
	async fn test_rejection_reports_failures() {
		let (pool, auth, project, package, member) = seeded().await;
		let view = BudgetView::new(pool);

		let response = view
			.handle(scoped(
				Method::POST,
				&auth,
				project,
				Some(serde_json::json!({
					format!("{}_{}_1", package, member): 0.5,
					"broken": 0.25,
				})),
			))
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body["error"], "Budget replace failed.");
		assert_eq!(body["failures"][0]["key"], "broken");
		assert_eq!(body["failures"][0]["reason"], "Malformed key.");
	}

	#[tokio::test]
	async fn test_empty_budget_reads_as_empty_object() {
		let (pool, auth, project, _, _) = seeded().await;
		let view = BudgetView::new(pool);

		let response = view
			.handle(scoped(Method::GET, &auth, project, None))
			.await
			.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body, serde_json::json!({}));
	}

	#[tokio::test]
	async fn test_put_is_not_allowed() {
		let (pool, auth, project, _, _) = seeded().await;
		let view = BudgetView::new(pool);

		let err = view
			.handle(scoped(
				Method::PUT,
				&auth,
				project,
				Some(serde_json::json!({})),
			))
			.await
			.unwrap_err();
		assert!(matches!(err, crate::error::Error::MethodNotAllowed(_)));
	}
}
