//! Project endpoints.
//!
//! Projects are scoped by the authenticated account directly; they are
//! the one entity reachable without an `X-Project-Id` header, since
//! clients list them to pick the active project in the first place.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::serializers::{ProjectPatch, ProjectSerializer, validate_payload};
use crate::store;
use crate::views::{deleted, item_id, method_not_allowed, require_auth};

const NOT_FOUND: &str = "Project not found.";

pub struct ProjectCollection {
	pool: SqlitePool,
}

impl ProjectCollection {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for ProjectCollection {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		match request.method.as_str() {
			"GET" => {
				let projects = store::projects::list(&self.pool, auth.account_id).await?;
				Response::ok().with_json(&projects)
			}
			"POST" => {
				let payload: ProjectSerializer = request.json()?;
				validate_payload(&payload)?;
				let created = store::projects::create(
					&self.pool,
					auth.account_id,
					&payload.name,
					payload.start_date,
				)
				.await?;
				tracing::info!(project_id = created.id, "project created");
				Response::created().with_json(&created)
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

pub struct ProjectItem {
	pool: SqlitePool,
}

impl ProjectItem {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for ProjectItem {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let id = item_id(&request, NOT_FOUND)?;

		match request.method.as_str() {
			"GET" => {
				let project = store::projects::get(&self.pool, auth.account_id, id).await?;
				Response::ok().with_json(&project)
			}
			"PUT" => {
				let payload: ProjectSerializer = request.json()?;
				validate_payload(&payload)?;
				let updated = store::projects::update(
					&self.pool,
					auth.account_id,
					id,
					&payload.name,
					payload.start_date,
				)
				.await?;
				Response::ok().with_json(&updated)
			}
			"PATCH" => {
				let stored = store::projects::get(&self.pool, auth.account_id, id).await?;
				let patch: ProjectPatch = request.json()?;
				validate_payload(&patch)?;

				let name = patch.name.unwrap_or(stored.name);
				let start_date = patch.start_date.unwrap_or(stored.start_date);
				let updated =
					store::projects::update(&self.pool, auth.account_id, id, &name, start_date)
						.await?;
				Response::ok().with_json(&updated)
			}
			"DELETE" => {
				store::projects::delete(&self.pool, auth.account_id, id).await?;
				tracing::info!(project_id = id, "project deleted");
				deleted("Project")
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}
