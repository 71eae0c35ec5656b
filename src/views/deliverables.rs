//! Deliverable endpoints.
//!
//! Same shape as tasks, with a single deadline instead of a window:
//! the owning work package is resolved first, then the deadline must
//! fall inside the package's weeks.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::models::Deliverable;
use crate::scope::{ProjectScope, resolve_scope};
use crate::serializers::{DeliverablePatch, DeliverableSerializer, validate_payload};
use crate::store;
use crate::validators::validate_deliverable_deadline;
use crate::views::{deleted, item_id, method_not_allowed, require_auth};

const NOT_FOUND: &str = "Deliverable not found.";

async fn check_deliverable(
	pool: &SqlitePool,
	scope: ProjectScope,
	deliverable: &Deliverable,
) -> Result<()> {
	let package =
		store::work_packages::get(pool, scope.project_id, deliverable.work_package_id).await?;
	validate_deliverable_deadline(&package, deliverable.deadline)?;
	Ok(())
}

pub struct DeliverableCollection {
	pool: SqlitePool,
}

impl DeliverableCollection {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for DeliverableCollection {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;

		match request.method.as_str() {
			"GET" => {
				let deliverables = store::deliverables::list(&self.pool, scope.project_id).await?;
				Response::ok().with_json(&deliverables)
			}
			"POST" => {
				let payload: DeliverableSerializer = request.json()?;
				validate_payload(&payload)?;

				let deliverable = Deliverable {
					id: 0,
					work_package_id: payload.work_package,
					name: payload.name,
					description: payload.description,
					deadline: payload.deadline,
				};
				check_deliverable(&self.pool, scope, &deliverable).await?;

				let created = store::deliverables::create(&self.pool, &deliverable).await?;
				Response::created().with_json(&created)
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

pub struct DeliverableItem {
	pool: SqlitePool,
}

impl DeliverableItem {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for DeliverableItem {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;
		let id = item_id(&request, NOT_FOUND)?;

		match request.method.as_str() {
			"GET" => {
				let deliverable = store::deliverables::get(&self.pool, scope.project_id, id).await?;
				Response::ok().with_json(&deliverable)
			}
			"PUT" => {
				store::deliverables::get(&self.pool, scope.project_id, id).await?;
				let payload: DeliverableSerializer = request.json()?;
				validate_payload(&payload)?;

				let deliverable = Deliverable {
					id,
					work_package_id: payload.work_package,
					name: payload.name,
					description: payload.description,
					deadline: payload.deadline,
				};
				check_deliverable(&self.pool, scope, &deliverable).await?;

				let updated =
					store::deliverables::update(&self.pool, scope.project_id, id, &deliverable)
						.await?;
				Response::ok().with_json(&updated)
			}
			"PATCH" => {
				let stored = store::deliverables::get(&self.pool, scope.project_id, id).await?;
				let patch: DeliverablePatch = request.json()?;
				validate_payload(&patch)?;

				let merged = Deliverable {
					id,
					work_package_id: patch.work_package.unwrap_or(stored.work_package_id),
					name: patch.name.unwrap_or(stored.name),
					description: patch.description.or(stored.description),
					deadline: patch.deadline.unwrap_or(stored.deadline),
				};
				check_deliverable(&self.pool, scope, &merged).await?;

				let updated =
					store::deliverables::update(&self.pool, scope.project_id, id, &merged).await?;
				Response::ok().with_json(&updated)
			}
			"DELETE" => {
				store::deliverables::delete(&self.pool, scope.project_id, id).await?;
				deleted("Deliverable")
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}
