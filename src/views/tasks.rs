//! Task endpoints.
//!
//! Tasks carry the strictest write checks, in a fixed order so clients
//! see deterministic errors: the owning work package must exist inside
//! the scope, the task window must sit inside the package window, and
//! every assigned member must already be on the package. Partial
//! updates merge with the stored row first and run the same checks on
//! the merged result, including when the patch moves the task to a
//! different work package.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::models::{Task, WorkPackage};
use crate::scope::{ProjectScope, resolve_scope};
use crate::serializers::{TaskPatch, TaskSerializer, validate_payload};
use crate::store;
use crate::validators::{validate_task_membership, validate_task_window, validate_week_order};
use crate::views::{deleted, item_id, method_not_allowed, require_auth};

const NOT_FOUND: &str = "Task not found.";

/// Containment and membership checks against the target work package.
/// The work-package lookup itself is the existence/ownership check and
/// runs first.
async fn check_task(pool: &SqlitePool, scope: ProjectScope, task: &Task) -> Result<WorkPackage> {
	let package = store::work_packages::get(pool, scope.project_id, task.work_package_id).await?;
	validate_week_order(task.start_week, task.end_week)?;
	validate_task_window(&package, task.start_week, task.end_week)?;

	let known = store::members::names(pool, &task.member_ids).await?;
	validate_task_membership(&package, &known, &task.member_ids)?;
	Ok(package)
}

fn task_from_payload(payload: TaskSerializer) -> Task {
	Task {
		id: 0,
		work_package_id: payload.work_package,
		name: payload.name,
		description: payload.description,
		start_week: payload.start_week,
		end_week: payload.end_week,
		status: payload.status,
		member_ids: payload.users,
	}
}

pub struct TaskCollection {
	pool: SqlitePool,
}

impl TaskCollection {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for TaskCollection {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;

		match request.method.as_str() {
			"GET" => {
				let tasks = store::tasks::list(&self.pool, scope.project_id).await?;
				Response::ok().with_json(&tasks)
			}
			"POST" => {
				let payload: TaskSerializer = request.json()?;
				validate_payload(&payload)?;

				let task = task_from_payload(payload);
				check_task(&self.pool, scope, &task).await?;

				let created = store::tasks::create(&self.pool, &task).await?;
				tracing::info!(
					task_id = created.id,
					work_package_id = created.work_package_id,
					"task created"
				);
				Response::created().with_json(&created)
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

pub struct TaskItem {
	pool: SqlitePool,
}

impl TaskItem {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for TaskItem {
	async fn handle(&self, request: Request) -> Result<Response> {
		let auth = require_auth(&request)?;
		let scope = resolve_scope(&self.pool, &auth, &request).await?;
		let id = item_id(&request, NOT_FOUND)?;

		match request.method.as_str() {
			"GET" => {
				let task = store::tasks::get(&self.pool, scope.project_id, id).await?;
				Response::ok().with_json(&task)
			}
			"PUT" => {
				store::tasks::get(&self.pool, scope.project_id, id).await?;
				let payload: TaskSerializer = request.json()?;
				validate_payload(&payload)?;

				let mut task = task_from_payload(payload);
				task.id = id;
				check_task(&self.pool, scope, &task).await?;

				let updated = store::tasks::update(&self.pool, scope.project_id, id, &task).await?;
				Response::ok().with_json(&updated)
			}
			"PATCH" => {
				let stored = store::tasks::get(&self.pool, scope.project_id, id).await?;
				let patch: TaskPatch = request.json()?;
				validate_payload(&patch)?;

				let merged = Task {
					id,
					work_package_id: patch.work_package.unwrap_or(stored.work_package_id),
					name: patch.name.unwrap_or(stored.name),
					description: patch.description.unwrap_or(stored.description),
					start_week: patch.start_week.unwrap_or(stored.start_week),
					end_week: patch.end_week.unwrap_or(stored.end_week),
					status: patch.status.unwrap_or(stored.status),
					member_ids: patch.users.unwrap_or(stored.member_ids),
				};
				check_task(&self.pool, scope, &merged).await?;

				let updated = store::tasks::update(&self.pool, scope.project_id, id, &merged).await?;
				Response::ok().with_json(&updated)
			}
			"DELETE" => {
				store::tasks::delete(&self.pool, scope.project_id, id).await?;
				deleted("Task")
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}
