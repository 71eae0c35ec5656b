//! TeamMember endpoints, exposed under `/api/users/`.
//!
//! Members live outside any project scope: the same person can be
//! staffed on work packages across projects, so these handlers only
//! need the caller to be authenticated.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::serializers::{TeamMemberPatch, TeamMemberSerializer, validate_payload};
use crate::store;
use crate::views::{deleted, item_id, method_not_allowed, require_auth};

const NOT_FOUND: &str = "User not found.";

pub struct MemberCollection {
	pool: SqlitePool,
}

impl MemberCollection {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for MemberCollection {
	async fn handle(&self, request: Request) -> Result<Response> {
		require_auth(&request)?;
		match request.method.as_str() {
			"GET" => {
				let members = store::members::list(&self.pool).await?;
				Response::ok().with_json(&members)
			}
			"POST" => {
				let payload: TeamMemberSerializer = request.json()?;
				validate_payload(&payload)?;
				let created = store::members::create(&self.pool, &payload.name, payload.wage).await?;
				Response::created().with_json(&created)
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}

pub struct MemberItem {
	pool: SqlitePool,
}

impl MemberItem {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Handler for MemberItem {
	async fn handle(&self, request: Request) -> Result<Response> {
		require_auth(&request)?;
		let id = item_id(&request, NOT_FOUND)?;

		match request.method.as_str() {
			"GET" => {
				let member = store::members::get(&self.pool, id).await?;
				Response::ok().with_json(&member)
			}
			"PUT" => {
				let payload: TeamMemberSerializer = request.json()?;
				validate_payload(&payload)?;
				let updated =
					store::members::update(&self.pool, id, &payload.name, payload.wage).await?;
				Response::ok().with_json(&updated)
			}
			"PATCH" => {
				let stored = store::members::get(&self.pool, id).await?;
				let patch: TeamMemberPatch = request.json()?;
				validate_payload(&patch)?;

				let name = patch.name.unwrap_or(stored.name);
				let wage = patch.wage.unwrap_or(stored.wage);
				let updated = store::members::update(&self.pool, id, &name, wage).await?;
				Response::ok().with_json(&updated)
			}
			"DELETE" => {
				store::members::delete(&self.pool, id).await?;
				deleted("User")
			}
			_ => Err(method_not_allowed(&request.method)),
		}
	}
}
