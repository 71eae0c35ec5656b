//! Deliverable rows, scoped through the owning work package.

use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::models::Deliverable;

const NOT_FOUND: &str = "Deliverable not found.";

const SELECT: &str = "SELECT d.id, d.work_package_id, d.name, d.description, d.deadline
	FROM deliverables d JOIN work_packages w ON w.id = d.work_package_id";

fn deliverable_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Deliverable> {
	Ok(Deliverable {
		id: row.try_get("id")?,
		work_package_id: row.try_get("work_package_id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		deadline: row.try_get("deadline")?,
	})
}

pub async fn list(pool: &SqlitePool, project_id: i64) -> Result<Vec<Deliverable>> {
	let sql = format!("{} WHERE w.project_id = ? ORDER BY d.deadline, d.id", SELECT);
	let rows = sqlx::query(&sql).bind(project_id).fetch_all(pool).await?;
	rows.iter().map(deliverable_from_row).collect()
}

pub async fn get(pool: &SqlitePool, project_id: i64, id: i64) -> Result<Deliverable> {
	let sql = format!("{} WHERE d.id = ? AND w.project_id = ?", SELECT);
	let row = sqlx::query(&sql)
		.bind(id)
		.bind(project_id)
		.fetch_optional(pool)
		.await?;
	match row {
		Some(row) => deliverable_from_row(&row),
		None => Err(Error::NotFound(NOT_FOUND.to_string())),
	}
}

/// The owning work package was resolved within scope by the caller.
pub async fn create(pool: &SqlitePool, deliverable: &Deliverable) -> Result<Deliverable> {
	let result = sqlx::query(
		"INSERT INTO deliverables (work_package_id, name, description, deadline)
		 VALUES (?, ?, ?, ?)",
	)
	.bind(deliverable.work_package_id)
	.bind(&deliverable.name)
	.bind(&deliverable.description)
	.bind(deliverable.deadline)
	.execute(pool)
	.await?;

	Ok(Deliverable {
		id: result.last_insert_rowid(),
		..deliverable.clone()
	})
}

pub async fn update(
	pool: &SqlitePool,
	project_id: i64,
	id: i64,
	deliverable: &Deliverable,
) -> Result<Deliverable> {
	let result = sqlx::query(
		"UPDATE deliverables SET work_package_id = ?, name = ?, description = ?, deadline = ?
		 WHERE id = ? AND work_package_id IN (SELECT id FROM work_packages WHERE project_id = ?)",
	)
	.bind(deliverable.work_package_id)
	.bind(&deliverable.name)
	.bind(&deliverable.description)
	.bind(deliverable.deadline)
	.bind(id)
	.bind(project_id)
	.execute(pool)
	.await?;
	if result.rows_affected() == 0 {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	Ok(Deliverable {
		id,
		..deliverable.clone()
	})
}

pub async fn delete(pool: &SqlitePool, project_id: i64, id: i64) -> Result<()> {
	let result = sqlx::query(
		"DELETE FROM deliverables
		 WHERE id = ? AND work_package_id IN (SELECT id FROM work_packages WHERE project_id = ?)",
	)
	.bind(id)
	.bind(project_id)
	.execute(pool)
	.await?;
	if result.rows_affected() == 0 {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}
	Ok(())
}
