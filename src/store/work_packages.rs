//! WorkPackage rows plus the member association table.
//!
//! Every query filters on the owning project, so ids from other
//! projects behave as if they did not exist. Member sets are written
//! with the delete-then-insert pattern inside the row's transaction and
//! read back sorted by member id.

use std::collections::{BTreeSet, HashMap};

use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::models::WorkPackage;
use crate::store::placeholders;

const NOT_FOUND: &str = "WorkPackage not found.";

fn work_package_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<WorkPackage> {
	let raw_status: String = row.try_get("status")?;
	Ok(WorkPackage {
		id: row.try_get("id")?,
		project_id: row.try_get("project_id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		start_week: row.try_get("start_week")?,
		end_week: row.try_get("end_week")?,
		status: raw_status.parse()?,
		member_ids: Vec::new(),
	})
}

async fn load_member_ids(pool: &SqlitePool, work_package_id: i64) -> Result<Vec<i64>> {
	let rows = sqlx::query(
		"SELECT member_id FROM work_package_members WHERE work_package_id = ? ORDER BY member_id",
	)
	.bind(work_package_id)
	.fetch_all(pool)
	.await?;
	rows.iter()
		.map(|row| row.try_get("member_id").map_err(Error::from))
		.collect()
}

pub async fn list(pool: &SqlitePool, project_id: i64) -> Result<Vec<WorkPackage>> {
	let rows = sqlx::query(
		"SELECT id, project_id, name, description, start_week, end_week, status
		 FROM work_packages WHERE project_id = ?
		 ORDER BY start_week, end_week, id",
	)
	.bind(project_id)
	.fetch_all(pool)
	.await?;

	let mut packages: Vec<WorkPackage> = rows
		.iter()
		.map(work_package_from_row)
		.collect::<Result<_>>()?;
	if packages.is_empty() {
		return Ok(packages);
	}

	let ids: Vec<i64> = packages.iter().map(|wp| wp.id).collect();
	let sql = format!(
		"SELECT work_package_id, member_id FROM work_package_members
		 WHERE work_package_id IN ({}) ORDER BY member_id",
		placeholders(ids.len())
	);
	let mut query = sqlx::query(&sql);
	for id in &ids {
		query = query.bind(id);
	}
	let mut members_by_package: HashMap<i64, Vec<i64>> = HashMap::new();
	for row in &query.fetch_all(pool).await? {
		let package_id: i64 = row.try_get("work_package_id")?;
		let member_id: i64 = row.try_get("member_id")?;
		members_by_package.entry(package_id).or_default().push(member_id);
	}
	for package in &mut packages {
		if let Some(member_ids) = members_by_package.remove(&package.id) {
			package.member_ids = member_ids;
		}
	}
	Ok(packages)
}

pub async fn get(pool: &SqlitePool, project_id: i64, id: i64) -> Result<WorkPackage> {
	let row = sqlx::query(
		"SELECT id, project_id, name, description, start_week, end_week, status
		 FROM work_packages WHERE id = ? AND project_id = ?",
	)
	.bind(id)
	.bind(project_id)
	.fetch_optional(pool)
	.await?;
	let Some(row) = row else {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	};

	let mut package = work_package_from_row(&row)?;
	package.member_ids = load_member_ids(pool, package.id).await?;
	Ok(package)
}

/// Inserts the row and its member set in one transaction. The member
/// ids were checked against existing rows by the caller; duplicates in
/// the payload collapse to one association.
pub async fn create(pool: &SqlitePool, package: &WorkPackage) -> Result<WorkPackage> {
	let member_ids: BTreeSet<i64> = package.member_ids.iter().copied().collect();

	let mut tx = pool.begin().await?;
	let result = sqlx::query(
		"INSERT INTO work_packages (project_id, name, description, start_week, end_week, status)
		 VALUES (?, ?, ?, ?, ?, ?)",
	)
	.bind(package.project_id)
	.bind(&package.name)
	.bind(&package.description)
	.bind(package.start_week)
	.bind(package.end_week)
	.bind(package.status.as_str())
	.execute(&mut *tx)
	.await?;
	let id = result.last_insert_rowid();

	for member_id in &member_ids {
		sqlx::query("INSERT INTO work_package_members (work_package_id, member_id) VALUES (?, ?)")
			.bind(id)
			.bind(member_id)
			.execute(&mut *tx)
			.await?;
	}
	tx.commit().await?;

	Ok(WorkPackage {
		id,
		member_ids: member_ids.into_iter().collect(),
		..package.clone()
	})
}

pub async fn update(
	pool: &SqlitePool,
	project_id: i64,
	id: i64,
	package: &WorkPackage,
) -> Result<WorkPackage> {
	let member_ids: BTreeSet<i64> = package.member_ids.iter().copied().collect();

	let mut tx = pool.begin().await?;
	let result = sqlx::query(
		"UPDATE work_packages SET name = ?, description = ?, start_week = ?, end_week = ?, status = ?
		 WHERE id = ? AND project_id = ?",
	)
	.bind(&package.name)
	.bind(&package.description)
	.bind(package.start_week)
	.bind(package.end_week)
	.bind(package.status.as_str())
	.bind(id)
	.bind(project_id)
	.execute(&mut *tx)
	.await?;
	if result.rows_affected() == 0 {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	sqlx::query("DELETE FROM work_package_members WHERE work_package_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	for member_id in &member_ids {
		sqlx::query("INSERT INTO work_package_members (work_package_id, member_id) VALUES (?, ?)")
			.bind(id)
			.bind(member_id)
			.execute(&mut *tx)
			.await?;
	}
	tx.commit().await?;

	Ok(WorkPackage {
		id,
		project_id,
		member_ids: member_ids.into_iter().collect(),
		..package.clone()
	})
}

/// Deletes the work package and its tasks, deliverables, budget entries
/// and association rows.
pub async fn delete(pool: &SqlitePool, project_id: i64, id: i64) -> Result<()> {
	let mut tx = pool.begin().await?;

	let exists = sqlx::query("SELECT id FROM work_packages WHERE id = ? AND project_id = ?")
		.bind(id)
		.bind(project_id)
		.fetch_optional(&mut *tx)
		.await?;
	if exists.is_none() {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	sqlx::query("DELETE FROM budget_entries WHERE work_package_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"DELETE FROM task_members WHERE task_id IN (SELECT id FROM tasks WHERE work_package_id = ?)",
	)
	.bind(id)
	.execute(&mut *tx)
	.await?;
	sqlx::query("DELETE FROM tasks WHERE work_package_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM deliverables WHERE work_package_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM work_package_members WHERE work_package_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM work_packages WHERE id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}
