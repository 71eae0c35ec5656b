//! Project rows, filtered by the owning account.
//!
//! Deleting a project removes every child row explicitly, association
//! tables included, inside one transaction.

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::models::Project;
use crate::store::parse_date;

const NOT_FOUND: &str = "Project not found.";

fn project_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Project> {
	let raw_date: String = row.try_get("start_date")?;
	Ok(Project {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		start_date: parse_date(&raw_date)?,
		account_id: row.try_get("account_id")?,
	})
}

pub async fn list(pool: &SqlitePool, account_id: i64) -> Result<Vec<Project>> {
	let rows = sqlx::query(
		"SELECT id, name, start_date, account_id FROM projects WHERE account_id = ? ORDER BY id",
	)
	.bind(account_id)
	.fetch_all(pool)
	.await?;
	rows.iter().map(project_from_row).collect()
}

pub async fn get(pool: &SqlitePool, account_id: i64, id: i64) -> Result<Project> {
	let row = sqlx::query(
		"SELECT id, name, start_date, account_id FROM projects WHERE id = ? AND account_id = ?",
	)
	.bind(id)
	.bind(account_id)
	.fetch_optional(pool)
	.await?;
	match row {
		Some(row) => project_from_row(&row),
		None => Err(Error::NotFound(NOT_FOUND.to_string())),
	}
}

pub async fn create(
	pool: &SqlitePool,
	account_id: i64,
	name: &str,
	start_date: NaiveDate,
) -> Result<Project> {
	let result = sqlx::query("INSERT INTO projects (name, start_date, account_id) VALUES (?, ?, ?)")
		.bind(name)
		.bind(start_date.to_string())
		.bind(account_id)
		.execute(pool)
		.await?;

	Ok(Project {
		id: result.last_insert_rowid(),
		name: name.to_string(),
		start_date,
		account_id,
	})
}

pub async fn update(
	pool: &SqlitePool,
	account_id: i64,
	id: i64,
	name: &str,
	start_date: NaiveDate,
) -> Result<Project> {
	let result =
		sqlx::query("UPDATE projects SET name = ?, start_date = ? WHERE id = ? AND account_id = ?")
			.bind(name)
			.bind(start_date.to_string())
			.bind(id)
			.bind(account_id)
			.execute(pool)
			.await?;
	if result.rows_affected() == 0 {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	Ok(Project {
		id,
		name: name.to_string(),
		start_date,
		account_id,
	})
}

/// Deletes the project and everything under it: work packages, tasks,
/// deliverables, budget entries and both association tables.
pub async fn delete(pool: &SqlitePool, account_id: i64, id: i64) -> Result<()> {
	let mut tx = pool.begin().await?;

	let exists = sqlx::query("SELECT id FROM projects WHERE id = ? AND account_id = ?")
		.bind(id)
		.bind(account_id)
		.fetch_optional(&mut *tx)
		.await?;
	if exists.is_none() {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	let scoped_wps = "SELECT id FROM work_packages WHERE project_id = ?";

	sqlx::query(&format!(
		"DELETE FROM budget_entries WHERE work_package_id IN ({})",
		scoped_wps
	))
	.bind(id)
	.execute(&mut *tx)
	.await?;

	sqlx::query(&format!(
		"DELETE FROM task_members WHERE task_id IN (SELECT id FROM tasks WHERE work_package_id IN ({}))",
		scoped_wps
	))
	.bind(id)
	.execute(&mut *tx)
	.await?;

	sqlx::query(&format!(
		"DELETE FROM tasks WHERE work_package_id IN ({})",
		scoped_wps
	))
	.bind(id)
	.execute(&mut *tx)
	.await?;

	sqlx::query(&format!(
		"DELETE FROM deliverables WHERE work_package_id IN ({})",
		scoped_wps
	))
	.bind(id)
	.execute(&mut *tx)
	.await?;

	sqlx::query(&format!(
		"DELETE FROM work_package_members WHERE work_package_id IN ({})",
		scoped_wps
	))
	.bind(id)
	.execute(&mut *tx)
	.await?;

	sqlx::query("DELETE FROM work_packages WHERE project_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;

	sqlx::query("DELETE FROM projects WHERE id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}
