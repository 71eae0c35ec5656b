//! Task rows plus the member association table.
//!
//! Tasks carry no project column; scope filters join through the owning
//! work package. Re-parenting (moving a task to another work package)
//! is an ordinary update, validated upstream against the target.

use std::collections::{BTreeSet, HashMap};

use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::models::Task;
use crate::store::placeholders;

const NOT_FOUND: &str = "Task not found.";

const SELECT: &str = "SELECT t.id, t.work_package_id, t.name, t.description,
	t.start_week, t.end_week, t.status
	FROM tasks t JOIN work_packages w ON w.id = t.work_package_id";

fn task_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Task> {
	let raw_status: String = row.try_get("status")?;
	Ok(Task {
		id: row.try_get("id")?,
		work_package_id: row.try_get("work_package_id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		start_week: row.try_get("start_week")?,
		end_week: row.try_get("end_week")?,
		status: raw_status.parse()?,
		member_ids: Vec::new(),
	})
}

pub async fn list(pool: &SqlitePool, project_id: i64) -> Result<Vec<Task>> {
	let sql = format!(
		"{} WHERE w.project_id = ? ORDER BY t.start_week, t.end_week, t.id",
		SELECT
	);
	let rows = sqlx::query(&sql).bind(project_id).fetch_all(pool).await?;

	let mut tasks: Vec<Task> = rows.iter().map(task_from_row).collect::<Result<_>>()?;
	if tasks.is_empty() {
		return Ok(tasks);
	}

	let ids: Vec<i64> = tasks.iter().map(|task| task.id).collect();
	let sql = format!(
		"SELECT task_id, member_id FROM task_members WHERE task_id IN ({}) ORDER BY member_id",
		placeholders(ids.len())
	);
	let mut query = sqlx::query(&sql);
	for id in &ids {
		query = query.bind(id);
	}
	let mut members_by_task: HashMap<i64, Vec<i64>> = HashMap::new();
	for row in &query.fetch_all(pool).await? {
		let task_id: i64 = row.try_get("task_id")?;
		let member_id: i64 = row.try_get("member_id")?;
		members_by_task.entry(task_id).or_default().push(member_id);
	}
	for task in &mut tasks {
		if let Some(member_ids) = members_by_task.remove(&task.id) {
			task.member_ids = member_ids;
		}
	}
	Ok(tasks)
}

pub async fn get(pool: &SqlitePool, project_id: i64, id: i64) -> Result<Task> {
	let sql = format!("{} WHERE t.id = ? AND w.project_id = ?", SELECT);
	let row = sqlx::query(&sql)
		.bind(id)
		.bind(project_id)
		.fetch_optional(pool)
		.await?;
	let Some(row) = row else {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	};

	let mut task = task_from_row(&row)?;
	let member_rows =
		sqlx::query("SELECT member_id FROM task_members WHERE task_id = ? ORDER BY member_id")
			.bind(task.id)
			.fetch_all(pool)
			.await?;
	task.member_ids = member_rows
		.iter()
		.map(|row| row.try_get("member_id").map_err(Error::from))
		.collect::<Result<_>>()?;
	Ok(task)
}

/// Inserts the row and its member set in one transaction. The owning
/// work package was resolved within scope by the caller.
pub async fn create(pool: &SqlitePool, task: &Task) -> Result<Task> {
	let member_ids: BTreeSet<i64> = task.member_ids.iter().copied().collect();

	let mut tx = pool.begin().await?;
	let result = sqlx::query(
		"INSERT INTO tasks (work_package_id, name, description, start_week, end_week, status)
		 VALUES (?, ?, ?, ?, ?, ?)",
	)
	.bind(task.work_package_id)
	.bind(&task.name)
	.bind(&task.description)
	.bind(task.start_week)
	.bind(task.end_week)
	.bind(task.status.as_str())
	.execute(&mut *tx)
	.await?;
	let id = result.last_insert_rowid();

	for member_id in &member_ids {
		sqlx::query("INSERT INTO task_members (task_id, member_id) VALUES (?, ?)")
			.bind(id)
			.bind(member_id)
			.execute(&mut *tx)
			.await?;
	}
	tx.commit().await?;

	Ok(Task {
		id,
		member_ids: member_ids.into_iter().collect(),
		..task.clone()
	})
}

pub async fn update(pool: &SqlitePool, project_id: i64, id: i64, task: &Task) -> Result<Task> {
	let member_ids: BTreeSet<i64> = task.member_ids.iter().copied().collect();

	let mut tx = pool.begin().await?;
	// The scope filter runs against the task's current work package,
	// so a task from another project cannot be captured by re-parenting.
	let result = sqlx::query(
		"UPDATE tasks SET work_package_id = ?, name = ?, description = ?,
		 start_week = ?, end_week = ?, status = ?
		 WHERE id = ? AND work_package_id IN (SELECT id FROM work_packages WHERE project_id = ?)",
	)
	.bind(task.work_package_id)
	.bind(&task.name)
	.bind(&task.description)
	.bind(task.start_week)
	.bind(task.end_week)
	.bind(task.status.as_str())
	.bind(id)
	.bind(project_id)
	.execute(&mut *tx)
	.await?;
	if result.rows_affected() == 0 {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	sqlx::query("DELETE FROM task_members WHERE task_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	for member_id in &member_ids {
		sqlx::query("INSERT INTO task_members (task_id, member_id) VALUES (?, ?)")
			.bind(id)
			.bind(member_id)
			.execute(&mut *tx)
			.await?;
	}
	tx.commit().await?;

	Ok(Task {
		id,
		member_ids: member_ids.into_iter().collect(),
		..task.clone()
	})
}

pub async fn delete(pool: &SqlitePool, project_id: i64, id: i64) -> Result<()> {
	let mut tx = pool.begin().await?;

	let exists = sqlx::query(
		"SELECT t.id FROM tasks t JOIN work_packages w ON w.id = t.work_package_id
		 WHERE t.id = ? AND w.project_id = ?",
	)
	.bind(id)
	.bind(project_id)
	.fetch_optional(&mut *tx)
	.await?;
	if exists.is_none() {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	sqlx::query("DELETE FROM task_members WHERE task_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM tasks WHERE id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}
