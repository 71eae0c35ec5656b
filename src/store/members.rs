//! TeamMember rows.
//!
//! Members are shared across projects, so nothing here takes a project
//! scope. Deleting a member detaches it from every work package and
//! task and drops its budget entries, but leaves those parents alive.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::models::TeamMember;
use crate::store::{parse_decimal, placeholders, round_money};

const NOT_FOUND: &str = "User not found.";

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TeamMember> {
	let raw_wage: String = row.try_get("wage")?;
	Ok(TeamMember {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		wage: parse_decimal(&raw_wage)?,
	})
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<TeamMember>> {
	let rows = sqlx::query("SELECT id, name, wage FROM team_members ORDER BY id")
		.fetch_all(pool)
		.await?;
	rows.iter().map(member_from_row).collect()
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<TeamMember> {
	let row = sqlx::query("SELECT id, name, wage FROM team_members WHERE id = ?")
		.bind(id)
		.fetch_optional(pool)
		.await?;
	match row {
		Some(row) => member_from_row(&row),
		None => Err(Error::NotFound(NOT_FOUND.to_string())),
	}
}

pub async fn create(pool: &SqlitePool, name: &str, wage: Decimal) -> Result<TeamMember> {
	let wage = round_money(wage);
	let result = sqlx::query("INSERT INTO team_members (name, wage) VALUES (?, ?)")
		.bind(name)
		.bind(wage.to_string())
		.execute(pool)
		.await?;

	Ok(TeamMember {
		id: result.last_insert_rowid(),
		name: name.to_string(),
		wage,
	})
}

pub async fn update(pool: &SqlitePool, id: i64, name: &str, wage: Decimal) -> Result<TeamMember> {
	let wage = round_money(wage);
	let result = sqlx::query("UPDATE team_members SET name = ?, wage = ? WHERE id = ?")
		.bind(name)
		.bind(wage.to_string())
		.bind(id)
		.execute(pool)
		.await?;
	if result.rows_affected() == 0 {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	Ok(TeamMember {
		id,
		name: name.to_string(),
		wage,
	})
}

/// Deletes the member after detaching it from work packages, tasks and
/// budget entries.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
	let mut tx = pool.begin().await?;

	let exists = sqlx::query("SELECT id FROM team_members WHERE id = ?")
		.bind(id)
		.fetch_optional(&mut *tx)
		.await?;
	if exists.is_none() {
		return Err(Error::NotFound(NOT_FOUND.to_string()));
	}

	sqlx::query("DELETE FROM work_package_members WHERE member_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM task_members WHERE member_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM budget_entries WHERE member_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM team_members WHERE id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}

/// Resolves the given ids to names. Ids with no row are simply absent
/// from the map, which is how validators detect unknown members.
pub async fn names(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, String>> {
	if ids.is_empty() {
		return Ok(HashMap::new());
	}
	let sql = format!(
		"SELECT id, name FROM team_members WHERE id IN ({})",
		placeholders(ids.len())
	);
	let mut query = sqlx::query(&sql);
	for id in ids {
		query = query.bind(id);
	}
	let rows = query.fetch_all(pool).await?;

	let mut found = HashMap::with_capacity(rows.len());
	for row in &rows {
		found.insert(row.try_get("id")?, row.try_get("name")?);
	}
	Ok(found)
}
