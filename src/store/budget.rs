//! Budget entry rows.
//!
//! Entries are only ever written wholesale: the reconciler validates a
//! submission, then [`replace_for_project`] clears the project's rows
//! and reinserts the new set in one transaction.

use std::collections::HashSet;

use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::models::BudgetEntry;
use crate::store::{parse_decimal, round_money};

pub async fn fetch_for_project(pool: &SqlitePool, project_id: i64) -> Result<Vec<BudgetEntry>> {
	let rows = sqlx::query(
		"SELECT b.work_package_id, b.member_id, b.month, b.contribution
		 FROM budget_entries b JOIN work_packages w ON w.id = b.work_package_id
		 WHERE w.project_id = ?
		 ORDER BY b.work_package_id, b.member_id, b.month",
	)
	.bind(project_id)
	.fetch_all(pool)
	.await?;

	let mut entries = Vec::with_capacity(rows.len());
	for row in &rows {
		let raw: String = row.try_get("contribution")?;
		entries.push(BudgetEntry {
			work_package_id: row.try_get("work_package_id")?,
			member_id: row.try_get("member_id")?,
			month: row.try_get("month")?,
			contribution: parse_decimal(&raw)?,
		});
	}
	Ok(entries)
}

/// Ids of every work package in the project, for key validation.
pub async fn work_package_ids(pool: &SqlitePool, project_id: i64) -> Result<HashSet<i64>> {
	let rows = sqlx::query("SELECT id FROM work_packages WHERE project_id = ?")
		.bind(project_id)
		.fetch_all(pool)
		.await?;
	let mut ids = HashSet::with_capacity(rows.len());
	for row in &rows {
		ids.insert(row.try_get("id")?);
	}
	Ok(ids)
}

/// Clears the project's entries and inserts the given set, atomically.
/// Callers validate the entries first; a failed insert rolls the whole
/// replacement back, leaving the previous state visible.
pub async fn replace_for_project(
	pool: &SqlitePool,
	project_id: i64,
	entries: &[BudgetEntry],
) -> Result<()> {
	let mut tx = pool.begin().await?;

	sqlx::query(
		"DELETE FROM budget_entries
		 WHERE work_package_id IN (SELECT id FROM work_packages WHERE project_id = ?)",
	)
	.bind(project_id)
	.execute(&mut *tx)
	.await?;

	for entry in entries {
		sqlx::query(
			"INSERT INTO budget_entries (work_package_id, member_id, month, contribution)
			 VALUES (?, ?, ?, ?)",
		)
		.bind(entry.work_package_id)
		.bind(entry.member_id)
		.bind(entry.month)
		.bind(round_money(entry.contribution).to_string())
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;
	Ok(())
}
