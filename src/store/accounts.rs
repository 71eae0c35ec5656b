//! Account rows: registration lookup and creation.

use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::models::Account;
use crate::store::map_unique;

fn account_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
	Ok(Account {
		id: row.try_get("id")?,
		username: row.try_get("username")?,
		email: row.try_get("email")?,
		password_hash: row.try_get("password_hash")?,
	})
}

/// Inserts a new account. The username is unique; a duplicate maps to
/// a conflict error rather than a bare database failure.
pub async fn create(
	pool: &SqlitePool,
	username: &str,
	email: &str,
	password_hash: &str,
) -> Result<Account> {
	let result = sqlx::query("INSERT INTO accounts (username, email, password_hash) VALUES (?, ?, ?)")
		.bind(username)
		.bind(email)
		.bind(password_hash)
		.execute(pool)
		.await
		.map_err(|e| map_unique(e, "A user with that username already exists."))?;

	Ok(Account {
		id: result.last_insert_rowid(),
		username: username.to_string(),
		email: email.to_string(),
		password_hash: password_hash.to_string(),
	})
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<Account>> {
	let row = sqlx::query("SELECT id, username, email, password_hash FROM accounts WHERE username = ?")
		.bind(username)
		.fetch_optional(pool)
		.await?;
	match row {
		Some(row) => Ok(Some(account_from_row(&row)?)),
		None => Ok(None),
	}
}
