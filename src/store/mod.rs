//! Persistence layer.
//!
//! One module per entity, raw SQL over a shared [`SqlitePool`]. Every
//! project-scoped query carries the owning-project filter in SQL, so a
//! row outside the caller's scope is indistinguishable from an absent
//! one. Cascade deletes are explicit statements inside transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::{Error, Result};

pub mod accounts;
pub mod budget;
pub mod deliverables;
pub mod members;
pub mod projects;
pub mod schema;
pub mod tasks;
pub mod work_packages;

/// Opens a pool for the given SQLite URL and bootstraps the schema.
///
/// In-memory databases are pinned to a single connection that never
/// expires; each SQLite `:memory:` connection is its own database, so a
/// second pool connection (or a recycled one) would see empty tables.
///
/// # Examples
///
/// ```
/// # tokio_test::block_on(async {
/// let pool = planboard::store::connect("sqlite::memory:").await.unwrap();
/// let members = planboard::store::members::list(&pool).await.unwrap();
/// assert!(members.is_empty());
/// # });
/// ```
pub async fn connect(url: &str) -> Result<SqlitePool> {
	let mut options = SqlitePoolOptions::new();
	if url.contains(":memory:") {
		options = options
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None);
	}
	let pool = options
		.connect(url)
		.await
		.map_err(|e| Error::Internal(format!("Failed to open database {}: {}", url, e)))?;
	schema::create_all(&pool).await?;
	Ok(pool)
}

/// Converts a unique-constraint violation into a [`Error::Conflict`]
/// with the given message; other database errors pass through.
pub(crate) fn map_unique(err: sqlx::Error, message: &str) -> Error {
	if let Some(db_err) = err.as_database_error()
		&& db_err.is_unique_violation()
	{
		return Error::Conflict(message.to_string());
	}
	Error::Database(err)
}

/// Parses a TEXT column holding a decimal written by this store.
pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal> {
	raw.parse::<Decimal>()
		.map_err(|e| Error::Internal(format!("Invalid stored decimal '{}': {}", raw, e)))
}

/// Parses a TEXT column holding an ISO 8601 date written by this store.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
	raw.parse::<NaiveDate>()
		.map_err(|e| Error::Internal(format!("Invalid stored date '{}': {}", raw, e)))
}

/// Rounds to 2 decimal places and pins the scale, so `250` is stored
/// and serialized as `250.00`.
pub(crate) fn round_money(value: Decimal) -> Decimal {
	let mut rounded = value.round_dp(2);
	rounded.rescale(2);
	rounded
}

/// `?, ?, ...` fragment for a dynamic `IN` clause.
pub(crate) fn placeholders(count: usize) -> String {
	vec!["?"; count].join(", ")
}
