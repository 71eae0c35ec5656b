//! Budget reconciliation.
//!
//! A budget submission is a flat JSON object keyed
//! `"<workPackageId>_<teamMemberId>_<month>"` with person-month
//! fractions as values. Each submission replaces the project's whole
//! budget: every key is checked first, and only a fully valid
//! submission touches the database. A submission with any bad key
//! leaves the previous budget fully intact and reports every failure,
//! not just the first.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::BudgetEntry;
use crate::scope::ProjectScope;
use crate::store;

pub const REASON_MALFORMED: &str = "Malformed key.";
pub const REASON_NO_WORK_PACKAGE: &str = "WorkPackage not found.";
pub const REASON_NO_MEMBER: &str = "User not found.";
pub const REASON_DUPLICATE: &str = "Duplicate entry.";
pub const REASON_BAD_VALUE: &str = "Invalid contribution value.";

/// One rejected submission entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BudgetFailure {
	pub key: String,
	pub reason: String,
}

impl BudgetFailure {
	fn new(key: &str, reason: &str) -> Self {
		Self {
			key: key.to_string(),
			reason: reason.to_string(),
		}
	}
}

/// Result of a budget replacement attempt.
#[derive(Debug)]
pub enum ReplaceOutcome {
	/// The whole submission was applied; `saved` rows now exist.
	Replaced { saved: usize },
	/// Nothing was written; every offending key is listed.
	Rejected { failures: Vec<BudgetFailure> },
}

/// Splits `"<workPackageId>_<teamMemberId>_<month>"` into its parts.
pub fn parse_key(key: &str) -> Option<(i64, i64, i64)> {
	let mut parts = key.split('_');
	let work_package_id = parts.next()?.parse().ok()?;
	let member_id = parts.next()?.parse().ok()?;
	let month = parts.next()?.parse().ok()?;
	if parts.next().is_some() {
		return None;
	}
	Some((work_package_id, member_id, month))
}

/// Formats the wire key for one stored entry.
pub fn format_key(entry: &BudgetEntry) -> String {
	format!(
		"{}_{}_{}",
		entry.work_package_id, entry.member_id, entry.month
	)
}

/// Validates the submission against the scoped project and, when every
/// entry passes, replaces the project's budget in one transaction.
pub async fn replace_budget(
	pool: &SqlitePool,
	scope: ProjectScope,
	submission: &BTreeMap<String, f64>,
) -> Result<ReplaceOutcome> {
	let scoped_packages = store::budget::work_package_ids(pool, scope.project_id).await?;

	// One lookup for every member id the submission names.
	let mut candidate_members: Vec<i64> = submission
		.keys()
		.filter_map(|key| parse_key(key))
		.map(|(_, member_id, _)| member_id)
		.collect();
	candidate_members.sort_unstable();
	candidate_members.dedup();
	let known_members = store::members::names(pool, &candidate_members).await?;

	let mut entries = Vec::with_capacity(submission.len());
	let mut failures = Vec::new();
	let mut seen: HashSet<(i64, i64, i64)> = HashSet::new();

	for (key, value) in submission {
		let Some((work_package_id, member_id, month)) = parse_key(key) else {
			failures.push(BudgetFailure::new(key, REASON_MALFORMED));
			continue;
		};
		if !scoped_packages.contains(&work_package_id) {
			failures.push(BudgetFailure::new(key, REASON_NO_WORK_PACKAGE));
			continue;
		}
		if !known_members.contains_key(&member_id) {
			failures.push(BudgetFailure::new(key, REASON_NO_MEMBER));
			continue;
		}
		// Distinct keys can still name one triple ("01_2_3" vs "1_2_3").
		if !seen.insert((work_package_id, member_id, month)) {
			failures.push(BudgetFailure::new(key, REASON_DUPLICATE));
			continue;
		}
		let Ok(contribution) = Decimal::try_from(*value) else {
			failures.push(BudgetFailure::new(key, REASON_BAD_VALUE));
			continue;
		};
		entries.push(BudgetEntry {
			work_package_id,
			member_id,
			month,
			contribution,
		});
	}

	if !failures.is_empty() {
		tracing::warn!(
			project_id = scope.project_id,
			rejected = failures.len(),
			"budget submission rejected"
		);
		return Ok(ReplaceOutcome::Rejected { failures });
	}

	store::budget::replace_for_project(pool, scope.project_id, &entries).await?;
	Ok(ReplaceOutcome::Replaced {
		saved: entries.len(),
	})
}
