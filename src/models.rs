//! Domain models.
//!
//! The hierarchy is Account -> Project -> WorkPackage -> {Task,
//! Deliverable, BudgetEntry}, with TeamMembers shared across work
//! packages and tasks through membership links. Wire field names follow
//! the JSON contract (`project`, `work_package`, `users`), so models
//! serialize directly into API responses.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle status shared by work packages and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	#[default]
	Active,
	Closed,
}

impl Status {
	pub fn as_str(&self) -> &'static str {
		match self {
			Status::Active => "active",
			Status::Closed => "closed",
		}
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Status {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(Status::Active),
			"closed" => Ok(Status::Closed),
			other => Err(Error::Validation(format!("Invalid status: {}", other))),
		}
	}
}

/// A registered account. Every project belongs to exactly one account.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
	pub id: i64,
	pub username: String,
	pub email: String,
	#[serde(skip_serializing)]
	pub password_hash: String,
}

/// A research project owned by an account.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
	pub id: i64,
	pub name: String,
	pub start_date: NaiveDate,
	#[serde(skip_serializing)]
	pub account_id: i64,
}

/// A person who can be assigned to work packages and tasks.
///
/// Members are global: the same person may appear in any project.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
	pub id: i64,
	pub name: String,
	pub wage: Decimal,
}

/// A work package: a block of project work spanning an inclusive week
/// window, with an assigned set of members.
#[derive(Debug, Clone, Serialize)]
pub struct WorkPackage {
	pub id: i64,
	#[serde(rename = "project")]
	pub project_id: i64,
	pub name: String,
	pub description: String,
	pub start_week: i64,
	pub end_week: i64,
	pub status: Status,
	#[serde(rename = "users")]
	pub member_ids: Vec<i64>,
}

/// A task inside a work package. Its week window must stay inside the
/// parent's window and its members must be drawn from the parent's.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
	pub id: i64,
	#[serde(rename = "work_package")]
	pub work_package_id: i64,
	pub name: String,
	pub description: String,
	pub start_week: i64,
	pub end_week: i64,
	pub status: Status,
	#[serde(rename = "users")]
	pub member_ids: Vec<i64>,
}

/// A deliverable due at a specific week of its work package.
#[derive(Debug, Clone, Serialize)]
pub struct Deliverable {
	pub id: i64,
	#[serde(rename = "work_package")]
	pub work_package_id: i64,
	pub name: String,
	pub description: Option<String>,
	pub deadline: i64,
}

/// One cell of the budget plan: how much of a member's time a work
/// package consumes in a given month.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
	pub work_package_id: i64,
	pub member_id: i64,
	pub month: i64,
	pub contribution: Decimal,
}
