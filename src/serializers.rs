//! Wire payload types.
//!
//! One serializer per write endpoint, with `validator` derives covering
//! field shape (lengths, ranges, email format). Cross-entity rules
//! (week containment, membership) live in [`crate::validators`]; the
//! serializers only guarantee a well-formed payload.
//!
//! Patch variants carry every field as `Option`: absent fields leave the
//! stored value untouched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::{Error, Result};
use crate::models::Status;

/// Runs shape validation, flattening failures into a single
/// `Error::Validation` message.
///
/// # Errors
///
/// Returns a validation error listing each failing field.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<()> {
	payload
		.validate()
		.map_err(|errors| Error::Validation(flatten_errors(&errors)))
}

fn flatten_errors(errors: &ValidationErrors) -> String {
	let mut parts: Vec<String> = errors
		.field_errors()
		.iter()
		.map(|(field, field_errors)| {
			let message = field_errors
				.first()
				.and_then(|e| e.message.as_ref())
				.map(|m| m.to_string())
				.unwrap_or_else(|| format!("Invalid value for {}", field));
			format!("{}: {}", field, message)
		})
		.collect();
	// Field order from the map is unstable; sort for a deterministic message
	parts.sort();
	parts.join("; ")
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterSerializer {
	#[validate(length(
		min = 3,
		max = 150,
		message = "Username must be between 3 and 150 characters"
	))]
	pub username: String,

	#[validate(email(message = "Enter a valid email address"))]
	pub email: String,

	#[validate(length(min = 8, message = "Password must be at least 8 characters"))]
	pub password: String,

	pub password_confirm: String,
}

/// Credentials for obtaining a token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSerializer {
	pub username: String,
	pub password: String,
}

/// Refresh-token exchange payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSerializer {
	pub refresh: String,
}

/// Token verification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySerializer {
	pub token: String,
}

/// Project create/full-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProjectSerializer {
	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: String,

	pub start_date: NaiveDate,
}

/// Project partial-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProjectPatch {
	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: Option<String>,

	pub start_date: Option<NaiveDate>,
}

/// TeamMember create/full-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamMemberSerializer {
	#[validate(length(
		min = 1,
		max = 150,
		message = "Name must be between 1 and 150 characters"
	))]
	pub name: String,

	pub wage: Decimal,
}

/// TeamMember partial-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamMemberPatch {
	#[validate(length(
		min = 1,
		max = 150,
		message = "Name must be between 1 and 150 characters"
	))]
	pub name: Option<String>,

	pub wage: Option<Decimal>,
}

/// WorkPackage create/full-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkPackageSerializer {
	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: String,

	#[serde(default)]
	pub description: String,

	#[validate(range(min = 0, message = "start_week must not be negative"))]
	pub start_week: i64,

	#[validate(range(min = 0, message = "end_week must not be negative"))]
	pub end_week: i64,

	#[serde(default)]
	pub status: Status,

	#[serde(default)]
	pub users: Vec<i64>,
}

/// WorkPackage partial-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkPackagePatch {
	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: Option<String>,

	pub description: Option<String>,

	#[validate(range(min = 0, message = "start_week must not be negative"))]
	pub start_week: Option<i64>,

	#[validate(range(min = 0, message = "end_week must not be negative"))]
	pub end_week: Option<i64>,

	pub status: Option<Status>,

	pub users: Option<Vec<i64>>,
}

/// Task create/full-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskSerializer {
	pub work_package: i64,

	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: String,

	#[serde(default)]
	pub description: String,

	#[validate(range(min = 0, message = "start_week must not be negative"))]
	pub start_week: i64,

	#[validate(range(min = 0, message = "end_week must not be negative"))]
	pub end_week: i64,

	#[serde(default)]
	pub status: Status,

	#[serde(default)]
	pub users: Vec<i64>,
}

/// Task partial-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
	pub work_package: Option<i64>,

	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: Option<String>,

	pub description: Option<String>,

	#[validate(range(min = 0, message = "start_week must not be negative"))]
	pub start_week: Option<i64>,

	#[validate(range(min = 0, message = "end_week must not be negative"))]
	pub end_week: Option<i64>,

	pub status: Option<Status>,

	pub users: Option<Vec<i64>>,
}

/// Deliverable create/full-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliverableSerializer {
	pub work_package: i64,

	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: String,

	#[serde(default)]
	pub description: Option<String>,

	#[validate(range(min = 0, message = "deadline must not be negative"))]
	pub deadline: i64,
}

/// Deliverable partial-update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliverablePatch {
	pub work_package: Option<i64>,

	#[validate(length(
		min = 1,
		max = 200,
		message = "Name must be between 1 and 200 characters"
	))]
	pub name: Option<String>,

	pub description: Option<String>,

	#[validate(range(min = 0, message = "deadline must not be negative"))]
	pub deadline: Option<i64>,
}
