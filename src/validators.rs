//! Containment and membership checks.
//!
//! Pure functions invoked before any work-package-scoped child write.
//! They see fully-merged entities (partial updates are merged with the
//! stored row first) and short-circuit on the first failure. The check
//! order at the call sites is fixed: work-package existence, then week
//! windows, then membership.

use std::collections::HashMap;

use thiserror::Error;

use crate::error::Error as CrateError;
use crate::models::WorkPackage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainmentError {
	#[error("end_week cannot precede start_week.")]
	InvertedWindow,

	#[error("Task weeks cannot exceed WorkPackage weeks.")]
	TaskOutsideWindow,

	#[error("Deliverable deadline must fall within WorkPackage weeks.")]
	DeadlineOutsideWindow,

	/// The proposed member id does not exist at all.
	#[error("User with ID {0} not found.")]
	UnknownMember(i64),

	/// The member exists but is not assigned to the work package.
	#[error("User {0} is not part of the WorkPackage.")]
	NotInWorkPackage(String),
}

impl From<ContainmentError> for CrateError {
	fn from(err: ContainmentError) -> Self {
		CrateError::Validation(err.to_string())
	}
}

/// Rejects windows whose end precedes their start.
pub fn validate_week_order(start_week: i64, end_week: i64) -> Result<(), ContainmentError> {
	if end_week < start_week {
		return Err(ContainmentError::InvertedWindow);
	}
	Ok(())
}

/// A task window must lie inside its work package's window, bounds
/// inclusive: equal weeks are valid.
pub fn validate_task_window(
	work_package: &WorkPackage,
	start_week: i64,
	end_week: i64,
) -> Result<(), ContainmentError> {
	if start_week < work_package.start_week || end_week > work_package.end_week {
		return Err(ContainmentError::TaskOutsideWindow);
	}
	Ok(())
}

/// A deliverable deadline must fall inside its work package's window,
/// bounds inclusive.
pub fn validate_deliverable_deadline(
	work_package: &WorkPackage,
	deadline: i64,
) -> Result<(), ContainmentError> {
	if deadline < work_package.start_week || deadline > work_package.end_week {
		return Err(ContainmentError::DeadlineOutsideWindow);
	}
	Ok(())
}

/// Every proposed member id must name an existing member.
///
/// Used for work-package writes, where assignment is otherwise
/// unconstrained.
pub fn validate_members_exist(
	known_names: &HashMap<i64, String>,
	proposed: &[i64],
) -> Result<(), ContainmentError> {
	for member_id in proposed {
		if !known_names.contains_key(member_id) {
			return Err(ContainmentError::UnknownMember(*member_id));
		}
	}
	Ok(())
}

/// Every proposed task member must already belong to the work package.
///
/// Fails on the first offender, distinguishing "no such member" (by id)
/// from "exists but not in this package" (by name).
pub fn validate_task_membership(
	work_package: &WorkPackage,
	known_names: &HashMap<i64, String>,
	proposed: &[i64],
) -> Result<(), ContainmentError> {
	for member_id in proposed {
		let name = match known_names.get(member_id) {
			Some(name) => name,
			None => return Err(ContainmentError::UnknownMember(*member_id)),
		};
		if !work_package.member_ids.contains(member_id) {
			return Err(ContainmentError::NotInWorkPackage(name.clone()));
		}
	}
	Ok(())
}
