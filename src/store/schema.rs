//! Database schema bootstrap.
//!
//! Tables are created on startup if they do not exist, so a fresh
//! SQLite file (or an in-memory database in tests) is usable without a
//! separate migration step. Deletes cascade in store code, not through
//! engine-level `ON DELETE` clauses, so the association tables carry no
//! foreign-key actions.

use sqlx::SqlitePool;

use crate::error::Result;

const CREATE_ACCOUNTS: &str = "CREATE TABLE IF NOT EXISTS accounts (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	username TEXT NOT NULL UNIQUE,
	email TEXT NOT NULL,
	password_hash TEXT NOT NULL
)";

const CREATE_PROJECTS: &str = "CREATE TABLE IF NOT EXISTS projects (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL,
	start_date TEXT NOT NULL,
	account_id INTEGER NOT NULL REFERENCES accounts(id)
)";

const CREATE_TEAM_MEMBERS: &str = "CREATE TABLE IF NOT EXISTS team_members (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL,
	wage TEXT NOT NULL
)";

const CREATE_WORK_PACKAGES: &str = "CREATE TABLE IF NOT EXISTS work_packages (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	project_id INTEGER NOT NULL REFERENCES projects(id),
	name TEXT NOT NULL,
	description TEXT NOT NULL DEFAULT '',
	start_week INTEGER NOT NULL,
	end_week INTEGER NOT NULL,
	status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'closed'))
)";

const CREATE_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	work_package_id INTEGER NOT NULL REFERENCES work_packages(id),
	name TEXT NOT NULL,
	description TEXT NOT NULL DEFAULT '',
	start_week INTEGER NOT NULL,
	end_week INTEGER NOT NULL,
	status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'closed'))
)";

const CREATE_DELIVERABLES: &str = "CREATE TABLE IF NOT EXISTS deliverables (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	work_package_id INTEGER NOT NULL REFERENCES work_packages(id),
	name TEXT NOT NULL,
	description TEXT,
	deadline INTEGER NOT NULL
)";

const CREATE_WORK_PACKAGE_MEMBERS: &str = "CREATE TABLE IF NOT EXISTS work_package_members (
	work_package_id INTEGER NOT NULL,
	member_id INTEGER NOT NULL,
	PRIMARY KEY (work_package_id, member_id)
)";

const CREATE_TASK_MEMBERS: &str = "CREATE TABLE IF NOT EXISTS task_members (
	task_id INTEGER NOT NULL,
	member_id INTEGER NOT NULL,
	PRIMARY KEY (task_id, member_id)
)";

// The triple key is the primary key: one contribution per
// (work package, member, month).
const CREATE_BUDGET_ENTRIES: &str = "CREATE TABLE IF NOT EXISTS budget_entries (
	work_package_id INTEGER NOT NULL,
	member_id INTEGER NOT NULL,
	month INTEGER NOT NULL,
	contribution TEXT NOT NULL,
	PRIMARY KEY (work_package_id, member_id, month)
)";

const CREATE_INDEXES: &[&str] = &[
	"CREATE INDEX IF NOT EXISTS idx_projects_account ON projects(account_id)",
	"CREATE INDEX IF NOT EXISTS idx_work_packages_project ON work_packages(project_id)",
	"CREATE INDEX IF NOT EXISTS idx_tasks_work_package ON tasks(work_package_id)",
	"CREATE INDEX IF NOT EXISTS idx_deliverables_work_package ON deliverables(work_package_id)",
	"CREATE INDEX IF NOT EXISTS idx_budget_work_package ON budget_entries(work_package_id)",
];

/// Creates every table and index, skipping any that already exist.
pub async fn create_all(pool: &SqlitePool) -> Result<()> {
	let tables = [
		CREATE_ACCOUNTS,
		CREATE_PROJECTS,
		CREATE_TEAM_MEMBERS,
		CREATE_WORK_PACKAGES,
		CREATE_TASKS,
		CREATE_DELIVERABLES,
		CREATE_WORK_PACKAGE_MEMBERS,
		CREATE_TASK_MEMBERS,
		CREATE_BUDGET_ENTRIES,
	];
	for statement in tables {
		sqlx::query(statement).execute(pool).await?;
	}
	for statement in CREATE_INDEXES {
		sqlx::query(statement).execute(pool).await?;
	}
	Ok(())
}
