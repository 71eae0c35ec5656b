//! Project Scoping Integration Tests
//!
//! **Purpose:**
//! Verifies the multi-tenant scoping rule end to end: every work
//! package, task, deliverable and budget request resolves a project
//! scope from the `X-Project-Id` header or `project` query parameter,
//! and only rows of a project owned by the caller are ever visible.
//!
//! **Test Coverage:**
//! - Missing and malformed scope rejections
//! - Header precedence over the query parameter
//! - Foreign and absent projects answered identically
//! - Cross-account invisibility of projects and their children

mod common;

use common::spawn_app;
use hyper::StatusCode;
use serde_json::json;

#[tokio::test]
async fn scoped_endpoints_require_a_project() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;

	for path in [
		"/api/workpackages/",
		"/api/tasks/",
		"/api/deliverables/",
		"/api/budget/",
	] {
		let (status, body) = app.get(path, &token).await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "path: {}", path);
		assert_eq!(body["error"], "No project selected.", "path: {}", path);
	}
}

#[tokio::test]
async fn non_numeric_scope_is_rejected() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;

	let (status, body) = app
		.get_with_raw_scope("/api/workpackages/", &token, "fusion")
		.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "Invalid project identifier.");
}

#[tokio::test]
async fn whitespace_around_scope_is_tolerated() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;
	let project = app.create_project(&token, "Fusion").await;

	let (status, _) = app
		.get_with_raw_scope("/api/workpackages/", &token, &format!(" {} ", project))
		.await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn query_parameter_selects_the_project() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;
	let project = app.create_project(&token, "Fusion").await;
	app.create_work_package(&token, project, "WP1", 1, 10, &[])
		.await;

	let (status, body) = app
		.get(&format!("/api/workpackages/?project={}", project), &token)
		.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn header_wins_over_query_parameter() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;
	let first = app.create_project(&token, "Fusion").await;
	let second = app.create_project(&token, "Fission").await;
	app.create_work_package(&token, first, "WP1", 1, 10, &[])
		.await;

	// Query names the empty project; the header names the populated one.
	let (status, body) = app
		.get_scoped(
			&format!("/api/workpackages/?project={}", second),
			&token,
			first,
		)
		.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn foreign_project_scope_reads_as_missing() {
	let app = spawn_app().await;
	let owner = app.register_and_login("ada").await;
	let intruder = app.register_and_login("eve").await;
	let project = app.create_project(&owner, "Fusion").await;

	let (status, body) = app.get_scoped("/api/workpackages/", &intruder, project).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "Project not found.");
}

#[tokio::test]
async fn absent_project_scope_reads_as_missing() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;

	let (status, body) = app.get_scoped("/api/workpackages/", &token, 99).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "Project not found.");
}

#[tokio::test]
async fn projects_are_invisible_across_accounts() {
	let app = spawn_app().await;
	let owner = app.register_and_login("ada").await;
	let intruder = app.register_and_login("eve").await;
	let project = app.create_project(&owner, "Fusion").await;

	let (status, body) = app.get("/api/project/", &intruder).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().map(Vec::len), Some(0));

	let (status, body) = app
		.get(&format!("/api/project/{}/", project), &intruder)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "Project not found.");
}

#[tokio::test]
async fn children_stay_inside_their_scope() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;
	let first = app.create_project(&token, "Fusion").await;
	let second = app.create_project(&token, "Fission").await;
	let wp = app
		.create_work_package(&token, first, "WP1", 1, 10, &[])
		.await;

	// The work package only resolves under the project that owns it.
	let (status, _) = app
		.get_scoped(&format!("/api/workpackages/{}/", wp), &token, first)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = app
		.get_scoped(&format!("/api/workpackages/{}/", wp), &token, second)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "WorkPackage not found.");
}

#[tokio::test]
async fn team_members_are_shared_across_accounts() {
	let app = spawn_app().await;
	let ada = app.register_and_login("ada").await;
	let eve = app.register_and_login("eve").await;
	app.create_member(&ada, "Grace", "250.00").await;

	let (status, body) = app.get("/api/users/", &eve).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().map(Vec::len), Some(1));
	assert_eq!(body[0]["name"], "Grace");
}

#[tokio::test]
async fn writes_also_demand_scope() {
	let app = spawn_app().await;
	let token = app.register_and_login("ada").await;

	let (status, body) = app
		.post(
			"/api/workpackages/",
			&token,
			&json!({"name": "WP1", "start_week": 1, "end_week": 10}),
		)
		.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "No project selected.");
}
