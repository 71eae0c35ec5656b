//! Deletion Cascade Integration Tests
//!
//! **Purpose:**
//! Verifies the deletion fan-out across the hierarchy: removing a work
//! package takes its tasks, deliverables and budget entries with it,
//! removing a project clears its whole subtree, and removing a team
//! member detaches it everywhere without touching the entities it was
//! assigned to.
//!
//! **Test Coverage:**
//! - Work package deletion clearing tasks, deliverables and budget rows
//! - Project deletion clearing the subtree while siblings survive
//! - Member deletion detaching assignments and budget contributions
//! - Task deletion leaving the parent untouched

mod common;

use common::{TestApp, spawn_app};
use hyper::StatusCode;
use serde_json::json;

struct Plan {
	project: i64,
	wp: i64,
	member: i64,
	task: i64,
	deliverable: i64,
}

/// One project with a fully-populated work package.
async fn seed_plan(app: &TestApp, token: &str, name: &str) -> Plan {
	let project = app.create_project(token, name).await;
	let member = app.create_member(token, &format!("{} member", name), "200.00").await;
	let wp = app
		.create_work_package(token, project, "WP1", 1, 12, &[member])
		.await;

	let (status, task) = app
		.post_scoped(
			"/api/tasks/",
			token,
			project,
			&json!({"work_package": wp, "name": "Analysis", "start_week": 2, "end_week": 6, "users": [member]}),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, deliverable) = app
		.post_scoped(
			"/api/deliverables/",
			token,
			project,
			&json!({"work_package": wp, "name": "Report", "deadline": 6}),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _) = app
		.post_scoped(
			"/api/budget/",
			token,
			project,
			&json!({format!("{}_{}_{}", wp, member, 1): 0.5}),
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	Plan {
		project,
		wp,
		member,
		task: task["id"].as_i64().unwrap(),
		deliverable: deliverable["id"].as_i64().unwrap(),
	}
}

#[tokio::test]
async fn deleting_a_work_package_removes_its_children() {
	let app = spawn_app().await;
	let token = app.register_and_login("lead").await;
	let plan = seed_plan(&app, &token, "Fusion").await;

	let (status, body) = app
		.delete_scoped(
			&format!("/api/workpackages/{}/", plan.wp),
			&token,
			plan.project,
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["detail"], "WorkPackage deleted successfully!");

	let (_, tasks) = app.get_scoped("/api/tasks/", &token, plan.project).await;
	assert_eq!(tasks, json!([]));

	let (_, deliverables) = app
		.get_scoped("/api/deliverables/", &token, plan.project)
		.await;
	assert_eq!(deliverables, json!([]));

	let (_, budget) = app.get_scoped("/api/budget/", &token, plan.project).await;
	assert_eq!(budget, json!({}));

	let (status, _) = app
		.get_scoped(&format!("/api/tasks/{}/", plan.task), &token, plan.project)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_project_removes_the_subtree_and_spares_siblings() {
	let app = spawn_app().await;
	let token = app.register_and_login("lead").await;
	let doomed = seed_plan(&app, &token, "Doomed").await;
	let kept = seed_plan(&app, &token, "Kept").await;

	let (status, body) = app
		.delete(&format!("/api/project/{}/", doomed.project), &token)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["detail"], "Project deleted successfully!");

	// The deleted project no longer resolves as a scope.
	let (status, _) = app.get_scoped("/api/tasks/", &token, doomed.project).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (_, projects) = app.get("/api/project/", &token).await;
	assert_eq!(projects.as_array().map(Vec::len), Some(1));
	assert_eq!(projects[0]["id"], kept.project);

	// The sibling's subtree is intact.
	let (_, tasks) = app.get_scoped("/api/tasks/", &token, kept.project).await;
	assert_eq!(tasks.as_array().map(Vec::len), Some(1));
	let (_, budget) = app.get_scoped("/api/budget/", &token, kept.project).await;
	assert_eq!(
		budget,
		json!({format!("{}_{}_{}", kept.wp, kept.member, 1): 0.5})
	);
}

#[tokio::test]
async fn deleting_a_member_detaches_it_everywhere() {
	let app = spawn_app().await;
	let token = app.register_and_login("lead").await;
	let plan = seed_plan(&app, &token, "Fusion").await;

	let (status, body) = app
		.delete(&format!("/api/users/{}/", plan.member), &token)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["detail"], "User deleted successfully!");

	// Assignments fall away, the entities themselves stay.
	let (status, wp) = app
		.get_scoped(
			&format!("/api/workpackages/{}/", plan.wp),
			&token,
			plan.project,
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(wp["users"], json!([]));

	let (status, task) = app
		.get_scoped(&format!("/api/tasks/{}/", plan.task), &token, plan.project)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(task["users"], json!([]));

	let (_, budget) = app.get_scoped("/api/budget/", &token, plan.project).await;
	assert_eq!(budget, json!({}));
}

#[tokio::test]
async fn deleting_a_member_spares_the_others() {
	let app = spawn_app().await;
	let token = app.register_and_login("lead").await;
	let project = app.create_project(&token, "Fusion").await;
	let ada = app.create_member(&token, "Ada", "250.00").await;
	let grace = app.create_member(&token, "Grace", "300.00").await;
	let wp = app
		.create_work_package(&token, project, "WP1", 1, 12, &[ada, grace])
		.await;

	app.post_scoped(
		"/api/budget/",
		&token,
		project,
		&json!({
			format!("{}_{}_{}", wp, ada, 1): 0.5,
			format!("{}_{}_{}", wp, grace, 1): 0.25,
		}),
	)
	.await;

	app.delete(&format!("/api/users/{}/", ada), &token).await;

	let (_, wp_body) = app
		.get_scoped(&format!("/api/workpackages/{}/", wp), &token, project)
		.await;
	assert_eq!(wp_body["users"], json!([grace]));

	let (_, budget) = app.get_scoped("/api/budget/", &token, project).await;
	assert_eq!(budget, json!({format!("{}_{}_{}", wp, grace, 1): 0.25}));
}

#[tokio::test]
async fn deleting_a_task_leaves_the_parent_alone() {
	let app = spawn_app().await;
	let token = app.register_and_login("lead").await;
	let plan = seed_plan(&app, &token, "Fusion").await;

	let (status, body) = app
		.delete_scoped(&format!("/api/tasks/{}/", plan.task), &token, plan.project)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["detail"], "Task deleted successfully!");

	let (status, _) = app
		.get_scoped(&format!("/api/tasks/{}/", plan.task), &token, plan.project)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// Parent, deliverable and budget survive.
	let (status, _) = app
		.get_scoped(
			&format!("/api/workpackages/{}/", plan.wp),
			&token,
			plan.project,
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = app
		.get_scoped(
			&format!("/api/deliverables/{}/", plan.deliverable),
			&token,
			plan.project,
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (_, budget) = app.get_scoped("/api/budget/", &token, plan.project).await;
	assert_eq!(
		budget,
		json!({format!("{}_{}_{}", plan.wp, plan.member, 1): 0.5})
	);
}
