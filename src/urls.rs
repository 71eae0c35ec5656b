//! URL table.
//!
//! Everything mounts under `/api`. Registration and the token
//! endpoints are public; the rest sit behind the auth middleware
//! configured in `build_app`.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtAuth, PasswordHasher};
use crate::router::{Router, path};
use crate::views::auth::{RegisterView, TokenObtainView, TokenRefreshView, TokenVerifyView};
use crate::views::budget::BudgetView;
use crate::views::deliverables::{DeliverableCollection, DeliverableItem};
use crate::views::members::{MemberCollection, MemberItem};
use crate::views::projects::{ProjectCollection, ProjectItem};
use crate::views::tasks::{TaskCollection, TaskItem};
use crate::views::work_packages::{WorkPackageCollection, WorkPackageItem};

pub fn build_router(pool: SqlitePool, jwt: Arc<JwtAuth>, hasher: Arc<dyn PasswordHasher>) -> Router {
	let mut router = Router::new();

	router.mount(
		"/api",
		vec![
			path(
				"/register/",
				Arc::new(RegisterView::new(pool.clone(), hasher.clone())),
			)
			.with_name("register"),
			path(
				"/token/",
				Arc::new(TokenObtainView::new(pool.clone(), jwt.clone(), hasher)),
			)
			.with_name("token_obtain_pair"),
			path("/token/refresh/", Arc::new(TokenRefreshView::new(jwt.clone())))
				.with_name("token_refresh"),
			path("/token/verify/", Arc::new(TokenVerifyView::new(jwt))).with_name("token_verify"),
			path("/project/", Arc::new(ProjectCollection::new(pool.clone()))).with_name("projects"),
			path("/project/{id}/", Arc::new(ProjectItem::new(pool.clone())))
				.with_name("project_detail"),
			path("/users/", Arc::new(MemberCollection::new(pool.clone()))).with_name("users"),
			path("/users/{id}/", Arc::new(MemberItem::new(pool.clone()))).with_name("user_detail"),
			path(
				"/workpackages/",
				Arc::new(WorkPackageCollection::new(pool.clone())),
			)
			.with_name("workpackages"),
			path(
				"/workpackages/{id}/",
				Arc::new(WorkPackageItem::new(pool.clone())),
			)
			.with_name("workpackage_detail"),
			path("/tasks/", Arc::new(TaskCollection::new(pool.clone()))).with_name("tasks"),
			path("/tasks/{id}/", Arc::new(TaskItem::new(pool.clone()))).with_name("task_detail"),
			path(
				"/deliverables/",
				Arc::new(DeliverableCollection::new(pool.clone())),
			)
			.with_name("deliverables"),
			path(
				"/deliverables/{id}/",
				Arc::new(DeliverableItem::new(pool.clone())),
			)
			.with_name("deliverable_detail"),
			path("/budget/", Arc::new(BudgetView::new(pool))).with_name("budget"),
		],
	);

	router
}
