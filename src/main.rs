//! planboard server binary.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use planboard::conf::{DEV_SECRET_KEY, Settings};
use planboard::server::HttpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let settings = Settings::from_env().context("failed to load settings")?;

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	if settings.secret_key == DEV_SECRET_KEY {
		tracing::warn!(
			"PLANBOARD_SECRET_KEY is not set; tokens are signed with the insecure development default"
		);
	}

	let pool = planboard::store::connect(&settings.database_url)
		.await
		.context("failed to open the database")?;

	let app = planboard::build_app(pool, &settings);

	let addr = settings.bind_addr().parse().context("invalid bind address")?;
	HttpServer::new(app).listen(addr).await?;

	Ok(())
}
