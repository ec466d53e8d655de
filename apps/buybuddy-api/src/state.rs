use std::sync::Arc;

use axum::http::HeaderName;
use color_eyre::eyre;

use buybuddy_service::AssistantService;
use buybuddy_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AssistantService>,
	/// Header the upstream auth layer uses to hand over the caller's user id.
	pub user_header: HeaderName,
	pub auth_token: Option<Arc<str>>,
}
impl AppState {
	pub async fn new(config: buybuddy_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Self::from_service(AssistantService::new(config, db))
	}

	pub fn from_service(service: AssistantService) -> color_eyre::Result<Self> {
		let user_header = HeaderName::from_bytes(service.cfg.security.user_header.as_bytes())
			.map_err(|err| eyre::eyre!("security.user_header is not a valid header name: {err}."))?;
		let auth_token = service.cfg.security.api_auth_token.as_deref().map(Arc::from);

		Ok(Self { service: Arc::new(service), user_header, auth_token })
	}
}
