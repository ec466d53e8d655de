pub mod assistant;
pub mod cache;
pub mod intent;
pub mod prompts;
pub mod synthesis;

mod error;

pub use assistant::{AskRequest, AskResponse, HistoryEntry};
pub use cache::FirstPurchaseCache;
pub use error::{Error, Result};
pub use intent::Intent;

use std::{future::Future, pin::Pin, sync::Arc};

use buybuddy_config::{Config, LlmProviderConfig};
use buybuddy_providers::generation::{self, Message};
use buybuddy_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One text-generation call. `Ok(None)` means the call succeeded without usable text.
pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		model: Option<&'a str>,
		messages: &'a [Message],
	) -> BoxFuture<'a, buybuddy_providers::Result<Option<String>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub intent: Arc<dyn GenerationProvider>,
	pub answer: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(intent: Arc<dyn GenerationProvider>, answer: Arc<dyn GenerationProvider>) -> Self {
		Self { intent, answer }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { intent: provider.clone(), answer: provider }
	}
}

pub struct AssistantService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
	pub first_purchase: Arc<FirstPurchaseCache>,
}
impl AssistantService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_providers(cfg, db, Providers::default())
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers, first_purchase: Arc::new(FirstPurchaseCache::default()) }
	}
}

struct DefaultProviders;
impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		model: Option<&'a str>,
		messages: &'a [Message],
	) -> BoxFuture<'a, buybuddy_providers::Result<Option<String>>> {
		Box::pin(generation::generate(cfg, model, messages))
	}
}
