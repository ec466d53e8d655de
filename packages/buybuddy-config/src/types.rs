use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub assistant: Assistant,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	/// Classifies a question into a direct answer or a pair of receipt filters.
	pub intent: LlmProviderConfig,
	/// Writes the final answer from the compact receipt payload.
	pub answer: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Assistant {
	/// Hard cap on receipts returned by a single filter pass.
	pub result_ceiling: u32,
	/// A specific result list at least this long is returned without backfill.
	pub fusion_min_specific: u32,
	/// Maximum number of general results appended to a short specific list.
	pub fusion_max_backfill: u32,
	/// Total intent classification attempts per turn, first call included.
	pub intent_attempts: u32,
	/// Offset of the user's local clock from UTC, in minutes.
	pub utc_offset_minutes: i32,
	/// Answer models a user preference may select. Empty accepts any non-empty preference.
	pub allowed_answer_models: Vec<String>,
	/// Returned when answer synthesis produces no usable text.
	pub apology: String,
}
impl Default for Assistant {
	fn default() -> Self {
		Self {
			result_ceiling: 30,
			fusion_min_specific: 10,
			fusion_max_backfill: 5,
			intent_attempts: 2,
			utc_offset_minutes: -180,
			allowed_answer_models: Vec::new(),
			apology: "I'm sorry, I couldn't find an answer to your question.".to_string(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	#[serde(default = "default_user_header")]
	pub user_header: String,
	pub api_auth_token: Option<String>,
}

fn default_user_header() -> String {
	"x-user-id".to_string()
}
