use std::{
	collections::VecDeque,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use buybuddy_config::{Config, LlmProviderConfig};
use buybuddy_providers::generation::Message;
use buybuddy_service::{BoxFuture, GenerationProvider};

pub type Reply = buybuddy_providers::Result<Option<String>>;

/// Replays scripted replies in order and records every prompt it receives.
pub struct ScriptedProvider {
	replies: Mutex<VecDeque<Reply>>,
	prompts: Mutex<Vec<String>>,
	models: Mutex<Vec<Option<String>>>,
	calls: AtomicUsize,
}
impl ScriptedProvider {
	pub fn new(replies: Vec<Reply>) -> Arc<Self> {
		Arc::new(Self {
			replies: Mutex::new(replies.into()),
			prompts: Mutex::new(Vec::new()),
			models: Mutex::new(Vec::new()),
			calls: AtomicUsize::new(0),
		})
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn last_prompt(&self) -> String {
		self.prompts.lock().expect("Prompt log poisoned.").last().cloned().unwrap_or_default()
	}

	#[allow(dead_code)]
	pub fn models(&self) -> Vec<Option<String>> {
		self.models.lock().expect("Model log poisoned.").clone()
	}
}
impl GenerationProvider for ScriptedProvider {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		model: Option<&'a str>,
		messages: &'a [Message],
	) -> BoxFuture<'a, Reply> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.prompts
			.lock()
			.expect("Prompt log poisoned.")
			.extend(messages.iter().map(|message| message.content.clone()));
		self.models.lock().expect("Model log poisoned.").push(model.map(str::to_string));

		let reply = self.replies.lock().expect("Reply script poisoned.").pop_front();

		Box::pin(async move { reply.unwrap_or(Ok(None)) })
	}
}

pub fn text(reply: &str) -> Reply {
	Ok(Some(reply.to_string()))
}

#[allow(dead_code)]
pub fn outage() -> Reply {
	Err(buybuddy_providers::Error::InvalidResponse {
		provider_id: "scripted".to_string(),
		message: "Upstream outage.".to_string(),
	})
}

pub fn test_config(dsn: &str) -> Config {
	let raw = format!(
		r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "info"

[storage.postgres]
dsn            = "{dsn}"
pool_max_conns = 2

[providers.intent]
provider_id     = "test"
api_base        = "http://127.0.0.1:9"
api_key         = "intent-key"
path            = "/chat/completions"
model           = "intent-model"
temperature     = 0.0
timeout_ms      = 1000
default_headers = {{}}

[providers.answer]
provider_id     = "test"
api_base        = "http://127.0.0.1:9"
api_key         = "answer-key"
path            = "/chat/completions"
model           = "answer-model"
temperature     = 0.2
timeout_ms      = 1000
default_headers = {{}}

[assistant]
apology = "Sorry, no answer."

[security]
bind_localhost_only = true
"#
	);

	buybuddy_config::parse(&raw).expect("Failed to parse test config.")
}
