//! Text generation against an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
	pub role: &'static str,
	pub content: String,
}
impl Message {
	pub fn user(content: impl Into<String>) -> Self {
		Self { role: "user", content: content.into() }
	}
}

/// Sends one completion request. `model` overrides the configured model when present.
///
/// Returns the first choice's text, or `None` when the response carries no usable text.
pub async fn generate(
	cfg: &buybuddy_config::LlmProviderConfig,
	model: Option<&str>,
	messages: &[Message],
) -> Result<Option<String>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let model = model.unwrap_or(cfg.model.as_str());
	let body = serde_json::json!({
		"model": model,
		"temperature": cfg.temperature,
		"messages": messages,
	});

	tracing::debug!(provider_id = %cfg.provider_id, model, "Requesting completion.");

	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	if let Some(message) = reported_error(&json) {
		return Err(Error::InvalidResponse { provider_id: cfg.provider_id.clone(), message });
	}

	Ok(completion_text(&json))
}

// Some gateways report failures in a 200 body.
fn reported_error(json: &Value) -> Option<String> {
	let error = json.get("error").filter(|error| !error.is_null())?;
	let detail = error
		.get("message")
		.and_then(Value::as_str)
		.map(str::to_string)
		.unwrap_or_else(|| error.to_string());

	Some(format!("Completion endpoint reported an error: {detail}."))
}

fn completion_text(json: &Value) -> Option<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))?;
	let text = match content {
		Value::String(text) => text.clone(),
		// Some gateways split content into typed parts.
		Value::Array(parts) => parts
			.iter()
			.filter_map(|part| part.get("text").and_then(|text| text.as_str()))
			.collect::<Vec<_>>()
			.join(""),
		_ => return None,
	};

	if text.trim().is_empty() { None } else { Some(text) }
}
