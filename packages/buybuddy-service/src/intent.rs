//! Question classification into a direct reply or a pair of receipt filters.

use serde::Deserialize;

use buybuddy_config::LlmProviderConfig;
use buybuddy_domain::QueryFilter;
use buybuddy_providers::generation::Message;

use crate::{Error, GenerationProvider, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
	/// Answerable without touching receipts.
	Direct { answer: String },
	/// Needs retrieval. `specific` is precise, `general` is the broadened backfill.
	Query { specific: Option<QueryFilter>, general: Option<QueryFilter> },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawIntent {
	Direct {
		#[serde(default)]
		answer: Option<String>,
	},
	Query {
		#[serde(default)]
		specific: Option<QueryFilter>,
		#[serde(default)]
		general: Option<QueryFilter>,
	},
}

/// Parses a classifier reply, tolerating Markdown code fences and surrounding prose.
pub fn parse_intent(raw: &str) -> std::result::Result<Intent, String> {
	let body = strip_fences(raw);
	let parsed = serde_json::from_str::<RawIntent>(body).or_else(|first_err| {
		match outermost_object(body) {
			Some(fragment) if fragment.len() < body.len() =>
				serde_json::from_str::<RawIntent>(fragment).map_err(|err| err.to_string()),
			_ => Err(first_err.to_string()),
		}
	})?;

	Ok(match parsed {
		RawIntent::Direct { answer } => Intent::Direct { answer: answer.unwrap_or_default() },
		RawIntent::Query { specific, general } => Intent::Query { specific, general },
	})
}

/// Calls the intent provider until a reply parses, at most `attempts` times.
///
/// Transport failures, empty replies, and unparseable replies all count as a failed attempt.
pub async fn classify(
	provider: &dyn GenerationProvider,
	cfg: &LlmProviderConfig,
	prompt: &str,
	attempts: u32,
) -> Result<Intent> {
	let attempts = attempts.max(1);
	let messages = [Message::user(prompt)];
	let mut last_err = String::new();

	for attempt in 1..=attempts {
		let reply = provider.generate(cfg, None, &messages).await;

		last_err = match reply {
			Ok(Some(text)) => {
				tracing::debug!(attempt, response = %text, "Intent classifier replied.");

				match parse_intent(&text) {
					Ok(intent) => return Ok(intent),
					Err(err) => format!("Unparseable intent response: {err}."),
				}
			},
			Ok(None) => "Intent classifier returned an empty response.".to_string(),
			Err(err) => err.to_string(),
		};

		tracing::warn!(attempt, error = %last_err, "Intent classification attempt failed.");
	}

	Err(Error::Classification { attempts, message: last_err })
}

fn strip_fences(raw: &str) -> &str {
	let trimmed = raw.trim();
	let Some(rest) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	// Drop the info string, e.g. "json".
	let rest = match rest.find('\n') {
		Some(newline) if !rest[..newline].contains('{') => &rest[newline + 1..],
		_ => rest.trim_start_matches(|ch: char| ch.is_ascii_alphabetic()),
	};

	rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn outermost_object(text: &str) -> Option<&str> {
	let start = text.find('{')?;
	let end = text.rfind('}')?;

	(start < end).then(|| &text[start..=end])
}
