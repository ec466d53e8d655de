use buybuddy_config::{Assistant, LlmProviderConfig};
use buybuddy_providers::generation::Message;

use crate::{Error, GenerationProvider, Result};

/// Picks the user's preferred model when the deployment allows it.
pub fn select_model<'a>(preference: Option<&'a str>, assistant: &Assistant) -> Option<&'a str> {
	let preference = preference.map(str::trim).filter(|model| !model.is_empty())?;

	if assistant.allowed_answer_models.is_empty()
		|| assistant.allowed_answer_models.iter().any(|allowed| allowed == preference)
	{
		Some(preference)
	} else {
		tracing::warn!(model = preference, "Ignoring answer model outside the allowed list.");

		None
	}
}

/// Runs one answer call. A reply without usable text becomes `apology`; a failed call is an
/// error.
pub async fn synthesize(
	provider: &dyn GenerationProvider,
	cfg: &LlmProviderConfig,
	model: Option<&str>,
	prompt: &str,
	apology: &str,
) -> Result<String> {
	let messages = [Message::user(prompt)];
	let reply = provider
		.generate(cfg, model, &messages)
		.await
		.map_err(|err| Error::Synthesis { message: err.to_string() })?;

	match reply {
		Some(text) if !text.trim().is_empty() => Ok(text),
		_ => {
			tracing::warn!("Answer provider returned no text. Falling back to apology.");

			Ok(apology.to_string())
		},
	}
}
