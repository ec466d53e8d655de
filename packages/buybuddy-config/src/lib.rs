mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Assistant, Config, LlmProviderConfig, Postgres, Providers, Security, Service, Storage,
};

use std::{fs, path::Path};

const MAX_INTENT_ATTEMPTS: u32 = 3;
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse_at(&raw, path)
}

/// Parses, normalizes, and validates an in-memory config document.
pub fn parse(raw: &str) -> Result<Config> {
	parse_at(raw, Path::new("<inline>"))
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, provider) in [("intent", &cfg.providers.intent), ("answer", &cfg.providers.answer)]
	{
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if provider.model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if !provider.temperature.is_finite() || provider.temperature < 0.0 {
			return Err(Error::Validation {
				message: format!("Provider {label} temperature must be a finite number >= 0."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	let assistant = &cfg.assistant;

	if assistant.result_ceiling == 0 {
		return Err(Error::Validation {
			message: "assistant.result_ceiling must be greater than zero.".to_string(),
		});
	}
	if assistant.fusion_min_specific == 0 {
		return Err(Error::Validation {
			message: "assistant.fusion_min_specific must be greater than zero.".to_string(),
		});
	}
	if assistant.intent_attempts == 0 || assistant.intent_attempts > MAX_INTENT_ATTEMPTS {
		return Err(Error::Validation {
			message: format!(
				"assistant.intent_attempts must be in the range 1-{MAX_INTENT_ATTEMPTS}."
			),
		});
	}
	if assistant.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
		return Err(Error::Validation {
			message: "assistant.utc_offset_minutes must be within +/-18 hours.".to_string(),
		});
	}
	if assistant.apology.trim().is_empty() {
		return Err(Error::Validation {
			message: "assistant.apology must be non-empty.".to_string(),
		});
	}
	if cfg.security.user_header.trim().is_empty() {
		return Err(Error::Validation {
			message: "security.user_header must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.security.user_header = cfg.security.user_header.trim().to_ascii_lowercase();

	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}

	cfg.assistant.allowed_answer_models = cfg
		.assistant
		.allowed_answer_models
		.iter()
		.map(|model| model.trim())
		.filter(|model| !model.is_empty())
		.map(str::to_string)
		.collect();
}

fn parse_at(raw: &str, path: &Path) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}
