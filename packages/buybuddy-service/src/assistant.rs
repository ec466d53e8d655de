//! One assistant turn: classify, retrieve, fuse, encode, synthesize, record.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use buybuddy_domain::{
	Category, ChatRole, ChatTurn, FusionPolicy, QueryFilter, Receipt, compact, fusion,
};
use buybuddy_storage::{categories, chat, preferences, receipts};

use crate::{
	AssistantService, Error, Intent, Result, intent,
	prompts::{self, IntentPromptArgs},
	synthesis,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
	pub question: String,
	#[serde(default)]
	pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
	pub answer: String,
	pub conversation_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
	pub message_id: Uuid,
	pub role: ChatRole,
	pub content: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

impl AssistantService {
	pub async fn answer(&self, user_id: Uuid, req: AskRequest) -> Result<AskResponse> {
		let question = req.question.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest {
				message: "question must not be empty.".to_string(),
			});
		}

		let conversation_id = req.conversation_id.unwrap_or_else(Uuid::new_v4);
		let history = chat::list_turns(&self.db, user_id, conversation_id).await?;
		let (preference, first_purchase, vocabulary) = tokio::join!(
			self.answer_model_preference(user_id),
			self.first_purchase_date(user_id),
			self.vocabulary(),
		);
		let prompt = prompts::intent_prompt(&IntentPromptArgs {
			question,
			history: &history,
			first_purchase,
			vocabulary: &vocabulary,
			now: self.local_now(),
		});

		tracing::debug!(%user_id, %conversation_id, prompt = %prompt, "Built intent prompt.");

		let intent = intent::classify(
			self.providers.intent.as_ref(),
			&self.cfg.providers.intent,
			&prompt,
			self.cfg.assistant.intent_attempts,
		)
		.await?;
		let (answer, receipt_count) = match intent {
			Intent::Direct { answer } if answer.trim().is_empty() =>
				(self.cfg.assistant.apology.clone(), 0),
			Intent::Direct { answer } => (answer, 0),
			Intent::Query { specific, general } => {
				let (specific_hits, general_hits) = tokio::try_join!(
					self.retrieve(user_id, specific.as_ref()),
					self.retrieve(user_id, general.as_ref()),
				)?;

				tracing::debug!(
					%user_id,
					specific = specific_hits.len(),
					general = general_hits.len(),
					"Retrieved receipts."
				);

				let fused = fusion::fuse(specific_hits, general_hits, self.fusion_policy());
				let payload = compact::encode(&fused, specific.as_ref());
				let payload_json = serde_json::to_string(&payload).map_err(|err| {
					Error::Synthesis { message: format!("Failed to encode receipts: {err}.") }
				})?;
				let prompt = prompts::answer_prompt(question, &history, &payload_json);

				tracing::debug!(
					%user_id,
					%conversation_id,
					prompt = %prompt,
					"Built answer prompt."
				);

				let model = synthesis::select_model(preference.as_deref(), &self.cfg.assistant);
				let answer = synthesis::synthesize(
					self.providers.answer.as_ref(),
					&self.cfg.providers.answer,
					model,
					&prompt,
					&self.cfg.assistant.apology,
				)
				.await?;

				(answer, payload.receipts.len())
			},
		};

		self.record_turn(user_id, conversation_id, question, &answer).await;

		tracing::info!(%user_id, %conversation_id, receipts = receipt_count, "Answered question.");

		Ok(AskResponse { answer, conversation_id })
	}

	pub async fn history(&self, user_id: Uuid, conversation_id: Uuid) -> Result<Vec<HistoryEntry>> {
		let messages = chat::list_messages(&self.db, user_id, conversation_id).await?;
		let mut entries = Vec::with_capacity(messages.len());

		for message in messages {
			let message_id = message.message_id;
			let created_at = message.created_at;
			let ChatTurn { role, content } = chat::to_turn(message)?;

			entries.push(HistoryEntry { message_id, role, content, created_at });
		}

		Ok(entries)
	}

	pub async fn delete_conversation(&self, user_id: Uuid, conversation_id: Uuid) -> Result<u64> {
		let deleted = chat::delete_conversation(&self.db, user_id, conversation_id).await?;

		tracing::info!(%user_id, %conversation_id, deleted, "Deleted conversation.");

		Ok(deleted)
	}

	async fn retrieve(&self, user_id: Uuid, filter: Option<&QueryFilter>) -> Result<Vec<Receipt>> {
		let Some(filter) = filter else {
			return Ok(Vec::new());
		};
		let ceiling = self.cfg.assistant.result_ceiling;

		Ok(receipts::query_receipts(&self.db, user_id, filter, ceiling).await?)
	}

	async fn first_purchase_date(&self, user_id: Uuid) -> Option<Date> {
		if let Some(cached) = self.first_purchase.get(user_id) {
			return cached;
		}

		match receipts::first_purchase_date(&self.db, user_id).await {
			Ok(date) => {
				self.first_purchase.set(user_id, date);

				date
			},
			Err(err) => {
				tracing::warn!(%user_id, error = %err, "Failed to look up first purchase date.");

				None
			},
		}
	}

	async fn answer_model_preference(&self, user_id: Uuid) -> Option<String> {
		preferences::assistant_model(&self.db, user_id).await.unwrap_or_else(|err| {
			tracing::warn!(%user_id, error = %err, "Failed to read answer model preference.");

			None
		})
	}

	async fn vocabulary(&self) -> Vec<Category> {
		categories::list_vocabulary(&self.db).await.unwrap_or_else(|err| {
			tracing::warn!(error = %err, "Failed to load category vocabulary.");

			Vec::new()
		})
	}

	async fn record_turn(
		&self,
		user_id: Uuid,
		conversation_id: Uuid,
		question: &str,
		answer: &str,
	) {
		for (role, content) in [(ChatRole::User, question), (ChatRole::Assistant, answer)] {
			if let Err(err) =
				chat::insert_message(&self.db, user_id, conversation_id, role, content).await
			{
				tracing::warn!(
					%user_id,
					%conversation_id,
					%role,
					error = %err,
					"Failed to persist chat message."
				);
			}
		}
	}

	fn fusion_policy(&self) -> FusionPolicy {
		FusionPolicy {
			min_specific: self.cfg.assistant.fusion_min_specific as usize,
			max_backfill: self.cfg.assistant.fusion_max_backfill as usize,
		}
	}

	fn local_now(&self) -> OffsetDateTime {
		let offset = UtcOffset::from_whole_seconds(self.cfg.assistant.utc_offset_minutes * 60)
			.unwrap_or(UtcOffset::UTC);

		OffsetDateTime::now_utc().to_offset(offset)
	}
}
