use uuid::Uuid;

use buybuddy_domain::{ChatRole, ChatTurn};

use crate::{Error, Result, db::Db, models::ChatMessage};

/// Live messages of one conversation, oldest first.
pub async fn list_messages(
	db: &Db,
	user_id: Uuid,
	conversation_id: Uuid,
) -> Result<Vec<ChatMessage>> {
	let rows = sqlx::query_as::<_, ChatMessage>(
		"\
SELECT message_id, conversation_id, user_id, role, content, created_at
FROM chat_messages
WHERE user_id = $1
	AND conversation_id = $2
	AND deleted_at IS NULL
ORDER BY message_seq ASC",
	)
	.bind(user_id)
	.bind(conversation_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Same as [`list_messages`], narrowed to role and content.
pub async fn list_turns(db: &Db, user_id: Uuid, conversation_id: Uuid) -> Result<Vec<ChatTurn>> {
	list_messages(db, user_id, conversation_id).await?.into_iter().map(to_turn).collect()
}

pub async fn insert_message(
	db: &Db,
	user_id: Uuid,
	conversation_id: Uuid,
	role: ChatRole,
	content: &str,
) -> Result<Uuid> {
	let message_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO chat_messages (message_id, conversation_id, user_id, role, content)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(message_id)
	.bind(conversation_id)
	.bind(user_id)
	.bind(role.as_str())
	.bind(content)
	.execute(&db.pool)
	.await?;

	Ok(message_id)
}

/// Soft-deletes every live message of the conversation and returns how many were affected.
pub async fn delete_conversation(db: &Db, user_id: Uuid, conversation_id: Uuid) -> Result<u64> {
	let result = sqlx::query(
		"\
UPDATE chat_messages
SET deleted_at = now()
WHERE user_id = $1
	AND conversation_id = $2
	AND deleted_at IS NULL",
	)
	.bind(user_id)
	.bind(conversation_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}

pub fn to_turn(message: ChatMessage) -> Result<ChatTurn> {
	let role = ChatRole::parse(&message.role).ok_or_else(|| {
		Error::InvalidRow(format!(
			"chat message {} has unknown role {:?}.",
			message.message_id, message.role
		))
	})?;

	Ok(ChatTurn { role, content: message.content })
}
