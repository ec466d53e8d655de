use uuid::Uuid;

use crate::{Result, db::Db};

/// The assistant model the user picked, if any.
pub async fn assistant_model(db: &Db, user_id: Uuid) -> Result<Option<String>> {
	let model: Option<Option<String>> =
		sqlx::query_scalar("SELECT assistant_model FROM user_preferences WHERE user_id = $1")
			.bind(user_id)
			.fetch_optional(&db.pool)
			.await?;

	Ok(model.flatten().filter(|model| !model.trim().is_empty()))
}

pub async fn set_assistant_model(db: &Db, user_id: Uuid, model: Option<&str>) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO user_preferences (user_id, assistant_model, updated_at)
VALUES ($1, $2, now())
ON CONFLICT (user_id) DO UPDATE
SET assistant_model = EXCLUDED.assistant_model, updated_at = now()",
	)
	.bind(user_id)
	.bind(model)
	.execute(&db.pool)
	.await?;

	Ok(())
}
