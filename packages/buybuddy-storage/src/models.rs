use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct ReceiptRow {
	pub receipt_id: Uuid,
	pub user_id: Uuid,
	pub company: String,
	pub purchase_date: Option<Date>,
	pub total: f64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReceiptItemRow {
	pub item_id: i64,
	pub receipt_id: Uuid,
	pub name: String,
	pub raw_name: String,
	pub brand: Option<String>,
	pub quantity: f64,
	pub unit: String,
	pub unit_price: f64,
	pub total_price: f64,
	pub category: Option<String>,
	pub subcategory: Option<String>,
	pub barcode: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ChatMessage {
	pub message_id: Uuid,
	pub conversation_id: Uuid,
	pub user_id: Uuid,
	pub role: String,
	pub content: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CategoryPairRow {
	pub category: String,
	pub subcategory: Option<String>,
}
