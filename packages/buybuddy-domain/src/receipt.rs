use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

/// A purchase owned by exactly one user, with its line items in receipt order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
	pub receipt_id: Uuid,
	pub user_id: Uuid,
	pub company: String,
	pub purchase_date: Option<Date>,
	pub total: f64,
	pub items: Vec<ReceiptItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
	pub item_id: i64,
	/// Normalized product name.
	pub name: String,
	/// Product name as printed on the receipt.
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
