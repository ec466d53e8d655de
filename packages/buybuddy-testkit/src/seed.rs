//! Row fixtures for tests that need receipts on disk.

use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone)]
pub struct ReceiptSeed {
	pub user_id: Uuid,
	pub company: &'static str,
	pub purchase_date: Option<Date>,
	pub total: f64,
	pub items: Vec<ItemSeed>,
}

#[derive(Debug, Clone)]
pub struct ItemSeed {
	pub name: &'static str,
	pub brand: Option<&'static str>,
	pub total_price: f64,
	pub category_id: Option<i64>,
	pub subcategory_id: Option<i64>,
}
impl ItemSeed {
	pub fn named(name: &'static str, total_price: f64) -> Self {
		Self { name, brand: None, total_price, category_id: None, subcategory_id: None }
	}
}

/// Inserts a category with the given subcategories and returns their ids in order.
pub async fn seed_category(
	pool: &PgPool,
	name: &str,
	subcategories: &[&str],
) -> Result<(i64, Vec<i64>)> {
	let category_id: i64 =
		sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING category_id")
			.bind(name)
			.fetch_one(pool)
			.await?;
	let mut subcategory_ids = Vec::with_capacity(subcategories.len());

	for subcategory in subcategories {
		let id: i64 = sqlx::query_scalar(
			"\
INSERT INTO subcategories (category_id, name)
VALUES ($1, $2)
RETURNING subcategory_id",
		)
		.bind(category_id)
		.bind(subcategory)
		.fetch_one(pool)
		.await?;

		subcategory_ids.push(id);
	}

	Ok((category_id, subcategory_ids))
}

pub async fn seed_receipt(pool: &PgPool, seed: &ReceiptSeed) -> Result<Uuid> {
	let receipt_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO receipts (receipt_id, user_id, company, purchase_date, total)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(receipt_id)
	.bind(seed.user_id)
	.bind(seed.company)
	.bind(seed.purchase_date)
	.bind(seed.total)
	.execute(pool)
	.await?;

	for item in &seed.items {
		sqlx::query(
			"\
INSERT INTO receipt_items (
	receipt_id,
	name,
	raw_name,
	brand,
	quantity,
	unit,
	unit_price,
	total_price,
	category_id,
	subcategory_id
)
VALUES ($1, $2, $3, $4, 1, 'UN', $5, $5, $6, $7)",
		)
		.bind(receipt_id)
		.bind(item.name)
		.bind(item.name.to_uppercase())
		.bind(item.brand)
		.bind(item.total_price)
		.bind(item.category_id)
		.bind(item.subcategory_id)
		.execute(pool)
		.await?;
	}

	Ok(receipt_id)
}
