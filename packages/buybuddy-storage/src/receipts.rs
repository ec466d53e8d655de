//! User-scoped receipt retrieval compiled from a [`QueryFilter`].
//!
//! Compilation is two-phase. [`ReceiptQueryPlan::compile`] turns a filter into predicate
//! fragments plus the joins they require, and [`ReceiptQueryPlan::to_query`] renders the plan
//! into one parameterized statement. Every user-supplied value travels as a bind parameter.

use std::collections::HashMap;

use sqlx::{Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

use buybuddy_domain::{OrderBy, QueryFilter, Receipt, ReceiptItem};

use crate::{
	Result,
	db::Db,
	models::{ReceiptItemRow, ReceiptRow},
};

const RECEIPT_COLUMNS: &str = "r.receipt_id, r.user_id, r.company, r.purchase_date, r.total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
	Items,
	Categories,
	Subcategories,
}
impl Join {
	fn sql(self) -> &'static str {
		match self {
			Self::Items =>
				" JOIN receipt_items ri ON ri.receipt_id = r.receipt_id AND ri.deleted_at IS NULL",
			Self::Categories =>
				" JOIN categories c ON c.category_id = ri.category_id AND c.deleted_at IS NULL",
			Self::Subcategories =>
				" JOIN subcategories s ON s.subcategory_id = ri.subcategory_id \
				 AND s.deleted_at IS NULL",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
	Owner(Uuid),
	/// Any pattern matches any of the columns.
	AnyLike { columns: &'static [&'static str], patterns: Vec<String> },
	DateFrom(Date),
	DateTo(Date),
	MinItemPrice(f64),
	MaxItemPrice(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptQueryPlan {
	predicates: Vec<Predicate>,
	joins: Vec<Join>,
	order_by: OrderBy,
	limit: u32,
}
impl ReceiptQueryPlan {
	pub fn compile(user_id: Uuid, filter: &QueryFilter, ceiling: u32) -> Self {
		let mut predicates = vec![Predicate::Owner(user_id)];
		let mut joins = Vec::new();
		let company = filter.company_terms();

		if !company.is_empty() {
			predicates.push(any_like(&["r.company"], &company));
		}
		if let Some(date) = filter.date_from {
			predicates.push(Predicate::DateFrom(date));
		}
		if let Some(date) = filter.date_to {
			predicates.push(Predicate::DateTo(date));
		}

		if filter.needs_item_join() {
			joins.push(Join::Items);

			let products = filter.product_terms();
			let brands = filter.brand_terms();

			if !products.is_empty() {
				predicates.push(any_like(&["ri.name", "ri.raw_name"], &products));
			}
			if !brands.is_empty() {
				predicates.push(any_like(&["ri.brand"], &brands));
			}

			if filter.applies_category_filters() {
				let categories = filter.category_terms();
				let subcategories = filter.subcategory_terms();

				if !categories.is_empty() {
					joins.push(Join::Categories);
					predicates.push(any_like(&["c.name"], &categories));
				}
				if !subcategories.is_empty() {
					joins.push(Join::Subcategories);
					predicates.push(any_like(&["s.name"], &subcategories));
				}
			}

			if let Some(price) = filter.min_price {
				predicates.push(Predicate::MinItemPrice(price));
			}
			if let Some(price) = filter.max_price {
				predicates.push(Predicate::MaxItemPrice(price));
			}
		}

		let limit = filter.effective_limit(ceiling);

		Self { predicates, joins, order_by: filter.order_by, limit }
	}

	pub fn joins(&self) -> &[Join] {
		&self.joins
	}

	pub fn joins_items(&self) -> bool {
		self.joins.contains(&Join::Items)
	}

	pub fn order_by(&self) -> OrderBy {
		self.order_by
	}

	pub fn limit(&self) -> u32 {
		self.limit
	}

	pub fn to_query(&self) -> QueryBuilder<'static, Postgres> {
		let mut builder = QueryBuilder::new("SELECT ");

		// Item joins fan out one row per matching item.
		if self.joins_items() {
			builder.push("DISTINCT ");
		}

		builder.push(RECEIPT_COLUMNS);
		builder.push(" FROM receipts r");

		for join in &self.joins {
			builder.push(join.sql());
		}

		builder.push(" WHERE r.deleted_at IS NULL");

		for predicate in &self.predicates {
			builder.push(" AND ");
			push_predicate(&mut builder, predicate);
		}

		builder.push(" ORDER BY ");
		builder.push(order_sql(self.order_by));
		builder.push(" LIMIT ");
		builder.push_bind(i64::from(self.limit));

		builder
	}
}

/// Runs `filter` for `user_id` and returns matching receipts with all of their live items.
pub async fn query_receipts(
	db: &Db,
	user_id: Uuid,
	filter: &QueryFilter,
	ceiling: u32,
) -> Result<Vec<Receipt>> {
	let plan = ReceiptQueryPlan::compile(user_id, filter, ceiling);
	let rows: Vec<ReceiptRow> = plan.to_query().build_query_as().fetch_all(&db.pool).await?;

	if rows.is_empty() {
		return Ok(Vec::new());
	}

	let ids: Vec<Uuid> = rows.iter().map(|row| row.receipt_id).collect();
	let mut items = load_items(db, &ids).await?;

	Ok(rows
		.into_iter()
		.map(|row| Receipt {
			items: items.remove(&row.receipt_id).unwrap_or_default(),
			receipt_id: row.receipt_id,
			user_id: row.user_id,
			company: row.company,
			purchase_date: row.purchase_date,
			total: row.total,
		})
		.collect())
}

/// Earliest known purchase date for `user_id`, if any receipt carries one.
pub async fn first_purchase_date(db: &Db, user_id: Uuid) -> Result<Option<Date>> {
	let date: Option<Date> = sqlx::query_scalar(
		"\
SELECT min(purchase_date)
FROM receipts
WHERE user_id = $1
	AND deleted_at IS NULL",
	)
	.bind(user_id)
	.fetch_one(&db.pool)
	.await?;

	Ok(date)
}

async fn load_items(db: &Db, receipt_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ReceiptItem>>> {
	let rows: Vec<ReceiptItemRow> = sqlx::query_as(
		"\
SELECT
	ri.item_id,
	ri.receipt_id,
	ri.name,
	ri.raw_name,
	ri.brand,
	ri.quantity,
	ri.unit,
	ri.unit_price,
	ri.total_price,
	c.name AS category,
	s.name AS subcategory,
	ri.barcode
FROM receipt_items ri
LEFT JOIN categories c ON c.category_id = ri.category_id AND c.deleted_at IS NULL
LEFT JOIN subcategories s ON s.subcategory_id = ri.subcategory_id AND s.deleted_at IS NULL
WHERE ri.receipt_id = ANY($1)
	AND ri.deleted_at IS NULL
ORDER BY ri.receipt_id, ri.item_id",
	)
	.bind(receipt_ids)
	.fetch_all(&db.pool)
	.await?;
	let mut grouped: HashMap<Uuid, Vec<ReceiptItem>> = HashMap::with_capacity(receipt_ids.len());

	for row in rows {
		grouped.entry(row.receipt_id).or_default().push(ReceiptItem {
			item_id: row.item_id,
			name: row.name,
			raw_name: row.raw_name,
			brand: row.brand,
			quantity: row.quantity,
			unit: row.unit,
			unit_price: row.unit_price,
			total_price: row.total_price,
			category: row.category,
			subcategory: row.subcategory,
			barcode: row.barcode,
		});
	}

	Ok(grouped)
}

fn any_like(columns: &'static [&'static str], terms: &[&str]) -> Predicate {
	let patterns = terms.iter().map(|term| contains_pattern(term)).collect();

	Predicate::AnyLike { columns, patterns }
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
	match predicate {
		Predicate::Owner(user_id) => {
			builder.push("r.user_id = ");
			builder.push_bind(*user_id);
		},
		Predicate::AnyLike { columns, patterns } => {
			let mut first = true;

			builder.push("(");

			for pattern in patterns {
				for column in columns.iter() {
					if !first {
						builder.push(" OR ");
					}

					first = false;

					builder.push(*column);
					builder.push(" ILIKE ");
					builder.push_bind(pattern.clone());
				}
			}

			builder.push(")");
		},
		Predicate::DateFrom(date) => {
			builder.push("r.purchase_date >= ");
			builder.push_bind(*date);
		},
		Predicate::DateTo(date) => {
			builder.push("r.purchase_date <= ");
			builder.push_bind(*date);
		},
		Predicate::MinItemPrice(price) => {
			builder.push("ri.total_price >= ");
			builder.push_bind(*price);
		},
		Predicate::MaxItemPrice(price) => {
			builder.push("ri.total_price <= ");
			builder.push_bind(*price);
		},
	}
}

fn order_sql(order_by: OrderBy) -> &'static str {
	match order_by {
		OrderBy::DateAsc => "r.purchase_date ASC NULLS LAST, r.receipt_id",
		OrderBy::DateDesc => "r.purchase_date DESC NULLS LAST, r.receipt_id",
		OrderBy::TotalAsc => "r.total ASC, r.receipt_id",
		OrderBy::TotalDesc => "r.total DESC, r.receipt_id",
	}
}

/// Wraps `term` for a literal, case-insensitive substring match under `ILIKE`.
fn contains_pattern(term: &str) -> String {
	let mut pattern = String::with_capacity(term.len() + 2);

	pattern.push('%');

	for ch in term.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			pattern.push('\\');
		}

		pattern.push(ch);
	}

	pattern.push('%');

	pattern
}
