//! Abbreviated-key projection of receipts for the answer-synthesis prompt.
//!
//! The key names below are part of the prompt contract and must stay stable.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{filter::QueryFilter, receipt::Receipt};

pub const LEGEND: [(&str, &str); 14] = [
	("id", "receiptId"),
	("co", "company"),
	("d", "date"),
	("t", "total"),
	("n", "name"),
	("rn", "rawName"),
	("b", "brand"),
	("q", "quantity"),
	("u", "unit"),
	("up", "unitPrice"),
	("tp", "totalPrice"),
	("cat", "category"),
	("sc", "subcategory"),
	("bc", "barcode"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactPayload {
	pub legend: BTreeMap<&'static str, &'static str>,
	pub receipts: Vec<CompactReceipt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactReceipt {
	pub id: Uuid,
	pub co: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub d: Option<String>,
	pub t: f64,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub items: Vec<CompactItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactItem {
	pub n: String,
	pub rn: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub b: Option<String>,
	pub q: f64,
	pub u: String,
	pub up: f64,
	pub tp: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cat: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sc: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bc: Option<String>,
}

pub fn legend() -> BTreeMap<&'static str, &'static str> {
	LEGEND.into_iter().collect()
}

/// Projects `receipts` into the compact schema.
///
/// With a trigger filter that names products and does not ask for full receipts, only the
/// matching items are kept and receipts left without items are dropped.
pub fn encode(receipts: &[Receipt], trigger: Option<&QueryFilter>) -> CompactPayload {
	let trimming = trigger.filter(|filter| filter.trims_items());
	let mut compact = Vec::with_capacity(receipts.len());

	for receipt in receipts {
		let items: Vec<CompactItem> = receipt
			.items
			.iter()
			.filter(|item| match trimming {
				Some(filter) => filter.matches_item_name(&item.name, &item.raw_name),
				None => true,
			})
			.map(|item| CompactItem {
				n: item.name.trim().to_string(),
				rn: item.raw_name.trim().to_string(),
				b: non_empty(item.brand.as_deref()),
				q: item.quantity,
				u: item.unit.trim().to_string(),
				up: item.unit_price,
				tp: item.total_price,
				cat: non_empty(item.category.as_deref()),
				sc: non_empty(item.subcategory.as_deref()),
				bc: non_empty(item.barcode.as_deref()),
			})
			.collect();

		if trimming.is_some() && items.is_empty() {
			continue;
		}

		compact.push(CompactReceipt {
			id: receipt.receipt_id,
			co: receipt.company.trim().to_string(),
			d: receipt.purchase_date.map(|date| date.to_string()),
			t: receipt.total,
			items,
		});
	}

	CompactPayload { legend: legend(), receipts: compact }
}

fn non_empty(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
